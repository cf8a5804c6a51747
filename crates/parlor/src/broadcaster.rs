//! The event broadcaster: turns client events into room operations.
//!
//! Every decoded [`ClientEvent`] goes through [`EventBroadcaster::dispatch`].
//! It checks the event against the session index, finds the room in the
//! registry and forwards the request to the room actor, which does the
//! actual broadcasting to members. Anything that goes wrong comes back to
//! the requesting connection alone, as an `error` event.

use parlor_protocol::{ClientEvent, ConnectionId, RoomId, ServerEvent};
use parlor_room::{
    GameLogic, Outbox, RoomError, RoomHandle, RoomRegistry, validate_player_name,
};
use parlor_session::SessionIndex;

use crate::ParlorError;

/// Routes client events to rooms. Cheap to clone; clones share state.
pub struct EventBroadcaster<G: GameLogic> {
    rooms: RoomRegistry<G>,
    sessions: SessionIndex,
}

impl<G: GameLogic> Clone for EventBroadcaster<G> {
    fn clone(&self) -> Self {
        Self {
            rooms: self.rooms.clone(),
            sessions: self.sessions.clone(),
        }
    }
}

impl<G: GameLogic> EventBroadcaster<G> {
    pub fn new(rooms: RoomRegistry<G>, sessions: SessionIndex) -> Self {
        Self { rooms, sessions }
    }

    pub fn rooms(&self) -> &RoomRegistry<G> {
        &self.rooms
    }

    pub fn sessions(&self) -> &SessionIndex {
        &self.sessions
    }

    /// Handles one event from `conn`. `outbox` is the connection's own
    /// queue; rejections are pushed there.
    pub async fn dispatch(
        &self,
        conn: ConnectionId,
        outbox: &Outbox<G::State>,
        event: ClientEvent,
    ) {
        let name = event.name();
        if let Err(e) = self.route(conn, outbox, event).await {
            tracing::debug!(%conn, event = name, error = %e, "event rejected");
            let _ = outbox.send(ServerEvent::error(e.to_string()));
        }
    }

    /// Cleans up after a closed connection: same as an explicit leave,
    /// minus the error if the connection was in no room.
    pub async fn disconnect(&self, conn: ConnectionId) {
        let Some(binding) = self.sessions.unbind(conn) else {
            return;
        };
        // The room may have been deleted meanwhile; nothing left to do then.
        if let Ok(room) = self.rooms.lookup(&binding.room_id) {
            if let Err(e) = room.leave(conn).await {
                tracing::debug!(%conn, error = %e, "leave on disconnect failed");
            }
        }
    }

    async fn route(
        &self,
        conn: ConnectionId,
        outbox: &Outbox<G::State>,
        event: ClientEvent,
    ) -> Result<(), ParlorError> {
        match event {
            ClientEvent::JoinRoom {
                room_id,
                player_name,
            } => self.join(conn, outbox, room_id, &player_name).await,

            ClientEvent::PlayerReady { room_id, player_id } => {
                let room = self.bound_room(conn, &room_id)?;
                room.ready(player_id).await?;
                Ok(())
            }

            ClientEvent::GameAction {
                room_id,
                action,
                data,
            } => {
                let room = self.bound_room(conn, &room_id)?;
                let action = G::decode_action(&action, &data)
                    .map_err(RoomError::Validation)?;
                room.act(conn, action).await?;
                Ok(())
            }

            // The name travels with the message but the room uses the
            // member's own, so nobody can speak under another name.
            ClientEvent::SendMessage {
                room_id, message, ..
            } => {
                let room = self.bound_room(conn, &room_id)?;
                room.chat(conn, message).await?;
                Ok(())
            }

            ClientEvent::LeaveRoom { room_id } => {
                self.sessions.require_room(conn, &room_id)?;
                self.disconnect(conn).await;
                Ok(())
            }
        }
    }

    async fn join(
        &self,
        conn: ConnectionId,
        outbox: &Outbox<G::State>,
        room_id: RoomId,
        player_name: &str,
    ) -> Result<(), ParlorError> {
        let name = validate_player_name(player_name)?;
        let room = self.rooms.lookup(&room_id)?;

        // Reserve the session first; a connection in another room is
        // turned away before the room hears about it.
        self.sessions.bind(conn, room_id, name.clone())?;
        if let Err(e) = room.join(conn, name, outbox.clone()).await {
            self.sessions.unbind(conn);
            return Err(e.into());
        }
        Ok(())
    }

    fn bound_room(
        &self,
        conn: ConnectionId,
        room_id: &RoomId,
    ) -> Result<RoomHandle<G>, ParlorError> {
        self.sessions.require_room(conn, room_id)?;
        Ok(self.rooms.lookup(room_id)?)
    }
}
