//! Room registry: mints room ids, tracks live rooms, routes to them.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use parlor_protocol::RoomId;
use rand::Rng;

use crate::actor::{spawn_room, RoomTable};
use crate::room::validate_player_name;
use crate::{GameLogic, Room, RoomConfig, RoomError, RoomHandle};

/// All live rooms, keyed by their six-digit id.
///
/// This is the entry point for room operations from the server: the HTTP
/// API creates and inspects rooms through it, the event broadcaster looks
/// rooms up by the id a client names. Clones share the same rooms.
///
/// The map itself is never exposed. A room leaves it when it is deleted
/// explicitly or when its own empty-room sweep fires.
pub struct RoomRegistry<G: GameLogic> {
    rooms: Arc<RoomTable<G>>,
    config: RoomConfig,
}

impl<G: GameLogic> Clone for RoomRegistry<G> {
    fn clone(&self) -> Self {
        Self {
            rooms: Arc::clone(&self.rooms),
            config: self.config.clone(),
        }
    }
}

impl<G: GameLogic> RoomRegistry<G> {
    /// Creates an empty registry whose rooms use `config`.
    pub fn new(config: RoomConfig) -> Self {
        Self {
            rooms: Arc::new(RoomTable::new()),
            config,
        }
    }

    /// The configuration new rooms are created with.
    pub fn config(&self) -> &RoomConfig {
        &self.config
    }

    /// Creates a waiting, empty room and starts its actor.
    ///
    /// The id is drawn uniformly from `100000..=999999` and redrawn until
    /// it matches no live room. Must be called inside a Tokio runtime.
    ///
    /// # Errors
    /// Returns [`RoomError::Validation`] if `creator` is not a usable name.
    pub fn create_room(&self, creator: &str) -> Result<RoomId, RoomError> {
        let creator = validate_player_name(creator)?;
        let mut rng = rand::rng();
        loop {
            let Some(room_id) =
                RoomId::from_number(rng.random_range(RoomId::MIN..=RoomId::MAX))
            else {
                continue;
            };
            // Reserve the id and spawn under the same shard lock, so two
            // concurrent creators can never both win it.
            if let Entry::Vacant(slot) = self.rooms.entry(room_id.clone()) {
                let room = Room::new(room_id.clone(), creator, self.config.clone());
                slot.insert(spawn_room(room, Arc::downgrade(&self.rooms)));
                tracing::info!(%room_id, "room created");
                return Ok(room_id);
            }
        }
    }

    /// Returns a handle to a live room.
    ///
    /// # Errors
    /// Returns [`RoomError::NotFound`] if no such room exists.
    pub fn lookup(&self, room_id: &RoomId) -> Result<RoomHandle<G>, RoomError> {
        self.rooms
            .get(room_id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| RoomError::NotFound(room_id.clone()))
    }

    /// Removes a room and stops its actor, cancelling its timers.
    ///
    /// Returns `false` if there was no such room.
    pub async fn delete(&self, room_id: &RoomId) -> bool {
        let Some((_, handle)) = self.rooms.remove(room_id) else {
            return false;
        };
        // The actor may already be stopping on its own.
        let _ = handle.shutdown().await;
        tracing::info!(%room_id, "room deleted");
        true
    }

    /// Returns `true` if a room with this id is live.
    pub fn contains(&self, room_id: &RoomId) -> bool {
        self.rooms.contains_key(room_id)
    }

    /// Returns the number of live rooms.
    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    /// Returns `true` if there are no live rooms.
    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}

impl<G: GameLogic> Default for RoomRegistry<G> {
    /// A registry using the game's own room configuration.
    fn default() -> Self {
        Self::new(G::room_config())
    }
}
