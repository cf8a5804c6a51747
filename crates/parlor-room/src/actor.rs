//! Room actor: an isolated Tokio task that owns one [`Room`].
//!
//! Each room runs in its own task, communicating with the outside world
//! through an mpsc channel. Commands are handled one at a time, to
//! completion, so room state needs no locks. The actor also owns the
//! room's lifecycle timers; a timer firing is just another branch of the
//! same `select!` loop and is serialized with client events.

use std::collections::HashMap;
use std::sync::Weak;

use dashmap::DashMap;
use parlor_lifecycle::{LifecycleAction, LifecycleTimers};
use parlor_protocol::{ConnectionId, RoomId, RoomSnapshot, ServerEvent};
use tokio::sync::{mpsc, oneshot};

use crate::room::{LifecycleEffect, Transition};
use crate::{GameLogic, Room, RoomError};

/// Channel a connection's outbound events are pushed into.
///
/// Unbounded so that a slow client never stalls the room actor.
pub type Outbox<S> = mpsc::UnboundedSender<ServerEvent<S>>;

/// The map the registry keeps; the actor holds a weak reference so it can
/// remove itself when swept.
pub(crate) type RoomTable<G> = DashMap<RoomId, RoomHandle<G>>;

type Reply<T = ()> = oneshot::Sender<Result<T, RoomError>>;

/// Commands sent to a room actor through its channel.
pub(crate) enum RoomCommand<G: GameLogic> {
    Join {
        player: ConnectionId,
        name: String,
        outbox: Outbox<G::State>,
        reply: Reply,
    },
    Ready {
        player: ConnectionId,
        reply: Reply,
    },
    Act {
        player: ConnectionId,
        action: G::Action,
        reply: Reply,
    },
    Chat {
        player: ConnectionId,
        message: String,
        reply: Reply,
    },
    Leave {
        player: ConnectionId,
        reply: Reply,
    },
    Snapshot {
        reply: oneshot::Sender<RoomSnapshot<G::State>>,
    },
    Shutdown,
}

/// Handle to a running room actor. Used to send commands to it.
///
/// Cheap to clone: it's an `mpsc::Sender` and the room id. Once the actor
/// stops, every call returns [`RoomError::NotFound`].
pub struct RoomHandle<G: GameLogic> {
    room_id: RoomId,
    sender: mpsc::Sender<RoomCommand<G>>,
}

impl<G: GameLogic> Clone for RoomHandle<G> {
    fn clone(&self) -> Self {
        Self {
            room_id: self.room_id.clone(),
            sender: self.sender.clone(),
        }
    }
}

impl<G: GameLogic> RoomHandle<G> {
    /// Returns the room's id.
    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    /// Adds a player. Their events will be pushed into `outbox`.
    pub async fn join(
        &self,
        player: ConnectionId,
        name: impl Into<String>,
        outbox: Outbox<G::State>,
    ) -> Result<(), RoomError> {
        let name = name.into();
        self.request(|reply| RoomCommand::Join {
            player,
            name,
            outbox,
            reply,
        })
        .await?
    }

    /// Marks a member ready.
    pub async fn ready(&self, player: ConnectionId) -> Result<(), RoomError> {
        self.request(|reply| RoomCommand::Ready { player, reply })
            .await?
    }

    /// Applies a decoded game move.
    pub async fn act(
        &self,
        player: ConnectionId,
        action: G::Action,
    ) -> Result<(), RoomError> {
        self.request(|reply| RoomCommand::Act {
            player,
            action,
            reply,
        })
        .await?
    }

    /// Relays a chat line.
    pub async fn chat(
        &self,
        player: ConnectionId,
        message: impl Into<String>,
    ) -> Result<(), RoomError> {
        let message = message.into();
        self.request(|reply| RoomCommand::Chat {
            player,
            message,
            reply,
        })
        .await?
    }

    /// Removes a member.
    pub async fn leave(&self, player: ConnectionId) -> Result<(), RoomError> {
        self.request(|reply| RoomCommand::Leave { player, reply })
            .await?
    }

    /// Returns the room as clients see it.
    pub async fn snapshot(&self) -> Result<RoomSnapshot<G::State>, RoomError> {
        self.request(|reply| RoomCommand::Snapshot { reply }).await
    }

    /// Tells the room to stop. Pending timers die with it.
    pub async fn shutdown(&self) -> Result<(), RoomError> {
        self.sender
            .send(RoomCommand::Shutdown)
            .await
            .map_err(|_| self.gone())
    }

    async fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> RoomCommand<G>,
    ) -> Result<T, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(command(reply_tx))
            .await
            .map_err(|_| self.gone())?;
        reply_rx.await.map_err(|_| self.gone())
    }

    fn gone(&self) -> RoomError {
        RoomError::NotFound(self.room_id.clone())
    }
}

/// The internal room actor state. Runs inside a Tokio task.
struct RoomActor<G: GameLogic> {
    room: Room<G>,
    outboxes: HashMap<ConnectionId, Outbox<G::State>>,
    timers: LifecycleTimers,
    receiver: mpsc::Receiver<RoomCommand<G>>,
    table: Weak<RoomTable<G>>,
}

impl<G: GameLogic> RoomActor<G> {
    /// Runs the actor loop until shutdown, or until an empty-room sweep
    /// deletes the room.
    async fn run(mut self) {
        let room_id = self.room.id().clone();
        tracing::info!(%room_id, "room actor started");

        loop {
            tokio::select! {
                // Queued commands win over a timer due at the same instant,
                // so a join already in flight is never swept away.
                biased;

                cmd = self.receiver.recv() => match cmd {
                    Some(RoomCommand::Shutdown) | None => {
                        tracing::info!(%room_id, "room shutting down");
                        break;
                    }
                    Some(cmd) => self.handle(cmd),
                },
                action = self.timers.next_due() => match action {
                    LifecycleAction::SweepEmptyRoom => {
                        if self.room.is_empty() {
                            if let Some(table) = self.table.upgrade() {
                                table.remove(&room_id);
                            }
                            tracing::info!(%room_id, "empty room deleted");
                            break;
                        }
                    }
                    LifecycleAction::ResetGame => {
                        let t = self.room.reset();
                        self.apply(t);
                    }
                },
            }
        }

        self.timers.cancel_all();
        tracing::info!(%room_id, "room actor stopped");
    }

    fn handle(&mut self, cmd: RoomCommand<G>) {
        match cmd {
            RoomCommand::Join {
                player,
                name,
                outbox,
                reply,
            } => {
                let result = self.room.join(player, &name).map(|t| {
                    self.outboxes.insert(player, outbox);
                    t
                });
                self.finish(result, reply);
            }
            RoomCommand::Ready { player, reply } => {
                let result = self.room.ready(player);
                self.finish(result, reply);
            }
            RoomCommand::Act {
                player,
                action,
                reply,
            } => {
                let result = self.room.act(player, action);
                self.finish(result, reply);
            }
            RoomCommand::Chat {
                player,
                message,
                reply,
            } => {
                let result = self.room.chat(player, &message);
                self.finish(result, reply);
            }
            RoomCommand::Leave { player, reply } => {
                let result = self.room.leave(player).map(|t| {
                    self.outboxes.remove(&player);
                    t
                });
                self.finish(result, reply);
            }
            RoomCommand::Snapshot { reply } => {
                let _ = reply.send(self.room.snapshot());
            }
            // Handled by the run loop.
            RoomCommand::Shutdown => {}
        }
    }

    /// Delivers a transition's events and answers the requester.
    fn finish(
        &mut self,
        result: Result<Transition<G::State>, RoomError>,
        reply: Reply,
    ) {
        let result = match result {
            Ok(t) => {
                self.apply(t);
                Ok(())
            }
            Err(e) => {
                tracing::debug!(
                    room_id = %self.room.id(),
                    error = %e,
                    "request rejected"
                );
                Err(e)
            }
        };
        let _ = reply.send(result);
    }

    fn apply(&mut self, t: Transition<G::State>) {
        for effect in t.effects {
            match effect {
                LifecycleEffect::ScheduleSweep => self.timers.schedule_sweep(),
                LifecycleEffect::CancelSweep => {
                    self.timers.cancel_sweep();
                }
                LifecycleEffect::ScheduleReset => self.timers.schedule_reset(),
            }
        }

        for (recipient, event) in t.outbound {
            for player in self.room.player_ids() {
                if recipient.includes(player) {
                    self.send_to(player, event.clone());
                }
            }
        }
    }

    /// Pushes an event to one player. Silently drops it if the
    /// connection is gone; its disconnect will arrive as a `Leave`.
    fn send_to(&self, player: ConnectionId, event: ServerEvent<G::State>) {
        if let Some(outbox) = self.outboxes.get(&player) {
            let _ = outbox.send(event);
        }
    }
}

/// Spawns a room actor task and returns a handle to it.
///
/// `table` is the registry map the room is (about to be) stored in.
/// A room with nobody in it has its empty-room sweep armed from the
/// start; the first join cancels it.
pub(crate) fn spawn_room<G: GameLogic>(
    room: Room<G>,
    table: Weak<RoomTable<G>>,
) -> RoomHandle<G> {
    let (tx, rx) = mpsc::channel(room.config().channel_size);
    let room_id = room.id().clone();
    let mut timers = LifecycleTimers::new(room.config().lifecycle);
    if room.is_empty() {
        timers.schedule_sweep();
    }

    let actor = RoomActor::<G> {
        room,
        outboxes: HashMap::new(),
        timers,
        receiver: rx,
        table,
    };
    tokio::spawn(actor.run());

    RoomHandle {
        room_id,
        sender: tx,
    }
}
