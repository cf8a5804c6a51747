//! The session index: which room each connection is in.
//!
//! # Concurrency note
//!
//! Unlike the room actors, the index is touched from every connection
//! task at once, so it sits on a sharded concurrent map (`DashMap`) and
//! is cheap to clone. Each connection task only ever mutates its own
//! entry, which is what keeps `bind` → `unbind` ordering per connection
//! trivially correct.

use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use parlor_protocol::{ConnectionId, RoomId};

use crate::SessionError;

/// What a connection is bound to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionBinding {
    /// The room the connection joined.
    pub room_id: RoomId,
    /// The display name it joined under.
    pub name: String,
}

/// Maps live connections to their room and display name.
///
/// Strictly one binding per connection: [`bind`](Self::bind) refuses to
/// overwrite an existing binding.
#[derive(Debug, Clone, Default)]
pub struct SessionIndex {
    bindings: Arc<DashMap<ConnectionId, SessionBinding>>,
}

impl SessionIndex {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds a connection to a room under a display name.
    ///
    /// # Errors
    /// Returns [`SessionError::AlreadyBound`] if the connection is already
    /// in a room (the same one or another). The existing binding is left
    /// untouched.
    pub fn bind(
        &self,
        connection: ConnectionId,
        room_id: RoomId,
        name: impl Into<String>,
    ) -> Result<(), SessionError> {
        match self.bindings.entry(connection) {
            Entry::Occupied(existing) => Err(SessionError::AlreadyBound {
                connection,
                room_id: existing.get().room_id.clone(),
            }),
            Entry::Vacant(slot) => {
                tracing::debug!(%connection, %room_id, "session bound");
                slot.insert(SessionBinding {
                    room_id,
                    name: name.into(),
                });
                Ok(())
            }
        }
    }

    /// Removes a connection's binding and returns what it was bound to.
    ///
    /// Returns `None` if the connection was not in a room, which is the
    /// normal case for a socket that closes before joining anything.
    pub fn unbind(&self, connection: ConnectionId) -> Option<SessionBinding> {
        let (_, binding) = self.bindings.remove(&connection)?;
        tracing::debug!(%connection, room_id = %binding.room_id, "session unbound");
        Some(binding)
    }

    /// Returns a copy of the connection's binding, if any.
    pub fn lookup(&self, connection: ConnectionId) -> Option<SessionBinding> {
        self.bindings.get(&connection).map(|entry| entry.value().clone())
    }

    /// Like [`lookup`](Self::lookup), but an unbound connection is an error.
    ///
    /// # Errors
    /// Returns [`SessionError::NotBound`] if there is no binding.
    pub fn require(
        &self,
        connection: ConnectionId,
    ) -> Result<SessionBinding, SessionError> {
        self.lookup(connection)
            .ok_or(SessionError::NotBound(connection))
    }

    /// Returns the binding, provided it is for `room_id`.
    ///
    /// Room-scoped events name their room; this checks the connection
    /// actually sits in it.
    ///
    /// # Errors
    /// [`SessionError::NotBound`] if the connection is in no room,
    /// [`SessionError::WrongRoom`] if it is in a different one.
    pub fn require_room(
        &self,
        connection: ConnectionId,
        room_id: &RoomId,
    ) -> Result<SessionBinding, SessionError> {
        let binding = self.require(connection)?;
        if binding.room_id != *room_id {
            return Err(SessionError::WrongRoom {
                connection,
                requested: room_id.clone(),
            });
        }
        Ok(binding)
    }

    /// Returns the number of bound connections.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Returns `true` if no connection is bound.
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

// =========================================================================
// Tests
// =========================================================================
