//! Error types for the session layer.

use parlor_protocol::{ConnectionId, RoomId};

/// Errors that can occur while binding connections to rooms.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The connection already sits in a room. A connection belongs to at
    /// most one room at a time and has to leave before joining another.
    #[error("already in room {room_id}; leave it first")]
    AlreadyBound {
        connection: ConnectionId,
        room_id: RoomId,
    },

    /// The connection is not bound to any room.
    #[error("{0} is not in a room")]
    NotBound(ConnectionId),

    /// The connection named a room other than the one it is in.
    #[error("not in room {requested}")]
    WrongRoom {
        connection: ConnectionId,
        requested: RoomId,
    },
}
