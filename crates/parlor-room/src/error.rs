//! Error types for the room layer.

use parlor_protocol::{ConnectionId, RoomId};

/// Errors that can occur during room operations.
///
/// The `Display` text is what the requesting client sees in its `error`
/// event, so messages are short and player-facing.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// The room does not exist, or was deleted while the request was in
    /// flight.
    #[error("room {0} not found")]
    NotFound(RoomId),

    /// The room is full: no more player slots available.
    #[error("room {0} is full")]
    RoomFull(RoomId),

    /// The player is already in this room.
    #[error("player {0} already in room {1}")]
    AlreadyInRoom(ConnectionId, RoomId),

    /// The player is not in this room.
    #[error("player {0} not in room {1}")]
    NotInRoom(ConnectionId, RoomId),

    /// A game action was refused: not this player's turn, cell taken,
    /// no game in progress.
    #[error("invalid move: {0}")]
    InvalidMove(String),

    /// A request was malformed, e.g. a blank player name.
    #[error("{0}")]
    Validation(String),
}
