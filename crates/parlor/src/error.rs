//! Unified error type for Parlor.

use parlor_protocol::ProtocolError;
use parlor_room::RoomError;
use parlor_session::SessionError;
use parlor_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant generates the `From` impls, so
/// `?` converts layer errors automatically. Variants are `transparent`:
/// the text a client sees in an `error` event is the layer's own message.
#[derive(Debug, thiserror::Error)]
pub enum ParlorError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A session-level error (already in a room, not in this room).
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A room-level error (not found, full, invalid move).
    #[error(transparent)]
    Room(#[from] RoomError),

    /// Binding or serving the HTTP listener failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use parlor_protocol::{ConnectionId, RoomId};

    #[test]
    fn test_from_transport_error() {
        let err = TransportError::SendFailed(std::io::Error::other("gone"));
        let parlor_err: ParlorError = err.into();
        assert!(matches!(parlor_err, ParlorError::Transport(_)));
        assert!(parlor_err.to_string().contains("gone"));
    }

    #[test]
    fn test_from_session_error_keeps_message() {
        let err = SessionError::AlreadyBound {
            connection: ConnectionId::new(1),
            room_id: RoomId::parse("123456").unwrap(),
        };
        let parlor_err: ParlorError = err.into();
        assert!(matches!(parlor_err, ParlorError::Session(_)));
        assert_eq!(parlor_err.to_string(), "already in room 123456; leave it first");
    }

    #[test]
    fn test_from_room_error_keeps_message() {
        let err = RoomError::NotFound(RoomId::parse("654321").unwrap());
        let parlor_err: ParlorError = err.into();
        assert!(matches!(parlor_err, ParlorError::Room(_)));
        assert_eq!(parlor_err.to_string(), "room 654321 not found");
    }
}
