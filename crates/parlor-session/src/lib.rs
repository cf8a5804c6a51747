//! Session tracking for Parlor.
//!
//! A *session* is the link between a live connection and the room it
//! joined, together with the display name it joined under. There is no
//! account, token or reconnection behind it: the session starts at
//! `join-room` and ends at `leave-room` or when the socket drops.
//!
//! ```text
//! Broadcaster (above)  ← asks "which room is this connection in?"
//!     ↕
//! Session Layer (this crate)  ← ConnectionId → (RoomId, name)
//!     ↕
//! Protocol Layer (below)  ← provides ConnectionId, RoomId
//! ```

mod error;
mod index;

pub use error::SessionError;
pub use index::{SessionBinding, SessionIndex};
