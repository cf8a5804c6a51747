//! Wire protocol for Parlor.
//!
//! This crate defines what clients and the server say to each other:
//!
//! - **Events** ([`ClientEvent`], [`ServerEvent`]): the messages on the
//!   real-time channel, plus [`Recipient`] for routing them inside a room.
//! - **Snapshots** ([`RoomSnapshot`], [`PlayerInfo`], [`RoomPhase`],
//!   [`RoomId`]): the room shapes clients render.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): bytes in, events out.
//!
//! It knows nothing about rooms as live objects or about timers.
//!
//! ```text
//! Transport (bytes) → Protocol (ClientEvent) → Broadcaster → Room actor
//! ```

mod codec;
mod error;
mod types;

pub use codec::{Codec, JsonCodec};
pub use error::ProtocolError;
pub use parlor_transport::ConnectionId;
pub use types::{
    ClientEvent, PlayerInfo, Recipient, RoomId, RoomPhase, RoomSnapshot,
    ServerEvent,
};
