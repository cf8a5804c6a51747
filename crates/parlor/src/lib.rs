//! # Parlor
//!
//! Real-time game-room server for browser games.
//!
//! Parlor keeps every player's view of a shared match consistent. An HTTP
//! API mints and inspects rooms; a WebSocket event channel carries joins,
//! readiness, moves, chat and departures. Each room is an actor task that
//! owns its players, its game state and its lifecycle timers. Games plug
//! in through the [`GameLogic`](parlor_room::GameLogic) trait; tic-tac-toe
//! is built in.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use parlor::prelude::*;
//!
//! # async fn run() -> Result<(), ParlorError> {
//! let server = ParlorServerBuilder::new()
//!     .http_bind("0.0.0.0:3000")
//!     .ws_bind("0.0.0.0:3001")
//!     .build::<TicTacToe>()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod broadcaster;
mod error;
mod handler;
pub mod http;
mod server;

pub use broadcaster::EventBroadcaster;
pub use error::ParlorError;
pub use server::{
    DEFAULT_HTTP_ADDR, DEFAULT_WS_ADDR, ParlorServer, ParlorServerBuilder,
};

/// Everything needed to run a server or plug in a game.
pub mod prelude {
    pub use crate::{EventBroadcaster, ParlorError, ParlorServer, ParlorServerBuilder};
    pub use parlor_lifecycle::LifecycleConfig;
    pub use parlor_protocol::{
        ClientEvent, ConnectionId, PlayerInfo, RoomId, RoomPhase, RoomSnapshot,
        ServerEvent,
    };
    pub use parlor_room::{
        GameLogic, Outcome, RoomConfig, RoomError, RoomRegistry, TicTacToe,
        TicTacToeState,
    };
    pub use parlor_session::SessionIndex;
}
