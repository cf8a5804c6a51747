//! Rooms for Parlor.
//!
//! Each room runs as an isolated Tokio task (actor model) with its own
//! player list, game state and lifecycle timers.
//!
//! # Key types
//!
//! - [`GameLogic`]: the trait a game implements; [`TicTacToe`] is built in
//! - [`Room`]: the pure room state machine
//! - [`RoomHandle`]: send commands to a running room actor
//! - [`RoomRegistry`]: creates, looks up and deletes rooms
//! - [`RoomConfig`]: player limits and grace periods

mod actor;
mod config;
mod error;
mod logic;
mod registry;
mod room;
mod tictactoe;

pub use actor::{Outbox, RoomHandle};
pub use config::RoomConfig;
pub use error::RoomError;
pub use logic::{GameLogic, Outcome};
pub use registry::RoomRegistry;
pub use room::{
    LifecycleEffect, MAX_NAME_CHARS, Room, Transition, validate_player_name,
};
pub use tictactoe::{
    GAME_TYPE, GameStatus, Mark, TicTacToe, TicTacToeAction, TicTacToeState,
    winning_line,
};
