//! The `GameLogic` trait: the extension point for games.
//!
//! A room knows about players, readiness and timers. Everything about
//! the game itself (what a move looks like, whose turn it is, who won)
//! lives behind this trait. Tic-tac-toe is the one implementation
//! shipped, see [`crate::TicTacToe`].

use std::fmt::Debug;

use parlor_protocol::ConnectionId;
use serde::{de::DeserializeOwned, Serialize};

use crate::RoomConfig;

/// How a finished game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// This player won.
    Win(ConnectionId),
    /// Nobody won: a full board, or the game ran out of players.
    Draw,
}

/// The core trait a game implements.
///
/// - `State`: the full game state, sent whole to clients on every change
/// - `Action`: a decoded move
///
/// The room calls `init` when every player is ready, decodes each
/// `game-action` through `decode_action`, applies it with `apply_action`
/// and asks `outcome` whether the game is over.
///
/// All methods are plain functions over the state: no I/O, no clocks.
pub trait GameLogic: Send + Sync + 'static {
    /// The full game state. Serialized as the payload of `game-started`
    /// and `game-update`.
    type State: Send + Sync + Clone + Debug + Serialize + DeserializeOwned + 'static;

    /// A move, decoded from the `action` name and `data` payload.
    type Action: Send + Debug + 'static;

    /// Creates the state for a new game.
    ///
    /// `players` are the room's members in join order.
    fn init(players: &[ConnectionId]) -> Self::State;

    /// Turns the wire form of an action into a typed move.
    ///
    /// # Errors
    /// Returns a player-facing reason if the action is unknown or its
    /// data does not fit.
    fn decode_action(
        action: &str,
        data: &serde_json::Value,
    ) -> Result<Self::Action, String>;

    /// Applies a move by `actor`.
    ///
    /// `players` are the room's members in join order.
    ///
    /// # Errors
    /// Returns a player-facing reason if the move is not allowed. A
    /// rejected move must leave `state` untouched.
    fn apply_action(
        state: &mut Self::State,
        players: &[ConnectionId],
        actor: ConnectionId,
        action: Self::Action,
    ) -> Result<(), String>;

    /// Returns how the game ended, or `None` while it is still running.
    fn outcome(state: &Self::State) -> Option<Outcome>;

    /// Called when a player leaves a running game.
    ///
    /// `players` is the join order *before* the departure, so the game
    /// can find who comes after the leaver. Default: no-op.
    fn on_player_leave(
        _state: &mut Self::State,
        _players: &[ConnectionId],
        _leaving: ConnectionId,
    ) {
    }

    /// Ends a running game with no winner. Called when too few players
    /// remain to continue. After this, `outcome` must return
    /// `Some(Outcome::Draw)`.
    fn end_without_winner(state: &mut Self::State);

    /// Returns the room configuration for this game type.
    ///
    /// Default: `RoomConfig::default()` (2-4 players).
    fn room_config() -> RoomConfig {
        RoomConfig::default()
    }
}
