//! Tic-tac-toe, the built-in game.
//!
//! The first player to have joined the room plays `X`, everyone else
//! plays `O`. Turns rotate through the room in join order, so with more
//! than two players several people share the `O` mark.

use std::collections::BTreeMap;

use parlor_protocol::ConnectionId;
use serde::{Deserialize, Serialize};

use crate::{GameLogic, Outcome};

// ---------------------------------------------------------------------------
// Game types
// ---------------------------------------------------------------------------

/// A mark on the board. Empty cells are `null` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mark {
    X,
    O,
}

/// Whether the game still accepts moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    Playing,
    Finished,
}

/// Cells `0..=8`, row by row.
pub type Board = [Option<Mark>; 9];

/// The eight lines that win the game.
#[rustfmt::skip]
const WIN_LINES: [[usize; 3]; 8] = [
    [0, 1, 2], [3, 4, 5], [6, 7, 8], // rows
    [0, 3, 6], [1, 4, 7], [2, 5, 8], // columns
    [0, 4, 8], [2, 4, 6],            // diagonals
];

/// The identifier clients see in `gameType`.
pub const GAME_TYPE: &str = "tic-tac-toe";

/// Full game state, broadcast whole after every move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicTacToeState {
    /// Who moves next.
    pub turn: ConnectionId,
    /// Starts at 1; bumped after each move that doesn't end the game.
    pub round: u32,
    pub board: Board,
    /// Wins per player within this game.
    pub scores: BTreeMap<ConnectionId, u32>,
    pub winner: Option<ConnectionId>,
    pub game_type: String,
    pub game_state: GameStatus,
}

/// A decoded `game-action`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicTacToeAction {
    /// Place the mover's mark on a cell.
    Move { position: usize },
}

#[derive(Deserialize)]
struct MoveData {
    position: usize,
}

// ---------------------------------------------------------------------------
// Game logic
// ---------------------------------------------------------------------------

/// Marker type implementing [`GameLogic`] for tic-tac-toe.
#[derive(Debug, Clone, Copy, Default)]
pub struct TicTacToe;

impl GameLogic for TicTacToe {
    type State = TicTacToeState;
    type Action = TicTacToeAction;

    fn init(players: &[ConnectionId]) -> TicTacToeState {
        TicTacToeState {
            // Rooms only start with at least two players; the fallback
            // keeps `init` total.
            turn: players.first().copied().unwrap_or(ConnectionId::new(0)),
            round: 1,
            board: [None; 9],
            scores: players.iter().map(|p| (*p, 0)).collect(),
            winner: None,
            game_type: GAME_TYPE.to_owned(),
            game_state: GameStatus::Playing,
        }
    }

    fn decode_action(
        action: &str,
        data: &serde_json::Value,
    ) -> Result<TicTacToeAction, String> {
        match action {
            "move" => {
                let MoveData { position } = MoveData::deserialize(data)
                    .map_err(|e| format!("bad move data: {e}"))?;
                Ok(TicTacToeAction::Move { position })
            }
            other => Err(format!("unknown action '{other}'")),
        }
    }

    fn apply_action(
        state: &mut TicTacToeState,
        players: &[ConnectionId],
        actor: ConnectionId,
        action: TicTacToeAction,
    ) -> Result<(), String> {
        let TicTacToeAction::Move { position } = action;

        if state.game_state == GameStatus::Finished {
            return Err("game is over".into());
        }
        if state.turn != actor {
            return Err("not your turn".into());
        }
        if position >= state.board.len() {
            return Err(format!("position {position} is off the board"));
        }
        if state.board[position].is_some() {
            return Err(format!("cell {position} is already taken"));
        }
        let Some(index) = players.iter().position(|p| *p == actor) else {
            return Err("not your turn".into());
        };

        state.board[position] = Some(if index == 0 { Mark::X } else { Mark::O });

        if winning_line(&state.board).is_some() {
            state.winner = Some(actor);
            *state.scores.entry(actor).or_insert(0) += 1;
            state.game_state = GameStatus::Finished;
        } else if board_full(&state.board) {
            state.game_state = GameStatus::Finished;
        } else {
            state.turn = players[(index + 1) % players.len()];
            state.round += 1;
        }
        Ok(())
    }

    fn outcome(state: &TicTacToeState) -> Option<Outcome> {
        match (state.game_state, state.winner) {
            (GameStatus::Playing, _) => None,
            (GameStatus::Finished, Some(winner)) => Some(Outcome::Win(winner)),
            (GameStatus::Finished, None) => Some(Outcome::Draw),
        }
    }

    fn on_player_leave(
        state: &mut TicTacToeState,
        players: &[ConnectionId],
        leaving: ConnectionId,
    ) {
        if state.game_state != GameStatus::Playing || state.turn != leaving {
            return;
        }
        // Hand the turn to whoever followed the leaver in join order.
        if let Some(index) = players.iter().position(|p| *p == leaving) {
            let next = players
                .iter()
                .cycle()
                .skip(index + 1)
                .take(players.len())
                .find(|p| **p != leaving);
            if let Some(next) = next {
                state.turn = *next;
            }
        }
    }

    fn end_without_winner(state: &mut TicTacToeState) {
        state.winner = None;
        state.game_state = GameStatus::Finished;
    }
}

/// Returns the first complete line of one mark, if any.
pub fn winning_line(board: &Board) -> Option<[usize; 3]> {
    WIN_LINES.into_iter().find(|[a, b, c]| {
        board[*a].is_some() && board[*a] == board[*b] && board[*a] == board[*c]
    })
}

fn board_full(board: &Board) -> bool {
    board.iter().all(Option::is_some)
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn cid(id: u64) -> ConnectionId {
        ConnectionId::new(id)
    }

    fn mv(position: usize) -> TicTacToeAction {
        TicTacToeAction::Move { position }
    }

    /// Two players, 1 (X) and 2 (O), fresh game.
    fn two_player_game() -> (TicTacToeState, Vec<ConnectionId>) {
        let players = vec![cid(1), cid(2)];
        (TicTacToe::init(&players), players)
    }

    /// Plays moves alternating between the players in join order.
    fn play(state: &mut TicTacToeState, players: &[ConnectionId], moves: &[usize]) {
        for pos in moves {
            let actor = state.turn;
            TicTacToe::apply_action(state, players, actor, mv(*pos))
                .unwrap_or_else(|e| panic!("move {pos} rejected: {e}"));
        }
    }

    // =====================================================================
    // init()
    // =====================================================================

    #[test]
    fn test_init_first_joiner_moves_on_empty_board() {
        let (state, _) = two_player_game();
        assert_eq!(state.turn, cid(1));
        assert_eq!(state.round, 1);
        assert!(state.board.iter().all(Option::is_none));
        assert_eq!(state.scores.get(&cid(1)), Some(&0));
        assert_eq!(state.scores.get(&cid(2)), Some(&0));
        assert_eq!(state.winner, None);
        assert_eq!(state.game_state, GameStatus::Playing);
    }

    #[test]
    fn test_state_json_shape() {
        let (mut state, players) = two_player_game();
        play(&mut state, &players, &[4]);

        let value = serde_json::to_value(&state).unwrap();
        assert_eq!(value["turn"], json!(2));
        assert_eq!(value["round"], json!(2));
        assert_eq!(value["board"][4], json!("X"));
        assert_eq!(value["board"][0], json!(null));
        assert_eq!(value["scores"]["1"], json!(0));
        assert_eq!(value["winner"], json!(null));
        assert_eq!(value["gameType"], json!("tic-tac-toe"));
        assert_eq!(value["gameState"], json!("playing"));
    }

    // =====================================================================
    // decode_action()
    // =====================================================================

    #[test]
    fn test_decode_move() {
        let action = TicTacToe::decode_action("move", &json!({"position": 7})).unwrap();
        assert_eq!(action, mv(7));
    }

    #[test]
    fn test_decode_unknown_action_is_rejected() {
        let err = TicTacToe::decode_action("resign", &json!({})).unwrap_err();
        assert!(err.contains("resign"));
    }

    #[test]
    fn test_decode_move_without_position_is_rejected() {
        assert!(TicTacToe::decode_action("move", &json!({})).is_err());
        assert!(TicTacToe::decode_action("move", &json!({"position": -1})).is_err());
    }

    // =====================================================================
    // apply_action()
    // =====================================================================

    #[test]
    fn test_move_places_x_for_first_joiner_and_o_for_others() {
        let players = vec![cid(1), cid(2), cid(3)];
        let mut state = TicTacToe::init(&players);

        play(&mut state, &players, &[0, 1, 2]);

        assert_eq!(state.board[0], Some(Mark::X));
        assert_eq!(state.board[1], Some(Mark::O));
        assert_eq!(state.board[2], Some(Mark::O));
    }

    #[test]
    fn test_move_turn_wraps_in_join_order() {
        let players = vec![cid(1), cid(2), cid(3)];
        let mut state = TicTacToe::init(&players);

        play(&mut state, &players, &[0, 1, 2]);

        assert_eq!(state.turn, cid(1));
        assert_eq!(state.round, 4);
    }

    #[test]
    fn test_move_out_of_turn_is_rejected_and_state_unchanged() {
        let (mut state, players) = two_player_game();
        let before = state.clone();

        let err = TicTacToe::apply_action(&mut state, &players, cid(2), mv(0)).unwrap_err();

        assert_eq!(err, "not your turn");
        assert_eq!(state, before);
    }

    #[test]
    fn test_move_on_taken_cell_is_rejected_and_state_unchanged() {
        let (mut state, players) = two_player_game();
        play(&mut state, &players, &[4]);
        let before = state.clone();

        assert!(TicTacToe::apply_action(&mut state, &players, cid(2), mv(4)).is_err());
        assert_eq!(state, before);
    }

    #[test]
    fn test_move_off_the_board_is_rejected() {
        let (mut state, players) = two_player_game();
        assert!(TicTacToe::apply_action(&mut state, &players, cid(1), mv(9)).is_err());
        assert_eq!(state.round, 1);
    }

    #[test]
    fn test_winning_move_finishes_and_scores_exactly_once() {
        let (mut state, players) = two_player_game();

        play(&mut state, &players, &[4, 0, 2, 1, 6]);

        assert_eq!(state.winner, Some(cid(1)));
        assert_eq!(state.game_state, GameStatus::Finished);
        assert_eq!(state.scores.get(&cid(1)), Some(&1));
        assert_eq!(state.scores.get(&cid(2)), Some(&0));
        // The winning move does not advance the turn or round.
        assert_eq!(state.turn, cid(1));
        assert_eq!(state.round, 5);
        assert_eq!(TicTacToe::outcome(&state), Some(Outcome::Win(cid(1))));
    }

    #[test]
    fn test_full_board_without_line_is_draw() {
        let (mut state, players) = two_player_game();

        // X O X / X O O / O X X
        play(&mut state, &players, &[0, 1, 2, 4, 3, 5, 7, 6, 8]);

        assert_eq!(state.winner, None);
        assert_eq!(state.game_state, GameStatus::Finished);
        assert_eq!(TicTacToe::outcome(&state), Some(Outcome::Draw));
    }

    #[test]
    fn test_move_after_finish_is_rejected() {
        let (mut state, players) = two_player_game();
        play(&mut state, &players, &[4, 0, 2, 1, 6]);

        let err = TicTacToe::apply_action(&mut state, &players, cid(1), mv(8)).unwrap_err();
        assert_eq!(err, "game is over");
    }

    #[test]
    fn test_outcome_is_none_while_playing() {
        let (state, _) = two_player_game();
        assert_eq!(TicTacToe::outcome(&state), None);
    }

    // =====================================================================
    // winning_line()
    // =====================================================================

    #[test]
    fn test_every_canonical_line_wins() {
        for line in WIN_LINES {
            let mut board: Board = [None; 9];
            for cell in line {
                board[cell] = Some(Mark::O);
            }
            assert_eq!(winning_line(&board), Some(line), "line {line:?}");
        }
    }

    #[test]
    fn test_mixed_marks_do_not_win() {
        let mut board: Board = [None; 9];
        board[0] = Some(Mark::X);
        board[1] = Some(Mark::X);
        board[2] = Some(Mark::O);
        assert_eq!(winning_line(&board), None);
    }

    #[test]
    fn test_non_line_triples_do_not_win() {
        // Three X's that don't form a line: 0, 1, 3.
        let mut board: Board = [None; 9];
        for cell in [0, 1, 3, 5, 7] {
            board[cell] = Some(Mark::X);
        }
        assert_eq!(winning_line(&board), None);
    }

    /// Every board of `None`/`X`/`O`, in base-3 order.
    fn all_boards() -> impl Iterator<Item = Board> {
        (0..3u32.pow(9)).map(|mut code| {
            let mut board: Board = [None; 9];
            for cell in &mut board {
                *cell = match code % 3 {
                    0 => None,
                    1 => Some(Mark::X),
                    _ => Some(Mark::O),
                };
                code /= 3;
            }
            board
        })
    }

    /// Reads the grid by (row, column) instead of through `WIN_LINES`.
    fn has_three_in_a_row(board: &Board) -> bool {
        let at = |row: usize, col: usize| board[row * 3 + col];
        let same = |cells: [Option<Mark>; 3]| {
            cells[0].is_some() && cells[0] == cells[1] && cells[1] == cells[2]
        };
        (0..3).any(|i| {
            same([at(i, 0), at(i, 1), at(i, 2)]) || same([at(0, i), at(1, i), at(2, i)])
        }) || same([at(0, 0), at(1, 1), at(2, 2)])
            || same([at(0, 2), at(1, 1), at(2, 0)])
    }

    #[test]
    fn test_winning_line_agrees_with_grid_scan_on_every_board() {
        let mut wins = 0;
        for board in all_boards() {
            let expected = has_three_in_a_row(&board);
            let found = winning_line(&board);
            assert_eq!(found.is_some(), expected, "board {board:?}");
            if let Some(line) = found {
                assert!(line.iter().all(|&c| board[c] == board[line[0]]));
                wins += 1;
            }
        }
        assert!(wins > 0);
    }

    #[test]
    fn test_every_full_board_without_line_ends_in_draw() {
        let players = vec![cid(1), cid(2)];
        let mut draws = 0;
        for board in all_boards() {
            if !board_full(&board) || has_three_in_a_row(&board) {
                continue;
            }
            // Leave the last cell open and let its owner fill it.
            let mut state = TicTacToe::init(&players);
            state.board = board;
            state.board[8] = None;
            let owner = if board[8] == Some(Mark::X) { cid(1) } else { cid(2) };
            state.turn = owner;

            TicTacToe::apply_action(&mut state, &players, owner, mv(8)).unwrap();

            assert_eq!(state.board, board);
            assert_eq!(TicTacToe::outcome(&state), Some(Outcome::Draw), "board {board:?}");
            draws += 1;
        }
        assert!(draws > 0);
    }

    // =====================================================================
    // Departures
    // =====================================================================

    #[test]
    fn test_leave_on_turn_passes_turn_to_next_joiner() {
        let players = vec![cid(1), cid(2), cid(3)];
        let mut state = TicTacToe::init(&players);
        play(&mut state, &players, &[0]); // turn: 2

        TicTacToe::on_player_leave(&mut state, &players, cid(2));

        assert_eq!(state.turn, cid(3));
    }

    #[test]
    fn test_leave_by_last_joiner_on_turn_wraps_to_first() {
        let players = vec![cid(1), cid(2), cid(3)];
        let mut state = TicTacToe::init(&players);
        play(&mut state, &players, &[0, 1]); // turn: 3

        TicTacToe::on_player_leave(&mut state, &players, cid(3));

        assert_eq!(state.turn, cid(1));
    }

    #[test]
    fn test_leave_off_turn_keeps_turn() {
        let players = vec![cid(1), cid(2), cid(3)];
        let mut state = TicTacToe::init(&players);

        TicTacToe::on_player_leave(&mut state, &players, cid(3));

        assert_eq!(state.turn, cid(1));
    }

    #[test]
    fn test_end_without_winner_is_draw() {
        let (mut state, _) = two_player_game();
        TicTacToe::end_without_winner(&mut state);
        assert_eq!(TicTacToe::outcome(&state), Some(Outcome::Draw));
    }
}
