//! Static evaluation for depth-limited search
//!
//! Material only: each sub-board won by X counts +1, each won by O counts
//! -1. Drawn and open boards count nothing.

use crate::board::{Cell, SubBoard, BOARD_SIZE};
use crate::rules::resolve_winner;

/// Evaluate the boards from X's perspective.
///
/// The result is always in `[-MAX_HEURISTIC, MAX_HEURISTIC]`.
#[must_use]
pub fn heuristic(boards: &[SubBoard; BOARD_SIZE]) -> i32 {
    boards
        .iter()
        .map(|board| match resolve_winner(board) {
            Some(Cell::X) => 1,
            Some(Cell::O) => -1,
            _ => 0,
        })
        .sum()
}
