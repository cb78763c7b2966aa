//! Win and draw detection for sub-boards and the meta-board
//!
//! The same 3x3 line check serves both levels: a sub-board is checked over
//! its cells, the meta-board over `meta_view`.

use crate::board::{Cell, SubBoard, BOARD_SIZE};
use crate::eval::{DRAW, O_WIN, X_WIN};

/// The 8 winning lines of a 3x3 board
pub const LINES: [[usize; 3]; 8] = [
    [0, 1, 2], // Rows
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6], // Columns
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8], // Diagonals
    [2, 4, 6],
];

/// Indices of the first completed line, if any.
///
/// Only `X` and `O` complete a line; three `Dead` cells in a row are just
/// three drawn boards.
pub fn winning_line(cells: &[Cell; BOARD_SIZE]) -> Option<[usize; 3]> {
    LINES.iter().copied().find(|&[a, b, c]| {
        cells[a].is_mark() && cells[a] == cells[b] && cells[b] == cells[c]
    })
}

/// Mark owning a completed line
#[inline]
pub fn resolve_winner(cells: &[Cell; BOARD_SIZE]) -> Option<Cell> {
    winning_line(cells).map(|[a, _, _]| cells[a])
}

/// No empty cell left
#[inline]
pub fn is_full(cells: &[Cell; BOARD_SIZE]) -> bool {
    !cells.contains(&Cell::Empty)
}

/// Won or full
#[inline]
pub fn is_resolved(cells: &[Cell; BOARD_SIZE]) -> bool {
    is_full(cells) || resolve_winner(cells).is_some()
}

/// Normalize a finished sub-board: a won board becomes nine copies of the
/// winner, a full board with no line becomes nine `Dead` cells.
///
/// Returns the resolved value, or `None` while the board is still open.
pub fn settle(cells: &mut SubBoard) -> Option<Cell> {
    let resolved = match resolve_winner(cells) {
        Some(winner) => winner,
        None if is_full(cells) => Cell::Dead,
        None => return None,
    };
    *cells = [resolved; BOARD_SIZE];
    Some(resolved)
}

/// Resolved value of every sub-board: winner, `Dead` when drawn, `Empty`
/// while open.
pub fn meta_view(boards: &[SubBoard; BOARD_SIZE]) -> [Cell; BOARD_SIZE] {
    let mut meta = [Cell::Empty; BOARD_SIZE];
    for (slot, board) in meta.iter_mut().zip(boards.iter()) {
        *slot = match resolve_winner(board) {
            Some(winner) => winner,
            None if is_full(board) => Cell::Dead,
            None => Cell::Empty,
        };
    }
    meta
}

/// Winner of the whole game
#[inline]
pub fn overall_winner(boards: &[SubBoard; BOARD_SIZE]) -> Option<Cell> {
    resolve_winner(&meta_view(boards))
}

/// Meta-level winning line, for highlighting
#[inline]
pub fn meta_winning_line(boards: &[SubBoard; BOARD_SIZE]) -> Option<[usize; 3]> {
    winning_line(&meta_view(boards))
}

/// Exact score of a finished game: `X_WIN`, `O_WIN` or `DRAW` when every
/// sub-board is resolved without a meta line. `None` while play continues.
pub fn terminal_score(boards: &[SubBoard; BOARD_SIZE]) -> Option<i32> {
    let meta = meta_view(boards);
    match resolve_winner(&meta) {
        Some(Cell::X) => Some(X_WIN),
        Some(_) => Some(O_WIN),
        None if is_full(&meta) => Some(DRAW),
        None => None,
    }
}
