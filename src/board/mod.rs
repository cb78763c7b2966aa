//! Board representation for ultimate tic-tac-toe

pub mod bitboard;
pub mod board;


use std::fmt;
use std::str::FromStr;

use crate::error::Error;

// Re-exports
pub use bitboard::BoardSet;
pub use board::{GameState, SubBoard};

/// Sub-boards on the meta-board, and cells per sub-board
pub const BOARD_SIZE: usize = 9;
pub const TOTAL_CELLS: usize = BOARD_SIZE * BOARD_SIZE; // 81

/// Cell contents.
///
/// `Dead` fills a sub-board that finished drawn, so the meta-board view
/// never mistakes it for an open board or for either player's win.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Cell {
    Empty,
    X,
    O,
    Dead,
}

impl Cell {
    /// Get opponent mark
    #[inline]
    pub fn opponent(self) -> Cell {
        match self {
            Cell::X => Cell::O,
            Cell::O => Cell::X,
            other => other,
        }
    }

    /// True for `X` and `O`
    #[inline]
    pub fn is_mark(self) -> bool {
        matches!(self, Cell::X | Cell::O)
    }

    #[inline]
    pub fn to_char(self) -> char {
        match self {
            Cell::Empty => '.',
            Cell::X => 'X',
            Cell::O => 'O',
            Cell::Dead => '-',
        }
    }

    #[inline]
    pub fn from_char(c: char) -> Option<Cell> {
        match c {
            '.' => Some(Cell::Empty),
            'X' | 'x' => Some(Cell::X),
            'O' | 'o' => Some(Cell::O),
            '-' => Some(Cell::Dead),
            _ => None,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

/// A move: one cell inside one sub-board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Move {
    pub board: u8,
    pub cell: u8,
}

impl Move {
    #[inline]
    pub fn new(board: u8, cell: u8) -> Self {
        debug_assert!((board as usize) < BOARD_SIZE && (cell as usize) < BOARD_SIZE);
        Self { board, cell }
    }

    #[inline]
    pub fn is_valid(board: usize, cell: usize) -> bool {
        board < BOARD_SIZE && cell < BOARD_SIZE
    }

    /// Flattened index into the 81 cells, sub-board major
    #[inline]
    pub fn to_index(self) -> usize {
        self.board as usize * BOARD_SIZE + self.cell as usize
    }

    #[inline]
    pub fn from_index(idx: usize) -> Self {
        Self {
            board: (idx / BOARD_SIZE) as u8,
            cell: (idx % BOARD_SIZE) as u8,
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.board, self.cell)
    }
}

/// Parses `"b,c"`, `"b c"` or `"(b, c)"`.
impl FromStr for Move {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || Error::ParseMove {
            input: s.to_string(),
        };
        let trimmed = s.trim().trim_start_matches('(').trim_end_matches(')');
        let mut parts = trimmed
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|p| !p.is_empty());
        let board: usize = parts.next().ok_or_else(err)?.parse().map_err(|_| err())?;
        let cell: usize = parts.next().ok_or_else(err)?.parse().map_err(|_| err())?;
        if parts.next().is_some() || !Move::is_valid(board, cell) {
            return Err(err());
        }
        Ok(Move::new(board as u8, cell as u8))
    }
}
