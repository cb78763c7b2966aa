//! Composite game state: nine sub-boards, the legal set and the side to move

use std::fmt;
use std::str::FromStr;

use super::bitboard::BoardSet;
use super::{Cell, Move, BOARD_SIZE, TOTAL_CELLS};
use crate::error::{Error, Result};
use crate::rules::{is_resolved, meta_view, overall_winner, settle, terminal_score};
use crate::search::{Fingerprint, ZOBRIST};

/// One 3x3 sub-board, row-major
pub type SubBoard = [Cell; BOARD_SIZE];

/// Full game state.
///
/// Resolved sub-boards are always settled (filled uniformly with the winner
/// or with `Cell::Dead`), and the legal set is either every board or the
/// single unresolved board the previous move pointed at.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GameState {
    boards: [SubBoard; BOARD_SIZE],
    legal: BoardSet,
    to_move: Cell,
}

impl GameState {
    /// Empty board, free choice, X to move
    pub fn new() -> Self {
        Self {
            boards: [[Cell::Empty; BOARD_SIZE]; BOARD_SIZE],
            legal: BoardSet::all(),
            to_move: Cell::X,
        }
    }

    /// Build a state from raw parts, settling finished sub-boards.
    ///
    /// # Errors
    ///
    /// `Error::InvalidState` if the mover is not a mark, a sub-board mixes
    /// `Dead` cells into an unfinished board, or the legal set is neither
    /// every board nor a single unresolved board.
    pub fn from_parts(
        mut boards: [SubBoard; BOARD_SIZE],
        legal: BoardSet,
        to_move: Cell,
    ) -> Result<Self> {
        if !to_move.is_mark() {
            return Err(Error::InvalidState {
                reason: format!("side to move must be X or O, got '{to_move}'"),
            });
        }
        for (idx, board) in boards.iter_mut().enumerate() {
            settle(board);
            // Dead only ever fills a whole drawn board
            if board.contains(&Cell::Dead) && board.iter().any(|&c| c != Cell::Dead) {
                return Err(Error::InvalidState {
                    reason: format!("board {idx} is partly dead"),
                });
            }
        }
        match legal.only() {
            _ if legal.is_all() => {}
            Some(target) if !is_resolved(&boards[target]) => {}
            Some(target) => {
                return Err(Error::InvalidState {
                    reason: format!("legal board {target} is already resolved"),
                });
            }
            None => {
                return Err(Error::InvalidState {
                    reason: format!("legal set '{legal}' must be one board or all boards"),
                });
            }
        }
        Ok(Self {
            boards,
            legal,
            to_move,
        })
    }

    #[inline]
    pub fn boards(&self) -> &[SubBoard; BOARD_SIZE] {
        &self.boards
    }

    #[inline]
    pub fn board(&self, idx: usize) -> &SubBoard {
        &self.boards[idx]
    }

    /// Cell at a move's coordinates
    #[inline]
    pub fn get(&self, mv: Move) -> Cell {
        self.boards[mv.board as usize][mv.cell as usize]
    }

    #[inline]
    pub fn legal(&self) -> BoardSet {
        self.legal
    }

    #[inline]
    pub fn to_move(&self) -> Cell {
        self.to_move
    }

    /// Meta-board: one resolved value per sub-board
    #[inline]
    pub fn meta(&self) -> [Cell; BOARD_SIZE] {
        meta_view(&self.boards)
    }

    #[inline]
    pub fn winner(&self) -> Option<Cell> {
        overall_winner(&self.boards)
    }

    /// +1 / -1 / 0 once the game is over
    #[inline]
    pub fn terminal_score(&self) -> Option<i32> {
        terminal_score(&self.boards)
    }

    #[inline]
    pub fn is_terminal(&self) -> bool {
        self.terminal_score().is_some()
    }

    /// Number of empty cells left anywhere
    pub fn empty_count(&self) -> usize {
        self.boards
            .iter()
            .flatten()
            .filter(|&&c| c == Cell::Empty)
            .count()
    }

    /// Legal moves in canonical order: board ascending, then cell ascending.
    ///
    /// Resolved boards are settled and have no empty cells, so free choice
    /// skips them without a separate check.
    pub fn legal_moves(&self) -> Vec<Move> {
        let mut moves = Vec::with_capacity(TOTAL_CELLS);
        for board in self.legal.iter() {
            for (cell, &value) in self.boards[board].iter().enumerate() {
                if value == Cell::Empty {
                    moves.push(Move::new(board as u8, cell as u8));
                }
            }
        }
        moves
    }

    #[inline]
    pub fn is_legal(&self, mv: Move) -> bool {
        self.validate_move(mv).is_ok()
    }

    /// Check a move coming from outside the engine.
    ///
    /// # Errors
    ///
    /// Returns the first rule the move breaks.
    pub fn validate_move(&self, mv: Move) -> Result<()> {
        if !Move::is_valid(mv.board as usize, mv.cell as usize) {
            return Err(Error::OutOfRange {
                board: mv.board,
                cell: mv.cell,
            });
        }
        if self.is_terminal() {
            return Err(Error::GameOver);
        }
        if !self.legal.contains(mv.board as usize) {
            return Err(Error::BoardNotPlayable {
                board: mv.board,
                legal: self.legal.to_string(),
            });
        }
        if self.get(mv) != Cell::Empty {
            return Err(Error::OccupiedCell {
                board: mv.board,
                cell: mv.cell,
            });
        }
        Ok(())
    }

    /// Validated move application for input boundaries
    pub fn play(&self, mv: Move) -> Result<GameState> {
        self.validate_move(mv)?;
        Ok(self.apply(mv))
    }

    /// Apply a move known to be legal, returning the successor state.
    ///
    /// The played sub-board is settled first, so the legal set for the
    /// opponent sees its final status.
    #[must_use]
    pub fn apply(&self, mv: Move) -> GameState {
        let mut next = self.clone();
        let board = mv.board as usize;
        next.boards[board][mv.cell as usize] = self.to_move;
        settle(&mut next.boards[board]);
        next.legal = next_legal_set(&next.boards, mv.cell as usize);
        next.to_move = self.to_move.opponent();
        next
    }

    /// Zobrist fingerprint of this state
    #[inline]
    pub fn fingerprint(&self) -> Fingerprint {
        ZOBRIST.hash(self)
    }

    /// Compact text form: `<81 cells>/<legal>/<mover>`
    pub fn to_notation(&self) -> String {
        let mut s = String::with_capacity(TOTAL_CELLS + 14);
        for cell in self.boards.iter().flatten() {
            s.push(cell.to_char());
        }
        s.push('/');
        s.push_str(&self.legal.to_string());
        s.push('/');
        s.push(self.to_move.to_char());
        s
    }
}

/// Legal set after a move into cell `target`: that board, or free choice
/// when it is already resolved.
#[inline]
pub fn next_legal_set(boards: &[SubBoard; BOARD_SIZE], target: usize) -> BoardSet {
    if is_resolved(&boards[target]) {
        BoardSet::all()
    } else {
        BoardSet::single(target)
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for GameState {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let err = |reason: String| Error::ParseState {
            input: s.to_string(),
            reason,
        };

        let parts: Vec<&str> = s.trim().split('/').collect();
        let [cells, legal, mover] = parts.as_slice() else {
            return Err(err("expected '<cells>/<legal>/<mover>'".to_string()));
        };

        let cells: Vec<char> = cells.chars().collect();
        if cells.len() != TOTAL_CELLS {
            return Err(err(format!(
                "expected {TOTAL_CELLS} cells, got {}",
                cells.len()
            )));
        }
        let mut boards = [[Cell::Empty; BOARD_SIZE]; BOARD_SIZE];
        for (idx, &c) in cells.iter().enumerate() {
            let cell = Cell::from_char(c)
                .ok_or_else(|| err(format!("invalid cell '{c}' at position {idx}")))?;
            let mv = Move::from_index(idx);
            boards[mv.board as usize][mv.cell as usize] = cell;
        }

        let legal = if *legal == "*" {
            BoardSet::all()
        } else {
            legal
                .chars()
                .map(|c| {
                    c.to_digit(10)
                        .map(|d| d as usize)
                        .filter(|&d| d < BOARD_SIZE)
                        .ok_or_else(|| err(format!("invalid legal board '{c}'")))
                })
                .collect::<Result<BoardSet>>()?
        };
        if legal.is_empty() {
            return Err(err("legal set is empty".to_string()));
        }

        let to_move = match *mover {
            "X" | "x" => Cell::X,
            "O" | "o" => Cell::O,
            other => return Err(err(format!("invalid side to move '{other}'"))),
        };

        GameState::from_parts(boards, legal, to_move).map_err(|e| err(e.to_string()))
    }
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..BOARD_SIZE {
            if row > 0 && row % 3 == 0 {
                writeln!(f, "------+-------+------")?;
            }
            for col in 0..BOARD_SIZE {
                if col > 0 && col % 3 == 0 {
                    write!(f, " |")?;
                }
                let board = (row / 3) * 3 + col / 3;
                let cell = (row % 3) * 3 + col % 3;
                if col > 0 {
                    write!(f, " ")?;
                }
                write!(f, "{}", self.boards[board][cell])?;
            }
            writeln!(f)?;
        }
        write!(f, "legal: {}  to move: {}", self.legal, self.to_move)
    }
}
