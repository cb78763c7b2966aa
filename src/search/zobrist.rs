//! Zobrist hashing for state fingerprints
//!
//! Every (cell, value) pair, every legal-board index and the side to move
//! get a fixed pseudo-random key; a state's fingerprint is the XOR of the
//! keys it contains. The keys come from a fixed seed, so fingerprints are
//! identical across runs and can be persisted.
//!
//! # Example
//!
//! ```
//! use uttt::board::{GameState, Move};
//!
//! let state = GameState::new();
//! let next = state.apply(Move::new(4, 4));
//!
//! assert_ne!(state.fingerprint(), next.fingerprint());
//! assert_eq!(next.fingerprint(), state.apply(Move::new(4, 4)).fingerprint());
//! ```

use std::fmt;
use std::str::FromStr;

use lazy_static::lazy_static;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::board::{Cell, GameState, Move, BOARD_SIZE, TOTAL_CELLS};

lazy_static! {
    /// Process-wide key table
    pub static ref ZOBRIST: ZobristTable = ZobristTable::new();
}

/// Canonical 64-bit identity of a game state.
///
/// Rendered as 16 lowercase hex digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(pub u64);

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

impl FromStr for Fingerprint {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        u64::from_str_radix(s, 16).map(Fingerprint)
    }
}

impl Serialize for Fingerprint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Fingerprint {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Zobrist key table.
pub struct ZobristTable {
    /// Keys per cell for X, O and Dead (Empty contributes nothing)
    cells: [[u64; 3]; TOTAL_CELLS],
    /// Keys per legal sub-board index
    legal: [u64; BOARD_SIZE],
    /// Key XORed when X is to move
    x_to_move: u64,
}

impl ZobristTable {
    /// Create a table with deterministic pseudo-random keys.
    ///
    /// Same seed = same table = reproducible fingerprints.
    #[must_use]
    pub fn new() -> Self {
        // Knuth's MMIX LCG constants
        let mut seed: u64 = 0x1234_5678_9ABC_DEF0;
        let mut next_rand = || {
            seed = seed
                .wrapping_mul(6_364_136_223_846_793_005)
                .wrapping_add(1_442_695_040_888_963_407);
            // splitmix64 finalizer
            let mut z = seed;
            z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
            z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
            z ^ (z >> 31)
        };

        let mut cells = [[0u64; 3]; TOTAL_CELLS];
        for keys in cells.iter_mut() {
            for key in keys.iter_mut() {
                *key = next_rand();
            }
        }

        let mut legal = [0u64; BOARD_SIZE];
        for key in legal.iter_mut() {
            *key = next_rand();
        }

        Self {
            cells,
            legal,
            x_to_move: next_rand(),
        }
    }

    #[inline]
    fn cell_key(&self, idx: usize, cell: Cell) -> u64 {
        match cell {
            Cell::Empty => 0,
            Cell::X => self.cells[idx][0],
            Cell::O => self.cells[idx][1],
            Cell::Dead => self.cells[idx][2],
        }
    }

    /// Fingerprint of a full state: cells, legal set and side to move.
    #[must_use]
    pub fn hash(&self, state: &GameState) -> Fingerprint {
        let mut h = 0u64;

        for (board, cells) in state.boards().iter().enumerate() {
            for (cell, &value) in cells.iter().enumerate() {
                let idx = Move::new(board as u8, cell as u8).to_index();
                h ^= self.cell_key(idx, value);
            }
        }

        for board in state.legal().iter() {
            h ^= self.legal[board];
        }

        if state.to_move() == Cell::X {
            h ^= self.x_to_move;
        }

        Fingerprint(h)
    }
}

impl Default for ZobristTable {
    fn default() -> Self {
        Self::new()
    }
}
