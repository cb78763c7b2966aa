//! Search module for ultimate tic-tac-toe
//!
//! Contains:
//! - Zobrist hashing for state fingerprints
//! - Transposition table with definiteness-aware read and write policies
//! - Minimax search with alpha-beta pruning

pub mod alphabeta;
pub mod tt;
pub mod zobrist;

pub use alphabeta::{SearchResult, SearchStats, Searcher};
pub use tt::{MemoEntry, MemoMap, Origin, TTStats, TranspositionTable, DEFAULT_SHARDS};
pub use zobrist::{Fingerprint, ZobristTable, ZOBRIST};
