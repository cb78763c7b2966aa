//! Ultimate tic-tac-toe search engine
//!
//! Nine 3x3 sub-boards form a 3x3 meta-board:
//! - A move in cell `c` sends the opponent to sub-board `c`
//! - If that sub-board is already won or full, the opponent may play anywhere
//! - Winning a sub-board claims its square on the meta-board
//! - Three claimed squares in a line win the game
//!
//! # Architecture
//!
//! The engine is organized into several modules:
//! - [`board`]: Game state, moves, legal sets and text notation
//! - [`rules`]: Line detection, sub-board settlement and terminal scoring
//! - [`eval`]: Score constants and the material heuristic
//! - [`search`]: Zobrist fingerprints, transposition table, alpha-beta search
//! - [`engine`]: Move selection over all legal moves, optionally in parallel
//! - [`store`]: Bulk persistence of the transposition table
//! - [`config`], [`observer`], [`error`]: configuration, callbacks and errors
//!
//! # Quick Start
//!
//! ```
//! use uttt::{Engine, EngineConfig, GameState, Move, NoopObserver};
//!
//! let mut engine = Engine::new(EngineConfig {
//!     max_depth: Some(2),
//!     ..EngineConfig::default()
//! })
//! .unwrap();
//!
//! let state = GameState::new().play(Move::new(4, 4)).unwrap();
//! let best = engine.choose_move(&state, &NoopObserver).unwrap();
//! let state = state.play(best.choice).unwrap();
//! println!("{state}");
//! ```
//!
//! # Scores
//!
//! Scores are from X's perspective: `+1` X wins, `-1` O wins, `0` draw.
//! Depth-limited searches fall back to the number of sub-boards won by X
//! minus those won by O, in `[-9, 9]`.

pub mod board;
pub mod config;
pub mod engine;
pub mod error;
pub mod eval;
pub mod observer;
pub mod rules;
pub mod search;
pub mod store;

// Re-export commonly used types for convenience
pub use board::{BoardSet, Cell, GameState, Move, BOARD_SIZE};
pub use config::EngineConfig;
pub use engine::{BestMoves, Engine};
pub use error::{Error, Result};
pub use observer::{NoopObserver, SearchObserver, TracingObserver};
pub use search::{Fingerprint, Searcher, TranspositionTable};
