//! Evaluation module for ultimate tic-tac-toe positions
//!
//! Exact scores for finished games and the material heuristic used when
//! a depth-limited search stops before the game ends.

pub mod heuristic;
pub mod score;

pub use heuristic::heuristic;
pub use score::{is_definite_score, DRAW, INF, MAX_HEURISTIC, O_WIN, X_WIN};
