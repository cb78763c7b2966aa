//! Score constants
//!
//! X maximizes and O minimizes. Finished games score exactly `X_WIN`,
//! `O_WIN` or `DRAW`; heuristic cutoffs land anywhere in
//! `[-MAX_HEURISTIC, MAX_HEURISTIC]`.

/// X has won the game
pub const X_WIN: i32 = 1;
/// O has won the game
pub const O_WIN: i32 = -1;
/// Every sub-board resolved, no meta line
pub const DRAW: i32 = 0;

/// Largest heuristic magnitude: all nine sub-boards won by one side
pub const MAX_HEURISTIC: i32 = 9;

/// Sentinel for alpha-beta bounds, outside every reachable score
pub const INF: i32 = MAX_HEURISTIC + 1;

/// Value-only definiteness test for scores whose origin is unknown
/// (persisted records without a definiteness flag).
///
/// A win for either side is taken as exact. A zero may be a heuristic
/// guess, so it never is.
#[inline]
pub fn is_definite_score(score: i32) -> bool {
    score == X_WIN || score == O_WIN
}
