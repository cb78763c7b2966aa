//! Game rules for ultimate tic-tac-toe
//!
//! This module implements the rule set shared by both board levels:
//! - Line detection on a 3x3 grid
//! - Sub-board settlement (won or drawn boards are frozen)
//! - Meta-board view, overall winner and terminal scoring

pub mod win;

// Re-exports for convenient access
pub use win::{
    is_full, is_resolved, meta_view, meta_winning_line, overall_winner, resolve_winner, settle,
    terminal_score, winning_line, LINES,
};
