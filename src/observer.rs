//! Progress and trace callbacks for move selection
//!
//! The engine reports each scored root candidate. In verbose mode the
//! searcher also reports every child it enters and every cutoff. All
//! methods default to doing nothing, so an observer only implements what it
//! cares about.

use tracing::trace;

use crate::board::Move;

/// Receives search events. Shared across rayon workers in parallel mode.
pub trait SearchObserver: Send + Sync {
    /// A root candidate finished scoring; `done` of `total` are complete.
    fn on_candidate_scored(&self, _done: usize, _total: usize) {}

    /// The searcher is about to enter the child reached by `mv`.
    fn on_node(&self, _mv: Move, _depth: u32) {}

    /// Alpha-beta cut off the remaining siblings after `mv`.
    fn on_prune(&self, _mv: Move, _depth: u32) {}
}

/// Ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl SearchObserver for NoopObserver {}

/// Forwards events to `tracing` at trace level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl SearchObserver for TracingObserver {
    fn on_candidate_scored(&self, done: usize, total: usize) {
        trace!(done, total, "candidate scored");
    }

    fn on_node(&self, mv: Move, depth: u32) {
        trace!(%mv, depth, "visit");
    }

    fn on_prune(&self, mv: Move, depth: u32) {
        trace!(%mv, depth, "prune");
    }
}
