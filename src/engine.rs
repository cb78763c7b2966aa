//! Move selection on top of the searcher
//!
//! Every legal move is scored by a full-window search of the resulting
//! state. The best score wins; when several moves share it, one of them is
//! picked at random (seedable for reproducible games).
//!
//! # Example
//!
//! ```
//! use uttt::{Engine, EngineConfig, GameState, NoopObserver};
//!
//! let config = EngineConfig {
//!     max_depth: Some(1),
//!     seed: Some(42),
//!     ..EngineConfig::default()
//! };
//! let mut engine = Engine::new(config).unwrap();
//!
//! let state = GameState::new();
//! let best = engine.choose_move(&state, &NoopObserver).unwrap();
//! assert!(state.is_legal(best.choice));
//! println!("Play {} (score {})", best.choice, best.score);
//! ```

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rayon::prelude::*;
use tracing::{debug, trace, warn};

use crate::board::{Cell, GameState, Move};
use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::eval::INF;
use crate::observer::SearchObserver;
use crate::search::{SearchResult, SearchStats, Searcher, TTStats, TranspositionTable};
use crate::store::CacheStore;

/// Outcome of one move selection.
#[derive(Debug, Clone)]
pub struct BestMoves {
    /// Best score from X's perspective
    pub score: i32,
    /// Whether some best move was proven exact
    pub definite: bool,
    /// Every move achieving `score`, grouped as sub-board → cells
    pub tied: BTreeMap<u8, Vec<u8>>,
    /// The move picked from `tied`
    pub choice: Move,
    /// Score of every candidate in generation order
    pub scored: Vec<(Move, i32)>,
    /// Merged statistics of all candidate searches
    pub stats: SearchStats,
    /// Time taken in milliseconds
    pub elapsed_ms: u64,
}

impl BestMoves {
    /// Tied moves in canonical order
    pub fn tied_moves(&self) -> impl Iterator<Item = Move> + '_ {
        self.tied
            .iter()
            .flat_map(|(&board, cells)| cells.iter().map(move |&cell| Move::new(board, cell)))
    }

    pub fn is_tied(&self, mv: Move) -> bool {
        self.tied
            .get(&mv.board)
            .is_some_and(|cells| cells.contains(&mv.cell))
    }

    pub fn tie_count(&self) -> usize {
        self.tied.values().map(Vec::len).sum()
    }
}

/// Move-selection engine.
///
/// Owns a [`Searcher`] (and through it the transposition table, which
/// persists across calls) plus the tie-breaking RNG.
pub struct Engine {
    config: EngineConfig,
    searcher: Searcher,
    rng: SmallRng,
}

impl Engine {
    /// Create an engine with a fresh table.
    ///
    /// # Errors
    ///
    /// `Error::InvalidConfiguration` if the config does not validate.
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let table = Arc::new(TranspositionTable::with_shards(config.shards));
        Ok(Self::build(config, table))
    }

    /// Create an engine over an existing table, e.g. one shared with
    /// another engine.
    pub fn with_table(config: EngineConfig, table: Arc<TranspositionTable>) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config, table))
    }

    fn build(config: EngineConfig, table: Arc<TranspositionTable>) -> Self {
        let searcher = Searcher::with_table(table, config.max_depth).with_verbose(config.verbose);
        let rng = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        Self {
            config,
            searcher,
            rng,
        }
    }

    #[inline]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[inline]
    pub fn searcher(&self) -> &Searcher {
        &self.searcher
    }

    /// Score every legal move and pick one of the best.
    ///
    /// `maximizing` is true when choosing for X.
    ///
    /// # Errors
    ///
    /// `Error::GameOver` if the state is terminal or has no legal moves.
    pub fn best_moves(
        &mut self,
        state: &GameState,
        maximizing: bool,
        observer: &dyn SearchObserver,
    ) -> Result<BestMoves> {
        if state.is_terminal() {
            return Err(Error::GameOver);
        }
        let moves = state.legal_moves();
        if moves.is_empty() {
            return Err(Error::GameOver);
        }

        let start = Instant::now();
        let total = moves.len();
        debug!(
            candidates = total,
            max_depth = ?self.config.max_depth,
            parallel = self.config.parallel,
            "selecting move"
        );

        let searcher = &self.searcher;
        let done = AtomicUsize::new(0);
        let score_move = |mv: Move| -> (Move, SearchResult) {
            let child = state.apply(mv);
            let result = searcher.search_observed(&child, 0, !maximizing, -INF, INF, observer);
            let finished = done.fetch_add(1, Ordering::Relaxed) + 1;
            observer.on_candidate_scored(finished, total);
            trace!(%mv, score = result.score, definite = result.definite, "candidate");
            (mv, result)
        };

        let results: Vec<(Move, SearchResult)> = if self.config.parallel {
            moves.par_iter().map(|&mv| score_move(mv)).collect()
        } else {
            moves.iter().map(|&mv| score_move(mv)).collect()
        };

        let mut stats = SearchStats::default();
        for (_, result) in &results {
            stats.merge(&result.stats);
        }

        let score = results
            .iter()
            .map(|(_, r)| r.score)
            .reduce(|a, b| if maximizing { a.max(b) } else { a.min(b) })
            .ok_or(Error::GameOver)?;

        let best: Vec<&(Move, SearchResult)> =
            results.iter().filter(|(_, r)| r.score == score).collect();
        let definite = best.iter().any(|(_, r)| r.definite);
        let tied_moves: Vec<Move> = best.iter().map(|(mv, _)| *mv).collect();
        let choice = *tied_moves.choose(&mut self.rng).ok_or(Error::GameOver)?;

        let mut tied: BTreeMap<u8, Vec<u8>> = BTreeMap::new();
        for mv in &tied_moves {
            tied.entry(mv.board).or_default().push(mv.cell);
        }

        let elapsed_ms = start.elapsed().as_millis() as u64;
        debug!(
            score,
            definite,
            ties = tied_moves.len(),
            %choice,
            nodes = stats.nodes,
            elapsed_ms,
            "move selected"
        );

        Ok(BestMoves {
            score,
            definite,
            tied,
            choice,
            scored: results.iter().map(|(mv, r)| (*mv, r.score)).collect(),
            stats,
            elapsed_ms,
        })
    }

    /// [`Engine::best_moves`] for the side to move.
    pub fn choose_move(
        &mut self,
        state: &GameState,
        observer: &dyn SearchObserver,
    ) -> Result<BestMoves> {
        self.best_moves(state, state.to_move() == Cell::X, observer)
    }

    /// Let the engine play both sides until the game ends.
    ///
    /// `on_move` sees each position before its move is played.
    pub fn play_out(
        &mut self,
        mut state: GameState,
        observer: &dyn SearchObserver,
        mut on_move: impl FnMut(&GameState, &BestMoves),
    ) -> Result<GameState> {
        while !state.is_terminal() {
            let best = self.choose_move(&state, observer)?;
            on_move(&state, &best);
            state = state.play(best.choice)?;
        }
        Ok(state)
    }

    /// Merge a persisted table into the live one; returns entries loaded.
    pub fn load_cache(&self, store: &dyn CacheStore) -> usize {
        let report = store.load();
        if report.skipped > 0 {
            warn!(skipped = report.skipped, "ignored malformed cache records");
        }
        self.searcher.table().extend(&report.entries);
        report.entries.len()
    }

    /// Persist the live table; returns entries written.
    pub fn save_cache(&self, store: &dyn CacheStore) -> Result<usize> {
        let snapshot = self.searcher.table().snapshot();
        store.save(&snapshot)?;
        Ok(snapshot.len())
    }

    /// Drop every cached evaluation.
    pub fn clear_cache(&self) {
        self.searcher.clear_tt();
    }

    #[must_use]
    pub fn tt_stats(&self) -> TTStats {
        self.searcher.tt_stats()
    }
}

impl Default for Engine {
    fn default() -> Self {
        let config = EngineConfig::default();
        let table = Arc::new(TranspositionTable::with_shards(config.shards));
        Self::build(config, table)
    }
}
