//! Minimax search with alpha-beta pruning and a shared transposition table
//!
//! X maximizes, O minimizes. Scores are always from X's perspective, so no
//! negation happens between plies.
//!
//! Every node result carries a definiteness flag next to its score. A
//! definite result is the exact game value of the node; anything touched by
//! a heuristic cutoff or by pruning is not. Only definite results are ever
//! read back from the table, which keeps cached and uncached searches in
//! agreement.
//!
//! # Example
//!
//! ```
//! use uttt::board::GameState;
//! use uttt::eval::INF;
//! use uttt::search::Searcher;
//!
//! let searcher = Searcher::new(Some(2));
//! let state = GameState::new();
//!
//! let result = searcher.search(&state, 0, true, -INF, INF);
//! assert!(result.score.abs() <= 9);
//! assert!(!result.definite);
//! ```

use std::sync::Arc;

use crate::board::GameState;
use crate::eval::{heuristic, INF, O_WIN, X_WIN};
use crate::observer::SearchObserver;

use super::{Origin, TTStats, TranspositionTable};

/// Search statistics for diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Nodes entered (including cache hits)
    pub nodes: u64,
    /// Transposition table probes
    pub tt_probes: u64,
    /// Probes that answered the node outright
    pub tt_hits: u64,
    /// Alpha-beta cutoffs
    pub cutoffs: u64,
    /// Finished games reached
    pub terminal_nodes: u64,
    /// Nodes scored by the heuristic
    pub heuristic_leaves: u64,
}

impl SearchStats {
    /// TT hit rate in percent
    pub fn tt_hit_rate(&self) -> f64 {
        if self.tt_probes == 0 {
            0.0
        } else {
            self.tt_hits as f64 / self.tt_probes as f64 * 100.0
        }
    }

    /// Merge another stats into this one (for combining worker stats)
    pub fn merge(&mut self, other: &SearchStats) {
        self.nodes += other.nodes;
        self.tt_probes += other.tt_probes;
        self.tt_hits += other.tt_hits;
        self.cutoffs += other.cutoffs;
        self.terminal_nodes += other.terminal_nodes;
        self.heuristic_leaves += other.heuristic_leaves;
    }
}

/// Result of searching one state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchResult {
    /// Score from X's perspective
    pub score: i32,
    /// Exact game value rather than an estimate or a bound
    pub definite: bool,
    /// Search diagnostics
    pub stats: SearchStats,
}

/// Score of one node plus whether it is exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Eval {
    score: i32,
    definite: bool,
}

impl Eval {
    #[inline]
    fn exact(score: i32) -> Self {
        Self {
            score,
            definite: true,
        }
    }

    #[inline]
    fn estimate(score: i32) -> Self {
        Self {
            score,
            definite: false,
        }
    }
}

// =============================================================================
// WorkerSearcher: per-call search state
// =============================================================================

/// One recursive search. Borrows the shared table and keeps its own
/// counters, so several workers can run against the same table at once.
struct WorkerSearcher<'a> {
    tt: &'a TranspositionTable,
    max_depth: Option<u32>,
    /// Present only in verbose mode
    observer: Option<&'a dyn SearchObserver>,
    stats: SearchStats,
}

impl<'a> WorkerSearcher<'a> {
    fn new(
        tt: &'a TranspositionTable,
        max_depth: Option<u32>,
        observer: Option<&'a dyn SearchObserver>,
    ) -> Self {
        Self {
            tt,
            max_depth,
            observer,
            stats: SearchStats::default(),
        }
    }

    #[inline]
    fn at_horizon(&self, depth: u32) -> bool {
        self.max_depth.is_some_and(|max| depth >= max)
    }

    fn search(
        &mut self,
        state: &GameState,
        depth: u32,
        maximizing: bool,
        mut alpha: i32,
        mut beta: i32,
    ) -> Eval {
        self.stats.nodes += 1;
        let fp = state.fingerprint();

        self.stats.tt_probes += 1;
        if let Some(score) = self.tt.probe(fp, depth, self.max_depth.is_some()) {
            self.stats.tt_hits += 1;
            return Eval::exact(score);
        }

        if let Some(score) = state.terminal_score() {
            self.stats.terminal_nodes += 1;
            self.tt.store(fp, depth, score, Origin::Terminal);
            return Eval::exact(score);
        }

        let moves = state.legal_moves();
        // An open game with no legal moves cannot arise from legal play;
        // score it like a cutoff rather than failing.
        if self.at_horizon(depth) || moves.is_empty() {
            self.stats.heuristic_leaves += 1;
            let score = heuristic(state.boards());
            self.tt.store(fp, depth, score, Origin::Heuristic);
            return Eval::estimate(score);
        }

        let mut best = if maximizing { -INF } else { INF };
        let mut best_definite = false;
        let mut all_definite = true;
        let mut pruned = false;

        for mv in moves {
            if let Some(observer) = self.observer {
                observer.on_node(mv, depth);
            }

            let child = self.search(&state.apply(mv), depth + 1, !maximizing, alpha, beta);
            all_definite &= child.definite;

            let improves = if maximizing {
                child.score > best
            } else {
                child.score < best
            };
            // On equal scores prefer the exact one
            if improves || (child.score == best && child.definite && !best_definite) {
                best = child.score;
                best_definite = child.definite;
            }

            if maximizing {
                alpha = alpha.max(best);
            } else {
                beta = beta.min(best);
            }

            if beta <= alpha {
                self.stats.cutoffs += 1;
                if let Some(observer) = self.observer {
                    observer.on_prune(mv, depth);
                }
                pruned = true;
                break;
            }
        }

        // Without a horizon no score exceeds a win, so an exact win for the
        // side to move settles the node even if siblings were cut.
        let win = if maximizing { X_WIN } else { O_WIN };
        let forced_win = self.max_depth.is_none() && best_definite && best == win;
        let definite = (!pruned && all_definite) || forced_win;

        self.tt.store(fp, depth, best, Origin::Expanded { definite });
        Eval {
            score: best,
            definite,
        }
    }
}

// =============================================================================
// Searcher: public API
// =============================================================================

/// Minimax searcher bound to one transposition table.
///
/// Cloning is cheap and clones share the table, which is how parallel
/// callers score several root moves against one cache.
#[derive(Debug, Clone)]
pub struct Searcher {
    tt: Arc<TranspositionTable>,
    max_depth: Option<u32>,
    verbose: bool,
}

impl Searcher {
    /// Create a searcher with a fresh table.
    ///
    /// `max_depth = None` searches to the end of the game.
    #[must_use]
    pub fn new(max_depth: Option<u32>) -> Self {
        Self::with_table(Arc::new(TranspositionTable::new()), max_depth)
    }

    /// Create a searcher over an existing (possibly shared) table.
    #[must_use]
    pub fn with_table(tt: Arc<TranspositionTable>, max_depth: Option<u32>) -> Self {
        Self {
            tt,
            max_depth,
            verbose: false,
        }
    }

    /// Forward node and prune events to the observer.
    #[must_use]
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    #[inline]
    pub fn max_depth(&self) -> Option<u32> {
        self.max_depth
    }

    #[inline]
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Shared handle to the table
    #[inline]
    pub fn table(&self) -> &Arc<TranspositionTable> {
        &self.tt
    }

    /// Minimax value of `state` with alpha-beta pruning.
    ///
    /// `depth` is the ply count from the selection root and is compared
    /// against `max_depth`; `maximizing` is true when X is to move.
    #[must_use]
    pub fn search(
        &self,
        state: &GameState,
        depth: u32,
        maximizing: bool,
        alpha: i32,
        beta: i32,
    ) -> SearchResult {
        self.run(state, depth, maximizing, alpha, beta, None)
    }

    /// Same as [`Searcher::search`], reporting visited and pruned moves to
    /// `observer` when the searcher is verbose.
    #[must_use]
    pub fn search_observed(
        &self,
        state: &GameState,
        depth: u32,
        maximizing: bool,
        alpha: i32,
        beta: i32,
        observer: &dyn SearchObserver,
    ) -> SearchResult {
        let observer = self.verbose.then_some(observer);
        self.run(state, depth, maximizing, alpha, beta, observer)
    }

    fn run(
        &self,
        state: &GameState,
        depth: u32,
        maximizing: bool,
        alpha: i32,
        beta: i32,
        observer: Option<&dyn SearchObserver>,
    ) -> SearchResult {
        let mut worker = WorkerSearcher::new(&self.tt, self.max_depth, observer);
        let eval = worker.search(state, depth, maximizing, alpha, beta);
        SearchResult {
            score: eval.score,
            definite: eval.definite,
            stats: worker.stats,
        }
    }

    /// Get statistics about the transposition table.
    #[must_use]
    pub fn tt_stats(&self) -> TTStats {
        self.tt.stats()
    }

    /// Clear the transposition table.
    pub fn clear_tt(&self) {
        self.tt.clear();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::board::{BoardSet, Cell, GameState, Move, BOARD_SIZE};
    use crate::search::MemoEntry;

    /// Meta O X X / X O X / X O ?, board 8 open with X to move.
    /// Whoever takes board 8 wins; X does it at (8, 8).
    fn endgame() -> GameState {
        use Cell::{Empty as E, O, X};
        let layout = [O, X, X, X, O, X, X, O];
        let mut boards = [[E; BOARD_SIZE]; BOARD_SIZE];
        for (board, &owner) in boards.iter_mut().zip(layout.iter()) {
            *board = [owner; BOARD_SIZE];
        }
        boards[8] = [X, O, E, E, X, O, O, E, E];
        GameState::from_parts(boards, BoardSet::single(8), Cell::X).unwrap()
    }

    /// X owns boards 0 and 1 and completes board 2 at (2, 2).
    fn win_in_one() -> GameState {
        let notation = format!(
            "{}{}{}{}{}{}/2/X",
            "X".repeat(9),
            "X".repeat(9),
            "XX.OO....",
            "O".repeat(9),
            "O".repeat(9),
            ".".repeat(36)
        );
        notation.parse().unwrap()
    }

    #[derive(Default)]
    struct Recorder {
        nodes: Mutex<Vec<(Move, u32)>>,
        prunes: Mutex<Vec<(Move, u32)>>,
    }

    impl SearchObserver for Recorder {
        fn on_node(&self, mv: Move, depth: u32) {
            self.nodes.lock().unwrap().push((mv, depth));
        }

        fn on_prune(&self, mv: Move, depth: u32) {
            self.prunes.lock().unwrap().push((mv, depth));
        }
    }

    #[test]
    fn test_search_terminal_state() {
        let mut state = endgame();
        state = state.apply(Move::new(8, 8));
        assert!(state.is_terminal());

        let searcher = Searcher::new(Some(3));
        let result = searcher.search(&state, 0, false, -INF, INF);
        assert_eq!(result.score, X_WIN);
        assert!(result.definite);
        assert_eq!(result.stats.terminal_nodes, 1);

        let entry = searcher.table().get(state.fingerprint()).unwrap();
        assert!(entry.definite);
    }

    #[test]
    fn test_search_horizon_uses_heuristic() {
        let searcher = Searcher::new(Some(0));
        let result = searcher.search(&GameState::new(), 0, true, -INF, INF);

        assert_eq!(result.score, 0);
        assert!(!result.definite);
        assert_eq!(result.stats.heuristic_leaves, 1);
        assert_eq!(result.stats.nodes, 1);
    }

    #[test]
    fn test_search_finds_immediate_win() {
        let state = win_in_one();
        let searcher = Searcher::new(Some(1));
        let result = searcher.search(&state, 0, true, -INF, INF);
        assert_eq!(result.score, X_WIN);
    }

    #[test]
    fn test_search_unbounded_endgame_is_definite() {
        let searcher = Searcher::new(None);
        let result = searcher.search(&endgame(), 0, true, -INF, INF);

        assert_eq!(result.score, X_WIN);
        assert!(result.definite);
        assert_eq!(result.stats.heuristic_leaves, 0);
    }

    #[test]
    fn test_definite_entry_reused_when_unbounded() {
        let searcher = Searcher::new(None);
        let state = GameState::new();
        searcher
            .table()
            .insert(state.fingerprint(), MemoEntry::new(3, 1, true));

        let result = searcher.search(&state, 5, true, -INF, INF);
        assert_eq!(result.score, 1);
        assert!(result.definite);
        assert_eq!(result.stats.nodes, 1);
        assert_eq!(result.stats.tt_hits, 1);
    }

    #[test]
    fn test_heuristic_entry_never_short_circuits() {
        let searcher = Searcher::new(Some(0));
        let state = GameState::new();
        let fp = state.fingerprint();
        searcher.table().insert(fp, MemoEntry::new(1, 2, false));

        let result = searcher.search(&state, 0, true, -INF, INF);
        assert_eq!(result.score, 0);
        assert_eq!(result.stats.tt_hits, 0);

        let entry = searcher.table().get(fp).unwrap();
        assert!(!entry.definite);
    }

    #[test]
    fn test_cached_search_matches_fresh_search() {
        let searcher = Searcher::new(Some(3));
        let state = GameState::new().apply(Move::new(4, 4));

        let first = searcher.search(&state, 0, false, -INF, INF);
        let second = searcher.search(&state, 0, false, -INF, INF);
        let fresh = Searcher::new(Some(3)).search(&state, 0, false, -INF, INF);

        assert_eq!(first.score, second.score);
        assert_eq!(first.score, fresh.score);
    }

    #[test]
    fn test_shared_table_between_clones() {
        let searcher = Searcher::new(None);
        let clone = searcher.clone();
        let _ = clone.search(&endgame(), 0, true, -INF, INF);

        assert!(Arc::ptr_eq(searcher.table(), clone.table()));
        assert!(!searcher.table().is_empty());

        let again = searcher.search(&endgame(), 0, true, -INF, INF);
        assert_eq!(again.stats.nodes, 1);
        assert_eq!(again.score, X_WIN);
    }

    #[test]
    fn test_observer_only_when_verbose() {
        let quiet = Searcher::new(Some(1));
        let recorder = Recorder::default();
        let _ = quiet.search_observed(&win_in_one(), 0, true, -INF, INF, &recorder);
        assert!(recorder.nodes.lock().unwrap().is_empty());

        let verbose = Searcher::new(Some(1)).with_verbose(true);
        assert!(verbose.is_verbose());
        assert_eq!(verbose.max_depth(), Some(1));
        let recorder = Recorder::default();
        let result = verbose.search_observed(&win_in_one(), 0, true, -INF, INF, &recorder);

        // Children of the root sit on the horizon, so only root moves show up
        let nodes = recorder.nodes.lock().unwrap();
        let expected: Vec<(Move, u32)> = [2, 5, 6, 7, 8]
            .iter()
            .map(|&cell| (Move::new(2, cell), 0))
            .collect();
        assert_eq!(*nodes, expected);

        let prunes = recorder.prunes.lock().unwrap();
        assert_eq!(result.stats.cutoffs as usize, prunes.len());
    }

    /// Node count of a full minimax tree down to `max_depth`
    fn full_tree_nodes(state: &GameState, depth: u32, max_depth: u32) -> u64 {
        if state.is_terminal() || depth >= max_depth {
            return 1;
        }
        1 + state
            .legal_moves()
            .into_iter()
            .map(|mv| full_tree_nodes(&state.apply(mv), depth + 1, max_depth))
            .sum::<u64>()
    }

    #[test]
    fn test_pruning_cuts_the_tree() {
        // Every leaf two plies down scores 0, so the second reply fails low
        // after its first child
        let state = GameState::new().apply(Move::new(4, 4));
        let searcher = Searcher::new(Some(2)).with_verbose(true);
        let recorder = Recorder::default();
        let result = searcher.search_observed(&state, 0, false, -INF, INF, &recorder);

        assert_eq!(result.score, 0);
        assert!(!result.definite);
        assert!(result.stats.cutoffs > 0);

        let prunes = recorder.prunes.lock().unwrap();
        assert!(!prunes.is_empty());
        assert_eq!(prunes.len() as u64, result.stats.cutoffs);
        assert!(prunes.iter().all(|&(_, depth)| depth == 1));

        assert!(result.stats.nodes < full_tree_nodes(&state, 0, 2));
    }

    #[test]
    fn test_stats_merge() {
        let mut a = SearchStats {
            nodes: 10,
            tt_probes: 10,
            tt_hits: 2,
            cutoffs: 1,
            terminal_nodes: 3,
            heuristic_leaves: 4,
        };
        let b = SearchStats {
            nodes: 5,
            tt_probes: 5,
            tt_hits: 3,
            ..SearchStats::default()
        };
        a.merge(&b);
        assert_eq!(a.nodes, 15);
        assert_eq!(a.tt_hits, 5);
        assert_eq!(a.cutoffs, 1);
        assert!((a.tt_hit_rate() - 33.333).abs() < 0.01);
    }
}
