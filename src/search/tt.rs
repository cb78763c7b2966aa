//! Transposition table for memoized evaluations
//!
//! The table maps a state fingerprint to the best known score, the search
//! depth it was computed at, and whether the score is game-theoretically
//! exact ("definite"). Only definite entries ever answer a query outright;
//! heuristic guesses are stored for the write policy but never trusted.
//!
//! # Example
//!
//! ```
//! use uttt::search::{Fingerprint, Origin, TranspositionTable};
//!
//! let tt = TranspositionTable::new();
//! let fp = Fingerprint(0x1234_5678_9ABC_DEF0);
//!
//! // A heuristic guess is recorded but never reused as an exact result
//! tt.store(fp, 2, 3, Origin::Heuristic);
//! assert_eq!(tt.probe(fp, 2, true), None);
//!
//! // A proven win replaces it and answers queries
//! tt.store(fp, 2, 1, Origin::Terminal);
//! assert_eq!(tt.probe(fp, 2, true), Some(1));
//! ```

use std::collections::BTreeMap;
use std::sync::RwLock;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::Fingerprint;

/// Default number of independently locked shards
pub const DEFAULT_SHARDS: usize = 64;

/// Ordered fingerprint → entry map used for bulk load and save
pub type MemoMap = BTreeMap<Fingerprint, MemoEntry>;

type Shard = RwLock<FxHashMap<Fingerprint, MemoEntry>>;

/// Transposition table entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoEntry {
    /// Search depth (plies from the search root) this entry was computed at
    pub depth: u32,
    /// Score from X's perspective
    pub score: i32,
    /// Exact game value rather than a heuristic estimate or a bound
    pub definite: bool,
}

impl MemoEntry {
    #[inline]
    pub fn new(depth: u32, score: i32, definite: bool) -> Self {
        Self {
            depth,
            score,
            definite,
        }
    }

    /// Whether this entry may answer a query at `depth` without searching.
    ///
    /// Without a depth limit any definite entry is exact everywhere. With a
    /// limit, the entry must come from at least as deep in the tree as the
    /// query, i.e. it was computed with no more remaining budget, so the
    /// depth-limited value it stands for is the same.
    #[inline]
    pub fn is_usable(&self, depth: u32, depth_limited: bool) -> bool {
        self.definite && (!depth_limited || self.depth >= depth)
    }
}

/// How a score was produced; selects the write policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Game over at this node. Always written, always definite.
    Terminal,
    /// Depth-limit cutoff. Never overwrites a definite entry.
    Heuristic,
    /// Result of expanding the node's moves.
    Expanded { definite: bool },
}

impl Origin {
    #[inline]
    pub fn is_definite(self) -> bool {
        match self {
            Origin::Terminal => true,
            Origin::Heuristic => false,
            Origin::Expanded { definite } => definite,
        }
    }
}

/// Write policy: should a new result at `depth` with `origin` replace
/// `existing`?
#[inline]
fn should_replace(existing: Option<&MemoEntry>, depth: u32, origin: Origin) -> bool {
    let Some(existing) = existing else {
        return true;
    };
    match origin {
        Origin::Terminal => true,
        Origin::Heuristic => !existing.definite,
        Origin::Expanded { definite: true } => true,
        Origin::Expanded { definite: false } => !existing.definite && existing.depth <= depth,
    }
}

/// Shared transposition table.
///
/// Entries live in `RwLock`-guarded shards selected by fingerprint, so a
/// read-modify-write of one entry is atomic and workers scoring different
/// root moves can share one table. All methods take `&self`; share it with
/// `Arc<TranspositionTable>`.
pub struct TranspositionTable {
    shards: Vec<Shard>,
}

impl std::fmt::Debug for TranspositionTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranspositionTable")
            .field("shards", &self.shards.len())
            .field("entries", &self.len())
            .finish()
    }
}

impl TranspositionTable {
    /// Create an empty table with the default shard count.
    #[must_use]
    pub fn new() -> Self {
        Self::with_shards(DEFAULT_SHARDS)
    }

    /// Create an empty table with `shards` locks (at least one).
    #[must_use]
    pub fn with_shards(shards: usize) -> Self {
        let shards = (0..shards.max(1)).map(|_| Shard::default()).collect();
        Self { shards }
    }

    #[inline]
    fn shard(&self, fp: Fingerprint) -> &Shard {
        let idx = (fp.0 % self.shards.len() as u64) as usize;
        &self.shards[idx]
    }

    /// Raw entry lookup, usable or not.
    #[must_use]
    pub fn get(&self, fp: Fingerprint) -> Option<MemoEntry> {
        let Ok(shard) = self.shard(fp).read() else {
            return None;
        };
        shard.get(&fp).copied()
    }

    /// Probe for an exact score answering a query at `depth`.
    ///
    /// Returns `None` when there is no entry or the entry is not usable
    /// (see [`MemoEntry::is_usable`]).
    #[must_use]
    pub fn probe(&self, fp: Fingerprint, depth: u32, depth_limited: bool) -> Option<i32> {
        self.get(fp)
            .filter(|entry| entry.is_usable(depth, depth_limited))
            .map(|entry| entry.score)
    }

    /// Store a result according to the write policy of its origin.
    ///
    /// Returns whether the entry was written.
    pub fn store(&self, fp: Fingerprint, depth: u32, score: i32, origin: Origin) -> bool {
        let Ok(mut shard) = self.shard(fp).write() else {
            return false;
        };
        if !should_replace(shard.get(&fp), depth, origin) {
            return false;
        }
        shard.insert(fp, MemoEntry::new(depth, score, origin.is_definite()));
        true
    }

    /// Unconditional insert, used when loading a persisted table.
    pub fn insert(&self, fp: Fingerprint, entry: MemoEntry) {
        if let Ok(mut shard) = self.shard(fp).write() {
            shard.insert(fp, entry);
        }
    }

    /// Bulk insert.
    pub fn extend(&self, entries: &MemoMap) {
        for (&fp, &entry) in entries {
            self.insert(fp, entry);
        }
    }

    /// Copy of every entry, ordered by fingerprint.
    #[must_use]
    pub fn snapshot(&self) -> MemoMap {
        let mut map = MemoMap::new();
        for shard in &self.shards {
            let Ok(shard) = shard.read() else { continue };
            map.extend(shard.iter().map(|(&fp, &entry)| (fp, entry)));
        }
        map
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.shards
            .iter()
            .filter_map(|shard| shard.read().ok().map(|s| s.len()))
            .sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clear all entries (explicit cache reset).
    pub fn clear(&self) {
        for shard in &self.shards {
            let Ok(mut shard) = shard.write() else { continue };
            shard.clear();
        }
    }

    /// Get statistics about table usage.
    #[must_use]
    pub fn stats(&self) -> TTStats {
        let mut stats = TTStats {
            shards: self.shards.len(),
            ..TTStats::default()
        };
        for shard in &self.shards {
            let Ok(shard) = shard.read() else { continue };
            stats.entries += shard.len();
            stats.definite += shard.values().filter(|e| e.definite).count();
        }
        stats
    }
}

impl Default for TranspositionTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Statistics about transposition table usage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TTStats {
    /// Number of lock shards
    pub shards: usize,
    /// Entries stored
    pub entries: usize,
    /// Entries holding exact game values
    pub definite: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    const FP: Fingerprint = Fingerprint(0x1234_5678_9ABC_DEF0);

    #[test]
    fn test_tt_store_probe_terminal() {
        let tt = TranspositionTable::new();
        assert!(tt.store(FP, 5, 1, Origin::Terminal));

        assert_eq!(tt.probe(FP, 5, true), Some(1));
        assert_eq!(tt.get(FP), Some(MemoEntry::new(5, 1, true)));
    }

    #[test]
    fn test_tt_heuristic_never_usable() {
        let tt = TranspositionTable::new();
        tt.store(FP, 1, 2, Origin::Heuristic);

        assert_eq!(tt.probe(FP, 0, true), None);
        assert_eq!(tt.probe(FP, 0, false), None);
        // Still present for the write policy
        assert_eq!(tt.get(FP), Some(MemoEntry::new(1, 2, false)));
    }

    #[test]
    fn test_tt_definite_reused_deeper_when_unbounded() {
        let tt = TranspositionTable::new();
        tt.insert(FP, MemoEntry::new(3, 1, true));

        assert_eq!(tt.probe(FP, 5, false), Some(1));
        assert_eq!(tt.probe(FP, 0, false), Some(1));
    }

    #[test]
    fn test_tt_depth_requirement_when_limited() {
        let tt = TranspositionTable::new();
        tt.insert(FP, MemoEntry::new(3, -1, true));

        // Computed at depth 3: valid for queries at depth <= 3 only
        assert_eq!(tt.probe(FP, 3, true), Some(-1));
        assert_eq!(tt.probe(FP, 1, true), Some(-1));
        assert_eq!(tt.probe(FP, 5, true), None);
    }

    #[test]
    fn test_tt_terminal_always_overwrites() {
        let tt = TranspositionTable::new();
        tt.store(FP, 2, 1, Origin::Expanded { definite: true });
        assert!(tt.store(FP, 7, 0, Origin::Terminal));
        assert_eq!(tt.get(FP), Some(MemoEntry::new(7, 0, true)));
    }

    #[test]
    fn test_tt_heuristic_does_not_clobber_definite() {
        let tt = TranspositionTable::new();
        tt.store(FP, 4, -1, Origin::Terminal);
        assert!(!tt.store(FP, 4, 3, Origin::Heuristic));
        assert_eq!(tt.get(FP), Some(MemoEntry::new(4, -1, true)));
    }

    #[test]
    fn test_tt_heuristic_replaces_heuristic() {
        let tt = TranspositionTable::new();
        tt.store(FP, 4, 3, Origin::Heuristic);
        assert!(tt.store(FP, 1, 2, Origin::Heuristic));
        assert_eq!(tt.get(FP), Some(MemoEntry::new(1, 2, false)));
    }

    #[test]
    fn test_tt_expanded_replacement_by_depth() {
        let tt = TranspositionTable::new();
        tt.store(FP, 3, 2, Origin::Expanded { definite: false });

        // Shallower non-definite result does not replace
        assert!(!tt.store(FP, 2, 4, Origin::Expanded { definite: false }));
        assert_eq!(tt.get(FP).map(|e| e.score), Some(2));

        // Same or deeper does
        assert!(tt.store(FP, 3, 5, Origin::Expanded { definite: false }));
        assert_eq!(tt.get(FP).map(|e| e.score), Some(5));
        assert!(tt.store(FP, 6, 1, Origin::Expanded { definite: false }));
        assert_eq!(tt.get(FP), Some(MemoEntry::new(6, 1, false)));
    }

    #[test]
    fn test_tt_expanded_definite_always_wins() {
        let tt = TranspositionTable::new();
        tt.store(FP, 8, 2, Origin::Expanded { definite: false });
        assert!(tt.store(FP, 1, 0, Origin::Expanded { definite: true }));
        assert_eq!(tt.get(FP), Some(MemoEntry::new(1, 0, true)));

        // And a non-definite result never replaces it
        assert!(!tt.store(FP, 9, 3, Origin::Expanded { definite: false }));
        assert_eq!(tt.get(FP), Some(MemoEntry::new(1, 0, true)));
    }

    #[test]
    fn test_tt_snapshot_extend_roundtrip() {
        let tt = TranspositionTable::with_shards(4);
        for i in 0..20u64 {
            tt.store(Fingerprint(i * 7919), i as u32, (i % 3) as i32 - 1, Origin::Terminal);
        }
        let snapshot = tt.snapshot();
        assert_eq!(snapshot.len(), 20);
        assert!(snapshot.keys().zip(snapshot.keys().skip(1)).all(|(a, b)| a < b));

        let copy = TranspositionTable::new();
        copy.extend(&snapshot);
        assert_eq!(copy.snapshot(), snapshot);
    }

    #[test]
    fn test_tt_clear() {
        let tt = TranspositionTable::new();
        tt.store(FP, 5, 1, Origin::Terminal);
        tt.clear();

        assert!(tt.is_empty());
        assert_eq!(tt.probe(FP, 5, false), None);
    }

    #[test]
    fn test_tt_stats() {
        let tt = TranspositionTable::with_shards(8);
        let stats = tt.stats();
        assert_eq!(stats.entries, 0);
        assert_eq!(stats.shards, 8);

        tt.store(Fingerprint(0x111), 5, 1, Origin::Terminal);
        tt.store(Fingerprint(0x222), 5, 4, Origin::Heuristic);

        let stats = tt.stats();
        assert_eq!(stats.entries, 2);
        assert_eq!(stats.definite, 1);
    }

    #[test]
    fn test_tt_zero_shards_clamped() {
        let tt = TranspositionTable::with_shards(0);
        tt.store(FP, 0, 0, Origin::Terminal);
        assert_eq!(tt.len(), 1);
    }

    #[test]
    fn test_tt_concurrent_safety() {
        use std::sync::Arc;
        use std::thread;

        let tt = Arc::new(TranspositionTable::new());
        let mut handles = Vec::new();

        // Spawn 4 threads writing different entries concurrently
        for t in 0..4u64 {
            let tt = Arc::clone(&tt);
            handles.push(thread::spawn(move || {
                for i in 0..1000u64 {
                    tt.store(Fingerprint(t * 100_000 + i), 5, 1, Origin::Terminal);
                }
            }));
        }

        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(tt.len(), 4000);
    }
}
