//! Persistent storage for the transposition table
//!
//! A store moves the whole table in bulk: loaded once before a session,
//! saved once after it. Loading never fails; records that cannot be trusted
//! are skipped and counted.

pub mod jsonl;
pub mod memory;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::eval::{is_definite_score, MAX_HEURISTIC};
use crate::search::{Fingerprint, MemoEntry, MemoMap};

pub use jsonl::JsonLinesStore;
pub use memory::InMemoryStore;

/// Backend for bulk load and save of the memo table.
pub trait CacheStore: Send + Sync {
    /// Read every usable record. Problems are logged and counted, never
    /// returned.
    fn load(&self) -> LoadReport;

    /// Replace the stored table with `entries`.
    fn save(&self, entries: &MemoMap) -> Result<()>;
}

/// Outcome of a load
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub entries: MemoMap,
    /// Records dropped as malformed
    pub skipped: usize,
}

/// On-disk form of one table entry.
///
/// `definite` is optional so tables written without it still load; such
/// records are treated as exact only when they score a win for either side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoRecord {
    pub fingerprint: String,
    pub depth: u32,
    pub score: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definite: Option<bool>,
}

impl MemoRecord {
    pub fn from_entry(fp: Fingerprint, entry: &MemoEntry) -> Self {
        Self {
            fingerprint: fp.to_string(),
            depth: entry.depth,
            score: entry.score,
            definite: Some(entry.definite),
        }
    }

    /// Validate and convert to a table entry; the error is a reason for the
    /// log line.
    pub fn into_entry(self) -> std::result::Result<(Fingerprint, MemoEntry), String> {
        let fp: Fingerprint = self
            .fingerprint
            .parse()
            .map_err(|e| format!("bad fingerprint '{}': {e}", self.fingerprint))?;

        if self.score.abs() > MAX_HEURISTIC {
            return Err(format!("score {} out of range", self.score));
        }

        let definite = self
            .definite
            .unwrap_or_else(|| is_definite_score(self.score));
        if definite && self.score.abs() > 1 {
            return Err(format!("score {} cannot be exact", self.score));
        }

        Ok((fp, MemoEntry::new(self.depth, self.score, definite)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(fingerprint: &str, score: i32, definite: Option<bool>) -> MemoRecord {
        MemoRecord {
            fingerprint: fingerprint.to_string(),
            depth: 3,
            score,
            definite,
        }
    }

    #[test]
    fn test_record_with_flag() {
        let (fp, entry) = record("00000000000000ff", 2, Some(false)).into_entry().unwrap();
        assert_eq!(fp, Fingerprint(0xff));
        assert_eq!(entry, MemoEntry::new(3, 2, false));
    }

    #[test]
    fn test_record_without_flag_uses_value_rule() {
        let (_, win) = record("1", 1, None).into_entry().unwrap();
        assert!(win.definite);
        let (_, loss) = record("1", -1, None).into_entry().unwrap();
        assert!(loss.definite);
        let (_, draw) = record("1", 0, None).into_entry().unwrap();
        assert!(!draw.definite);
        let (_, lead) = record("1", 4, None).into_entry().unwrap();
        assert!(!lead.definite);
    }

    #[test]
    fn test_record_rejections() {
        assert!(record("xyz", 0, None).into_entry().is_err());
        assert!(record("1", 10, None).into_entry().is_err());
        assert!(record("1", -12, Some(false)).into_entry().is_err());
        assert!(record("1", 5, Some(true)).into_entry().is_err());
    }

    #[test]
    fn test_record_json_shape() {
        let rec = MemoRecord::from_entry(Fingerprint(0xabc), &MemoEntry::new(2, -1, true));
        let json = serde_json::to_string(&rec).unwrap();
        assert_eq!(
            json,
            r#"{"fingerprint":"0000000000000abc","depth":2,"score":-1,"definite":true}"#
        );

        let legacy: MemoRecord =
            serde_json::from_str(r#"{"fingerprint":"0000000000000abc","depth":2,"score":1}"#)
                .unwrap();
        assert_eq!(legacy.definite, None);
    }
}
