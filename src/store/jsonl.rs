//! JSON-lines file store
//!
//! One [`MemoRecord`] per line. A corrupt line costs one record, not the
//! whole file. Saves go to `<path>.tmp` first and are renamed over the
//! target, so an interrupted save leaves the previous table intact.

use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use super::{CacheStore, LoadReport, MemoRecord};
use crate::error::{Error, Result};
use crate::search::MemoMap;

/// Records written between progress callbacks
pub const DEFAULT_CHUNK_SIZE: usize = 10_000;

#[derive(Debug, Clone)]
pub struct JsonLinesStore {
    path: PathBuf,
    chunk_size: usize,
}

impl JsonLinesStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        PathBuf::from(tmp)
    }

    /// Save, calling `progress(written, total)` after every chunk.
    pub fn save_chunked(
        &self,
        entries: &MemoMap,
        mut progress: impl FnMut(usize, usize),
    ) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| Error::io("create", parent, e))?;
        }

        let tmp = self.tmp_path();
        let file = File::create(&tmp).map_err(|e| Error::io("create", &tmp, e))?;
        let mut writer = BufWriter::new(file);

        let total = entries.len();
        let mut written = 0;
        for (&fp, entry) in entries {
            let line = serde_json::to_string(&MemoRecord::from_entry(fp, entry))?;
            writeln!(writer, "{line}").map_err(|e| Error::io("write", &tmp, e))?;
            written += 1;
            if written % self.chunk_size == 0 {
                progress(written, total);
            }
        }
        writer.flush().map_err(|e| Error::io("write", &tmp, e))?;
        if written % self.chunk_size != 0 || total == 0 {
            progress(written, total);
        }
        drop(writer);

        fs::rename(&tmp, &self.path).map_err(|e| Error::io("rename", &self.path, e))?;
        info!(path = %self.path.display(), entries = total, "saved cache");
        Ok(())
    }
}

impl CacheStore for JsonLinesStore {
    fn load(&self) -> LoadReport {
        let mut report = LoadReport::default();

        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!(path = %self.path.display(), "no cache file, starting empty");
                return report;
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "cannot open cache, starting empty");
                return report;
            }
        };

        for (lineno, line) in BufReader::new(file).lines().enumerate() {
            let line = match line {
                Ok(line) => line,
                // Invalid UTF-8 consumes the line; anything else ends the read
                Err(e) if e.kind() == ErrorKind::InvalidData => {
                    warn!(line = lineno + 1, "skipping undecodable cache line");
                    report.skipped += 1;
                    continue;
                }
                Err(e) => {
                    warn!(path = %self.path.display(), error = %e, "cache read aborted");
                    break;
                }
            };
            if line.trim().is_empty() {
                continue;
            }

            let parsed = serde_json::from_str::<MemoRecord>(&line)
                .map_err(|e| e.to_string())
                .and_then(MemoRecord::into_entry);
            match parsed {
                Ok((fp, entry)) => {
                    report.entries.insert(fp, entry);
                }
                Err(reason) => {
                    warn!(line = lineno + 1, %reason, "skipping cache record");
                    report.skipped += 1;
                }
            }
        }

        info!(
            path = %self.path.display(),
            entries = report.entries.len(),
            skipped = report.skipped,
            "loaded cache"
        );
        report
    }

    fn save(&self, entries: &MemoMap) -> Result<()> {
        self.save_chunked(entries, |_, _| {})
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::{Fingerprint, MemoEntry};

    fn sample(n: u64) -> MemoMap {
        (0..n)
            .map(|i| {
                let score = (i % 3) as i32 - 1;
                (Fingerprint(i * 31 + 7), MemoEntry::new(i as u32, score, i % 2 == 0))
            })
            .collect()
    }

    #[test]
    fn test_jsonl_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonLinesStore::new(dir.path().join("memo.jsonl"));

        let entries = sample(25);
        store.save(&entries).unwrap();
        let report = store.load();

        assert_eq!(report.skipped, 0);
        assert_eq!(report.entries, entries);
        assert!(!store.tmp_path().exists());
    }

    #[test]
    fn test_jsonl_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonLinesStore::new(dir.path().join("absent.jsonl"));
        assert_eq!(store.load(), LoadReport::default());
    }

    #[test]
    fn test_jsonl_skips_bad_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("memo.jsonl");
        let lines = [
            r#"{"fingerprint":"0000000000000001","depth":1,"score":1,"definite":true}"#,
            "not json at all",
            r#"{"fingerprint":"zz","depth":1,"score":0}"#,
            "",
            r#"{"fingerprint":"0000000000000002","depth":1,"score":42}"#,
            r#"{"fingerprint":"0000000000000003","depth":2,"score":-1}"#,
        ];
        fs::write(&path, lines.join("\n")).unwrap();

        let report = JsonLinesStore::new(&path).load();
        assert_eq!(report.skipped, 3);
        assert_eq!(report.entries.len(), 2);
        assert_eq!(
            report.entries.get(&Fingerprint(3)),
            Some(&MemoEntry::new(2, -1, true))
        );
    }

    #[test]
    fn test_jsonl_chunk_progress() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonLinesStore::new(dir.path().join("nested/memo.jsonl")).with_chunk_size(10);

        let mut calls = Vec::new();
        store
            .save_chunked(&sample(25), |done, total| calls.push((done, total)))
            .unwrap();

        assert_eq!(calls, vec![(10, 25), (20, 25), (25, 25)]);
        assert_eq!(store.load().entries.len(), 25);
    }

    #[test]
    fn test_jsonl_save_replaces_previous() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonLinesStore::new(dir.path().join("memo.jsonl"));

        store.save(&sample(10)).unwrap();
        store.save(&sample(3)).unwrap();
        assert_eq!(store.load().entries, sample(3));
    }
}
