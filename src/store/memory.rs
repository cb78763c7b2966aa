//! In-process store for tests and sessions without persistence

use std::sync::{Arc, Mutex};

use tracing::warn;

use super::{CacheStore, LoadReport};
use crate::error::Result;
use crate::search::MemoMap;

/// Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    entries: Arc<Mutex<MemoMap>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the stored map
    pub fn entries(&self) -> MemoMap {
        match self.entries.lock() {
            Ok(map) => map.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl CacheStore for InMemoryStore {
    fn load(&self) -> LoadReport {
        let Ok(map) = self.entries.lock() else {
            warn!("in-memory cache lock poisoned, starting empty");
            return LoadReport::default();
        };
        LoadReport {
            entries: map.clone(),
            skipped: 0,
        }
    }

    fn save(&self, entries: &MemoMap) -> Result<()> {
        let mut map = match self.entries.lock() {
            Ok(map) => map,
            Err(poisoned) => poisoned.into_inner(),
        };
        *map = entries.clone();
        Ok(())
    }
}
