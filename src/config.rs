//! Engine configuration
//!
//! Loaded from JSON; every field is optional and falls back to
//! [`EngineConfig::default`]. `"max_depth": null` requests an unbounded
//! search.
//!
//! ```
//! use uttt::config::EngineConfig;
//!
//! let config: EngineConfig = serde_json::from_str(r#"{"max_depth": null, "seed": 7}"#).unwrap();
//! assert_eq!(config.max_depth, None);
//! assert_eq!(config.seed, Some(7));
//! assert!(!config.parallel);
//! ```

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::search::DEFAULT_SHARDS;

/// Depth limit used when none is configured
pub const DEFAULT_MAX_DEPTH: u32 = 4;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Plies below each root candidate before the heuristic takes over;
    /// `None` searches to the end of the game
    pub max_depth: Option<u32>,
    /// Score root candidates on the rayon pool
    pub parallel: bool,
    /// Report every visited node and cutoff to the observer
    pub verbose: bool,
    /// Seed for tie-breaking between equally scored moves
    pub seed: Option<u64>,
    /// Lock shards in the transposition table
    pub shards: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_depth: Some(DEFAULT_MAX_DEPTH),
            parallel: false,
            verbose: false,
            seed: None,
            shards: DEFAULT_SHARDS,
        }
    }
}

impl EngineConfig {
    /// Unbounded search, everything else default.
    #[must_use]
    pub fn unbounded() -> Self {
        Self {
            max_depth: None,
            ..Self::default()
        }
    }

    /// Read and validate a JSON config file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| Error::io("open config", path, e))?;
        let config: EngineConfig = serde_json::from_reader(BufReader::new(file))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.shards == 0 {
            return Err(Error::InvalidConfiguration(
                "shards must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
