//! Error type shared by the whole crate

use std::io;
use std::path::PathBuf;

/// Crate result alias
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong outside the search itself.
///
/// Search never fails: cutoffs and pruning are ordinary control flow.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    #[error("the game is already over")]
    GameOver,

    #[error("move ({board}, {cell}) is off the board")]
    OutOfRange { board: u8, cell: u8 },

    #[error("board {board} is not playable, legal boards: {legal}")]
    BoardNotPlayable { board: u8, legal: String },

    #[error("cell ({board}, {cell}) is already occupied")]
    OccupiedCell { board: u8, cell: u8 },

    #[error("invalid state: {reason}")]
    InvalidState { reason: String },

    #[error("cannot parse state '{input}': {reason}")]
    ParseState { input: String, reason: String },

    #[error("cannot parse move '{input}', expected 'board,cell' with both in 0..9")]
    ParseMove { input: String },

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("failed to {operation} {}", path.display())]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse JSON")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Wrap an I/O error with what was being done and to which file.
    pub fn io(operation: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Io {
            operation,
            path: path.into(),
            source,
        }
    }
}
