//! Error types for corpus ingestion and experiments.

use newsidx_core::IndexError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for corpus operations.
pub type CorpusResult<T> = Result<T, CorpusError>;

/// Errors raised while reading a corpus or running experiments.
///
/// A single malformed article is not an error; ingestion logs it and
/// moves on.
#[derive(Debug, Error)]
pub enum CorpusError {
    /// I/O error on a specific path.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// The file or directory being accessed.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: io::Error,
    },

    /// The dataset root does not exist or is not a directory.
    #[error("dataset not found: {0}")]
    DatasetNotFound(PathBuf),

    /// The index has no keys to draw a search set from.
    #[error("index is empty; cannot generate search data")]
    EmptyIndex,

    /// Index error.
    #[error(transparent)]
    Index(#[from] IndexError),
}

impl CorpusError {
    /// Wraps an I/O error with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
