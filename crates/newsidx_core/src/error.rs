//! Error types for newsidx core.

use std::io;
use thiserror::Error;

/// Result type for core operations.
pub type IndexResult<T> = Result<T, IndexError>;

/// Errors that can occur in newsidx core operations.
///
/// Looking up a key that was never inserted is not an error: every
/// backend answers with an empty value list.
#[derive(Debug, Error)]
pub enum IndexError {
    /// I/O error while reading or writing a persisted index.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Persisted index bytes are corrupted or in an unknown format.
    #[error("invalid index format: {message}")]
    InvalidFormat {
        /// Description of the format issue.
        message: String,
    },

    /// A persisted index holds a different backend than the one requested.
    #[error("backend mismatch: expected {expected}, found {found}")]
    BackendMismatch {
        /// The backend the caller asked for.
        expected: String,
        /// The backend recorded in the index header.
        found: String,
    },

    /// Backend name could not be parsed.
    #[error("unknown backend: {0} (expected one of bst, avl, hash, array)")]
    UnknownBackend(String),

    /// Configuration values are out of range.
    #[error("invalid configuration: {message}")]
    InvalidConfig {
        /// Description of the problem.
        message: String,
    },
}

impl IndexError {
    /// Creates an invalid format error.
    pub fn invalid_format(message: impl Into<String>) -> Self {
        Self::InvalidFormat {
            message: message.into(),
        }
    }

    /// Creates an invalid configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Creates a backend mismatch error.
    pub fn backend_mismatch(expected: impl ToString, found: impl ToString) -> Self {
        Self::BackendMismatch {
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }
}
