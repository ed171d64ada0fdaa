//! Core type definitions for newsidx.

use crate::error::IndexError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Opaque handle identifying a source document (its file name).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    /// Returns the raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DocumentId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for DocumentId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl AsRef<str> for DocumentId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// The closed set of index backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum BackendKind {
    /// Unbalanced binary search tree.
    Bst = 0,
    /// Self-balancing AVL tree.
    Avl = 1,
    /// SHA-256 addressed hash table.
    Hash = 2,
    /// Sorted parallel arrays with binary search.
    Array = 3,
}

impl BackendKind {
    /// All backends, in declaration order.
    pub const ALL: [BackendKind; 4] = [Self::Bst, Self::Avl, Self::Hash, Self::Array];

    /// Short lowercase name used on the command line and in reports.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Bst => "bst",
            Self::Avl => "avl",
            Self::Hash => "hash",
            Self::Array => "array",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BackendKind {
    type Err = IndexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bst" | "tree" => Ok(Self::Bst),
            "avl" => Ok(Self::Avl),
            "hash" | "hashmap" => Ok(Self::Hash),
            "array" | "sorted-array" => Ok(Self::Array),
            other => Err(IndexError::UnknownBackend(other.to_owned())),
        }
    }
}

impl TryFrom<u8> for BackendKind {
    type Error = IndexError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Bst),
            1 => Ok(Self::Avl),
            2 => Ok(Self::Hash),
            3 => Ok(Self::Array),
            _ => Err(IndexError::invalid_format(format!(
                "unknown backend type: {value}"
            ))),
        }
    }
}
