//! Structural statistics reported by the backends.

use crate::types::BackendKind;
use serde::Serialize;
use std::fmt;

/// Structural statistics for an index.
///
/// Only `kind`, `keys` and `total_postings` are reported by every backend.
/// Tree-only and hash-only figures are `None` elsewhere.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexStats {
    /// Backend that produced the figures.
    pub kind: BackendKind,
    /// Number of distinct keys.
    pub keys: usize,
    /// Sum of all value list lengths.
    pub total_postings: usize,
    /// Tree node count.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_count: Option<usize>,
    /// Tree height (a single node has height 1).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<usize>,
    /// Number of tree nodes without children.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leaf_count: Option<usize>,
    /// Hash bucket count.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<usize>,
    /// Hash occupied/capacity ratio.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub load_factor: Option<f64>,
    /// Mean hash value list length over occupied buckets.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_value_list_len: Option<f64>,
}

impl IndexStats {
    /// Creates stats with only the figures common to every backend.
    #[must_use]
    pub fn new(kind: BackendKind, keys: usize, total_postings: usize) -> Self {
        Self {
            kind,
            keys,
            total_postings,
            node_count: None,
            height: None,
            leaf_count: None,
            capacity: None,
            load_factor: None,
            avg_value_list_len: None,
        }
    }
}

impl fmt::Display for IndexStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Backend:        {}", self.kind)?;
        writeln!(f, "Keys:           {}", self.keys)?;
        write!(f, "Postings:       {}", self.total_postings)?;
        if let Some(nodes) = self.node_count {
            write!(f, "\nNodes:          {nodes}")?;
        }
        if let Some(height) = self.height {
            write!(f, "\nHeight:         {height}")?;
        }
        if let Some(leaves) = self.leaf_count {
            write!(f, "\nLeaves:         {leaves}")?;
        }
        if let Some(capacity) = self.capacity {
            write!(f, "\nCapacity:       {capacity}")?;
        }
        if let Some(load) = self.load_factor {
            write!(f, "\nLoad factor:    {load:.4}")?;
        }
        if let Some(avg) = self.avg_value_list_len {
            write!(f, "\nAvg list len:   {avg:.2}")?;
        }
        Ok(())
    }
}
