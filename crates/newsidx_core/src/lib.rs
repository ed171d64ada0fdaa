//! # newsidx core
//!
//! Inverted index backends for news-article search benchmarking.
//!
//! This crate provides:
//! - Four interchangeable index backends behind the [`Index`] trait
//! - [`AnyIndex`] for choosing a backend at runtime
//! - A binary persistence format for built indexes
//! - Conjunctive multi-token queries with per-lookup timing

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
pub mod index;
pub mod query;
mod types;

pub use config::{
    IndexConfig, DEFAULT_HASH_CAPACITY, DEFAULT_MAX_LOAD_FACTOR, MAX_HASH_CAPACITY,
    MIN_MAX_LOAD_FACTOR,
};
pub use error::{IndexError, IndexResult};
pub use index::persistence::{
    load_from_file, load_index, load_index_as, persist_index, read_index_header, save_to_file,
    IndexHeader,
};
pub use index::{
    AnyIndex, AvlIndex, BstIndex, Entry, HashMapIndex, Index, IndexStats, IndexValue,
    SortedArrayIndex,
};
pub use query::{execute, timed, Query, QueryOutcome};
pub use types::{BackendKind, DocumentId};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
