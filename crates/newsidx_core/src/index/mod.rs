//! Index backends.
//!
//! Every backend maps a string key (a token) to an ordered list of values
//! (document IDs) and implements the same [`Index`] trait, so a corpus
//! can be indexed and searched against each one to compare them.
//!
//! # Backends
//!
//! - [`BstIndex`]: unbalanced binary search tree
//! - [`AvlIndex`]: self-balancing AVL tree
//! - [`HashMapIndex`]: SHA-256 addressed bucket table with linear probing
//! - [`SortedArrayIndex`]: sorted parallel arrays with binary search
//!
//! [`AnyIndex`] wraps whichever one was chosen at runtime.

mod backend;
mod hash;
pub mod persistence;
mod sorted_array;
mod stats;
mod traits;
pub mod tree;

pub use backend::AnyIndex;
pub use hash::{home_slot, HashMapIndex};
pub use sorted_array::SortedArrayIndex;
pub use stats::IndexStats;
pub use traits::{Entry, Index, IndexValue};
pub use tree::{AvlIndex, BstIndex, Tree};
