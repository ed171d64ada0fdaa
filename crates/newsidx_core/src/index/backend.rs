//! The closed set of backends behind one type.

use crate::config::IndexConfig;
use crate::error::IndexResult;
use crate::index::stats::IndexStats;
use crate::index::traits::{Entry, Index, IndexValue};
use crate::index::{AvlIndex, BstIndex, HashMapIndex, SortedArrayIndex};
use crate::types::BackendKind;

/// Any one of the four index backends.
///
/// This is what ingestion, search and persistence work with when the
/// backend is chosen at runtime.
#[derive(Debug)]
pub enum AnyIndex<V> {
    /// Unbalanced binary search tree.
    Bst(BstIndex<V>),
    /// AVL tree.
    Avl(AvlIndex<V>),
    /// SHA-256 hash table.
    Hash(HashMapIndex<V>),
    /// Sorted parallel arrays.
    Array(SortedArrayIndex<V>),
}

impl<V: IndexValue> AnyIndex<V> {
    /// Builds an empty backend as described by `config`.
    pub fn new(config: &IndexConfig) -> IndexResult<Self> {
        config.validate()?;
        Ok(match config.backend {
            BackendKind::Bst => Self::Bst(BstIndex::new()),
            BackendKind::Avl => Self::Avl(AvlIndex::new()),
            BackendKind::Hash => Self::Hash(HashMapIndex::with_load_factor(
                config.hash_capacity,
                config.max_load_factor,
            )?),
            BackendKind::Array => Self::Array(SortedArrayIndex::new()),
        })
    }

    /// Builds an empty backend of `kind` with default settings.
    #[must_use]
    pub fn with_kind(kind: BackendKind) -> Self {
        match kind {
            BackendKind::Bst => Self::Bst(BstIndex::new()),
            BackendKind::Avl => Self::Avl(AvlIndex::new()),
            BackendKind::Hash => Self::Hash(HashMapIndex::new()),
            BackendKind::Array => Self::Array(SortedArrayIndex::new()),
        }
    }

    /// Serializes the index; see [`persistence`](crate::index::persistence).
    pub fn to_bytes(&self) -> Vec<u8> {
        crate::index::persistence::persist_index(self)
    }

    /// Deserializes an index produced by [`AnyIndex::to_bytes`].
    pub fn from_bytes(data: &[u8]) -> IndexResult<Self> {
        crate::index::persistence::load_index(data)
    }

    fn as_dyn(&self) -> &dyn Index<V> {
        match self {
            Self::Bst(index) => index,
            Self::Avl(index) => index,
            Self::Hash(index) => index,
            Self::Array(index) => index,
        }
    }

    fn as_dyn_mut(&mut self) -> &mut dyn Index<V> {
        match self {
            Self::Bst(index) => index,
            Self::Avl(index) => index,
            Self::Hash(index) => index,
            Self::Array(index) => index,
        }
    }
}

impl<V: IndexValue> Index<V> for AnyIndex<V> {
    fn kind(&self) -> BackendKind {
        self.as_dyn().kind()
    }

    fn insert(&mut self, key: &str, value: V) {
        self.as_dyn_mut().insert(key, value);
    }

    fn search(&self, key: &str) -> &[V] {
        self.as_dyn().search(key)
    }

    fn contains(&self, key: &str) -> bool {
        self.as_dyn().contains(key)
    }

    fn keys_in_order(&self) -> Vec<&str> {
        self.as_dyn().keys_in_order()
    }

    fn entries(&self) -> Box<dyn Iterator<Item = Entry<'_, V>> + '_> {
        self.as_dyn().entries()
    }

    fn len(&self) -> usize {
        self.as_dyn().len()
    }

    fn stats(&self) -> IndexStats {
        self.as_dyn().stats()
    }
}

impl<V: IndexValue> From<BstIndex<V>> for AnyIndex<V> {
    fn from(index: BstIndex<V>) -> Self {
        Self::Bst(index)
    }
}

impl<V: IndexValue> From<AvlIndex<V>> for AnyIndex<V> {
    fn from(index: AvlIndex<V>) -> Self {
        Self::Avl(index)
    }
}

impl<V: IndexValue> From<HashMapIndex<V>> for AnyIndex<V> {
    fn from(index: HashMapIndex<V>) -> Self {
        Self::Hash(index)
    }
}

impl<V: IndexValue> From<SortedArrayIndex<V>> for AnyIndex<V> {
    fn from(index: SortedArrayIndex<V>) -> Self {
        Self::Array(index)
    }
}
