//! Sorted array index implementation.

use crate::index::stats::IndexStats;
use crate::index::traits::{Entry, Index, IndexValue};
use crate::types::BackendKind;

/// Parallel sorted arrays searched with binary search.
///
/// `keys` is strictly increasing and `entries[i].0 == keys[i]` for every
/// `i`. Lookups are O(log n); inserting a new key shifts the tail of both
/// arrays and is O(n). Value lists are de-duplicated and empty keys are
/// ignored.
#[derive(Debug, Clone)]
pub struct SortedArrayIndex<V> {
    keys: Vec<String>,
    entries: Vec<(String, Vec<V>)>,
}

impl<V: IndexValue> SortedArrayIndex<V> {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self {
            keys: Vec::new(),
            entries: Vec::new(),
        }
    }

    /// Rebuilds an index from entries already in strictly ascending order.
    pub(crate) fn from_sorted(entries: Vec<(String, Vec<V>)>) -> Self {
        let keys = entries.iter().map(|(key, _)| key.clone()).collect();
        Self { keys, entries }
    }

    /// The sorted key array.
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// Iterates entries in ascending key order.
    pub fn iter(&self) -> impl Iterator<Item = Entry<'_, V>> + '_ {
        self.entries
            .iter()
            .map(|(key, values)| (key.as_str(), values.as_slice()))
    }

    /// Leftmost position whose key is `>= key`.
    fn lower_bound(&self, key: &str) -> usize {
        self.keys.partition_point(|probe| probe.as_str() < key)
    }

    fn position(&self, key: &str) -> Option<usize> {
        let idx = self.lower_bound(key);
        (idx < self.keys.len() && self.keys[idx] == key).then_some(idx)
    }
}

impl<V: IndexValue> Default for SortedArrayIndex<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: IndexValue> Index<V> for SortedArrayIndex<V> {
    fn kind(&self) -> BackendKind {
        BackendKind::Array
    }

    fn insert(&mut self, key: &str, value: V) {
        if key.is_empty() {
            return;
        }

        let idx = self.lower_bound(key);
        if idx < self.keys.len() && self.keys[idx] == key {
            let values = &mut self.entries[idx].1;
            if !values.contains(&value) {
                values.push(value);
            }
        } else {
            self.keys.insert(idx, key.to_owned());
            self.entries.insert(idx, (key.to_owned(), vec![value]));
        }
    }

    fn search(&self, key: &str) -> &[V] {
        self.position(key)
            .map(|idx| self.entries[idx].1.as_slice())
            .unwrap_or_default()
    }

    fn keys_in_order(&self) -> Vec<&str> {
        self.keys.iter().map(String::as_str).collect()
    }

    fn entries(&self) -> Box<dyn Iterator<Item = Entry<'_, V>> + '_> {
        Box::new(self.iter())
    }

    fn len(&self) -> usize {
        self.keys.len()
    }

    fn stats(&self) -> IndexStats {
        IndexStats::new(
            BackendKind::Array,
            self.keys.len(),
            self.entries.iter().map(|(_, values)| values.len()).sum(),
        )
    }
}
