//! Index traits and value types.

use crate::error::{IndexError, IndexResult};
use crate::index::stats::IndexStats;
use crate::types::{BackendKind, DocumentId};
use std::fmt::Debug;
use std::hash::Hash;

/// A value that can be stored in a key's value list.
///
/// Values must be:
/// - Comparable (for de-duplication in the hash and array backends)
/// - Hashable (for query intersection)
/// - Serializable to bytes (for persistence)
pub trait IndexValue: Clone + Eq + Hash + Debug + 'static {
    /// Serializes the value to bytes.
    fn to_bytes(&self) -> Vec<u8>;

    /// Deserializes the value from bytes.
    fn from_bytes(bytes: &[u8]) -> IndexResult<Self>;
}

impl IndexValue for DocumentId {
    fn to_bytes(&self) -> Vec<u8> {
        self.as_str().as_bytes().to_vec()
    }

    fn from_bytes(bytes: &[u8]) -> IndexResult<Self> {
        String::from_bytes(bytes).map(DocumentId::from)
    }
}

impl IndexValue for String {
    fn to_bytes(&self) -> Vec<u8> {
        self.as_bytes().to_vec()
    }

    fn from_bytes(bytes: &[u8]) -> IndexResult<Self> {
        String::from_utf8(bytes.to_vec()).map_err(|_| IndexError::invalid_format("invalid UTF-8"))
    }
}

impl IndexValue for i64 {
    fn to_bytes(&self) -> Vec<u8> {
        self.to_be_bytes().to_vec()
    }

    fn from_bytes(bytes: &[u8]) -> IndexResult<Self> {
        let arr: [u8; 8] = bytes
            .try_into()
            .map_err(|_| IndexError::invalid_format("expected 8 bytes for i64"))?;
        Ok(i64::from_be_bytes(arr))
    }
}

impl IndexValue for u64 {
    fn to_bytes(&self) -> Vec<u8> {
        self.to_be_bytes().to_vec()
    }

    fn from_bytes(bytes: &[u8]) -> IndexResult<Self> {
        let arr: [u8; 8] = bytes
            .try_into()
            .map_err(|_| IndexError::invalid_format("expected 8 bytes for u64"))?;
        Ok(u64::from_be_bytes(arr))
    }
}

/// Borrowed `(key, values)` pair yielded when iterating an index.
pub type Entry<'a, V> = (&'a str, &'a [V]);

/// Core index trait.
///
/// All four backends map a string key to an ordered list of values and
/// share this contract, so ingestion and search can run against any of
/// them. A key that was never inserted has an empty value list.
pub trait Index<V: IndexValue> {
    /// Returns which backend this is.
    fn kind(&self) -> BackendKind;

    /// Appends `value` to the value list of `key`, creating the key if absent.
    fn insert(&mut self, key: &str, value: V);

    /// Returns the values stored under `key`, or an empty slice.
    fn search(&self, key: &str) -> &[V];

    /// Checks if the index contains a key.
    fn contains(&self, key: &str) -> bool {
        !self.search(key).is_empty()
    }

    /// Returns every distinct key in ascending order.
    fn keys_in_order(&self) -> Vec<&str>;

    /// Iterates entries in the backend's native order.
    ///
    /// Trees and the sorted array yield ascending keys; the hash table
    /// yields bucket order.
    fn entries(&self) -> Box<dyn Iterator<Item = Entry<'_, V>> + '_>;

    /// Returns the number of distinct keys.
    fn len(&self) -> usize;

    /// Returns true if the index holds no keys.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns structural statistics for reporting.
    fn stats(&self) -> IndexStats;

    /// Inserts every pair from an iterator.
    fn extend_pairs<I, K>(&mut self, pairs: I)
    where
        Self: Sized,
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
    {
        for (key, value) in pairs {
            self.insert(key.as_ref(), value);
        }
    }
}
