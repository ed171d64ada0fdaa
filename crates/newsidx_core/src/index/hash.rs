//! Hash table index implementation.

use crate::config::{
    validate_load_factor, DEFAULT_HASH_CAPACITY, DEFAULT_MAX_LOAD_FACTOR, MAX_HASH_CAPACITY,
};
use crate::error::IndexResult;
use crate::index::stats::IndexStats;
use crate::index::traits::{Entry, Index, IndexValue};
use crate::types::BackendKind;
use sha2::{Digest, Sha256};
use tracing::debug;

/// One occupied bucket.
#[derive(Debug, Clone)]
pub(crate) struct Bucket<V> {
    pub(crate) key: String,
    pub(crate) values: Vec<V>,
}

/// Result of probing for a key.
enum Probe {
    /// The key lives in this bucket.
    Found(usize),
    /// The key is absent; this is the first empty bucket on its probe path.
    Vacant(usize),
    /// Every bucket was visited without a match or a vacancy.
    Full,
}

/// Fixed-capacity bucket table addressed by SHA-256.
///
/// A key's home bucket is its SHA-256 digest, read as a big-endian
/// integer, modulo the capacity. Collisions are resolved by linear
/// probing, so two keys sharing a home bucket are both kept. When the
/// occupied fraction exceeds the maximum load factor the table doubles
/// and every entry is rehashed into the larger table.
///
/// Value lists are de-duplicated: inserting the same value twice under
/// one key stores it once. Empty keys are ignored.
///
/// # Example
///
/// ```rust
/// use newsidx_core::{HashMapIndex, Index};
///
/// let mut index: HashMapIndex<String> = HashMapIndex::with_capacity(8);
/// index.insert("husky", "a.json".to_string());
/// index.insert("husky", "a.json".to_string());
///
/// assert_eq!(index.search("husky").len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct HashMapIndex<V> {
    buckets: Vec<Option<Bucket<V>>>,
    occupied: usize,
    max_load_factor: f64,
}

impl<V: IndexValue> HashMapIndex<V> {
    /// Creates a table with the default capacity (500 000 buckets).
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_HASH_CAPACITY)
    }

    /// Creates a table with `capacity` buckets and the default load factor.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self::build(capacity, DEFAULT_MAX_LOAD_FACTOR)
    }

    /// Creates a table with explicit capacity and growth threshold.
    ///
    /// Fails with [`IndexError::InvalidConfig`](crate::IndexError::InvalidConfig)
    /// unless `max_load_factor` lies between
    /// [`MIN_MAX_LOAD_FACTOR`](crate::MIN_MAX_LOAD_FACTOR) and 1.
    pub fn with_load_factor(capacity: usize, max_load_factor: f64) -> IndexResult<Self> {
        validate_load_factor(max_load_factor)?;
        Ok(Self::build(capacity, max_load_factor))
    }

    /// Capacity is clamped to `1..=MAX_HASH_CAPACITY`.
    fn build(capacity: usize, max_load_factor: f64) -> Self {
        Self {
            buckets: empty_buckets(capacity.clamp(1, MAX_HASH_CAPACITY)),
            occupied: 0,
            max_load_factor,
        }
    }

    /// Rebuilds a table from persisted buckets.
    pub(crate) fn from_parts(buckets: Vec<Option<Bucket<V>>>, max_load_factor: f64) -> Self {
        let occupied = buckets.iter().filter(|b| b.is_some()).count();
        Self {
            buckets,
            occupied,
            max_load_factor,
        }
    }

    pub(crate) fn buckets(&self) -> &[Option<Bucket<V>>] {
        &self.buckets
    }

    /// Number of buckets.
    pub fn capacity(&self) -> usize {
        self.buckets.len()
    }

    /// Number of occupied buckets.
    pub fn occupied(&self) -> usize {
        self.occupied
    }

    /// Growth threshold.
    pub fn max_load_factor(&self) -> f64 {
        self.max_load_factor
    }

    /// Occupied buckets divided by capacity.
    pub fn load_factor(&self) -> f64 {
        self.occupied as f64 / self.capacity() as f64
    }

    /// Home bucket of `key` for the current capacity.
    pub fn home_slot(&self, key: &str) -> usize {
        home_slot(key, self.capacity())
    }

    /// Value list length of every occupied bucket, in bucket order.
    pub fn value_list_lens(&self) -> Vec<usize> {
        self.buckets
            .iter()
            .flatten()
            .map(|bucket| bucket.values.len())
            .collect()
    }

    /// Mean value list length over occupied buckets, `None` when empty.
    pub fn avg_value_list_len(&self) -> Option<f64> {
        if self.occupied == 0 {
            return None;
        }
        let total: usize = self.value_list_lens().iter().sum();
        Some(total as f64 / self.occupied as f64)
    }

    /// Iterates occupied buckets in bucket order.
    pub fn iter(&self) -> impl Iterator<Item = Entry<'_, V>> + '_ {
        self.buckets
            .iter()
            .flatten()
            .map(|bucket| (bucket.key.as_str(), bucket.values.as_slice()))
    }

    /// Bucket currently holding `key`.
    pub(crate) fn locate(&self, key: &str) -> Option<usize> {
        match self.probe(key) {
            Probe::Found(slot) => Some(slot),
            Probe::Vacant(_) | Probe::Full => None,
        }
    }

    fn probe(&self, key: &str) -> Probe {
        let capacity = self.capacity();
        let home = home_slot(key, capacity);
        for step in 0..capacity {
            let slot = (home + step) % capacity;
            match &self.buckets[slot] {
                None => return Probe::Vacant(slot),
                Some(bucket) if bucket.key == key => return Probe::Found(slot),
                Some(_) => {}
            }
        }
        Probe::Full
    }

    /// Doubles the capacity and rehashes every occupied bucket.
    fn grow(&mut self) {
        let new_capacity = self.capacity() * 2;
        debug!(
            from = self.capacity(),
            to = new_capacity,
            occupied = self.occupied,
            "growing hash index"
        );

        let old = std::mem::replace(&mut self.buckets, empty_buckets(new_capacity));
        for bucket in old.into_iter().flatten() {
            match self.probe(&bucket.key) {
                Probe::Vacant(slot) => self.buckets[slot] = Some(bucket),
                // Doubled table holds at most half as many entries as buckets.
                Probe::Found(_) | Probe::Full => unreachable!("rehash into a larger table"),
            }
        }
    }
}

impl<V: IndexValue> Default for HashMapIndex<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: IndexValue> Index<V> for HashMapIndex<V> {
    fn kind(&self) -> BackendKind {
        BackendKind::Hash
    }

    fn insert(&mut self, key: &str, value: V) {
        if key.is_empty() {
            return;
        }

        match self.probe(key) {
            Probe::Found(slot) => {
                if let Some(bucket) = self.buckets[slot].as_mut() {
                    if !bucket.values.contains(&value) {
                        bucket.values.push(value);
                    }
                }
            }
            Probe::Vacant(slot) => {
                self.buckets[slot] = Some(Bucket {
                    key: key.to_owned(),
                    values: vec![value],
                });
                self.occupied += 1;
                if self.load_factor() > self.max_load_factor {
                    self.grow();
                }
            }
            Probe::Full => {
                self.grow();
                self.insert(key, value);
            }
        }
    }

    fn search(&self, key: &str) -> &[V] {
        match self.probe(key) {
            Probe::Found(slot) => self.buckets[slot]
                .as_ref()
                .map(|bucket| bucket.values.as_slice())
                .unwrap_or_default(),
            Probe::Vacant(_) | Probe::Full => &[],
        }
    }

    fn keys_in_order(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.iter().map(|(key, _)| key).collect();
        keys.sort_unstable();
        keys
    }

    fn entries(&self) -> Box<dyn Iterator<Item = Entry<'_, V>> + '_> {
        Box::new(self.iter())
    }

    fn len(&self) -> usize {
        self.occupied
    }

    fn stats(&self) -> IndexStats {
        let mut stats = IndexStats::new(
            BackendKind::Hash,
            self.occupied,
            self.value_list_lens().iter().sum(),
        );
        stats.capacity = Some(self.capacity());
        stats.load_factor = Some(self.load_factor());
        stats.avg_value_list_len = self.avg_value_list_len();
        stats
    }
}

/// SHA-256 of `key` as a big-endian integer, modulo `capacity`.
pub fn home_slot(key: &str, capacity: usize) -> usize {
    let digest = Sha256::digest(key.as_bytes());
    let modulus = capacity.max(1) as u128;
    let slot = digest
        .iter()
        .fold(0u128, |acc, &byte| (acc * 256 + u128::from(byte)) % modulus);
    slot as usize
}

fn empty_buckets<V>(capacity: usize) -> Vec<Option<Bucket<V>>> {
    std::iter::repeat_with(|| None).take(capacity).collect()
}
