//! Index configuration.

use crate::error::{IndexError, IndexResult};
use crate::types::BackendKind;

/// Default bucket count for the hash backend.
pub const DEFAULT_HASH_CAPACITY: usize = 500_000;

/// Default occupancy ratio above which the hash backend grows.
pub const DEFAULT_MAX_LOAD_FACTOR: f64 = 0.9;

/// Largest initial bucket count accepted for the hash backend.
pub const MAX_HASH_CAPACITY: usize = 1 << 20;

/// Smallest accepted growth threshold.
///
/// Each doubling needs `max_load_factor * capacity` occupied buckets, so a
/// threshold near zero would grow the table on every insert.
pub const MIN_MAX_LOAD_FACTOR: f64 = 0.1;

/// Configuration for building an index.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexConfig {
    /// Which backend to build.
    pub backend: BackendKind,

    /// Initial bucket count of the hash backend.
    pub hash_capacity: usize,

    /// Occupied/capacity ratio that triggers hash table growth.
    pub max_load_factor: f64,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::Avl,
            hash_capacity: DEFAULT_HASH_CAPACITY,
            max_load_factor: DEFAULT_MAX_LOAD_FACTOR,
        }
    }
}

impl IndexConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the backend.
    #[must_use]
    pub const fn backend(mut self, backend: BackendKind) -> Self {
        self.backend = backend;
        self
    }

    /// Sets the initial hash capacity.
    #[must_use]
    pub const fn hash_capacity(mut self, capacity: usize) -> Self {
        self.hash_capacity = capacity;
        self
    }

    /// Sets the hash growth threshold.
    #[must_use]
    pub const fn max_load_factor(mut self, load_factor: f64) -> Self {
        self.max_load_factor = load_factor;
        self
    }

    /// Checks that all values are in range.
    pub fn validate(&self) -> IndexResult<()> {
        if self.hash_capacity == 0 || self.hash_capacity > MAX_HASH_CAPACITY {
            return Err(IndexError::invalid_config(format!(
                "hash capacity must be in 1..={MAX_HASH_CAPACITY}, got {}",
                self.hash_capacity
            )));
        }
        validate_load_factor(self.max_load_factor)
    }
}

/// Checks a hash growth threshold against `[MIN_MAX_LOAD_FACTOR, 1]`.
pub(crate) fn validate_load_factor(load_factor: f64) -> IndexResult<()> {
    if (MIN_MAX_LOAD_FACTOR..=1.0).contains(&load_factor) {
        Ok(())
    } else {
        Err(IndexError::invalid_config(format!(
            "max load factor must be in [{MIN_MAX_LOAD_FACTOR}, 1], got {load_factor}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = IndexConfig::default();
        assert_eq!(config.backend, BackendKind::Avl);
        assert_eq!(config.hash_capacity, 500_000);
        assert!((config.max_load_factor - 0.9).abs() < f64::EPSILON);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn builder_pattern() {
        let config = IndexConfig::new()
            .backend(BackendKind::Hash)
            .hash_capacity(16)
            .max_load_factor(0.5);

        assert_eq!(config.backend, BackendKind::Hash);
        assert_eq!(config.hash_capacity, 16);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_out_of_range_values() {
        assert!(IndexConfig::new().hash_capacity(0).validate().is_err());
        assert!(IndexConfig::new()
            .hash_capacity(MAX_HASH_CAPACITY + 1)
            .validate()
            .is_err());
        assert!(IndexConfig::new().max_load_factor(0.05).validate().is_err());
        assert!(IndexConfig::new().max_load_factor(-1.0).validate().is_err());
        assert!(IndexConfig::new().max_load_factor(0.0).validate().is_err());
        assert!(IndexConfig::new().max_load_factor(1.5).validate().is_err());
        assert!(IndexConfig::new().max_load_factor(f64::NAN).validate().is_err());
    }
}
