use crate::extendable_hashing::{DEFAULT_CAPACITY, MAX_GLOBAL_DEPTH};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Bucket capacity must be greater than zero")]
    ZeroCapacity,
    #[error("Maximum global depth {requested} exceeds the limit of {limit}")]
    DepthTooLarge { requested: u32, limit: u32 },
}

/// Construction parameters of an [`ExtendibleHashTable`](super::ExtendibleHashTable).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableConfig {
    /// Entries per bucket, identical for every bucket for the table's lifetime.
    pub bucket_capacity: usize,
    /// Upper bound on the global depth. An insert that would need a deeper
    /// directory fails with `TableError::CapacityExhausted`.
    pub max_global_depth: u32,
}

impl Default for TableConfig {
    fn default() -> Self {
        TableConfig {
            bucket_capacity: DEFAULT_CAPACITY,
            max_global_depth: MAX_GLOBAL_DEPTH,
        }
    }
}

impl TableConfig {
    pub fn new(bucket_capacity: usize) -> Self {
        TableConfig {
            bucket_capacity,
            ..Default::default()
        }
    }

    pub fn bucket_capacity(mut self, bucket_capacity: usize) -> Self {
        self.bucket_capacity = bucket_capacity;
        self
    }

    pub fn max_global_depth(mut self, max_global_depth: u32) -> Self {
        self.max_global_depth = max_global_depth;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bucket_capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if self.max_global_depth > MAX_GLOBAL_DEPTH {
            return Err(ConfigError::DepthTooLarge {
                requested: self.max_global_depth,
                limit: MAX_GLOBAL_DEPTH,
            });
        }
        Ok(())
    }
}
