use crate::extendable_hashing::bucket::BucketError;
use crate::extendable_hashing::config::{ConfigError, TableConfig};
use crate::extendable_hashing::directory::Directory;
use crate::hash::HashIndex;
use crate::utils::hashing::KeyHash;
use parking_lot::RwLock;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TableError {
    #[error("No split within global depth {max_global_depth} can make room for the key (global depth is {global_depth})")]
    CapacityExhausted {
        global_depth: u32,
        max_global_depth: u32,
    },
    #[error("Directory slot {index} is out of range for {len} slots")]
    SlotOutOfRange { index: usize, len: usize },
    #[error(transparent)]
    Bucket(#[from] BucketError),
}

/// An in-memory extendible hash index.
///
/// Keys are routed by the low `global_depth` bits of their [`KeyHash`]. A
/// full bucket is split one hash bit at a time, doubling the directory only
/// when the bucket already uses every routing bit, so growth touches a
/// single bucket instead of rehashing the whole table. The table never
/// shrinks.
///
/// All operations go through one table-wide reader/writer lock: lookups and
/// the depth/bucket counters share it, while inserts and removals hold it
/// exclusively for their whole duration, splits included.
pub struct ExtendibleHashTable<K, V> {
    dir: RwLock<Directory<K, V>>,
}

impl<K: KeyHash + Eq, V> ExtendibleHashTable<K, V> {
    pub fn new(bucket_capacity: usize) -> Result<Self, ConfigError> {
        Self::with_config(TableConfig::new(bucket_capacity))
    }

    pub fn with_config(config: TableConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        log::debug!(
            "new extendible hash table: bucket capacity {}, max global depth {}",
            config.bucket_capacity,
            config.max_global_depth
        );
        Ok(ExtendibleHashTable {
            dir: RwLock::new(Directory::new(config)),
        })
    }

    /// Looks up `key`, returning a copy of its value.
    pub fn find(&self, key: &K) -> Option<V>
    where
        V: Clone,
    {
        self.dir.read().find(key).cloned()
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.dir.read().find(key).is_some()
    }

    /// Stores `value` under `key` unless the key is already present, in which
    /// case the existing value is left untouched.
    ///
    /// Fails only when the key's bucket is full of entries whose hashes agree
    /// with the key's on every bit up to the configured maximum global depth.
    /// The table is unchanged on failure.
    pub fn insert(&self, key: K, value: V) -> Result<(), TableError> {
        self.dir.write().insert(key, value)
    }

    /// Removes `key`, returning whether it was present. Buckets and the
    /// directory keep their size.
    pub fn remove(&self, key: &K) -> bool {
        self.dir.write().remove(key).is_some()
    }

    pub fn global_depth(&self) -> u32 {
        self.dir.read().global_depth()
    }

    /// Local depth of the bucket referenced by directory slot `slot_index`.
    pub fn local_depth(&self, slot_index: usize) -> Result<u32, TableError> {
        self.dir.read().local_depth(slot_index)
    }

    /// Number of distinct buckets.
    pub fn num_buckets(&self) -> usize {
        self.dir.read().num_buckets()
    }

    pub fn bucket_capacity(&self) -> usize {
        self.dir.read().bucket_capacity()
    }

    pub fn len(&self) -> usize {
        self.dir.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K: KeyHash + Eq, V> Default for ExtendibleHashTable<K, V> {
    fn default() -> Self {
        ExtendibleHashTable {
            dir: RwLock::new(Directory::new(TableConfig::default())),
        }
    }
}

impl<K: KeyHash + Eq, V: Clone> HashIndex<K, V> for ExtendibleHashTable<K, V> {
    fn get(&self, key: &K) -> Option<V> {
        self.find(key)
    }

    fn insert(&self, key: K, value: V) -> Result<(), TableError> {
        ExtendibleHashTable::insert(self, key, value)
    }

    fn delete(&self, key: &K) -> bool {
        self.remove(key)
    }
}
