use crate::utils::hashing::HASH_BITS;
use crate::utils::pair::Pair;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BucketError {
    #[error("The bucket is full (capacity {capacity})")]
    BucketFull { capacity: usize },
}

/// A fixed-capacity, unordered run of entries sharing the low `local_depth`
/// bits of their hash.
#[derive(Debug, Clone)]
pub struct Bucket<K, V> {
    local_depth: u32,
    capacity: usize,
    pairs: Vec<Pair<K, V>>,
}

impl<K: Eq, V> Bucket<K, V> {
    pub fn new(capacity: usize, local_depth: u32) -> Self {
        Bucket {
            local_depth,
            capacity,
            pairs: Vec::with_capacity(capacity),
        }
    }

    #[inline]
    pub fn local_depth(&self) -> u32 {
        self.local_depth
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.pairs.len() >= self.capacity
    }

    pub fn find(&self, key: &K) -> Option<&V> {
        self.pairs
            .iter()
            .find(|pair| pair.key == *key)
            .map(|pair| &pair.value)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.find(key).is_some()
    }

    /// Stores the entry, replacing the value if the key is already present.
    /// Only a new key can be refused for lack of room.
    pub fn insert(&mut self, key: K, value: V, hash: u64) -> Result<(), BucketError> {
        if let Some(pair) = self.pairs.iter_mut().find(|pair| pair.key == key) {
            pair.value = value;
            return Ok(());
        }
        if self.is_full() {
            return Err(BucketError::BucketFull {
                capacity: self.capacity,
            });
        }
        self.pairs.push(Pair::new(key, value, hash));
        Ok(())
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        let position = self.pairs.iter().position(|pair| pair.key == *key)?;
        // Order inside a bucket is irrelevant.
        Some(self.pairs.swap_remove(position).value)
    }

    /// Raises the local depth by one and moves every entry whose hash has the
    /// newly significant bit set into a fresh sibling of the same depth.
    pub fn split(&mut self) -> Bucket<K, V> {
        let split_bit = self.local_depth;
        self.local_depth += 1;
        let mut sibling = Bucket::new(self.capacity, self.local_depth);
        let (moved, kept): (Vec<_>, Vec<_>) = self
            .pairs
            .drain(..)
            .partition(|pair| pair.hash_bit(split_bit));
        self.pairs = kept;
        sibling.pairs = moved;
        sibling
    }

    /// The smallest local depth at which at least one stored entry would be
    /// routed away from `hash`, or `None` if every entry shares all
    /// `HASH_BITS` bits with it.
    pub fn separating_depth(&self, hash: u64) -> Option<u32> {
        self.pairs
            .iter()
            .map(|pair| (pair.hash ^ hash).trailing_zeros())
            .filter(|&bit| bit < HASH_BITS)
            .min()
            .map(|bit| bit + 1)
    }

    #[cfg(test)]
    pub(crate) fn pairs(&self) -> &[Pair<K, V>] {
        &self.pairs
    }
}
