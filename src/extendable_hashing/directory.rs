use crate::extendable_hashing::bucket::Bucket;
use crate::extendable_hashing::config::TableConfig;
use crate::extendable_hashing::table::TableError;
use crate::utils::hashing::KeyHash;
use crate::utils::low_bits_mask;

/// Slot array plus the bucket arena it points into.
///
/// A slot holds an index into `buckets`, so several slots can share a bucket
/// while its local depth is below the global depth. Buckets are never
/// removed from the arena, which keeps every index stable.
#[derive(Debug)]
pub struct Directory<K, V> {
    buckets: Vec<Bucket<K, V>>,
    slots: Vec<usize>,
    global_depth: u32,
    max_global_depth: u32,
    bucket_capacity: usize,
    len: usize,
}

impl<K: KeyHash + Eq, V> Directory<K, V> {
    /// Assumes `config` has been validated.
    pub fn new(config: TableConfig) -> Self {
        Directory {
            buckets: vec![Bucket::new(config.bucket_capacity, 0)],
            slots: vec![0],
            global_depth: 0,
            max_global_depth: config.max_global_depth,
            bucket_capacity: config.bucket_capacity,
            len: 0,
        }
    }

    #[inline]
    pub fn global_depth(&self) -> u32 {
        self.global_depth
    }

    #[inline]
    pub fn bucket_capacity(&self) -> usize {
        self.bucket_capacity
    }

    #[inline]
    pub fn num_buckets(&self) -> usize {
        self.buckets.len()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn local_depth(&self, slot_index: usize) -> Result<u32, TableError> {
        let bucket_index = self
            .slots
            .get(slot_index)
            .ok_or(TableError::SlotOutOfRange {
                index: slot_index,
                len: self.slots.len(),
            })?;
        Ok(self.buckets[*bucket_index].local_depth())
    }

    /// Slot owning `hash` under the current global depth.
    #[inline]
    fn index_of(&self, hash: u64) -> usize {
        (hash & low_bits_mask(self.global_depth)) as usize
    }

    #[inline]
    fn bucket_for(&self, hash: u64) -> &Bucket<K, V> {
        &self.buckets[self.slots[self.index_of(hash)]]
    }

    #[inline]
    fn bucket_for_mut(&mut self, hash: u64) -> &mut Bucket<K, V> {
        let bucket_index = self.slots[self.index_of(hash)];
        &mut self.buckets[bucket_index]
    }

    pub fn find(&self, key: &K) -> Option<&V> {
        let hash = key.key_hash();
        log::trace!("find routes hash {:#x} to slot {}", hash, self.index_of(hash));
        self.bucket_for(hash).find(key)
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        let removed = self.bucket_for_mut(key.key_hash()).remove(key);
        if removed.is_some() {
            self.len -= 1;
        }
        removed
    }

    /// Places the entry, splitting the target bucket (and doubling the
    /// directory when needed) until it has room. A key that is already
    /// present keeps its stored value.
    pub fn insert(&mut self, key: K, value: V) -> Result<(), TableError> {
        let hash = key.key_hash();
        loop {
            let slot = self.index_of(hash);
            let bucket_index = self.slots[slot];
            let bucket = &mut self.buckets[bucket_index];
            if bucket.contains(&key) {
                log::trace!("key with hash {:#x} already present, insert ignored", hash);
                return Ok(());
            }
            if !bucket.is_full() {
                bucket.insert(key, value, hash)?;
                self.len += 1;
                return Ok(());
            }
            self.ensure_splittable(bucket_index, hash)?;
            self.split(slot);
        }
    }

    /// Fails before any growth happens if splitting within
    /// `max_global_depth` can never move an entry out of the way of `hash`.
    fn ensure_splittable(&self, bucket_index: usize, hash: u64) -> Result<(), TableError> {
        let bucket = &self.buckets[bucket_index];
        match bucket.separating_depth(hash) {
            Some(depth) if depth <= self.max_global_depth => Ok(()),
            _ => {
                log::warn!(
                    "bucket {} with local depth {} cannot make room for hash {:#x} within depth {}",
                    bucket_index,
                    bucket.local_depth(),
                    hash,
                    self.max_global_depth
                );
                Err(TableError::CapacityExhausted {
                    global_depth: self.global_depth,
                    max_global_depth: self.max_global_depth,
                })
            }
        }
    }

    /// Splits the bucket behind `slot` once, doubling the directory first if
    /// the bucket already uses every routing bit.
    fn split(&mut self, slot: usize) {
        let bucket_index = self.slots[slot];
        if self.buckets[bucket_index].local_depth() == self.global_depth {
            self.double();
        }

        let sibling = self.buckets[bucket_index].split();
        let new_depth = sibling.local_depth();
        let split_bit = 1usize << (new_depth - 1);
        let sibling_index = self.buckets.len();
        log::debug!(
            "split bucket {} at local depth {}: {} entries kept, {} moved to bucket {}",
            bucket_index,
            new_depth,
            self.buckets[bucket_index].len(),
            sibling.len(),
            sibling_index
        );
        self.buckets.push(sibling);

        // Exactly the aliasing slots with the new bit set follow the sibling.
        for (index, target) in self.slots.iter_mut().enumerate() {
            if *target == bucket_index && index & split_bit != 0 {
                *target = sibling_index;
            }
        }
    }

    /// Doubles the slot array. The upper half aliases the lower half, so no
    /// key changes bucket.
    fn double(&mut self) {
        self.slots.extend_from_within(..);
        self.global_depth += 1;
        log::debug!(
            "directory doubled to global depth {} ({} slots)",
            self.global_depth,
            self.slots.len()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::collections::HashMap;

    fn directory(capacity: usize) -> Directory<u64, u64> {
        Directory::new(TableConfig::new(capacity))
    }

    /// Checks the structural invariants over the whole directory.
    fn check_invariants<K: KeyHash + Eq, V>(dir: &Directory<K, V>) {
        assert_eq!(dir.slots.len(), 1 << dir.global_depth);
        for (bucket_index, bucket) in dir.buckets.iter().enumerate() {
            assert!(bucket.len() <= dir.bucket_capacity);
            assert!(bucket.local_depth() <= dir.global_depth);
            let aliases: Vec<usize> = dir
                .slots
                .iter()
                .enumerate()
                .filter(|&(_, &b)| b == bucket_index)
                .map(|(slot, _)| slot)
                .collect();
            assert_eq!(
                aliases.len(),
                1 << (dir.global_depth - bucket.local_depth()),
                "bucket {} has the wrong number of slots",
                bucket_index
            );
            let stride = 1usize << bucket.local_depth();
            let residue = aliases[0] % stride;
            assert!(aliases.iter().all(|slot| slot % stride == residue));
            for pair in bucket.pairs() {
                assert_eq!(pair.hash as usize % stride, residue);
            }
        }
        assert_eq!(dir.buckets.iter().map(Bucket::len).sum::<usize>(), dir.len);
    }

    #[test]
    fn test_new_directory() {
        let dir = directory(4);
        assert_eq!(dir.global_depth(), 0);
        assert_eq!(dir.num_buckets(), 1);
        assert_eq!(dir.bucket_capacity(), 4);
        assert_eq!(dir.local_depth(0), Ok(0));
        assert_eq!(
            dir.local_depth(1),
            Err(TableError::SlotOutOfRange { index: 1, len: 1 })
        );
        check_invariants(&dir);
    }

    #[test]
    fn test_third_key_forces_one_split() {
        let mut dir = directory(2);
        dir.insert(0b100, 1).unwrap();
        dir.insert(0b101, 2).unwrap();
        assert_eq!(dir.global_depth(), 0);
        dir.insert(0b110, 3).unwrap();
        assert_eq!(dir.global_depth(), 1);
        assert_eq!(dir.num_buckets(), 2);

        let even: Vec<u64> = dir.buckets[dir.slots[0]].pairs().iter().map(|p| p.key).collect();
        let odd: Vec<u64> = dir.buckets[dir.slots[1]].pairs().iter().map(|p| p.key).collect();
        assert_eq!(even.len(), 2);
        assert!(even.contains(&0b100) && even.contains(&0b110));
        assert_eq!(odd, vec![0b101]);
        check_invariants(&dir);
    }

    #[test]
    fn test_repeated_splits_in_one_insert() {
        // Every key shares the low three bits, so the insert has to go four
        // levels deep before the bucket separates.
        let mut dir = directory(2);
        dir.insert(0b0000, 0).unwrap();
        dir.insert(0b1000, 1).unwrap();
        dir.insert(0b10000, 2).unwrap();
        assert_eq!(dir.global_depth(), 4);
        assert_eq!(dir.num_buckets(), 5);
        for key in [0b0000, 0b1000, 0b10000] {
            assert!(dir.find(&key).is_some());
        }
        check_invariants(&dir);
    }

    #[test]
    fn test_split_below_global_depth_repoints_half_the_aliases() {
        let mut dir = directory(1);
        // 0 and 1 split on bit 0; 2 then drives the even side to depth 2
        // while the odd bucket stays at depth 1.
        dir.insert(0, 0).unwrap();
        dir.insert(1, 1).unwrap();
        dir.insert(2, 2).unwrap();
        assert_eq!(dir.global_depth(), 2);
        assert_eq!(dir.local_depth(1), Ok(1));
        assert_eq!(dir.local_depth(3), Ok(1));
        assert_eq!(dir.slots[1], dir.slots[3]);

        // Grow the even side further so the odd bucket aliases four slots.
        dir.insert(4, 4).unwrap();
        assert_eq!(dir.global_depth(), 3);
        let odd = dir.slots[1];
        assert_eq!(
            dir.slots.iter().filter(|&&b| b == odd).count(),
            4,
            "odd bucket aliases slots 1, 3, 5, 7"
        );

        // Splitting the odd bucket now happens without doubling and must
        // move slots 3 and 7 together.
        dir.insert(3, 3).unwrap();
        assert_eq!(dir.global_depth(), 3);
        assert_eq!(dir.slots[1], dir.slots[5]);
        assert_eq!(dir.slots[3], dir.slots[7]);
        assert_ne!(dir.slots[1], dir.slots[3]);
        assert_eq!(dir.find(&3), Some(&3));
        assert_eq!(dir.find(&1), Some(&1));
        check_invariants(&dir);
    }

    #[test]
    fn test_duplicate_insert_keeps_first_value() {
        let mut dir = directory(2);
        dir.insert(7, 70).unwrap();
        dir.insert(7, 71).unwrap();
        assert_eq!(dir.find(&7), Some(&70));
        assert_eq!(dir.len(), 1);
    }

    #[test]
    fn test_duplicate_insert_into_full_bucket_does_not_grow() {
        let mut dir = directory(2);
        dir.insert(0, 0).unwrap();
        dir.insert(2, 2).unwrap();
        dir.insert(2, 20).unwrap();
        assert_eq!(dir.global_depth(), 0);
        assert_eq!(dir.num_buckets(), 1);
        assert_eq!(dir.find(&2), Some(&2));
    }

    #[test]
    fn test_remove_does_not_shrink() {
        let mut dir = directory(1);
        for key in 0..8 {
            dir.insert(key, key).unwrap();
        }
        let depth = dir.global_depth();
        let buckets = dir.num_buckets();
        for key in 0..8 {
            assert_eq!(dir.remove(&key), Some(key));
            assert_eq!(dir.remove(&key), None);
        }
        assert_eq!(dir.len(), 0);
        assert_eq!(dir.global_depth(), depth);
        assert_eq!(dir.num_buckets(), buckets);
        check_invariants(&dir);
    }

    #[test]
    fn test_colliding_hashes_exhaust_capacity() {
        let mut dir: Directory<u64, u64> = Directory::new(TableConfig::new(2).max_global_depth(3));
        dir.insert(0b0001, 1).unwrap();
        dir.insert(0b1001, 2).unwrap();
        // Agrees with both stored keys on the low three bits.
        let err = dir.insert(0b10001, 3).unwrap_err();
        assert_eq!(
            err,
            TableError::CapacityExhausted {
                global_depth: 0,
                max_global_depth: 3
            }
        );
        // Nothing grew on the failed attempt.
        assert_eq!(dir.global_depth(), 0);
        assert_eq!(dir.num_buckets(), 1);
        assert_eq!(dir.find(&0b10001), None);

        // A key that separates on bit 1 still fits.
        dir.insert(0b0011, 4).unwrap();
        assert_eq!(dir.find(&0b0011), Some(&4));
        check_invariants(&dir);
    }

    #[test]
    fn test_identical_hashes_fail_at_full_width() {
        #[derive(PartialEq, Eq)]
        struct Colliding(u32);
        impl KeyHash for Colliding {
            fn key_hash(&self) -> u64 {
                0xdead_beef
            }
        }

        let mut dir: Directory<Colliding, ()> = Directory::new(TableConfig::new(2));
        dir.insert(Colliding(1), ()).unwrap();
        dir.insert(Colliding(2), ()).unwrap();
        assert!(matches!(
            dir.insert(Colliding(3), ()),
            Err(TableError::CapacityExhausted { .. })
        ));
        assert_eq!(dir.num_buckets(), 1);
        assert!(dir.find(&Colliding(1)).is_some());
    }

    #[test]
    fn test_random_workload_against_hashmap() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut dir: Directory<u64, u64> = directory(4);
        let mut reference: HashMap<u64, u64> = HashMap::new();
        for round in 0..5_000u64 {
            let key = rng.gen_range(0..2_000u64);
            if rng.gen_bool(0.7) {
                dir.insert(key, round).unwrap();
                reference.entry(key).or_insert(round);
            } else {
                assert_eq!(dir.remove(&key), reference.remove(&key));
            }
        }
        assert_eq!(dir.len(), reference.len());
        for (key, value) in &reference {
            assert_eq!(dir.find(key), Some(value));
        }
        check_invariants(&dir);
    }

    #[test]
    fn test_routing_is_stable_without_growth() {
        let mut dir = directory(8);
        for key in 0..16u64 {
            dir.insert(key, key).unwrap();
        }
        let depth = dir.global_depth();
        let before: Vec<usize> = (0..16u64).map(|key| dir.index_of(key.key_hash())).collect();
        dir.remove(&3);
        dir.insert(3, 3).unwrap();
        assert_eq!(dir.global_depth(), depth);
        let after: Vec<usize> = (0..16u64).map(|key| dir.index_of(key.key_hash())).collect();
        assert_eq!(before, after);
    }
}
