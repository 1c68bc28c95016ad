/// A stored entry. The key's hash is kept next to it so a split can
/// partition the bucket without hashing every key again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pair<K, V> {
    pub key: K,
    pub value: V,
    pub hash: u64,
}

impl<K, V> Pair<K, V> {
    pub fn new(key: K, value: V, hash: u64) -> Self {
        Pair { key, value, hash }
    }

    /// Whether bit `bit` of the stored hash is set.
    #[inline]
    pub fn hash_bit(&self, bit: u32) -> bool {
        self.hash & (1 << bit) != 0
    }
}
