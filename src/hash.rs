use crate::extendable_hashing::TableError;

/// Point operations shared by key-value indexes.
pub trait HashIndex<K, V> {
    fn get(&self, key: &K) -> Option<V>;
    fn insert(&self, key: K, value: V) -> Result<(), TableError>;
    fn delete(&self, key: &K) -> bool;
}
