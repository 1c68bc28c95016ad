use std::hash::{DefaultHasher, Hash, Hasher};

/// Width in bits of every key hash.
pub const HASH_BITS: u32 = u64::BITS;

pub fn calculate_hash<T: Hash + ?Sized>(t: &T) -> u64 {
    let mut hasher = DefaultHasher::new(); // Fixed keys, so the result is stable across calls
    t.hash(&mut hasher);
    hasher.finish()
}

/// The single hashing contract keys must satisfy to be stored in the index.
///
/// Implementations must be total and deterministic: the same key has to
/// produce the same hash for the whole lifetime of a table, otherwise a key
/// can be routed to a bucket that never held it.
pub trait KeyHash {
    fn key_hash(&self) -> u64;
}

// Page ids and friends route by their own bits.
macro_rules! identity_key_hash {
    ($($ty:ty),* $(,)?) => {
        $(
            impl KeyHash for $ty {
                #[inline]
                fn key_hash(&self) -> u64 {
                    *self as u64
                }
            }
        )*
    };
}

identity_key_hash!(u8, u16, u32, u64, usize, i8, i16, i32, i64, isize, bool, char);

impl KeyHash for str {
    fn key_hash(&self) -> u64 {
        calculate_hash(self)
    }
}

impl KeyHash for String {
    fn key_hash(&self) -> u64 {
        self.as_str().key_hash()
    }
}

impl KeyHash for [u8] {
    fn key_hash(&self) -> u64 {
        calculate_hash(self)
    }
}

impl KeyHash for Vec<u8> {
    fn key_hash(&self) -> u64 {
        self.as_slice().key_hash()
    }
}

impl<T: KeyHash + ?Sized> KeyHash for &T {
    #[inline]
    fn key_hash(&self) -> u64 {
        (**self).key_hash()
    }
}
