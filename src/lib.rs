//! An in-memory extendible hashing index.
//!
//! [`ExtendibleHashTable`] maps keys to values through a directory of
//! `2^global_depth` slots. Slots point at fixed-capacity buckets, several
//! slots sharing a bucket until it fills up and splits on the next hash bit.
//! Growth is local to the bucket being split, with the directory doubling
//! only when that bucket already uses every routing bit.

pub mod extendable_hashing;
pub mod hash;
pub mod utils;

pub use extendable_hashing::{ConfigError, ExtendibleHashTable, TableConfig, TableError};
pub use hash::HashIndex;
pub use utils::hashing::KeyHash;
