pub mod bucket;
pub mod config;
mod directory;
mod table;

pub use config::{ConfigError, TableConfig};
pub use table::{ExtendibleHashTable, TableError};

use crate::utils::hashing::HASH_BITS;

pub const DEFAULT_CAPACITY: usize = 10;

// The directory holds 2^global_depth slots, so the depth is bounded both by
// the hash width and by what a slot count in `usize` can express.
pub const MAX_GLOBAL_DEPTH: u32 = if usize::BITS - 1 < HASH_BITS {
    usize::BITS - 1
} else {
    HASH_BITS
};
