pub mod hashing;
pub mod pair;

/// Mask selecting the low `depth` bits of a hash.
///
/// 0 gives an empty mask (a single directory slot), `HASH_BITS` gives all
/// ones.
#[inline]
pub fn low_bits_mask(depth: u32) -> u64 {
    1u64.checked_shl(depth).unwrap_or(0).wrapping_sub(1)
}
