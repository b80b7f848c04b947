//! Coordinate-seeded randomness.
//!
//! Every random decision in world generation is drawn from a generator seeded by the
//! world seed, the block position and a per-feature salt. The same seed therefore
//! always produces the same ore pockets and trees, independent of the order in which
//! chunks are streamed in.

use cgmath::Point3;

/// Salt for ore placement inside stone.
pub const SALT_ORE: u64 = 0x6f72_6500;
/// Salt for tree trunk seeding on the surface.
pub const SALT_TREE: u64 = 0x7472_6565;
/// Salt for the initial growth power of a trunk.
pub const SALT_TREE_POWER: u64 = 0x706f_7772;

/// Finalizer from SplitMix64. Spreads nearby inputs over the whole `u64` range.
#[inline]
fn mix64(mut value: u64) -> u64 {
    value = (value ^ (value >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    value = (value ^ (value >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    value ^ (value >> 31)
}

/// Hashes a seed, a block position and a salt into a single 64-bit seed.
pub fn coordinate_seed(seed: u32, position: Point3<i32>, salt: u64) -> u64 {
    let mut hash = mix64(seed as u64 ^ salt);
    hash = mix64(hash ^ position.x as u32 as u64);
    hash = mix64(hash ^ ((position.y as u32 as u64) << 21));
    mix64(hash ^ ((position.z as u32 as u64) << 42))
}

/// A random generator dedicated to one block position and one feature.
pub fn coordinate_rng(seed: u32, position: Point3<i32>, salt: u64) -> fastrand::Rng {
    fastrand::Rng::with_seed(coordinate_seed(seed, position, salt))
}
