//! Branching configuration of the trie.
//!
//! Every level consumes `LOG_BRANCHING_FACTOR` bits of a 32-bit key hash,
//! least significant bits first.

#[cfg(not(feature = "narrow-nodes"))]
pub const LOG_BRANCHING_FACTOR: u32 = 5;
#[cfg(feature = "narrow-nodes")]
pub const LOG_BRANCHING_FACTOR: u32 = 4;

pub const BRANCHING_FACTOR: u32 = 1 << LOG_BRANCHING_FACTOR;
pub const DIGIT_MASK: u32 = BRANCHING_FACTOR - 1;

/// Shift of the deepest compact level. Keys colliding below it share a bucket.
pub const MAX_SHIFT: u32 = (u32::BITS - 1) / LOG_BRANCHING_FACTOR * LOG_BRANCHING_FACTOR;

/// Compact levels plus the bucket level.
pub const MAX_DEPTH: usize = (MAX_SHIFT / LOG_BRANCHING_FACTOR) as usize + 2;

pub fn digit(hash: u32, shift: u32) -> u32 {
    (hash >> shift) & DIGIT_MASK
}
