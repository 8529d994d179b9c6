//! Utilities.

use itertools::Itertools;

/// Returns a mask of the `width` least significant bits.
pub const fn low_mask(width: usize) -> u64 {
    if width >= 64 {
        u64::MAX
    } else {
        (1 << width) - 1
    }
}

/// Returns the XOR reduction of all bits of `value`.
pub const fn parity(value: u64) -> bool { value.count_ones() % 2 == 1 }

/// Formats a word array most significant word first, e.g. `00001020_00000007_4f000000_0202cafd`.
pub fn format_words(words: &[u32]) -> String { words.iter().rev().map(|w| format!("{:08x}", w)).join("_") }
