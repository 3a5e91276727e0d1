//! Bit-level helpers over bit-strings.
//!
//! Bit positions are 1-indexed from the most significant bit of the first
//! byte. Position `0` denotes "no bit" and always reads as zero, which lets a
//! trie header branch uniformly to the left. Bytes past the end of a string
//! read as zero.

use std::cmp::Ordering;
use std::fmt::Write as _;

/// Returns the bit of `bits` at the 1-indexed position `position`.
///
/// Positions past the end of the string, and position `0`, read as `0`.
///
/// # Examples
///
/// ```rust
/// use symtab::bits::get_bit;
///
/// // 'M' = 0b0100_1101
/// assert_eq!(get_bit(b"M", 1), 0);
/// assert_eq!(get_bit(b"M", 2), 1);
/// assert_eq!(get_bit(b"M", 9), 0);
/// ```
#[inline]
#[must_use]
pub fn get_bit(bits: &[u8], position: usize) -> u8 {
    if position == 0 {
        return 0;
    }
    let index = position - 1;
    bits.get(index / 8).map_or(0, |&byte| (byte >> (7 - index % 8)) & 1)
}

/// Returns the 1-indexed position of the first bit where `left` and `right`
/// differ, or `None` if they are equal once the shorter one is padded with
/// zero bytes.
///
/// # Examples
///
/// ```rust
/// use symtab::bits::diff_bit_position;
///
/// assert_eq!(diff_bit_position(b"Milad", b"Mona"), Some(14));
/// assert_eq!(diff_bit_position(b"A", b"A\0\0"), None);
/// ```
#[must_use]
pub fn diff_bit_position(left: &[u8], right: &[u8]) -> Option<usize> {
    let length = left.len().max(right.len());
    (0..length).find_map(|index| {
        let left_byte = left.get(index).copied().unwrap_or(0);
        let right_byte = right.get(index).copied().unwrap_or(0);
        let difference = left_byte ^ right_byte;
        (difference != 0).then(|| index * 8 + difference.leading_zeros() as usize + 1)
    })
}

/// Orders two bit-strings by their first differing bit.
///
/// This is lexicographic byte order with zero padding, so `"A"` and `"A\0"`
/// compare equal.
#[must_use]
pub fn compare_bits(left: &[u8], right: &[u8]) -> Ordering {
    diff_bit_position(left, right).map_or(Ordering::Equal, |position| {
        get_bit(left, position).cmp(&get_bit(right, position))
    })
}

/// Renders a bit-string as binary digits, most significant bit first.
///
/// # Examples
///
/// ```rust
/// use symtab::bits::format_bits;
///
/// assert_eq!(format_bits(b"M"), "01001101");
/// assert_eq!(format_bits(b""), "");
/// ```
#[must_use]
pub fn format_bits(bits: &[u8]) -> String {
    let mut rendered = String::with_capacity(bits.len() * 8);
    for byte in bits {
        let _ = write!(rendered, "{byte:08b}");
    }
    rendered
}
