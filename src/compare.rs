//! Key capabilities supplied to a table at construction.
//!
//! Every table is configured with exactly one of the two capabilities defined
//! here:
//!
//! - [`Compare`]: a three-way ordering over keys, used by
//!   [`AvlTree`](crate::tree::AvlTree) and [`BTree`](crate::tree::BTree).
//! - [`BitString`]: a projection of a key onto a byte string that is examined
//!   bit by bit, used by [`Patricia`](crate::tree::Patricia).
//!
//! Both traits are implemented for plain closures, so ad-hoc orderings do not
//! need a named type.
//!
//! # Examples
//!
//! ```rust
//! use std::cmp::Ordering;
//! use symtab::compare::{Compare, NaturalOrder};
//!
//! assert_eq!(NaturalOrder.compare(&1, &2), Ordering::Less);
//!
//! let by_length = |left: &&str, right: &&str| left.len().cmp(&right.len());
//! assert_eq!(by_length.compare(&"abc", &"de"), Ordering::Greater);
//! ```

use std::cmp::Ordering;
use std::fmt;

// =============================================================================
// Ordering
// =============================================================================

/// A total order over keys of type `K`.
///
/// Implementations must be consistent: `compare(a, b)` and `compare(b, a)`
/// are opposite, and the order is transitive. A table relies on this for all
/// of its structural invariants.
pub trait Compare<K: ?Sized> {
    /// Compares two keys.
    fn compare(&self, left: &K, right: &K) -> Ordering;
}

impl<K: ?Sized, F> Compare<K> for F
where
    F: Fn(&K, &K) -> Ordering,
{
    #[inline]
    fn compare(&self, left: &K, right: &K) -> Ordering {
        self(left, right)
    }
}

/// The ordering given by the key's own [`Ord`] implementation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct NaturalOrder;

impl<K: Ord + ?Sized> Compare<K> for NaturalOrder {
    #[inline]
    fn compare(&self, left: &K, right: &K) -> Ordering {
        left.cmp(right)
    }
}

// =============================================================================
// Bit-string projection
// =============================================================================

/// Projects a key onto the byte string a Patricia trie branches on.
///
/// Bits are read most-significant first, and a shorter string behaves as if
/// it were padded with zero bytes. Two keys whose projections only differ by
/// trailing zero bytes are therefore the same key to a trie.
pub trait BitString<K: ?Sized> {
    /// Returns the bit-string of `key`.
    fn bit_string(&self, key: &K) -> Vec<u8>;
}

impl<K: ?Sized, F> BitString<K> for F
where
    F: Fn(&K) -> Vec<u8>,
{
    #[inline]
    fn bit_string(&self, key: &K) -> Vec<u8> {
        self(key)
    }
}

/// Uses the key's raw bytes, e.g. the UTF-8 encoding of a `String`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ByteString;

impl<K: AsRef<[u8]> + ?Sized> BitString<K> for ByteString {
    #[inline]
    fn bit_string(&self, key: &K) -> Vec<u8> {
        key.as_ref().to_vec()
    }
}

/// Uses the bytes of the key's [`Display`](fmt::Display) rendering.
///
/// For integers this is the decimal representation, so the induced order is
/// lexicographic over digits (`"10" < "9"`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct DisplayBytes;

impl<K: fmt::Display + ?Sized> BitString<K> for DisplayBytes {
    #[inline]
    fn bit_string(&self, key: &K) -> Vec<u8> {
        key.to_string().into_bytes()
    }
}

/// Uses the big-endian encoding of an unsigned integer.
///
/// Every key has the same width, so the induced order matches numeric order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct BigEndian;

macro_rules! impl_big_endian {
    ($($unsigned:ty),* $(,)?) => {
        $(
            impl BitString<$unsigned> for BigEndian {
                #[inline]
                fn bit_string(&self, key: &$unsigned) -> Vec<u8> {
                    key.to_be_bytes().to_vec()
                }
            }
        )*
    };
}

impl_big_endian!(u8, u16, u32, u64, u128, usize);
