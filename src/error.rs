//! Error types.
//!
//! Absence of a key is never an error: lookups and deletions report it with
//! `Option`. The only fallible operation is constructing a table from an
//! invalid configuration.

use thiserror::Error;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised when a table is configured.
///
/// # Examples
///
/// ```rust
/// use symtab::Error;
/// use symtab::tree::BTree;
///
/// let error = BTree::<i32, i32>::with_order(3).unwrap_err();
/// assert_eq!(error, Error::InvalidOrder { order: 3 });
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A B-tree order must be even and at least 4.
    #[error("invalid b-tree order {order}: expected an even number of at least 4")]
    InvalidOrder {
        /// The rejected order.
        order: usize,
    },
}

/// A structural invariant that a table's self-check found broken.
///
/// A violation is a defect in the mutation logic, never a recoverable
/// condition, so these are only produced by `verify` in tests.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    /// A node's subtrees differ in height by more than one.
    #[error("node {key} is unbalanced: balance factor {balance}")]
    Unbalanced {
        /// Rendering of the offending node's key.
        key: String,
        /// Height of the left subtree minus height of the right subtree.
        balance: isize,
    },
    /// A node's cached height does not match its subtrees.
    #[error("node {key} caches height {cached} but has height {actual}")]
    StaleHeight {
        /// Rendering of the offending node's key.
        key: String,
        /// Cached height.
        cached: usize,
        /// Recomputed height.
        actual: usize,
    },
    /// A node's cached subtree size does not match its subtrees.
    #[error("node {key} caches size {cached} but holds {actual} keys")]
    StaleSize {
        /// Rendering of the offending node's key.
        key: String,
        /// Cached size.
        cached: usize,
        /// Recounted size.
        actual: usize,
    },
    /// Keys are not strictly ascending where the structure requires it.
    #[error("key {key} is out of order")]
    OutOfOrder {
        /// Rendering of the misplaced key.
        key: String,
    },
    /// A B-tree node holds too few or too many entries.
    #[error("node at depth {depth} holds {entries} entries, expected {min}..={max}")]
    Occupancy {
        /// Depth of the node, the root being at depth 0.
        depth: usize,
        /// Number of entries held.
        entries: usize,
        /// Minimum allowed.
        min: usize,
        /// Maximum allowed.
        max: usize,
    },
    /// B-tree external nodes sit at different depths.
    #[error("external node at depth {depth}, expected {height}")]
    UnevenDepth {
        /// Depth of the external node.
        depth: usize,
        /// Height of the tree.
        height: usize,
    },
    /// A Patricia link that does not increase the bit index fails to point
    /// back at a node on its own search path.
    #[error("link from bit {parent} to bit {child} is neither a forward edge nor a back-link to an ancestor")]
    BitIndexOrder {
        /// Bit index of the parent.
        parent: usize,
        /// Bit index of the child.
        child: usize,
    },
    /// A stored key cannot be found by searching for it.
    #[error("key {key} is stored but unreachable by search")]
    Unreachable {
        /// Rendering of the unreachable key.
        key: String,
    },
    /// The table's key count disagrees with its structure.
    #[error("table reports {reported} keys but holds {actual}")]
    SizeMismatch {
        /// Count reported by `size()`.
        reported: usize,
        /// Count found by walking the structure.
        actual: usize,
    },
}
