//! # symtab
//!
//! Ordered symbol tables for Rust: associative containers over ordered keys
//! that also answer order-statistics queries.
//!
//! ## Overview
//!
//! Three structurally different trees implement one contract,
//! [`OrderedSymbolTable`](table::OrderedSymbolTable):
//!
//! - **AVL tree**: a binary search tree kept height-balanced by rotations
//! - **B-tree**: a multiway tree of even order `M` with every pair in an
//!   external node
//! - **Patricia trie**: a compressed binary radix trie that branches on single
//!   bits of each key's bit-string
//!
//! Every table supports `put`, `get`, `delete`, `min`/`max`,
//! `floor`/`ceiling`, `rank`/`select`, range queries, the three depth-first
//! traversals and export to Graphviz.
//!
//! ## Feature Flags
//!
//! - `avl`: [`AvlTree`](tree::AvlTree) (default)
//! - `btree`: [`BTree`](tree::BTree) (default)
//! - `patricia`: [`Patricia`](tree::Patricia) (default)
//! - `verify`: exposes the `verify` self-check on every table outside tests
//!
//! ## Example
//!
//! ```rust
//! use symtab::prelude::*;
//!
//! let mut table = AvlTree::new();
//! for (key, value) in [("J", 10), ("D", 4), ("A", 1), ("G", 7), ("P", 16)] {
//!     table.put(key, value);
//! }
//!
//! assert_eq!(table.floor(&"H"), Some((&"G", &7)));
//! assert_eq!(table.rank(&"J"), 3);
//! assert_eq!(table.range_size(&"B", &"M"), 3);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Prelude module for convenient imports.
///
/// Re-exports the table contract, the trees and the key adapters.
///
/// # Usage
///
/// ```rust
/// use symtab::prelude::*;
/// ```
pub mod prelude {
    pub use crate::compare::{BitString, ByteString, Compare, NaturalOrder};
    pub use crate::table::{Entries, OrderedSymbolTable, TraversalOrder};

    #[cfg(feature = "avl")]
    pub use crate::tree::AvlTree;

    #[cfg(feature = "btree")]
    pub use crate::tree::BTree;

    #[cfg(feature = "patricia")]
    pub use crate::tree::Patricia;
}

pub mod bits;
pub mod compare;
pub mod error;
pub mod graphviz;
pub mod table;
pub mod tree;

pub use error::{Error, InvariantViolation, Result};
