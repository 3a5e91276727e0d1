//! The tree-shaped [`OrderedSymbolTable`](crate::table::OrderedSymbolTable)
//! implementations.
//!
//! - [`AvlTree`]: height-balanced binary search tree
//! - [`BTree`]: multiway tree of even order with keys in external nodes
//! - [`Patricia`]: compressed binary radix trie over key bit-strings
//!
//! Each type is behind the Cargo feature of the same name; all three are
//! enabled by default.

#[cfg(feature = "avl")]
mod avl;

#[cfg(feature = "btree")]
mod btree;

#[cfg(feature = "patricia")]
mod patricia;

#[cfg(feature = "avl")]
pub use avl::AvlTree;

#[cfg(feature = "btree")]
pub use btree::{BTree, DEFAULT_ORDER};

#[cfg(feature = "patricia")]
pub use patricia::Patricia;
