//! The ordered symbol table contract.
//!
//! [`OrderedSymbolTable`] is implemented by every tree in [`crate::tree`],
//! so the trees can be used interchangeably, including behind
//! `Box<dyn OrderedSymbolTable<K, V>>`.
//!
//! # Examples
//!
//! ```rust
//! use symtab::prelude::*;
//!
//! fn fill(table: &mut dyn OrderedSymbolTable<String, i32>) {
//!     for (value, key) in ["B", "A", "C"].into_iter().enumerate() {
//!         table.put(key.to_string(), i32::try_from(value).unwrap());
//!     }
//! }
//!
//! let mut avl: AvlTree<String, i32> = AvlTree::new();
//! let mut btree: BTree<String, i32> = BTree::new();
//! fill(&mut avl);
//! fill(&mut btree);
//!
//! assert_eq!(avl.rank(&"C".to_string()), 2);
//! assert_eq!(btree.select(0), Some((&"A".to_string(), &1)));
//! ```

use std::fmt;
use std::iter::FusedIterator;
use std::ops::ControlFlow;

/// The order in which [`OrderedSymbolTable::traverse`] visits pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TraversalOrder {
    /// Node before its children.
    PreOrder,
    /// Left children, node, right children.
    InOrder,
    /// Children before their node.
    PostOrder,
}

/// An associative container over ordered keys with order-statistics queries.
///
/// Absence is reported with `None`, never with an error or a panic.
pub trait OrderedSymbolTable<K, V> {
    /// Returns the number of keys stored.
    fn size(&self) -> usize;

    /// Returns the length of the longest root-to-leaf path.
    fn height(&self) -> usize;

    /// Returns `true` if no key is stored.
    fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Inserts `key` with `value`, replacing the value of an existing key.
    fn put(&mut self, key: K, value: V);

    /// Returns the value stored for `key`.
    fn get(&self, key: &K) -> Option<&V>;

    /// Returns `true` if `key` is stored.
    fn contains_key(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    /// Removes `key`, returning its value if it was present.
    fn delete(&mut self, key: &K) -> Option<V>;

    /// Returns the pair with the smallest key.
    fn min(&self) -> Option<(&K, &V)>;

    /// Returns the pair with the largest key.
    fn max(&self) -> Option<(&K, &V)>;

    /// Returns the pair with the largest key less than or equal to `key`.
    fn floor(&self, key: &K) -> Option<(&K, &V)>;

    /// Returns the pair with the smallest key greater than or equal to `key`.
    fn ceiling(&self, key: &K) -> Option<(&K, &V)>;

    /// Returns the number of stored keys strictly less than `key`.
    fn rank(&self, key: &K) -> usize;

    /// Returns the pair whose key has the given 0-indexed rank.
    fn select(&self, rank: usize) -> Option<(&K, &V)>;

    /// Removes and returns the pair with the smallest key.
    fn delete_min(&mut self) -> Option<(K, V)>;

    /// Removes and returns the pair with the largest key.
    fn delete_max(&mut self) -> Option<(K, V)>;

    /// Returns the number of keys in `[lo, hi]`.
    fn range_size(&self, lo: &K, hi: &K) -> usize;

    /// Returns the pairs with keys in `[lo, hi]`, in ascending order.
    fn range(&self, lo: &K, hi: &K) -> Entries<'_, K, V>;

    /// Returns every pair in ascending key order.
    fn iter(&self) -> Entries<'_, K, V>;

    /// Calls `visit` once per pair in the given order.
    ///
    /// The traversal stops as soon as `visit` returns
    /// [`ControlFlow::Break`], and the break is returned to the caller.
    fn traverse(
        &self,
        order: TraversalOrder,
        visit: &mut dyn FnMut(&K, &V) -> ControlFlow<()>,
    ) -> ControlFlow<()>;

    /// Renders the structure as a Graphviz `strict digraph`.
    fn graphviz(&self) -> String
    where
        K: fmt::Display,
        V: fmt::Display;
}

// =============================================================================
// Entries
// =============================================================================

/// An ordered, finite sequence of pairs borrowed from a table.
///
/// Cloning an `Entries` restarts it from the position it had when cloned.
#[derive(Debug)]
pub struct Entries<'a, K, V> {
    entries: Vec<(&'a K, &'a V)>,
    current_index: usize,
}

impl<'a, K, V> Entries<'a, K, V> {
    pub(crate) const fn new(entries: Vec<(&'a K, &'a V)>) -> Self {
        Self {
            entries,
            current_index: 0,
        }
    }
}

impl<K, V> Clone for Entries<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
            current_index: self.current_index,
        }
    }
}

impl<'a, K, V> Iterator for Entries<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.entries.get(self.current_index).copied()?;
        self.current_index += 1;
        Some(entry)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.entries.len().saturating_sub(self.current_index);
        (remaining, Some(remaining))
    }
}

impl<K, V> ExactSizeIterator for Entries<'_, K, V> {
    fn len(&self) -> usize {
        self.entries.len().saturating_sub(self.current_index)
    }
}

impl<K, V> FusedIterator for Entries<'_, K, V> {}
