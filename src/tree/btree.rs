//! Multiway balanced tree of order M.
//!
//! This module provides [`BTree`], an ordered symbol table whose nodes hold up
//! to `M - 1` entries, the shape used for page-oriented indexes.
//!
//! # Overview
//!
//! - External (leaf) nodes hold the client keys and their values.
//! - Internal nodes hold copies of keys that guide the search, each paired
//!   with a link to a child subtree and that subtree's key count.
//! - Every external node sits at the same depth, the tree height.
//! - Every node except the root holds between `M / 2` and `M - 1` entries;
//!   an internal root holds at least 2.
//!
//! The first entry of an internal node is never compared against: a search
//! always descends into the last child whose key does not exceed the target,
//! falling back to the first child.
//!
//! # Mutation
//!
//! `put` descends to the external level and inserts in sorted position. A
//! node that reaches `M` entries splits its upper `M / 2` entries into a new
//! sibling, whose first key and link are inserted into the parent. A root
//! split grows the tree by one level.
//!
//! `delete` removes from the external level and repairs underflow on the way
//! back up: borrow an entry from the left sibling, else from the right
//! sibling, else merge with a sibling. A root left with one link collapses.
//!
//! # Examples
//!
//! ```rust
//! use symtab::prelude::*;
//!
//! let mut tree = BTree::with_order(4).unwrap();
//! for key in 0..10 {
//!     tree.put(key, key * key);
//! }
//!
//! assert_eq!(tree.get(&7), Some(&49));
//! assert_eq!(tree.height(), 2);
//! assert_eq!(tree.select(3), Some((&3, &9)));
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::mem;
use std::ops::ControlFlow;

use tracing::{debug, trace};

use crate::compare::{Compare, NaturalOrder};
use crate::error::{Error, Result};
use crate::graphviz::{EdgeStyle, Graph};
use crate::table::{Entries, OrderedSymbolTable, TraversalOrder};

#[cfg(any(test, feature = "verify"))]
use crate::error::InvariantViolation;

/// Order used by [`BTree::new`].
pub const DEFAULT_ORDER: usize = 32;

// =============================================================================
// Node Definition
// =============================================================================

enum Slot<K, V> {
    /// External entry.
    Value(V),
    /// Internal entry: a child subtree and its key count.
    Child { node: Box<Node<K, V>>, size: usize },
}

struct Entry<K, V> {
    key: K,
    slot: Slot<K, V>,
}

impl<K, V> Entry<K, V> {
    fn child(node: Box<Node<K, V>>, key: K) -> Self {
        let size = node.size();
        Self {
            key,
            slot: Slot::Child { node, size },
        }
    }

    fn value(&self) -> Option<&V> {
        match &self.slot {
            Slot::Value(value) => Some(value),
            Slot::Child { .. } => None,
        }
    }

    fn child_node(&self) -> Option<&Node<K, V>> {
        match &self.slot {
            Slot::Child { node, .. } => Some(&**node),
            Slot::Value(_) => None,
        }
    }

    /// Key count of the subtree behind this entry; 1 for external entries.
    const fn weight(&self) -> usize {
        match &self.slot {
            Slot::Value(_) => 1,
            Slot::Child { size, .. } => *size,
        }
    }
}

struct Node<K, V> {
    entries: Vec<Entry<K, V>>,
}

impl<K, V> Node<K, V> {
    fn with_capacity(order: usize) -> Box<Self> {
        Box::new(Self {
            entries: Vec::with_capacity(order),
        })
    }

    fn size(&self) -> usize {
        self.entries.iter().map(Entry::weight).sum()
    }

    fn first_key(&self) -> Option<&K> {
        self.entries.first().map(|entry| &entry.key)
    }

    /// Index of the child a search for `key` descends into.
    fn route<C: Compare<K>>(&self, key: &K, compare: &C) -> usize {
        let after = self.entries[1..]
            .iter()
            .position(|entry| compare.compare(key, &entry.key) == Ordering::Less)
            .map_or(self.entries.len(), |index| index + 1);
        after.saturating_sub(1)
    }

    fn child(&self, index: usize) -> &Self {
        match &self.entries[index].slot {
            Slot::Child { node, .. } => &**node,
            Slot::Value(_) => unreachable!("external entry below the external level"),
        }
    }

    fn child_mut(&mut self, index: usize) -> (&mut Box<Self>, &mut usize) {
        match &mut self.entries[index].slot {
            Slot::Child { node, size } => (node, size),
            Slot::Value(_) => unreachable!("external entry below the external level"),
        }
    }

    fn into_child(self: Box<Self>) -> Box<Self> {
        let mut node = self;
        match node.entries.pop().map(|entry| entry.slot) {
            Some(Slot::Child { node, .. }) => node,
            _ => unreachable!("collapsed root without a child link"),
        }
    }

    fn refresh(&mut self, index: usize) {
        let (child, size) = self.child_mut(index);
        *size = child.size();
    }

    fn min(&self, height: usize) -> Option<(&K, &V)> {
        let mut node = self;
        for _ in 0..height {
            node = node.child(0);
        }
        node.entries
            .first()
            .and_then(|entry| Some((&entry.key, entry.value()?)))
    }

    fn max(&self, height: usize) -> Option<(&K, &V)> {
        let mut node = self;
        for _ in 0..height {
            node = node.child(node.entries.len() - 1);
        }
        node.entries
            .last()
            .and_then(|entry| Some((&entry.key, entry.value()?)))
    }
}

// =============================================================================
// BTree Definition
// =============================================================================

/// An ordered symbol table backed by a B-tree of order M.
///
/// # Examples
///
/// ```rust
/// use symtab::prelude::*;
///
/// let mut tree: BTree<&str, i32> = BTree::new();
/// tree.put("B", 2);
/// tree.put("A", 1);
///
/// assert_eq!(tree.min(), Some((&"A", &1)));
/// assert_eq!(tree.delete(&"A"), Some(1));
/// assert_eq!(tree.size(), 1);
/// ```
pub struct BTree<K, V, C = NaturalOrder> {
    order: usize,
    root: Box<Node<K, V>>,
    height: usize,
    size: usize,
    compare: C,
}

impl<K: Ord + Clone, V> BTree<K, V> {
    /// Creates an empty tree of order [`DEFAULT_ORDER`] ordered by `K`'s
    /// [`Ord`] implementation.
    #[must_use]
    pub fn new() -> Self {
        Self::build(DEFAULT_ORDER, NaturalOrder)
    }

    /// Creates an empty tree of the given order ordered by `K`'s [`Ord`]
    /// implementation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidOrder`] unless `order` is even and at least 4.
    pub fn with_order(order: usize) -> Result<Self> {
        Self::with_order_and_comparator(order, NaturalOrder)
    }
}

impl<K: Clone, V, C: Compare<K>> BTree<K, V, C> {
    /// Creates an empty tree of the given order ordered by `compare`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidOrder`] unless `order` is even and at least 4.
    pub fn with_order_and_comparator(order: usize, compare: C) -> Result<Self> {
        if order < 4 || order % 2 != 0 {
            return Err(Error::InvalidOrder { order });
        }
        Ok(Self::build(order, compare))
    }

    fn build(order: usize, compare: C) -> Self {
        debug!(order, "created b-tree");
        Self {
            order,
            root: Node::with_capacity(order),
            height: 0,
            size: 0,
            compare,
        }
    }

    /// Returns the order M of the tree.
    pub const fn order(&self) -> usize {
        self.order
    }

    fn min_occupancy(&self) -> usize {
        self.order / 2
    }

    // -------------------------------------------------------------------------
    // Insertion
    // -------------------------------------------------------------------------

    /// Inserts into the subtree of height `height`.
    ///
    /// Returns the replaced value, if any, and the sibling split off `node`,
    /// if it overflowed.
    fn insert(
        &self,
        node: &mut Node<K, V>,
        key: K,
        value: V,
        height: usize,
    ) -> (Option<V>, Option<Box<Node<K, V>>>) {
        let position = if height == 0 {
            let position = node
                .entries
                .partition_point(|entry| self.compare.compare(&entry.key, &key) == Ordering::Less);
            if let Some(entry) = node.entries.get_mut(position)
                && self.compare.compare(&entry.key, &key) == Ordering::Equal
                && let Slot::Value(stored) = &mut entry.slot
            {
                return (Some(mem::replace(stored, value)), None);
            }
            node.entries.insert(
                position,
                Entry {
                    key,
                    slot: Slot::Value(value),
                },
            );
            position
        } else {
            let index = node.route(&key, &self.compare);
            if index == 0 && self.compare.compare(&key, &node.entries[0].key) == Ordering::Less {
                // Entry 0 bounds its subtree from below.
                node.entries[0].key = key.clone();
            }
            let (child, size) = node.child_mut(index);
            let (replaced, split) = self.insert(child, key, value, height - 1);
            if replaced.is_none() {
                *size += 1;
            }
            let Some(sibling) = split else {
                return (replaced, None);
            };
            *size = child.size();
            let Some(separator) = sibling.first_key().cloned() else {
                unreachable!("split produced an empty sibling");
            };
            node.entries.insert(index + 1, Entry::child(sibling, separator));
            index + 1
        };
        trace!(position, height, "b-tree insert");

        if node.entries.len() < self.order {
            return (None, None);
        }
        (None, Some(self.split(node, height)))
    }

    /// Moves the upper half of a full node into a new sibling.
    fn split(&self, node: &mut Node<K, V>, height: usize) -> Box<Node<K, V>> {
        trace!(height, "b-tree split");
        Box::new(Node {
            entries: node.entries.split_off(self.order / 2),
        })
    }

    // -------------------------------------------------------------------------
    // Deletion
    // -------------------------------------------------------------------------

    /// Removes `key` from the subtree of height `height`, leaving `node`
    /// possibly underfull.
    fn remove(&self, node: &mut Node<K, V>, key: &K, height: usize) -> Option<(K, V)> {
        if height == 0 {
            let position = node
                .entries
                .iter()
                .position(|entry| self.compare.compare(key, &entry.key) == Ordering::Equal)?;
            let entry = node.entries.remove(position);
            return match entry.slot {
                Slot::Value(value) => Some((entry.key, value)),
                Slot::Child { .. } => unreachable!("child link at the external level"),
            };
        }

        let index = node.route(key, &self.compare);
        let (child, size) = node.child_mut(index);
        let removed = self.remove(child, key, height - 1)?;
        *size -= 1;
        if child.entries.len() < self.min_occupancy() {
            self.repair(node, index, height);
        }
        Some(removed)
    }

    /// Removes the extreme entry of the subtree.
    fn remove_extreme(&self, node: &mut Node<K, V>, height: usize, last: bool) -> Option<(K, V)> {
        if height == 0 {
            let entry = if last {
                node.entries.pop()?
            } else if node.entries.is_empty() {
                return None;
            } else {
                node.entries.remove(0)
            };
            return match entry.slot {
                Slot::Value(value) => Some((entry.key, value)),
                Slot::Child { .. } => unreachable!("child link at the external level"),
            };
        }

        let index = if last { node.entries.len() - 1 } else { 0 };
        let (child, size) = node.child_mut(index);
        let removed = self.remove_extreme(child, height - 1, last)?;
        *size -= 1;
        if child.entries.len() < self.min_occupancy() {
            self.repair(node, index, height);
        }
        Some(removed)
    }

    /// Restores the occupancy of the underfull child at `index` of `parent`,
    /// whose children sit at height `height - 1`.
    fn repair(&self, parent: &mut Node<K, V>, index: usize, height: usize) {
        let child_is_internal = height > 1;
        let spare = |entry: &Entry<K, V>| {
            entry
                .child_node()
                .is_some_and(|node| node.entries.len() > self.min_occupancy())
        };

        if index > 0 && spare(&parent.entries[index - 1]) {
            self.borrow_from_left(parent, index, child_is_internal);
        } else if index + 1 < parent.entries.len() && spare(&parent.entries[index + 1]) {
            self.borrow_from_right(parent, index, child_is_internal);
        } else if index + 1 < parent.entries.len() {
            self.merge(parent, index, child_is_internal);
        } else if index > 0 {
            self.merge(parent, index - 1, child_is_internal);
        }
    }

    /// Moves the last entry of the left sibling to the front of the child.
    fn borrow_from_left(&self, parent: &mut Node<K, V>, index: usize, child_is_internal: bool) {
        trace!(index, "b-tree borrow from left");
        let (left, _) = parent.child_mut(index - 1);
        let Some(moved) = left.entries.pop() else {
            return;
        };
        let moved_key = moved.key.clone();
        let separator = mem::replace(&mut parent.entries[index].key, moved_key);
        let (child, _) = parent.child_mut(index);
        if child_is_internal && let Some(first) = child.entries.first_mut() {
            // The old first entry starts routing; the old separator bounds it.
            first.key = separator;
        }
        child.entries.insert(0, moved);
        parent.refresh(index - 1);
        parent.refresh(index);
    }

    /// Moves the first entry of the right sibling to the end of the child.
    fn borrow_from_right(&self, parent: &mut Node<K, V>, index: usize, child_is_internal: bool) {
        trace!(index, "b-tree borrow from right");
        let (right, _) = parent.child_mut(index + 1);
        let Some(next_key) = right.entries.get(1).map(|entry| entry.key.clone()) else {
            return;
        };
        let mut moved = right.entries.remove(0);
        let separator = mem::replace(&mut parent.entries[index + 1].key, next_key);
        if child_is_internal {
            moved.key = separator;
        }
        let (child, _) = parent.child_mut(index);
        child.entries.push(moved);
        parent.refresh(index);
        parent.refresh(index + 1);
    }

    /// Merges the child at `index + 1` into the child at `index`.
    fn merge(&self, parent: &mut Node<K, V>, index: usize, child_is_internal: bool) {
        trace!(index, "b-tree merge");
        let removed = parent.entries.remove(index + 1);
        let Slot::Child { node: mut right, .. } = removed.slot else {
            unreachable!("external entry below the external level");
        };
        if child_is_internal && let Some(first) = right.entries.first_mut() {
            first.key = removed.key;
        }
        let (child, _) = parent.child_mut(index);
        child.entries.append(&mut right.entries);
        parent.refresh(index);
    }

    /// Collapses a root left with a single link.
    fn shrink_root(&mut self) {
        if self.height > 0 && self.root.entries.len() == 1 {
            let root = mem::replace(&mut self.root, Node::with_capacity(self.order));
            self.root = root.into_child();
            self.height -= 1;
            trace!(height = self.height, "b-tree root collapsed");
        }
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    fn rank_in(&self, node: &Node<K, V>, key: &K, height: usize) -> usize {
        if height == 0 {
            return node
                .entries
                .partition_point(|entry| self.compare.compare(&entry.key, key) == Ordering::Less);
        }
        let index = node.route(key, &self.compare);
        let before: usize = node.entries[..index].iter().map(Entry::weight).sum();
        before + self.rank_in(node.child(index), key, height - 1)
    }

    fn floor_in<'a>(&self, node: &'a Node<K, V>, key: &K, height: usize) -> Option<(&'a K, &'a V)> {
        if height == 0 {
            let position = node
                .entries
                .partition_point(|entry| self.compare.compare(&entry.key, key) != Ordering::Greater);
            let entry = node.entries.get(position.checked_sub(1)?)?;
            return Some((&entry.key, entry.value()?));
        }
        let index = node.route(key, &self.compare);
        self.floor_in(node.child(index), key, height - 1)
            .or_else(|| index.checked_sub(1).and_then(|left| node.child(left).max(height - 1)))
    }

    fn ceiling_in<'a>(
        &self,
        node: &'a Node<K, V>,
        key: &K,
        height: usize,
    ) -> Option<(&'a K, &'a V)> {
        if height == 0 {
            let position = node
                .entries
                .partition_point(|entry| self.compare.compare(&entry.key, key) == Ordering::Less);
            let entry = node.entries.get(position)?;
            return Some((&entry.key, entry.value()?));
        }
        let index = node.route(key, &self.compare);
        self.ceiling_in(node.child(index), key, height - 1).or_else(|| {
            (index + 1 < node.entries.len())
                .then(|| node.child(index + 1).min(height - 1))
                .flatten()
        })
    }

    fn collect_range<'a>(
        &self,
        node: &'a Node<K, V>,
        lo: &K,
        hi: &K,
        height: usize,
        entries: &mut Vec<(&'a K, &'a V)>,
    ) {
        if height == 0 {
            let within = node.entries.iter().filter(|entry| {
                self.compare.compare(lo, &entry.key) != Ordering::Greater
                    && self.compare.compare(hi, &entry.key) != Ordering::Less
            });
            entries.extend(within.filter_map(|entry| Some((&entry.key, entry.value()?))));
            return;
        }
        let first = node.route(lo, &self.compare);
        let last = node.route(hi, &self.compare);
        for index in first..=last {
            self.collect_range(node.child(index), lo, hi, height - 1, entries);
        }
    }

    fn collect_all<'a>(node: &'a Node<K, V>, height: usize, entries: &mut Vec<(&'a K, &'a V)>) {
        if height == 0 {
            entries.extend(
                node.entries
                    .iter()
                    .filter_map(|entry| Some((&entry.key, entry.value()?))),
            );
            return;
        }
        for entry in &node.entries {
            if let Some(child) = entry.child_node() {
                Self::collect_all(child, height - 1, entries);
            }
        }
    }

    // -------------------------------------------------------------------------
    // Verification
    // -------------------------------------------------------------------------

    /// Checks every structural invariant of the tree.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant found.
    #[cfg(any(test, feature = "verify"))]
    pub fn verify(&self) -> std::result::Result<(), InvariantViolation>
    where
        K: fmt::Debug,
    {
        let actual = self.verify_node(&self.root, 0, None, None)?;
        if actual != self.size {
            return Err(InvariantViolation::SizeMismatch {
                reported: self.size,
                actual,
            });
        }
        let keys: Vec<&K> = self.iter().map(|(key, _)| key).collect();
        for pair in keys.windows(2) {
            if self.compare.compare(pair[0], pair[1]) != Ordering::Less {
                return Err(InvariantViolation::OutOfOrder {
                    key: format!("{:?}", pair[1]),
                });
            }
        }
        Ok(())
    }

    /// Returns the key count of a verified subtree whose keys must lie in
    /// `[lower, upper)`.
    #[cfg(any(test, feature = "verify"))]
    fn verify_node(
        &self,
        node: &Node<K, V>,
        depth: usize,
        lower: Option<&K>,
        upper: Option<&K>,
    ) -> std::result::Result<usize, InvariantViolation>
    where
        K: fmt::Debug,
    {
        let entries = node.entries.len();
        let (min, max) = match (depth, self.height) {
            (0, 0) => (0, self.order - 1),
            (0, _) => (2, self.order - 1),
            _ => (self.min_occupancy(), self.order - 1),
        };
        if entries < min || entries > max {
            return Err(InvariantViolation::Occupancy {
                depth,
                entries,
                min,
                max,
            });
        }

        for pair in node.entries.windows(2) {
            if self.compare.compare(&pair[0].key, &pair[1].key) != Ordering::Less {
                return Err(InvariantViolation::OutOfOrder {
                    key: format!("{:?}", pair[1].key),
                });
            }
        }

        for entry in &node.entries {
            let too_low =
                lower.is_some_and(|lower| self.compare.compare(&entry.key, lower) == Ordering::Less);
            let too_high = upper
                .is_some_and(|upper| self.compare.compare(&entry.key, upper) != Ordering::Less);
            if too_low || too_high {
                return Err(InvariantViolation::OutOfOrder {
                    key: format!("{:?}", entry.key),
                });
            }
        }

        if depth == self.height {
            return match node.entries.iter().find(|entry| entry.value().is_none()) {
                Some(_) => Err(InvariantViolation::UnevenDepth {
                    depth: depth + 1,
                    height: self.height,
                }),
                None => Ok(entries),
            };
        }

        let mut total = 0;
        for (index, entry) in node.entries.iter().enumerate() {
            let Slot::Child { node: child, size } = &entry.slot else {
                return Err(InvariantViolation::UnevenDepth {
                    depth,
                    height: self.height,
                });
            };
            let child_lower = Some(&entry.key);
            let child_upper = node.entries.get(index + 1).map(|next| &next.key).or(upper);
            let actual = self.verify_node(child, depth + 1, child_lower, child_upper)?;
            if actual != *size {
                return Err(InvariantViolation::StaleSize {
                    key: format!("{:?}", entry.key),
                    cached: *size,
                    actual,
                });
            }
            total += actual;
        }
        Ok(total)
    }

    fn render(&self, graph: &mut Graph, edges: &mut Vec<(String, String)>)
    where
        K: fmt::Display,
        V: fmt::Display,
    {
        let mut next_id = 0;
        let mut stack = vec![(&*self.root, self.height, None::<String>)];
        while let Some((node, height, parent)) = stack.pop() {
            let id = format!("n{next_id}");
            next_id += 1;
            let labels: Vec<String> = node
                .entries
                .iter()
                .map(|entry| match &entry.slot {
                    Slot::Value(value) => format!("{},{value}", entry.key),
                    Slot::Child { .. } => entry.key.to_string(),
                })
                .collect();
            graph.node(id.clone(), labels.join(" | "));
            if let Some(parent) = parent {
                edges.push((parent, id.clone()));
            }
            if height > 0 {
                for entry in node.entries.iter().rev() {
                    if let Some(child) = entry.child_node() {
                        stack.push((child, height - 1, Some(id.clone())));
                    }
                }
            }
        }
    }
}

impl<K: Clone, V, C: Compare<K>> OrderedSymbolTable<K, V> for BTree<K, V, C> {
    fn size(&self) -> usize {
        self.size
    }

    fn height(&self) -> usize {
        self.height
    }

    fn put(&mut self, key: K, value: V) {
        let mut root = mem::replace(&mut self.root, Node::with_capacity(self.order));
        let (replaced, split) = self.insert(&mut root, key, value, self.height);
        self.root = root;
        if replaced.is_none() {
            self.size += 1;
        }
        let Some(sibling) = split else {
            return;
        };

        let (Some(left_key), Some(right_key)) =
            (self.root.first_key().cloned(), sibling.first_key().cloned())
        else {
            unreachable!("split produced an empty node");
        };
        let old_root = mem::replace(&mut self.root, Node::with_capacity(self.order));
        self.root.entries.push(Entry::child(old_root, left_key));
        self.root.entries.push(Entry::child(sibling, right_key));
        self.height += 1;
        trace!(height = self.height, "b-tree root split");
    }

    fn get(&self, key: &K) -> Option<&V> {
        let mut node = &*self.root;
        for _ in 0..self.height {
            node = node.child(node.route(key, &self.compare));
        }
        node.entries
            .iter()
            .find(|entry| self.compare.compare(key, &entry.key) == Ordering::Equal)
            .and_then(Entry::value)
    }

    fn delete(&mut self, key: &K) -> Option<V> {
        let mut root = mem::replace(&mut self.root, Node::with_capacity(self.order));
        let removed = self.remove(&mut root, key, self.height);
        self.root = root;
        let (_, value) = removed?;
        self.size -= 1;
        self.shrink_root();
        Some(value)
    }

    fn min(&self) -> Option<(&K, &V)> {
        self.root.min(self.height)
    }

    fn max(&self) -> Option<(&K, &V)> {
        self.root.max(self.height)
    }

    fn floor(&self, key: &K) -> Option<(&K, &V)> {
        self.floor_in(&self.root, key, self.height)
    }

    fn ceiling(&self, key: &K) -> Option<(&K, &V)> {
        self.ceiling_in(&self.root, key, self.height)
    }

    fn rank(&self, key: &K) -> usize {
        self.rank_in(&self.root, key, self.height)
    }

    fn select(&self, rank: usize) -> Option<(&K, &V)> {
        let mut rank = rank;
        let mut node = &*self.root;
        for _ in 0..self.height {
            let mut index = 0;
            while let Some(entry) = node.entries.get(index)
                && rank >= entry.weight()
            {
                rank -= entry.weight();
                index += 1;
            }
            node = node.entries.get(index)?.child_node()?;
        }
        let entry = node.entries.get(rank)?;
        Some((&entry.key, entry.value()?))
    }

    fn delete_min(&mut self) -> Option<(K, V)> {
        let mut root = mem::replace(&mut self.root, Node::with_capacity(self.order));
        let removed = self.remove_extreme(&mut root, self.height, false);
        self.root = root;
        let removed = removed?;
        self.size -= 1;
        self.shrink_root();
        Some(removed)
    }

    fn delete_max(&mut self) -> Option<(K, V)> {
        let mut root = mem::replace(&mut self.root, Node::with_capacity(self.order));
        let removed = self.remove_extreme(&mut root, self.height, true);
        self.root = root;
        let removed = removed?;
        self.size -= 1;
        self.shrink_root();
        Some(removed)
    }

    fn range_size(&self, lo: &K, hi: &K) -> usize {
        if self.compare.compare(lo, hi) == Ordering::Greater {
            return 0;
        }
        let upper = self.rank(hi) + usize::from(self.contains_key(hi));
        upper - self.rank(lo)
    }

    fn range(&self, lo: &K, hi: &K) -> Entries<'_, K, V> {
        let mut entries = Vec::new();
        if self.compare.compare(lo, hi) != Ordering::Greater {
            self.collect_range(&self.root, lo, hi, self.height, &mut entries);
        }
        Entries::new(entries)
    }

    fn iter(&self) -> Entries<'_, K, V> {
        let mut entries = Vec::with_capacity(self.size);
        Self::collect_all(&self.root, self.height, &mut entries);
        Entries::new(entries)
    }

    /// Every pair lives in an external node, so all orders visit pairs in
    /// ascending key order.
    fn traverse(
        &self,
        _order: TraversalOrder,
        visit: &mut dyn FnMut(&K, &V) -> ControlFlow<()>,
    ) -> ControlFlow<()> {
        for (key, value) in self.iter() {
            visit(key, value)?;
        }
        ControlFlow::Continue(())
    }

    fn graphviz(&self) -> String
    where
        K: fmt::Display,
        V: fmt::Display,
    {
        let mut graph = Graph::new("BTree");
        if self.size > 0 {
            let mut edges = Vec::new();
            self.render(&mut graph, &mut edges);
            for (from, to) in edges {
                graph.edge(from, to, EdgeStyle::Solid);
            }
        }
        graph.to_string()
    }
}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<K: Ord + Clone, V> Default for BTree<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord + Clone, V> FromIterator<(K, V)> for BTree<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut tree = Self::new();
        tree.extend(iter);
        tree
    }
}

impl<K: Clone, V, C: Compare<K>> Extend<(K, V)> for BTree<K, V, C> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.put(key, value);
        }
    }
}

impl<K: Clone + fmt::Debug, V: fmt::Debug, C: Compare<K>> fmt::Debug for BTree<K, V, C> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_map().entries(self.iter()).finish()
    }
}

impl<K: Clone + fmt::Display, V: fmt::Display, C: Compare<K>> fmt::Display for BTree<K, V, C> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{{")?;
        for (index, (key, value)) in self.iter().enumerate() {
            if index > 0 {
                write!(formatter, ", ")?;
            }
            write!(formatter, "{key}: {value}")?;
        }
        write!(formatter, "}}")
    }
}

static_assertions::assert_impl_all!(BTree<String, i32>: Send, Sync);
