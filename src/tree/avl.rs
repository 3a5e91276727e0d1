//! Height-balanced binary search tree.
//!
//! This module provides [`AvlTree`], an ordered symbol table that keeps the
//! heights of the two subtrees of every node within one of each other.
//!
//! # Overview
//!
//! - O(log N) get, put, delete
//! - O(log N) min/max, floor/ceiling
//! - O(log N) rank/select, using cached subtree sizes
//! - O(log N + k) range queries where k is the number of results
//!
//! # Internal Structure
//!
//! Every node owns its two subtrees and caches its height and subtree size.
//! Mutations descend recursively and hand back the (possibly new) root of the
//! subtree they touched; on the way back up each ancestor recomputes its
//! cache and, if its balance factor left `-1..=1`, is rotated:
//!
//! 1. Left-Left / Right-Right: a single rotation at the unbalanced node
//! 2. Left-Right / Right-Left: a rotation at the heavy child, then at the node
//!
//! Rotations move boxed nodes between owners; no node is ever copied.
//!
//! # Examples
//!
//! ```rust
//! use symtab::prelude::*;
//!
//! let mut tree = AvlTree::new();
//! for (key, value) in [("J", 10), ("D", 4), ("A", 1), ("G", 7), ("P", 16), ("M", 13), ("S", 19)] {
//!     tree.put(key, value);
//! }
//!
//! assert_eq!(tree.height(), 3);
//! assert_eq!(tree.floor(&"K"), Some((&"J", &10)));
//! assert_eq!(tree.rank(&"M"), 4);
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::mem;
use std::ops::ControlFlow;

use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::compare::{Compare, NaturalOrder};
use crate::graphviz::{EdgeStyle, Graph};
use crate::table::{Entries, OrderedSymbolTable, TraversalOrder};

#[cfg(any(test, feature = "verify"))]
use crate::error::InvariantViolation;

/// Inline capacity of iteration stacks; AVL height stays below 32 for any
/// tree that fits in memory.
const STACK_CAPACITY: usize = 32;

// =============================================================================
// Node Definition
// =============================================================================

type Link<K, V> = Option<Box<Node<K, V>>>;

struct Node<K, V> {
    key: K,
    value: V,
    left: Link<K, V>,
    right: Link<K, V>,
    /// Nodes on the longest path down to a leaf, this one included.
    height: usize,
    /// Keys in this subtree, this one included.
    size: usize,
}

impl<K, V> Node<K, V> {
    fn new(key: K, value: V) -> Box<Self> {
        Box::new(Self {
            key,
            value,
            left: None,
            right: None,
            height: 1,
            size: 1,
        })
    }

    fn height(link: &Link<K, V>) -> usize {
        link.as_ref().map_or(0, |node| node.height)
    }

    fn size(link: &Link<K, V>) -> usize {
        link.as_ref().map_or(0, |node| node.size)
    }

    /// Recomputes the cached height and size from the children.
    fn update(&mut self) {
        self.height = 1 + Self::height(&self.left).max(Self::height(&self.right));
        self.size = 1 + Self::size(&self.left) + Self::size(&self.right);
    }

    /// Height of the left subtree minus height of the right subtree.
    #[allow(clippy::cast_possible_wrap)]
    fn balance_factor(&self) -> isize {
        Self::height(&self.left) as isize - Self::height(&self.right) as isize
    }

    const fn entry(&self) -> (&K, &V) {
        (&self.key, &self.value)
    }
}

// =============================================================================
// Restructuring
// =============================================================================

fn rotate_right<K, V>(mut node: Box<Node<K, V>>) -> Box<Node<K, V>> {
    let Some(mut left) = node.left.take() else {
        return node;
    };
    trace!("avl rotate right");
    node.left = left.right.take();
    node.update();
    left.right = Some(node);
    left.update();
    left
}

fn rotate_left<K, V>(mut node: Box<Node<K, V>>) -> Box<Node<K, V>> {
    let Some(mut right) = node.right.take() else {
        return node;
    };
    trace!("avl rotate left");
    node.right = right.left.take();
    node.update();
    right.left = Some(node);
    right.update();
    right
}

/// Refreshes the cache of `node` and restores its balance, returning the new
/// root of the subtree.
fn rebalance<K, V>(mut node: Box<Node<K, V>>) -> Box<Node<K, V>> {
    node.update();
    let balance = node.balance_factor();
    if balance > 1 {
        if let Some(left) = node.left.take() {
            node.left = Some(if left.balance_factor() < 0 {
                rotate_left(left)
            } else {
                left
            });
        }
        rotate_right(node)
    } else if balance < -1 {
        if let Some(right) = node.right.take() {
            node.right = Some(if right.balance_factor() > 0 {
                rotate_right(right)
            } else {
                right
            });
        }
        rotate_left(node)
    } else {
        node
    }
}

/// Inserts into the subtree, returning its new root and the replaced value.
fn insert<K, V, C: Compare<K>>(
    link: Link<K, V>,
    key: K,
    value: V,
    compare: &C,
) -> (Box<Node<K, V>>, Option<V>) {
    let Some(mut node) = link else {
        return (Node::new(key, value), None);
    };
    match compare.compare(&key, &node.key) {
        Ordering::Less => {
            let (left, replaced) = insert(node.left.take(), key, value, compare);
            node.left = Some(left);
            (rebalance(node), replaced)
        }
        Ordering::Greater => {
            let (right, replaced) = insert(node.right.take(), key, value, compare);
            node.right = Some(right);
            (rebalance(node), replaced)
        }
        Ordering::Equal => {
            let replaced = mem::replace(&mut node.value, value);
            (node, Some(replaced))
        }
    }
}

/// Detaches the smallest node of the subtree, returning what remains of the
/// subtree and the detached node.
fn remove_min<K, V>(mut node: Box<Node<K, V>>) -> (Link<K, V>, Box<Node<K, V>>) {
    match node.left.take() {
        None => (node.right.take(), node),
        Some(left) => {
            let (rest, min) = remove_min(left);
            node.left = rest;
            (Some(rebalance(node)), min)
        }
    }
}

/// Detaches the largest node of the subtree.
fn remove_max<K, V>(mut node: Box<Node<K, V>>) -> (Link<K, V>, Box<Node<K, V>>) {
    match node.right.take() {
        None => (node.left.take(), node),
        Some(right) => {
            let (rest, max) = remove_max(right);
            node.right = rest;
            (Some(rebalance(node)), max)
        }
    }
}

/// Removes `key` from the subtree, returning its new root and the removed
/// pair.
fn remove<K, V, C: Compare<K>>(
    link: Link<K, V>,
    key: &K,
    compare: &C,
) -> (Link<K, V>, Option<(K, V)>) {
    let Some(mut node) = link else {
        return (None, None);
    };
    match compare.compare(key, &node.key) {
        Ordering::Less => {
            let (left, removed) = remove(node.left.take(), key, compare);
            node.left = left;
            (Some(rebalance(node)), removed)
        }
        Ordering::Greater => {
            let (right, removed) = remove(node.right.take(), key, compare);
            node.right = right;
            (Some(rebalance(node)), removed)
        }
        Ordering::Equal => {
            let Node {
                key, value, left, right, ..
            } = *node;
            let replacement = match (left, right) {
                (None, right) => right,
                (left, None) => left,
                (Some(left), Some(right)) => {
                    let (rest, mut successor) = remove_min(right);
                    successor.left = Some(left);
                    successor.right = rest;
                    Some(rebalance(successor))
                }
            };
            (replacement, Some((key, value)))
        }
    }
}

// =============================================================================
// Queries
// =============================================================================

fn floor<'a, K, V, C: Compare<K>>(
    link: &'a Link<K, V>,
    key: &K,
    compare: &C,
) -> Option<&'a Node<K, V>> {
    let node = link.as_deref()?;
    match compare.compare(key, &node.key) {
        Ordering::Equal => Some(node),
        Ordering::Less => floor(&node.left, key, compare),
        Ordering::Greater => floor(&node.right, key, compare).or(Some(node)),
    }
}

fn ceiling<'a, K, V, C: Compare<K>>(
    link: &'a Link<K, V>,
    key: &K,
    compare: &C,
) -> Option<&'a Node<K, V>> {
    let node = link.as_deref()?;
    match compare.compare(key, &node.key) {
        Ordering::Equal => Some(node),
        Ordering::Greater => ceiling(&node.right, key, compare),
        Ordering::Less => ceiling(&node.left, key, compare).or(Some(node)),
    }
}

fn collect_range<'a, K, V, C: Compare<K>>(
    link: &'a Link<K, V>,
    lo: &K,
    hi: &K,
    compare: &C,
    entries: &mut Vec<(&'a K, &'a V)>,
) {
    let Some(node) = link.as_deref() else {
        return;
    };
    let from_lo = compare.compare(lo, &node.key);
    let from_hi = compare.compare(hi, &node.key);
    if from_lo == Ordering::Less {
        collect_range(&node.left, lo, hi, compare, entries);
    }
    if from_lo != Ordering::Greater && from_hi != Ordering::Less {
        entries.push(node.entry());
    }
    if from_hi == Ordering::Greater {
        collect_range(&node.right, lo, hi, compare, entries);
    }
}

fn walk<K, V>(
    link: &Link<K, V>,
    order: TraversalOrder,
    visit: &mut dyn FnMut(&K, &V) -> ControlFlow<()>,
) -> ControlFlow<()> {
    let Some(node) = link.as_deref() else {
        return ControlFlow::Continue(());
    };
    if order == TraversalOrder::PreOrder {
        visit(&node.key, &node.value)?;
    }
    walk(&node.left, order, visit)?;
    if order == TraversalOrder::InOrder {
        visit(&node.key, &node.value)?;
    }
    walk(&node.right, order, visit)?;
    if order == TraversalOrder::PostOrder {
        visit(&node.key, &node.value)?;
    }
    ControlFlow::Continue(())
}

// =============================================================================
// AvlTree Definition
// =============================================================================

/// An ordered symbol table backed by an AVL tree.
///
/// Keys are ordered by the [`Compare`] supplied at construction; re-inserting
/// an existing key replaces its value.
///
/// # Examples
///
/// ```rust
/// use symtab::prelude::*;
///
/// let mut tree = AvlTree::with_comparator(|left: &i32, right: &i32| right.cmp(left));
/// tree.put(1, "one");
/// tree.put(2, "two");
///
/// // Reversed ordering
/// assert_eq!(tree.min(), Some((&2, &"two")));
/// ```
pub struct AvlTree<K, V, C = NaturalOrder> {
    root: Link<K, V>,
    compare: C,
}

impl<K: Ord, V> AvlTree<K, V> {
    /// Creates an empty tree ordered by `K`'s [`Ord`] implementation.
    #[must_use]
    pub fn new() -> Self {
        Self::with_comparator(NaturalOrder)
    }
}

impl<K, V, C: Compare<K>> AvlTree<K, V, C> {
    /// Creates an empty tree ordered by `compare`.
    #[must_use]
    pub fn with_comparator(compare: C) -> Self {
        debug!("created avl tree");
        Self {
            root: None,
            compare,
        }
    }

    /// Checks every structural invariant of the tree.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant found.
    #[cfg(any(test, feature = "verify"))]
    pub fn verify(&self) -> Result<(), InvariantViolation>
    where
        K: fmt::Debug,
    {
        self.verify_node(&self.root, None, None).map(|_| ())
    }

    /// Returns `(height, size)` of a verified subtree.
    #[cfg(any(test, feature = "verify"))]
    fn verify_node(
        &self,
        link: &Link<K, V>,
        lower: Option<&K>,
        upper: Option<&K>,
    ) -> Result<(usize, usize), InvariantViolation>
    where
        K: fmt::Debug,
    {
        let Some(node) = link.as_deref() else {
            return Ok((0, 0));
        };
        let key = || format!("{:?}", node.key);
        let below_lower = lower.is_some_and(|lower| {
            self.compare.compare(&node.key, lower) != Ordering::Greater
        });
        let above_upper = upper.is_some_and(|upper| {
            self.compare.compare(&node.key, upper) != Ordering::Less
        });
        if below_lower || above_upper {
            return Err(InvariantViolation::OutOfOrder { key: key() });
        }

        let (left_height, left_size) = self.verify_node(&node.left, lower, Some(&node.key))?;
        let (right_height, right_size) = self.verify_node(&node.right, Some(&node.key), upper)?;
        let height = 1 + left_height.max(right_height);
        let size = 1 + left_size + right_size;

        if node.height != height {
            return Err(InvariantViolation::StaleHeight {
                key: key(),
                cached: node.height,
                actual: height,
            });
        }
        if node.size != size {
            return Err(InvariantViolation::StaleSize {
                key: key(),
                cached: node.size,
                actual: size,
            });
        }
        let balance = node.balance_factor();
        if balance.abs() > 1 {
            return Err(InvariantViolation::Unbalanced {
                key: key(),
                balance,
            });
        }
        Ok((height, size))
    }
}

impl<K, V, C: Compare<K>> OrderedSymbolTable<K, V> for AvlTree<K, V, C> {
    fn size(&self) -> usize {
        Node::size(&self.root)
    }

    fn height(&self) -> usize {
        Node::height(&self.root)
    }

    fn put(&mut self, key: K, value: V) {
        let (root, _) = insert(self.root.take(), key, value, &self.compare);
        self.root = Some(root);
    }

    fn get(&self, key: &K) -> Option<&V> {
        let mut link = &self.root;
        while let Some(node) = link {
            match self.compare.compare(key, &node.key) {
                Ordering::Less => link = &node.left,
                Ordering::Greater => link = &node.right,
                Ordering::Equal => return Some(&node.value),
            }
        }
        None
    }

    fn delete(&mut self, key: &K) -> Option<V> {
        let (root, removed) = remove(self.root.take(), key, &self.compare);
        self.root = root;
        removed.map(|(_, value)| value)
    }

    fn min(&self) -> Option<(&K, &V)> {
        let mut node = self.root.as_deref()?;
        while let Some(left) = node.left.as_deref() {
            node = left;
        }
        Some(node.entry())
    }

    fn max(&self) -> Option<(&K, &V)> {
        let mut node = self.root.as_deref()?;
        while let Some(right) = node.right.as_deref() {
            node = right;
        }
        Some(node.entry())
    }

    fn floor(&self, key: &K) -> Option<(&K, &V)> {
        floor(&self.root, key, &self.compare).map(Node::entry)
    }

    fn ceiling(&self, key: &K) -> Option<(&K, &V)> {
        ceiling(&self.root, key, &self.compare).map(Node::entry)
    }

    fn rank(&self, key: &K) -> usize {
        let mut rank = 0;
        let mut link = &self.root;
        while let Some(node) = link {
            match self.compare.compare(key, &node.key) {
                Ordering::Less => link = &node.left,
                Ordering::Greater => {
                    rank += Node::size(&node.left) + 1;
                    link = &node.right;
                }
                Ordering::Equal => return rank + Node::size(&node.left),
            }
        }
        rank
    }

    fn select(&self, rank: usize) -> Option<(&K, &V)> {
        let mut rank = rank;
        let mut link = &self.root;
        while let Some(node) = link {
            let left_size = Node::size(&node.left);
            match rank.cmp(&left_size) {
                Ordering::Less => link = &node.left,
                Ordering::Greater => {
                    rank -= left_size + 1;
                    link = &node.right;
                }
                Ordering::Equal => return Some(node.entry()),
            }
        }
        None
    }

    fn delete_min(&mut self) -> Option<(K, V)> {
        let (rest, min) = remove_min(self.root.take()?);
        self.root = rest;
        let Node { key, value, .. } = *min;
        Some((key, value))
    }

    fn delete_max(&mut self) -> Option<(K, V)> {
        let (rest, max) = remove_max(self.root.take()?);
        self.root = rest;
        let Node { key, value, .. } = *max;
        Some((key, value))
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
            collect_range(&self.root, lo, hi, &self.compare, &mut entries);
        }
        Entries::new(entries)
    }

    fn iter(&self) -> Entries<'_, K, V> {
        let mut entries = Vec::with_capacity(self.size());
        let mut stack: SmallVec<[&Node<K, V>; STACK_CAPACITY]> = SmallVec::new();
        let mut current = self.root.as_deref();
        loop {
            while let Some(node) = current {
                stack.push(node);
                current = node.left.as_deref();
            }
            let Some(node) = stack.pop() else {
                break;
            };
            entries.push(node.entry());
            current = node.right.as_deref();
        }
        Entries::new(entries)
    }

    fn traverse(
        &self,
        order: TraversalOrder,
        visit: &mut dyn FnMut(&K, &V) -> ControlFlow<()>,
    ) -> ControlFlow<()> {
        walk(&self.root, order, visit)
    }

    fn graphviz(&self) -> String
    where
        K: fmt::Display,
        V: fmt::Display,
    {
        let mut graph = Graph::new("AVL");
        let mut edges = Vec::new();
        let mut stack: SmallVec<[&Node<K, V>; STACK_CAPACITY]> =
            self.root.as_deref().into_iter().collect();
        while let Some(node) = stack.pop() {
            graph.node(node.key.to_string(), format!("{},{}", node.key, node.value));
            for child in [node.left.as_deref(), node.right.as_deref()]
                .into_iter()
                .flatten()
            {
                edges.push((node.key.to_string(), child.key.to_string()));
            }
            stack.extend(node.right.as_deref());
            stack.extend(node.left.as_deref());
        }
        for (from, to) in edges {
            graph.edge(from, to, EdgeStyle::Solid);
        }
        graph.to_string()
    }
}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<K: Ord, V> Default for AvlTree<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for AvlTree<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut tree = Self::new();
        tree.extend(iter);
        tree
    }
}

impl<K, V, C: Compare<K>> Extend<(K, V)> for AvlTree<K, V, C> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.put(key, value);
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug, C: Compare<K>> fmt::Debug for AvlTree<K, V, C> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_map().entries(self.iter()).finish()
    }
}

impl<K: fmt::Display, V: fmt::Display, C: Compare<K>> fmt::Display for AvlTree<K, V, C> {
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

static_assertions::assert_impl_all!(AvlTree<String, i32>: Send, Sync);
