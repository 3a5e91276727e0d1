//! Compressed binary radix trie (Patricia).
//!
//! This module provides [`Patricia`], an ordered symbol table that branches
//! on single bits of each key's bit-string instead of comparing whole keys.
//!
//! # Internal Structure
//!
//! Nodes live in an arena and refer to each other by index. Every node holds
//! one key and tests one bit position: a search takes the node's right link
//! when the bit is set and the left link otherwise. A link from `p` to `x` is
//! either
//!
//! - *forward*, when `x` tests a later bit than `p`, or
//! - a *back-link*, when `x` tests the same or an earlier bit; the search
//!   stops there and compares the full bit-string held by `x`.
//!
//! Slot 0 is a header testing bit 0 (which reads as zero for every key), so
//! the trie proper hangs off its left link. The header stands for the
//! all-zero bit-string and holds an entry only if such a key is put.
//!
//! Keys are ordered by their bit-strings (see [`compare_bits`]). Point
//! operations take O(B) bit tests for B-bit keys; order statistics walk the
//! keys in sorted order and take O(N) in the worst case.
//!
//! # Examples
//!
//! ```rust
//! use symtab::prelude::*;
//!
//! let mut trie = Patricia::new();
//! trie.put("Milad", 1);
//! trie.put("Mona", 2);
//! trie.put("Moorara", 3);
//!
//! assert_eq!(trie.get(&"Mona"), Some(&2));
//! assert_eq!(trie.min(), Some((&"Milad", &1)));
//! assert_eq!(trie.rank(&"Moorara"), 2);
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::mem;
use std::ops::ControlFlow;

use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::bits::{compare_bits, diff_bit_position, get_bit};
use crate::compare::{BitString, ByteString};
use crate::graphviz::{EdgeStyle, Graph};
use crate::table::{Entries, OrderedSymbolTable, TraversalOrder};

#[cfg(any(test, feature = "verify"))]
use crate::error::InvariantViolation;

const HEADER: usize = 0;

const STACK_CAPACITY: usize = 32;

// =============================================================================
// Node Definition
// =============================================================================

struct Node<K, V> {
    /// `None` only for an empty header.
    entry: Option<(K, V)>,
    bits: Box<[u8]>,
    /// 1-indexed bit position tested by this node; 0 for the header.
    bit: usize,
    left: usize,
    right: usize,
}

impl<K, V> Node<K, V> {
    fn header() -> Self {
        Self {
            entry: None,
            bits: Box::new([]),
            bit: 0,
            left: HEADER,
            right: HEADER,
        }
    }

    /// The link a search for `bits` follows out of this node.
    fn next(&self, bits: &[u8]) -> usize {
        if get_bit(bits, self.bit) == 1 {
            self.right
        } else {
            self.left
        }
    }

    fn link_mut(&mut self, bits: &[u8]) -> &mut usize {
        if get_bit(bits, self.bit) == 1 {
            &mut self.right
        } else {
            &mut self.left
        }
    }

    fn entry(&self) -> Option<(&K, &V)> {
        self.entry.as_ref().map(|(key, value)| (key, value))
    }
}

/// Walks node indices in bit-string order.
///
/// A node is emitted when the walk reaches it through a back-link, which
/// happens exactly once per node.
struct Sorted<'a, K, V> {
    nodes: &'a [Node<K, V>],
    stack: SmallVec<[(usize, usize); STACK_CAPACITY]>,
    descending: bool,
}

impl<'a, K, V> Sorted<'a, K, V> {
    fn new(nodes: &'a [Node<K, V>], descending: bool) -> Self {
        let mut stack = SmallVec::new();
        stack.push((nodes[HEADER].left, 0));
        Self {
            nodes,
            stack,
            descending,
        }
    }
}

impl<'a, K, V> Iterator for Sorted<'a, K, V> {
    type Item = &'a Node<K, V>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((index, from_bit)) = self.stack.pop() {
            let node = &self.nodes[index];
            if node.bit <= from_bit {
                return Some(node);
            }
            if self.descending {
                self.stack.push((node.left, node.bit));
                self.stack.push((node.right, node.bit));
            } else {
                self.stack.push((node.right, node.bit));
                self.stack.push((node.left, node.bit));
            }
        }
        None
    }
}

// =============================================================================
// Patricia Definition
// =============================================================================

/// An ordered symbol table backed by a Patricia trie.
///
/// Keys are projected onto bit-strings by the [`BitString`] supplied at
/// construction. Keys whose bit-strings differ only by trailing zero bytes
/// are the same key.
///
/// # Examples
///
/// ```rust
/// use symtab::compare::BigEndian;
/// use symtab::prelude::*;
///
/// let mut trie = Patricia::with_bit_string(BigEndian);
/// for key in [300u32, 7, 42] {
///     trie.put(key, key.to_string());
/// }
///
/// let keys: Vec<u32> = trie.iter().map(|(key, _)| *key).collect();
/// assert_eq!(keys, vec![7, 42, 300]);
/// ```
pub struct Patricia<K, V, B = ByteString> {
    nodes: Vec<Node<K, V>>,
    size: usize,
    bit_string: B,
}

impl<K: AsRef<[u8]>, V> Patricia<K, V> {
    /// Creates an empty trie over the raw bytes of the keys.
    #[must_use]
    pub fn new() -> Self {
        Self::with_bit_string(ByteString)
    }
}

impl<K, V, B: BitString<K>> Patricia<K, V, B> {
    /// Creates an empty trie that projects keys with `bit_string`.
    #[must_use]
    pub fn with_bit_string(bit_string: B) -> Self {
        debug!("created patricia trie");
        Self {
            nodes: vec![Node::header()],
            size: 0,
            bit_string,
        }
    }

    /// Index of the node a search for `bits` ends at.
    fn search(&self, bits: &[u8]) -> usize {
        let mut parent = HEADER;
        let mut current = self.nodes[HEADER].left;
        while self.nodes[parent].bit < self.nodes[current].bit {
            parent = current;
            current = self.nodes[current].next(bits);
        }
        current
    }

    /// Index of the node holding `bits`, if any.
    fn find(&self, bits: &[u8]) -> Option<usize> {
        let index = self.search(bits);
        let node = &self.nodes[index];
        (node.entry.is_some() && diff_bit_position(&node.bits, bits).is_none()).then_some(index)
    }

    fn sorted(&self) -> impl Iterator<Item = &Node<K, V>> {
        Sorted::new(&self.nodes, false).filter(|node| node.entry.is_some())
    }

    fn sorted_descending(&self) -> impl Iterator<Item = &Node<K, V>> {
        Sorted::new(&self.nodes, true).filter(|node| node.entry.is_some())
    }

    fn is_forward(&self, from: usize, to: usize) -> bool {
        self.nodes[to].bit > self.nodes[from].bit
    }

    // -------------------------------------------------------------------------
    // Mutation
    // -------------------------------------------------------------------------

    /// Splices a new node for `bits` in at bit position `bit`.
    fn splice(&mut self, key: K, value: V, bits: Box<[u8]>, bit: usize) {
        let mut parent = HEADER;
        let mut current = self.nodes[HEADER].left;
        while self.nodes[parent].bit < self.nodes[current].bit && self.nodes[current].bit < bit {
            parent = current;
            current = self.nodes[current].next(&bits);
        }

        let index = self.nodes.len();
        let (left, right) = if get_bit(&bits, bit) == 1 {
            (current, index)
        } else {
            (index, current)
        };
        *self.nodes[parent].link_mut(&bits) = index;
        trace!(index, bit, parent, "patricia splice");
        self.nodes.push(Node {
            entry: Some((key, value)),
            bits,
            bit,
            left,
            right,
        });
    }

    /// Unlinks the node holding `bits` and returns its entry.
    fn remove(&mut self, bits: &[u8]) -> Option<(K, V)> {
        let mut grandparent = HEADER;
        let mut parent = HEADER;
        let mut current = self.nodes[HEADER].left;
        while self.nodes[parent].bit < self.nodes[current].bit {
            grandparent = parent;
            parent = current;
            current = self.nodes[current].next(bits);
        }
        let target = current;
        if diff_bit_position(&self.nodes[target].bits, bits).is_some() {
            return None;
        }
        if target == HEADER {
            let removed = self.nodes[HEADER].entry.take()?;
            self.size -= 1;
            return Some(removed);
        }

        // The forward parent of the target.
        let mut owner = HEADER;
        while self.nodes[owner].next(bits) != target {
            owner = self.nodes[owner].next(bits);
        }

        if parent == target {
            let node = &self.nodes[target];
            let other = if get_bit(bits, node.bit) == 1 {
                node.left
            } else {
                node.right
            };
            *self.nodes[owner].link_mut(bits) = other;
        } else {
            // The back-link source takes the target's place.
            let node = &self.nodes[parent];
            let other = if get_bit(bits, node.bit) == 1 {
                node.left
            } else {
                node.right
            };
            *self.nodes[grandparent].link_mut(bits) = other;
            *self.nodes[owner].link_mut(bits) = parent;
            let (left, right, bit) = {
                let node = &self.nodes[target];
                (node.left, node.right, node.bit)
            };
            let replacement = &mut self.nodes[parent];
            replacement.left = left;
            replacement.right = right;
            replacement.bit = bit;
        }

        let removed = self.nodes[target].entry.take();
        self.release(target);
        self.size -= 1;
        removed
    }

    /// Frees an unlinked arena slot by moving the last node into it.
    fn release(&mut self, slot: usize) {
        let last = self.nodes.len() - 1;
        if slot != last {
            // The last node is referenced by its forward parent and by one
            // back-link, both on the search path for its own bits.
            let bits = mem::take(&mut self.nodes[last].bits);
            let mut parent = HEADER;
            loop {
                let link = self.nodes[parent].link_mut(&bits);
                let current = *link;
                if current == last {
                    *link = slot;
                }
                if self.nodes[parent].bit >= self.nodes[current].bit {
                    break;
                }
                parent = current;
            }
            self.nodes[last].bits = bits;
            trace!(from = last, to = slot, "patricia slot relocated");
        }
        self.nodes.swap_remove(slot);
    }

    // -------------------------------------------------------------------------
    // Structure walks
    // -------------------------------------------------------------------------

    fn walk(
        &self,
        index: usize,
        order: TraversalOrder,
        visit: &mut dyn FnMut(&K, &V) -> ControlFlow<()>,
    ) -> ControlFlow<()> {
        let node = &self.nodes[index];
        if order == TraversalOrder::PreOrder
            && let Some((key, value)) = node.entry()
        {
            visit(key, value)?;
        }
        for child in [node.left, node.right] {
            if self.is_forward(index, child) {
                self.walk(child, order, visit)?;
            }
        }
        if order == TraversalOrder::PostOrder
            && let Some((key, value)) = node.entry()
        {
            visit(key, value)?;
        }
        ControlFlow::Continue(())
    }

    fn depth(&self, index: usize) -> usize {
        let node = &self.nodes[index];
        1 + [node.left, node.right]
            .into_iter()
            .filter(|&child| self.is_forward(index, child))
            .map(|child| self.depth(child))
            .max()
            .unwrap_or(0)
    }

    /// Pre-order indices of the nodes reachable by forward links.
    fn forward_pre_order(&self) -> Vec<usize> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack: SmallVec<[usize; STACK_CAPACITY]> = SmallVec::new();
        if self.is_forward(HEADER, self.nodes[HEADER].left) {
            stack.push(self.nodes[HEADER].left);
        }
        while let Some(index) = stack.pop() {
            order.push(index);
            let node = &self.nodes[index];
            for child in [node.right, node.left] {
                if self.is_forward(index, child) {
                    stack.push(child);
                }
            }
        }
        order
    }

    // -------------------------------------------------------------------------
    // Verification
    // -------------------------------------------------------------------------

    /// Checks every structural invariant of the trie.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant found.
    #[cfg(any(test, feature = "verify"))]
    pub fn verify(&self) -> Result<(), InvariantViolation>
    where
        K: fmt::Debug,
    {
        let reachable = self.forward_pre_order();
        if reachable.len() + 1 != self.nodes.len() {
            let missing = (1..self.nodes.len()).find(|index| !reachable.contains(index));
            return Err(InvariantViolation::Unreachable {
                key: missing
                    .and_then(|index| self.nodes[index].entry())
                    .map_or_else(String::new, |(key, _)| format!("{key:?}")),
            });
        }

        self.verify_links(HEADER, &mut Vec::new())?;

        for (index, node) in self.nodes.iter().enumerate() {
            if index == HEADER {
                continue;
            }
            let Some((key, _)) = node.entry() else {
                return Err(InvariantViolation::Unreachable {
                    key: format!("<empty slot {index}>"),
                });
            };
            if node.bit == 0 || self.search(&node.bits) != index {
                return Err(InvariantViolation::Unreachable {
                    key: format!("{key:?}"),
                });
            }
        }

        let keys: Vec<&Node<K, V>> = self.sorted().collect();
        if keys.len() != self.size {
            return Err(InvariantViolation::SizeMismatch {
                reported: self.size,
                actual: keys.len(),
            });
        }
        for pair in keys.windows(2) {
            if compare_bits(&pair[0].bits, &pair[1].bits) != Ordering::Less {
                return Err(InvariantViolation::OutOfOrder {
                    key: pair[1]
                        .entry()
                        .map_or_else(String::new, |(key, _)| format!("{key:?}")),
                });
            }
        }
        Ok(())
    }

    /// Walks forward links from `index`, requiring every other link to point
    /// back at a node on the current path.
    #[cfg(any(test, feature = "verify"))]
    fn verify_links(&self, index: usize, path: &mut Vec<usize>) -> Result<(), InvariantViolation> {
        path.push(index);
        let node = &self.nodes[index];
        let links = [node.left, node.right];
        // The header only uses its left link.
        let links = if index == HEADER { &links[..1] } else { &links[..] };
        for &child in links {
            if self.is_forward(index, child) {
                self.verify_links(child, path)?;
            } else if !path.contains(&child) {
                return Err(InvariantViolation::BitIndexOrder {
                    parent: node.bit,
                    child: self.nodes[child].bit,
                });
            }
        }
        path.pop();
        Ok(())
    }
}

impl<K, V, B: BitString<K>> OrderedSymbolTable<K, V> for Patricia<K, V, B> {
    fn size(&self) -> usize {
        self.size
    }

    fn height(&self) -> usize {
        let root = self.nodes[HEADER].left;
        if self.is_forward(HEADER, root) {
            self.depth(root)
        } else {
            0
        }
    }

    fn put(&mut self, key: K, value: V) {
        let bits: Box<[u8]> = self.bit_string.bit_string(&key).into();
        let nearest = self.search(&bits);
        match diff_bit_position(&self.nodes[nearest].bits, &bits) {
            None => {
                let node = &mut self.nodes[nearest];
                if let Some((_, stored)) = node.entry.as_mut() {
                    *stored = value;
                } else {
                    node.entry = Some((key, value));
                    self.size += 1;
                }
            }
            Some(bit) => {
                self.splice(key, value, bits, bit);
                self.size += 1;
            }
        }
    }

    fn get(&self, key: &K) -> Option<&V> {
        let bits = self.bit_string.bit_string(key);
        let index = self.find(&bits)?;
        self.nodes[index].entry().map(|(_, value)| value)
    }

    fn delete(&mut self, key: &K) -> Option<V> {
        let bits = self.bit_string.bit_string(key);
        self.remove(&bits).map(|(_, value)| value)
    }

    fn min(&self) -> Option<(&K, &V)> {
        self.sorted().next().and_then(Node::entry)
    }

    fn max(&self) -> Option<(&K, &V)> {
        self.sorted_descending().next().and_then(Node::entry)
    }

    fn floor(&self, key: &K) -> Option<(&K, &V)> {
        let bits = self.bit_string.bit_string(key);
        self.sorted_descending()
            .find(|node| compare_bits(&node.bits, &bits) != Ordering::Greater)
            .and_then(Node::entry)
    }

    fn ceiling(&self, key: &K) -> Option<(&K, &V)> {
        let bits = self.bit_string.bit_string(key);
        self.sorted()
            .find(|node| compare_bits(&node.bits, &bits) != Ordering::Less)
            .and_then(Node::entry)
    }

    fn rank(&self, key: &K) -> usize {
        let bits = self.bit_string.bit_string(key);
        self.sorted()
            .take_while(|node| compare_bits(&node.bits, &bits) == Ordering::Less)
            .count()
    }

    fn select(&self, rank: usize) -> Option<(&K, &V)> {
        self.sorted().nth(rank).and_then(Node::entry)
    }

    fn delete_min(&mut self) -> Option<(K, V)> {
        let bits = self.sorted().next()?.bits.clone();
        self.remove(&bits)
    }

    fn delete_max(&mut self) -> Option<(K, V)> {
        let bits = self.sorted_descending().next()?.bits.clone();
        self.remove(&bits)
    }

    fn range_size(&self, lo: &K, hi: &K) -> usize {
        self.range(lo, hi).len()
    }

    fn range(&self, lo: &K, hi: &K) -> Entries<'_, K, V> {
        let (lo, hi) = (self.bit_string.bit_string(lo), self.bit_string.bit_string(hi));
        let entries = self
            .sorted()
            .skip_while(|node| compare_bits(&node.bits, &lo) == Ordering::Less)
            .take_while(|node| compare_bits(&node.bits, &hi) != Ordering::Greater)
            .filter_map(Node::entry)
            .collect();
        Entries::new(entries)
    }

    fn iter(&self) -> Entries<'_, K, V> {
        Entries::new(self.sorted().filter_map(Node::entry).collect())
    }

    /// Pre- and post-order follow forward links from the header; in-order is
    /// ascending bit-string order.
    fn traverse(
        &self,
        order: TraversalOrder,
        visit: &mut dyn FnMut(&K, &V) -> ControlFlow<()>,
    ) -> ControlFlow<()> {
        if order == TraversalOrder::InOrder {
            for (key, value) in self.sorted().filter_map(Node::entry) {
                visit(key, value)?;
            }
            return ControlFlow::Continue(());
        }
        self.walk(HEADER, order, visit)
    }

    fn graphviz(&self) -> String
    where
        K: fmt::Display,
        V: fmt::Display,
    {
        let mut graph = Graph::new("Patricia");
        let id = |index: usize| {
            self.nodes[index]
                .entry
                .as_ref()
                .map(|(key, _)| key.to_string())
        };

        let mut indices = self.forward_pre_order();
        if self.nodes[HEADER].entry.is_some() {
            indices.insert(0, HEADER);
        }
        let mut edges = Vec::new();
        for &index in &indices {
            let node = &self.nodes[index];
            let Some((key, value)) = node.entry() else {
                continue;
            };
            graph.node(key.to_string(), format!("{key},{value}"));
            let links = if index == HEADER {
                vec![node.left]
            } else {
                vec![node.left, node.right]
            };
            for child in links {
                let style = if self.is_forward(index, child) {
                    EdgeStyle::Solid
                } else {
                    EdgeStyle::Dashed
                };
                if let Some(target) = id(child) {
                    edges.push((key.to_string(), target, style));
                }
            }
        }
        for (from, to, style) in edges {
            graph.edge(from, to, style);
        }
        graph.to_string()
    }
}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<K: AsRef<[u8]>, V> Default for Patricia<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: AsRef<[u8]>, V> FromIterator<(K, V)> for Patricia<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut trie = Self::new();
        trie.extend(iter);
        trie
    }
}

impl<K, V, B: BitString<K>> Extend<(K, V)> for Patricia<K, V, B> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.put(key, value);
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug, B: BitString<K>> fmt::Debug for Patricia<K, V, B> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_map().entries(self.iter()).finish()
    }
}

impl<K: fmt::Display, V: fmt::Display, B: BitString<K>> fmt::Display for Patricia<K, V, B> {
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

static_assertions::assert_impl_all!(Patricia<String, i32>: Send, Sync);
