#![cfg(feature = "btree")]
//! Scenario tests for `BTree` of order 4.

use rstest::rstest;
use std::ops::ControlFlow;
use symtab::prelude::*;
use symtab::tree::DEFAULT_ORDER;
use symtab::Error;

type Pair = (&'static str, i32);

const SEVEN: &[Pair] = &[
    ("J", 10),
    ("D", 4),
    ("A", 1),
    ("G", 7),
    ("P", 16),
    ("M", 13),
    ("S", 19),
];

fn tree_of(pairs: &[Pair]) -> BTree<&'static str, i32> {
    let mut tree = BTree::with_order(4).expect("4 is a valid order");
    tree.extend(pairs.iter().copied());
    tree
}

fn keys(tree: &BTree<&'static str, i32>, order: TraversalOrder) -> String {
    let mut keys = String::new();
    let _ = tree.traverse(order, &mut |key, _| {
        keys.push_str(key);
        ControlFlow::Continue(())
    });
    keys
}

// =============================================================================
// Construction Tests
// =============================================================================

#[rstest]
#[case::zero(0)]
#[case::two(2)]
#[case::odd(7)]
fn test_with_order_rejects_invalid_order(#[case] order: usize) {
    let result: Result<BTree<i32, i32>, Error> = BTree::with_order(order);
    assert_eq!(result.err(), Some(Error::InvalidOrder { order }));
}

#[rstest]
fn test_invalid_order_message_names_the_order() {
    let error = BTree::<i32, i32>::with_order(5).err().map(|error| error.to_string());
    assert_eq!(
        error.as_deref(),
        Some("invalid b-tree order 5: expected an even number of at least 4")
    );
}

#[rstest]
fn test_default_tree_uses_default_order() {
    let mut tree: BTree<usize, usize> = BTree::default();
    for key in 0..DEFAULT_ORDER - 1 {
        tree.put(key, key);
    }
    assert_eq!(tree.height(), 0);
    tree.put(DEFAULT_ORDER, 0);
    assert_eq!(tree.height(), 1);
}

// =============================================================================
// Shape Tests
// =============================================================================

#[rstest]
#[case::empty(&[], 0, "")]
#[case::three(&[("B", 2), ("A", 1), ("C", 3)], 0, "ABC")]
#[case::five(&[("B", 2), ("A", 1), ("D", 4), ("C", 3), ("E", 5)], 1, "ABCDE")]
#[case::seven(SEVEN, 1, "ADGJMPS")]
fn test_every_order_is_ascending(#[case] pairs: &[Pair], #[case] height: usize, #[case] expected: &str) {
    let tree = tree_of(pairs);
    assert_eq!(tree.height(), height);
    for order in [TraversalOrder::PreOrder, TraversalOrder::InOrder, TraversalOrder::PostOrder] {
        assert_eq!(keys(&tree, order), expected);
    }
}

#[rstest]
fn test_graphviz_empty() {
    assert_eq!(
        tree_of(&[]).graphviz(),
        "strict digraph BTree {\n  node [shape=oval];\n}"
    );
}

#[rstest]
fn test_graphviz_single_external_node() {
    let tree = tree_of(&[("B", 2), ("A", 1), ("C", 3)]);
    let expected = r#"strict digraph BTree {
  node [shape=oval];

  n0 [label="A,1 | B,2 | C,3"];
}"#;
    assert_eq!(tree.graphviz(), expected);
}

#[rstest]
fn test_graphviz_after_root_split() {
    let tree = tree_of(&[("B", 2), ("A", 1), ("D", 4), ("C", 3), ("E", 5)]);
    let expected = r#"strict digraph BTree {
  node [shape=oval];

  n0 [label="A | C"];
  n1 [label="A,1 | B,2"];
  n2 [label="C,3 | D,4 | E,5"];

  n0 -> n1 [];
  n0 -> n2 [];
}"#;
    assert_eq!(tree.graphviz(), expected);
}

#[rstest]
fn test_graphviz_after_second_split() {
    let tree = tree_of(SEVEN);
    let expected = r#"strict digraph BTree {
  node [shape=oval];

  n0 [label="A | G | M"];
  n1 [label="A,1 | D,4"];
  n2 [label="G,7 | J,10"];
  n3 [label="M,13 | P,16 | S,19"];

  n0 -> n1 [];
  n0 -> n2 [];
  n0 -> n3 [];
}"#;
    assert_eq!(tree.graphviz(), expected);
}

// =============================================================================
// Deletion Tests
// =============================================================================

#[rstest]
fn test_delete_merges_with_right_sibling() {
    let mut tree = tree_of(SEVEN);
    assert_eq!(tree.delete(&"D"), Some(4));
    let expected = r#"strict digraph BTree {
  node [shape=oval];

  n0 [label="A | M"];
  n1 [label="A,1 | G,7 | J,10"];
  n2 [label="M,13 | P,16 | S,19"];

  n0 -> n1 [];
  n0 -> n2 [];
}"#;
    assert_eq!(tree.graphviz(), expected);
}

#[rstest]
fn test_delete_borrows_from_right_sibling() {
    let mut tree = tree_of(&[("B", 2), ("A", 1), ("D", 4), ("C", 3), ("E", 5)]);
    assert_eq!(tree.delete(&"A"), Some(1));
    assert_eq!(tree.height(), 1);
    assert_eq!(keys(&tree, TraversalOrder::InOrder), "BCDE");
    assert_eq!(tree.select(1), Some((&"C", &3)));
    assert_eq!(tree.rank(&"D"), 2);
}

#[rstest]
fn test_root_collapses_when_drained() {
    let mut tree = tree_of(SEVEN);
    for (key, value) in SEVEN {
        assert_eq!(tree.delete(key), Some(*value));
    }
    assert_eq!(tree.height(), 0);
    assert!(tree.is_empty());
    assert_eq!(tree.min(), None);
}

#[rstest]
fn test_large_tree_supports_order_statistics() {
    let tree: BTree<u32, u32> = (0..1000).rev().map(|key| (key, key * 2)).collect();
    assert_eq!(tree.size(), 1000);
    assert!(tree.height() >= 1);
    assert_eq!(tree.select(500), Some((&500, &1000)));
    assert_eq!(tree.rank(&750), 750);
    assert_eq!(tree.range_size(&100, &199), 100);
    assert_eq!(tree.floor(&2000), Some((&999, &1998)));
}
