//! Scenario battery shared by every ordered symbol table.
//!
//! Each implementation is stamped out with the same tests over the same four
//! insertion scenarios; expectations are derived from the sorted input so
//! they hold for any correct table.

use rstest::rstest;
use std::ops::ControlFlow;
use symtab::prelude::*;

type Pair = (&'static str, i32);

const EMPTY: &[Pair] = &[];
const THREE: &[Pair] = &[("B", 2), ("A", 1), ("C", 3)];
const FIVE: &[Pair] = &[("B", 2), ("A", 1), ("D", 4), ("C", 3), ("E", 5)];
const SEVEN: &[Pair] = &[
    ("J", 10),
    ("D", 4),
    ("A", 1),
    ("G", 7),
    ("P", 16),
    ("M", 13),
    ("S", 19),
];

fn sorted(pairs: &[Pair]) -> Vec<Pair> {
    let mut sorted = pairs.to_vec();
    sorted.sort_unstable();
    sorted
}

fn traversal(table: &dyn OrderedSymbolTable<&'static str, i32>, order: TraversalOrder) -> Vec<Pair> {
    let mut visited = Vec::new();
    let _ = table.traverse(order, &mut |key, value| {
        visited.push((*key, *value));
        ControlFlow::Continue(())
    });
    visited
}

fn owned(entries: Entries<'_, &'static str, i32>) -> Vec<Pair> {
    entries.map(|(key, value)| (*key, *value)).collect()
}

macro_rules! symbol_table_battery {
    ($name:ident, $constructor:expr) => {
        paste::paste! {
            fn [<$name _of>](pairs: &[Pair]) -> Box<dyn OrderedSymbolTable<&'static str, i32>> {
                let mut table = Box::new($constructor);
                for &(key, value) in pairs {
                    table.put(key, value);
                }
                table
            }

            #[rstest]
            #[case::empty(EMPTY)]
            #[case::three(THREE)]
            #[case::five(FIVE)]
            #[case::seven(SEVEN)]
            fn [<test_ $name _get_finds_every_key>](#[case] pairs: &[Pair]) {
                let table = [<$name _of>](pairs);
                assert_eq!(table.size(), pairs.len());
                assert_eq!(table.is_empty(), pairs.is_empty());
                for (key, value) in pairs {
                    assert_eq!(table.get(key), Some(value));
                }
                assert_eq!(table.get(&"Z"), None);
                assert!(!table.contains_key(&"0"));
            }

            #[rstest]
            #[case::empty(EMPTY)]
            #[case::three(THREE)]
            #[case::five(FIVE)]
            #[case::seven(SEVEN)]
            fn [<test_ $name _extremes>](#[case] pairs: &[Pair]) {
                let table = [<$name _of>](pairs);
                let expected = sorted(pairs);
                assert_eq!(table.min().map(|(k, v)| (*k, *v)), expected.first().copied());
                assert_eq!(table.max().map(|(k, v)| (*k, *v)), expected.last().copied());
            }

            #[rstest]
            #[case::below_all(SEVEN, "0", None, Some(("A", 1)))]
            #[case::between(SEVEN, "H", Some(("G", 7)), Some(("J", 10)))]
            #[case::exact(SEVEN, "M", Some(("M", 13)), Some(("M", 13)))]
            #[case::above_all(SEVEN, "Z", Some(("S", 19)), None)]
            #[case::empty(EMPTY, "M", None, None)]
            fn [<test_ $name _floor_and_ceiling>](
                #[case] pairs: &[Pair],
                #[case] key: &'static str,
                #[case] floor: Option<Pair>,
                #[case] ceiling: Option<Pair>,
            ) {
                let table = [<$name _of>](pairs);
                assert_eq!(table.floor(&key).map(|(k, v)| (*k, *v)), floor);
                assert_eq!(table.ceiling(&key).map(|(k, v)| (*k, *v)), ceiling);
            }

            #[rstest]
            #[case::three(THREE)]
            #[case::five(FIVE)]
            #[case::seven(SEVEN)]
            fn [<test_ $name _rank_inverts_select>](#[case] pairs: &[Pair]) {
                let table = [<$name _of>](pairs);
                for (rank, (key, value)) in sorted(pairs).into_iter().enumerate() {
                    assert_eq!(table.select(rank), Some((&key, &value)));
                    assert_eq!(table.rank(&key), rank);
                }
                assert_eq!(table.select(pairs.len()), None);
                assert_eq!(table.rank(&"Z"), pairs.len());
            }

            #[rstest]
            #[case::inner(SEVEN, "B", "M", &[("D", 4), ("G", 7), ("J", 10), ("M", 13)])]
            #[case::whole(FIVE, "A", "E", &[("A", 1), ("B", 2), ("C", 3), ("D", 4), ("E", 5)])]
            #[case::single(THREE, "B", "B", &[("B", 2)])]
            #[case::reversed(SEVEN, "M", "B", &[])]
            #[case::empty(EMPTY, "A", "Z", &[])]
            fn [<test_ $name _range>](
                #[case] pairs: &[Pair],
                #[case] lo: &'static str,
                #[case] hi: &'static str,
                #[case] expected: &[Pair],
            ) {
                let table = [<$name _of>](pairs);
                assert_eq!(owned(table.range(&lo, &hi)), expected);
                assert_eq!(table.range_size(&lo, &hi), expected.len());
            }

            #[rstest]
            #[case::empty(EMPTY)]
            #[case::three(THREE)]
            #[case::five(FIVE)]
            #[case::seven(SEVEN)]
            fn [<test_ $name _in_order_is_sorted>](#[case] pairs: &[Pair]) {
                let table = [<$name _of>](pairs);
                assert_eq!(traversal(table.as_ref(), TraversalOrder::InOrder), sorted(pairs));
                assert_eq!(owned(table.iter()), sorted(pairs));
                for order in [TraversalOrder::PreOrder, TraversalOrder::PostOrder] {
                    assert_eq!(sorted(&traversal(table.as_ref(), order)), sorted(pairs));
                }
            }

            #[rstest]
            fn [<test_ $name _traverse_stops_on_break>]() {
                let table = [<$name _of>](SEVEN);
                let mut visited = 0;
                let flow = table.traverse(TraversalOrder::InOrder, &mut |_, _| {
                    visited += 1;
                    if visited == 3 {
                        ControlFlow::Break(())
                    } else {
                        ControlFlow::Continue(())
                    }
                });
                assert_eq!(flow, ControlFlow::Break(()));
                assert_eq!(visited, 3);
            }

            #[rstest]
            #[case::three(THREE)]
            #[case::seven(SEVEN)]
            fn [<test_ $name _put_replaces_value>](#[case] pairs: &[Pair]) {
                let mut table = [<$name _of>](pairs);
                let (key, _) = pairs[0];
                table.put(key, -1);
                assert_eq!(table.size(), pairs.len());
                assert_eq!(table.get(&key), Some(&-1));
            }

            #[rstest]
            #[case::three(THREE)]
            #[case::five(FIVE)]
            #[case::seven(SEVEN)]
            fn [<test_ $name _delete_every_key>](#[case] pairs: &[Pair]) {
                let mut table = [<$name _of>](pairs);
                for (deleted, (key, value)) in pairs.iter().enumerate() {
                    assert_eq!(table.delete(key), Some(*value));
                    assert_eq!(table.delete(key), None);
                    assert_eq!(table.size(), pairs.len() - deleted - 1);
                    for (other, other_value) in &pairs[deleted + 1..] {
                        assert_eq!(table.get(other), Some(other_value));
                    }
                }
                assert!(table.is_empty());
                assert_eq!(table.height(), 0);
            }

            #[rstest]
            #[case::empty(EMPTY)]
            #[case::seven(SEVEN)]
            fn [<test_ $name _delete_min_drains_ascending>](#[case] pairs: &[Pair]) {
                let mut table = [<$name _of>](pairs);
                let drained: Vec<Pair> = std::iter::from_fn(|| table.delete_min()).collect();
                assert_eq!(drained, sorted(pairs));
                assert!(table.is_empty());
            }

            #[rstest]
            #[case::empty(EMPTY)]
            #[case::seven(SEVEN)]
            fn [<test_ $name _delete_max_drains_descending>](#[case] pairs: &[Pair]) {
                let mut table = [<$name _of>](pairs);
                let drained: Vec<Pair> = std::iter::from_fn(|| table.delete_max()).collect();
                let mut expected = sorted(pairs);
                expected.reverse();
                assert_eq!(drained, expected);
            }

            #[rstest]
            fn [<test_ $name _empty_graph_has_no_nodes>]() {
                let table = [<$name _of>](EMPTY);
                assert!(!table.graphviz().contains("label"));
                assert!(table.graphviz().starts_with("strict digraph "));
            }
        }
    };
}

symbol_table_battery!(avl, AvlTree::<&'static str, i32>::new());
symbol_table_battery!(
    btree,
    BTree::<&'static str, i32>::with_order(4).expect("4 is a valid order")
);
symbol_table_battery!(btree_default, BTree::<&'static str, i32>::new());
symbol_table_battery!(patricia, Patricia::<&'static str, i32>::new());
