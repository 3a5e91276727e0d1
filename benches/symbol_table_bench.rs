//! Benchmark for the ordered symbol tables vs standard BTreeMap.
//!
//! Compares `AvlTree`, `BTree` and `Patricia` against Rust's standard
//! `BTreeMap` for the common operations.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::collections::BTreeMap;
use std::hint::black_box;
use symtab::compare::BigEndian;
use symtab::prelude::*;

const SIZES: [u32; 3] = [100, 1000, 10000];

/// Spreads sequential indices over the key space so inserts are not sorted.
const fn scatter(index: u32) -> u32 {
    index.wrapping_mul(2_654_435_761)
}

type Table = Box<dyn OrderedSymbolTable<u32, u32>>;

fn tables(size: u32) -> Vec<(&'static str, Table)> {
    let pairs = (0..size).map(|index| (scatter(index), index));
    let avl: AvlTree<u32, u32> = pairs.clone().collect();
    let btree: BTree<u32, u32> = pairs.clone().collect();
    let mut patricia = Patricia::with_bit_string(BigEndian);
    patricia.extend(pairs);
    vec![
        ("AvlTree", Box::new(avl) as Table),
        ("BTree", Box::new(btree) as Table),
        ("Patricia", Box::new(patricia) as Table),
    ]
}

// =============================================================================
// put Benchmark
// =============================================================================

fn benchmark_put(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("put");

    for size in SIZES {
        group.bench_with_input(BenchmarkId::new("AvlTree", size), &size, |bencher, &size| {
            bencher.iter(|| {
                let mut table = AvlTree::new();
                for index in 0..size {
                    table.put(black_box(scatter(index)), black_box(index));
                }
                black_box(table)
            });
        });

        group.bench_with_input(BenchmarkId::new("BTree", size), &size, |bencher, &size| {
            bencher.iter(|| {
                let mut table = BTree::new();
                for index in 0..size {
                    table.put(black_box(scatter(index)), black_box(index));
                }
                black_box(table)
            });
        });

        group.bench_with_input(BenchmarkId::new("Patricia", size), &size, |bencher, &size| {
            bencher.iter(|| {
                let mut table = Patricia::with_bit_string(BigEndian);
                for index in 0..size {
                    table.put(black_box(scatter(index)), black_box(index));
                }
                black_box(table)
            });
        });

        group.bench_with_input(BenchmarkId::new("BTreeMap", size), &size, |bencher, &size| {
            bencher.iter(|| {
                let mut map = BTreeMap::new();
                for index in 0..size {
                    map.insert(black_box(scatter(index)), black_box(index));
                }
                black_box(map)
            });
        });
    }

    group.finish();
}

// =============================================================================
// get Benchmark
// =============================================================================

fn benchmark_get(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("get");

    for size in SIZES {
        for (name, table) in tables(size) {
            group.bench_with_input(BenchmarkId::new(name, size), &size, |bencher, &size| {
                bencher.iter(|| {
                    let mut sum = 0u64;
                    for index in 0..size {
                        if let Some(&value) = table.get(&black_box(scatter(index))) {
                            sum += u64::from(value);
                        }
                    }
                    black_box(sum)
                });
            });
        }

        let standard_map: BTreeMap<u32, u32> =
            (0..size).map(|index| (scatter(index), index)).collect();
        group.bench_with_input(BenchmarkId::new("BTreeMap", size), &size, |bencher, &size| {
            bencher.iter(|| {
                let mut sum = 0u64;
                for index in 0..size {
                    if let Some(&value) = standard_map.get(&black_box(scatter(index))) {
                        sum += u64::from(value);
                    }
                }
                black_box(sum)
            });
        });
    }

    group.finish();
}

// =============================================================================
// rank/select Benchmark
// =============================================================================

fn benchmark_rank_select(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("rank_select");

    for size in SIZES {
        for (name, table) in tables(size) {
            group.bench_with_input(BenchmarkId::new(name, size), &size, |bencher, _| {
                bencher.iter(|| {
                    let mut total = 0usize;
                    for rank in (0..table.size()).step_by(7) {
                        if let Some((key, _)) = table.select(black_box(rank)) {
                            total += table.rank(key);
                        }
                    }
                    black_box(total)
                });
            });
        }
    }

    group.finish();
}

// =============================================================================
// delete Benchmark
// =============================================================================

fn benchmark_delete(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("delete");

    for size in SIZES {
        group.bench_with_input(BenchmarkId::new("AvlTree", size), &size, |bencher, &size| {
            bencher.iter_batched(
                || (0..size).map(|index| (scatter(index), index)).collect::<AvlTree<u32, u32>>(),
                |mut table| {
                    for index in 0..size {
                        black_box(table.delete(&scatter(index)));
                    }
                    table
                },
                criterion::BatchSize::LargeInput,
            );
        });

        group.bench_with_input(BenchmarkId::new("BTree", size), &size, |bencher, &size| {
            bencher.iter_batched(
                || (0..size).map(|index| (scatter(index), index)).collect::<BTree<u32, u32>>(),
                |mut table| {
                    for index in 0..size {
                        black_box(table.delete(&scatter(index)));
                    }
                    table
                },
                criterion::BatchSize::LargeInput,
            );
        });

        group.bench_with_input(BenchmarkId::new("BTreeMap", size), &size, |bencher, &size| {
            bencher.iter_batched(
                || {
                    (0..size)
                        .map(|index| (scatter(index), index))
                        .collect::<BTreeMap<u32, u32>>()
                },
                |mut map| {
                    for index in 0..size {
                        black_box(map.remove(&scatter(index)));
                    }
                    map
                },
                criterion::BatchSize::LargeInput,
            );
        });
    }

    group.finish();
}

// =============================================================================
// Criterion Group and Main
// =============================================================================

criterion_group!(
    benches,
    benchmark_put,
    benchmark_get,
    benchmark_rank_select,
    benchmark_delete
);

criterion_main!(benches);
