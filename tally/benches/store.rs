//! Microbenchmarks for the shared store operations.
//!
//! The interesting measurement is lock hold time: `extract_matching` and
//! `remove_first` scan the whole container under the lock, so their cost
//! grows linearly with resident size, as do ordered inserts.
//!
//! Run with: `cargo bench -p tally -- store`

#![allow(missing_docs)]

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use tally::SharedStore;

/// Builds an arrival store pre-filled with `size` items.
fn filled_store(size: u64) -> SharedStore<u64> {
    let store = SharedStore::arrival();
    for n in 0..size {
        store.insert(n).unwrap();
    }
    store
}

fn bench_arrival_insert(c: &mut Criterion) {
    let store = SharedStore::arrival();
    let mut n = 0u64;

    c.bench_function("store/arrival_insert", |b| {
        b.iter(|| {
            n += 1;
            store.insert(black_box(n)).unwrap();
        });
    });
}

fn bench_ordered_insert_by_size(c: &mut Criterion) {
    let mut group = c.benchmark_group("store/ordered_insert_at_size");

    for size in [100u64, 1_000, 10_000] {
        let store: SharedStore<u64> = SharedStore::ordered_by(|a, b| a.cmp(b));
        for n in 0..size {
            store.insert(n * 2).unwrap();
        }

        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            // Middle-of-container splice: half the linear scan on average.
            b.iter(|| {
                store.insert(black_box(size)).unwrap();
                store.remove_first(|n| *n == size).unwrap();
            });
        });
    }

    group.finish();
}

fn bench_extract_matching_by_size(c: &mut Criterion) {
    let mut group = c.benchmark_group("store/extract_matching_at_size");

    for size in [100u64, 1_000, 10_000] {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            // Full partition with nothing matching: pure scan cost.
            let store = filled_store(size);
            b.iter(|| {
                let drained = store.extract_matching(|_| false).unwrap();
                black_box(drained);
            });
        });
    }

    group.finish();
}

fn bench_remove_first_miss_by_size(c: &mut Criterion) {
    let mut group = c.benchmark_group("store/remove_first_miss_at_size");

    for size in [100u64, 1_000, 10_000] {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            // Absent key: the worst case, a full scan with no mutation.
            let store = filled_store(size);
            b.iter(|| {
                let found = store.remove_first(|n| *n == u64::MAX).unwrap();
                black_box(found);
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_arrival_insert,
    bench_ordered_insert_by_size,
    bench_extract_matching_by_size,
    bench_remove_first_miss_by_size,
);
criterion_main!(benches);
