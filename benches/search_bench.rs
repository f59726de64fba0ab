//! Benchmarks for exact top-k search.
//!
//! Run with: cargo bench --bench search_bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use forge_knn::{BruteForceIndex, Dataset};

/// Single-query latency across store sizes.
fn benchmark_store_sizes(c: &mut Criterion) {
    for size in [1_000, 10_000, 60_000] {
        let dataset = Dataset::generate(size, 1, 128, 1).unwrap();
        let index = BruteForceIndex::from_shared(dataset.store.clone());
        let query = &dataset.queries[0];

        let mut group = c.benchmark_group(format!("search_{}", size));
        group.throughput(Throughput::Elements(1));
        group.bench_function("k10", |b| {
            b.iter(|| index.find_nearest(black_box(query), black_box(10)))
        });
        group.finish();
    }
}

/// Partial selection vs. full ranking.
fn benchmark_k_values(c: &mut Criterion) {
    let dataset = Dataset::generate(10_000, 1, 128, 2).unwrap();
    let index = BruteForceIndex::from_shared(dataset.store.clone());
    let query = &dataset.queries[0];

    let mut group = c.benchmark_group("k_values");
    group.throughput(Throughput::Elements(1));

    for k in [1, 10, 100, 1_000, 10_000] {
        group.bench_with_input(BenchmarkId::new("find_nearest", k), &k, |b, &k| {
            b.iter(|| index.find_nearest(black_box(query), black_box(k)))
        });
    }

    group.finish();
}

/// Batch search throughput with many queries.
fn benchmark_batch_search(c: &mut Criterion) {
    let dataset = Dataset::generate(10_000, 1_000, 128, 3).unwrap();
    let index = BruteForceIndex::from_shared(dataset.store.clone());

    let mut group = c.benchmark_group("batch_search");
    group.throughput(Throughput::Elements(dataset.queries.len() as u64));
    group.bench_function("batch_1000_queries", |b| {
        b.iter(|| index.batch_find_nearest(black_box(&dataset.queries), black_box(10)))
    });
    group.finish();
}

criterion_group!(
    benches,
    benchmark_store_sizes,
    benchmark_k_values,
    benchmark_batch_search,
);

criterion_main!(benches);
