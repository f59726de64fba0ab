//! Basic usage: build a store, query it, and time a realistic workload.
//!
//! Run with: RUST_LOG=forge_knn=debug cargo run --example basic_usage

use forge_knn::distance::active_kernel;
use forge_knn::{recall_at_k, Dataset, IndexParams, QueryContext};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Small Store ===\n");

    let data = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0];
    let ctx = QueryContext::build(&data, 3, 3, IndexParams::default())?;
    let neighbors = ctx.find_nearest(&[0.0, 0.0, 0.0], 2)?;
    println!("nearest to origin: {:?}\n", neighbors);

    println!("=== MNIST-sized Store ===\n");

    let (rows, dim) = (60_000, 784);
    let start = Instant::now();
    let mut dataset = Dataset::generate(rows, 10, dim, 0)?;
    println!("generated {} points of dimension {} in {:.2?}", rows, dim, start.elapsed());

    let params = IndexParams::default();
    println!(
        "params: seed={} coverage={} sample_rate={:.3}",
        params.seed,
        params.coverage,
        params.effective_sample_rate(rows)
    );
    let ctx = QueryContext::from_store(dataset.store.clone(), params)?;

    let start = Instant::now();
    dataset.compute_ground_truth(10)?;
    println!(
        "ground truth for {} queries in {:.2?} ({} kernel)",
        dataset.queries.len(),
        start.elapsed(),
        active_kernel()
    );

    let (results, stats) = ctx.exact().find_nearest_with_stats(&dataset.queries[0], 10)?;
    let ids: Vec<_> = results.iter().map(|r| r.id.as_usize()).collect();
    println!(
        "{} found: {:?} ({:.3} ms, {} distances)",
        results.len(),
        ids,
        stats.query_time_ms(),
        stats.distances_computed
    );

    let found = ctx.find_nearest(&dataset.queries[0], 10)?;
    println!(
        "recall@10 via {} backend: {:.2}",
        ctx.backend_name(),
        recall_at_k(&found, &dataset.ground_truth[0], 10)
    );

    Ok(())
}
