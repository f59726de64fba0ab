//! Read-only sharing of one store across threads.

use forge_knn::{BruteForceIndex, Dataset, IndexParams, QueryContext};
use std::sync::Arc;
use std::thread;

#[test]
fn test_concurrent_queries_match_sequential() {
    let dataset = Dataset::generate(1_000, 64, 32, 31).unwrap();
    let index = Arc::new(BruteForceIndex::from_shared(dataset.store.clone()));

    let expected: Vec<_> = dataset
        .queries
        .iter()
        .map(|q| index.find_nearest(q, 10).unwrap())
        .collect();

    let queries = Arc::new(dataset.queries);
    let handles: Vec<_> = (0..8)
        .map(|t| {
            let index = Arc::clone(&index);
            let queries = Arc::clone(&queries);
            thread::spawn(move || {
                // Each thread walks the queries from a different offset.
                (0..queries.len())
                    .map(|i| (i + t * 8) % queries.len())
                    .map(|i| (i, index.find_nearest(&queries[i], 10).unwrap()))
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    for handle in handles {
        for (i, ids) in handle.join().unwrap() {
            assert_eq!(ids, expected[i], "query {} diverged under concurrency", i);
        }
    }
}

#[test]
fn test_scoped_threads_share_context() {
    let dataset = Dataset::generate(400, 16, 8, 32).unwrap();
    let ctx = QueryContext::from_store(dataset.store.clone(), IndexParams::default()).unwrap();

    thread::scope(|s| {
        for query in &dataset.queries {
            let ctx = &ctx;
            s.spawn(move || {
                let (results, stats) = ctx.exact().find_nearest_with_stats(query, 5).unwrap();
                assert_eq!(results.len(), 5);
                assert_eq!(stats.distances_computed, 400);
            });
        }
    });
}

#[test]
fn test_batch_search_uses_independent_caches() {
    let mut dataset = Dataset::generate(800, 100, 24, 33).unwrap();
    dataset.compute_ground_truth(7).unwrap();

    let index = BruteForceIndex::from_shared(dataset.store.clone());
    for (query, truth) in dataset.queries.iter().zip(&dataset.ground_truth) {
        assert_eq!(&index.find_nearest(query, 7).unwrap(), truth);
    }
}
