//! Synthetic datasets and recall measurement.
//!
//! Used to check an approximate index installed on a [`crate::QueryContext`]
//! against exact ground truth from the brute force engine.

use crate::error::Result;
use crate::index::BruteForceIndex;
use crate::point::Point;
use crate::store::PointStore;
use crate::types::PointId;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashSet;
use std::sync::Arc;

/// A point store, held-out queries, and exact neighbors for each query.
pub struct Dataset {
    pub store: Arc<PointStore>,
    pub queries: Vec<Point>,
    pub ground_truth: Vec<Vec<PointId>>,
}

impl Dataset {
    /// Generate `n_points` stored points and `n_queries` queries with
    /// coordinates uniform in [0, 1). The same `seed` always yields the same
    /// dataset.
    pub fn generate(n_points: usize, n_queries: usize, dim: usize, seed: u64) -> Result<Self> {
        let mut rng = StdRng::seed_from_u64(seed);
        let points: Vec<Point> = (0..n_points).map(|_| Point::random(&mut rng, dim)).collect();
        let queries: Vec<Point> = (0..n_queries).map(|_| Point::random(&mut rng, dim)).collect();

        Ok(Self {
            store: Arc::new(PointStore::from_points(dim, points)?),
            queries,
            ground_truth: Vec::new(),
        })
    }

    /// Compute the exact `k` nearest neighbors of every query.
    pub fn compute_ground_truth(&mut self, k: usize) -> Result<()> {
        let index = BruteForceIndex::from_shared(Arc::clone(&self.store));
        self.ground_truth = index.batch_find_nearest(&self.queries, k)?;
        Ok(())
    }
}

/// Compute recall@k between predicted and ground truth results.
///
/// Recall is the fraction of true nearest neighbors that were found.
/// Returns a value between 0.0 and 1.0; `k == 0` yields 1.0.
pub fn recall_at_k(predicted: &[PointId], ground_truth: &[PointId], k: usize) -> f32 {
    let truth: HashSet<PointId> = ground_truth.iter().take(k).copied().collect();
    if truth.is_empty() {
        return 1.0;
    }
    let found = predicted
        .iter()
        .take(k)
        .filter(|id| truth.contains(id))
        .count();
    found as f32 / truth.len() as f32
}
