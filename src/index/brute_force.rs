//! Brute force index for exact nearest neighbor search.
//!
//! Every query computes its distance to each stored point once, memoized in a
//! query-scoped [`DistanceCache`], then selects the `k` smallest. When `k` is
//! below the store size only that prefix is fully sorted.
//!
//! Equal distances are ordered by identifier, ascending, so results are
//! deterministic. NaN distances (from NaN coordinates) rank after every
//! finite distance.

use crate::cache::DistanceCache;
use crate::distance::euclidean_distance;
use crate::error::Result;
use crate::index::traits::{NeighborSearch, SearchResult};
use crate::stats::QueryStats;
use crate::store::PointStore;
use crate::types::PointId;
use rayon::prelude::*;
use std::cmp::Ordering;
use std::sync::Arc;
use std::time::Instant;

/// A candidate with its cached distance, used during selection.
#[derive(Clone, Copy, Debug)]
struct Ranked {
    index: usize,
    distance: f32,
}

/// Ascending distance, NaN last, ties broken by identifier.
#[inline]
fn rank_order(a: &Ranked, b: &Ranked) -> Ordering {
    let by_distance = a
        .distance
        .partial_cmp(&b.distance)
        .unwrap_or_else(|| a.distance.is_nan().cmp(&b.distance.is_nan()));
    by_distance.then_with(|| a.index.cmp(&b.index))
}

/// Rank the `k` points of `store` closest to `query`.
///
/// Returns the ordered results and the number of distances computed.
fn rank(store: &PointStore, query: &[f32], k: usize) -> Result<(Vec<SearchResult>, usize)> {
    rank_by(store, query, k, euclidean_distance)
}

/// [`rank`] with the metric supplied by the caller. Each stored point is
/// passed to `metric` at most once.
fn rank_by<M>(
    store: &PointStore,
    query: &[f32],
    k: usize,
    metric: M,
) -> Result<(Vec<SearchResult>, usize)>
where
    M: Fn(&[f32], &[f32]) -> f32,
{
    store.check_query(query)?;

    let n = store.len();
    let k = k.min(n);
    if k == 0 {
        return Ok((Vec::new(), 0));
    }

    let mut cache = DistanceCache::new(n);
    let mut ranked: Vec<Ranked> = (0..n)
        .map(|index| Ranked {
            index,
            distance: cache.get_or_compute(index, || metric(query, store.coords(index))),
        })
        .collect();

    if k < n {
        ranked.select_nth_unstable_by(k - 1, rank_order);
        ranked.truncate(k);
    }
    ranked.sort_unstable_by(rank_order);

    let results = ranked
        .into_iter()
        .map(|r| SearchResult::new(r.index, r.distance))
        .collect();
    Ok((results, cache.computed()))
}

/// Find the `k` points of `store` closest to `query`, closest first.
///
/// Returns `min(k, store.len())` identifiers; `k == 0` yields an empty
/// vector. The store is only read.
///
/// # Errors
///
/// `DimensionMismatch` if `query.len() != store.dimension()`. Nothing is
/// returned on error.
///
/// # Example
///
/// ```
/// use forge_knn::{find_nearest, PointId, PointStore};
///
/// let store = PointStore::from_flat(&[0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 5.0, 5.0], 4, 2).unwrap();
/// let ids = find_nearest(&store, &[0.0, 0.0], 2).unwrap();
///
/// assert_eq!(ids[0], PointId(0));
/// assert_eq!(ids[1], PointId(1));
/// ```
pub fn find_nearest(store: &PointStore, query: &[f32], k: usize) -> Result<Vec<PointId>> {
    let (results, _) = rank(store, query, k)?;
    Ok(results.into_iter().map(|r| r.id).collect())
}

/// Brute force index that performs exact nearest neighbor search.
///
/// Holds its store behind an `Arc`, so one store can back several indexes
/// and be queried from many threads at once. Each query allocates its own
/// distance cache; no state is shared between queries.
#[derive(Clone, Debug)]
pub struct BruteForceIndex {
    store: Arc<PointStore>,
}

impl BruteForceIndex {
    /// Create an index over `store`.
    pub fn new(store: PointStore) -> Self {
        Self::from_shared(Arc::new(store))
    }

    /// Create an index over a store that is already shared.
    pub fn from_shared(store: Arc<PointStore>) -> Self {
        Self { store }
    }

    /// Return the underlying store.
    pub fn store(&self) -> &Arc<PointStore> {
        &self.store
    }

    /// Search for the `k` nearest identifiers. See [`find_nearest`].
    pub fn find_nearest(&self, query: &[f32], k: usize) -> Result<Vec<PointId>> {
        find_nearest(&self.store, query, k)
    }

    /// Search for the `k` nearest points, returning their distances too.
    pub fn find_nearest_with_distances(&self, query: &[f32], k: usize) -> Result<Vec<SearchResult>> {
        rank(&self.store, query, k).map(|(results, _)| results)
    }

    /// Search and report how much work the query did.
    pub fn find_nearest_with_stats(
        &self,
        query: &[f32],
        k: usize,
    ) -> Result<(Vec<SearchResult>, QueryStats)> {
        let start = Instant::now();
        let (results, computed) = rank(&self.store, query, k)?;
        let stats = QueryStats {
            candidates: self.store.len(),
            distances_computed: computed,
            returned: results.len(),
            elapsed: start.elapsed(),
        };
        tracing::trace!(
            k,
            n = stats.candidates,
            computed = stats.distances_computed,
            "exact query"
        );
        Ok((results, stats))
    }

    /// Run independent queries in parallel with Rayon.
    ///
    /// Results come back in input order. Fails as a whole if any query has
    /// the wrong dimensionality.
    pub fn batch_find_nearest<Q>(&self, queries: &[Q], k: usize) -> Result<Vec<Vec<PointId>>>
    where
        Q: AsRef<[f32]> + Sync,
    {
        queries
            .par_iter()
            .with_min_len(crate::constants::search::BATCH_CHUNK_SIZE)
            .map(|q| self.find_nearest(q.as_ref(), k))
            .collect()
    }

    /// Distance from `query` to the point at `id`.
    ///
    /// # Errors
    ///
    /// `OutOfRange` for an unknown identifier, `DimensionMismatch` for a
    /// query of the wrong dimensionality.
    pub fn distance_to(&self, id: PointId, query: &[f32]) -> Result<f32> {
        let point = self.store.get(id)?;
        self.store.check_query(query)?;
        Ok(euclidean_distance(query, point))
    }
}

impl NeighborSearch for BruteForceIndex {
    fn find_nearest(&self, query: &[f32], k: usize) -> Result<Vec<PointId>> {
        BruteForceIndex::find_nearest(self, query, k)
    }

    fn len(&self) -> usize {
        self.store.len()
    }

    fn dimension(&self) -> usize {
        self.store.dimension()
    }

    fn name(&self) -> &'static str {
        "brute-force"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::KnnError;
    use crate::point::Point;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::cell::{Cell, RefCell};

    fn random_store(n: usize, dim: usize, seed: u64) -> PointStore {
        let mut rng = StdRng::seed_from_u64(seed);
        let points = (0..n).map(|_| Point::random(&mut rng, dim)).collect();
        PointStore::from_points(dim, points).unwrap()
    }

    fn unit_square() -> BruteForceIndex {
        let store =
            PointStore::from_flat(&[0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 5.0, 5.0], 4, 2).unwrap();
        BruteForceIndex::new(store)
    }

    #[test]
    fn test_basic_search() {
        let index = BruteForceIndex::new(random_store(100, 128, 1));
        let mut rng = StdRng::seed_from_u64(1000);
        let query = Point::random(&mut rng, 128);

        let results = index.find_nearest_with_distances(&query, 10).unwrap();

        assert_eq!(results.len(), 10);
        for i in 1..results.len() {
            assert!(results[i - 1].distance <= results[i].distance);
        }
    }

    #[test]
    fn test_ties_broken_by_identifier() {
        let index = unit_square();
        let results = index.find_nearest_with_distances(&[0.0, 0.0], 3).unwrap();

        let ids: Vec<usize> = results.iter().map(|r| r.id.0).collect();
        assert_eq!(ids, vec![0, 1, 2]);
        assert_eq!(results[0].distance, 0.0);
        assert_eq!(results[1].distance, 1.0);
        assert_eq!(results[2].distance, 1.0);
    }

    #[test]
    fn test_partial_selection_matches_full_ranking() {
        let index = BruteForceIndex::new(random_store(500, 16, 2));
        let query = vec![0.5; 16];

        let full = index.find_nearest(&query, 500).unwrap();
        for k in [1, 7, 50, 499] {
            let partial = index.find_nearest(&query, k).unwrap();
            assert_eq!(partial, full[..k].to_vec(), "k = {}", k);
        }
    }

    #[test]
    fn test_k_zero_and_oversized() {
        let index = unit_square();
        assert!(index.find_nearest(&[0.0, 0.0], 0).unwrap().is_empty());
        assert_eq!(index.find_nearest(&[0.0, 0.0], 100).unwrap().len(), 4);
    }

    #[test]
    fn test_empty_store() {
        let index = BruteForceIndex::new(PointStore::from_flat(&[], 0, 3).unwrap());
        assert!(index.find_nearest(&[1.0, 2.0, 3.0], 5).unwrap().is_empty());
    }

    #[test]
    fn test_dimension_mismatch() {
        let index = unit_square();
        let err = index.find_nearest(&[0.0, 0.0, 0.0], 2).unwrap_err();
        assert_eq!(err, KnnError::dimension_mismatch(2, 3));
    }

    #[test]
    fn test_metric_called_once_per_point() {
        let store = random_store(257, 8, 3);
        let query = [0.1; 8];

        for k in [1, 10, 128, 256, 257, 300] {
            let calls = Cell::new(0usize);
            let seen = RefCell::new(Vec::new());
            let (results, computed) = rank_by(&store, &query, k, |a, b| {
                calls.set(calls.get() + 1);
                seen.borrow_mut().push(b.as_ptr());
                euclidean_distance(a, b)
            })
            .unwrap();

            assert_eq!(calls.get(), 257, "k = {}", k);
            assert_eq!(computed, 257, "k = {}", k);
            assert_eq!(results.len(), k.min(257));

            let mut seen = seen.into_inner();
            seen.sort_unstable();
            seen.dedup();
            assert_eq!(seen.len(), 257, "a point was measured twice for k = {}", k);
        }

        let calls = Cell::new(0usize);
        rank_by(&store, &query, 0, |a, b| {
            calls.set(calls.get() + 1);
            euclidean_distance(a, b)
        })
        .unwrap();
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_ranking_follows_metric() {
        let store = PointStore::from_flat(&[0.0, 1.0, 2.0, 3.0], 4, 1).unwrap();
        // Negated distance: the farthest point ranks first.
        let (results, _) = rank_by(&store, &[0.0], 2, |a, b| -euclidean_distance(a, b)).unwrap();
        let ids: Vec<usize> = results.iter().map(|r| r.id.0).collect();
        assert_eq!(ids, vec![3, 2]);
    }

    #[test]
    fn test_stats_report_work() {
        let index = BruteForceIndex::new(random_store(257, 8, 3));
        let (_, stats) = index.find_nearest_with_stats(&[0.1; 8], 300).unwrap();
        assert_eq!(stats.candidates, 257);
        assert_eq!(stats.distances_computed, 257);
        assert_eq!(stats.returned, 257);

        let (_, stats) = index.find_nearest_with_stats(&[0.1; 8], 0).unwrap();
        assert_eq!(stats.distances_computed, 0);
    }

    #[test]
    fn test_nan_ranks_last() {
        let store = PointStore::from_flat(&[f32::NAN, 0.0, 3.0, 0.0, 1.0, 0.0], 3, 2).unwrap();
        let index = BruteForceIndex::new(store);
        let ids = index.find_nearest(&[0.0, 0.0], 3).unwrap();
        assert_eq!(ids, vec![PointId(2), PointId(1), PointId(0)]);
    }

    #[test]
    fn test_negative_nan_ranks_last() {
        let mut ranked = vec![
            Ranked { index: 0, distance: -f32::NAN },
            Ranked { index: 1, distance: 1.0 },
            Ranked { index: 2, distance: f32::NAN },
            Ranked { index: 3, distance: 0.0 },
            Ranked { index: 4, distance: 1.0 },
        ];
        ranked.sort_unstable_by(rank_order);
        let ids: Vec<usize> = ranked.iter().map(|r| r.index).collect();
        assert_eq!(ids, vec![3, 1, 4, 0, 2]);
    }

    #[test]
    fn test_batch_matches_single() {
        let index = BruteForceIndex::new(random_store(300, 32, 4));
        let mut rng = StdRng::seed_from_u64(5);
        let queries: Vec<Point> = (0..40).map(|_| Point::random(&mut rng, 32)).collect();

        let batch = index.batch_find_nearest(&queries, 5).unwrap();
        assert_eq!(batch.len(), queries.len());
        for (query, result) in queries.iter().zip(&batch) {
            assert_eq!(result, &index.find_nearest(query, 5).unwrap());
        }
    }

    #[test]
    fn test_batch_rejects_bad_query() {
        let index = unit_square();
        let queries = vec![vec![0.0, 0.0], vec![0.0]];
        assert!(index.batch_find_nearest(&queries, 1).is_err());
    }

    #[test]
    fn test_distance_to() {
        let index = unit_square();
        assert!((index.distance_to(PointId(3), &[2.0, 1.0]).unwrap() - 5.0).abs() < 1e-6);
        assert!(matches!(
            index.distance_to(PointId(4), &[0.0, 0.0]),
            Err(KnnError::OutOfRange { id: 4, len: 4 })
        ));
    }

    #[test]
    fn test_find_near_not_supported() {
        let index = unit_square();
        let err = NeighborSearch::find_near(&index, &[0.0, 0.0], 1.0).unwrap_err();
        assert!(matches!(err, KnnError::NotSupported(_)));
    }
}
