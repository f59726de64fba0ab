//! Per-query statistics.
//!
//! Use [`QueryStats`] to see how much work a query did:
//!
//! ```
//! use forge_knn::{BruteForceIndex, PointStore};
//!
//! let store = PointStore::from_flat(&[0.0, 0.0, 1.0, 0.0, 5.0, 5.0], 3, 2).unwrap();
//! let index = BruteForceIndex::new(store);
//! let (results, stats) = index.find_nearest_with_stats(&[0.0, 0.0], 2).unwrap();
//!
//! assert_eq!(results.len(), 2);
//! assert_eq!(stats.distances_computed, 3);
//! ```

use std::time::Duration;

/// Statistics collected while answering one query.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QueryStats {
    /// Number of points considered.
    pub candidates: usize,
    /// Number of distances computed. Never exceeds `candidates`.
    pub distances_computed: usize,
    /// Number of identifiers returned.
    pub returned: usize,
    /// Wall-clock time spent in the query.
    pub elapsed: Duration,
}

impl QueryStats {
    /// Query time in milliseconds.
    pub fn query_time_ms(&self) -> f64 {
        self.elapsed.as_secs_f64() * 1000.0
    }

    /// Fraction of candidates whose distance was computed.
    pub fn scan_ratio(&self) -> f64 {
        if self.candidates == 0 {
            0.0
        } else {
            self.distances_computed as f64 / self.candidates as f64
        }
    }
}
