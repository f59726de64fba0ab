//! Common traits for nearest-neighbor search backends.
//!
//! [`NeighborSearch`] is the seam between the query context and whatever
//! answers its queries: the exact engine in this crate, or an approximate
//! index built elsewhere over the same points.

use crate::error::{KnnError, Result};
use crate::types::PointId;

/// A search result containing a point identifier and its distance to the query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchResult {
    /// Identifier of the matched point.
    pub id: PointId,
    /// Euclidean distance from the query.
    pub distance: f32,
}

impl SearchResult {
    /// Create a new SearchResult.
    #[inline]
    pub fn new(id: impl Into<PointId>, distance: f32) -> Self {
        Self {
            id: id.into(),
            distance,
        }
    }

    /// Convert to a raw (index, distance) tuple.
    #[inline]
    pub fn to_tuple(self) -> (usize, f32) {
        (self.id.0, self.distance)
    }
}

impl From<SearchResult> for (usize, f32) {
    fn from(result: SearchResult) -> Self {
        result.to_tuple()
    }
}

/// Interface for anything that can answer nearest-neighbor queries over a
/// [`crate::PointStore`].
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; queries take `&self` and may run
/// concurrently.
pub trait NeighborSearch: Send + Sync {
    /// Return up to `k` identifiers closest to `query`, closest first.
    ///
    /// # Errors
    ///
    /// `DimensionMismatch` if `query` does not match [`Self::dimension`].
    fn find_nearest(&self, query: &[f32], k: usize) -> Result<Vec<PointId>>;

    /// Like [`NeighborSearch::find_nearest`], with `coverage` overriding the
    /// build-time coverage for this query only.
    ///
    /// Backends without a coverage knob keep this default, which ignores the
    /// override.
    fn find_nearest_with_coverage(
        &self,
        query: &[f32],
        k: usize,
        coverage: f32,
    ) -> Result<Vec<PointId>> {
        let _ = coverage;
        self.find_nearest(query, k)
    }

    /// Return the identifiers "near" `query` under `threshold`.
    ///
    /// Whether `threshold` is a distance cutoff or a count cutoff is owned by
    /// the implementation. Backends without such an operation keep this
    /// default.
    fn find_near(&self, query: &[f32], threshold: f32) -> Result<Vec<PointId>> {
        let _ = (query, threshold);
        Err(KnnError::not_supported(format!(
            "{} does not offer threshold search",
            self.name()
        )))
    }

    /// Return the number of points searched over.
    fn len(&self) -> usize;

    /// Return true if there are no points.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Return the dimensionality of the points.
    fn dimension(&self) -> usize;

    /// Short backend name used in logs and errors.
    fn name(&self) -> &'static str;
}
