//! The query context: what a caller builds once and queries repeatedly.
//!
//! A [`QueryContext`] owns the point store, the parameters it was built with
//! and, optionally, an approximate index built over the same store. Queries
//! go to the approximate index when one is installed and to the exact engine
//! otherwise. The context is immutable once built and is `Send + Sync`.
//!
//! ```
//! use forge_knn::{IndexParams, PointId, QueryContext};
//!
//! let ctx = QueryContext::build(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0], 3, 3, IndexParams::default()).unwrap();
//! let ids = ctx.find_nearest(&[0.0, 0.0, 0.0], 2).unwrap();
//! assert_eq!(ids, vec![PointId(0), PointId(1)]);
//! ```

use crate::config::IndexParams;
use crate::error::{KnnError, Result};
use crate::index::{BruteForceIndex, NeighborSearch};
use crate::store::PointStore;
use crate::types::PointId;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// A built point store plus an optional delegated index.
pub struct QueryContext {
    exact: BruteForceIndex,
    params: IndexParams,
    delegate: Option<Box<dyn NeighborSearch>>,
}

impl QueryContext {
    /// Build a context from a row-major flat buffer.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for bad parameters or a malformed buffer,
    /// `AllocationFailure` if the points cannot be copied.
    pub fn build(buffer: &[f32], rows: usize, cols: usize, params: IndexParams) -> Result<Self> {
        params.validate()?;
        let store = PointStore::from_flat(buffer, rows, cols)?;
        Self::from_store(Arc::new(store), params)
    }

    /// Build a context over an existing shared store.
    pub fn from_store(store: Arc<PointStore>, params: IndexParams) -> Result<Self> {
        params.validate()?;
        let ctx = Self {
            exact: BruteForceIndex::from_shared(store),
            params,
            delegate: None,
        };
        ctx.log_built();
        Ok(ctx)
    }

    /// Install an already built approximate index.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if the index covers a different number of points or
    /// dimensionality than the store.
    pub fn with_index(mut self, index: Box<dyn NeighborSearch>) -> Result<Self> {
        if index.len() != self.len() || index.dimension() != self.dimension() {
            return Err(KnnError::invalid_argument(format!(
                "{} index covers {} points of dimension {}, store has {} of dimension {}",
                index.name(),
                index.len(),
                index.dimension(),
                self.len(),
                self.dimension()
            )));
        }
        self.delegate = Some(index);
        self.log_built();
        Ok(self)
    }

    /// Build an approximate index over this context's store with its
    /// parameters, then install it.
    pub fn build_index<F, I>(self, build: F) -> Result<Self>
    where
        F: FnOnce(Arc<PointStore>, &IndexParams) -> Result<I>,
        I: NeighborSearch + 'static,
    {
        let index = build(Arc::clone(self.exact.store()), &self.params)?;
        self.with_index(Box::new(index))
    }

    /// Return up to `k` identifiers closest to `query`, closest first.
    ///
    /// Uses the installed approximate index if there is one. Its output is
    /// checked: at most `k` identifiers, all inside the store, none repeated.
    ///
    /// # Errors
    ///
    /// `DimensionMismatch` for a query of the wrong dimensionality,
    /// `OutOfRange` if the approximate index reports an unknown identifier,
    /// `InvalidArgument` if it reports one twice.
    pub fn find_nearest(&self, query: &[f32], k: usize) -> Result<Vec<PointId>> {
        self.exact.store().check_query(query)?;
        match &self.delegate {
            Some(index) => self.accept(index.find_nearest(query, k)?, k),
            None => self.exact.find_nearest(query, k),
        }
    }

    /// Like [`QueryContext::find_nearest`], with `coverage` replacing the
    /// build-time coverage for this query only.
    ///
    /// Lets a caller trade recall for speed without rebuilding. The exact
    /// engine has no coverage knob and answers as usual.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if `coverage` is not finite and positive, plus the
    /// errors of [`QueryContext::find_nearest`].
    pub fn find_nearest_with_coverage(
        &self,
        query: &[f32],
        k: usize,
        coverage: f32,
    ) -> Result<Vec<PointId>> {
        if !coverage.is_finite() || coverage <= 0.0 {
            return Err(KnnError::invalid_argument(format!(
                "coverage must be finite and positive, got {}",
                coverage
            )));
        }
        self.exact.store().check_query(query)?;
        match &self.delegate {
            Some(index) => self.accept(index.find_nearest_with_coverage(query, k, coverage)?, k),
            None => self.exact.find_nearest(query, k),
        }
    }

    /// Exact search, bypassing any installed approximate index.
    pub fn find_nearest_exact(&self, query: &[f32], k: usize) -> Result<Vec<PointId>> {
        self.exact.find_nearest(query, k)
    }

    /// Threshold search. Only available through an approximate index that
    /// offers it; the exact engine returns `NotSupported`.
    pub fn find_near(&self, query: &[f32], threshold: f32) -> Result<Vec<PointId>> {
        self.exact.store().check_query(query)?;
        let ids = match &self.delegate {
            Some(index) => index.find_near(query, threshold)?,
            None => self.exact.find_near(query, threshold)?,
        };
        self.check_ids(&ids)?;
        Ok(ids)
    }

    /// Return the number of points.
    pub fn len(&self) -> usize {
        self.exact.store().len()
    }

    /// Return true if the context holds no points.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Return the dimensionality of the points.
    pub fn dimension(&self) -> usize {
        self.exact.store().dimension()
    }

    /// Return the point store.
    pub fn store(&self) -> &Arc<PointStore> {
        self.exact.store()
    }

    /// Return the exact engine.
    pub fn exact(&self) -> &BruteForceIndex {
        &self.exact
    }

    /// Return the construction parameters.
    pub fn params(&self) -> &IndexParams {
        &self.params
    }

    /// Name of the backend answering [`QueryContext::find_nearest`].
    pub fn backend_name(&self) -> &'static str {
        self.delegate
            .as_ref()
            .map_or_else(|| self.exact.name(), |index| index.name())
    }

    /// Truncate a delegate's answer to `k` and check its identifiers.
    fn accept(&self, mut ids: Vec<PointId>, k: usize) -> Result<Vec<PointId>> {
        ids.truncate(k);
        self.check_ids(&ids)?;
        Ok(ids)
    }

    /// Every identifier inside the store, none repeated.
    fn check_ids(&self, ids: &[PointId]) -> Result<()> {
        let len = self.len();
        let mut seen = HashSet::with_capacity(ids.len());
        for id in ids {
            let index = id.as_usize();
            if index >= len {
                return Err(KnnError::out_of_range(index, len));
            }
            if !seen.insert(index) {
                return Err(KnnError::invalid_argument(format!(
                    "{} backend returned {} more than once",
                    self.backend_name(),
                    id
                )));
            }
        }
        Ok(())
    }

    fn log_built(&self) {
        if !self.params.logs_build() {
            return;
        }
        let rows = self.len();
        let cols = self.dimension();
        let backend = self.backend_name();
        let sample_rate = self.params.effective_sample_rate(rows);
        if self.delegate.is_some() {
            tracing::info!(
                rows,
                cols,
                backend,
                seed = self.params.seed,
                coverage = self.params.coverage,
                sample_rate,
                "query context built"
            );
        } else {
            tracing::debug!(rows, cols, backend, "query context built");
        }
    }
}

impl fmt::Debug for QueryContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryContext")
            .field("len", &self.len())
            .field("dimension", &self.dimension())
            .field("backend", &self.backend_name())
            .field("params", &self.params)
            .finish()
    }
}
