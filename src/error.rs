//! Error types for forge-knn operations.
//!
//! Every failure in this crate is local and synchronous: nothing performs I/O,
//! so nothing is retried. Each kind also has a stable negative code used when
//! the error has to cross the foreign-call boundary.

use crate::constants::codes;
use thiserror::Error;

/// Result type alias using [`KnnError`].
pub type Result<T> = std::result::Result<T, KnnError>;

/// Errors that can occur while building a store or answering a query.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum KnnError {
    /// Malformed construction input or parameter value.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Point dimensions do not match the store's dimensionality.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Dimensionality of the store.
        expected: usize,
        /// Dimensionality of the point provided.
        actual: usize,
    },

    /// Identifier outside `[0, len)`.
    #[error("identifier out of range: {id} (store holds {len} points)")]
    OutOfRange {
        /// Identifier requested.
        id: usize,
        /// Number of points in the store.
        len: usize,
    },

    /// The point copies could not be materialized.
    #[error("allocation failure: unable to reserve {requested} coordinates")]
    AllocationFailure {
        /// Number of `f32` coordinates requested.
        requested: usize,
    },

    /// Operation not offered by the backing index.
    #[error("operation not supported: {0}")]
    NotSupported(String),
}

impl KnnError {
    /// Creates a new `InvalidArgument` error.
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Creates a new `DimensionMismatch` error.
    pub fn dimension_mismatch(expected: usize, actual: usize) -> Self {
        Self::DimensionMismatch { expected, actual }
    }

    /// Creates a new `OutOfRange` error.
    pub fn out_of_range(id: usize, len: usize) -> Self {
        Self::OutOfRange { id, len }
    }

    /// Creates a new `AllocationFailure` error.
    pub fn allocation_failure(requested: usize) -> Self {
        Self::AllocationFailure { requested }
    }

    /// Creates a new `NotSupported` error.
    pub fn not_supported(msg: impl Into<String>) -> Self {
        Self::NotSupported(msg.into())
    }

    /// Stable sentinel code reported across the foreign-call boundary.
    pub fn code(&self) -> i32 {
        match self {
            Self::InvalidArgument(_) => codes::INVALID_ARGUMENT,
            Self::DimensionMismatch { .. } => codes::DIMENSION_MISMATCH,
            Self::OutOfRange { .. } => codes::OUT_OF_RANGE,
            Self::AllocationFailure { .. } => codes::ALLOCATION_FAILURE,
            Self::NotSupported(_) => codes::NOT_SUPPORTED,
        }
    }
}
