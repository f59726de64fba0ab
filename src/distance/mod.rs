//! Euclidean distance, the only metric the engine ranks by.
//!
//! The slice functions re-exported here pick the fastest kernel for the
//! running CPU. They assume equal lengths and panic otherwise; use
//! [`distance`] where the lengths come from a caller and must be checked.

pub mod scalar;
pub mod simd;

pub use simd::{active_kernel, euclidean_distance, euclidean_distance_squared};

use crate::error::{KnnError, Result};

/// Euclidean distance between two points of equal dimensionality.
///
/// # Errors
///
/// `DimensionMismatch` if the lengths differ, reporting `a`'s length as the
/// expected one.
#[inline]
pub fn distance(a: &[f32], b: &[f32]) -> Result<f32> {
    if a.len() != b.len() {
        return Err(KnnError::dimension_mismatch(a.len(), b.len()));
    }
    Ok(euclidean_distance(a, b))
}
