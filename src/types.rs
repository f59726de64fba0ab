//! Core newtypes for type-safe query operations.
//!
//! These types keep identifiers and dimensionalities from being mixed up with
//! other `usize` values (counts, `k`, buffer lengths).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier of a point: its 0-based position in the store.
///
/// The engine only ever speaks this identifier space. Offsets required by a
/// particular caller are applied at the boundary (see [`crate::ffi::IdOffset`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(transparent)]
pub struct PointId(pub usize);

impl PointId {
    /// Create a new PointId.
    #[inline]
    pub const fn new(id: usize) -> Self {
        Self(id)
    }

    /// Get the raw index.
    #[inline]
    pub const fn as_usize(self) -> usize {
        self.0
    }
}

impl fmt::Display for PointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PointId({})", self.0)
    }
}

impl From<usize> for PointId {
    #[inline]
    fn from(id: usize) -> Self {
        Self(id)
    }
}

impl From<PointId> for usize {
    #[inline]
    fn from(id: PointId) -> Self {
        id.0
    }
}

/// The dimensionality shared by every point of a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct Dimension(pub usize);

impl Dimension {
    /// Create a new Dimension.
    #[inline]
    pub const fn new(dim: usize) -> Self {
        Self(dim)
    }

    /// Get the raw usize value.
    #[inline]
    pub const fn as_usize(self) -> usize {
        self.0
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<usize> for Dimension {
    #[inline]
    fn from(dim: usize) -> Self {
        Self(dim)
    }
}

impl From<Dimension> for usize {
    #[inline]
    fn from(dim: Dimension) -> Self {
        dim.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_id() {
        let id = PointId::new(42);
        assert_eq!(id.as_usize(), 42);
        assert_eq!(format!("{}", id), "PointId(42)");

        let id2: PointId = 100usize.into();
        assert_eq!(id2.as_usize(), 100);

        let raw: usize = id.into();
        assert_eq!(raw, 42);
    }

    #[test]
    fn test_dimension() {
        let dim = Dimension::new(128);
        assert_eq!(dim.as_usize(), 128);
        assert_eq!(dim.to_string(), "128");
    }

    #[test]
    fn test_ordering() {
        assert!(PointId::new(1) < PointId::new(2));
    }
}
