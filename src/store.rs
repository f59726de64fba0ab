//! Immutable point storage.
//!
//! A [`PointStore`] is materialized once from a row-major flat buffer and is
//! never mutated afterwards, which is what makes it safe to share between
//! concurrent read-only queries without locking.

use crate::error::{KnnError, Result};
use crate::point::Point;
use crate::types::{Dimension, PointId};

/// An ordered, fixed-size collection of points of identical dimensionality.
///
/// The position of a point is its [`PointId`].
#[derive(Clone, Debug)]
pub struct PointStore {
    points: Vec<Point>,
    dim: Dimension,
}

impl PointStore {
    /// Build a store from a row-major flat buffer of `rows * cols` values.
    ///
    /// Each row is copied into an owned [`Point`].
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` if `cols == 0`, `rows * cols` overflows, or the
    ///   buffer length is not exactly `rows * cols`.
    /// - `AllocationFailure` if the copies cannot be reserved. No partially
    ///   built store is returned.
    pub fn from_flat(buffer: &[f32], rows: usize, cols: usize) -> Result<Self> {
        if cols == 0 {
            return Err(KnnError::invalid_argument("cols must be positive"));
        }
        let expected = rows
            .checked_mul(cols)
            .ok_or_else(|| KnnError::invalid_argument("rows * cols overflows"))?;
        if buffer.len() != expected {
            return Err(KnnError::invalid_argument(format!(
                "buffer holds {} values, expected {} ({} rows x {} cols)",
                buffer.len(),
                expected,
                rows,
                cols
            )));
        }

        let mut points: Vec<Point> = Vec::new();
        points
            .try_reserve_exact(rows)
            .map_err(|_| KnnError::allocation_failure(expected))?;

        for row in buffer.chunks_exact(cols) {
            let mut coords: Vec<f32> = Vec::new();
            coords
                .try_reserve_exact(cols)
                .map_err(|_| KnnError::allocation_failure(expected))?;
            coords.extend_from_slice(row);
            points.push(Point::new(coords));
        }

        tracing::debug!(rows, cols, "point store built");

        Ok(Self {
            points,
            dim: Dimension::new(cols),
        })
    }

    /// Build a store from already materialized points.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if `dim == 0`; `DimensionMismatch` if any point does
    /// not have exactly `dim` coordinates.
    pub fn from_points(dim: usize, points: Vec<Point>) -> Result<Self> {
        if dim == 0 {
            return Err(KnnError::invalid_argument("dimension must be positive"));
        }
        if let Some(bad) = points.iter().find(|p| p.dim() != dim) {
            return Err(KnnError::dimension_mismatch(dim, bad.dim()));
        }
        Ok(Self {
            points,
            dim: Dimension::new(dim),
        })
    }

    /// Return the point stored at `id`.
    ///
    /// # Errors
    ///
    /// `OutOfRange` if `id` is not in `[0, len)`.
    pub fn get(&self, id: PointId) -> Result<&Point> {
        self.points
            .get(id.as_usize())
            .ok_or_else(|| KnnError::out_of_range(id.as_usize(), self.points.len()))
    }

    /// Return the number of points.
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Return true if the store holds no points.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Return the dimensionality shared by every point.
    #[inline]
    pub fn dimension(&self) -> usize {
        self.dim.as_usize()
    }

    /// Iterate over `(id, point)` pairs in identifier order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (PointId, &Point)> + '_ {
        self.points
            .iter()
            .enumerate()
            .map(|(i, p)| (PointId::new(i), p))
    }

    /// Check that `query` has the store's dimensionality.
    #[inline]
    pub(crate) fn check_query(&self, query: &[f32]) -> Result<()> {
        if query.len() != self.dimension() {
            return Err(KnnError::dimension_mismatch(self.dimension(), query.len()));
        }
        Ok(())
    }

    /// Coordinates of point `index` for scan loops that only iterate `0..len`.
    #[inline]
    pub(crate) fn coords(&self, index: usize) -> &[f32] {
        self.points[index].as_slice()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_flat() {
        let buffer = [0.0, 0.0, 1.0, 0.0, 0.0, 1.0];
        let store = PointStore::from_flat(&buffer, 3, 2).unwrap();

        assert_eq!(store.len(), 3);
        assert_eq!(store.dimension(), 2);
        assert_eq!(store.get(PointId::new(1)).unwrap().as_slice(), &[1.0, 0.0]);
        assert_eq!(store.get(PointId::new(2)).unwrap().as_slice(), &[0.0, 1.0]);
    }

    #[test]
    fn test_from_flat_copies_rows() {
        let mut buffer = vec![1.0, 2.0, 3.0, 4.0];
        let store = PointStore::from_flat(&buffer, 2, 2).unwrap();
        buffer.iter_mut().for_each(|x| *x = -1.0);
        assert_eq!(store.get(PointId::new(0)).unwrap().as_slice(), &[1.0, 2.0]);
    }

    #[test]
    fn test_empty_store() {
        let store = PointStore::from_flat(&[], 0, 4).unwrap();
        assert!(store.is_empty());
        assert_eq!(store.dimension(), 4);
    }

    #[test]
    fn test_zero_cols_rejected() {
        let err = PointStore::from_flat(&[], 0, 0).unwrap_err();
        assert!(matches!(err, KnnError::InvalidArgument(_)));
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let err = PointStore::from_flat(&[1.0, 2.0, 3.0], 2, 2).unwrap_err();
        assert!(matches!(err, KnnError::InvalidArgument(_)));
    }

    #[test]
    fn test_overflow_rejected() {
        let err = PointStore::from_flat(&[], usize::MAX, 2).unwrap_err();
        assert!(matches!(err, KnnError::InvalidArgument(_)));
    }

    #[test]
    fn test_get_out_of_range() {
        let store = PointStore::from_flat(&[1.0, 2.0], 1, 2).unwrap();
        let err = store.get(PointId::new(1)).unwrap_err();
        assert_eq!(err, KnnError::out_of_range(1, 1));
    }

    #[test]
    fn test_from_points_dimension_check() {
        let points = vec![Point::new(vec![1.0, 2.0]), Point::new(vec![1.0])];
        let err = PointStore::from_points(2, points).unwrap_err();
        assert_eq!(err, KnnError::dimension_mismatch(2, 1));
    }

    #[test]
    fn test_iter_ids_in_order() {
        let store = PointStore::from_flat(&[5.0, 6.0, 7.0], 3, 1).unwrap();
        let ids: Vec<usize> = store.iter().map(|(id, _)| id.as_usize()).collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }
}
