//! Scalar Euclidean kernels.
//! These are the reference results the SIMD kernels are tested against, and the
//! fallback on platforms without a vector path.

/// Compute the Euclidean (L2) distance between two coordinate slices.
///
/// Returns sqrt(sum((a[i] - b[i])^2))
#[inline]
pub fn euclidean_distance(a: &[f32], b: &[f32]) -> f32 {
    euclidean_distance_squared(a, b).sqrt()
}

/// Compute the squared Euclidean distance between two coordinate slices.
///
/// Returns sum((a[i] - b[i])^2). Orders points exactly like
/// [`euclidean_distance`] without the square root.
#[inline]
pub fn euclidean_distance_squared(a: &[f32], b: &[f32]) -> f32 {
    assert_eq!(a.len(), b.len(), "Point dimensions must match");

    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let diff = x - y;
            diff * diff
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_euclidean_distance_identical() {
        let a = vec![1.0, 2.0, 3.0];
        assert_eq!(euclidean_distance(&a, &a), 0.0);
    }

    #[test]
    fn test_euclidean_distance_simple() {
        let a = vec![0.0, 0.0];
        let b = vec![3.0, 4.0];
        assert!((euclidean_distance(&a, &b) - 5.0).abs() < 1e-6);
        assert!((euclidean_distance_squared(&a, &b) - 25.0).abs() < 1e-6);
    }

    #[test]
    fn test_euclidean_distance_negative_coords() {
        let a = vec![-1.0, -1.0];
        let b = vec![2.0, 3.0];
        assert!((euclidean_distance(&a, &b) - 5.0).abs() < 1e-6);
    }

    #[test]
    #[should_panic(expected = "Point dimensions must match")]
    fn test_mismatched_lengths_panic() {
        euclidean_distance(&[1.0, 2.0], &[1.0]);
    }
}
