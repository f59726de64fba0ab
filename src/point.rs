use rand::Rng;
use std::ops::Deref;

/// A point with owned floating-point coordinates.
///
/// Coordinates are copied out of the caller's buffer on construction, so a
/// point never borrows from memory the caller may free later.
#[derive(Clone, Debug, PartialEq)]
pub struct Point {
    coords: Box<[f32]>,
}

impl Point {
    /// Create a new point from owned coordinates.
    pub fn new(coords: Vec<f32>) -> Self {
        Self {
            coords: coords.into_boxed_slice(),
        }
    }

    /// Create a random point with coordinates uniformly distributed in [0.0, 1.0).
    pub fn random<R: Rng + ?Sized>(rng: &mut R, dim: usize) -> Self {
        let coords: Vec<f32> = (0..dim).map(|_| rng.gen_range(0.0..1.0)).collect();
        Self::new(coords)
    }

    /// Return the dimensionality of this point.
    #[inline]
    pub fn dim(&self) -> usize {
        self.coords.len()
    }

    /// Return the coordinates as a slice.
    #[inline]
    pub fn as_slice(&self) -> &[f32] {
        &self.coords
    }
}

impl Deref for Point {
    type Target = [f32];

    fn deref(&self) -> &[f32] {
        &self.coords
    }
}

impl AsRef<[f32]> for Point {
    fn as_ref(&self) -> &[f32] {
        &self.coords
    }
}

impl From<Vec<f32>> for Point {
    fn from(coords: Vec<f32>) -> Self {
        Self::new(coords)
    }
}

impl From<&[f32]> for Point {
    fn from(coords: &[f32]) -> Self {
        Self::new(coords.to_vec())
    }
}
