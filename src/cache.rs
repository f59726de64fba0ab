//! Query-scoped distance memoization.
//!
//! A [`DistanceCache`] lives for exactly one query. Slot `i` holds the
//! distance from the query to point `i` once it has been computed; a slot is
//! never written twice.

/// Indexed cache of query-to-point distances.
#[derive(Debug, Clone)]
pub struct DistanceCache {
    slots: Vec<Option<f32>>,
    computed: usize,
}

impl DistanceCache {
    /// Create an empty cache for a store of `len` points.
    pub fn new(len: usize) -> Self {
        Self {
            slots: vec![None; len],
            computed: 0,
        }
    }

    /// Return the cached distance for `index`, computing it with `compute`
    /// the first time it is requested.
    ///
    /// # Panics
    /// Panics if `index` is outside the cache.
    #[inline]
    pub fn get_or_compute(&mut self, index: usize, compute: impl FnOnce() -> f32) -> f32 {
        match self.slots[index] {
            Some(d) => d,
            None => {
                let d = compute();
                self.slots[index] = Some(d);
                self.computed += 1;
                d
            }
        }
    }

    /// Return the cached distance for `index` without computing it.
    #[inline]
    pub fn get(&self, index: usize) -> Option<f32> {
        self.slots.get(index).copied().flatten()
    }

    /// Number of distances computed so far.
    #[inline]
    pub fn computed(&self) -> usize {
        self.computed
    }

    /// Number of slots (the store size this cache was made for).
    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Return true if the cache has no slots.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
