//! Named constants for configuration values.
//!
//! This module centralizes default parameters and boundary codes so they can
//! be found, documented and tuned in one place.

/// Defaults for approximate index construction parameters.
pub mod params {
    /// Default random seed handed to an approximate index.
    pub const DEFAULT_SEED: u64 = 0;

    /// Default verbosity (0 = silent, 1 = summary, 2 = detailed).
    pub const DEFAULT_VERBOSITY: u8 = 2;

    /// Highest verbosity level that changes behavior.
    pub const MAX_VERBOSITY: u8 = 2;

    /// Default coverage parameter. Larger values widen the search and raise recall.
    pub const DEFAULT_COVERAGE: f32 = 8.0;

    /// The derived sample rate is `rows ^ SAMPLE_RATE_EXPONENT`.
    pub const SAMPLE_RATE_EXPONENT: f64 = 1.0 / 3.0;
}

/// Constants for the exact search path.
pub mod search {
    /// Number of queries per rayon task in batch search.
    pub const BATCH_CHUNK_SIZE: usize = 16;
}

/// Sentinel codes returned across the foreign-call boundary.
///
/// Non-negative return values are result counts; everything below zero is
/// one of these.
pub mod codes {
    /// Malformed argument, including a null handle or buffer.
    pub const INVALID_ARGUMENT: i32 = -1;

    /// Query dimensionality differs from the store's.
    pub const DIMENSION_MISMATCH: i32 = -2;

    /// Identifier outside the store.
    pub const OUT_OF_RANGE: i32 = -3;

    /// Point copies could not be allocated.
    pub const ALLOCATION_FAILURE: i32 = -4;

    /// Operation not offered by the backing index.
    pub const NOT_SUPPORTED: i32 = -5;

    /// A panic was caught at the boundary.
    pub const PANIC: i32 = -6;
}
