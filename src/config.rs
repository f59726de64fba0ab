//! Construction parameters for a delegated approximate index.
//!
//! The exact engine ignores these. They are carried by [`crate::QueryContext`]
//! and handed to whatever approximate index a caller installs, and they are
//! what the foreign-call `build` entry point receives.
//!
//! ```
//! use forge_knn::IndexParams;
//!
//! let params = IndexParams::default()
//!     .with_seed(42)
//!     .with_coverage(16.0)
//!     .with_verbosity(0);
//!
//! params.validate().unwrap();
//! assert!((params.effective_sample_rate(1000) - 10.0).abs() < 1e-3);
//! ```

use crate::constants::params;
use crate::error::{KnnError, Result};
use serde::{Deserialize, Serialize};

/// Tuning parameters for an approximate index build.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexParams {
    /// Random seed for the index's stochastic construction.
    pub seed: u64,
    /// 0 = silent, 1 = summary, 2 = detailed.
    pub verbosity: u8,
    /// Larger values widen the search radius and raise recall.
    pub coverage: f32,
    /// Subsampling rate during construction; `None` derives it from the
    /// point count (see [`IndexParams::effective_sample_rate`]).
    pub sample_rate: Option<f32>,
}

impl Default for IndexParams {
    fn default() -> Self {
        Self {
            seed: params::DEFAULT_SEED,
            verbosity: params::DEFAULT_VERBOSITY,
            coverage: params::DEFAULT_COVERAGE,
            sample_rate: None,
        }
    }
}

impl IndexParams {
    /// Set the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the verbosity. Values above 2 behave like 2.
    pub fn with_verbosity(mut self, verbosity: u8) -> Self {
        self.verbosity = verbosity.min(params::MAX_VERBOSITY);
        self
    }

    /// Set the coverage parameter.
    pub fn with_coverage(mut self, coverage: f32) -> Self {
        self.coverage = coverage;
        self
    }

    /// Set an explicit sample rate.
    pub fn with_sample_rate(mut self, sample_rate: f32) -> Self {
        self.sample_rate = Some(sample_rate);
        self
    }

    /// Sample rate to use for a store of `rows` points: the explicit value if
    /// set, otherwise `rows^(1/3)`.
    pub fn effective_sample_rate(&self, rows: usize) -> f32 {
        self.sample_rate
            .unwrap_or_else(|| (rows as f64).powf(params::SAMPLE_RATE_EXPONENT) as f32)
    }

    /// Check that every numeric parameter is finite and positive and that
    /// the verbosity is at most 2.
    ///
    /// `with_verbosity` clamps, but deserialized params arrive unclamped.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` naming the offending parameter.
    pub fn validate(&self) -> Result<()> {
        if self.verbosity > params::MAX_VERBOSITY {
            return Err(KnnError::invalid_argument(format!(
                "verbosity must be at most {}, got {}",
                params::MAX_VERBOSITY,
                self.verbosity
            )));
        }
        if !self.coverage.is_finite() || self.coverage <= 0.0 {
            return Err(KnnError::invalid_argument(format!(
                "coverage must be finite and positive, got {}",
                self.coverage
            )));
        }
        if let Some(rate) = self.sample_rate {
            if !rate.is_finite() || rate <= 0.0 {
                return Err(KnnError::invalid_argument(format!(
                    "sample_rate must be finite and positive, got {}",
                    rate
                )));
            }
        }
        Ok(())
    }

    /// False at verbosity 0, which silences build events.
    pub(crate) fn logs_build(&self) -> bool {
        self.verbosity > 0
    }
}
