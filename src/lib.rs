//! forge-knn: exact k-nearest-neighbor queries over a fixed point set.
//!
//! A [`PointStore`] is built once from a row-major `f32` buffer and never
//! changes. Queries rank stored points by Euclidean distance and return the
//! `k` closest identifiers, closest first. Identifiers are 0-based positions
//! in the store.
//!
//! # Features
//!
//! - **Exact search**: every distance computed at most once per query, then
//!   partial selection of the `k` smallest
//! - **SIMD Distance**: AVX2/FMA and NEON kernels picked at runtime, scalar fallback
//! - **Pluggable approximate index**: install any [`NeighborSearch`] on a
//!   [`QueryContext`] to answer queries sub-linearly
//! - **C boundary**: opaque-handle build/query/destroy in [`ffi`]
//!
//! # Example
//!
//! ```
//! use forge_knn::{BruteForceIndex, PointId, PointStore};
//!
//! let store = PointStore::from_flat(&[0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 5.0, 5.0], 4, 2).unwrap();
//! let index = BruteForceIndex::new(store);
//!
//! let nearest = index.find_nearest(&[0.0, 0.0], 2).unwrap();
//! assert_eq!(nearest[0], PointId(0));
//! ```
//!
//! # Concurrency
//!
//! Stores, indexes and contexts are immutable after construction and are
//! `Send + Sync`. Any number of threads may query one of them at once; each
//! query keeps its own distance cache.

pub mod cache;
pub mod config;
pub mod constants;
pub mod context;
pub mod dataset;
pub mod distance;
pub mod error;
pub mod ffi;
pub mod index;
pub mod point;
pub mod stats;
pub mod store;
pub mod types;

// Re-export commonly used types at crate root
pub use cache::DistanceCache;
pub use config::IndexParams;
pub use context::QueryContext;
pub use dataset::{recall_at_k, Dataset};
pub use error::{KnnError, Result};
pub use index::{find_nearest, BruteForceIndex, NeighborSearch, SearchResult};
pub use point::Point;
pub use stats::QueryStats;
pub use store::PointStore;
pub use types::{Dimension, PointId};
