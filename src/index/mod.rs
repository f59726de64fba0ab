//! Search backends.

pub mod brute_force;
pub mod traits;

pub use brute_force::{find_nearest, BruteForceIndex};
pub use traits::{NeighborSearch, SearchResult};
