//! # cure
//!
//! CURE (Clustering Using REpresentatives): agglomerative clustering that
//! summarizes each cluster by a bounded set of representative points shrunk
//! toward its mean, so cluster *shape* rather than only centroid position
//! drives the merge order.
//!
//! The engine keeps an ordered frontier of live clusters keyed by their
//! cached nearest-neighbor distance and a k-d tree over all representative
//! points, and repairs neighbor caches lazily: a cache is recomputed only
//! when the cluster it points at is merged away.
//!
//! ```rust
//! use cure::Cure;
//!
//! let data = vec![vec![0.0], vec![0.1], vec![0.2], vec![5.0], vec![5.1]];
//! let fit = Cure::new(2).fit(&data).unwrap();
//!
//! let mut sizes: Vec<usize> = fit.clusters().iter().map(Vec::len).collect();
//! sizes.sort_unstable();
//! assert_eq!(sizes, vec![2, 3]);
//! ```
//!
//! With the `parallel` feature the initial all-pairs neighbor scan runs on
//! rayon; results are identical either way.

pub mod cluster;
pub mod distance;
/// Error types used across `cure`.
pub mod error;

#[cfg(test)]
mod cure_tests;

pub use cluster::{
    Clustering, Cure, CureBackend, CureConfig, CureFit, MergeEngineBackend, MergeStep,
};
pub use error::{Error, Result};
