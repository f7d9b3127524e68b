//! Clustering traits.

use super::cure::{CureConfig, CureFit};
use crate::error::Result;
use core::fmt;
use ndarray::ArrayView2;

/// Trait for clustering algorithms.
pub trait Clustering {
    /// Fit the model to data and return cluster assignments.
    ///
    /// Returns a vector of cluster labels, one per input point.
    fn fit_predict(&self, data: &[Vec<f32>]) -> Result<Vec<usize>>;

    /// Get the number of clusters.
    fn n_clusters(&self) -> usize;
}

/// An implementation of the CURE contract.
///
/// [`Cure`](super::Cure) validates input and parameters, then hands them to
/// its backend. Any backend must return exactly `config.n_clusters` clusters
/// that together partition the rows of `data`.
pub trait CureBackend: fmt::Debug + Send + Sync {
    /// Cluster the rows of `data`.
    fn partition(&self, data: ArrayView2<'_, f64>, config: &CureConfig) -> Result<CureFit>;
}
