//! CURE: Clustering Using REpresentatives (Guha, Rastogi & Shim, 1998).
//!
//! Agglomerative clustering where each cluster is summarized by at most `R`
//! **representative points** instead of a single centroid. The distance
//! between two clusters is the minimum distance between their representatives:
//!
//! ```text
//! d(A, B) = min { ||a − b|| : a ∈ reps(A), b ∈ reps(B) }
//! ```
//!
//! Several well-scattered representatives let CURE follow elongated or
//! non-convex clusters that centroid methods split. After every merge the new
//! representatives are shrunk toward the cluster mean by the `compression`
//! factor, which damps the pull of outliers:
//!
//! | compression | Behavior |
//! |-------------|----------|
//! | 0.0 | No shrink; close to single linkage over sampled points |
//! | 0.5 | Default |
//! | 1.0 | Every representative sits on the mean; centroid linkage |
//!
//! # Engine
//!
//! The merge loop keeps every live cluster in a frontier sorted by its cached
//! nearest-neighbor distance, and indexes all representatives in a k-d tree.
//! Each round merges the frontier head with its cached neighbor; only clusters
//! whose neighbor was just merged away are re-searched, through a radius
//! query on the tree. `n − k` rounds produce `k` clusters.
//!
//! # Example
//!
//! ```rust
//! use cure::{Clustering, Cure};
//!
//! let data = vec![
//!     vec![0.0, 0.0],
//!     vec![0.2, 0.1],
//!     vec![9.0, 9.0],
//!     vec![9.1, 9.2],
//! ];
//!
//! let fit = Cure::new(2)
//!     .with_representatives(3)
//!     .with_compression(0.3)
//!     .fit(&data)
//!     .unwrap();
//! assert_eq!(fit.n_clusters(), 2);
//! assert_eq!(fit.means().len(), 2);
//!
//! let labels = Cure::new(2).fit_predict(&data).unwrap();
//! assert_eq!(labels[0], labels[1]);
//! assert_ne!(labels[0], labels[2]);
//! ```

mod engine;
mod entity;
mod frontier;
mod kdtree;

use super::traits::{Clustering, CureBackend};
use crate::error::{Error, Result};
use engine::MergeEngine;
use ndarray::{Array1, Array2, ArrayView2};
use std::sync::Arc;

/// Validated CURE parameters, as handed to a [`CureBackend`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CureConfig {
    /// Number of clusters to stop at (`k`).
    pub n_clusters: usize,
    /// Maximum representative points per cluster (`R`).
    pub n_representatives: usize,
    /// Shrink factor toward the mean, in `[0, 1]`.
    pub compression: f64,
}

impl Default for CureConfig {
    fn default() -> Self {
        Self {
            n_clusters: 1,
            n_representatives: 5,
            compression: 0.5,
        }
    }
}

impl CureConfig {
    /// Check the parameters against a dataset of `n_items` points.
    pub fn validate(&self, n_items: usize) -> Result<()> {
        if self.n_clusters == 0 || self.n_clusters > n_items {
            return Err(Error::InvalidClusterCount {
                requested: self.n_clusters,
                n_items,
            });
        }
        if self.n_representatives == 0 {
            return Err(Error::InvalidParameter {
                name: "n_representatives",
                message: "must be at least 1",
            });
        }
        // Written so that NaN fails too.
        if !(0.0..=1.0).contains(&self.compression) {
            return Err(Error::InvalidParameter {
                name: "compression",
                message: "must lie in [0, 1]",
            });
        }
        Ok(())
    }
}

/// One merge in the agglomeration history.
///
/// Ids follow the SciPy convention: input points are `0..n`, and the `i`-th
/// merge creates cluster `n + i`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MergeStep {
    /// Frontier head that was merged.
    pub left: usize,
    /// Its cached nearest neighbor.
    pub right: usize,
    /// Representative distance between the two at merge time.
    pub distance: f64,
    /// Member count of the new cluster.
    pub size: usize,
}

/// Result of a CURE run.
///
/// All views are projections of the final clusters, aligned by position:
/// `clusters()[i]`, `representatives()[i]` and `means()[i]` describe the
/// same cluster.
#[derive(Debug, Clone, PartialEq)]
pub struct CureFit {
    pub(crate) clusters: Vec<Vec<usize>>,
    pub(crate) representatives: Vec<Vec<Array1<f64>>>,
    pub(crate) means: Vec<Array1<f64>>,
    pub(crate) merges: Vec<MergeStep>,
}

impl CureFit {
    /// Assemble a result from its parts, for backends other than the built-in engine.
    ///
    /// The three vectors must be position-aligned and the clusters must
    /// partition the input; [`Cure::fit_matrix`] rejects anything else.
    /// No merge history is recorded.
    pub fn from_parts(
        clusters: Vec<Vec<usize>>,
        representatives: Vec<Vec<Array1<f64>>>,
        means: Vec<Array1<f64>>,
    ) -> Self {
        Self {
            clusters,
            representatives,
            means,
            merges: Vec::new(),
        }
    }

    /// Number of clusters.
    pub fn n_clusters(&self) -> usize {
        self.clusters.len()
    }

    /// Number of clustered points.
    pub fn n_points(&self) -> usize {
        self.clusters.iter().map(Vec::len).sum()
    }

    /// Member indices of each cluster, in merge order.
    pub fn clusters(&self) -> &[Vec<usize>] {
        &self.clusters
    }

    /// Representative points of each cluster (already shrunk).
    pub fn representatives(&self) -> &[Vec<Array1<f64>>] {
        &self.representatives
    }

    /// Mean of each cluster.
    pub fn means(&self) -> &[Array1<f64>] {
        &self.means
    }

    /// Merge history, oldest first. Empty for external backends.
    pub fn merges(&self) -> &[MergeStep] {
        &self.merges
    }

    /// One label per input point: the position of its cluster in [`Self::clusters`].
    pub fn labels(&self) -> Vec<usize> {
        let mut labels = vec![0; self.n_points()];
        for (label, members) in self.clusters.iter().enumerate() {
            for &idx in members {
                labels[idx] = label;
            }
        }
        labels
    }

    /// Group the original items by cluster.
    ///
    /// `data` must be the sequence that was clustered.
    pub fn cluster_points<'d, T>(&self, data: &'d [T]) -> Result<Vec<Vec<&'d T>>> {
        if data.len() != self.n_points() {
            return Err(Error::InvalidParameter {
                name: "data",
                message: "length differs from the number of clustered points",
            });
        }
        Ok(self
            .clusters
            .iter()
            .map(|members| members.iter().map(|&idx| &data[idx]).collect())
            .collect())
    }
}

/// The merge engine described in this module. Default backend of [`Cure`].
#[derive(Debug, Clone, Copy, Default)]
pub struct MergeEngineBackend;

impl CureBackend for MergeEngineBackend {
    fn partition(&self, data: ArrayView2<'_, f64>, config: &CureConfig) -> Result<CureFit> {
        check_matrix(data)?;
        config.validate(data.nrows())?;
        MergeEngine::new(data, config).run()
    }
}

/// CURE clusterer.
#[derive(Debug, Clone)]
pub struct Cure {
    config: CureConfig,
    backend: Arc<dyn CureBackend>,
}

impl Cure {
    /// Create a clusterer that stops at `n_clusters` clusters.
    pub fn new(n_clusters: usize) -> Self {
        Self {
            config: CureConfig {
                n_clusters,
                ..CureConfig::default()
            },
            backend: Arc::new(MergeEngineBackend),
        }
    }

    /// Set the maximum number of representative points per cluster.
    pub fn with_representatives(mut self, n_representatives: usize) -> Self {
        self.config.n_representatives = n_representatives;
        self
    }

    /// Set the shrink factor toward the mean.
    pub fn with_compression(mut self, compression: f64) -> Self {
        self.config.compression = compression;
        self
    }

    /// Run with a different implementation of the same contract.
    pub fn with_backend(mut self, backend: Arc<dyn CureBackend>) -> Self {
        self.backend = backend;
        self
    }

    /// Current parameters.
    pub fn config(&self) -> &CureConfig {
        &self.config
    }

    /// Cluster `data`, one point per row.
    pub fn fit(&self, data: &[Vec<f32>]) -> Result<CureFit> {
        let matrix = to_matrix(data)?;
        self.fit_matrix(matrix.view())
    }

    /// Cluster the rows of `data`.
    pub fn fit_matrix(&self, data: ArrayView2<'_, f64>) -> Result<CureFit> {
        check_matrix(data)?;
        self.config.validate(data.nrows())?;
        let fit = self.backend.partition(data, &self.config)?;
        check_fit(&fit, data.nrows())?;
        Ok(fit)
    }
}

impl Clustering for Cure {
    fn fit_predict(&self, data: &[Vec<f32>]) -> Result<Vec<usize>> {
        Ok(self.fit(data)?.labels())
    }

    fn n_clusters(&self) -> usize {
        self.config.n_clusters
    }
}

fn to_matrix(data: &[Vec<f32>]) -> Result<Array2<f64>> {
    if data.is_empty() {
        return Err(Error::EmptyInput);
    }

    let n = data.len();
    let d = data[0].len();
    let mut flat: Vec<f64> = Vec::with_capacity(n * d);
    for point in data {
        if point.len() != d {
            return Err(Error::DimensionMismatch {
                expected: d,
                found: point.len(),
            });
        }
        flat.extend(point.iter().map(|&x| f64::from(x)));
    }
    Array2::from_shape_vec((n, d), flat).map_err(|e| Error::Internal(e.to_string()))
}

/// A backend result must partition `0..n_items` with aligned projections.
fn check_fit(fit: &CureFit, n_items: usize) -> Result<()> {
    let k = fit.clusters.len();
    if fit.representatives.len() != k || fit.means.len() != k {
        return Err(Error::Internal(format!(
            "backend returned {k} clusters but {} representative sets and {} means",
            fit.representatives.len(),
            fit.means.len()
        )));
    }

    let mut seen = vec![false; n_items];
    for &idx in fit.clusters.iter().flatten() {
        match seen.get_mut(idx) {
            Some(slot) if !*slot => *slot = true,
            Some(_) => {
                return Err(Error::Internal(format!(
                    "backend assigned point {idx} more than once"
                )))
            }
            None => {
                return Err(Error::Internal(format!(
                    "backend returned point {idx} for {n_items} input points"
                )))
            }
        }
    }
    if let Some(idx) = seen.iter().position(|&s| !s) {
        return Err(Error::Internal(format!("backend left point {idx} unassigned")));
    }
    Ok(())
}

fn check_matrix(data: ArrayView2<'_, f64>) -> Result<()> {
    if data.nrows() == 0 {
        return Err(Error::EmptyInput);
    }
    if data.ncols() == 0 {
        return Err(Error::InvalidParameter {
            name: "data",
            message: "points must have at least one coordinate",
        });
    }
    if let Some(index) = data
        .rows()
        .into_iter()
        .position(|row| row.iter().any(|x| !x.is_finite()))
    {
        return Err(Error::NonFinite { index });
    }
    Ok(())
}
