//! The merge loop.
//!
//! Clusters live in an arena indexed by [`ClusterId`]; a merged-away slot is
//! set to `None`, so a stale `closest` link can be detected instead of
//! dangling. Each round:
//!
//! 1. Take the frontier head `c1` and its cached neighbor `c2`.
//! 2. Drop both from the frontier and their representatives from the k-d tree.
//! 3. Build the merged cluster and index its representatives.
//! 4. Scan the remaining clusters once. The scan finds the merged cluster's
//!    nearest neighbor and repairs every cluster whose cached neighbor was
//!    `c1` or `c2`, or for which the merged cluster is now strictly closer.
//! 5. Pull every repaired cluster out of the frontier, insert the merged
//!    cluster, then put the repaired clusters back in scan order.
//!
//! Neighbor caches are only recomputed when the cluster they point at is
//! destroyed, which is what keeps a round from rescanning every pair.

use super::entity::{ClusterId, CureCluster};
use super::frontier::Frontier;
use super::kdtree::KdTree;
use super::{CureConfig, CureFit, MergeStep};
use crate::error::{Error, Result};
use ndarray::ArrayView2;
use tracing::{debug, trace};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

pub(crate) struct MergeEngine<'a> {
    data: ArrayView2<'a, f64>,
    n_clusters: usize,
    n_representatives: usize,
    compression: f64,
    clusters: Vec<Option<CureCluster>>,
    frontier: Frontier,
    index: KdTree<ClusterId>,
    merges: Vec<MergeStep>,
}

impl<'a> MergeEngine<'a> {
    /// One singleton cluster per row of `data`, with exact nearest neighbors.
    ///
    /// `config` must already be validated against `data`.
    pub(crate) fn new(data: ArrayView2<'a, f64>, config: &CureConfig) -> Self {
        let n = data.nrows();
        let mut clusters: Vec<CureCluster> = (0..n)
            .map(|i| CureCluster::singleton(i, data.row(i)))
            .collect();

        let nearest = initial_neighbors(&clusters);
        for (cluster, (closest, distance)) in clusters.iter_mut().zip(nearest) {
            cluster.closest = closest;
            cluster.distance = distance;
        }

        let frontier = Frontier::from_unsorted((0..n).map(ClusterId).collect(), |id| {
            clusters[id.0].distance
        });
        let entries = frontier
            .iter()
            .flat_map(|id| {
                clusters[id.0]
                    .representatives
                    .iter()
                    .map(move |rep| (rep.clone(), id))
            })
            .collect();
        let index = KdTree::from_entries(data.ncols(), entries);

        Self {
            data,
            n_clusters: config.n_clusters,
            n_representatives: config.n_representatives,
            compression: config.compression,
            clusters: clusters.into_iter().map(Some).collect(),
            frontier,
            index,
            merges: Vec::with_capacity(n.saturating_sub(config.n_clusters)),
        }
    }

    /// Merge until `n_clusters` remain.
    pub(crate) fn run(mut self) -> Result<CureFit> {
        debug!(
            n_points = self.data.nrows(),
            n_clusters = self.n_clusters,
            n_representatives = self.n_representatives,
            compression = self.compression,
            "starting CURE merge loop"
        );

        while self.frontier.len() > self.n_clusters {
            self.merge_nearest()?;
        }

        debug!(merges = self.merges.len(), "CURE merge loop finished");
        self.into_fit()
    }

    /// Run one round: merge the globally closest pair and repair caches.
    pub(crate) fn merge_nearest(&mut self) -> Result<()> {
        let c1 = self
            .frontier
            .head()
            .ok_or_else(|| Error::Internal("merge requested on an empty frontier".into()))?;
        let (c2, pair_distance) = {
            let head = self.cluster(c1)?;
            let closest = head.closest.ok_or_else(|| {
                Error::Internal(format!("frontier head {} has no neighbor", c1.0))
            })?;
            (closest, head.distance)
        };

        self.frontier.remove(c1);
        if !self.frontier.remove(c2) {
            return Err(Error::Internal(format!(
                "neighbor {} of cluster {} is not in the frontier",
                c2.0, c1.0
            )));
        }

        let first = self.take(c1)?;
        let second = self.take(c2)?;
        for rep in &first.representatives {
            self.index.remove(rep, c1);
        }
        for rep in &second.representatives {
            self.index.remove(rep, c2);
        }

        let mut merged = CureCluster::merge(
            &first,
            &second,
            self.data,
            self.n_representatives,
            self.compression,
        );
        let merged_id = ClusterId(self.clusters.len());
        for rep in &merged.representatives {
            self.index.insert(rep.clone(), merged_id);
        }
        self.merges.push(MergeStep {
            left: c1.0,
            right: c2.0,
            distance: pair_distance,
            size: merged.len(),
        });

        let mut relocations = Vec::new();
        if let Some(head) = self.frontier.head() {
            // Any live cluster will do as a starting candidate.
            merged.closest = Some(head);
            merged.distance = merged.distance_to(self.cluster(head)?);

            let items: Vec<ClusterId> = self.frontier.iter().collect();
            for item_id in items {
                let (item_closest, item_distance, distance) = {
                    let item = self.cluster(item_id)?;
                    (item.closest, item.distance, merged.distance_to(item))
                };

                if distance < merged.distance {
                    merged.closest = Some(item_id);
                    merged.distance = distance;
                }

                let lost_neighbor = item_closest == Some(c1) || item_closest == Some(c2);
                let repaired = if lost_neighbor {
                    if item_distance < distance {
                        // The merged cluster sits at exactly `distance`, so the
                        // query always finds it at worst.
                        Some(
                            self.closest_cluster(item_id, distance)?
                                .unwrap_or((merged_id, distance)),
                        )
                    } else {
                        Some((merged_id, distance))
                    }
                } else if distance < item_distance {
                    Some((merged_id, distance))
                } else {
                    None
                };

                if let Some((closest, distance)) = repaired {
                    let item = self.cluster_mut(item_id)?;
                    item.closest = Some(closest);
                    item.distance = distance;
                    relocations.push(item_id);
                }
            }
        }

        trace!(
            left = c1.0,
            right = c2.0,
            merged = merged_id.0,
            distance = pair_distance,
            size = merged.len(),
            repaired = relocations.len(),
            indexed = self.index.len(),
            "merged clusters"
        );

        self.clusters.push(Some(merged));

        // Merged goes in ahead of the repaired clusters, which win no ties
        // against it.
        let clusters = &self.clusters;
        let distance_of = |id: ClusterId| {
            clusters[id.0]
                .as_ref()
                .map_or(f64::INFINITY, |c| c.distance)
        };
        self.frontier.remove_all(&relocations);
        self.frontier.insert_sorted(merged_id, distance_of);
        for &id in &relocations {
            self.frontier.insert_sorted(id, distance_of);
        }

        Ok(())
    }

    /// Nearest live cluster to `id` among those with a representative within
    /// `radius` of one of `id`'s representatives.
    fn closest_cluster(&self, id: ClusterId, radius: f64) -> Result<Option<(ClusterId, f64)>> {
        let cluster = self.cluster(id)?;
        let mut best: Option<(ClusterId, f64)> = None;
        for rep in &cluster.representatives {
            for (distance, owner) in self.index.within_radius(rep, radius) {
                if owner == id {
                    continue;
                }
                if best.map_or(true, |(_, d)| distance < d) {
                    best = Some((owner, distance));
                }
            }
        }
        Ok(best)
    }

    fn cluster(&self, id: ClusterId) -> Result<&CureCluster> {
        self.clusters
            .get(id.0)
            .and_then(Option::as_ref)
            .ok_or_else(|| destroyed(id))
    }

    fn cluster_mut(&mut self, id: ClusterId) -> Result<&mut CureCluster> {
        self.clusters
            .get_mut(id.0)
            .and_then(Option::as_mut)
            .ok_or_else(|| destroyed(id))
    }

    fn take(&mut self, id: ClusterId) -> Result<CureCluster> {
        self.clusters
            .get_mut(id.0)
            .and_then(Option::take)
            .ok_or_else(|| destroyed(id))
    }

    fn into_fit(self) -> Result<CureFit> {
        let Self {
            mut clusters,
            frontier,
            merges,
            ..
        } = self;

        let mut members = Vec::with_capacity(frontier.len());
        let mut representatives = Vec::with_capacity(frontier.len());
        let mut means = Vec::with_capacity(frontier.len());
        for id in frontier.iter() {
            let cluster = clusters
                .get_mut(id.0)
                .and_then(Option::take)
                .ok_or_else(|| destroyed(id))?;
            members.push(cluster.points);
            representatives.push(cluster.representatives);
            means.push(cluster.mean);
        }

        Ok(CureFit {
            clusters: members,
            representatives,
            means,
            merges,
        })
    }
}

fn destroyed(id: ClusterId) -> Error {
    Error::Internal(format!("cluster {} referenced after it was merged", id.0))
}

/// Exhaustive nearest neighbor of one cluster; first minimum wins ties.
///
/// `None` only when there is no other cluster.
fn nearest_of(clusters: &[CureCluster], i: usize) -> (Option<ClusterId>, f64) {
    let mut best: (Option<ClusterId>, f64) = (None, f64::INFINITY);
    for (k, other) in clusters.iter().enumerate() {
        if k == i {
            continue;
        }
        // The first candidate is taken even at an overflowed infinite distance.
        let d = clusters[i].distance_to(other);
        if best.0.is_none() || d < best.1 {
            best = (Some(ClusterId(k)), d);
        }
    }
    best
}

#[cfg(feature = "parallel")]
fn initial_neighbors(clusters: &[CureCluster]) -> Vec<(Option<ClusterId>, f64)> {
    (0..clusters.len())
        .into_par_iter()
        .map(|i| nearest_of(clusters, i))
        .collect()
}

#[cfg(not(feature = "parallel"))]
fn initial_neighbors(clusters: &[CureCluster]) -> Vec<(Option<ClusterId>, f64)> {
    (0..clusters.len()).map(|i| nearest_of(clusters, i)).collect()
}
