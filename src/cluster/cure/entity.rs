//! The CURE cluster entity and the merge step.
//!
//! A cluster owns the indices of its member points, their exact centroid,
//! and at most `R` representative points. Representatives are picked by
//! farthest-point sampling over the members and then shrunk toward the mean:
//!
//! ```text
//! rep' = rep + c × (mean − rep) = rep × (1 − c) + mean × c
//! ```
//!
//! The second form is what we compute: it is exact at both ends, so `c = 0`
//! leaves the sampled points untouched and `c = 1` puts every representative
//! exactly on the mean.

use crate::distance::euclidean;
use ndarray::{Array1, ArrayView1, ArrayView2};

/// Stable identifier of a cluster inside the engine's arena.
///
/// Leaves take ids `0..n`; the `i`-th merge creates id `n + i`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct ClusterId(pub(crate) usize);

#[derive(Debug, Clone)]
pub(crate) struct CureCluster {
    /// Indices into the input data, in merge order.
    pub(crate) points: Vec<usize>,
    pub(crate) mean: Array1<f64>,
    pub(crate) representatives: Vec<Array1<f64>>,
    /// Cached nearest neighbor. Allowed to go stale until the engine repairs it.
    pub(crate) closest: Option<ClusterId>,
    /// Cached distance to `closest`; infinite when no neighbor is known.
    pub(crate) distance: f64,
}

impl CureCluster {
    /// A cluster holding a single input point, which is also its mean and
    /// only representative.
    pub(crate) fn singleton(index: usize, point: ArrayView1<'_, f64>) -> Self {
        let point = point.to_owned();
        Self {
            points: vec![index],
            mean: point.clone(),
            representatives: vec![point],
            closest: None,
            distance: f64::INFINITY,
        }
    }

    /// Number of member points.
    pub(crate) fn len(&self) -> usize {
        self.points.len()
    }

    /// Minimum Euclidean distance over all pairs of representative points.
    pub(crate) fn distance_to(&self, other: &CureCluster) -> f64 {
        let mut best = f64::INFINITY;
        for a in &self.representatives {
            for b in &other.representatives {
                let d = euclidean(a, b);
                if d < best {
                    best = d;
                }
            }
        }
        best
    }

    /// Merge two clusters into a new one with a fresh mean and representative set.
    ///
    /// The result has no cached neighbor yet.
    pub(crate) fn merge(
        first: &CureCluster,
        second: &CureCluster,
        data: ArrayView2<'_, f64>,
        n_representatives: usize,
        compression: f64,
    ) -> Self {
        let mut points = Vec::with_capacity(first.len() + second.len());
        points.extend_from_slice(&first.points);
        points.extend_from_slice(&second.points);

        // Weighted by member counts, not representative counts.
        let n1 = first.len() as f64;
        let n2 = second.len() as f64;
        let mean = (&first.mean * n1 + &second.mean * n2) / (n1 + n2);

        let representatives = farthest_point_sample(&points, data, mean.view(), n_representatives)
            .into_iter()
            .map(|idx| shrink(data.row(idx), mean.view(), compression))
            .collect();

        Self {
            points,
            mean,
            representatives,
            closest: None,
            distance: f64::INFINITY,
        }
    }
}

/// Pick up to `cap` member points by farthest-point sampling.
///
/// The first pick is the member farthest from `mean`; each later pick is the
/// unselected member farthest from the *previous pick* only. Ties go to the
/// member seen last in `points` order. Returns data row indices in pick order.
pub(crate) fn farthest_point_sample(
    points: &[usize],
    data: ArrayView2<'_, f64>,
    mean: ArrayView1<'_, f64>,
    cap: usize,
) -> Vec<usize> {
    let mut taken = vec![false; points.len()];
    let mut picks: Vec<usize> = Vec::with_capacity(cap.min(points.len()));

    while picks.len() < cap {
        let anchor = match picks.last() {
            None => mean.view(),
            Some(&idx) => data.row(idx),
        };

        let mut best: Option<usize> = None;
        let mut best_distance = f64::NEG_INFINITY;
        for (pos, &idx) in points.iter().enumerate() {
            if taken[pos] {
                continue;
            }
            let d = euclidean(&data.row(idx), &anchor);
            if d >= best_distance {
                best_distance = d;
                best = Some(pos);
            }
        }

        match best {
            Some(pos) => {
                taken[pos] = true;
                picks.push(points[pos]);
            }
            None => break,
        }
    }

    picks
}

/// Move `point` toward `mean` by the fraction `compression`.
pub(crate) fn shrink(point: ArrayView1<'_, f64>, mean: ArrayView1<'_, f64>, compression: f64) -> Array1<f64> {
    &point * (1.0 - compression) + &mean * compression
}
