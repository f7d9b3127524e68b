//! Live clusters ordered by cached nearest-neighbor distance.
//!
//! The frontier stores ids only. Distances live on the clusters themselves
//! and are read through a lookup closure at insertion time, so a cluster
//! whose distance changed must be taken out with [`Frontier::remove_all`] and
//! put back with [`Frontier::insert_sorted`] to restore order.

use super::entity::ClusterId;

#[derive(Debug, Clone, Default)]
pub(crate) struct Frontier {
    order: Vec<ClusterId>,
}

impl Frontier {
    /// Frontier over `ids`, stably sorted ascending by `distance_of`.
    pub(crate) fn from_unsorted<F>(mut ids: Vec<ClusterId>, distance_of: F) -> Self
    where
        F: Fn(ClusterId) -> f64,
    {
        ids.sort_by(|&a, &b| distance_of(a).total_cmp(&distance_of(b)));
        Self { order: ids }
    }

    pub(crate) fn len(&self) -> usize {
        self.order.len()
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Cluster with the smallest cached distance.
    pub(crate) fn head(&self) -> Option<ClusterId> {
        self.order.first().copied()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = ClusterId> + '_ {
        self.order.iter().copied()
    }

    /// Drop `id`. Returns `false` if it was not present.
    pub(crate) fn remove(&mut self, id: ClusterId) -> bool {
        match self.order.iter().position(|&other| other == id) {
            Some(pos) => {
                self.order.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Insert before the first entry whose distance is strictly greater.
    pub(crate) fn insert_sorted<F>(&mut self, id: ClusterId, distance_of: F)
    where
        F: Fn(ClusterId) -> f64,
    {
        let distance = distance_of(id);
        match self.order.iter().position(|&other| distance < distance_of(other)) {
            Some(pos) => self.order.insert(pos, id),
            None => self.order.push(id),
        }
    }

    /// Drop every id in `ids`.
    ///
    /// Clusters whose distances changed must all come out before any goes
    /// back in: while one still sits at its old position the rest of the
    /// order is not sorted.
    pub(crate) fn remove_all(&mut self, ids: &[ClusterId]) {
        self.order.retain(|id| !ids.contains(id));
    }
}
