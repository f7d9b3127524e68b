//! k-d tree over representative points.
//!
//! Each entry is a point tagged with an owner. The engine needs three things
//! from it: insert, delete of one *exact* entry, and "everything within radius
//! r of q". Nearest-point deletion is never used.
//!
//! # Layout
//!
//! Nodes live in an arena (`Vec<Node>`); children are indices. A node splits
//! on `depth % dims`. Entries strictly below the split value go left, entries
//! at or above it go right, so an exact lookup can always follow a single
//! path down the tree.
//!
//! # Deletion
//!
//! Removal marks the node dead and leaves it in place as a routing node. Once
//! dead nodes outnumber live ones the tree is rebuilt balanced from the live
//! entries (median split per level), which keeps query cost from degrading
//! over a long merge run.

use crate::distance::euclidean;
use ndarray::{Array1, ArrayBase, Data, Ix1};

/// Dead-node count below which we never bother rebuilding.
const MIN_REBUILD: usize = 32;

#[derive(Debug, Clone)]
struct Node<T> {
    point: Array1<f64>,
    owner: T,
    axis: usize,
    left: Option<usize>,
    right: Option<usize>,
    removed: bool,
}

/// k-d tree mapping points to owners.
#[derive(Debug, Clone)]
pub(crate) struct KdTree<T> {
    nodes: Vec<Node<T>>,
    root: Option<usize>,
    dims: usize,
    live: usize,
}

impl<T: Copy + PartialEq> KdTree<T> {
    /// Empty tree for `dims`-dimensional points.
    pub(crate) fn new(dims: usize) -> Self {
        Self {
            nodes: Vec::new(),
            root: None,
            dims: dims.max(1),
            live: 0,
        }
    }

    /// Balanced tree over `entries`.
    pub(crate) fn from_entries(dims: usize, entries: Vec<(Array1<f64>, T)>) -> Self {
        let mut tree = Self::new(dims);
        tree.build(entries);
        tree
    }

    /// Number of live entries.
    pub(crate) fn len(&self) -> usize {
        self.live
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Insert `point` tagged with `owner`. Duplicates are allowed.
    pub(crate) fn insert(&mut self, point: Array1<f64>, owner: T) {
        let id = self.nodes.len();
        let axis = match self.root {
            None => {
                self.root = Some(id);
                0
            }
            Some(mut cur) => loop {
                let node = &self.nodes[cur];
                let go_left = point[node.axis] < node.point[node.axis];
                let next = if go_left { node.left } else { node.right };
                match next {
                    Some(child) => cur = child,
                    None => {
                        let axis = (node.axis + 1) % self.dims;
                        let parent = &mut self.nodes[cur];
                        if go_left {
                            parent.left = Some(id);
                        } else {
                            parent.right = Some(id);
                        }
                        break axis;
                    }
                }
            },
        };

        self.nodes.push(Node {
            point,
            owner,
            axis,
            left: None,
            right: None,
            removed: false,
        });
        self.live += 1;
    }

    /// Remove the live entry with exactly these coordinates and this owner.
    ///
    /// Returns `false` if there is no such entry.
    pub(crate) fn remove<S>(&mut self, point: &ArrayBase<S, Ix1>, owner: T) -> bool
    where
        S: Data<Elem = f64>,
    {
        let mut cursor = self.root;
        while let Some(cur) = cursor {
            let node = &mut self.nodes[cur];
            if !node.removed && node.owner == owner && node.point == *point {
                node.removed = true;
                self.live -= 1;
                self.maybe_rebuild();
                return true;
            }
            cursor = if point[node.axis] < node.point[node.axis] {
                node.left
            } else {
                node.right
            };
        }
        false
    }

    /// All live entries within `radius` of `point` (inclusive), as `(distance, owner)`.
    pub(crate) fn within_radius<S>(&self, point: &ArrayBase<S, Ix1>, radius: f64) -> Vec<(f64, T)>
    where
        S: Data<Elem = f64>,
    {
        let mut found = Vec::new();
        let mut stack: Vec<usize> = self.root.into_iter().collect();

        while let Some(cur) = stack.pop() {
            let node = &self.nodes[cur];
            if !node.removed {
                let d = euclidean(&node.point, point);
                if d <= radius {
                    found.push((d, node.owner));
                }
            }

            // Left holds coordinates < split, right holds >= split.
            let diff = point[node.axis] - node.point[node.axis];
            if let Some(right) = node.right {
                if diff >= -radius {
                    stack.push(right);
                }
            }
            if let Some(left) = node.left {
                if diff <= radius {
                    stack.push(left);
                }
            }
        }

        found
    }

    fn maybe_rebuild(&mut self) {
        let dead = self.nodes.len() - self.live;
        if dead >= MIN_REBUILD && dead > self.live {
            let entries = self
                .nodes
                .iter()
                .filter(|n| !n.removed)
                .map(|n| (n.point.clone(), n.owner))
                .collect();
            self.build(entries);
        }
    }

    fn build(&mut self, entries: Vec<(Array1<f64>, T)>) {
        self.nodes = Vec::with_capacity(entries.len());
        self.live = entries.len();
        let mut order: Vec<usize> = (0..entries.len()).collect();
        self.root = self.build_level(&entries, &mut order, 0);
    }

    fn build_level(
        &mut self,
        entries: &[(Array1<f64>, T)],
        order: &mut [usize],
        depth: usize,
    ) -> Option<usize> {
        if order.is_empty() {
            return None;
        }

        let axis = depth % self.dims;
        order.sort_by(|&a, &b| entries[a].0[axis].total_cmp(&entries[b].0[axis]));

        // Step the median back over equal keys so the left side is strictly smaller.
        let mut mid = order.len() / 2;
        while mid > 0 && entries[order[mid - 1]].0[axis] == entries[order[mid]].0[axis] {
            mid -= 1;
        }

        let (point, owner) = &entries[order[mid]];
        let id = self.nodes.len();
        self.nodes.push(Node {
            point: point.clone(),
            owner: *owner,
            axis,
            left: None,
            right: None,
            removed: false,
        });

        let (lower, rest) = order.split_at_mut(mid);
        let left = self.build_level(entries, lower, depth + 1);
        let right = self.build_level(entries, &mut rest[1..], depth + 1);
        self.nodes[id].left = left;
        self.nodes[id].right = right;
        Some(id)
    }
}
