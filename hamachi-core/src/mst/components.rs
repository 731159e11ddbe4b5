//! Derived component assignments for points and tree nodes.
//!
//! After each sweep the driver relabels every point with its union-find root
//! and folds those labels bottom-up over the tree. A node whose points all
//! share one component carries that component id; a mixed node carries a
//! negative sentinel unique to the node, so two mixed nodes never compare
//! equal during the traversal's same-component prune.

use crate::{mst::union_find::UnionFind, tree::TreeStructure};

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct ComponentMap {
    point: Vec<usize>,
    node: Vec<i64>,
}

/// Sentinel for a node spanning more than one component. Unique per node.
fn mixed(node: usize) -> i64 {
    -(node as i64) - 1
}

impl ComponentMap {
    pub(crate) fn new(points: usize, nodes: usize) -> Self {
        Self {
            point: (0..points).collect(),
            node: (0..nodes).map(mixed).collect(),
        }
    }

    #[must_use]
    pub(crate) fn point(&self, p: usize) -> usize {
        self.point[p]
    }

    #[must_use]
    pub(crate) fn node(&self, n: usize) -> i64 {
        self.node[n]
    }

    /// Recomputes both label arrays from the union-find state.
    ///
    /// Idempotent: a second call without intervening unions is a no-op.
    pub(crate) fn update(&mut self, structure: &TreeStructure, union_find: &mut UnionFind) {
        for p in 0..self.point.len() {
            self.point[p] = union_find.find(p);
        }

        for n in (0..self.node.len()).rev() {
            let record = structure.node(n);
            if record.is_leaf {
                self.node[n] = self.fold_leaf(structure, n);
            } else {
                let left = self.node[2 * n + 1];
                let right = self.node[2 * n + 2];
                self.node[n] = if left == right { left } else { mixed(n) };
            }
        }
    }

    fn fold_leaf(&self, structure: &TreeStructure, n: usize) -> i64 {
        let mut points = structure.node_points(n).iter();
        let Some(&first) = points.next() else {
            return mixed(n);
        };
        let component = self.point[first];
        if points.all(|&p| self.point[p] == component) {
            component as i64
        } else {
            mixed(n)
        }
    }
}
