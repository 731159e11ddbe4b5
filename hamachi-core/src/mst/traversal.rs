//! Recursive pruned dual-tree traversal.
//!
//! One call of `traverse(root, root)` per sweep updates, for every live
//! component, the best (minimum mutual-reachability) edge leaving it. Two
//! prunes keep the recursion cheap: a node pair whose lower bound cannot
//! beat the query node's bound is dropped, and a pair fully inside one
//! component is dropped. Descent always visits the nearer child first — the
//! near side tightens candidates before the far side is tested against them
//! — and ties go left so sweeps are deterministic.

use crate::{mst::MstDriver, tree::TreeGeometry};

impl<T: TreeGeometry + Sync> MstDriver<'_, T> {
    pub(super) fn traverse(&mut self, query: usize, reference: usize) {
        let node_dist = self.tree.node_lower_bound(&self.aux, query, reference);
        if node_dist >= self.bounds.get(query) {
            return;
        }
        let query_component = self.components.node(query);
        if query_component >= 0 && query_component == self.components.node(reference) {
            return;
        }

        let structure = self.tree.structure();
        let query_record = structure.node(query);
        let reference_record = structure.node(reference);

        if query_record.is_leaf && reference_record.is_leaf {
            self.leaf_pass(query, reference);
        } else if query_record.is_leaf
            || (!reference_record.is_leaf && reference_record.radius > query_record.radius)
        {
            let left = 2 * reference + 1;
            let right = left + 1;
            let left_dist = self.tree.node_lower_bound(&self.aux, query, left);
            let right_dist = self.tree.node_lower_bound(&self.aux, query, right);
            if left_dist <= right_dist {
                self.traverse(query, left);
                self.traverse(query, right);
            } else {
                self.traverse(query, right);
                self.traverse(query, left);
            }
        } else {
            let left = 2 * query + 1;
            let right = left + 1;
            let left_dist = self.tree.node_lower_bound(&self.aux, left, reference);
            let right_dist = self.tree.node_lower_bound(&self.aux, right, reference);
            if left_dist <= right_dist {
                self.traverse(left, reference);
                self.traverse(right, reference);
            } else {
                self.traverse(right, reference);
                self.traverse(left, reference);
            }
        }
    }

    /// Compares every admissible point pair between two leaves, improving
    /// per-component candidates, then lowers the query leaf's bound.
    fn leaf_pass(&mut self, query: usize, reference: usize) {
        let tree = self.tree;
        let structure = tree.structure();
        let alpha = self.alpha;

        let mut new_upper = 0.0_f64;
        let mut new_lower = f64::INFINITY;

        for &p in structure.node_points(query) {
            let p_component = self.components.point(p);
            // A point whose core distance already exceeds its component's
            // candidate cannot improve it: mutual reachability never drops
            // below either core distance.
            if self.core_distance[p] > self.candidates.distance[p_component] {
                continue;
            }

            for &q in structure.node_points(reference) {
                if self.core_distance[q] > self.candidates.distance[p_component] {
                    continue;
                }
                if self.components.point(q) == p_component {
                    continue;
                }

                let d = tree.leaf_pair_distance(alpha, p, q);
                let mutual = if alpha != 1.0 {
                    (d / alpha).max(self.core_distance[p]).max(self.core_distance[q])
                } else {
                    d.max(self.core_distance[p]).max(self.core_distance[q])
                };
                if mutual < self.candidates.distance[p_component] {
                    self.candidates.distance[p_component] = mutual;
                    self.candidates.point[p_component] = p;
                    self.candidates.neighbor[p_component] = q;
                }
            }

            new_upper = new_upper.max(self.candidates.distance[p_component]);
            new_lower = new_lower.min(self.candidates.distance[p_component]);
        }

        let radius = tree.pruning_radius(query);
        let new_bound = new_upper.min(new_lower + 2.0 * radius);
        if self.bounds.lower(query, new_bound) {
            self.bounds
                .propagate(query, |parent, left, right| tree.parent_bound(parent, left, right));
        }
    }
}
