//! Ball-tree over dense row-major data.
//!
//! Nodes carry a centroid and a covering radius. The engine stays in true
//! distance units on this tree (the reduced form of every supported metric is
//! only exploited on the KD path), and node-to-node pruning uses pairwise
//! centroid distances computed once per run.

use crate::{
    error::TreeError,
    metric::Metric,
    tree::{KnnBlock, NearestSet, SpatialIndex, TreeGeometry, TreeStructure},
};

/// Pairwise centroid distances, `node_count × node_count`, in true units.
#[derive(Clone, Debug)]
pub(crate) struct CentroidDistances {
    node_count: usize,
    values: Vec<f64>,
}

impl CentroidDistances {
    #[must_use]
    pub(crate) fn between(&self, a: usize, b: usize) -> f64 {
        self.values[a * self.node_count + b]
    }
}

/// A Ball-tree built by recursive median splits along the widest axis.
///
/// # Examples
/// ```
/// use hamachi_core::{BallTree, Metric, SpatialIndex};
///
/// let data = vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 5.0, 5.0];
/// let tree = BallTree::build(&data, 2, 20, Metric::Manhattan)?;
/// assert_eq!(tree.len(), 4);
/// # Ok::<(), hamachi_core::TreeError>(())
/// ```
#[derive(Clone, Debug)]
pub struct BallTree {
    structure: TreeStructure,
    metric: Metric,
    /// Per-node centroids, `node_count × num_features`.
    centroids: Vec<f64>,
}

impl BallTree {
    /// Builds a Ball-tree over `data` interpreted as rows of `num_features`
    /// coordinates.
    ///
    /// # Errors
    /// Returns [`TreeError`] when the input is empty, zero-dimensional,
    /// ragged, contains non-finite coordinates, or `leaf_size` is zero.
    pub fn build(
        data: &[f64],
        num_features: usize,
        leaf_size: usize,
        metric: Metric,
    ) -> Result<Self, TreeError> {
        let structure = TreeStructure::new(data.to_vec(), num_features, leaf_size)?;
        let node_count = structure.node_count();
        let mut tree = Self {
            structure,
            metric,
            centroids: vec![0.0; node_count * num_features],
        };
        let n = tree.structure.len();
        tree.recursive_build(0, 0, n);
        Ok(tree)
    }

    /// The metric this tree was built under.
    #[must_use]
    pub fn metric(&self) -> Metric {
        self.metric
    }

    fn recursive_build(&mut self, i_node: usize, idx_start: usize, idx_end: usize) {
        self.init_node(i_node, idx_start, idx_end);
        if 2 * i_node + 1 >= self.structure.node_count() {
            self.structure.node_mut(i_node).is_leaf = true;
            return;
        }

        let n_mid = (idx_start + idx_end) / 2;
        let split_dim = self.structure.widest_spread_dim(idx_start, idx_end);
        self.structure.partition(idx_start, idx_end, n_mid, split_dim);
        self.recursive_build(2 * i_node + 1, idx_start, n_mid);
        self.recursive_build(2 * i_node + 2, n_mid, idx_end);
    }

    fn init_node(&mut self, i_node: usize, idx_start: usize, idx_end: usize) {
        let dim = self.structure.num_features();
        let offset = i_node * dim;
        let count = (idx_end - idx_start) as f64;

        for axis in 0..dim {
            self.centroids[offset + axis] = 0.0;
        }
        for &point in self.structure.points_in(idx_start, idx_end) {
            for (axis, &value) in self.structure.row(point).iter().enumerate() {
                self.centroids[offset + axis] += value;
            }
        }
        for axis in 0..dim {
            self.centroids[offset + axis] /= count;
        }

        let mut radius = 0.0_f64;
        for &point in self.structure.points_in(idx_start, idx_end) {
            let centroid = &self.centroids[offset..offset + dim];
            radius = radius.max(self.metric.dist(centroid, self.structure.row(point)));
        }

        let record = self.structure.node_mut(i_node);
        record.idx_start = idx_start;
        record.idx_end = idx_end;
        record.is_leaf = false;
        record.radius = radius;
    }

    fn centroid(&self, node: usize) -> &[f64] {
        let dim = self.structure.num_features();
        &self.centroids[node * dim..(node + 1) * dim]
    }

    /// True-distance lower bound from the ball of `node` to a point.
    fn min_dist_point(&self, node: usize, query: &[f64]) -> f64 {
        let gap = self.metric.dist(self.centroid(node), query) - self.structure.node(node).radius;
        gap.max(0.0)
    }

    fn knn_point(&self, query: &[f64], k: usize) -> Vec<(f64, usize)> {
        let mut nearest = NearestSet::new(k);
        self.knn_search(0, query, &mut nearest);
        nearest.into_entries()
    }

    fn knn_search(&self, node: usize, query: &[f64], nearest: &mut NearestSet) {
        if nearest.full() && self.min_dist_point(node, query) > nearest.bound() {
            return;
        }
        let record = self.structure.node(node);
        if record.is_leaf {
            for &point in self.structure.node_points(node) {
                nearest.consider(self.metric.dist(query, self.structure.row(point)), point);
            }
            return;
        }

        let left = 2 * node + 1;
        let right = left + 1;
        if self.min_dist_point(left, query) <= self.min_dist_point(right, query) {
            self.knn_search(left, query, nearest);
            self.knn_search(right, query, nearest);
        } else {
            self.knn_search(right, query, nearest);
            self.knn_search(left, query, nearest);
        }
    }
}

impl TreeGeometry for BallTree {
    type Aux = CentroidDistances;

    fn structure(&self) -> &TreeStructure {
        &self.structure
    }

    fn metric(&self) -> Metric {
        self.metric
    }

    fn build_aux(&self) -> Self::Aux {
        let node_count = self.structure.node_count();
        let mut values = vec![0.0; node_count * node_count];
        for a in 0..node_count {
            for b in (a + 1)..node_count {
                let distance = self.metric.dist(self.centroid(a), self.centroid(b));
                values[a * node_count + b] = distance;
                values[b * node_count + a] = distance;
            }
        }
        CentroidDistances { node_count, values }
    }

    fn knn_chunk(&self, first: usize, last: usize, k: usize) -> KnnBlock {
        let mut block = KnnBlock::with_capacity(k, last - first);
        for point in first..last {
            block.push_row(&self.knn_point(self.structure.row(point), k));
        }
        block
    }

    fn stored_core_distance(_metric: Metric, dist: f64) -> f64 {
        dist
    }

    fn output_weight(_metric: Metric, stored: f64) -> f64 {
        stored
    }

    fn leaf_pair_distance(&self, alpha: f64, left: usize, right: usize) -> f64 {
        self.metric
            .dist(self.structure.row(left), self.structure.row(right))
            * alpha
    }

    fn node_lower_bound(&self, aux: &Self::Aux, a: usize, b: usize) -> f64 {
        let gap = aux.between(a, b) - self.structure.node(a).radius - self.structure.node(b).radius;
        gap.max(0.0)
    }

    fn pruning_radius(&self, node: usize) -> f64 {
        self.structure.node(node).radius
    }

    fn parent_bound(&self, parent: usize, left_bound: f64, right_bound: f64) -> f64 {
        let parent_radius = self.structure.node(parent).radius;
        let left_radius = self.structure.node(2 * parent + 1).radius;
        let right_radius = self.structure.node(2 * parent + 2).radius;

        let outer = left_bound.max(right_bound);
        let through_children = (left_bound + 2.0 * (parent_radius - left_radius))
            .min(right_bound + 2.0 * (parent_radius - right_radius));
        // The composed term is only trusted when positive; radii are not
        // guaranteed monotone in depth.
        if through_children > 0.0 {
            outer.min(through_children)
        } else {
            outer
        }
    }
}

impl SpatialIndex for BallTree {
    fn len(&self) -> usize {
        self.structure.len()
    }

    fn num_features(&self) -> usize {
        self.structure.num_features()
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};
    use rstest::rstest;

    use super::BallTree;
    use crate::metric::Metric;
    use crate::tree::{SpatialIndex, TreeGeometry};

    fn random_points(n: usize, dim: usize, seed: u64) -> Vec<f64> {
        let mut rng = SmallRng::seed_from_u64(seed);
        (0..n * dim).map(|_| rng.gen_range(-10.0..10.0)).collect()
    }

    #[test]
    fn radius_covers_all_member_points() {
        let data = random_points(180, 3, 17);
        let tree = BallTree::build(&data, 3, 9, Metric::Euclidean).expect("tree must build");
        let structure = tree.structure();

        for node in 0..structure.node_count() {
            let record = structure.node(node);
            for &point in structure.node_points(node) {
                let distance = Metric::Euclidean.dist(tree.centroid(node), structure.row(point));
                assert!(
                    distance <= record.radius + 1e-9,
                    "point {point} outside ball {node}"
                );
            }
        }
    }

    #[rstest]
    #[case::euclidean(Metric::Euclidean)]
    #[case::manhattan(Metric::Manhattan)]
    #[case::chebyshev(Metric::Chebyshev)]
    fn knn_matches_brute_force(#[case] metric: Metric) {
        let dim = 2;
        let n = 110;
        let data = random_points(n, dim, 29);
        let tree = BallTree::build(&data, dim, 7, metric).expect("tree must build");

        let row = |i: usize| &data[i * dim..(i + 1) * dim];
        let block = tree.knn_chunk(0, n, 4);
        for query in 0..n {
            let mut expected: Vec<(f64, usize)> =
                (0..n).map(|j| (metric.dist(row(query), row(j)), j)).collect();
            expected.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
            expected.truncate(4);

            for (rank, &(distance, index)) in expected.iter().enumerate() {
                assert_eq!(block.row_indices(query)[rank], index);
                assert!((block.row_distances(query)[rank] - distance).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn centroid_distance_table_is_symmetric_with_zero_diagonal() {
        let data = random_points(64, 2, 41);
        let tree = BallTree::build(&data, 2, 4, Metric::Euclidean).expect("tree must build");
        let aux = tree.build_aux();
        let node_count = tree.structure().node_count();
        for a in 0..node_count {
            assert_eq!(aux.between(a, a), 0.0);
            for b in 0..node_count {
                assert_eq!(aux.between(a, b), aux.between(b, a));
            }
        }
    }

    #[test]
    fn node_lower_bound_never_exceeds_point_pair_distance() {
        let data = random_points(90, 3, 53);
        let tree = BallTree::build(&data, 3, 5, Metric::Euclidean).expect("tree must build");
        let structure = tree.structure();
        let aux = tree.build_aux();

        for a in 0..structure.node_count() {
            for b in 0..structure.node_count() {
                let bound = tree.node_lower_bound(&aux, a, b);
                for &p in structure.node_points(a) {
                    for &q in structure.node_points(b) {
                        let distance = Metric::Euclidean.dist(structure.row(p), structure.row(q));
                        assert!(bound <= distance + 1e-9);
                    }
                }
            }
        }
    }

    #[test]
    fn parent_bound_keeps_child_maximum_when_composed_term_is_negative() {
        // A parent whose radius is smaller than a child's can make the
        // composed term negative; the plain child maximum must win then.
        let data = random_points(50, 2, 67);
        let tree = BallTree::build(&data, 2, 4, Metric::Euclidean).expect("tree must build");
        let bound = tree.parent_bound(0, 3.0, 4.0);
        assert!(bound <= 4.0);
        assert!(bound > 0.0);
    }

    #[test]
    fn reports_len_and_dimensions() {
        let data = random_points(21, 5, 2);
        let tree = BallTree::build(&data, 5, 10, Metric::Chebyshev).expect("tree must build");
        assert_eq!(tree.len(), 21);
        assert_eq!(tree.num_features(), 5);
        assert_eq!(tree.metric(), Metric::Chebyshev);
    }
}
