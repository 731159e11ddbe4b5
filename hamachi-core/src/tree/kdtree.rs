//! KD-tree over dense row-major data.
//!
//! Nodes carry axis-aligned bounding boxes. The engine works in reduced
//! distance units end to end on this tree: node-to-node lower bounds, core
//! distances, and candidate weights all stay reduced, converting to true
//! distance only when an edge is emitted.

use crate::{
    error::TreeError,
    metric::Metric,
    tree::{KnnBlock, NearestSet, SpatialIndex, TreeGeometry, TreeStructure},
};

/// A KD-tree built by recursive median splits along the widest axis.
///
/// # Examples
/// ```
/// use hamachi_core::{KdTree, Metric, SpatialIndex};
///
/// let data = vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 5.0, 5.0];
/// let tree = KdTree::build(&data, 2, 20, Metric::Euclidean)?;
/// assert_eq!(tree.len(), 4);
/// assert_eq!(tree.num_features(), 2);
/// # Ok::<(), hamachi_core::TreeError>(())
/// ```
#[derive(Clone, Debug)]
pub struct KdTree {
    structure: TreeStructure,
    metric: Metric,
    /// Per-node per-axis lower bounds, `node_count × num_features`.
    bounds_lo: Vec<f64>,
    /// Per-node per-axis upper bounds, `node_count × num_features`.
    bounds_hi: Vec<f64>,
}

impl KdTree {
    /// Builds a KD-tree over `data` interpreted as rows of `num_features`
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
            bounds_lo: vec![f64::INFINITY; node_count * num_features],
            bounds_hi: vec![f64::NEG_INFINITY; node_count * num_features],
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
        for &point in self.structure.points_in(idx_start, idx_end) {
            for (axis, &value) in self.structure.row(point).iter().enumerate() {
                let lo = &mut self.bounds_lo[offset + axis];
                *lo = lo.min(value);
                let hi = &mut self.bounds_hi[offset + axis];
                *hi = hi.max(value);
            }
        }

        let half_widths = (0..dim)
            .map(|axis| 0.5 * (self.bounds_hi[offset + axis] - self.bounds_lo[offset + axis]));
        let radius = self.metric.rdist_to_dist(self.metric.reduce(half_widths));

        let record = self.structure.node_mut(i_node);
        record.idx_start = idx_start;
        record.idx_end = idx_end;
        record.is_leaf = false;
        record.radius = radius;
    }

    fn node_lo(&self, node: usize) -> &[f64] {
        let dim = self.structure.num_features();
        &self.bounds_lo[node * dim..(node + 1) * dim]
    }

    fn node_hi(&self, node: usize) -> &[f64] {
        let dim = self.structure.num_features();
        &self.bounds_hi[node * dim..(node + 1) * dim]
    }

    /// Reduced-distance lower bound between the boxes of nodes `a` and `b`.
    ///
    /// Per axis, with boxes `[lo_a, hi_a]` and `[lo_b, hi_b]`, the offsets
    /// `d1 = lo_a − hi_b` and `d2 = lo_b − hi_a` contribute
    /// `0.5·((d1 + |d1|) + (d2 + |d2|))`: the positive box gap, or zero when
    /// the projections overlap.
    fn min_rdist_nodes(&self, a: usize, b: usize) -> f64 {
        let (lo_a, hi_a) = (self.node_lo(a), self.node_hi(a));
        let (lo_b, hi_b) = (self.node_lo(b), self.node_hi(b));
        self.metric.reduce((0..lo_a.len()).map(|axis| {
            let d1 = lo_a[axis] - hi_b[axis];
            let d2 = lo_b[axis] - hi_a[axis];
            0.5 * ((d1 + d1.abs()) + (d2 + d2.abs()))
        }))
    }

    /// Reduced-distance lower bound from the box of `node` to a point.
    fn min_rdist_point(&self, node: usize, query: &[f64]) -> f64 {
        let (lo, hi) = (self.node_lo(node), self.node_hi(node));
        self.metric.reduce(query.iter().enumerate().map(|(axis, &value)| {
            let d1 = lo[axis] - value;
            let d2 = value - hi[axis];
            0.5 * ((d1 + d1.abs()) + (d2 + d2.abs()))
        }))
    }

    fn knn_point(&self, query: &[f64], k: usize) -> Vec<(f64, usize)> {
        let mut nearest = NearestSet::new(k);
        self.knn_search(0, query, &mut nearest);
        nearest.into_entries()
    }

    fn knn_search(&self, node: usize, query: &[f64], nearest: &mut NearestSet) {
        // Descend on equality so equal-distance neighbours still compete on
        // index order.
        if nearest.full() && self.min_rdist_point(node, query) > nearest.bound() {
            return;
        }
        let record = self.structure.node(node);
        if record.is_leaf {
            for &point in self.structure.node_points(node) {
                nearest.consider(self.metric.rdist(query, self.structure.row(point)), point);
            }
            return;
        }

        let left = 2 * node + 1;
        let right = left + 1;
        if self.min_rdist_point(left, query) <= self.min_rdist_point(right, query) {
            self.knn_search(left, query, nearest);
            self.knn_search(right, query, nearest);
        } else {
            self.knn_search(right, query, nearest);
            self.knn_search(left, query, nearest);
        }
    }
}

impl TreeGeometry for KdTree {
    type Aux = ();

    fn structure(&self) -> &TreeStructure {
        &self.structure
    }

    fn metric(&self) -> Metric {
        self.metric
    }

    fn build_aux(&self) -> Self::Aux {}

    fn knn_chunk(&self, first: usize, last: usize, k: usize) -> KnnBlock {
        let mut block = KnnBlock::with_capacity(k, last - first);
        for point in first..last {
            let mut row = self.knn_point(self.structure.row(point), k);
            for entry in &mut row {
                entry.0 = self.metric.rdist_to_dist(entry.0);
            }
            block.push_row(&row);
        }
        block
    }

    fn stored_core_distance(metric: Metric, dist: f64) -> f64 {
        metric.dist_to_rdist(dist)
    }

    fn output_weight(metric: Metric, stored: f64) -> f64 {
        metric.rdist_to_dist(stored)
    }

    fn leaf_pair_distance(&self, _alpha: f64, left: usize, right: usize) -> f64 {
        self.metric
            .rdist(self.structure.row(left), self.structure.row(right))
    }

    fn node_lower_bound(&self, _aux: &Self::Aux, a: usize, b: usize) -> f64 {
        self.min_rdist_nodes(a, b)
    }

    fn pruning_radius(&self, node: usize) -> f64 {
        self.metric.dist_to_rdist(self.structure.node(node).radius)
    }

    fn parent_bound(&self, _parent: usize, left_bound: f64, right_bound: f64) -> f64 {
        left_bound.max(right_bound)
    }
}

impl SpatialIndex for KdTree {
    fn len(&self) -> usize {
        self.structure.len()
    }

    fn num_features(&self) -> usize {
        self.structure.num_features()
    }
}
