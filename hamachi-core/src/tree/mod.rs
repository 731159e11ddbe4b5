//! Spatial trees consumed by the spanning-tree engine.
//!
//! Both tree kinds share the same flat layout: node 0 is the root, the
//! children of inner node `i` are `2i + 1` and `2i + 2`, and every node owns
//! the contiguous permutation slice `idx_array[idx_start..idx_end]`. Point
//! data stays in input order; only the permutation is rearranged during
//! construction. The layout is sized up front from the point count and leaf
//! size, so a leaf may hold up to twice the requested leaf size (`leaf_size`
//! is advisory).

mod balltree;
mod kdtree;

pub use self::balltree::BallTree;
pub use self::kdtree::KdTree;

use crate::error::TreeError;

/// Per-node layout record.
#[derive(Clone, Copy, Debug)]
pub(crate) struct NodeRecord {
    pub(crate) idx_start: usize,
    pub(crate) idx_end: usize,
    pub(crate) is_leaf: bool,
    /// Covering radius in true-distance units.
    pub(crate) radius: f64,
}

/// Flat binary-tree skeleton shared by the KD and Ball trees.
#[derive(Clone, Debug)]
pub(crate) struct TreeStructure {
    data: Vec<f64>,
    num_features: usize,
    idx_array: Vec<usize>,
    nodes: Vec<NodeRecord>,
}

impl TreeStructure {
    /// Validates the flat input and allocates the node layout.
    ///
    /// The node count follows the usual complete-tree sizing: the number of
    /// levels is `1 + ⌊log2(max(1, (n − 1) / leaf_size))⌋` and every slot of
    /// the implied complete binary tree exists.
    pub(crate) fn new(
        data: Vec<f64>,
        num_features: usize,
        leaf_size: usize,
    ) -> Result<Self, TreeError> {
        if leaf_size == 0 {
            return Err(TreeError::InvalidLeafSize);
        }
        if num_features == 0 {
            return Err(TreeError::ZeroDimension);
        }
        if data.is_empty() {
            return Err(TreeError::EmptyData);
        }
        if data.len() % num_features != 0 {
            return Err(TreeError::RaggedData {
                len: data.len(),
                num_features,
            });
        }
        let n = data.len() / num_features;
        if let Some(position) = data.iter().position(|value| !value.is_finite()) {
            return Err(TreeError::NonFiniteCoordinate {
                row: position / num_features,
            });
        }

        let n_levels = ((n - 1) / leaf_size).max(1).ilog2() as usize + 1;
        let n_nodes = (1_usize << n_levels) - 1;
        let nodes = vec![
            NodeRecord {
                idx_start: 0,
                idx_end: 0,
                is_leaf: false,
                radius: 0.0,
            };
            n_nodes
        ];

        Ok(Self {
            data,
            num_features,
            idx_array: (0..n).collect(),
            nodes,
        })
    }

    #[must_use]
    pub(crate) fn len(&self) -> usize {
        self.data.len() / self.num_features
    }

    #[must_use]
    pub(crate) fn num_features(&self) -> usize {
        self.num_features
    }

    #[must_use]
    pub(crate) fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub(crate) fn node(&self, id: usize) -> NodeRecord {
        self.nodes[id]
    }

    pub(crate) fn node_mut(&mut self, id: usize) -> &mut NodeRecord {
        &mut self.nodes[id]
    }

    #[must_use]
    pub(crate) fn row(&self, point: usize) -> &[f64] {
        &self.data[point * self.num_features..(point + 1) * self.num_features]
    }

    /// Point ids owned by `node`, in permutation order.
    #[must_use]
    pub(crate) fn node_points(&self, id: usize) -> &[usize] {
        let record = self.nodes[id];
        &self.idx_array[record.idx_start..record.idx_end]
    }

    /// Permutation slice `idx_array[idx_start..idx_end]`, for use during
    /// construction before the owning node record is written.
    #[must_use]
    pub(crate) fn points_in(&self, idx_start: usize, idx_end: usize) -> &[usize] {
        &self.idx_array[idx_start..idx_end]
    }

    /// Returns the axis with the widest coordinate spread over the slice
    /// `idx_array[idx_start..idx_end]`.
    pub(crate) fn widest_spread_dim(&self, idx_start: usize, idx_end: usize) -> usize {
        let mut best_dim = 0;
        let mut best_spread = f64::NEG_INFINITY;
        for dim in 0..self.num_features {
            let mut lo = f64::INFINITY;
            let mut hi = f64::NEG_INFINITY;
            for &point in &self.idx_array[idx_start..idx_end] {
                let value = self.row(point)[dim];
                lo = lo.min(value);
                hi = hi.max(value);
            }
            let spread = hi - lo;
            if spread > best_spread {
                best_spread = spread;
                best_dim = dim;
            }
        }
        best_dim
    }

    /// Partitions `idx_array[idx_start..idx_end]` so the element at `n_mid`
    /// is in its sorted-by-coordinate position along `split_dim`.
    pub(crate) fn partition(
        &mut self,
        idx_start: usize,
        idx_end: usize,
        n_mid: usize,
        split_dim: usize,
    ) {
        let stride = self.num_features;
        let data = &self.data;
        self.idx_array[idx_start..idx_end].select_nth_unstable_by(n_mid - idx_start, |&a, &b| {
            data[a * stride + split_dim].total_cmp(&data[b * stride + split_dim])
        });
    }
}

/// Row-major batch of kNN results: `rows × k` distances (true units) and
/// neighbour indices, each row sorted by `(distance, index)`.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct KnnBlock {
    k: usize,
    distances: Vec<f64>,
    indices: Vec<usize>,
}

impl KnnBlock {
    pub(crate) fn with_capacity(k: usize, rows: usize) -> Self {
        Self {
            k,
            distances: Vec::with_capacity(k * rows),
            indices: Vec::with_capacity(k * rows),
        }
    }

    pub(crate) fn push_row(&mut self, entries: &[(f64, usize)]) {
        debug_assert_eq!(entries.len(), self.k);
        for &(distance, index) in entries {
            self.distances.push(distance);
            self.indices.push(index);
        }
    }

    /// Appends another block with the same width, preserving row order.
    pub(crate) fn extend(&mut self, other: KnnBlock) {
        debug_assert_eq!(self.k, other.k);
        self.distances.extend(other.distances);
        self.indices.extend(other.indices);
    }

    #[must_use]
    pub(crate) fn rows(&self) -> usize {
        self.distances.len() / self.k
    }

    #[must_use]
    pub(crate) fn row_distances(&self, row: usize) -> &[f64] {
        &self.distances[row * self.k..(row + 1) * self.k]
    }

    #[must_use]
    pub(crate) fn row_indices(&self, row: usize) -> &[usize] {
        &self.indices[row * self.k..(row + 1) * self.k]
    }
}

/// Bounded accumulator for the k nearest neighbours of one query point.
///
/// Entries are kept sorted by `(distance, index)` so equal-distance ties are
/// always resolved towards the smaller point id. Distances are in whatever
/// units the caller prunes with (reduced for the KD query, true for Ball).
pub(crate) struct NearestSet {
    k: usize,
    entries: Vec<(f64, usize)>,
}

impl NearestSet {
    pub(crate) fn new(k: usize) -> Self {
        Self {
            k,
            entries: Vec::with_capacity(k + 1),
        }
    }

    #[must_use]
    pub(crate) fn full(&self) -> bool {
        self.entries.len() == self.k
    }

    /// Current pruning bound: the k-th distance, or +∞ while underfull.
    #[must_use]
    pub(crate) fn bound(&self) -> f64 {
        if self.full() {
            self.entries[self.k - 1].0
        } else {
            f64::INFINITY
        }
    }

    pub(crate) fn consider(&mut self, distance: f64, index: usize) {
        let position = self.entries.partition_point(|&(d, i)| match d.total_cmp(&distance) {
            std::cmp::Ordering::Less => true,
            std::cmp::Ordering::Equal => i < index,
            std::cmp::Ordering::Greater => false,
        });
        if position == self.k {
            return;
        }
        self.entries.insert(position, (distance, index));
        self.entries.truncate(self.k);
    }

    #[must_use]
    pub(crate) fn into_entries(self) -> Vec<(f64, usize)> {
        self.entries
    }
}

mod geometry {
    use super::{KnnBlock, TreeStructure};
    use crate::metric::Metric;

    /// Tree-kind specialisation points consumed by the spanning-tree engine.
    ///
    /// The engine is generic over this trait so the KD and Ball variants
    /// monomorphise into separate drivers; no tree-kind branch survives in
    /// the traversal.
    pub(crate) trait TreeGeometry {
        /// Per-run auxiliary state (pairwise centroid distances for the Ball
        /// tree; nothing for the KD tree).
        type Aux;

        fn structure(&self) -> &TreeStructure;

        fn metric(&self) -> Metric;

        /// Builds the auxiliary state consumed by [`Self::node_lower_bound`].
        fn build_aux(&self) -> Self::Aux;

        /// kNN rows for the contiguous query points `first..last`.
        fn knn_chunk(&self, first: usize, last: usize, k: usize) -> KnnBlock;

        /// Converts a true kNN distance into the units core distances are
        /// stored in (reduced for KD, true for Ball).
        fn stored_core_distance(metric: Metric, dist: f64) -> f64;

        /// Converts a stored candidate weight into true units for emission.
        fn output_weight(metric: Metric, stored: f64) -> f64;

        /// Pairwise distance used by the leaf-vs-leaf pass: reduced distance
        /// for KD, `alpha`-scaled true distance for Ball.
        fn leaf_pair_distance(&self, alpha: f64, left: usize, right: usize) -> f64;

        /// Lower bound on the distance between any point of `a` and any
        /// point of `b`, in the same units as the stored bounds.
        fn node_lower_bound(&self, aux: &Self::Aux, a: usize, b: usize) -> f64;

        /// Node radius in stored-bound units, used when lowering a leaf's
        /// pruning bound.
        fn pruning_radius(&self, node: usize) -> f64;

        /// Composes a parent's pruning bound from its children's bounds.
        fn parent_bound(&self, parent: usize, left_bound: f64, right_bound: f64) -> f64;
    }
}

pub(crate) use geometry::TreeGeometry;

/// Spatial indexes the engine can drive.
///
/// Sealed: implemented by [`KdTree`] and [`BallTree`] only, because the
/// engine's pruning correctness depends on invariants the tree builders
/// establish.
pub trait SpatialIndex: TreeGeometry + Sync {
    /// Number of indexed points.
    fn len(&self) -> usize;

    /// Returns `true` when the index holds no points. Tree construction
    /// rejects empty inputs, so this is always `false`; provided for API
    /// completeness.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Dimensionality of the indexed points.
    fn num_features(&self) -> usize;
}
