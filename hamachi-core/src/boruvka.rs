//! Entry point for running the spanning-tree engine.

use crate::{
    error::{BoruvkaError, Result},
    metric::Metric,
    mst::{MstDriver, SpanningTree},
    tree::{BallTree, KdTree, SpatialIndex},
};

/// A validated engine configuration; see [`crate::BoruvkaBuilder`].
///
/// The engine computes the minimum spanning tree of the mutual-reachability
/// graph over the points of a spatial tree: edge weights are
/// `max(d(p, q) / alpha, core(p), core(q))` where `core(p)` is the distance
/// from `p` to its `min_samples`-th nearest neighbour (the point itself
/// counts first).
///
/// # Examples
/// ```
/// use hamachi_core::{BoruvkaBuilder, KdTree, Metric};
///
/// let data = vec![0.0, 0.0, 3.0, 4.0];
/// let tree = KdTree::build(&data, 2, 20, Metric::Euclidean)?;
/// let engine = BoruvkaBuilder::new().with_min_samples(1).build()?;
/// let mst = engine.spanning_tree(&tree)?;
/// assert_eq!(mst.len(), 1);
/// assert_eq!(mst.edges()[0].weight(), 5.0);
/// # Ok::<(), hamachi_core::BoruvkaError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Boruvka {
    min_samples: usize,
    alpha: f64,
    approx_min_span_tree: bool,
    leaf_size: usize,
    n_jobs: usize,
    metric: Metric,
}

impl Boruvka {
    pub(crate) fn new(
        min_samples: usize,
        alpha: f64,
        approx_min_span_tree: bool,
        leaf_size: usize,
        n_jobs: usize,
        metric: Metric,
    ) -> Self {
        Self {
            min_samples,
            alpha,
            approx_min_span_tree,
            leaf_size,
            n_jobs,
            metric,
        }
    }

    /// Returns the configured neighbour count.
    #[must_use]
    pub fn min_samples(&self) -> usize {
        self.min_samples
    }

    /// Returns the configured `alpha`.
    #[must_use]
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Returns `true` when approximate mode is enabled.
    #[must_use]
    pub fn approx_min_span_tree(&self) -> bool {
        self.approx_min_span_tree
    }

    /// Returns the advisory leaf size used by the convenience constructors.
    #[must_use]
    pub fn leaf_size(&self) -> usize {
        self.leaf_size
    }

    /// Returns the worker count for the bulk core-distance query.
    #[must_use]
    pub fn n_jobs(&self) -> usize {
        self.n_jobs
    }

    /// Returns the configured metric.
    #[must_use]
    pub fn metric(&self) -> Metric {
        self.metric
    }

    /// Computes the mutual-reachability minimum spanning tree over the
    /// points of `tree`.
    ///
    /// The returned edges are in insertion order, endpoints are original
    /// point ids, and every weight is a true mutual-reachability distance. A
    /// single-point tree yields an empty edge list.
    ///
    /// # Errors
    /// Returns [`BoruvkaError::MetricMismatch`] when the tree was built under
    /// a different metric, [`BoruvkaError::MinSamplesTooLarge`] when
    /// `min_samples` exceeds the point count, and the numeric-degeneracy or
    /// stalled-sweep errors described on [`BoruvkaError`] when the
    /// computation cannot make sound progress.
    #[tracing::instrument(level = "debug", skip(self, tree), fields(points = tree.len()))]
    pub fn spanning_tree<T: SpatialIndex>(&self, tree: &T) -> Result<SpanningTree> {
        if tree.metric() != self.metric {
            return Err(BoruvkaError::MetricMismatch {
                tree: tree.metric(),
                configured: self.metric,
            });
        }
        let points = tree.len();
        if points > 1 && self.min_samples > points {
            return Err(BoruvkaError::MinSamplesTooLarge {
                min_samples: self.min_samples,
                points,
            });
        }

        MstDriver::new(
            tree,
            self.alpha,
            self.approx_min_span_tree,
            self.min_samples,
            self.n_jobs,
        )
        .run()
    }

    /// Builds a [`KdTree`] over `data` with the configured leaf size and
    /// metric, then computes the spanning tree.
    ///
    /// # Errors
    /// Returns tree-construction failures as [`BoruvkaError::Tree`] plus
    /// everything [`Boruvka::spanning_tree`] reports.
    pub fn spanning_tree_kd(&self, data: &[f64], num_features: usize) -> Result<SpanningTree> {
        let tree = KdTree::build(data, num_features, self.leaf_size, self.metric)?;
        self.spanning_tree(&tree)
    }

    /// Builds a [`BallTree`] over `data` with the configured leaf size and
    /// metric, then computes the spanning tree.
    ///
    /// # Errors
    /// Returns tree-construction failures as [`BoruvkaError::Tree`] plus
    /// everything [`Boruvka::spanning_tree`] reports.
    pub fn spanning_tree_ball(&self, data: &[f64], num_features: usize) -> Result<SpanningTree> {
        let tree = BallTree::build(data, num_features, self.leaf_size, self.metric)?;
        self.spanning_tree(&tree)
    }
}
