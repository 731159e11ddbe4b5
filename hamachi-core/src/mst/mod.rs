//! Dual-tree Borůvka construction of the mutual-reachability minimum
//! spanning tree.
//!
//! The driver owns every piece of mutable state (union-find, component
//! labels, candidate edges, pruning bounds, the growing edge list) and runs
//! repeated sweeps: one pruned dual-tree traversal to find each component's
//! best outgoing edge, then a drain that commits those edges, merges
//! components, relabels, and resets bounds. A tree over N points completes in
//! O(log N) sweeps because every sweep at least halves the component count —
//! unless pruning state goes stale, which exact mode treats as fatal and
//! approximate mode trades for progress.

mod bounds;
mod components;
mod core_distance;
mod traversal;
mod union_find;

#[cfg(test)]
mod property;

use crate::{
    error::{BoruvkaError, Result},
    metric::Metric,
    mst::{bounds::BoundsState, components::ComponentMap, union_find::UnionFind},
    tree::TreeGeometry,
};

/// Sentinel for an unset candidate endpoint.
pub(crate) const NO_POINT: usize = usize::MAX;

/// Mutual-reachability distance between two points at distance `distance`
/// with the given core distances: `max(distance / alpha, core_left,
/// core_right)`.
///
/// # Examples
/// ```
/// use hamachi_core::mutual_reachability;
///
/// assert_eq!(mutual_reachability(2.0, 3.0, 1.0, 1.0), 3.0);
/// assert_eq!(mutual_reachability(4.0, 3.0, 1.0, 2.0), 3.0);
/// ```
#[must_use]
pub fn mutual_reachability(distance: f64, core_left: f64, core_right: f64, alpha: f64) -> f64 {
    (distance / alpha).max(core_left).max(core_right)
}

/// A single spanning-tree edge. Endpoints are original point ids; the weight
/// is a true mutual-reachability distance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MstEdge {
    source: usize,
    sink: usize,
    weight: f64,
}

impl MstEdge {
    /// Returns the source point id.
    #[must_use]
    #[rustfmt::skip]
    pub fn source(&self) -> usize { self.source }

    /// Returns the sink point id.
    #[must_use]
    #[rustfmt::skip]
    pub fn sink(&self) -> usize { self.sink }

    /// Returns the mutual-reachability weight in true distance units.
    #[must_use]
    #[rustfmt::skip]
    pub fn weight(&self) -> f64 { self.weight }
}

/// The completed minimum spanning tree: `N − 1` edges in insertion order.
#[derive(Clone, Debug, PartialEq)]
pub struct SpanningTree {
    edges: Vec<MstEdge>,
}

impl SpanningTree {
    /// Returns the edges in the order they were committed.
    #[must_use]
    #[rustfmt::skip]
    pub fn edges(&self) -> &[MstEdge] { &self.edges }

    /// Returns the number of edges.
    #[must_use]
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// Returns `true` for the single-point tree, which has no edges.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Sum of all edge weights.
    #[must_use]
    pub fn total_weight(&self) -> f64 {
        self.edges.iter().map(MstEdge::weight).sum()
    }

    /// Consumes the tree, yielding the edge list.
    #[must_use]
    pub fn into_edges(self) -> Vec<MstEdge> {
        self.edges
    }
}

/// Per-component best-edge triple for the current sweep, dense over point
/// ids so a component root indexes in O(1).
#[derive(Clone, Debug)]
pub(crate) struct CandidateSet {
    pub(crate) point: Vec<usize>,
    pub(crate) neighbor: Vec<usize>,
    pub(crate) distance: Vec<f64>,
}

impl CandidateSet {
    pub(crate) fn new(n: usize) -> Self {
        Self {
            point: vec![NO_POINT; n],
            neighbor: vec![NO_POINT; n],
            distance: vec![f64::INFINITY; n],
        }
    }

    /// Clears every slot of component `c`'s triple.
    pub(crate) fn clear(&mut self, c: usize) {
        self.point[c] = NO_POINT;
        self.neighbor[c] = NO_POINT;
        self.distance[c] = f64::INFINITY;
    }
}

/// One spanning-tree computation over a borrowed tree.
///
/// All arrays are sized at construction and reused across sweeps; nothing is
/// reallocated until the driver completes and yields its edge list.
pub(crate) struct MstDriver<'t, T: TreeGeometry> {
    tree: &'t T,
    aux: T::Aux,
    metric: Metric,
    alpha: f64,
    approx_min_span_tree: bool,
    min_samples: usize,
    n_jobs: usize,
    core_distance: Vec<f64>,
    union_find: UnionFind,
    components: ComponentMap,
    candidates: CandidateSet,
    bounds: BoundsState,
    edges: Vec<MstEdge>,
    /// Component count after the previous drain; `usize::MAX` before any.
    last_component_count: usize,
}

impl<'t, T: TreeGeometry + Sync> MstDriver<'t, T> {
    pub(crate) fn new(
        tree: &'t T,
        alpha: f64,
        approx_min_span_tree: bool,
        min_samples: usize,
        n_jobs: usize,
    ) -> Self {
        let structure = tree.structure();
        let points = structure.len();
        let nodes = structure.node_count();
        Self {
            tree,
            aux: tree.build_aux(),
            metric: tree.metric(),
            alpha,
            approx_min_span_tree,
            min_samples,
            n_jobs,
            core_distance: Vec::new(),
            union_find: UnionFind::new(points),
            components: ComponentMap::new(points, nodes),
            candidates: CandidateSet::new(points),
            bounds: BoundsState::new(nodes),
            edges: Vec::with_capacity(points.saturating_sub(1)),
            last_component_count: usize::MAX,
        }
    }

    /// Runs sweeps until one component remains, consuming the driver.
    pub(crate) fn run(mut self) -> Result<SpanningTree> {
        let points = self.tree.structure().len();
        if points == 1 {
            return Ok(SpanningTree { edges: Vec::new() });
        }

        self.initialise()?;
        let mut components = self.update_components()?;
        tracing::debug!(
            components,
            edges = self.edges.len(),
            "seeded initial candidate edges"
        );

        let mut sweep = 0_usize;
        while components > 1 {
            sweep += 1;
            self.traverse(0, 0);
            let merged = self.update_components()?;
            tracing::debug!(
                sweep,
                components = merged,
                edges = self.edges.len(),
                "completed sweep"
            );
            if merged == components && !self.approx_min_span_tree {
                return Err(BoruvkaError::StalledSweep { components: merged });
            }
            components = merged;
        }

        Ok(SpanningTree { edges: self.edges })
    }

    /// Computes core distances and seeds the per-point candidate edges.
    fn initialise(&mut self) -> Result<()> {
        let (stored, block) =
            core_distance::core_distances(self.tree, self.min_samples, self.n_jobs)?;
        self.core_distance = stored;
        core_distance::seed_candidates(&block, &self.core_distance, &mut self.candidates);
        Ok(())
    }

    /// Drains the sweep's candidates into edges, merges components, and
    /// relabels. Returns the remaining component count.
    fn update_components(&mut self) -> Result<usize> {
        let points = self.tree.structure().len();
        let previous = self.last_component_count;
        let roots = self.union_find.components();
        let mut complete = false;

        for &component in &roots {
            let source = self.candidates.point[component];
            let sink = self.candidates.neighbor[component];
            if source == NO_POINT || sink == NO_POINT {
                continue;
            }

            let source_root = self.union_find.find(source);
            let sink_root = self.union_find.find(sink);
            if source_root == sink_root {
                // Already joined earlier in this drain.
                self.candidates.clear(component);
                continue;
            }

            let weight = T::output_weight(self.metric, self.candidates.distance[component]);
            if weight.is_nan() {
                return Err(BoruvkaError::NonFiniteEdgeWeight { src: source, sink });
            }
            self.edges.push(MstEdge {
                source,
                sink,
                weight,
            });
            self.candidates.distance[component] = f64::INFINITY;
            self.union_find.union(source_root, sink_root);
            if self.edges.len() == points - 1 {
                complete = true;
                break;
            }
        }

        self.components
            .update(self.tree.structure(), &mut self.union_find);
        let count = self.union_find.component_count();

        if !complete && count > 1 {
            if self.approx_min_span_tree && count == previous {
                tracing::warn!(
                    components = count,
                    "sweep merged nothing; keeping stale bounds to force progress \
                     (approximate mode)"
                );
            } else {
                self.bounds.reset();
            }
        }
        self.last_component_count = count;
        Ok(count)
    }
}
