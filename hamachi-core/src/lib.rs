//! Hamachi core library.
//!
//! A dual-tree Borůvka engine that computes the minimum spanning tree of the
//! mutual-reachability graph over a spatial index, the expensive middle step
//! of HDBSCAN-style single-linkage clustering. The engine runs O(log N)
//! global sweeps; within a sweep a pruned dual-tree traversal finds, for
//! every current component, its cheapest edge to another component.
//!
//! The KD-tree path works in reduced distance units (for instance squared
//! Euclidean) throughout and converts to true distances only when an edge is
//! committed. The Ball-tree path stays in true units and prunes node pairs
//! with precomputed pairwise centroid distances. Both paths share one driver
//! and one union-find; the tree kind is resolved at compile time.
//!
//! Equal-distance neighbour ties are always resolved towards the smaller
//! point id, so results are reproducible run to run and under any `n_jobs`
//! setting.

mod boruvka;
mod builder;
mod error;
mod metric;
mod mst;
mod tree;

pub use crate::{
    boruvka::Boruvka,
    builder::BoruvkaBuilder,
    error::{BoruvkaError, BoruvkaErrorCode, Result, TreeError, TreeErrorCode},
    metric::Metric,
    mst::{MstEdge, SpanningTree, mutual_reachability},
    tree::{BallTree, KdTree, SpatialIndex},
};
