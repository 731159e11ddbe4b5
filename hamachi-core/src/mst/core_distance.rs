//! Core-distance initialisation for the spanning-tree driver.
//!
//! A bulk kNN pass computes each point's core distance (the distance to its
//! `min_samples`-th nearest neighbour, counting the point itself first). The
//! same neighbour rows then seed easy candidate edges: a point whose core
//! distance dominates a near neighbour's already knows a mutual-reachability
//! edge, and front-loading those edges saves whole sweeps.

use rayon::prelude::*;

use crate::{
    error::{BoruvkaError, Result},
    mst::CandidateSet,
    tree::{KnnBlock, TreeGeometry},
};

/// Below this point count the kNN pass always runs on one thread; the
/// fork-join overhead outweighs the work.
pub(crate) const PARALLEL_MIN_POINTS: usize = 16_384;

/// Computes stored-unit core distances for every point.
///
/// Returns the stored core distances (reduced units on the KD path, true
/// units on the Ball path) together with the raw kNN rows for seeding.
pub(crate) fn core_distances<T: TreeGeometry + Sync>(
    tree: &T,
    min_samples: usize,
    n_jobs: usize,
) -> Result<(Vec<f64>, KnnBlock)> {
    let n = tree.structure().len();
    let chunks = if n > PARALLEL_MIN_POINTS && n_jobs > 1 {
        n_jobs
    } else {
        1
    };
    let block = knn_in_chunks(tree, min_samples, chunks);

    let metric = tree.metric();
    let mut stored = Vec::with_capacity(n);
    for point in 0..n {
        let dist = block.row_distances(point)[min_samples - 1];
        if dist.is_nan() {
            return Err(BoruvkaError::NonFiniteCoreDistance { point });
        }
        stored.push(T::stored_core_distance(metric, dist));
    }
    Ok((stored, block))
}

/// Runs the bulk kNN query over `chunks` contiguous point ranges and
/// concatenates the results in input order.
///
/// The split affects scheduling only: each range writes a disjoint output
/// slice and the per-row results are independent, so any chunk count yields
/// bit-identical rows.
pub(crate) fn knn_in_chunks<T: TreeGeometry + Sync>(tree: &T, k: usize, chunks: usize) -> KnnBlock {
    let n = tree.structure().len();
    if chunks <= 1 {
        return tree.knn_chunk(0, n, k);
    }

    let span = n.div_ceil(chunks);
    let ranges: Vec<(usize, usize)> = (0..chunks)
        .map(|i| (i * span, ((i + 1) * span).min(n)))
        .filter(|(first, last)| first < last)
        .collect();

    let blocks: Vec<KnnBlock> = ranges
        .into_par_iter()
        .map(|(first, last)| tree.knn_chunk(first, last, k))
        .collect();

    let mut joined = KnnBlock::with_capacity(k, n);
    for block in blocks {
        joined.extend(block);
    }
    joined
}

/// Seeds one candidate edge per point from its neighbour row.
///
/// The scan takes the *first* neighbour whose core distance does not exceed
/// the query point's, then stops; a later neighbour tying on distance is
/// never preferred.
pub(crate) fn seed_candidates(
    block: &KnnBlock,
    core_distance: &[f64],
    candidates: &mut CandidateSet,
) {
    for point in 0..block.rows() {
        for &neighbor in block.row_indices(point) {
            if neighbor == point {
                continue;
            }
            if core_distance[neighbor] <= core_distance[point] {
                candidates.point[point] = point;
                candidates.neighbor[point] = neighbor;
                candidates.distance[point] = core_distance[point];
                break;
            }
        }
    }
}
