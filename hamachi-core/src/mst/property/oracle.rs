//! Brute-force Prim oracle for mutual-reachability MST verification.
//!
//! A trusted O(n²) implementation: core distances by full sort, then Prim's
//! algorithm over the dense mutual-reachability graph. Any minimum spanning
//! tree of a graph has the same multiset of edge weights, so comparing
//! sorted weights is valid even when ties make the edge set ambiguous.

use crate::metric::Metric;
use crate::mst::mutual_reachability;

pub(super) struct OracleMst {
    pub(super) sorted_weights: Vec<f64>,
    pub(super) total_weight: f64,
}

/// Core distance of every point by exhaustive sort, ties broken by index.
pub(super) fn brute_force_core_distances(
    data: &[f64],
    dim: usize,
    metric: Metric,
    min_samples: usize,
) -> Vec<f64> {
    let n = data.len() / dim;
    let row = |i: usize| &data[i * dim..(i + 1) * dim];
    (0..n)
        .map(|i| {
            let mut dists: Vec<(f64, usize)> =
                (0..n).map(|j| (metric.dist(row(i), row(j)), j)).collect();
            dists.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
            dists[min_samples - 1].0
        })
        .collect()
}

/// Mutual-reachability MST by Prim's algorithm over the dense graph.
pub(super) fn brute_force_mst(
    data: &[f64],
    dim: usize,
    metric: Metric,
    min_samples: usize,
) -> OracleMst {
    let n = data.len() / dim;
    let row = |i: usize| &data[i * dim..(i + 1) * dim];
    let core = brute_force_core_distances(data, dim, metric, min_samples);
    let weight = |i: usize, j: usize| {
        mutual_reachability(metric.dist(row(i), row(j)), core[i], core[j], 1.0)
    };

    let mut in_tree = vec![false; n];
    let mut best = vec![f64::INFINITY; n];
    in_tree[0] = true;
    for j in 1..n {
        best[j] = weight(0, j);
    }

    let mut weights = Vec::with_capacity(n - 1);
    for _ in 1..n {
        let mut next = usize::MAX;
        for j in 0..n {
            if !in_tree[j] && (next == usize::MAX || best[j] < best[next]) {
                next = j;
            }
        }
        weights.push(best[next]);
        in_tree[next] = true;
        for j in 0..n {
            if !in_tree[j] {
                best[j] = best[j].min(weight(next, j));
            }
        }
    }

    let total_weight = weights.iter().sum();
    weights.sort_by(f64::total_cmp);
    OracleMst {
        sorted_weights: weights,
        total_weight,
    }
}

#[cfg(test)]
mod tests {
    use super::brute_force_mst;
    use crate::metric::Metric;

    #[test]
    fn oracle_handles_the_two_point_case() {
        let result = brute_force_mst(&[0.0, 0.0, 3.0, 4.0], 2, Metric::Euclidean, 1);
        assert_eq!(result.sorted_weights, vec![5.0]);
        assert_eq!(result.total_weight, 5.0);
    }

    #[test]
    fn oracle_uses_core_distances_on_the_line() {
        // x = 0..5, min_samples = 2: every mutual-reachability weight between
        // consecutive points is exactly 1.
        let data: Vec<f64> = (0..5).map(|i| i as f64).collect();
        let result = brute_force_mst(&data, 1, Metric::Euclidean, 2);
        assert_eq!(result.sorted_weights, vec![1.0; 4]);
    }
}
