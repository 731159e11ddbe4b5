//! Fixture generation for the Borůvka property suites.
//!
//! Fixtures are whole point clouds rather than edge lists: the engine under
//! test owns edge discovery, so the generator's job is to stress geometry —
//! small and large spreads, degenerate duplicate points, and every supported
//! metric.

use proptest::prelude::*;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::metric::Metric;

/// Smallest generated point count.
const MIN_POINTS: usize = 5;
/// Largest generated point count; the oracle is O(n²) per case.
const MAX_POINTS: usize = 40;

/// A generated clustering input.
#[derive(Clone, Debug)]
pub(super) struct PointCloud {
    pub(super) data: Vec<f64>,
    pub(super) dim: usize,
    pub(super) min_samples: usize,
    pub(super) metric: Metric,
    pub(super) seed: u64,
}

impl PointCloud {
    pub(super) fn len(&self) -> usize {
        self.data.len() / self.dim
    }
}

/// Generates point clouds across dimensions, metrics, and duplicate rates.
pub(super) fn point_cloud_strategy() -> impl Strategy<Value = PointCloud> {
    any::<u64>().prop_map(generate_cloud)
}

pub(super) fn generate_cloud(seed: u64) -> PointCloud {
    let mut rng = SmallRng::seed_from_u64(seed);
    let n = rng.gen_range(MIN_POINTS..=MAX_POINTS);
    let dim = rng.gen_range(1..=3);
    let min_samples = rng.gen_range(1..=5.min(n));
    let metric = match rng.gen_range(0..4) {
        0 => Metric::Euclidean,
        1 => Metric::Manhattan,
        2 => Metric::Chebyshev,
        _ => Metric::Minkowski { p: 3.0 },
    };

    let spread = if rng.gen_bool(0.5) { 1.0 } else { 100.0 };
    let mut data: Vec<f64> = Vec::with_capacity(n * dim);
    for point in 0..n {
        // Occasionally clone an earlier row so tie-breaking on coincident
        // points gets exercised.
        if point > 0 && rng.gen_bool(0.15) {
            let copy = rng.gen_range(0..point);
            for axis in 0..dim {
                data.push(data[copy * dim + axis]);
            }
        } else {
            for _ in 0..dim {
                data.push(rng.gen_range(-spread..spread));
            }
        }
    }

    PointCloud {
        data,
        dim,
        min_samples,
        metric,
        seed,
    }
}

/// Returns a seeded permutation of the cloud's rows together with the
/// permutation used, for the input-order invariance property.
pub(super) fn permuted(cloud: &PointCloud) -> (Vec<f64>, Vec<usize>) {
    let n = cloud.len();
    let mut rng = SmallRng::seed_from_u64(cloud.seed.wrapping_add(1));
    let mut order: Vec<usize> = (0..n).collect();
    for i in (1..n).rev() {
        let j = rng.gen_range(0..=i);
        order.swap(i, j);
    }

    let mut data = Vec::with_capacity(cloud.data.len());
    for &row in &order {
        data.extend_from_slice(&cloud.data[row * cloud.dim..(row + 1) * cloud.dim]);
    }
    (data, order)
}
