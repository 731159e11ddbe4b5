//! Shared data generation for the Hamachi benchmarks.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Parameters for seeded synthetic point clouds.
#[derive(Clone, Copy, Debug)]
pub struct SyntheticConfig {
    /// Number of points to generate.
    pub point_count: usize,
    /// Dimensionality of each point.
    pub dimensions: usize,
    /// RNG seed; identical configs generate identical clouds.
    pub seed: u64,
}

/// Generates a flat row-major point cloud in the unit cube.
#[must_use]
pub fn generate(config: &SyntheticConfig) -> Vec<f64> {
    let mut rng = SmallRng::seed_from_u64(config.seed);
    (0..config.point_count * config.dimensions)
        .map(|_| rng.gen_range(0.0..1.0))
        .collect()
}
