//! Builder utilities for configuring the spanning-tree engine.
//!
//! Exposes the parameter surface and builder validation used before
//! constructing [`Boruvka`] instances.

use crate::{
    boruvka::Boruvka,
    error::{BoruvkaError, Result},
    metric::Metric,
};

/// Configures and constructs [`Boruvka`] instances.
///
/// # Examples
/// ```
/// use hamachi_core::{BoruvkaBuilder, Metric};
///
/// let engine = BoruvkaBuilder::new()
///     .with_min_samples(3)
///     .with_metric(Metric::Manhattan)
///     .build()
///     .expect("builder configuration is valid");
/// assert_eq!(engine.min_samples(), 3);
/// assert_eq!(engine.metric(), Metric::Manhattan);
/// ```
#[derive(Debug, Clone)]
pub struct BoruvkaBuilder {
    min_samples: usize,
    alpha: f64,
    approx_min_span_tree: bool,
    leaf_size: usize,
    n_jobs: usize,
    metric: Metric,
}

impl Default for BoruvkaBuilder {
    fn default() -> Self {
        Self {
            min_samples: 5,
            alpha: 1.0,
            approx_min_span_tree: false,
            leaf_size: 20,
            n_jobs: 4,
            metric: Metric::Euclidean,
        }
    }
}

impl BoruvkaBuilder {
    /// Creates a builder populated with default parameters.
    ///
    /// # Examples
    /// ```
    /// use hamachi_core::{BoruvkaBuilder, Metric};
    ///
    /// let builder = BoruvkaBuilder::new();
    /// assert_eq!(builder.min_samples(), 5);
    /// assert_eq!(builder.alpha(), 1.0);
    /// assert!(!builder.approx_min_span_tree());
    /// assert_eq!(builder.leaf_size(), 20);
    /// assert_eq!(builder.n_jobs(), 4);
    /// assert_eq!(builder.metric(), Metric::Euclidean);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the core-distance neighbour count.
    #[must_use]
    pub fn with_min_samples(mut self, min_samples: usize) -> Self {
        self.min_samples = min_samples;
        self
    }

    /// Returns the configured neighbour count.
    #[must_use]
    pub fn min_samples(&self) -> usize {
        self.min_samples
    }

    /// Overrides the distance-scaling parameter `alpha`.
    #[must_use]
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    /// Returns the configured `alpha`.
    #[must_use]
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Enables or disables approximate mode, which keeps stale pruning
    /// bounds after a sweep that merged nothing instead of failing.
    #[must_use]
    pub fn with_approx_min_span_tree(mut self, approx: bool) -> Self {
        self.approx_min_span_tree = approx;
        self
    }

    /// Returns `true` when approximate mode is enabled.
    #[must_use]
    pub fn approx_min_span_tree(&self) -> bool {
        self.approx_min_span_tree
    }

    /// Overrides the advisory leaf size used when the engine builds trees
    /// itself.
    #[must_use]
    pub fn with_leaf_size(mut self, leaf_size: usize) -> Self {
        self.leaf_size = leaf_size;
        self
    }

    /// Returns the configured leaf size.
    #[must_use]
    pub fn leaf_size(&self) -> usize {
        self.leaf_size
    }

    /// Overrides the worker count for the bulk core-distance query.
    #[must_use]
    pub fn with_n_jobs(mut self, n_jobs: usize) -> Self {
        self.n_jobs = n_jobs;
        self
    }

    /// Returns the configured worker count.
    #[must_use]
    pub fn n_jobs(&self) -> usize {
        self.n_jobs
    }

    /// Overrides the distance metric.
    #[must_use]
    pub fn with_metric(mut self, metric: Metric) -> Self {
        self.metric = metric;
        self
    }

    /// Returns the configured metric.
    #[must_use]
    pub fn metric(&self) -> Metric {
        self.metric
    }

    /// Validates the configuration and constructs a [`Boruvka`] instance.
    ///
    /// # Errors
    /// Returns [`BoruvkaError::InvalidMinSamples`] when `min_samples` is
    /// zero, [`BoruvkaError::InvalidAlpha`] when `alpha` is not a positive
    /// finite number, [`BoruvkaError::InvalidLeafSize`] when `leaf_size` is
    /// zero, and [`BoruvkaError::InvalidJobs`] when `n_jobs` is zero.
    pub fn build(self) -> Result<Boruvka> {
        if self.min_samples == 0 {
            return Err(BoruvkaError::InvalidMinSamples {
                got: self.min_samples,
            });
        }
        if !self.alpha.is_finite() || self.alpha <= 0.0 {
            return Err(BoruvkaError::InvalidAlpha { got: self.alpha });
        }
        if self.leaf_size == 0 {
            return Err(BoruvkaError::InvalidLeafSize);
        }
        if self.n_jobs == 0 {
            return Err(BoruvkaError::InvalidJobs);
        }

        Ok(Boruvka::new(
            self.min_samples,
            self.alpha,
            self.approx_min_span_tree,
            self.leaf_size,
            self.n_jobs,
            self.metric,
        ))
    }
}
