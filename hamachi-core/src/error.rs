//! Error types for the Hamachi core library.
//!
//! Defines error enums exposed by the public API and a convenient result alias.

use std::fmt;

use thiserror::Error;

use crate::metric::Metric;

/// Stable codes describing [`TreeError`] variants.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum TreeErrorCode {
    /// The input contained no rows.
    EmptyData,
    /// Rows must have positive dimension.
    ZeroDimension,
    /// The flat data length was not a multiple of the row width.
    RaggedData,
    /// Leaf size must be positive.
    InvalidLeafSize,
    /// A coordinate was NaN or infinite.
    NonFiniteCoordinate,
}

impl TreeErrorCode {
    /// Return the stable machine-readable representation of this error code.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::EmptyData => "TREE_EMPTY_DATA",
            Self::ZeroDimension => "TREE_ZERO_DIMENSION",
            Self::RaggedData => "TREE_RAGGED_DATA",
            Self::InvalidLeafSize => "TREE_INVALID_LEAF_SIZE",
            Self::NonFiniteCoordinate => "TREE_NON_FINITE_COORDINATE",
        }
    }
}

impl fmt::Display for TreeErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An error produced while constructing a spatial tree.
#[non_exhaustive]
#[derive(Clone, Debug, Error, PartialEq)]
pub enum TreeError {
    /// The input contained no rows.
    #[error("input data contains no rows")]
    EmptyData,
    /// Rows must have positive dimension.
    #[error("input rows must have positive dimension")]
    ZeroDimension,
    /// The flat data length was not a multiple of the row width.
    #[error("flat data of length {len} is not a multiple of {num_features} features")]
    RaggedData { len: usize, num_features: usize },
    /// Leaf size must be positive.
    #[error("leaf_size must be at least 1")]
    InvalidLeafSize,
    /// A coordinate was NaN or infinite.
    #[error("row {row} contains a non-finite coordinate")]
    NonFiniteCoordinate { row: usize },
}

impl TreeError {
    /// Retrieve the stable [`TreeErrorCode`] for this error.
    #[must_use]
    pub const fn code(&self) -> TreeErrorCode {
        match self {
            Self::EmptyData => TreeErrorCode::EmptyData,
            Self::ZeroDimension => TreeErrorCode::ZeroDimension,
            Self::RaggedData { .. } => TreeErrorCode::RaggedData,
            Self::InvalidLeafSize => TreeErrorCode::InvalidLeafSize,
            Self::NonFiniteCoordinate { .. } => TreeErrorCode::NonFiniteCoordinate,
        }
    }
}

/// Stable codes describing [`BoruvkaError`] variants.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum BoruvkaErrorCode {
    /// `min_samples` must be at least 1.
    InvalidMinSamples,
    /// `alpha` must be a positive finite number.
    InvalidAlpha,
    /// `leaf_size` must be at least 1.
    InvalidLeafSize,
    /// `n_jobs` must be at least 1.
    InvalidJobs,
    /// A Minkowski exponent below 1 (or NaN) was requested.
    InvalidMinkowskiExponent,
    /// `min_samples` exceeded the number of indexed points.
    MinSamplesTooLarge,
    /// The tree was built under a different metric than the engine.
    MetricMismatch,
    /// A core distance came back NaN.
    NonFiniteCoreDistance,
    /// A candidate edge weight came back NaN.
    NonFiniteEdgeWeight,
    /// An exact-mode sweep failed to merge any components.
    StalledSweep,
    /// Tree construction failed.
    TreeConstruction,
}

impl BoruvkaErrorCode {
    /// Return the stable machine-readable representation of this error code.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidMinSamples => "BORUVKA_INVALID_MIN_SAMPLES",
            Self::InvalidAlpha => "BORUVKA_INVALID_ALPHA",
            Self::InvalidLeafSize => "BORUVKA_INVALID_LEAF_SIZE",
            Self::InvalidJobs => "BORUVKA_INVALID_JOBS",
            Self::InvalidMinkowskiExponent => "BORUVKA_INVALID_MINKOWSKI_EXPONENT",
            Self::MinSamplesTooLarge => "BORUVKA_MIN_SAMPLES_TOO_LARGE",
            Self::MetricMismatch => "BORUVKA_METRIC_MISMATCH",
            Self::NonFiniteCoreDistance => "BORUVKA_NON_FINITE_CORE_DISTANCE",
            Self::NonFiniteEdgeWeight => "BORUVKA_NON_FINITE_EDGE_WEIGHT",
            Self::StalledSweep => "BORUVKA_STALLED_SWEEP",
            Self::TreeConstruction => "BORUVKA_TREE_CONSTRUCTION",
        }
    }
}

impl fmt::Display for BoruvkaErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error type produced when configuring or running the spanning-tree engine.
#[non_exhaustive]
#[derive(Clone, Debug, Error, PartialEq)]
pub enum BoruvkaError {
    /// `min_samples` must be at least 1.
    #[error("min_samples must be at least 1 (got {got})")]
    InvalidMinSamples { got: usize },
    /// `alpha` must be a positive finite number.
    #[error("alpha must be positive and finite (got {got})")]
    InvalidAlpha { got: f64 },
    /// `leaf_size` must be at least 1.
    #[error("leaf_size must be at least 1")]
    InvalidLeafSize,
    /// `n_jobs` must be at least 1.
    #[error("n_jobs must be at least 1")]
    InvalidJobs,
    /// A Minkowski exponent below 1 (or NaN) was requested.
    #[error("Minkowski exponent must be at least 1 (got {got})")]
    InvalidMinkowskiExponent { got: f64 },
    /// `min_samples` exceeded the number of indexed points.
    #[error("min_samples is {min_samples} but the tree indexes only {points} points")]
    MinSamplesTooLarge { min_samples: usize, points: usize },
    /// The tree was built under a different metric than the engine.
    #[error("tree was built with metric {tree:?} but the engine is configured for {configured:?}")]
    MetricMismatch { tree: Metric, configured: Metric },
    /// A core distance came back NaN.
    #[error("core distance for point {point} is not a number")]
    NonFiniteCoreDistance { point: usize },
    /// A candidate edge weight came back NaN.
    #[error("candidate edge ({src}, {sink}) has a weight that is not a number")]
    NonFiniteEdgeWeight { src: usize, sink: usize },
    /// An exact-mode sweep failed to merge any components.
    #[error("sweep left {components} components unmerged in exact mode")]
    StalledSweep { components: usize },
    /// Tree construction failed.
    #[error("tree construction failed: {0}")]
    Tree(#[from] TreeError),
}

impl BoruvkaError {
    /// Retrieve the stable [`BoruvkaErrorCode`] for this error.
    #[must_use]
    pub const fn code(&self) -> BoruvkaErrorCode {
        match self {
            Self::InvalidMinSamples { .. } => BoruvkaErrorCode::InvalidMinSamples,
            Self::InvalidAlpha { .. } => BoruvkaErrorCode::InvalidAlpha,
            Self::InvalidLeafSize => BoruvkaErrorCode::InvalidLeafSize,
            Self::InvalidJobs => BoruvkaErrorCode::InvalidJobs,
            Self::InvalidMinkowskiExponent { .. } => BoruvkaErrorCode::InvalidMinkowskiExponent,
            Self::MinSamplesTooLarge { .. } => BoruvkaErrorCode::MinSamplesTooLarge,
            Self::MetricMismatch { .. } => BoruvkaErrorCode::MetricMismatch,
            Self::NonFiniteCoreDistance { .. } => BoruvkaErrorCode::NonFiniteCoreDistance,
            Self::NonFiniteEdgeWeight { .. } => BoruvkaErrorCode::NonFiniteEdgeWeight,
            Self::StalledSweep { .. } => BoruvkaErrorCode::StalledSweep,
            Self::Tree(_) => BoruvkaErrorCode::TreeConstruction,
        }
    }

    /// Retrieve the inner [`TreeErrorCode`] when the error originated in tree
    /// construction.
    #[must_use]
    pub const fn tree_code(&self) -> Option<TreeErrorCode> {
        match self {
            Self::Tree(error) => Some(error.code()),
            _ => None,
        }
    }
}

/// Convenient alias for results returned by the core API.
pub type Result<T> = core::result::Result<T, BoruvkaError>;
