//! Distance metrics over dense `f64` vectors.
//!
//! Every metric exposes a true distance and a *reduced* distance (`rdist`): a
//! monotone transform that is cheaper to evaluate because it defers the final
//! root (squared Euclidean, or the un-rooted Minkowski power sum). Engine
//! internals are free to stay in reduced units and convert once at the edge
//! of the computation; the conversions are exact inverses and preserve
//! ordering.

use crate::error::{BoruvkaError, Result};

/// The closed set of supported metrics.
///
/// # Examples
/// ```
/// use hamachi_core::Metric;
///
/// let metric = Metric::Euclidean;
/// let r = metric.rdist(&[0.0, 0.0], &[3.0, 4.0]);
/// assert_eq!(r, 25.0);
/// assert_eq!(metric.rdist_to_dist(r), 5.0);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
#[non_exhaustive]
pub enum Metric {
    /// Straight-line distance; reduced form is the squared distance.
    Euclidean,
    /// Sum of absolute coordinate differences. Reduced form is the distance.
    Manhattan,
    /// Maximum absolute coordinate difference (Minkowski with `p = ∞`).
    Chebyshev,
    /// Minkowski distance with exponent `p ≥ 1`; reduced form omits the
    /// `1/p`-th root.
    Minkowski {
        /// The exponent. Always finite and at least 1.
        p: f64,
    },
}

impl Metric {
    /// Builds a Minkowski metric, normalising the special exponents.
    ///
    /// `p = 1` yields [`Metric::Manhattan`], `p = 2` yields
    /// [`Metric::Euclidean`], and an infinite `p` yields
    /// [`Metric::Chebyshev`].
    ///
    /// # Errors
    /// Returns [`BoruvkaError::InvalidMinkowskiExponent`] when `p < 1` or `p`
    /// is NaN.
    pub fn minkowski(p: f64) -> Result<Self> {
        if p.is_nan() || p < 1.0 {
            return Err(BoruvkaError::InvalidMinkowskiExponent { got: p });
        }
        if p.is_infinite() {
            return Ok(Self::Chebyshev);
        }
        if p == 1.0 {
            return Ok(Self::Manhattan);
        }
        if p == 2.0 {
            return Ok(Self::Euclidean);
        }
        Ok(Self::Minkowski { p })
    }

    /// Returns the Minkowski exponent; `+∞` denotes Chebyshev.
    #[must_use]
    pub fn p(&self) -> f64 {
        match self {
            Self::Euclidean => 2.0,
            Self::Manhattan => 1.0,
            Self::Chebyshev => f64::INFINITY,
            Self::Minkowski { p } => *p,
        }
    }

    /// True distance between two equally sized vectors.
    #[must_use]
    pub fn dist(&self, left: &[f64], right: &[f64]) -> f64 {
        self.rdist_to_dist(self.rdist(left, right))
    }

    /// Reduced distance between two equally sized vectors.
    ///
    /// The reduced form is a monotone function of [`Metric::dist`]; equal
    /// ordering is guaranteed. For Manhattan and Chebyshev it is the distance
    /// itself.
    #[must_use]
    pub fn rdist(&self, left: &[f64], right: &[f64]) -> f64 {
        self.reduce(left.iter().zip(right.iter()).map(|(l, r)| l - r))
    }

    /// Maps a true distance into reduced units.
    #[must_use]
    pub fn dist_to_rdist(&self, dist: f64) -> f64 {
        match self {
            Self::Euclidean => dist * dist,
            Self::Manhattan | Self::Chebyshev => dist,
            Self::Minkowski { p } => dist.powf(*p),
        }
    }

    /// Maps a reduced distance back into true units. Exact inverse of
    /// [`Metric::dist_to_rdist`] up to IEEE float equality.
    #[must_use]
    pub fn rdist_to_dist(&self, rdist: f64) -> f64 {
        match self {
            Self::Euclidean => rdist.sqrt(),
            Self::Manhattan | Self::Chebyshev => rdist,
            Self::Minkowski { p } => rdist.powf(p.recip()),
        }
    }

    /// Accumulates per-axis offsets into a reduced distance.
    ///
    /// Offsets may be signed; their magnitudes are combined. Shared by the
    /// pairwise reduced distance, the box-to-box lower bound, and node radius
    /// computation.
    pub(crate) fn reduce(&self, offsets: impl Iterator<Item = f64>) -> f64 {
        match self {
            Self::Euclidean => offsets.map(|d| d * d).sum(),
            Self::Manhattan => offsets.map(f64::abs).sum(),
            Self::Chebyshev => offsets.map(f64::abs).fold(0.0, f64::max),
            Self::Minkowski { p } => offsets.map(|d| d.abs().powf(*p)).sum(),
        }
    }
}
