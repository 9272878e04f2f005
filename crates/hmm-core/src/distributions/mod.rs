//! Observation-distribution capability and reference families.
//!
//! The engine only ever talks to [`Emission`]; it never looks inside a
//! distribution. Inference code is generic over `D: Emission`, so the
//! per-timestep, per-state density calls are statically dispatched.
//!
//! Families shipped here:
//! - [`Normal`], [`Exponential`] and the mixed [`Scalar`] over `f64`
//! - [`Poisson`] over `u64` counts
//! - [`Categorical`] over `usize` symbols
//! - [`DiagNormal`] over `Vec<f64>` vectors

mod categorical;
mod diag_normal;
mod exponential;
mod normal;
mod poisson;
mod scalar;

pub use categorical::Categorical;
pub use diag_normal::DiagNormal;
pub use exponential::Exponential;
pub use normal::Normal;
pub use poisson::Poisson;
pub use scalar::Scalar;

use crate::error::FitError;
use rand::Rng;

/// Smallest total weight a weighted refit will accept.
pub const MIN_TOTAL_WEIGHT: f64 = 1e-10;

/// Event dimension reported by scalar-valued families.
pub const SCALAR: usize = 0;

/// What the engine needs from a per-state observation distribution.
pub trait Emission: Clone + Send + Sync {
    /// The observation type this family is defined over.
    type Observation: Clone + Send + Sync;

    /// Log density (or log mass) of `x`; -inf outside the support.
    fn log_density(&self, x: &Self::Observation) -> f64;

    /// Draw one observation.
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Self::Observation;

    /// Weighted maximum-likelihood refit. The receiver is the current
    /// distribution, so enum-wrapped families keep their family.
    fn fit_weighted(
        &self,
        observations: &[Self::Observation],
        weights: &[f64],
    ) -> Result<Self, FitError>;

    /// [`SCALAR`] for scalar families, `d` for `d`-vectors.
    fn event_dimension(&self) -> usize;

    /// Dimension of a single observation, on the same scale as
    /// [`Emission::event_dimension`].
    fn observation_dimension(x: &Self::Observation) -> usize;
}

/// Check a weight vector against its observations and return the total.
pub(crate) fn total_weight(n_observations: usize, weights: &[f64]) -> Result<f64, FitError> {
    if n_observations != weights.len() {
        return Err(FitError::LengthMismatch {
            observations: n_observations,
            weights: weights.len(),
        });
    }
    let total: f64 = weights.iter().sum();
    if !total.is_finite() || total < MIN_TOTAL_WEIGHT {
        return Err(FitError::InsufficientWeight { total });
    }
    Ok(total)
}

/// Weighted mean and (biased) variance of scalar samples.
pub(crate) fn weighted_moments<I>(values: I, weights: &[f64], total: f64) -> (f64, f64)
where
    I: Iterator<Item = f64> + Clone,
{
    let mean = values
        .clone()
        .zip(weights)
        .map(|(x, w)| w * x)
        .sum::<f64>()
        / total;
    let var = values
        .zip(weights)
        .map(|(x, w)| w * (x - mean) * (x - mean))
        .sum::<f64>()
        / total;
    (mean, var)
}
