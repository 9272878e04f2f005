use super::{total_weight, weighted_moments, Emission, SCALAR};
use crate::error::FitError;
use hmm_math::log_normal_pdf;
use rand::Rng;
use rand_distr::StandardNormal;
use serde::Serialize;

/// Univariate Gaussian `N(mean, std_dev^2)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Normal {
    mean: f64,
    std_dev: f64,
}

impl Normal {
    /// Create a Gaussian; `std_dev` must be finite and positive.
    pub fn new(mean: f64, std_dev: f64) -> Result<Self, FitError> {
        if !mean.is_finite() {
            return Err(FitError::InvalidParameter {
                parameter: "mean",
                value: mean,
            });
        }
        if !std_dev.is_finite() || std_dev <= 0.0 {
            return Err(FitError::InvalidParameter {
                parameter: "std_dev",
                value: std_dev,
            });
        }
        Ok(Self { mean, std_dev })
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    pub fn std_dev(&self) -> f64 {
        self.std_dev
    }
}

impl Emission for Normal {
    type Observation = f64;

    fn log_density(&self, x: &f64) -> f64 {
        log_normal_pdf(*x, self.mean, self.std_dev)
    }

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        let z: f64 = rng.sample(StandardNormal);
        self.mean + self.std_dev * z
    }

    fn fit_weighted(&self, observations: &[f64], weights: &[f64]) -> Result<Self, FitError> {
        let total = total_weight(observations.len(), weights)?;
        let (mean, var) = weighted_moments(observations.iter().copied(), weights, total);
        let std_dev = var.sqrt();
        if !std_dev.is_finite() || std_dev <= 0.0 {
            return Err(FitError::Degenerate {
                parameter: "std_dev",
                value: std_dev,
            });
        }
        Normal::new(mean, std_dev)
    }

    fn event_dimension(&self) -> usize {
        SCALAR
    }

    fn observation_dimension(_x: &f64) -> usize {
        SCALAR
    }
}
