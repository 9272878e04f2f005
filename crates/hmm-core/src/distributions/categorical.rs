use super::{total_weight, Emission, SCALAR};
use crate::error::FitError;
use crate::sampler::sample_categorical;
use rand::Rng;
use serde::Serialize;

/// Tolerance on the probability vector's sum.
const SUM_TOLERANCE: f64 = 1e-6;

/// Discrete distribution over the symbols `0..probs.len()`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Categorical {
    probs: Vec<f64>,
}

impl Categorical {
    /// Create a categorical from a probability vector.
    pub fn new(probs: Vec<f64>) -> Result<Self, FitError> {
        if probs.is_empty() {
            return Err(FitError::InvalidParameter {
                parameter: "probs.len",
                value: 0.0,
            });
        }
        for &p in &probs {
            if !p.is_finite() || p < 0.0 {
                return Err(FitError::InvalidParameter {
                    parameter: "probs",
                    value: p,
                });
            }
        }
        let sum: f64 = probs.iter().sum();
        if (sum - 1.0).abs() > SUM_TOLERANCE {
            return Err(FitError::InvalidParameter {
                parameter: "probs.sum",
                value: sum,
            });
        }
        Ok(Self { probs })
    }

    pub fn probs(&self) -> &[f64] {
        &self.probs
    }

    /// Number of symbols.
    pub fn n_symbols(&self) -> usize {
        self.probs.len()
    }
}

impl Emission for Categorical {
    type Observation = usize;

    fn log_density(&self, x: &usize) -> f64 {
        match self.probs.get(*x) {
            Some(&p) => p.ln(),
            None => f64::NEG_INFINITY,
        }
    }

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        sample_categorical(&self.probs, rng)
    }

    fn fit_weighted(&self, observations: &[usize], weights: &[f64]) -> Result<Self, FitError> {
        total_weight(observations.len(), weights)?;
        let mut counts = vec![0.0; self.probs.len()];
        for (&x, &w) in observations.iter().zip(weights) {
            // symbols outside the alphabet carry no mass under any state
            if let Some(c) = counts.get_mut(x) {
                *c += w;
            }
        }
        let total: f64 = counts.iter().sum();
        if total < super::MIN_TOTAL_WEIGHT {
            return Err(FitError::InsufficientWeight { total });
        }
        Categorical::new(counts.into_iter().map(|c| c / total).collect())
    }

    fn event_dimension(&self) -> usize {
        SCALAR
    }

    fn observation_dimension(_x: &usize) -> usize {
        SCALAR
    }
}
