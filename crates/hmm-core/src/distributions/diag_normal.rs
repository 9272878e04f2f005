use super::{total_weight, weighted_moments, Emission};
use crate::error::FitError;
use hmm_math::log_normal_pdf;
use rand::Rng;
use rand_distr::StandardNormal;
use serde::Serialize;

/// Multivariate Gaussian with diagonal covariance over `Vec<f64>` vectors.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiagNormal {
    means: Vec<f64>,
    std_devs: Vec<f64>,
}

impl DiagNormal {
    /// Create a diagonal Gaussian; both vectors must share a non-zero length.
    pub fn new(means: Vec<f64>, std_devs: Vec<f64>) -> Result<Self, FitError> {
        if means.is_empty() || means.len() != std_devs.len() {
            return Err(FitError::InvalidParameter {
                parameter: "dimension",
                value: std_devs.len() as f64,
            });
        }
        if let Some(&m) = means.iter().find(|m| !m.is_finite()) {
            return Err(FitError::InvalidParameter {
                parameter: "means",
                value: m,
            });
        }
        if let Some(&s) = std_devs.iter().find(|s| !s.is_finite() || **s <= 0.0) {
            return Err(FitError::InvalidParameter {
                parameter: "std_devs",
                value: s,
            });
        }
        Ok(Self { means, std_devs })
    }

    pub fn means(&self) -> &[f64] {
        &self.means
    }

    pub fn std_devs(&self) -> &[f64] {
        &self.std_devs
    }
}

impl Emission for DiagNormal {
    type Observation = Vec<f64>;

    fn log_density(&self, x: &Vec<f64>) -> f64 {
        if x.len() != self.means.len() {
            return f64::NEG_INFINITY;
        }
        x.iter()
            .zip(self.means.iter().zip(&self.std_devs))
            .map(|(&xi, (&m, &s))| log_normal_pdf(xi, m, s))
            .sum()
    }

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<f64> {
        self.means
            .iter()
            .zip(&self.std_devs)
            .map(|(&m, &s)| {
                let z: f64 = rng.sample(StandardNormal);
                m + s * z
            })
            .collect()
    }

    fn fit_weighted(&self, observations: &[Vec<f64>], weights: &[f64]) -> Result<Self, FitError> {
        let total = total_weight(observations.len(), weights)?;
        let dim = self.means.len();
        let mut means = Vec::with_capacity(dim);
        let mut std_devs = Vec::with_capacity(dim);
        for d in 0..dim {
            let column = observations
                .iter()
                .map(move |x| x.get(d).copied().unwrap_or(f64::NAN));
            let (mean, var) = weighted_moments(column, weights, total);
            let sd = var.sqrt();
            if !sd.is_finite() || sd <= 0.0 {
                return Err(FitError::Degenerate {
                    parameter: "std_devs",
                    value: sd,
                });
            }
            means.push(mean);
            std_devs.push(sd);
        }
        DiagNormal::new(means, std_devs)
    }

    fn event_dimension(&self) -> usize {
        self.means.len()
    }

    fn observation_dimension(x: &Vec<f64>) -> usize {
        x.len()
    }
}
