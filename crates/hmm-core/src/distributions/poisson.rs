use super::{total_weight, Emission, SCALAR};
use crate::error::FitError;
use hmm_math::log_poisson_pmf;
use rand::Rng;
use rand_distr::Distribution;
use serde::Serialize;

/// Poisson distribution over event counts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Poisson {
    rate: f64,
}

impl Poisson {
    /// Create a Poisson; `rate` must be finite and non-negative.
    pub fn new(rate: f64) -> Result<Self, FitError> {
        if !rate.is_finite() || rate < 0.0 {
            return Err(FitError::InvalidParameter {
                parameter: "rate",
                value: rate,
            });
        }
        Ok(Self { rate })
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }
}

impl Emission for Poisson {
    type Observation = u64;

    fn log_density(&self, k: &u64) -> f64 {
        log_poisson_pmf(*k, self.rate)
    }

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> u64 {
        match rand_distr::Poisson::new(self.rate) {
            Ok(d) => d.sample(rng) as u64,
            // rate == 0 is a point mass at zero
            Err(_) => 0,
        }
    }

    fn fit_weighted(&self, observations: &[u64], weights: &[f64]) -> Result<Self, FitError> {
        let total = total_weight(observations.len(), weights)?;
        let rate = observations
            .iter()
            .zip(weights)
            .map(|(&k, w)| w * k as f64)
            .sum::<f64>()
            / total;
        Poisson::new(rate)
    }

    fn event_dimension(&self) -> usize {
        SCALAR
    }

    fn observation_dimension(_k: &u64) -> usize {
        SCALAR
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn zero_rate_is_point_mass() {
        let d = Poisson::new(0.0).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(d.sample(&mut rng), 0);
        assert_eq!(d.log_density(&0), 0.0);
        assert_eq!(d.log_density(&1), f64::NEG_INFINITY);
    }

    #[test]
    fn weighted_fit_is_weighted_mean() {
        let d = Poisson::new(1.0).unwrap();
        let fitted = d.fit_weighted(&[2, 4, 100], &[1.0, 1.0, 0.0]).unwrap();
        assert!((fitted.rate() - 3.0).abs() < 1e-12);
    }
}
