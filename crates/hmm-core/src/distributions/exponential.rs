use super::{total_weight, Emission, SCALAR};
use crate::error::FitError;
use hmm_math::log_exponential_pdf;
use rand::Rng;
use rand_distr::Exp1;
use serde::Serialize;

/// Exponential distribution with density `rate * exp(-rate * x)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Exponential {
    rate: f64,
}

impl Exponential {
    /// Create an exponential; `rate` must be finite and positive.
    pub fn new(rate: f64) -> Result<Self, FitError> {
        if !rate.is_finite() || rate <= 0.0 {
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

    pub fn mean(&self) -> f64 {
        1.0 / self.rate
    }
}

impl Emission for Exponential {
    type Observation = f64;

    fn log_density(&self, x: &f64) -> f64 {
        log_exponential_pdf(*x, self.rate)
    }

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        let e: f64 = rng.sample(Exp1);
        e / self.rate
    }

    fn fit_weighted(&self, observations: &[f64], weights: &[f64]) -> Result<Self, FitError> {
        let total = total_weight(observations.len(), weights)?;
        let weighted_sum: f64 = observations.iter().zip(weights).map(|(x, w)| w * x).sum();
        if !weighted_sum.is_finite() || weighted_sum <= 0.0 {
            return Err(FitError::Degenerate {
                parameter: "rate",
                value: f64::INFINITY,
            });
        }
        let rate = total / weighted_sum;
        if !rate.is_finite() {
            return Err(FitError::Degenerate {
                parameter: "rate",
                value: rate,
            });
        }
        Exponential::new(rate)
    }

    fn event_dimension(&self) -> usize {
        SCALAR
    }

    fn observation_dimension(_x: &f64) -> usize {
        SCALAR
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_positive_rate() {
        assert!(Exponential::new(0.0).is_err());
        assert!(Exponential::new(-2.0).is_err());
        assert!(Exponential::new(f64::INFINITY).is_err());
    }

    #[test]
    fn weighted_fit_is_inverse_weighted_mean() {
        let d = Exponential::new(1.0).unwrap();
        let fitted = d.fit_weighted(&[1.0, 3.0, 50.0], &[1.0, 1.0, 0.0]).unwrap();
        assert!((fitted.rate() - 0.5).abs() < 1e-12);
        assert!((fitted.mean() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn all_zero_observations_are_degenerate() {
        let d = Exponential::new(1.0).unwrap();
        assert!(d.fit_weighted(&[0.0, 0.0], &[1.0, 1.0]).is_err());
    }

    #[test]
    fn overflowing_rate_is_degenerate() {
        let d = Exponential::new(1.0).unwrap();
        assert!(matches!(
            d.fit_weighted(&[1e-320; 3], &[1.0; 3]),
            Err(FitError::Degenerate { parameter: "rate", .. })
        ));
    }
}
