use super::{Emission, Exponential, Normal, SCALAR};
use crate::error::FitError;
use rand::Rng;
use serde::Serialize;

/// Scalar emission that may differ in family from state to state,
/// e.g. a Gaussian regime next to an exponential one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "family", rename_all = "snake_case")]
pub enum Scalar {
    Normal(Normal),
    Exponential(Exponential),
}

impl From<Normal> for Scalar {
    fn from(d: Normal) -> Self {
        Scalar::Normal(d)
    }
}

impl From<Exponential> for Scalar {
    fn from(d: Exponential) -> Self {
        Scalar::Exponential(d)
    }
}

impl Emission for Scalar {
    type Observation = f64;

    fn log_density(&self, x: &f64) -> f64 {
        match self {
            Scalar::Normal(d) => d.log_density(x),
            Scalar::Exponential(d) => d.log_density(x),
        }
    }

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        match self {
            Scalar::Normal(d) => d.sample(rng),
            Scalar::Exponential(d) => d.sample(rng),
        }
    }

    fn fit_weighted(&self, observations: &[f64], weights: &[f64]) -> Result<Self, FitError> {
        Ok(match self {
            Scalar::Normal(d) => Scalar::Normal(d.fit_weighted(observations, weights)?),
            Scalar::Exponential(d) => {
                Scalar::Exponential(d.fit_weighted(observations, weights)?)
            }
        })
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
    fn refit_keeps_family() {
        let d: Scalar = Exponential::new(1.0).unwrap().into();
        let fitted = d.fit_weighted(&[0.5, 1.5], &[1.0, 1.0]).unwrap();
        match fitted {
            Scalar::Exponential(e) => assert!((e.rate() - 1.0).abs() < 1e-12),
            Scalar::Normal(_) => panic!("family changed on refit"),
        }
    }

    #[test]
    fn delegates_density() {
        let n = Normal::new(0.0, 1.0).unwrap();
        let d: Scalar = n.into();
        assert_eq!(d.log_density(&0.3), n.log_density(&0.3));
        let e: Scalar = Exponential::new(2.0).unwrap().into();
        assert_eq!(e.log_density(&-1.0), f64::NEG_INFINITY);
    }
}
