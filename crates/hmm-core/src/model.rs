//! The HMM container and its structural invariants.
//!
//! A model holds
//! - `initial`: the distribution of the first latent state (length K)
//! - `transition`: the K×K row-stochastic matrix, `transition[i][j] = P(z_t = j | z_{t-1} = i)`
//! - `emissions`: one observation distribution per state, all of the same event dimension
//!
//! Every constructor validates; there is no way to obtain an `Hmm` that
//! violates these invariants. Log-parameters are cached once at
//! construction so the recursions never call `ln` on a parameter.
//!
//! # Example
//!
//! ```
//! use hmm_core::distributions::Normal;
//! use hmm_core::Hmm;
//!
//! let hmm = Hmm::with_uniform_initial(
//!     vec![vec![0.9, 0.1], vec![0.1, 0.9]],
//!     vec![Normal::new(0.0, 1.0)?, Normal::new(10.0, 1.0)?],
//! )?;
//! assert_eq!(hmm.n_states(), 2);
//! assert_eq!(hmm.initial(), &[0.5, 0.5]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use crate::distributions::Emission;
use crate::error::{HmmError, ValidationError};
use serde::Serialize;

/// Tolerance on probability-vector sums.
pub const SUM_TOLERANCE: f64 = 1e-6;

/// A discrete-time, discrete-state hidden Markov model.
#[derive(Debug, Clone, Serialize)]
pub struct Hmm<D> {
    initial: Vec<f64>,
    transition: Vec<Vec<f64>>,
    emissions: Vec<D>,
    #[serde(skip)]
    log_initial: Vec<f64>,
    #[serde(skip)]
    log_transition: Vec<Vec<f64>>,
}

impl<D: Emission> Hmm<D> {
    /// Build a model from all three parameter sets.
    pub fn new(
        initial: Vec<f64>,
        transition: Vec<Vec<f64>>,
        emissions: Vec<D>,
    ) -> Result<Self, ValidationError> {
        assert_hmm(&initial, &transition, &emissions)?;
        let log_initial = initial.iter().map(|p| p.ln()).collect();
        let log_transition = transition
            .iter()
            .map(|row| row.iter().map(|p| p.ln()).collect())
            .collect();
        Ok(Self {
            initial,
            transition,
            emissions,
            log_initial,
            log_transition,
        })
    }

    /// Build a model whose initial distribution is uniform over the states.
    pub fn with_uniform_initial(
        transition: Vec<Vec<f64>>,
        emissions: Vec<D>,
    ) -> Result<Self, ValidationError> {
        let k = transition.len();
        if k == 0 {
            return Err(ValidationError::NoStates);
        }
        Hmm::new(vec![1.0 / k as f64; k], transition, emissions)
    }

    /// Re-check all invariants.
    pub fn validate(&self) -> Result<(), ValidationError> {
        assert_hmm(&self.initial, &self.transition, &self.emissions)
    }

    /// Number of latent states K.
    pub fn n_states(&self) -> usize {
        self.initial.len()
    }

    /// Shared event dimension of the emissions.
    pub fn event_dimension(&self) -> usize {
        // K >= 1 is an invariant
        self.emissions[0].event_dimension()
    }

    pub fn initial(&self) -> &[f64] {
        &self.initial
    }

    pub fn transition(&self) -> &[Vec<f64>] {
        &self.transition
    }

    pub fn emissions(&self) -> &[D] {
        &self.emissions
    }

    pub fn log_initial(&self) -> &[f64] {
        &self.log_initial
    }

    pub fn log_transition(&self) -> &[Vec<f64>] {
        &self.log_transition
    }

    /// Consume the model, returning `(initial, transition, emissions)`.
    pub fn into_parts(self) -> (Vec<f64>, Vec<Vec<f64>>, Vec<D>) {
        (self.initial, self.transition, self.emissions)
    }

    /// Check an observation sequence against this model before inference:
    /// it must be non-empty and every observation must have the emissions'
    /// event dimension.
    pub fn check_observations(&self, observations: &[D::Observation]) -> Result<(), HmmError> {
        if observations.is_empty() {
            return Err(HmmError::EmptyObservations);
        }
        let expected = self.event_dimension();
        for (index, x) in observations.iter().enumerate() {
            let got = D::observation_dimension(x);
            if got != expected {
                return Err(HmmError::DimensionMismatch {
                    index,
                    expected,
                    got,
                });
            }
        }
        Ok(())
    }

    /// Check that `state` indexes one of the model's states.
    pub fn check_state(&self, state: usize) -> Result<(), HmmError> {
        if state >= self.n_states() {
            return Err(HmmError::StateOutOfRange {
                state,
                n_states: self.n_states(),
            });
        }
        Ok(())
    }

    /// Stationary distribution of the latent chain, by power iteration
    /// from the initial distribution.
    ///
    /// Returns `None` if the iteration has not settled within `tolerance`
    /// (L1) after `max_iterations` steps, e.g. for a periodic chain.
    pub fn stationary_distribution(&self, max_iterations: usize, tolerance: f64) -> Option<Vec<f64>> {
        let k = self.n_states();
        let mut dist = self.initial.clone();
        for _ in 0..max_iterations {
            let mut next = vec![0.0; k];
            for (i, row) in self.transition.iter().enumerate() {
                for (j, p) in row.iter().enumerate() {
                    next[j] += dist[i] * p;
                }
            }
            let delta: f64 = next.iter().zip(&dist).map(|(a, b)| (a - b).abs()).sum();
            dist = next;
            if delta < tolerance {
                return Some(dist);
            }
        }
        None
    }
}

/// Validate a parameter set without building a model.
///
/// Fails on the first violated invariant, naming the offending index.
pub fn assert_hmm<D: Emission>(
    initial: &[f64],
    transition: &[Vec<f64>],
    emissions: &[D],
) -> Result<(), ValidationError> {
    let k = initial.len();
    if k == 0 {
        return Err(ValidationError::NoStates);
    }

    for (index, &value) in initial.iter().enumerate() {
        if !value.is_finite() || value < 0.0 {
            return Err(ValidationError::InitialEntry { index, value });
        }
    }
    let sum: f64 = initial.iter().sum();
    if (sum - 1.0).abs() > SUM_TOLERANCE {
        return Err(ValidationError::InitialSum { sum });
    }

    if transition.len() != k {
        return Err(ValidationError::TransitionRows {
            expected: k,
            got: transition.len(),
        });
    }
    for (row, values) in transition.iter().enumerate() {
        if values.len() != k {
            return Err(ValidationError::TransitionColumns {
                row,
                expected: k,
                got: values.len(),
            });
        }
        for (col, &value) in values.iter().enumerate() {
            if !value.is_finite() || value < 0.0 {
                return Err(ValidationError::TransitionEntry { row, col, value });
            }
        }
        let sum: f64 = values.iter().sum();
        if (sum - 1.0).abs() > SUM_TOLERANCE {
            return Err(ValidationError::TransitionRowSum { row, sum });
        }
    }

    if emissions.len() != k {
        return Err(ValidationError::EmissionCount {
            expected: k,
            got: emissions.len(),
        });
    }
    let expected = emissions[0].event_dimension();
    for (state, d) in emissions.iter().enumerate().skip(1) {
        let got = d.event_dimension();
        if got != expected {
            return Err(ValidationError::EmissionDimension {
                state,
                expected,
                got,
            });
        }
    }

    Ok(())
}

/// Whether `values` is a probability vector (non-negative, sums to 1).
pub fn is_probability_vector(values: &[f64]) -> bool {
    !values.is_empty()
        && values.iter().all(|p| p.is_finite() && *p >= 0.0)
        && (values.iter().sum::<f64>() - 1.0).abs() <= SUM_TOLERANCE
}

/// Whether `matrix` is square and every row is a probability vector.
pub fn is_transition_matrix(matrix: &[Vec<f64>]) -> bool {
    !matrix.is_empty()
        && matrix
            .iter()
            .all(|row| row.len() == matrix.len() && is_probability_vector(row))
}
