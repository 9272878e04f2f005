//! Baum-Welch (EM) re-estimation of model parameters.
//!
//! Each iteration runs forward-backward on the current model and builds a
//! *new* model from the posteriors:
//!
//! - `initial[k]     = gamma[0][k]`
//! - `transition[j][k] = sum_{t<T-1} xi[t][j][k] / sum_{t<T-1} gamma[t][j]`
//! - `emissions[k]   = emissions[k].fit_weighted(y, gamma[:, k])`
//!
//! The input model is never mutated, so a model can be shared with readers
//! on other threads while it is being trained.
//!
//! States that are (numerically) never visited keep their previous
//! transition row, or get a uniform one, per [`ZeroOccupancyPolicy`]. The
//! same policy covers an emission whose refit has no weight to work with.
//!
//! # Example
//!
//! ```
//! use hmm_core::distributions::Normal;
//! use hmm_core::{fit, simulate, FitConfig, Hmm};
//! use rand::SeedableRng;
//!
//! let truth = Hmm::with_uniform_initial(
//!     vec![vec![0.9, 0.1], vec![0.1, 0.9]],
//!     vec![Normal::new(0.0, 1.0)?, Normal::new(10.0, 1.0)?],
//! )?;
//! let mut rng = rand::rngs::StdRng::seed_from_u64(42);
//! let trajectory = simulate(&truth, 500, None, &mut rng)?;
//!
//! let guess = Hmm::with_uniform_initial(
//!     vec![vec![0.7, 0.3], vec![0.3, 0.7]],
//!     vec![Normal::new(-1.0, 2.0)?, Normal::new(8.0, 2.0)?],
//! )?;
//! let result = fit(&guess, &trajectory.observations, &FitConfig::new(100, 1e-4))?;
//! assert!(result.converged());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use crate::distributions::Emission;
use crate::error::{ConfigError, FitError, HmmError, Result};
use crate::inference::forward_backward::{
    emission_log_densities, forward_backward_from_loglik, log_likelihoods, ForwardBackward,
};
use crate::model::Hmm;
use hmm_math::log_sum_exp_iter;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info, warn};

/// Log-occupancy below which a state counts as never visited (~1e-304).
const MIN_LOG_OCCUPANCY: f64 = -700.0;

/// What to do with a state that the posteriors never visit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZeroOccupancyPolicy {
    /// Keep the previous iteration's transition row and emission.
    #[default]
    KeepPrevious,
    /// Reset the transition row to uniform; the emission is kept.
    Uniform,
}

impl std::str::FromStr for ZeroOccupancyPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "keep_previous" | "keep-previous" | "keep" => Ok(ZeroOccupancyPolicy::KeepPrevious),
            "uniform" => Ok(ZeroOccupancyPolicy::Uniform),
            _ => Err(format!("unknown zero-occupancy policy: {}", s)),
        }
    }
}

impl fmt::Display for ZeroOccupancyPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ZeroOccupancyPolicy::KeepPrevious => write!(f, "keep_previous"),
            ZeroOccupancyPolicy::Uniform => write!(f, "uniform"),
        }
    }
}

/// Stopping rule and numerical policy for [`fit`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitConfig {
    /// Upper bound on EM iterations.
    pub max_iterations: usize,
    /// Stop once successive log-likelihoods differ by less than this.
    pub tolerance: f64,
    /// Handling of never-visited states.
    pub zero_occupancy: ZeroOccupancyPolicy,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            tolerance: 1e-3,
            zero_occupancy: ZeroOccupancyPolicy::KeepPrevious,
        }
    }
}

impl FitConfig {
    pub fn new(max_iterations: usize, tolerance: f64) -> Self {
        Self {
            max_iterations,
            tolerance,
            ..Default::default()
        }
    }

    pub fn with_zero_occupancy(mut self, policy: ZeroOccupancyPolicy) -> Self {
        self.zero_occupancy = policy;
        self
    }

    /// Semantic checks.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.max_iterations == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_iterations".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "tolerance".to_string(),
                message: format!("must be finite and non-negative, got {}", self.tolerance),
            });
        }
        Ok(())
    }
}

/// Why training stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FitStatus {
    /// Log-likelihood change fell below the tolerance.
    Converged,
    /// The iteration budget ran out first.
    MaxIterations,
    /// The sequence had zero probability under the current model.
    DegenerateLikelihood,
}

/// Outcome of a Baum-Welch run.
#[derive(Debug, Clone, Serialize)]
pub struct FitResult<D> {
    /// The re-estimated model from the last completed iteration.
    pub model: Hmm<D>,
    /// `loglikelihoods[i]` is the log-likelihood of the model that entered
    /// iteration `i`.
    pub loglikelihoods: Vec<f64>,
    pub status: FitStatus,
    /// Number of forward-backward passes performed.
    pub iterations: usize,
}

impl<D> FitResult<D> {
    pub fn converged(&self) -> bool {
        self.status == FitStatus::Converged
    }

    pub fn final_loglikelihood(&self) -> Option<f64> {
        self.loglikelihoods.last().copied()
    }

    /// Number of iterations whose log-likelihood dropped by more than
    /// `tolerance`. EM should never do this; a non-zero count points at a
    /// numerical problem (or an emission family whose refit is not an
    /// exact weighted MLE).
    pub fn likelihood_decreases(&self, tolerance: f64) -> usize {
        self.loglikelihoods
            .windows(2)
            .filter(|w| w[1] < w[0] - tolerance)
            .count()
    }
}

/// Fit `hmm` to one observation sequence by Baum-Welch.
///
/// Structural problems (invalid config, empty or mis-shaped observations,
/// observations with a NaN log-density) fail before the first iteration. A zero-probability sequence stops
/// training with [`FitStatus::DegenerateLikelihood`] and returns the last
/// valid model.
pub fn fit<D: Emission>(
    hmm: &Hmm<D>,
    observations: &[D::Observation],
    config: &FitConfig,
) -> Result<FitResult<D>> {
    config.validate()?;
    let mut loglik = log_likelihoods(hmm, observations)?;

    let mut model = hmm.clone();
    let mut history: Vec<f64> = Vec::with_capacity(config.max_iterations);
    let mut status = FitStatus::MaxIterations;

    for iteration in 0..config.max_iterations {
        if iteration > 0 {
            loglik = emission_log_densities(&model, observations);
        }
        let fb = forward_backward_from_loglik(&model, &loglik);
        history.push(fb.loglikelihood);

        if fb.is_degenerate() {
            warn!(
                iteration,
                loglikelihood = fb.loglikelihood,
                "observation sequence has zero likelihood; stopping"
            );
            status = FitStatus::DegenerateLikelihood;
            break;
        }

        model = reestimate(&model, observations, &fb, config.zero_occupancy)?;

        let delta = match history.len() {
            n if n >= 2 => history[n - 1] - history[n - 2],
            _ => f64::INFINITY,
        };
        debug!(iteration, loglikelihood = fb.loglikelihood, delta, "baum-welch iteration");

        if delta < -config.tolerance {
            warn!(
                iteration,
                delta, "log-likelihood decreased between iterations"
            );
        }
        if delta.abs() < config.tolerance {
            status = FitStatus::Converged;
            break;
        }
    }

    let iterations = history.len();
    match status {
        FitStatus::Converged => info!(
            iterations,
            loglikelihood = history.last().copied().unwrap_or(f64::NEG_INFINITY),
            "baum-welch converged"
        ),
        FitStatus::MaxIterations => info!(iterations, "baum-welch reached iteration limit"),
        FitStatus::DegenerateLikelihood => {}
    }

    Ok(FitResult {
        model,
        loglikelihoods: history,
        status,
        iterations,
    })
}

/// One M-step: build the next model from the current posteriors.
fn reestimate<D: Emission>(
    model: &Hmm<D>,
    observations: &[D::Observation],
    fb: &ForwardBackward,
    policy: ZeroOccupancyPolicy,
) -> Result<Hmm<D>> {
    let initial = normalized(fb.log_gamma[0].iter().map(|g| g.exp()).collect());
    let transition = reestimate_transition(model, fb, policy);
    let emissions = reestimate_emissions(model, observations, fb)?;
    Ok(Hmm::new(initial, transition, emissions)?)
}

fn reestimate_transition<D: Emission>(
    model: &Hmm<D>,
    fb: &ForwardBackward,
    policy: ZeroOccupancyPolicy,
) -> Vec<Vec<f64>> {
    let k = model.n_states();
    // the final step has no outgoing transition
    let n_transitions = fb.log_xi.len();

    (0..k)
        .map(|j| {
            let log_occupancy =
                log_sum_exp_iter(fb.log_gamma[..n_transitions].iter().map(|g| g[j]));
            if log_occupancy.is_nan() || log_occupancy <= MIN_LOG_OCCUPANCY {
                warn!(state = j, log_occupancy, %policy, "zero-occupancy transition row");
                return match policy {
                    ZeroOccupancyPolicy::KeepPrevious => model.transition()[j].clone(),
                    ZeroOccupancyPolicy::Uniform => vec![1.0 / k as f64; k],
                };
            }
            let row = (0..k)
                .map(|col| {
                    let log_count = log_sum_exp_iter(fb.log_xi.iter().map(|xi| xi[j][col]));
                    (log_count - log_occupancy).exp()
                })
                .collect();
            normalized(row)
        })
        .collect()
}

fn reestimate_emissions<D: Emission>(
    model: &Hmm<D>,
    observations: &[D::Observation],
    fb: &ForwardBackward,
) -> Result<Vec<D>> {
    model
        .emissions()
        .iter()
        .enumerate()
        .map(|(state, current)| {
            let weights: Vec<f64> = fb.log_gamma.iter().map(|g| g[state].exp()).collect();
            match current.fit_weighted(observations, &weights) {
                Ok(next) => Ok(next),
                Err(err @ (FitError::InsufficientWeight { .. } | FitError::Degenerate { .. })) => {
                    warn!(state, error = %err, "keeping previous emission");
                    Ok(current.clone())
                }
                Err(source) => Err(HmmError::EmissionFit { state, source }),
            }
        })
        .collect()
}

/// Rescale non-negative weights to sum to one (absorbs rounding drift).
fn normalized(mut values: Vec<f64>) -> Vec<f64> {
    let total: f64 = values.iter().sum();
    if total > 0.0 && total.is_finite() {
        for v in values.iter_mut() {
            *v /= total;
        }
    }
    values
}
