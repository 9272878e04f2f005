//! The two-state Gaussian reference scenario.
//!
//! Simulate from a known model, decode the simulated observations against
//! it, then re-learn it with Baum-Welch from a deliberately wrong start.
//! Used by `hmm scenario` and by the end-to-end tests.

use crate::distributions::Normal;
use crate::error::Result;
use crate::inference::{decode, fit, FitConfig, FitStatus};
use crate::model::Hmm;
use crate::sampler::{simulate, Trajectory};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tracing::info;

/// K=2, uniform start, sticky transitions, unit-variance emissions at 0 and 10.
pub fn reference_model() -> Result<Hmm<Normal>> {
    Ok(Hmm::with_uniform_initial(
        vec![vec![0.9, 0.1], vec![0.1, 0.9]],
        vec![Normal::new(0.0, 1.0)?, Normal::new(10.0, 1.0)?],
    )?)
}

/// Starting point for re-learning [`reference_model`].
pub fn perturbed_model() -> Result<Hmm<Normal>> {
    Ok(Hmm::new(
        vec![0.6, 0.4],
        vec![vec![0.7, 0.3], vec![0.4, 0.6]],
        vec![Normal::new(1.5, 2.0)?, Normal::new(8.0, 2.0)?],
    )?)
}

/// Learned parameters of a scalar Gaussian HMM.
#[derive(Debug, Clone, Serialize)]
pub struct GaussianParameters {
    pub initial: Vec<f64>,
    pub transition: Vec<Vec<f64>>,
    pub means: Vec<f64>,
    pub std_devs: Vec<f64>,
}

impl From<&Hmm<Normal>> for GaussianParameters {
    fn from(hmm: &Hmm<Normal>) -> Self {
        Self {
            initial: hmm.initial().to_vec(),
            transition: hmm.transition().to_vec(),
            means: hmm.emissions().iter().map(|d| d.mean()).collect(),
            std_devs: hmm.emissions().iter().map(|d| d.std_dev()).collect(),
        }
    }
}

/// Everything one scenario run produces; the `hmm scenario` payload.
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    pub length: usize,
    pub seed: u64,
    /// Per-step agreement of the Viterbi path with the simulated states.
    pub decode_accuracy: f64,
    pub decode_log_prob: f64,
    pub status: FitStatus,
    pub iterations: usize,
    pub loglikelihoods: Vec<f64>,
    pub fitted: GaussianParameters,
    /// Largest absolute transition-probability error against the generator.
    pub transition_error: f64,
    /// Largest absolute mean error against the generator.
    pub mean_error: f64,
}

/// Simulate `length` steps with `seed` and return the simulated trajectory.
pub fn simulate_reference(length: usize, seed: u64) -> Result<Trajectory<f64>> {
    let mut rng = StdRng::seed_from_u64(seed);
    simulate(&reference_model()?, length, None, &mut rng)
}

/// Run simulate → decode → fit end to end.
pub fn run(length: usize, seed: u64, config: &FitConfig) -> Result<ScenarioReport> {
    let truth = reference_model()?;
    let trajectory = simulate_reference(length, seed)?;

    let decoded = decode(&truth, &trajectory.observations)?;
    let decode_accuracy = decoded.accuracy(&trajectory.states);

    let result = fit(&perturbed_model()?, &trajectory.observations, config)?;
    let fitted = GaussianParameters::from(&result.model);
    let reference = GaussianParameters::from(&truth);

    let transition_error = fitted
        .transition
        .iter()
        .flatten()
        .zip(reference.transition.iter().flatten())
        .map(|(a, b)| (a - b).abs())
        .fold(0.0, f64::max);
    let mean_error = fitted
        .means
        .iter()
        .zip(&reference.means)
        .map(|(a, b)| (a - b).abs())
        .fold(0.0, f64::max);

    info!(
        length,
        seed,
        decode_accuracy,
        iterations = result.iterations,
        transition_error,
        mean_error,
        "scenario complete"
    );

    Ok(ScenarioReport {
        length,
        seed,
        decode_accuracy,
        decode_log_prob: decoded.log_prob,
        status: result.status,
        iterations: result.iterations,
        loglikelihoods: result.loglikelihoods,
        fitted,
        transition_error,
        mean_error,
    })
}
