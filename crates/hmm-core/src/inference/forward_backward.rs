//! Log-space forward-backward recursion.
//!
//! For an observation sequence `y_0..y_{T-1}` and a model with K states:
//!
//! - `log_alpha[t][k] = log P(y_0..y_t, z_t = k)`
//! - `log_beta[t][k]  = log P(y_{t+1}..y_{T-1} | z_t = k)`
//! - `log_gamma[t][k] = log P(z_t = k | y)`
//! - `log_xi[t][j][k] = log P(z_t = j, z_{t+1} = k | y)`
//!
//! All reductions over states use a running-max log-sum-exp, so sequences
//! of any length stay representable. Cost is O(T·K²) time, O(T·K²) space
//! for the pairwise posteriors.
//!
//! A sequence with zero probability under the model is not an error: the
//! result carries `loglikelihood = -inf` and [`ForwardBackward::is_degenerate`]
//! returns true. Posteriors are undefined in that case and are filled with NaN.

use crate::distributions::Emission;
use crate::error::{HmmError, Result};
use crate::model::Hmm;
use hmm_math::{log_sum_exp, log_sum_exp_iter};
use serde::Serialize;
use tracing::debug;

/// All artifacts of one forward-backward pass.
#[derive(Debug, Clone, Serialize)]
pub struct ForwardBackward {
    /// Forward messages, T×K.
    pub log_alpha: Vec<Vec<f64>>,
    /// Backward messages, T×K.
    pub log_beta: Vec<Vec<f64>>,
    /// State posteriors, T×K.
    pub log_gamma: Vec<Vec<f64>>,
    /// Pairwise posteriors, (T-1)×K×K; empty when T = 1.
    pub log_xi: Vec<Vec<Vec<f64>>>,
    /// log P(y) under the model.
    pub loglikelihood: f64,
}

impl ForwardBackward {
    /// Sequence length T.
    pub fn n_steps(&self) -> usize {
        self.log_alpha.len()
    }

    /// Number of states K.
    pub fn n_states(&self) -> usize {
        self.log_alpha.first().map_or(0, Vec::len)
    }

    /// True when the sequence has zero probability under the model.
    pub fn is_degenerate(&self) -> bool {
        !self.loglikelihood.is_finite()
    }

    /// State posteriors in the linear domain.
    pub fn posteriors(&self) -> Vec<Vec<f64>> {
        self.log_gamma
            .iter()
            .map(|row| row.iter().map(|g| g.exp()).collect())
            .collect()
    }

    /// Per-step most probable state under the marginal posteriors
    /// (lowest index on ties). Not a path: see [`crate::decode`] for that.
    pub fn marginal_states(&self) -> Vec<usize> {
        self.log_gamma
            .iter()
            .map(|row| hmm_math::argmax(row).0)
            .collect()
    }
}

/// Per-state emission log-densities, T×K.
///
/// Validates the sequence first. A NaN density (e.g. a NaN observation)
/// is reported as [`HmmError::InvalidObservation`] rather than passed on.
pub fn log_likelihoods<D: Emission>(
    hmm: &Hmm<D>,
    observations: &[D::Observation],
) -> Result<Vec<Vec<f64>>> {
    hmm.check_observations(observations)?;
    let loglik = emission_log_densities(hmm, observations);
    for (index, row) in loglik.iter().enumerate() {
        if let Some(state) = row.iter().position(|l| l.is_nan()) {
            return Err(HmmError::InvalidObservation { index, state });
        }
    }
    Ok(loglik)
}

/// Unchecked T×K densities for callers that already validated the sequence.
pub(crate) fn emission_log_densities<D: Emission>(
    hmm: &Hmm<D>,
    observations: &[D::Observation],
) -> Vec<Vec<f64>> {
    observations
        .iter()
        .map(|x| hmm.emissions().iter().map(|d| d.log_density(x)).collect())
        .collect()
}

/// Forward pass only: `(log_alpha, loglikelihood)`.
pub fn forward<D: Emission>(
    hmm: &Hmm<D>,
    observations: &[D::Observation],
) -> Result<(Vec<Vec<f64>>, f64)> {
    let loglik = log_likelihoods(hmm, observations)?;
    let log_alpha = forward_messages(hmm, &loglik);
    let total = terminal_loglikelihood(&log_alpha);
    Ok((log_alpha, total))
}

/// Backward pass only: `log_beta`.
pub fn backward<D: Emission>(
    hmm: &Hmm<D>,
    observations: &[D::Observation],
) -> Result<Vec<Vec<f64>>> {
    let loglik = log_likelihoods(hmm, observations)?;
    Ok(backward_messages(hmm, &loglik))
}

/// log P(y) under the model, from the forward pass.
pub fn loglikelihood<D: Emission>(hmm: &Hmm<D>, observations: &[D::Observation]) -> Result<f64> {
    forward(hmm, observations).map(|(_, total)| total)
}

/// State posteriors `P(z_t = k | y)` in the linear domain, T×K.
pub fn posteriors<D: Emission>(
    hmm: &Hmm<D>,
    observations: &[D::Observation],
) -> Result<Vec<Vec<f64>>> {
    forward_backward(hmm, observations).map(|fb| fb.posteriors())
}

/// Full forward-backward pass.
pub fn forward_backward<D: Emission>(
    hmm: &Hmm<D>,
    observations: &[D::Observation],
) -> Result<ForwardBackward> {
    let loglik = log_likelihoods(hmm, observations)?;
    let fb = forward_backward_from_loglik(hmm, &loglik);
    debug!(
        n_steps = fb.n_steps(),
        n_states = fb.n_states(),
        loglikelihood = fb.loglikelihood,
        "forward-backward complete"
    );
    Ok(fb)
}

/// Forward-backward over precomputed emission log-densities.
///
/// `loglik` must be non-empty with K columns; the public entry points
/// guarantee this.
pub(crate) fn forward_backward_from_loglik<D: Emission>(
    hmm: &Hmm<D>,
    loglik: &[Vec<f64>],
) -> ForwardBackward {
    let log_alpha = forward_messages(hmm, loglik);
    let log_beta = backward_messages(hmm, loglik);
    let total = terminal_loglikelihood(&log_alpha);
    let (log_gamma, log_xi) = if total.is_finite() {
        (
            state_posteriors(&log_alpha, &log_beta, total),
            pairwise_posteriors(hmm, loglik, &log_alpha, &log_beta, total),
        )
    } else {
        let k = hmm.n_states();
        let t_len = loglik.len();
        (
            vec![vec![f64::NAN; k]; t_len],
            vec![vec![vec![f64::NAN; k]; k]; t_len.saturating_sub(1)],
        )
    };
    ForwardBackward {
        log_alpha,
        log_beta,
        log_gamma,
        log_xi,
        loglikelihood: total,
    }
}

fn forward_messages<D: Emission>(hmm: &Hmm<D>, loglik: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let k = hmm.n_states();
    let log_a = hmm.log_transition();
    let mut log_alpha = Vec::with_capacity(loglik.len());

    let first: Vec<f64> = hmm
        .log_initial()
        .iter()
        .zip(&loglik[0])
        .map(|(pi, l)| pi + l)
        .collect();
    log_alpha.push(first);

    for obs_ll in &loglik[1..] {
        let prev = &log_alpha[log_alpha.len() - 1];
        let next: Vec<f64> = (0..k)
            .map(|j| log_sum_exp_iter((0..k).map(|i| prev[i] + log_a[i][j])) + obs_ll[j])
            .collect();
        log_alpha.push(next);
    }
    log_alpha
}

fn backward_messages<D: Emission>(hmm: &Hmm<D>, loglik: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let k = hmm.n_states();
    let t_len = loglik.len();
    let log_a = hmm.log_transition();
    let mut log_beta = vec![vec![0.0; k]; t_len];

    for t in (0..t_len.saturating_sub(1)).rev() {
        let (head, tail) = log_beta.split_at_mut(t + 1);
        let next = &tail[0];
        let obs_ll = &loglik[t + 1];
        for (i, out) in head[t].iter_mut().enumerate() {
            *out = log_sum_exp_iter((0..k).map(|j| log_a[i][j] + obs_ll[j] + next[j]));
        }
    }
    log_beta
}

fn terminal_loglikelihood(log_alpha: &[Vec<f64>]) -> f64 {
    log_alpha
        .last()
        .map_or(f64::NEG_INFINITY, |row| log_sum_exp(row))
}

fn state_posteriors(log_alpha: &[Vec<f64>], log_beta: &[Vec<f64>], total: f64) -> Vec<Vec<f64>> {
    log_alpha
        .iter()
        .zip(log_beta)
        .map(|(a, b)| a.iter().zip(b).map(|(x, y)| x + y - total).collect())
        .collect()
}

fn pairwise_posteriors<D: Emission>(
    hmm: &Hmm<D>,
    loglik: &[Vec<f64>],
    log_alpha: &[Vec<f64>],
    log_beta: &[Vec<f64>],
    total: f64,
) -> Vec<Vec<Vec<f64>>> {
    let log_a = hmm.log_transition();
    (0..loglik.len().saturating_sub(1))
        .map(|t| {
            log_alpha[t]
                .iter()
                .zip(log_a)
                .map(|(alpha_j, row)| {
                    row.iter()
                        .enumerate()
                        .map(|(k, a_jk)| {
                            alpha_j + a_jk + loglik[t + 1][k] + log_beta[t + 1][k] - total
                        })
                        .collect()
                })
                .collect()
        })
        .collect()
}
