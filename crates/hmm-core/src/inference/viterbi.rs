//! Viterbi decoding: the single most probable latent path.
//!
//! Max-product dynamic program in log-space with backpointers:
//!
//! ```text
//! delta[0][k] = log pi_k + log b_k(y_0)
//! delta[t][k] = max_j (delta[t-1][j] + log a_jk) + log b_k(y_t)
//! psi[t][k]   = argmax_j (delta[t-1][j] + log a_jk)
//! ```
//!
//! Ties resolve to the lowest state index everywhere (recursion and
//! terminal state), so decoding is reproducible. When every path has zero
//! probability the tie-broken path is still returned, with
//! `log_prob = -inf`.

use crate::distributions::Emission;
use crate::error::Result;
use crate::inference::forward_backward::log_likelihoods;
use crate::model::Hmm;
use hmm_math::argmax;
use serde::Serialize;
use tracing::debug;

/// Decoded path and its joint log-probability `log P(y, z*)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViterbiPath {
    pub path: Vec<usize>,
    pub log_prob: f64,
}

impl ViterbiPath {
    /// Fraction of steps on which the path agrees with `reference`.
    ///
    /// Compares over the shorter of the two lengths; 0.0 for empty input.
    pub fn accuracy(&self, reference: &[usize]) -> f64 {
        let n = self.path.len().min(reference.len());
        if n == 0 {
            return 0.0;
        }
        let hits = self
            .path
            .iter()
            .zip(reference)
            .filter(|(a, b)| a == b)
            .count();
        hits as f64 / n as f64
    }
}

/// Most probable state path for `observations`.
pub fn decode<D: Emission>(hmm: &Hmm<D>, observations: &[D::Observation]) -> Result<ViterbiPath> {
    let loglik = log_likelihoods(hmm, observations)?;
    let decoded = decode_from_loglik(hmm, &loglik);
    debug!(
        n_steps = decoded.path.len(),
        log_prob = decoded.log_prob,
        "viterbi decode complete"
    );
    Ok(decoded)
}

fn decode_from_loglik<D: Emission>(hmm: &Hmm<D>, loglik: &[Vec<f64>]) -> ViterbiPath {
    let k = hmm.n_states();
    let t_len = loglik.len();
    let log_a = hmm.log_transition();

    let mut delta: Vec<f64> = hmm
        .log_initial()
        .iter()
        .zip(&loglik[0])
        .map(|(pi, l)| pi + l)
        .collect();
    let mut next = vec![0.0; k];
    let mut scores = vec![0.0; k];
    // psi[0] is never read
    let mut psi = vec![vec![0usize; k]; t_len];

    for t in 1..t_len {
        for j in 0..k {
            for (i, score) in scores.iter_mut().enumerate() {
                *score = delta[i] + log_a[i][j];
            }
            let (best_i, best) = argmax(&scores);
            psi[t][j] = best_i;
            next[j] = best + loglik[t][j];
        }
        std::mem::swap(&mut delta, &mut next);
    }

    let (last, log_prob) = argmax(&delta);
    let mut path = vec![0usize; t_len];
    path[t_len - 1] = last;
    for t in (0..t_len - 1).rev() {
        path[t] = psi[t + 1][path[t + 1]];
    }

    ViterbiPath { path, log_prob }
}
