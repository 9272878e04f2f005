//! Forward simulation of latent paths and observations.
//!
//! All randomness comes from the caller's RNG, so a seeded generator
//! reproduces the same trajectory bit for bit.

use crate::distributions::Emission;
use crate::error::Result;
use crate::model::Hmm;
use rand::Rng;
use serde::Serialize;
use tracing::debug;

/// A simulated latent path and the observations it emitted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trajectory<O> {
    pub states: Vec<usize>,
    pub observations: Vec<O>,
}

impl<O> Trajectory<O> {
    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

/// Draw an index from `probs` by cumulative sum against one uniform draw.
///
/// Zero-probability entries are never returned. If rounding leaves the
/// draw past the final cumulative sum, the last index with positive mass
/// is returned.
pub fn sample_categorical<R: Rng + ?Sized>(probs: &[f64], rng: &mut R) -> usize {
    let u: f64 = rng.random::<f64>();
    let mut cumulative = 0.0;
    let mut last_positive = 0;
    for (i, &p) in probs.iter().enumerate() {
        if p <= 0.0 {
            continue;
        }
        cumulative += p;
        last_positive = i;
        if u < cumulative {
            return i;
        }
    }
    last_positive
}

/// Simulate `length` steps of the chain and its emissions.
///
/// `initial_state` pins `z[0]`; otherwise it is drawn from the model's
/// initial distribution.
pub fn simulate<D: Emission, R: Rng + ?Sized>(
    hmm: &Hmm<D>,
    length: usize,
    initial_state: Option<usize>,
    rng: &mut R,
) -> Result<Trajectory<D::Observation>> {
    if let Some(state) = initial_state {
        hmm.check_state(state)?;
    }
    if length == 0 {
        return Ok(Trajectory {
            states: Vec::new(),
            observations: Vec::new(),
        });
    }

    let mut states = Vec::with_capacity(length);
    let first = match initial_state {
        Some(state) => state,
        None => sample_categorical(hmm.initial(), rng),
    };
    states.push(first);
    for t in 1..length {
        let next = sample_categorical(&hmm.transition()[states[t - 1]], rng);
        states.push(next);
    }

    let observations = emit(hmm, &states, rng);
    debug!(length, initial_state = first, "simulated trajectory");
    Ok(Trajectory {
        states,
        observations,
    })
}

/// Draw observations for a fixed latent path.
pub fn simulate_given_path<D: Emission, R: Rng + ?Sized>(
    hmm: &Hmm<D>,
    path: &[usize],
    rng: &mut R,
) -> Result<Vec<D::Observation>> {
    for &state in path {
        hmm.check_state(state)?;
    }
    Ok(emit(hmm, path, rng))
}

fn emit<D: Emission, R: Rng + ?Sized>(
    hmm: &Hmm<D>,
    path: &[usize],
    rng: &mut R,
) -> Vec<D::Observation> {
    path.iter()
        .map(|&state| hmm.emissions()[state].sample(rng))
        .collect()
}
