//! Hidden Markov model engine.
//!
//! This library provides:
//! - A validated model container ([`Hmm`]) generic over the emission family
//! - Log-space forward-backward posteriors and sequence log-likelihood
//! - Viterbi decoding
//! - Baum-Welch parameter re-estimation
//! - Seeded forward simulation
//!
//! Emission families plug in through [`distributions::Emission`]. The
//! `hmm` binary in `main.rs` is a thin wrapper over these entry points.

pub mod config;
pub mod distributions;
pub mod error;
pub mod exit_codes;
pub mod inference;
pub mod logging;
pub mod model;
pub mod sampler;
pub mod scenario;

pub use config::EngineConfig;
pub use distributions::Emission;
pub use error::{ConfigError, FitError, HmmError, Result, ValidationError};
pub use inference::{
    decode, fit, forward_backward, loglikelihood, posteriors, FitConfig, FitResult, FitStatus,
    ForwardBackward, ViterbiPath, ZeroOccupancyPolicy,
};
pub use model::{assert_hmm, Hmm};
pub use sampler::{sample_categorical, simulate, simulate_given_path, Trajectory};
