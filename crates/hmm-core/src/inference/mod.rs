//! Inference and learning over a fixed model.
//!
//! - [`forward_backward`]: filtering/smoothing posteriors and the sequence log-likelihood
//! - [`viterbi`]: the most probable latent path
//! - [`baum_welch`]: EM re-estimation of all parameters
//!
//! All recursions run in log-space; nothing here rescales probabilities.

pub mod baum_welch;
pub mod forward_backward;
pub mod viterbi;

pub use baum_welch::{fit, FitConfig, FitResult, FitStatus, ZeroOccupancyPolicy};
pub use forward_backward::{
    backward, forward, forward_backward, log_likelihoods, loglikelihood, posteriors,
    ForwardBackward,
};
pub use viterbi::{decode, ViterbiPath};
