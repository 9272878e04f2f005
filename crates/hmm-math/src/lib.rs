//! Log-domain math utilities for hidden Markov model inference.
//!
//! Everything here is a pure function: no shared state, safe to call from
//! any number of concurrent inference runs.

pub mod math;

pub use math::density::*;
pub use math::stable::*;
