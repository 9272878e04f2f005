//! Error types for the HMM engine.
//!
//! Structural problems (a malformed model, observations of the wrong shape)
//! are reported eagerly, before any recursion runs, and always carry the
//! offending indices. Numerical degeneracy (a sequence with zero probability
//! under the model) is *not* an error: it surfaces as a `-inf`
//! log-likelihood in the returned values.

use thiserror::Error;

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, HmmError>;

/// Violations of the model invariants.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("model has no states")]
    NoStates,

    #[error("initial distribution has length {got}, expected {expected}")]
    InitialLength { expected: usize, got: usize },

    #[error("initial probability {index} is invalid: {value}")]
    InitialEntry { index: usize, value: f64 },

    #[error("initial distribution sums to {sum}, expected 1.0")]
    InitialSum { sum: f64 },

    #[error("transition matrix has {got} rows, expected {expected}")]
    TransitionRows { expected: usize, got: usize },

    #[error("transition row {row} has {got} columns, expected {expected}")]
    TransitionColumns { row: usize, expected: usize, got: usize },

    #[error("transition probability [{row},{col}] is invalid: {value}")]
    TransitionEntry { row: usize, col: usize, value: f64 },

    #[error("transition row {row} sums to {sum}, expected 1.0")]
    TransitionRowSum { row: usize, sum: f64 },

    #[error("got {got} emission distributions for {expected} states")]
    EmissionCount { expected: usize, got: usize },

    #[error("emission {state} has event dimension {got}, expected {expected}")]
    EmissionDimension {
        state: usize,
        expected: usize,
        got: usize,
    },
}

impl ValidationError {
    /// Stable error code for structured reporting.
    pub fn code(&self) -> u32 {
        match self {
            ValidationError::NoStates => 10,
            ValidationError::InitialLength { .. } => 11,
            ValidationError::InitialEntry { .. } => 12,
            ValidationError::InitialSum { .. } => 13,
            ValidationError::TransitionRows { .. } => 14,
            ValidationError::TransitionColumns { .. } => 15,
            ValidationError::TransitionEntry { .. } => 16,
            ValidationError::TransitionRowSum { .. } => 17,
            ValidationError::EmissionCount { .. } => 18,
            ValidationError::EmissionDimension { .. } => 19,
        }
    }
}

/// Failures of a weighted maximum-likelihood refit of one distribution.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FitError {
    #[error("total weight {total} is too small to fit")]
    InsufficientWeight { total: f64 },

    #[error("{observations} observations but {weights} weights")]
    LengthMismatch { observations: usize, weights: usize },

    #[error("fitted {parameter} is degenerate: {value}")]
    Degenerate { parameter: &'static str, value: f64 },

    #[error("invalid {parameter}: {value}")]
    InvalidParameter { parameter: &'static str, value: f64 },
}

/// Configuration errors (file parsing and semantic checks).
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error reading {path}: {message}")]
    Io { path: String, message: String },

    #[error("parse error: {0}")]
    Parse(String),

    #[error("invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

/// Unified error type for engine entry points.
#[derive(Error, Debug)]
pub enum HmmError {
    #[error("invalid model: {0}")]
    Validation(#[from] ValidationError),

    #[error("observation {index} has dimension {got}, expected {expected}")]
    DimensionMismatch {
        index: usize,
        expected: usize,
        got: usize,
    },

    #[error("observation sequence is empty")]
    EmptyObservations,

    #[error("observation {index} has an undefined log-density under state {state}")]
    InvalidObservation { index: usize, state: usize },

    #[error("state {state} is out of range for a model with {n_states} states")]
    StateOutOfRange { state: usize, n_states: usize },

    #[error("failed to refit emission {state}: {source}")]
    EmissionFit {
        state: usize,
        #[source]
        source: FitError,
    },

    #[error("invalid distribution parameters: {0}")]
    Distribution(#[from] FitError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl HmmError {
    /// Whether the error stems from caller input rather than the model.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            HmmError::DimensionMismatch { .. }
                | HmmError::EmptyObservations
                | HmmError::InvalidObservation { .. }
                | HmmError::StateOutOfRange { .. }
                | HmmError::Distribution(_)
        )
    }
}
