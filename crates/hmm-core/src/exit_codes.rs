//! Process exit codes for the `hmm` binary.
//!
//! - 0: success
//! - 2: command-line usage error (clap's own code)
//! - 10-19: configuration and input errors
//! - 20-29: inference failures

use crate::error::HmmError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    Ok = 0,
    Usage = 2,
    /// Config file unreadable, unparseable or semantically invalid.
    ConfigError = 10,
    /// Model or observations rejected by validation.
    InputError = 11,
    /// Inference or training failed on valid input.
    InferenceError = 20,
    /// Writing the output payload failed.
    IoError = 21,
}

impl ExitCode {
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    pub fn is_error(self) -> bool {
        (self as i32) >= 10
    }

    /// Stable name for JSON error payloads.
    pub fn code_name(&self) -> &'static str {
        match self {
            ExitCode::Ok => "OK",
            ExitCode::Usage => "ERR_USAGE",
            ExitCode::ConfigError => "ERR_CONFIG",
            ExitCode::InputError => "ERR_INPUT",
            ExitCode::InferenceError => "ERR_INFERENCE",
            ExitCode::IoError => "ERR_IO",
        }
    }
}

impl From<&HmmError> for ExitCode {
    fn from(err: &HmmError) -> Self {
        match err {
            HmmError::Config(_) => ExitCode::ConfigError,
            HmmError::Validation(_) => ExitCode::InputError,
            e if e.is_input_error() => ExitCode::InputError,
            _ => ExitCode::InferenceError,
        }
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}

impl std::fmt::Display for ExitCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.code_name(), self.as_i32())
    }
}
