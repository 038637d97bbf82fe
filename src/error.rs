//! Error types for pendular.
//!
//! Every fallible operation returns `Result<T, PendulumError>` instead of
//! panicking. Input and integration failures are terminal for a run: the
//! caller re-collects parameters and tries again.

use thiserror::Error;

/// Result type alias for pendular operations.
pub type PendulumResult<T> = Result<T, PendulumError>;

/// Unified error type for all pendular operations.
#[derive(Debug, Error)]
pub enum PendulumError {
    // ===== Input Errors =====
    /// A supplied parameter is non-numeric, non-finite, or out of range.
    #[error("Invalid input for '{field}': {reason}")]
    InputValidation {
        /// Name of the offending field (e.g. `l1`).
        field: String,
        /// Why the value was rejected.
        reason: String,
    },

    // ===== Solver Errors =====
    /// The solver could not produce a finite solution over the horizon.
    #[error("Integration failed at t = {time:.6}s: {reason}")]
    Integration {
        /// Description of the failure.
        reason: String,
        /// Simulation time reached before the failure.
        time: f64,
    },

    // ===== Configuration Errors =====
    /// Invalid configuration parameter.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    /// YAML parsing error.
    #[error("YAML parsing error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    /// Validation error.
    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    // ===== I/O Errors =====
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PendulumError {
    /// Create an input validation error for a named field.
    #[must_use]
    pub fn input(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InputValidation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create an integration error at simulation time `time`.
    #[must_use]
    pub fn integration(reason: impl Into<String>, time: f64) -> Self {
        Self::Integration {
            reason: reason.into(),
            time,
        }
    }

    /// Create a configuration error with a message.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Check if this error was raised while validating user input.
    #[must_use]
    pub const fn is_input_error(&self) -> bool {
        matches!(self, Self::InputValidation { .. })
    }

    /// Check if this error was raised by the solver.
    #[must_use]
    pub const fn is_integration_error(&self) -> bool {
        matches!(self, Self::Integration { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_error_display() {
        let err = PendulumError::input("l1", "must be positive, got 0");
        assert!(err.is_input_error());
        assert!(!err.is_integration_error());
        let msg = err.to_string();
        assert!(msg.contains("Invalid input"));
        assert!(msg.contains("l1"));
        assert!(msg.contains("must be positive"));
    }

    #[test]
    fn test_integration_error_display() {
        let err = PendulumError::integration("non-finite state", 3.25);
        assert!(err.is_integration_error());
        assert!(!err.is_input_error());
        let msg = err.to_string();
        assert!(msg.contains("Integration failed"));
        assert!(msg.contains("3.250000"));
        assert!(msg.contains("non-finite state"));
    }

    #[test]
    fn test_error_config() {
        let err = PendulumError::config("invalid parameter");
        assert!(!err.is_input_error());
        assert!(!err.is_integration_error());
        let msg = err.to_string();
        assert!(msg.contains("Configuration error"));
        assert!(msg.contains("invalid parameter"));
    }

    #[test]
    fn test_error_io_from() {
        let err: PendulumError = std::io::Error::other("file not found").into();
        let msg = err.to_string();
        assert!(msg.contains("I/O error"));
        assert!(msg.contains("file not found"));
    }

    #[test]
    fn test_error_yaml_from() {
        let parse: Result<u32, _> = serde_yaml::from_str("[unclosed");
        let err: PendulumError = parse.unwrap_err().into();
        assert!(err.to_string().contains("YAML parsing error"));
    }

    #[test]
    fn test_error_debug() {
        let err = PendulumError::config("test");
        let debug = format!("{:?}", err);
        assert!(debug.contains("Config"));
    }
}
