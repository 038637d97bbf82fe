//! Per-sample anomaly detection.
//!
//! The guard inspects every sample the integrator emits:
//!
//! 1. **Non-finite values**: NaN or Inf in any state variable stops the run.
//! 2. **Energy drift**: deviation of total mechanical energy from the first
//!    sample, relative to the larger of `|E0|` and a characteristic energy
//!    of the system. The double pendulum is conservative, so drift measures
//!    integration error; it is logged, never fatal.

use serde::{Deserialize, Serialize};

use crate::engine::state::State;
use crate::error::{PendulumError, PendulumResult};

/// Severity of a guard finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ViolationSeverity {
    /// Within tolerance.
    Acceptable,
    /// Energy drift above the warning threshold (logged, run continues).
    Warning,
}

/// Guard configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GuardConfig {
    /// Relative energy drift above which a warning is logged.
    pub energy_warning: f64,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            energy_warning: 0.01,
        }
    }
}

/// Summary of a guarded run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GuardReport {
    /// Energy of the first inspected sample (J).
    pub initial_energy: f64,
    /// Largest relative energy drift seen.
    pub max_energy_drift: f64,
    /// Samples whose drift exceeded the warning threshold.
    pub warnings: usize,
}

/// Guard for one integration run.
#[derive(Debug, Clone)]
pub struct StepGuard {
    config: GuardConfig,
    energy_scale: f64,
    initial_energy: Option<f64>,
    max_drift: f64,
    warnings: usize,
}

impl StepGuard {
    /// Create a new guard.
    ///
    /// `energy_scale` is a characteristic energy of the system (J) that
    /// bounds the drift denominator away from zero when `E0` vanishes.
    #[must_use]
    pub const fn new(config: GuardConfig, energy_scale: f64) -> Self {
        Self {
            config,
            energy_scale,
            initial_energy: None,
            max_drift: 0.0,
            warnings: 0,
        }
    }

    /// Inspect one sample.
    ///
    /// # Errors
    ///
    /// Returns `Integration` if the state or its energy is non-finite.
    pub fn check(&mut self, time: f64, state: &State, energy: f64) -> PendulumResult<ViolationSeverity> {
        if let Some(name) = state.first_non_finite() {
            return Err(PendulumError::integration(
                format!("non-finite value in {name}"),
                time,
            ));
        }
        if !energy.is_finite() {
            return Err(PendulumError::integration("non-finite energy", time));
        }

        let Some(initial) = self.initial_energy else {
            self.initial_energy = Some(energy);
            return Ok(ViolationSeverity::Acceptable);
        };

        let drift = relative_drift(initial, energy, self.energy_scale);
        self.max_drift = self.max_drift.max(drift);

        if drift > self.config.energy_warning {
            if self.warnings == 0 {
                tracing::warn!(
                    time,
                    drift,
                    threshold = self.config.energy_warning,
                    "energy drift exceeds warning threshold"
                );
            }
            self.warnings += 1;
            Ok(ViolationSeverity::Warning)
        } else {
            Ok(ViolationSeverity::Acceptable)
        }
    }

    /// Summary so far.
    #[must_use]
    pub fn report(&self) -> GuardReport {
        GuardReport {
            initial_energy: self.initial_energy.unwrap_or(0.0),
            max_energy_drift: self.max_drift,
            warnings: self.warnings,
        }
    }

    /// Current configuration.
    #[must_use]
    pub const fn config(&self) -> &GuardConfig {
        &self.config
    }
}

/// Change from `initial` to `current`, relative to `max(|initial|, scale)`.
#[must_use]
pub fn relative_drift(initial: f64, current: f64, scale: f64) -> f64 {
    let denominator = initial.abs().max(scale).max(f64::EPSILON);
    (current - initial).abs() / denominator
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_sample_sets_baseline() {
        let mut guard = StepGuard::new(GuardConfig::default(), 1.0);
        let sev = guard.check(0.0, &State::rest(), -29.43).unwrap();
        assert_eq!(sev, ViolationSeverity::Acceptable);
        assert!((guard.report().initial_energy + 29.43).abs() < f64::EPSILON);
    }

    #[test]
    fn test_drift_warning() {
        let mut guard = StepGuard::new(GuardConfig { energy_warning: 0.01 }, 1.0);
        guard.check(0.0, &State::rest(), 10.0).unwrap();
        assert_eq!(
            guard.check(0.1, &State::rest(), 10.05).unwrap(),
            ViolationSeverity::Acceptable
        );
        assert_eq!(
            guard.check(0.2, &State::rest(), 10.5).unwrap(),
            ViolationSeverity::Warning
        );
        let report = guard.report();
        assert_eq!(report.warnings, 1);
        assert!((report.max_energy_drift - 0.05).abs() < 1e-12);
    }

    #[test]
    fn test_non_finite_state_is_fatal() {
        let mut guard = StepGuard::new(GuardConfig::default(), 1.0);
        let err = guard
            .check(1.5, &State::new(0.0, 0.0, f64::NAN, 0.0), 1.0)
            .unwrap_err();
        assert!(err.is_integration_error());
        assert!(err.to_string().contains("theta2"));
    }

    #[test]
    fn test_non_finite_energy_is_fatal() {
        let mut guard = StepGuard::new(GuardConfig::default(), 1.0);
        assert!(guard.check(0.0, &State::rest(), f64::INFINITY).is_err());
    }

    #[test]
    fn test_relative_drift_zero_baseline() {
        assert!(relative_drift(0.0, 0.0, 29.43).abs() < f64::EPSILON);
        assert!((relative_drift(0.0, 0.2943, 29.43) - 0.01).abs() < 1e-12);
        assert!((relative_drift(-100.0, -99.0, 29.43) - 0.01).abs() < 1e-12);
    }

    #[test]
    fn test_near_zero_baseline_uses_scale() {
        let mut guard = StepGuard::new(GuardConfig { energy_warning: 0.01 }, 29.43);
        guard.check(0.0, &State::rest(), 1e-15).unwrap();
        assert_eq!(
            guard.check(0.1, &State::rest(), 1e-6).unwrap(),
            ViolationSeverity::Acceptable
        );
        assert_eq!(
            guard.check(0.2, &State::rest(), 1.0).unwrap(),
            ViolationSeverity::Warning
        );
        assert_eq!(guard.report().warnings, 1);
    }

    #[test]
    fn test_severity_ordering() {
        assert!(ViolationSeverity::Acceptable < ViolationSeverity::Warning);
    }
}
