//! Double pendulum equations of motion.
//!
//! Two point masses on massless rigid arms, the first hinged at a fixed
//! pivot and the second hinged at the first bob. Angles are measured from
//! the downward vertical; `y` points down.
//!
//! # Governing Equations
//!
//! With `c = cos(θ1 − θ2)`, `s = sin(θ1 − θ2)`:
//!
//! ```text
//! θ1' = z1
//! θ2' = z2
//! z1' = [m2 g sin θ2 c − m2 s (l1 z1² c + l2 z2²) − (m1+m2) g sin θ1] / (l1 (m1 + m2 s²))
//! z2' = [(m1+m2)(l1 z1² s − g sin θ2 + g sin θ1 c) + m2 l2 z2² s c] / (l2 (m1 + m2 s²))
//! ```
//!
//! The denominator `m1 + m2 s²` is at least `m1`, so it never vanishes for
//! positive masses.

use serde::{Deserialize, Serialize};

use crate::engine::solver::OdeSystem;
use crate::engine::state::{State, STATE_DIM};
use crate::error::{PendulumError, PendulumResult};

/// Standard gravity (m/s²).
pub const STANDARD_GRAVITY: f64 = 9.81;

/// Arm lengths and bob masses.
///
/// Only constructible through [`PendulumParameters::new`], which rejects
/// non-finite and non-positive values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawParameters")]
pub struct PendulumParameters {
    l1: f64,
    l2: f64,
    m1: f64,
    m2: f64,
}

#[derive(Deserialize)]
struct RawParameters {
    l1: f64,
    l2: f64,
    m1: f64,
    m2: f64,
}

impl TryFrom<RawParameters> for PendulumParameters {
    type Error = PendulumError;

    fn try_from(raw: RawParameters) -> PendulumResult<Self> {
        Self::new(raw.l1, raw.l2, raw.m1, raw.m2)
    }
}

impl PendulumParameters {
    /// Create validated parameters.
    ///
    /// # Errors
    ///
    /// Returns `InputValidation` naming the first length or mass that is
    /// non-finite or not strictly positive.
    pub fn new(l1: f64, l2: f64, m1: f64, m2: f64) -> PendulumResult<Self> {
        for (field, value) in [("l1", l1), ("l2", l2), ("m1", m1), ("m2", m2)] {
            require_positive(field, value)?;
        }
        Ok(Self { l1, l2, m1, m2 })
    }

    /// Length of arm 1 (m).
    #[must_use]
    pub const fn l1(&self) -> f64 {
        self.l1
    }

    /// Length of arm 2 (m).
    #[must_use]
    pub const fn l2(&self) -> f64 {
        self.l2
    }

    /// Mass of bob 1 (kg).
    #[must_use]
    pub const fn m1(&self) -> f64 {
        self.m1
    }

    /// Mass of bob 2 (kg).
    #[must_use]
    pub const fn m2(&self) -> f64 {
        self.m2
    }

    /// Combined arm length: the farthest bob 2 can be from the pivot.
    #[must_use]
    pub fn reach(&self) -> f64 {
        self.l1 + self.l2
    }
}

impl Default for PendulumParameters {
    fn default() -> Self {
        Self {
            l1: 1.0,
            l2: 1.0,
            m1: 1.0,
            m2: 1.0,
        }
    }
}

fn require_positive(field: &str, value: f64) -> PendulumResult<()> {
    if !value.is_finite() {
        return Err(PendulumError::input(field, format!("must be finite, got {value}")));
    }
    if value <= 0.0 {
        return Err(PendulumError::input(
            field,
            format!("must be strictly positive, got {value}"),
        ));
    }
    Ok(())
}

/// Double pendulum under uniform gravity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DoublePendulum {
    params: PendulumParameters,
    gravity: f64,
}

impl DoublePendulum {
    /// Create a model with explicit gravity.
    #[must_use]
    pub const fn new(params: PendulumParameters, gravity: f64) -> Self {
        Self { params, gravity }
    }

    /// Model with standard gravity.
    #[must_use]
    pub const fn with_standard_gravity(params: PendulumParameters) -> Self {
        Self::new(params, STANDARD_GRAVITY)
    }

    /// Physical parameters.
    #[must_use]
    pub const fn params(&self) -> &PendulumParameters {
        &self.params
    }

    /// Gravitational acceleration (m/s²).
    #[must_use]
    pub const fn gravity(&self) -> f64 {
        self.gravity
    }

    /// Time derivative of `state`: `(θ1', z1', θ2', z2')`.
    #[must_use]
    pub fn derivative(&self, state: &State) -> State {
        let State {
            theta1,
            z1,
            theta2,
            z2,
        } = *state;
        let PendulumParameters { l1, l2, m1, m2 } = self.params;
        let g = self.gravity;

        let (s, c) = (theta1 - theta2).sin_cos();
        let denom = m1 + m2 * s * s;

        let z1_dot = (m2 * g * theta2.sin() * c
            - m2 * s * (l1 * z1 * z1 * c + l2 * z2 * z2)
            - (m1 + m2) * g * theta1.sin())
            / (l1 * denom);
        let z2_dot = ((m1 + m2) * (l1 * z1 * z1 * s - g * theta2.sin() + g * theta1.sin() * c)
            + m2 * l2 * z2 * z2 * s * c)
            / (l2 * denom);

        State::new(z1, z1_dot, z2, z2_dot)
    }

    /// Kinetic energy (J).
    #[must_use]
    pub fn kinetic_energy(&self, state: &State) -> f64 {
        let PendulumParameters { l1, l2, m1, m2 } = self.params;
        let State {
            theta1,
            z1,
            theta2,
            z2,
        } = *state;
        0.5 * (m1 + m2) * l1 * l1 * z1 * z1
            + 0.5 * m2 * l2 * l2 * z2 * z2
            + m2 * l1 * l2 * z1 * z2 * (theta1 - theta2).cos()
    }

    /// Potential energy (J), zero at the pivot height.
    #[must_use]
    pub fn potential_energy(&self, state: &State) -> f64 {
        let PendulumParameters { l1, l2, m1, m2 } = self.params;
        let g = self.gravity;
        -(m1 + m2) * g * l1 * state.theta1.cos() - m2 * g * l2 * state.theta2.cos()
    }

    /// Total mechanical energy (J).
    #[must_use]
    pub fn total_energy(&self, state: &State) -> f64 {
        self.kinetic_energy(state) + self.potential_energy(state)
    }

    /// Depth of the potential well, `(m1 + m2) g l1 + m2 g l2` (J).
    ///
    /// Positive for any valid parameters, including configurations whose
    /// total energy is zero.
    #[must_use]
    pub fn energy_scale(&self) -> f64 {
        let PendulumParameters { l1, l2, m1, m2 } = self.params;
        let g = self.gravity;
        (m1 + m2) * g * l1 + m2 * g * l2
    }

    /// Bob positions in meters relative to the pivot, `y` pointing down.
    #[must_use]
    pub fn bob_positions(&self, state: &State) -> ((f64, f64), (f64, f64)) {
        bob_positions(&self.params, state.theta1, state.theta2)
    }
}

impl OdeSystem<STATE_DIM> for DoublePendulum {
    fn rhs(&self, _t: f64, y: &[f64; STATE_DIM]) -> [f64; STATE_DIM] {
        self.derivative(&State::from_array(*y)).to_array()
    }
}

/// Bob positions in meters for a pair of angles.
///
/// Arm 1 hangs from the pivot, arm 2 from bob 1.
#[must_use]
pub fn bob_positions(
    params: &PendulumParameters,
    theta1: f64,
    theta2: f64,
) -> ((f64, f64), (f64, f64)) {
    let x1 = params.l1 * theta1.sin();
    let y1 = params.l1 * theta1.cos();
    let x2 = x1 + params.l2 * theta2.sin();
    let y2 = y1 + params.l2 * theta2.cos();
    ((x1, y1), (x2, y2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    fn unit() -> DoublePendulum {
        DoublePendulum::with_standard_gravity(PendulumParameters::default())
    }

    #[test]
    fn test_rest_is_equilibrium() {
        let d = unit().derivative(&State::rest());
        assert_eq!(d, State::rest());
    }

    #[test]
    fn test_velocities_pass_through() {
        let d = unit().derivative(&State::new(0.3, 1.5, -0.2, -2.5));
        assert!((d.theta1 - 1.5).abs() < f64::EPSILON);
        assert!((d.theta2 + 2.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_single_arm_displaced() {
        // Arm 1 at 90°, arm 2 hanging: z1' = -(m1+m2) g / (l1 (m1 + m2))
        // since sin θ2 = 0 and c = cos(π/2) = 0, s = 1.
        let model = unit();
        let d = model.derivative(&State::new(FRAC_PI_2, 0.0, 0.0, 0.0));
        let expected_z1 = -2.0 * STANDARD_GRAVITY / 2.0;
        assert!((d.z1 - expected_z1).abs() < 1e-12, "z1' = {}", d.z1);
        // z2' = (m1+m2)(g sin θ1 c) / (l2 (m1 + m2)) = 0 because c = 0.
        assert!(d.z2.abs() < 1e-12, "z2' = {}", d.z2);
    }

    #[test]
    fn test_matches_reference_formula() {
        let params = PendulumParameters::new(1.2, 0.7, 2.0, 0.5).unwrap();
        let model = DoublePendulum::new(params, 9.81);
        let state = State::new(0.9, -0.4, -1.3, 2.1);
        let d = model.derivative(&state);

        let (l1, l2, m1, m2, g) = (1.2, 0.7, 2.0, 0.5, 9.81_f64);
        let (t1, z1, t2, z2) = (0.9_f64, -0.4_f64, -1.3_f64, 2.1_f64);
        let c = (t1 - t2).cos();
        let s = (t1 - t2).sin();
        let z1_dot = (m2 * g * t2.sin() * c
            - m2 * s * (l1 * z1.powi(2) * c + l2 * z2.powi(2))
            - (m1 + m2) * g * t1.sin())
            / l1
            / (m1 + m2 * s.powi(2));
        let z2_dot = ((m1 + m2) * (l1 * z1.powi(2) * s - g * t2.sin() + g * t1.sin() * c)
            + m2 * l2 * z2.powi(2) * s * c)
            / l2
            / (m1 + m2 * s.powi(2));

        assert!((d.z1 - z1_dot).abs() < 1e-12);
        assert!((d.z2 - z2_dot).abs() < 1e-12);
    }

    #[test]
    fn test_gravity_is_explicit() {
        let params = PendulumParameters::default();
        let state = State::new(0.5, 0.0, 0.0, 0.0);
        let earth = DoublePendulum::new(params, 9.81).derivative(&state);
        let moon = DoublePendulum::new(params, 1.62).derivative(&state);
        assert!(earth.z1.abs() > moon.z1.abs());
    }

    #[test]
    fn test_rejects_zero_length() {
        let err = PendulumParameters::new(0.0, 1.0, 1.0, 1.0).unwrap_err();
        assert!(err.is_input_error());
        assert!(err.to_string().contains("l1"));
    }

    #[test]
    fn test_rejects_negative_mass() {
        let err = PendulumParameters::new(1.0, 1.0, 1.0, -1.0).unwrap_err();
        assert!(err.to_string().contains("m2"));
    }

    #[test]
    fn test_rejects_non_finite() {
        assert!(PendulumParameters::new(f64::NAN, 1.0, 1.0, 1.0).is_err());
        assert!(PendulumParameters::new(1.0, f64::INFINITY, 1.0, 1.0).is_err());
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: PendulumParameters =
            serde_json::from_str(r#"{"l1":1.0,"l2":2.0,"m1":3.0,"m2":4.0}"#).unwrap();
        assert!((ok.l2() - 2.0).abs() < f64::EPSILON);
        assert!((ok.reach() - 3.0).abs() < f64::EPSILON);

        let bad: Result<PendulumParameters, _> =
            serde_json::from_str(r#"{"l1":0.0,"l2":2.0,"m1":3.0,"m2":4.0}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn test_energy_at_rest() {
        // Both bobs hanging: V = -(m1+m2) g l1 - m2 g l2 = -3g
        let model = unit();
        let e = model.total_energy(&State::rest());
        assert!((e + 3.0 * STANDARD_GRAVITY).abs() < 1e-12);
        assert!(model.kinetic_energy(&State::rest()).abs() < f64::EPSILON);
    }

    #[test]
    fn test_energy_inverted() {
        // Both arms pointing up: V = +3g
        let model = unit();
        let e = model.potential_energy(&State::new(PI, 0.0, PI, 0.0));
        assert!((e - 3.0 * STANDARD_GRAVITY).abs() < 1e-9);
    }

    #[test]
    fn test_energy_scale_with_horizontal_arms() {
        let model = unit();
        let horizontal = State::new(FRAC_PI_2, 0.0, FRAC_PI_2, 0.0);
        assert!(model.total_energy(&horizontal).abs() < 1e-12);
        assert!((model.energy_scale() - 3.0 * STANDARD_GRAVITY).abs() < 1e-12);
        assert!((model.energy_scale() + model.total_energy(&State::rest())).abs() < 1e-12);
    }

    #[test]
    fn test_kinetic_energy_rigid_rotation() {
        // Rigid rotation at ω with arms aligned: T = ½ I ω², I = m1 l1² + m2 (l1+l2)²
        let model = unit();
        let omega = 2.0;
        let t = model.kinetic_energy(&State::new(0.4, omega, 0.4, omega));
        let inertia = 1.0 + 4.0;
        assert!((t - 0.5 * inertia * omega * omega).abs() < 1e-12);
    }

    #[test]
    fn test_bob_positions() {
        let params = PendulumParameters::new(1.0, 2.0, 1.0, 1.0).unwrap();
        let ((x1, y1), (x2, y2)) = bob_positions(&params, 0.0, FRAC_PI_2);
        assert!(x1.abs() < 1e-12);
        assert!((y1 - 1.0).abs() < 1e-12);
        assert!((x2 - 2.0).abs() < 1e-12);
        assert!((y2 - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_ode_system_layout() {
        let model = unit();
        let state = State::new(0.2, 0.1, -0.3, 0.4);
        let y = model.rhs(0.0, &state.to_array());
        assert_eq!(y, model.derivative(&state).to_array());
    }
}
