//! Double-pendulum state.
//!
//! The state holds the four generalized coordinates of the system:
//! - Angle of arm 1 from the downward vertical (radians)
//! - Angular velocity of arm 1 (rad/s)
//! - Angle of arm 2 from the downward vertical (radians)
//! - Angular velocity of arm 2 (rad/s)
//!
//! Angles are never wrapped into `[0, 2π)`: a pendulum that has flipped over
//! three times reports an angle near `6π`.

use serde::{Deserialize, Serialize};

/// Number of state variables.
pub const STATE_DIM: usize = 4;

/// Instantaneous state of a double pendulum.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct State {
    /// Angle of arm 1 from vertical (radians).
    pub theta1: f64,
    /// Angular velocity of arm 1 (rad/s).
    pub z1: f64,
    /// Angle of arm 2 from vertical (radians).
    pub theta2: f64,
    /// Angular velocity of arm 2 (rad/s).
    pub z2: f64,
}

impl State {
    /// Create a new state.
    #[must_use]
    pub const fn new(theta1: f64, z1: f64, theta2: f64, z2: f64) -> Self {
        Self {
            theta1,
            z1,
            theta2,
            z2,
        }
    }

    /// Both arms hanging straight down, at rest.
    #[must_use]
    pub const fn rest() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0)
    }

    /// Pack into solver layout `[theta1, z1, theta2, z2]`.
    #[must_use]
    pub const fn to_array(&self) -> [f64; STATE_DIM] {
        [self.theta1, self.z1, self.theta2, self.z2]
    }

    /// Unpack from solver layout `[theta1, z1, theta2, z2]`.
    #[must_use]
    pub const fn from_array(y: [f64; STATE_DIM]) -> Self {
        Self::new(y[0], y[1], y[2], y[3])
    }

    /// The pair rendered each frame.
    #[must_use]
    pub const fn angles(&self) -> (f64, f64) {
        (self.theta1, self.theta2)
    }

    /// Check if all components are finite.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)] // is_finite not const
    pub fn is_finite(&self) -> bool {
        self.to_array().iter().all(|v| v.is_finite())
    }

    /// Name of the first non-finite component, if any.
    #[must_use]
    pub fn first_non_finite(&self) -> Option<&'static str> {
        const NAMES: [&str; STATE_DIM] = ["theta1", "z1", "theta2", "z2"];
        self.to_array()
            .iter()
            .zip(NAMES)
            .find(|(v, _)| !v.is_finite())
            .map(|(_, name)| name)
    }
}

impl From<[f64; STATE_DIM]> for State {
    fn from(y: [f64; STATE_DIM]) -> Self {
        Self::from_array(y)
    }
}

impl From<State> for [f64; STATE_DIM] {
    fn from(state: State) -> Self {
        state.to_array()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_array_layout() {
        let state = State::new(1.0, 2.0, 3.0, 4.0);
        assert_eq!(state.to_array(), [1.0, 2.0, 3.0, 4.0]);
        assert_eq!(State::from_array([1.0, 2.0, 3.0, 4.0]), state);
    }

    #[test]
    fn test_conversions() {
        let arr: [f64; STATE_DIM] = State::new(0.5, -0.5, 0.25, 0.0).into();
        let back: State = arr.into();
        assert_eq!(back.angles(), (0.5, 0.25));
    }

    #[test]
    fn test_rest_is_default() {
        assert_eq!(State::rest(), State::default());
    }

    #[test]
    fn test_finite_detection() {
        assert!(State::rest().is_finite());
        assert_eq!(State::rest().first_non_finite(), None);

        let bad = State::new(0.0, f64::NAN, 0.0, f64::INFINITY);
        assert!(!bad.is_finite());
        assert_eq!(bad.first_non_finite(), Some("z1"));
    }

    #[test]
    fn test_angles_not_wrapped() {
        let state = State::new(7.0 * std::f64::consts::PI, 0.0, -20.0, 0.0);
        let (t1, t2) = state.angles();
        assert!(t1 > 2.0 * std::f64::consts::PI);
        assert!((t2 + 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_serde_roundtrip() {
        let state = State::new(0.1, 0.2, 0.3, 0.4);
        let json = serde_json::to_string(&state).unwrap();
        let back: State = serde_json::from_str(&json).unwrap();
        assert_eq!(state, back);
    }
}
