//! Initial-condition entry.
//!
//! The user supplies eight numbers in a fixed order: two angles in degrees,
//! two angular velocities in degrees per second, two arm lengths in meters
//! and two bob masses in kilograms. Degrees are converted to radians here;
//! everything downstream works in SI units.

use serde::{Deserialize, Serialize};

use crate::engine::State;
use crate::error::{PendulumError, PendulumResult};
use crate::scenarios::pendulum::PendulumParameters;

/// Convert degrees to radians.
#[must_use]
pub fn degrees_to_radians(degrees: f64) -> f64 {
    degrees * std::f64::consts::PI / 180.0
}

/// One of the eight entry fields, in prompt order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputField {
    /// Initial angle of arm 1 (degrees).
    Theta1,
    /// Initial angle of arm 2 (degrees).
    Theta2,
    /// Initial angular velocity of arm 1 (degrees/s).
    Z1,
    /// Initial angular velocity of arm 2 (degrees/s).
    Z2,
    /// Length of arm 1 (m).
    L1,
    /// Length of arm 2 (m).
    L2,
    /// Mass of bob 1 (kg).
    M1,
    /// Mass of bob 2 (kg).
    M2,
}

impl InputField {
    /// All fields in prompt order.
    pub const ALL: [Self; 8] = [
        Self::Theta1,
        Self::Theta2,
        Self::Z1,
        Self::Z2,
        Self::L1,
        Self::L2,
        Self::M1,
        Self::M2,
    ];

    /// Short identifier used in error messages and CLI flags.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Theta1 => "theta1",
            Self::Theta2 => "theta2",
            Self::Z1 => "z1",
            Self::Z2 => "z2",
            Self::L1 => "l1",
            Self::L2 => "l2",
            Self::M1 => "m1",
            Self::M2 => "m2",
        }
    }

    /// Prompt shown to the user.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Theta1 => "Initial angle theta1 (degrees)",
            Self::Theta2 => "Initial angle theta2 (degrees)",
            Self::Z1 => "Initial angular velocity z1 (degrees/s)",
            Self::Z2 => "Initial angular velocity z2 (degrees/s)",
            Self::L1 => "Length of arm 1 l1 (m)",
            Self::L2 => "Length of arm 2 l2 (m)",
            Self::M1 => "Mass of bob 1 m1 (kg)",
            Self::M2 => "Mass of bob 2 m2 (kg)",
        }
    }

    /// Whether the value must be strictly positive.
    #[must_use]
    pub const fn requires_positive(self) -> bool {
        matches!(self, Self::L1 | Self::L2 | Self::M1 | Self::M2)
    }

    /// Next field in prompt order, if any.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Theta1 => Some(Self::Theta2),
            Self::Theta2 => Some(Self::Z1),
            Self::Z1 => Some(Self::Z2),
            Self::Z2 => Some(Self::L1),
            Self::L1 => Some(Self::L2),
            Self::L2 => Some(Self::M1),
            Self::M1 => Some(Self::M2),
            Self::M2 => None,
        }
    }

    /// Parse one field value from user text.
    ///
    /// # Errors
    ///
    /// Returns `InputValidation` if the text is not a finite number, or if
    /// the field is a length or mass and the value is not positive.
    pub fn parse(self, text: &str) -> PendulumResult<f64> {
        let trimmed = text.trim();
        let value: f64 = trimmed
            .parse()
            .map_err(|_| PendulumError::input(self.key(), format!("'{trimmed}' is not a number")))?;
        if !value.is_finite() {
            return Err(PendulumError::input(self.key(), "must be finite"));
        }
        if self.requires_positive() && value <= 0.0 {
            return Err(PendulumError::input(
                self.key(),
                format!("must be greater than zero, got {value}"),
            ));
        }
        Ok(value)
    }
}

impl std::fmt::Display for InputField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Raw user input in display units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserInput {
    /// Initial angle of arm 1 (degrees).
    pub theta1_deg: f64,
    /// Initial angle of arm 2 (degrees).
    pub theta2_deg: f64,
    /// Initial angular velocity of arm 1 (degrees/s).
    pub z1_deg_per_s: f64,
    /// Initial angular velocity of arm 2 (degrees/s).
    pub z2_deg_per_s: f64,
    /// Length of arm 1 (m).
    pub l1_m: f64,
    /// Length of arm 2 (m).
    pub l2_m: f64,
    /// Mass of bob 1 (kg).
    pub m1_kg: f64,
    /// Mass of bob 2 (kg).
    pub m2_kg: f64,
}

impl Default for UserInput {
    /// Arm 1 raised 30 degrees, everything else at rest with unit arms and bobs.
    fn default() -> Self {
        Self {
            theta1_deg: 30.0,
            theta2_deg: 0.0,
            z1_deg_per_s: 0.0,
            z2_deg_per_s: 0.0,
            l1_m: 1.0,
            l2_m: 1.0,
            m1_kg: 1.0,
            m2_kg: 1.0,
        }
    }
}

/// Validated starting point of a run, in SI units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct InitialConditions {
    /// Initial state (radians, radians/s).
    pub state: State,
    /// Physical parameters.
    pub params: PendulumParameters,
}

impl UserInput {
    /// Parse the text for `field` and store it.
    ///
    /// # Errors
    ///
    /// See [`InputField::parse`]. On error the stored value is unchanged.
    pub fn parse(&mut self, field: InputField, text: &str) -> PendulumResult<()> {
        let value = field.parse(text)?;
        *self.slot_mut(field) = value;
        Ok(())
    }

    /// Stored value for `field`.
    #[must_use]
    pub const fn get(&self, field: InputField) -> f64 {
        match field {
            InputField::Theta1 => self.theta1_deg,
            InputField::Theta2 => self.theta2_deg,
            InputField::Z1 => self.z1_deg_per_s,
            InputField::Z2 => self.z2_deg_per_s,
            InputField::L1 => self.l1_m,
            InputField::L2 => self.l2_m,
            InputField::M1 => self.m1_kg,
            InputField::M2 => self.m2_kg,
        }
    }

    fn slot_mut(&mut self, field: InputField) -> &mut f64 {
        match field {
            InputField::Theta1 => &mut self.theta1_deg,
            InputField::Theta2 => &mut self.theta2_deg,
            InputField::Z1 => &mut self.z1_deg_per_s,
            InputField::Z2 => &mut self.z2_deg_per_s,
            InputField::L1 => &mut self.l1_m,
            InputField::L2 => &mut self.l2_m,
            InputField::M1 => &mut self.m1_kg,
            InputField::M2 => &mut self.m2_kg,
        }
    }

    /// Validate and convert to SI units.
    ///
    /// # Errors
    ///
    /// Returns `InputValidation` naming the first offending field in prompt
    /// order.
    pub fn into_initial_conditions(self) -> PendulumResult<InitialConditions> {
        for field in InputField::ALL {
            let value = self.get(field);
            if !value.is_finite() {
                return Err(PendulumError::input(field.key(), "must be finite"));
            }
            if field.requires_positive() && value <= 0.0 {
                return Err(PendulumError::input(
                    field.key(),
                    format!("must be greater than zero, got {value}"),
                ));
            }
        }

        let params = PendulumParameters::new(self.l1_m, self.l2_m, self.m1_kg, self.m2_kg)?;
        let state = State::new(
            degrees_to_radians(self.theta1_deg),
            degrees_to_radians(self.z1_deg_per_s),
            degrees_to_radians(self.theta2_deg),
            degrees_to_radians(self.z2_deg_per_s),
        );
        Ok(InitialConditions { state, params })
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_positive_inputs_accepted(
            theta1 in -360.0f64..360.0,
            theta2 in -360.0f64..360.0,
            l1 in 0.01f64..10.0,
            m2 in 0.01f64..10.0,
        ) {
            let input = UserInput {
                theta1_deg: theta1,
                theta2_deg: theta2,
                l1_m: l1,
                m2_kg: m2,
                ..UserInput::default()
            };
            let ic = input.into_initial_conditions().unwrap();
            prop_assert!((ic.state.theta1 - degrees_to_radians(theta1)).abs() < 1e-12);
            prop_assert!((ic.params.l1() - l1).abs() < f64::EPSILON);
        }
    }
}
