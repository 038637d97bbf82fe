//! # pendular
//!
//! Double pendulum simulator.
//!
//! The core precomputes a whole trajectory up front and then replays it:
//! - Physics model: equations of motion and energy of two point masses on
//!   massless rigid arms
//! - Trajectory integrator: adaptive Dormand-Prince 5(4) with dense output,
//!   resampled onto a uniform time grid
//! - Playback controller: loops over the samples, one per rendered frame
//!
//! ## Example
//!
//! ```rust
//! use pendular::prelude::*;
//!
//! let input = UserInput {
//!     theta1_deg: 90.0,
//!     ..UserInput::default()
//! };
//! let initial = input.into_initial_conditions().unwrap();
//!
//! let trajectory = simulate(initial.state, &initial.params, 2.0, 0.01).unwrap();
//! assert_eq!(trajectory.len(), 200);
//!
//! let mut playback = Playback::new(trajectory);
//! let (theta1, _theta2) = playback.current_angles();
//! assert!((theta1 - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
//! playback.advance();
//! ```

#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![warn(clippy::pedantic, clippy::nursery)]
#![allow(
    clippy::module_name_repetitions,
    clippy::similar_names,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::suboptimal_flops,
    clippy::imprecise_flops,
    clippy::too_many_lines,
    clippy::missing_const_for_fn,
    clippy::needless_range_loop,
    clippy::many_single_char_names,
)]

pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod input;
pub mod replay;
pub mod scenarios;
pub mod tui;
pub mod visualization;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::config::{SimConfig, SimConfigBuilder};
    pub use crate::engine::{
        simulate, DormandPrince45, OdeSystem, Sample, SolverStats, State, Tolerances, Trajectory,
        TrajectoryIntegrator,
    };
    pub use crate::error::{PendulumError, PendulumResult};
    pub use crate::input::{degrees_to_radians, InitialConditions, InputField, UserInput};
    pub use crate::replay::{FramePacer, Playback};
    pub use crate::scenarios::pendulum::{DoublePendulum, PendulumParameters, STANDARD_GRAVITY};
}

/// Re-export for public API
pub use error::{PendulumError, PendulumResult};
