//! TUI module for pendular.
//!
//! Holds the testable application state for the terminal front-end. The
//! terminal I/O itself stays in the `pendulum-tui` binary.

#[cfg(feature = "tui")]
pub mod pendulum_app;

#[cfg(feature = "tui")]
pub use pendulum_app::{PendulumApp, Phase};
