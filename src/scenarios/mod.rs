//! Physical systems.
//!
//! - Double pendulum: two point masses on massless rigid arms

pub mod pendulum;

pub use pendulum::{DoublePendulum, PendulumParameters};
