//! Fixed-rate frame pacing.
//!
//! The render loop is the only consumer of wall-clock time. The pacer turns
//! a target frame rate into a frame budget and tells the loop how long to
//! wait for input before drawing the next frame.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{PendulumError, PendulumResult};

/// Slowest accepted frame rate (frames per second).
pub const MIN_FRAME_RATE: f64 = 1.0;

/// Frame budget for a fixed target frame rate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FramePacer {
    frame_rate: f64,
    frame_count: u64,
}

impl FramePacer {
    /// Create a pacer for `frame_rate` frames per second.
    ///
    /// # Errors
    ///
    /// Returns `Config` if the frame rate is not finite or is below
    /// [`MIN_FRAME_RATE`].
    pub fn new(frame_rate: f64) -> PendulumResult<Self> {
        if !frame_rate.is_finite() || frame_rate < MIN_FRAME_RATE {
            return Err(PendulumError::config(format!(
                "Frame rate must be at least {MIN_FRAME_RATE}, got {frame_rate}"
            )));
        }
        Ok(Self {
            frame_rate,
            frame_count: 0,
        })
    }

    /// Target frames per second.
    #[must_use]
    pub const fn frame_rate(&self) -> f64 {
        self.frame_rate
    }

    /// Duration of one frame.
    #[must_use]
    pub fn frame_duration(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.frame_rate)
    }

    /// Time left in the current frame after `elapsed` has been spent.
    #[must_use]
    pub fn remaining(&self, elapsed: Duration) -> Duration {
        self.frame_duration().saturating_sub(elapsed)
    }

    /// Record a finished frame and return the new frame count.
    pub fn tick(&mut self) -> u64 {
        self.frame_count += 1;
        self.frame_count
    }

    /// Frames rendered so far.
    #[must_use]
    pub const fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Wall-clock time one loop of `samples` frames takes at this rate.
    #[must_use]
    pub fn loop_duration(&self, samples: usize) -> Duration {
        Duration::try_from_secs_f64(samples as f64 / self.frame_rate).unwrap_or(Duration::MAX)
    }
}

impl Default for FramePacer {
    fn default() -> Self {
        Self {
            frame_rate: 60.0,
            frame_count: 0,
        }
    }
}
