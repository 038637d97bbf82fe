//! Looped playback of a precomputed trajectory.
//!
//! The trajectory is sampled at a fixed simulation interval; the renderer
//! runs at its own fixed frame rate. Playback consumes exactly one sample per
//! rendered frame and starts over from the first sample after the last one,
//! indefinitely and silently.

pub mod pacer;

pub use pacer::FramePacer;

use crate::engine::{Sample, State, Trajectory};

/// Read cursor over a trajectory.
///
/// # Example
///
/// ```rust
/// use pendular::prelude::*;
///
/// let params = PendulumParameters::default();
/// let trajectory = simulate(State::new(0.4, 0.0, 0.0, 0.0), &params, 0.3, 0.1).unwrap();
/// let mut playback = Playback::new(trajectory);
///
/// let first = playback.advance();
/// for _ in 1..playback.len() {
///     playback.advance();
/// }
/// // Wrapped around.
/// assert_eq!(playback.advance(), first);
/// ```
#[derive(Debug, Clone)]
pub struct Playback {
    trajectory: Trajectory,
    index: usize,
}

impl Playback {
    /// Start playback at the first sample.
    #[must_use]
    pub const fn new(trajectory: Trajectory) -> Self {
        Self {
            trajectory,
            index: 0,
        }
    }

    /// Return the state at the cursor, then move the cursor forward,
    /// wrapping to the first sample after the last.
    pub fn advance(&mut self) -> State {
        let state = self.current().state;
        self.index += 1;
        if self.index == self.trajectory.len() {
            self.index = 0;
        }
        state
    }

    /// `(theta1, theta2)` at the cursor, without advancing.
    #[must_use]
    pub fn current_angles(&self) -> (f64, f64) {
        self.current().state.angles()
    }

    /// Sample at the cursor.
    #[must_use]
    pub fn current(&self) -> &Sample {
        // The trajectory is never empty and the index is kept below its length.
        &self.trajectory.samples()[self.index]
    }

    /// Cursor position.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Number of samples in one loop.
    #[must_use]
    pub fn len(&self) -> usize {
        self.trajectory.len()
    }

    /// Always false: playback needs at least one sample.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.trajectory.is_empty()
    }

    /// Move the cursor back to the first sample.
    pub fn reset(&mut self) {
        self.index = 0;
    }

    /// Trajectory being played.
    #[must_use]
    pub const fn trajectory(&self) -> &Trajectory {
        &self.trajectory
    }

    /// Release the trajectory.
    #[must_use]
    pub fn into_trajectory(self) -> Trajectory {
        self.trajectory
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::engine::guard::GuardReport;
    use crate::engine::solver::SolverStats;
    use proptest::prelude::*;

    proptest! {
        /// `len` advances replay the table in order; the next one wraps.
        #[test]
        fn prop_loop_property(len in 1usize..200, laps in 1usize..4) {
            let samples: Vec<Sample> = (0..len)
                .map(|i| Sample { time: i as f64, state: State::new(i as f64, 1.0, 2.0, 3.0) })
                .collect();
            let trajectory = Trajectory::new(samples.clone(), 1.0, SolverStats::default(), GuardReport::default()).unwrap();
            let mut playback = Playback::new(trajectory);

            for _ in 0..laps {
                for sample in &samples {
                    prop_assert_eq!(playback.advance(), sample.state);
                }
            }
            prop_assert_eq!(playback.advance(), samples[0].state);
        }
    }
}
