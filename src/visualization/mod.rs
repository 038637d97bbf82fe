//! Render geometry for the double pendulum.
//!
//! Platform-agnostic: angles go in, integer pixel positions and a list of
//! draw commands come out. Front-ends (the terminal canvas) only translate
//! commands into their own primitives.
//!
//! # Example
//!
//! ```rust
//! use pendular::prelude::*;
//! use pendular::visualization::{Projector, Trace};
//!
//! let projector = Projector::new((400, 100), 100.0);
//! let params = PendulumParameters::default();
//! let bobs = projector.project(&params, 0.0, 0.0);
//! assert_eq!(bobs.bob1, (400, 200));
//! assert_eq!(bobs.bob2, (400, 300));
//!
//! let mut trace = Trace::new(2);
//! trace.push(bobs.bob2);
//! assert_eq!(trace.len(), 1);
//! ```

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::config::SimConfig;
use crate::scenarios::pendulum::{bob_positions, PendulumParameters};

/// Pixel position, y growing downward.
pub type Pixel = (i32, i32);

/// Default number of bob-2 positions kept by a [`Trace`].
pub const DEFAULT_TRACE_LENGTH: usize = 500;

/// Pixel positions of both bobs for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BobPixels {
    /// Pivot.
    pub pivot: Pixel,
    /// End of arm 1.
    pub bob1: Pixel,
    /// End of arm 2.
    pub bob2: Pixel,
}

/// Maps angles and arm lengths onto the screen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Projector {
    /// Pivot position in pixels.
    pub origin: Pixel,
    /// Scale factor.
    pub pixels_per_meter: f64,
}

impl Projector {
    /// Create a projector.
    #[must_use]
    pub const fn new(origin: Pixel, pixels_per_meter: f64) -> Self {
        Self {
            origin,
            pixels_per_meter,
        }
    }

    /// Projector using the configured scale.
    #[must_use]
    pub const fn from_config(config: &SimConfig, origin: Pixel) -> Self {
        Self::new(origin, config.render.pixels_per_meter)
    }

    /// Map a position in meters (relative to the pivot) to pixels.
    ///
    /// Offsets are truncated toward zero and the result saturates at the
    /// `i32` range.
    #[must_use]
    pub fn to_pixel(&self, x_m: f64, y_m: f64) -> Pixel {
        (
            self.origin.0.saturating_add((x_m * self.pixels_per_meter) as i32),
            self.origin.1.saturating_add((y_m * self.pixels_per_meter) as i32),
        )
    }

    /// Pixel positions of both bobs.
    #[must_use]
    pub fn project(&self, params: &PendulumParameters, theta1: f64, theta2: f64) -> BobPixels {
        let ((x1, y1), (x2, y2)) = bob_positions(params, theta1, theta2);
        BobPixels {
            pivot: self.origin,
            bob1: self.to_pixel(x1, y1),
            bob2: self.to_pixel(x2, y2),
        }
    }

    /// Radius in pixels of the circle bob 2 can reach.
    #[must_use]
    pub fn reach_pixels(&self, params: &PendulumParameters) -> f64 {
        params.reach() * self.pixels_per_meter
    }
}

/// Bounded FIFO of recent bob-2 positions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trace {
    points: VecDeque<Pixel>,
    capacity: usize,
}

impl Trace {
    /// Create an empty trace keeping at most `capacity` points.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            points: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a point, dropping the oldest when full.
    pub fn push(&mut self, point: Pixel) {
        if self.capacity == 0 {
            return;
        }
        if self.points.len() == self.capacity {
            self.points.pop_front();
        }
        self.points.push_back(point);
    }

    /// Points from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &Pixel> {
        self.points.iter()
    }

    /// Number of stored points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether no points are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Maximum number of stored points.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Remove all points.
    pub fn clear(&mut self) {
        self.points.clear();
    }
}

impl Default for Trace {
    fn default() -> Self {
        Self::new(DEFAULT_TRACE_LENGTH)
    }
}

/// What a draw command depicts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Layer {
    /// Rod between two joints.
    Arm,
    /// First bob.
    Bob1,
    /// Second bob.
    Bob2,
    /// Path of the second bob.
    Trace,
}

/// Platform-agnostic draw command, in pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RenderCommand {
    /// Straight segment.
    Line {
        /// Start point.
        from: Pixel,
        /// End point.
        to: Pixel,
        /// What it depicts.
        layer: Layer,
    },
    /// Filled circle.
    Circle {
        /// Center.
        center: Pixel,
        /// Radius in pixels.
        radius: f64,
        /// What it depicts.
        layer: Layer,
    },
    /// Polyline through points, oldest first.
    Path {
        /// Vertices.
        points: Vec<Pixel>,
        /// What it depicts.
        layer: Layer,
    },
}

/// Bob radius in pixels for a mass, growing with the cube root of mass.
#[must_use]
pub fn bob_radius(mass_kg: f64) -> f64 {
    8.0 * mass_kg.cbrt()
}

/// Draw commands for one frame: trace first, then arms, then bobs.
#[must_use]
pub fn render_frame(
    projector: &Projector,
    params: &PendulumParameters,
    angles: (f64, f64),
    trace: &Trace,
) -> Vec<RenderCommand> {
    let bobs = projector.project(params, angles.0, angles.1);
    let mut commands = Vec::with_capacity(5);

    if trace.len() > 1 {
        commands.push(RenderCommand::Path {
            points: trace.iter().copied().collect(),
            layer: Layer::Trace,
        });
    }

    commands.push(RenderCommand::Line {
        from: bobs.pivot,
        to: bobs.bob1,
        layer: Layer::Arm,
    });
    commands.push(RenderCommand::Line {
        from: bobs.bob1,
        to: bobs.bob2,
        layer: Layer::Arm,
    });
    commands.push(RenderCommand::Circle {
        center: bobs.bob1,
        radius: bob_radius(params.m1()),
        layer: Layer::Bob1,
    });
    commands.push(RenderCommand::Circle {
        center: bobs.bob2,
        radius: bob_radius(params.m2()),
        layer: Layer::Bob2,
    });

    commands
}
