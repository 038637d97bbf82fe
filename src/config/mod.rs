//! Configuration system with YAML schema and validation.
//!
//! Every constant the simulation depends on (gravity, horizon, sample
//! interval, step budget, frame rate, pixel scale) lives here and is
//! passed into the core explicitly. Loading goes through three layers:
//! - Type-safe structs via serde (`deny_unknown_fields`)
//! - Field constraints via `validator`
//! - Semantic checks across fields

use serde::{Deserialize, Serialize};
use std::path::Path;
use validator::Validate;

use crate::engine::guard::GuardConfig;
use crate::error::{PendulumError, PendulumResult};
use crate::scenarios::pendulum::STANDARD_GRAVITY;

/// Top-level simulation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct SimConfig {
    /// Schema version for forward compatibility.
    #[validate(length(min = 1))]
    #[serde(default = "default_schema_version")]
    pub schema_version: String,

    /// Physical constants.
    #[validate(nested)]
    #[serde(default)]
    pub physics: PhysicsConfig,

    /// Trajectory integration settings.
    #[validate(nested)]
    #[serde(default)]
    pub integration: IntegrationConfig,

    /// Real-time playback settings.
    #[validate(nested)]
    #[serde(default)]
    pub playback: PlaybackConfig,

    /// Drawing settings.
    #[validate(nested)]
    #[serde(default)]
    pub render: RenderConfig,
}

fn default_schema_version() -> String {
    "1.0".to_string()
}

impl SimConfig {
    /// Load configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - YAML parsing fails
    /// - Validation fails
    pub fn load<P: AsRef<Path>>(path: P) -> PendulumResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML string.
    ///
    /// # Errors
    ///
    /// Returns error if parsing or validation fails.
    pub fn from_yaml(yaml: &str) -> PendulumResult<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.check()?;
        Ok(config)
    }

    /// Serialize to YAML.
    ///
    /// # Errors
    ///
    /// Returns error if serialization fails.
    pub fn to_yaml(&self) -> PendulumResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Run field and semantic validation.
    ///
    /// # Errors
    ///
    /// Returns the first violated constraint.
    pub fn check(&self) -> PendulumResult<()> {
        self.validate()?;
        self.validate_semantic()
    }

    /// Create a builder for configuration.
    #[must_use]
    pub fn builder() -> SimConfigBuilder {
        SimConfigBuilder::default()
    }

    /// Validate semantic constraints beyond schema.
    fn validate_semantic(&self) -> PendulumResult<()> {
        require_finite("physics.gravity", self.physics.gravity)?;
        require_finite("integration.t_max", self.integration.t_max)?;
        require_finite("integration.dt", self.integration.dt)?;
        require_finite("integration.energy_warning", self.integration.energy_warning)?;
        require_finite("render.pixels_per_meter", self.render.pixels_per_meter)?;

        let IntegrationConfig { t_max, dt, .. } = self.integration;
        if dt >= t_max {
            return Err(PendulumError::config(format!(
                "Sample interval dt = {dt} must be smaller than the horizon t_max = {t_max}"
            )));
        }
        Ok(())
    }
}

fn require_finite(name: &str, value: f64) -> PendulumResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(PendulumError::config(format!("{name} must be finite, got {value}")))
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            physics: PhysicsConfig::default(),
            integration: IntegrationConfig::default(),
            playback: PlaybackConfig::default(),
            render: RenderConfig::default(),
        }
    }
}

/// Configuration builder for programmatic construction.
#[derive(Debug, Default)]
pub struct SimConfigBuilder {
    gravity: Option<f64>,
    t_max: Option<f64>,
    dt: Option<f64>,
    frame_rate: Option<f64>,
    pixels_per_meter: Option<f64>,
}

impl SimConfigBuilder {
    /// Set gravitational acceleration (m/s²).
    #[must_use]
    pub const fn gravity(mut self, g: f64) -> Self {
        self.gravity = Some(g);
        self
    }

    /// Set the simulated horizon in seconds.
    #[must_use]
    pub const fn t_max(mut self, t_max: f64) -> Self {
        self.t_max = Some(t_max);
        self
    }

    /// Set the output sample interval in seconds.
    #[must_use]
    pub const fn dt(mut self, dt: f64) -> Self {
        self.dt = Some(dt);
        self
    }

    /// Set the playback frame rate in Hz.
    #[must_use]
    pub const fn frame_rate(mut self, hz: f64) -> Self {
        self.frame_rate = Some(hz);
        self
    }

    /// Set the drawing scale.
    #[must_use]
    pub const fn pixels_per_meter(mut self, scale: f64) -> Self {
        self.pixels_per_meter = Some(scale);
        self
    }

    /// Build the configuration without validating it.
    #[must_use]
    pub fn build(self) -> SimConfig {
        let mut config = SimConfig::default();

        if let Some(g) = self.gravity {
            config.physics.gravity = g;
        }
        if let Some(t_max) = self.t_max {
            config.integration.t_max = t_max;
        }
        if let Some(dt) = self.dt {
            config.integration.dt = dt;
        }
        if let Some(hz) = self.frame_rate {
            config.playback.frame_rate = hz;
        }
        if let Some(scale) = self.pixels_per_meter {
            config.render.pixels_per_meter = scale;
        }

        config
    }
}

/// Physical constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct PhysicsConfig {
    /// Gravitational acceleration (m/s²).
    #[validate(range(exclusive_min = 0.0))]
    #[serde(default = "default_gravity")]
    pub gravity: f64,
}

const fn default_gravity() -> f64 {
    STANDARD_GRAVITY
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: default_gravity(),
        }
    }
}

/// Trajectory integration settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct IntegrationConfig {
    /// Simulated horizon (s).
    #[validate(range(exclusive_min = 0.0))]
    #[serde(default = "default_t_max")]
    pub t_max: f64,
    /// Output sample interval (s).
    #[validate(range(exclusive_min = 0.0))]
    #[serde(default = "default_dt")]
    pub dt: f64,
    /// Cap on internal solver steps.
    #[validate(range(min = 1))]
    #[serde(default = "default_max_steps")]
    pub max_steps: u64,
    /// Relative energy drift above which a warning is logged.
    #[validate(range(exclusive_min = 0.0))]
    #[serde(default = "default_energy_warning")]
    pub energy_warning: f64,
}

const fn default_t_max() -> f64 {
    20.0
}

const fn default_dt() -> f64 {
    0.01
}

const fn default_max_steps() -> u64 {
    1_000_000
}

const fn default_energy_warning() -> f64 {
    0.01
}

impl IntegrationConfig {
    /// Guard settings.
    #[must_use]
    pub const fn guard(&self) -> GuardConfig {
        GuardConfig {
            energy_warning: self.energy_warning,
        }
    }
}

impl Default for IntegrationConfig {
    fn default() -> Self {
        Self {
            t_max: default_t_max(),
            dt: default_dt(),
            max_steps: default_max_steps(),
            energy_warning: default_energy_warning(),
        }
    }
}

/// Real-time playback settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct PlaybackConfig {
    /// Target frames per second.
    #[validate(range(min = 1.0, max = 1000.0))]
    #[serde(default = "default_frame_rate")]
    pub frame_rate: f64,
    /// Number of bob-2 positions kept in the trace.
    #[serde(default = "default_trace_length")]
    pub trace_length: usize,
}

const fn default_frame_rate() -> f64 {
    60.0
}

const fn default_trace_length() -> usize {
    500
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            frame_rate: default_frame_rate(),
            trace_length: default_trace_length(),
        }
    }
}

/// Drawing settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct RenderConfig {
    /// Pixels per meter of arm length.
    #[validate(range(exclusive_min = 0.0))]
    #[serde(default = "default_pixels_per_meter")]
    pub pixels_per_meter: f64,
}

const fn default_pixels_per_meter() -> f64 {
    100.0
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            pixels_per_meter: default_pixels_per_meter(),
        }
    }
}
