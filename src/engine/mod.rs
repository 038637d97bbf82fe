//! Trajectory integration engine.
//!
//! Produces the full, precomputed trajectory of one simulation run:
//! - Adaptive Dormand-Prince 5(4) integration of the equations of motion
//! - Dense-output resampling onto a uniform grid `{0, dt, 2dt, …} < t_max`
//! - Per-sample guard (non-finite values stop the run, energy drift is logged)
//!
//! The run is a single blocking call. It either returns a complete
//! trajectory or an error; partial trajectories are never exposed.

pub mod guard;
pub mod solver;
pub mod state;

use serde::{Deserialize, Serialize};

pub use guard::{GuardReport, StepGuard};
pub use solver::{DormandPrince45, OdeSystem, SolverStats, Tolerances};
pub use state::State;

use crate::config::{IntegrationConfig, SimConfig};
use crate::error::{PendulumError, PendulumResult};
use crate::scenarios::pendulum::{DoublePendulum, PendulumParameters};

/// One row of a trajectory.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Simulation time (s).
    pub time: f64,
    /// State at `time`.
    pub state: State,
}

/// Number of grid points `i * dt` strictly below `t_max`.
///
/// Starts from `ceil(t_max / dt)` and corrects for rounding in the quotient,
/// so `(0.3, 0.1)` yields 3 samples. Zero for non-positive inputs.
#[must_use]
pub fn sample_count(t_max: f64, dt: f64) -> usize {
    if !(t_max.is_finite() && dt.is_finite()) || t_max <= 0.0 || dt <= 0.0 {
        return 0;
    }
    let mut n = (t_max / dt).ceil() as usize;
    while (n as f64) * dt < t_max {
        n += 1;
    }
    while n > 0 && ((n - 1) as f64) * dt >= t_max {
        n -= 1;
    }
    n
}

/// Uniform output grid for a run.
#[must_use]
pub fn sample_times(t_max: f64, dt: f64) -> Vec<f64> {
    (0..sample_count(t_max, dt)).map(|i| i as f64 * dt).collect()
}

/// Precomputed, uniformly sampled trajectory.
///
/// Never empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trajectory {
    samples: Vec<Sample>,
    dt: f64,
    stats: SolverStats,
    guard: GuardReport,
}

impl Trajectory {
    /// Wrap a sample table.
    ///
    /// # Errors
    ///
    /// Returns `InputValidation` if `samples` is empty: a zero-length
    /// trajectory cannot be played back.
    pub fn new(
        samples: Vec<Sample>,
        dt: f64,
        stats: SolverStats,
        guard: GuardReport,
    ) -> PendulumResult<Self> {
        if samples.is_empty() {
            return Err(PendulumError::input(
                "t_max",
                "horizon too short for a single sample",
            ));
        }
        Ok(Self {
            samples,
            dt,
            stats,
            guard,
        })
    }

    /// Number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Always false for a constructed trajectory.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Sample interval (s).
    #[must_use]
    pub const fn dt(&self) -> f64 {
        self.dt
    }

    /// Time of the last sample (s).
    #[must_use]
    pub fn last_time(&self) -> f64 {
        self.samples.last().map_or(0.0, |s| s.time)
    }

    /// Sample at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Sample> {
        self.samples.get(index)
    }

    /// All samples in time order.
    #[must_use]
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Iterate over samples in time order.
    pub fn iter(&self) -> std::slice::Iter<'_, Sample> {
        self.samples.iter()
    }

    /// Solver counters for the run.
    #[must_use]
    pub const fn stats(&self) -> SolverStats {
        self.stats
    }

    /// Energy drift summary for the run.
    #[must_use]
    pub const fn guard_report(&self) -> GuardReport {
        self.guard
    }
}

impl<'a> IntoIterator for &'a Trajectory {
    type Item = &'a Sample;
    type IntoIter = std::slice::Iter<'a, Sample>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}

/// Drives the physics model over a fixed horizon.
///
/// # Example
///
/// ```rust
/// use pendular::prelude::*;
///
/// let params = PendulumParameters::new(1.0, 1.0, 1.0, 1.0).unwrap();
/// let config = SimConfig::builder().t_max(1.0).dt(0.1).build();
/// let integrator = TrajectoryIntegrator::from_config(&config).unwrap();
///
/// let trajectory = integrator.run(State::new(0.5, 0.0, 0.0, 0.0), &params).unwrap();
/// assert_eq!(trajectory.len(), 10);
/// ```
#[derive(Debug, Clone)]
pub struct TrajectoryIntegrator {
    settings: IntegrationConfig,
    gravity: f64,
    tolerances: Tolerances,
}

impl TrajectoryIntegrator {
    /// Create an integrator from validated configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the configuration fails validation.
    pub fn from_config(config: &SimConfig) -> PendulumResult<Self> {
        config.check()?;
        Ok(Self {
            settings: config.integration.clone(),
            gravity: config.physics.gravity,
            tolerances: Tolerances::default(),
        })
    }

    /// Override the solver error tolerances.
    #[must_use]
    pub const fn with_tolerances(mut self, tolerances: Tolerances) -> Self {
        self.tolerances = tolerances;
        self
    }

    /// Solver error tolerances in use.
    #[must_use]
    pub const fn tolerances(&self) -> Tolerances {
        self.tolerances
    }

    /// Integration settings in use.
    #[must_use]
    pub const fn settings(&self) -> &IntegrationConfig {
        &self.settings
    }

    /// Gravity in use (m/s²).
    #[must_use]
    pub const fn gravity(&self) -> f64 {
        self.gravity
    }

    /// Integrate `initial` over `[0, t_max)` with the configured horizon.
    ///
    /// # Errors
    ///
    /// Returns `InputValidation` if the initial state is non-finite, and
    /// `Integration` if the solver fails anywhere on the horizon.
    pub fn run(&self, initial: State, params: &PendulumParameters) -> PendulumResult<Trajectory> {
        self.run_for(initial, params, self.settings.t_max, self.settings.dt)
    }

    /// Integrate `initial` over `[0, t_max)` sampled every `dt`.
    ///
    /// # Errors
    ///
    /// Returns `InputValidation` if `t_max`/`dt` are not positive and finite,
    /// if `dt >= t_max`, or if the initial state is non-finite. Returns
    /// `Integration` if the solver fails anywhere on the horizon.
    pub fn run_for(
        &self,
        initial: State,
        params: &PendulumParameters,
        t_max: f64,
        dt: f64,
    ) -> PendulumResult<Trajectory> {
        validate_horizon(t_max, dt)?;
        if let Some(name) = initial.first_non_finite() {
            return Err(PendulumError::input(name, "initial value must be finite"));
        }

        let model = DoublePendulum::new(*params, self.gravity);
        let times = sample_times(t_max, dt);

        let span = tracing::debug_span!("integrate", t_max, dt, samples = times.len());
        let _enter = span.enter();
        tracing::debug!(?initial, ?params, gravity = self.gravity, "starting integration");

        let mut solver = DormandPrince45::new(self.tolerances)
            .with_max_steps(self.settings.max_steps);
        let rows = solver.solve_at(&model, 0.0, initial.to_array(), t_max, &times)?;

        let mut guard = StepGuard::new(self.settings.guard(), model.energy_scale());
        let mut samples = Vec::with_capacity(rows.len());
        for (&time, row) in times.iter().zip(rows) {
            let state = State::from_array(row);
            guard.check(time, &state, model.total_energy(&state))?;
            samples.push(Sample { time, state });
        }

        let stats = solver.stats();
        let report = guard.report();
        tracing::debug!(
            accepted = stats.accepted_steps,
            rejected = stats.rejected_steps,
            fn_evals = stats.fn_evals,
            max_energy_drift = report.max_energy_drift,
            "integration finished"
        );

        Trajectory::new(samples, dt, stats, report)
    }
}

impl Default for TrajectoryIntegrator {
    fn default() -> Self {
        let config = SimConfig::default();
        Self {
            settings: config.integration,
            gravity: config.physics.gravity,
            tolerances: Tolerances::default(),
        }
    }
}

/// Integrate with default configuration.
///
/// # Errors
///
/// See [`TrajectoryIntegrator::run_for`].
pub fn simulate(
    initial: State,
    params: &PendulumParameters,
    t_max: f64,
    dt: f64,
) -> PendulumResult<Trajectory> {
    TrajectoryIntegrator::default().run_for(initial, params, t_max, dt)
}

fn validate_horizon(t_max: f64, dt: f64) -> PendulumResult<()> {
    if !t_max.is_finite() || t_max <= 0.0 {
        return Err(PendulumError::input(
            "t_max",
            format!("must be positive and finite, got {t_max}"),
        ));
    }
    if !dt.is_finite() || dt <= 0.0 {
        return Err(PendulumError::input(
            "dt",
            format!("must be positive and finite, got {dt}"),
        ));
    }
    if dt >= t_max {
        return Err(PendulumError::input(
            "dt",
            format!("must be smaller than t_max = {t_max}, got {dt}"),
        ));
    }
    Ok(())
}
