//! CLI output formatting.
//!
//! Formatting is separated from printing so the text can be tested.

use std::fmt::Write as _;

use serde::Serialize;

use crate::config::SimConfig;
use crate::engine::{SolverStats, Trajectory};
use crate::input::{InputField, UserInput};

/// Version string including the git hash when the build captured one.
#[must_use]
pub fn version_string() -> String {
    match option_env!("PENDULAR_GIT_HASH") {
        Some(hash) if !hash.is_empty() => {
            let short = hash.get(..8).unwrap_or(hash);
            format!("pendular {} ({short})", env!("CARGO_PKG_VERSION"))
        }
        _ => format!("pendular {}", env!("CARGO_PKG_VERSION")),
    }
}

/// Print version information.
pub fn print_version() {
    println!("{}", version_string());
}

/// Help text.
#[must_use]
pub fn help_text() -> String {
    let mut fields = String::new();
    for field in InputField::ALL {
        let flag = format!("--{} <N>", field.key());
        let _ = writeln!(fields, "        {flag:<22}{}", field.label());
    }

    format!(
        r"pendular - Double pendulum simulator

USAGE:
    pendular <COMMAND> [OPTIONS]

COMMANDS:
    simulate                    Integrate one run and print a summary
{fields}        --config <FILE>       YAML configuration file
        -v, --verbose         Enable debug logging

    help                        Show this help message
    version                     Show version information

Unspecified values default to theta1 = 30 degrees, all other angles and
velocities 0, arm lengths 1 m and bob masses 1 kg.

EXAMPLES:
    pendular simulate
    pendular simulate --theta1 120 --theta2 -10 --m2 2
    pendular simulate --config pendulum.yaml -v

Set RUST_LOG to control log output (default: warn).
"
    )
}

/// Print help message.
pub fn print_help() {
    print!("{}", help_text());
}

/// Outcome of one headless run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    /// Inputs in user units.
    pub input: UserInput,
    /// Gravity used (m/s²).
    pub gravity: f64,
    /// Horizon (s).
    pub t_max: f64,
    /// Sample interval (s).
    pub dt: f64,
    /// Number of samples produced.
    pub samples: usize,
    /// Solver counters.
    pub stats: SolverStats,
    /// Largest relative energy drift over the run.
    pub max_energy_drift: f64,
    /// Final `(theta1, theta2)` in degrees.
    pub final_angles_deg: (f64, f64),
    /// Time of the final sample (s).
    pub final_time: f64,
}

impl RunSummary {
    /// Summarize a finished run.
    #[must_use]
    pub fn new(input: &UserInput, config: &SimConfig, trajectory: &Trajectory) -> Self {
        let (theta1, theta2) = trajectory
            .samples()
            .last()
            .map_or((0.0, 0.0), |s| s.state.angles());
        Self {
            input: *input,
            gravity: config.physics.gravity,
            t_max: config.integration.t_max,
            dt: trajectory.dt(),
            samples: trajectory.len(),
            stats: trajectory.stats(),
            max_energy_drift: trajectory.guard_report().max_energy_drift,
            final_angles_deg: (theta1.to_degrees(), theta2.to_degrees()),
            final_time: trajectory.last_time(),
        }
    }
}

/// Human-readable run summary.
#[must_use]
pub fn format_summary(summary: &RunSummary) -> String {
    let mut out = String::new();
    let input = &summary.input;

    let _ = writeln!(out, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    let _ = writeln!(out, "Double pendulum");
    let _ = writeln!(out, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");

    let _ = writeln!(out, "Initial conditions:");
    let _ = writeln!(
        out,
        "  theta1 = {:.3}°  theta2 = {:.3}°",
        input.theta1_deg, input.theta2_deg
    );
    let _ = writeln!(
        out,
        "  z1 = {:.3}°/s  z2 = {:.3}°/s",
        input.z1_deg_per_s, input.z2_deg_per_s
    );
    let _ = writeln!(
        out,
        "  l1 = {} m  l2 = {} m  m1 = {} kg  m2 = {} kg",
        input.l1_m, input.l2_m, input.m1_kg, input.m2_kg
    );
    let _ = writeln!(out, "  g  = {} m/s²\n", summary.gravity);

    let _ = writeln!(out, "Trajectory:");
    let _ = writeln!(out, "  Horizon:  {} s (dt = {} s)", summary.t_max, summary.dt);
    let _ = writeln!(out, "  Samples:  {}", summary.samples);
    let _ = writeln!(out, "  Last t:   {:.4} s\n", summary.final_time);

    let _ = writeln!(out, "Solver:");
    let _ = writeln!(out, "  Accepted steps: {}", summary.stats.accepted_steps);
    let _ = writeln!(out, "  Rejected steps: {}", summary.stats.rejected_steps);
    let _ = writeln!(out, "  RHS evaluations: {}\n", summary.stats.fn_evals);

    let _ = writeln!(
        out,
        "Max energy drift: {:.3e} ({:.4}%)",
        summary.max_energy_drift,
        summary.max_energy_drift * 100.0
    );
    let _ = writeln!(
        out,
        "Final angles:     theta1 = {:.3}°  theta2 = {:.3}°",
        summary.final_angles_deg.0, summary.final_angles_deg.1
    );

    out
}

/// Print a run summary.
pub fn print_summary(summary: &RunSummary) {
    print!("{}", format_summary(summary));
}
