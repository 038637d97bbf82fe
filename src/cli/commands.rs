//! CLI command handlers.

use std::path::Path;
use std::process::ExitCode;

use crate::config::SimConfig;
use crate::engine::TrajectoryIntegrator;
use crate::error::PendulumResult;
use crate::input::{InputField, UserInput};

use super::output::{print_help, print_summary, print_version, RunSummary};
use super::{Args, Command};

/// Exit code for a run that failed validation or integration.
const EXIT_FAILURE: u8 = 1;
/// Exit code for a malformed command line.
const EXIT_USAGE: u8 = 2;

/// Main CLI entry point.
///
/// Dispatches to the appropriate command handler based on parsed arguments.
#[must_use]
pub fn run_cli(args: Args) -> ExitCode {
    match args.command {
        Command::Simulate {
            overrides,
            config_path,
            verbose: _,
        } => match simulate(&overrides, config_path.as_deref()) {
            Ok(summary) => {
                print_summary(&summary);
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Error: {e}");
                ExitCode::from(EXIT_FAILURE)
            }
        },
        Command::Help => {
            print_help();
            ExitCode::SUCCESS
        }
        Command::Version => {
            print_version();
            ExitCode::SUCCESS
        }
        Command::Invalid { reason } => {
            eprintln!("Error: {reason}");
            eprintln!("Run 'pendular help' for usage.");
            ExitCode::from(EXIT_USAGE)
        }
    }
}

/// Validate inputs, integrate one run and summarize it.
///
/// Overrides are applied on top of the default initial conditions in the
/// order given; a later override of the same field wins.
///
/// # Errors
///
/// Returns `InputValidation` for a bad field value, a configuration error
/// if `config_path` cannot be loaded, and `Integration` if the solver fails.
pub fn simulate(
    overrides: &[(InputField, String)],
    config_path: Option<&Path>,
) -> PendulumResult<RunSummary> {
    let config = match config_path {
        Some(path) => SimConfig::load(path)?,
        None => SimConfig::default(),
    };

    let mut input = UserInput::default();
    for (field, text) in overrides {
        input.parse(*field, text)?;
    }
    let initial = input.into_initial_conditions()?;

    tracing::info!(
        t_max = config.integration.t_max,
        dt = config.integration.dt,
        gravity = config.physics.gravity,
        "simulating"
    );

    let integrator = TrajectoryIntegrator::from_config(&config)?;
    let trajectory = integrator.run(initial.state, &initial.params)?;
    Ok(RunSummary::new(&input, &config, &trajectory))
}
