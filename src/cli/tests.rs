//! CLI module tests.

use super::args::{Args, Command};
use super::commands::{run_cli, simulate};
use super::output::{format_summary, help_text, version_string};
use crate::input::InputField;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

// ============================================================================
// Args parsing tests
// ============================================================================

#[test]
fn test_parse_no_args_shows_help() {
    let args = Args::parse_from(["pendular"]);
    assert_eq!(args.command, Command::Help);
}

#[test]
fn test_parse_help_variants() {
    for flag in ["-h", "--help", "help"] {
        assert_eq!(Args::parse_from(["pendular", flag]).command, Command::Help);
    }
}

#[test]
fn test_parse_version_variants() {
    for flag in ["-V", "--version", "version"] {
        assert_eq!(Args::parse_from(["pendular", flag]).command, Command::Version);
    }
}

#[test]
fn test_parse_unknown_command() {
    let args = Args::parse_from(["pendular", "launch"]);
    assert!(matches!(args.command, Command::Invalid { reason } if reason.contains("launch")));
}

#[test]
fn test_parse_simulate_defaults() {
    let args = Args::parse_from(["pendular", "simulate"]);
    assert_eq!(
        args.command,
        Command::Simulate {
            overrides: Vec::new(),
            config_path: None,
            verbose: false,
        }
    );
    assert!(!args.command.verbose());
}

#[test]
fn test_parse_simulate_all_options() {
    let args = Args::parse_from([
        "pendular", "simulate", "--theta1", "120", "--theta2", "-10", "--z1", "5", "--z2", "0",
        "--l1", "1.5", "--l2", "0.5", "--m1", "2", "--m2", "3", "--config", "sim.yaml", "-v",
    ]);
    match args.command {
        Command::Simulate {
            overrides,
            config_path,
            verbose,
        } => {
            assert_eq!(overrides.len(), 8);
            assert_eq!(overrides[0], (InputField::Theta1, "120".to_string()));
            assert_eq!(overrides[1], (InputField::Theta2, "-10".to_string()));
            assert_eq!(overrides[7], (InputField::M2, "3".to_string()));
            assert_eq!(config_path, Some(PathBuf::from("sim.yaml")));
            assert!(verbose);
        }
        other => panic!("Expected Simulate, got {other:?}"),
    }
}

#[test]
fn test_parse_simulate_unknown_option() {
    let args = Args::parse_from(["pendular", "simulate", "--theta3", "1"]);
    assert!(matches!(args.command, Command::Invalid { reason } if reason.contains("--theta3")));
}

#[test]
fn test_parse_simulate_missing_value() {
    let args = Args::parse_from(["pendular", "simulate", "--l1"]);
    assert!(matches!(args.command, Command::Invalid { reason } if reason.contains("requires a value")));

    let args = Args::parse_from(["pendular", "simulate", "--config"]);
    assert!(matches!(args.command, Command::Invalid { .. }));
}

#[test]
fn test_parse_value_text_is_not_checked() {
    // Validation happens when the command runs, with the field named.
    let args = Args::parse_from(["pendular", "simulate", "--m2", "heavy"]);
    assert!(matches!(args.command, Command::Simulate { .. }));
}

// ============================================================================
// Command tests
// ============================================================================

fn short_config() -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "integration:\n  t_max: 1.0\n  dt: 0.05").unwrap();
    file
}

#[test]
fn test_simulate_with_config() {
    let file = short_config();
    let overrides = vec![(InputField::Theta1, "45".to_string())];
    let summary = simulate(&overrides, Some(file.path())).unwrap();
    assert_eq!(summary.samples, 20);
    assert!((summary.input.theta1_deg - 45.0).abs() < f64::EPSILON);
    assert!((summary.t_max - 1.0).abs() < f64::EPSILON);
    assert!(summary.max_energy_drift < 1e-3);
    assert!(summary.stats.accepted_steps > 0);
}

#[test]
fn test_simulate_later_override_wins() {
    let file = short_config();
    let overrides = vec![
        (InputField::L1, "3".to_string()),
        (InputField::L1, "2".to_string()),
    ];
    let summary = simulate(&overrides, Some(file.path())).unwrap();
    assert!((summary.input.l1_m - 2.0).abs() < f64::EPSILON);
}

#[test]
fn test_simulate_rejects_bad_field() {
    let overrides = vec![(InputField::M2, "-1".to_string())];
    let err = simulate(&overrides, None).unwrap_err();
    assert!(err.is_input_error());
    assert!(err.to_string().contains("m2"));

    let overrides = vec![(InputField::Theta1, "abc".to_string())];
    assert!(simulate(&overrides, None).unwrap_err().is_input_error());
}

#[test]
fn test_simulate_missing_config() {
    let err = simulate(&[], Some(std::path::Path::new("/nonexistent/pendular.yaml"))).unwrap_err();
    assert!(!err.is_input_error());
}

#[test]
fn test_run_cli_exit_codes() {
    assert_eq!(run_cli(Args::parse_from(["pendular", "help"])), ExitCode::SUCCESS);
    assert_eq!(run_cli(Args::parse_from(["pendular", "version"])), ExitCode::SUCCESS);
    assert_eq!(run_cli(Args::parse_from(["pendular", "bogus"])), ExitCode::from(2));
    assert_eq!(
        run_cli(Args::parse_from(["pendular", "simulate", "--l1", "0"])),
        ExitCode::from(1)
    );
}

#[test]
fn test_run_cli_simulate_success() {
    let file = short_config();
    let path = file.path().to_string_lossy().to_string();
    let args = Args::parse_from(["pendular", "simulate", "--config", path.as_str()]);
    assert_eq!(run_cli(args), ExitCode::SUCCESS);
}

// ============================================================================
// Output tests
// ============================================================================

#[test]
fn test_version_string() {
    assert!(version_string().starts_with("pendular "));
    assert!(version_string().contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_help_lists_every_field() {
    let help = help_text();
    for field in InputField::ALL {
        assert!(help.contains(&format!("--{}", field.key())), "{}", field.key());
        assert!(help.contains(field.label()));
    }
    assert!(help.contains("simulate"));
}

#[test]
fn test_format_summary() {
    let file = short_config();
    let summary = simulate(&[], Some(file.path())).unwrap();
    let text = format_summary(&summary);
    assert!(text.contains("Samples:  20"));
    assert!(text.contains("theta1 = 30.000°"));
    assert!(text.contains("Max energy drift"));
    assert!(text.contains("Final angles"));
}

#[test]
fn test_summary_serializes() {
    let file = short_config();
    let summary = simulate(&[], Some(file.path())).unwrap();
    let json = serde_json::to_string(&summary).unwrap();
    assert!(json.contains("\"samples\":20"));
}
