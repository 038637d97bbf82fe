//! CLI argument parsing.
//!
//! Parsing is a pure function over an iterator of strings so it can be
//! tested without touching the process environment. Field values are kept
//! as raw text here; they are parsed and validated together with the rest
//! of the initial conditions when the command runs.

use std::path::PathBuf;

use crate::input::InputField;

/// CLI arguments container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Args {
    /// The command to execute.
    pub command: Command,
}

/// Available CLI commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Integrate one run and print a summary.
    Simulate {
        /// Field overrides as raw text, in the order given.
        overrides: Vec<(InputField, String)>,
        /// Optional YAML configuration file.
        config_path: Option<PathBuf>,
        /// Enable debug logging.
        verbose: bool,
    },
    /// Show help
    Help,
    /// Show version
    Version,
    /// The command line could not be parsed.
    Invalid {
        /// What was wrong.
        reason: String,
    },
}

impl Command {
    /// Whether debug logging was requested.
    #[must_use]
    pub const fn verbose(&self) -> bool {
        matches!(self, Self::Simulate { verbose: true, .. })
    }
}

impl Args {
    /// Parse command-line arguments from an iterator.
    ///
    /// The first item is the program name.
    #[must_use]
    pub fn parse_from<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let args: Vec<String> = args.into_iter().map(|s| s.as_ref().to_string()).collect();
        Self::parse_from_vec(&args)
    }

    /// Parse command-line arguments from the environment.
    #[must_use]
    pub fn parse() -> Self {
        Self::parse_from(std::env::args())
    }

    fn parse_from_vec(args: &[String]) -> Self {
        if args.len() < 2 {
            return Self {
                command: Command::Help,
            };
        }

        let command = match args[1].as_str() {
            "simulate" | "sim" => Self::parse_simulate_command(&args[2..]),
            "-h" | "--help" | "help" => Command::Help,
            "-V" | "--version" | "version" => Command::Version,
            unknown => Command::Invalid {
                reason: format!("unknown command '{unknown}'"),
            },
        };

        Self { command }
    }

    fn parse_simulate_command(rest: &[String]) -> Command {
        let mut overrides = Vec::new();
        let mut config_path = None;
        let mut verbose = false;

        let mut i = 0;
        while i < rest.len() {
            let flag = rest[i].as_str();
            match flag {
                "-v" | "--verbose" => {
                    verbose = true;
                    i += 1;
                }
                "--config" | "-c" => {
                    let Some(value) = rest.get(i + 1) else {
                        return missing_value(flag);
                    };
                    config_path = Some(PathBuf::from(value));
                    i += 2;
                }
                _ => {
                    let Some(field) = field_for_flag(flag) else {
                        return Command::Invalid {
                            reason: format!("unknown option '{flag}'"),
                        };
                    };
                    let Some(value) = rest.get(i + 1) else {
                        return missing_value(flag);
                    };
                    overrides.push((field, value.clone()));
                    i += 2;
                }
            }
        }

        Command::Simulate {
            overrides,
            config_path,
            verbose,
        }
    }
}

fn field_for_flag(flag: &str) -> Option<InputField> {
    let key = flag.strip_prefix("--")?;
    InputField::ALL.into_iter().find(|field| field.key() == key)
}

fn missing_value(flag: &str) -> Command {
    Command::Invalid {
        reason: format!("option '{flag}' requires a value"),
    }
}
