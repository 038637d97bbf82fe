//! CLI module for pendular.
//!
//! All command-line logic lives here so it can be tested; `main.rs` only
//! sets up logging and calls [`run_cli`].

mod args;
mod commands;
mod output;

pub use args::{Args, Command};
pub use commands::{run_cli, simulate};
pub use output::{
    format_summary, help_text, print_help, print_summary, print_version, version_string,
    RunSummary,
};

#[cfg(test)]
mod tests;
