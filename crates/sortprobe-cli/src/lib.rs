//! Sortprobe CLI library
//!
//! Command-line interface for sortprobe: run YAML suites against a live
//! page, validate suite files, and preview expected column orders.

#![warn(missing_docs)]

mod commands;
mod config;
mod error;
pub mod logging;
mod output;
mod runner;

pub use commands::{Cli, ColorArg, Commands, ModeArg, OrderArgs, RunArgs, ValidateArgs};
pub use config::{CliConfig, ColorChoice, Verbosity};
pub use error::{CliError, CliResult};
pub use output::Printer;
pub use runner::{apply_overrides, run_order, run_suite, run_validate, selected_suite};
