//! CLI command definitions using clap

use clap::{Parser, Subcommand, ValueEnum};
use sortprobe::SortMode;
use std::path::PathBuf;

/// Sortprobe: verify that click-to-sort web table columns really sort
#[derive(Parser, Debug)]
#[command(name = "sortprobe")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a suite against a live page
    Run(RunArgs),

    /// Check a suite file without launching a browser
    Validate(ValidateArgs),

    /// Print the expected ascending and descending order of values
    Order(OrderArgs),
}

/// Arguments for the run command
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Suite file (YAML)
    pub suite: PathBuf,

    /// Override the report directory
    #[arg(long)]
    pub report_dir: Option<PathBuf>,

    /// Show the browser window
    #[arg(long)]
    pub headed: bool,

    /// Disable the chromium sandbox (containers/CI)
    #[arg(long)]
    pub no_sandbox: bool,

    /// Only run the named column (repeatable)
    #[arg(long = "column", value_name = "NAME")]
    pub columns: Vec<String>,

    /// Override the re-render timeout in milliseconds
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Stop after the first failing column
    #[arg(long)]
    pub fail_fast: bool,
}

/// Arguments for the validate command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Suite file (YAML)
    pub suite: PathBuf,
}

/// Arguments for the order command
#[derive(Parser, Debug)]
pub struct OrderArgs {
    /// Comparison mode
    #[arg(long, default_value = "lexicographic")]
    pub mode: ModeArg,

    /// Print the orders as JSON
    #[arg(long)]
    pub json: bool,

    /// Cell values, in current row order
    #[arg(required = true, allow_hyphen_values = true)]
    pub values: Vec<String>,
}

/// Comparison mode argument
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ModeArg {
    /// Ordinal text order
    #[default]
    Lexicographic,
    /// Parsed-number order
    Numeric,
}

impl From<ModeArg> for SortMode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Lexicographic => Self::Lexicographic,
            ModeArg::Numeric => Self::Numeric,
        }
    }
}

/// Color output argument
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColorArg {
    /// Automatic color detection
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for crate::config::ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}
