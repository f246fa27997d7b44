//! Sortprobe CLI: verify click-to-sort web table columns
//!
//! ## Usage
//!
//! ```bash
//! sortprobe run suite.yaml                   # Verify every column
//! sortprobe run suite.yaml --column Due      # Verify one column
//! sortprobe validate suite.yaml              # Check a suite file
//! sortprobe order --mode numeric '$5' '$40'  # Preview expected orders
//! ```

use clap::Parser;
use sortprobe_cli::{
    logging, run_order, run_suite, run_validate, Cli, CliConfig, CliResult, ColorChoice, Commands,
    Printer, Verbosity,
};
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();
    let config = build_config(&cli);
    logging::init(&config);

    let printer = Printer::new(config.color.should_color(), config.verbosity.is_quiet());

    match cli.command {
        Commands::Run(args) => {
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(run_suite(&printer, &args))
        }
        Commands::Validate(args) => run_validate(&printer, &args),
        Commands::Order(args) => run_order(&printer, &args),
    }
}

fn build_config(cli: &Cli) -> CliConfig {
    let color: ColorChoice = cli.color.into();
    CliConfig::new()
        .with_verbosity(Verbosity::from_flags(cli.quiet, cli.verbose))
        .with_color(color)
        .with_log_json(cli.log_json)
}
