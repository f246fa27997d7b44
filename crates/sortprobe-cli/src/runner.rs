//! Command handlers

use crate::commands::{OrderArgs, RunArgs, ValidateArgs};
use crate::error::{CliError, CliResult};
use crate::output::Printer;
use sortprobe::{expected_order, SortMode, SortSuite, SuiteConfig};

/// Print the expected orders of the given values
pub fn run_order(printer: &Printer, args: &OrderArgs) -> CliResult<()> {
    let mode = SortMode::from(args.mode);
    let order = expected_order(&args.values, mode)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&order)?);
    } else {
        printer.line(&format!("mode:       {mode}"));
        printer.line(&format!("ascending:  {:?}", order.ascending));
        printer.line(&format!("descending: {:?}", order.descending));
    }
    Ok(())
}

/// Load a suite file and report what would run
pub fn run_validate(printer: &Printer, args: &ValidateArgs) -> CliResult<()> {
    let suite = SuiteConfig::load(&args.suite)?;

    printer.success(&format!(
        "{} is valid: {} column(s) on {}",
        args.suite.display(),
        suite.columns.len(),
        suite.url
    ));
    for column in &suite.columns {
        printer.line(&format!(
            "  {} [{}] {}",
            column.test_id(),
            column.mode,
            column.description()
        ));
    }
    Ok(())
}

/// Apply command-line overrides to a loaded suite
pub fn apply_overrides(mut suite: SuiteConfig, args: &RunArgs) -> CliResult<SuiteConfig> {
    for name in &args.columns {
        if !suite.columns.iter().any(|c| &c.name == name) {
            return Err(CliError::invalid_argument(format!(
                "unknown column {name:?}"
            )));
        }
    }
    if let Some(dir) = &args.report_dir {
        suite.report.directory.clone_from(dir);
    }
    if let Some(ms) = args.timeout_ms {
        suite.wait = suite.wait.with_timeout(ms);
    }
    if args.headed {
        suite.browser.headless = false;
    }
    if args.no_sandbox {
        suite.browser.sandbox = false;
    }
    Ok(suite)
}

/// Columns selected with `--column`, or the whole suite
#[must_use]
pub fn selected_suite(suite: &SuiteConfig, args: &RunArgs) -> SortSuite {
    suite.suite().only(&args.columns)
}

/// Run a suite against Chromium
#[cfg(feature = "browser")]
pub async fn run_suite(printer: &Printer, args: &RunArgs) -> CliResult<()> {
    use sortprobe::{ChromiumDriver, Report, SuiteHarness};

    let suite = apply_overrides(SuiteConfig::load(&args.suite)?, args)?;
    let mut report = Report::new(suite.report.clone());
    let mut harness = SuiteHarness::new().with_verifier(suite.verifier());
    if args.fail_fast {
        harness = harness.with_fail_fast();
    }

    printer.header(&suite.name);
    printer.info(&format!("run {} on {}", report.run_id(), suite.url));

    let driver = ChromiumDriver::launch(suite.browser.clone()).await?;
    let outcome = async {
        driver.goto(&suite.url).await?;
        harness
            .run(&selected_suite(&suite, args), &driver, &mut report)
            .await
    }
    .await;
    if let Err(err) = driver.close().await {
        tracing::warn!(error = %err, "failed to close browser");
    }
    let results = outcome?;

    for result in &results.results {
        printer.column(result);
    }
    printer.summary(&results);
    printer.info(&format!(
        "report written to {}",
        report.config().html_path().display()
    ));

    if results.all_passed() {
        Ok(())
    } else {
        Err(CliError::ColumnsFailed {
            failed: results.failed_count(),
            total: results.total(),
        })
    }
}

/// Run a suite against Chromium
#[cfg(not(feature = "browser"))]
#[allow(clippy::unused_async)]
pub async fn run_suite(_printer: &Printer, args: &RunArgs) -> CliResult<()> {
    apply_overrides(SuiteConfig::load(&args.suite)?, args)?;
    Err(CliError::BrowserUnavailable)
}
