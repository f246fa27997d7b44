//! Suite harness: runs every column of a suite as an independent test case.
//!
//! Columns run one after another against the same driver. A failing column
//! is recorded in the report (with a snapshot) and the harness moves on to
//! the next one, unless fail-fast is enabled.

use crate::driver::TableDriver;
use crate::report::{CaseInfo, Report};
use crate::result::SortProbeResult;
use crate::verify::{ColumnSortVerifier, ColumnSpec, SortOutcome, VerifierConfig, VerifyPhase};
use std::time::{Duration, Instant};

/// An ordered list of columns on one page
#[derive(Debug, Clone, Default)]
pub struct SortSuite {
    /// Suite name
    pub name: String,
    /// Columns, in run order
    pub columns: Vec<ColumnSpec>,
}

impl SortSuite {
    /// Create an empty suite
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
        }
    }

    /// Add a column
    pub fn add_column(&mut self, column: ColumnSpec) {
        self.columns.push(column);
    }

    /// Add a column, builder style
    #[must_use]
    pub fn with_column(mut self, column: ColumnSpec) -> Self {
        self.columns.push(column);
        self
    }

    /// Keep only the named columns, preserving suite order
    ///
    /// An empty filter keeps everything.
    #[must_use]
    pub fn only(mut self, names: &[String]) -> Self {
        if !names.is_empty() {
            self.columns.retain(|c| names.iter().any(|n| n == &c.name));
        }
        self
    }

    /// Get the number of columns
    #[must_use]
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }
}

/// Result of verifying one column
#[derive(Debug, Clone)]
pub struct ColumnResult {
    /// Stable test identifier
    pub test_id: String,
    /// Column name
    pub column: String,
    /// Phase the verifier stopped in
    pub phase: VerifyPhase,
    /// Outcomes emitted
    pub outcomes: Vec<SortOutcome>,
    /// Error message if failed
    pub error: Option<String>,
    /// Time spent on the column
    pub duration: Duration,
}

impl ColumnResult {
    /// Whether both directions verified
    #[must_use]
    pub fn passed(&self) -> bool {
        self.error.is_none()
    }
}

/// Results from running a suite
#[derive(Debug, Clone)]
pub struct SuiteResults {
    /// Suite name
    pub suite_name: String,
    /// Per-column results, in run order
    pub results: Vec<ColumnResult>,
    /// Total duration
    pub duration: Duration,
}

impl SuiteResults {
    /// Check if all columns passed
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.results.iter().all(ColumnResult::passed)
    }

    /// Count passed columns
    #[must_use]
    pub fn passed_count(&self) -> usize {
        self.results.iter().filter(|r| r.passed()).count()
    }

    /// Count failed columns
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.total() - self.passed_count()
    }

    /// Get total column count
    #[must_use]
    pub fn total(&self) -> usize {
        self.results.len()
    }

    /// Get failed columns
    #[must_use]
    pub fn failures(&self) -> Vec<&ColumnResult> {
        self.results.iter().filter(|r| !r.passed()).collect()
    }
}

/// Runs suites against a driver and records every column in a report
#[derive(Debug, Default)]
pub struct SuiteHarness {
    /// Verifier settings shared by every column
    pub verifier: VerifierConfig,
    /// Whether to stop after the first failing column
    pub fail_fast: bool,
}

impl SuiteHarness {
    /// Create a harness with default settings
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set verifier settings
    #[must_use]
    pub const fn with_verifier(mut self, verifier: VerifierConfig) -> Self {
        self.verifier = verifier;
        self
    }

    /// Enable fail-fast mode
    #[must_use]
    pub const fn with_fail_fast(mut self) -> Self {
        self.fail_fast = true;
        self
    }

    /// Run every column of `suite` in order
    ///
    /// Verification errors never abort the run; they become failing report
    /// entries.
    ///
    /// # Errors
    ///
    /// Returns error only if the report cannot be written
    pub async fn run<D>(
        &self,
        suite: &SortSuite,
        driver: &D,
        report: &mut Report,
    ) -> SortProbeResult<SuiteResults>
    where
        D: TableDriver + ?Sized,
    {
        let start = Instant::now();
        let verifier = ColumnSortVerifier::new(driver, self.verifier);
        let mut results = Vec::with_capacity(suite.columns.len());

        tracing::info!(suite = %suite.name, columns = suite.columns.len(), "running suite");

        for spec in &suite.columns {
            let column_start = Instant::now();
            let run = verifier.run_column(spec).await;
            let duration = column_start.elapsed();

            let test_id = spec.test_id();
            let description = spec.description();
            let case = CaseInfo {
                test_id: &test_id,
                description: &description,
                duration,
            };

            let error = run.error.as_ref().map(ToString::to_string);
            match &error {
                None => report.on_success(case)?,
                Some(detail) => report.on_failure(driver, case, detail).await?,
            }

            let failed = error.is_some();
            results.push(ColumnResult {
                test_id,
                column: run.column,
                phase: run.phase,
                outcomes: run.outcomes,
                error,
                duration,
            });

            if failed && self.fail_fast {
                tracing::info!(column = %spec.name, "fail-fast: stopping after first failure");
                break;
            }
        }

        let results = SuiteResults {
            suite_name: suite.name.clone(),
            results,
            duration: start.elapsed(),
        };
        tracing::info!(
            suite = %suite.name,
            passed = results.passed_count(),
            failed = results.failed_count(),
            "suite finished"
        );
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locator::Locator;
    use crate::mock::{MockColumn, MockTable, SortDefect};
    use crate::order::SortMode;
    use crate::report::{ReportConfig, ReportStatus};
    use crate::wait::WaitOptions;
    use tempfile::TempDir;

    fn suite() -> SortSuite {
        SortSuite::new("members")
            .with_column(ColumnSpec::new(
                "Last Name",
                Locator::css("th.last"),
                Locator::css("td.last"),
                SortMode::Lexicographic,
            ))
            .with_column(ColumnSpec::new(
                "Due",
                Locator::css("th.dues"),
                Locator::css("td.dues"),
                SortMode::Numeric,
            ))
    }

    fn table() -> MockTable {
        MockTable::new()
            .with_render_delay(Duration::from_millis(20))
            .with_column(
                MockColumn::new("Last Name", "th.last", "td.last", SortMode::Lexicographic)
                    .with_cells(["Smith", "Bach", "Doe", "Conway"]),
            )
            .with_column(
                MockColumn::new("Due", "th.dues", "td.dues", SortMode::Numeric)
                    .with_cells(["$50.00", "$51.00", "$100.00", "$50.00"]),
            )
    }

    fn harness() -> SuiteHarness {
        SuiteHarness::new().with_verifier(
            VerifierConfig::new()
                .with_wait(WaitOptions::new().with_timeout(300).with_poll_interval(10)),
        )
    }

    mod suite_tests {
        use super::*;

        #[test]
        fn test_only_filters_in_order() {
            let filtered = suite().only(&["Due".to_string()]);
            assert_eq!(filtered.column_count(), 1);
            assert_eq!(filtered.columns[0].name, "Due");
        }

        #[test]
        fn test_empty_filter_keeps_all() {
            assert_eq!(suite().only(&[]).column_count(), 2);
        }
    }

    mod run_tests {
        use super::*;

        #[tokio::test]
        async fn test_all_columns_pass() {
            let dir = TempDir::new().unwrap();
            let mut report = Report::new(ReportConfig::new().with_directory(dir.path()));
            let table = table();

            let results = harness().run(&suite(), &table, &mut report).await.unwrap();

            assert!(results.all_passed(), "{:?}", results.failures());
            assert_eq!(results.total(), 2);
            assert_eq!(report.passed_count(), 2);
            assert_eq!(report.entries()[0].test_id, "verify_last_name_sorting");
            assert!(results.results[1].outcomes.iter().all(|o| o.passed));
            assert!(dir.path().join("report.html").exists());
        }

        #[tokio::test]
        async fn test_failure_is_recorded_and_run_continues() {
            let dir = TempDir::new().unwrap();
            let mut report = Report::new(ReportConfig::new().with_directory(dir.path()));
            let table = table().with_defect(SortDefect::TextOrder);
            let suite = SortSuite::new("members")
                .with_column(suite().columns[1].clone())
                .with_column(suite().columns[0].clone());

            let results = harness().run(&suite, &table, &mut report).await.unwrap();

            assert_eq!(results.failed_count(), 1);
            assert_eq!(results.passed_count(), 1);
            let failed = &results.failures()[0];
            assert_eq!(failed.column, "Due");
            assert_eq!(failed.phase, VerifyPhase::Failed);
            assert!(failed
                .error
                .as_deref()
                .is_some_and(|e| e.contains("NOT sorted correctly in ascending order")));

            let entry = &report.entries()[0];
            assert_eq!(entry.status, ReportStatus::Fail);
            assert!(dir.path().join("images/verify_due_sorting.png").exists());
        }

        #[tokio::test]
        async fn test_fail_fast_stops_after_first_failure() {
            let dir = TempDir::new().unwrap();
            let mut report = Report::new(ReportConfig::new().with_directory(dir.path()));
            let table = table().with_defect(SortDefect::Unresponsive);

            let results = harness()
                .with_fail_fast()
                .run(&suite(), &table, &mut report)
                .await
                .unwrap();

            assert_eq!(results.total(), 1);
            assert!(!results.all_passed());
            assert_eq!(report.entries().len(), 1);
        }
    }
}
