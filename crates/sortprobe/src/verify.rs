//! Column Sort Verifier
//!
//! Drives one full ascending + descending check of a single column:
//!
//! ```text
//! Baseline ──click──► AscendingPending ──await+assert──► AscendingVerified
//!                                                              │
//!                                                            click
//!                                                              ▼
//!          DescendingVerified ◄──await+assert── DescendingPending
//!
//! any step ──error──► Failed
//! ```
//!
//! The expected descending order is derived from the verified ascending
//! values, not from what the table shows after the second click, so a table
//! that renders a wrong but self-consistent descending order still fails.
//! There are no retries: the first error ends the column.

use crate::driver::TableDriver;
use crate::extract::{extract, ValueSequence};
use crate::locator::Locator;
use crate::order::{expected_order, SortMode};
use crate::result::{SortProbeError, SortProbeResult};
use crate::wait::{poll_for_change, ChangeOutcome, WaitOptions};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Smallest first
    Ascending,
    /// Largest first
    Descending,
}

impl SortDirection {
    /// The other direction
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ascending => f.write_str("ascending"),
            Self::Descending => f.write_str("descending"),
        }
    }
}

/// A sortable column under test
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    /// Column name, e.g. "Last Name"
    pub name: String,
    /// Clickable header control
    pub trigger: Locator,
    /// Every cell of the column, in row order
    pub values: Locator,
    /// Comparison mode
    #[serde(default)]
    pub mode: SortMode,
    /// Test case description for the report
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ColumnSpec {
    /// Create a column spec
    #[must_use]
    pub fn new(name: impl Into<String>, trigger: Locator, values: Locator, mode: SortMode) -> Self {
        Self {
            name: name.into(),
            trigger,
            values,
            mode,
            description: None,
        }
    }

    /// Set the report description
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Report description, defaulting to one derived from the name
    #[must_use]
    pub fn description(&self) -> String {
        self.description
            .clone()
            .unwrap_or_else(|| format!("Verifies sorting for the {} column", self.name))
    }

    /// Stable test identifier, e.g. `verify_last_name_sorting`
    ///
    /// Used as the report key and the snapshot file stem.
    #[must_use]
    pub fn test_id(&self) -> String {
        let mut slug = String::with_capacity(self.name.len());
        for ch in self.name.chars() {
            if ch.is_ascii_alphanumeric() {
                slug.push(ch.to_ascii_lowercase());
            } else if !slug.is_empty() && !slug.ends_with('_') {
                slug.push('_');
            }
        }
        let slug = slug.trim_end_matches('_');
        if slug.is_empty() {
            "verify_column_sorting".to_string()
        } else {
            format!("verify_{slug}_sorting")
        }
    }
}

/// Recorded result for one direction of one column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SortOutcome {
    /// Column name
    pub column_name: String,
    /// Direction checked
    pub direction: SortDirection,
    /// Values shown by the table
    pub observed: ValueSequence,
    /// Values the table should have shown
    pub expected: ValueSequence,
    /// Whether observed matched expected
    pub passed: bool,
    /// Time spent waiting for the re-render
    pub waited: Duration,
}

/// Verification state of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VerifyPhase {
    /// Capturing the pre-sort values
    Baseline,
    /// Ascending sort triggered, not yet verified
    AscendingPending,
    /// Ascending order confirmed
    AscendingVerified,
    /// Descending sort triggered, not yet verified
    DescendingPending,
    /// Descending order confirmed (success)
    DescendingVerified,
    /// Assertion, timeout, parse or driver failure
    Failed,
}

impl VerifyPhase {
    /// Whether no further transition is possible
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::DescendingVerified | Self::Failed)
    }
}

/// How to treat a sort click that never visibly changes the column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoOpPolicy {
    /// A timeout fails the column
    #[default]
    Fail,
    /// A timeout is accepted and the unchanged values are still checked
    AcceptUnchanged,
}

/// Verifier configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifierConfig {
    /// Re-render wait bounds
    pub wait: WaitOptions,
    /// No-op sort handling
    pub no_op: NoOpPolicy,
}

impl VerifierConfig {
    /// Create config with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set wait options
    #[must_use]
    pub const fn with_wait(mut self, wait: WaitOptions) -> Self {
        self.wait = wait;
        self
    }

    /// Set no-op policy
    #[must_use]
    pub const fn with_no_op(mut self, policy: NoOpPolicy) -> Self {
        self.no_op = policy;
        self
    }
}

/// Full record of one column's verification
#[derive(Debug)]
pub struct ColumnVerification {
    /// Column name
    pub column: String,
    /// Phase the state machine stopped in
    pub phase: VerifyPhase,
    /// Outcomes emitted, including a failing one
    pub outcomes: Vec<SortOutcome>,
    /// Error that ended the column, if any
    pub error: Option<SortProbeError>,
}

impl ColumnVerification {
    /// Whether both directions verified
    #[must_use]
    pub fn passed(&self) -> bool {
        self.phase == VerifyPhase::DescendingVerified && self.error.is_none()
    }

    /// Convert into the outcomes or the terminating error
    pub fn into_result(self) -> SortProbeResult<Vec<SortOutcome>> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.outcomes),
        }
    }
}

/// Verifies click-to-sort columns through a [`TableDriver`]
#[derive(Debug)]
pub struct ColumnSortVerifier<'a, D: TableDriver + ?Sized> {
    driver: &'a D,
    config: VerifierConfig,
}

impl<'a, D: TableDriver + ?Sized> ColumnSortVerifier<'a, D> {
    /// Create a verifier over `driver`
    #[must_use]
    pub fn new(driver: &'a D, config: VerifierConfig) -> Self {
        Self { driver, config }
    }

    /// Get the configuration
    #[must_use]
    pub const fn config(&self) -> &VerifierConfig {
        &self.config
    }

    /// Verify ascending then descending sort of `spec`
    ///
    /// # Errors
    ///
    /// Returns the first [`SortProbeError`] raised: a timeout, an order
    /// mismatch, an unparsable numeric cell or a driver fault.
    pub async fn verify_column(&self, spec: &ColumnSpec) -> SortProbeResult<Vec<SortOutcome>> {
        self.run_column(spec).await.into_result()
    }

    /// Verify `spec` and keep the full record, including the stopping phase
    pub async fn run_column(&self, spec: &ColumnSpec) -> ColumnVerification {
        tracing::info!(column = %spec.name, mode = %spec.mode, "verifying column sort");

        let mut run = ColumnVerification {
            column: spec.name.clone(),
            phase: VerifyPhase::Baseline,
            outcomes: Vec::with_capacity(2),
            error: None,
        };

        if let Err(err) = self.drive(spec, &mut run).await {
            tracing::info!(
                column = %spec.name,
                phase = ?run.phase,
                error = %err,
                "column sort failed"
            );
            run.phase = VerifyPhase::Failed;
            run.error = Some(err);
        } else {
            tracing::info!(column = %spec.name, "column sorted correctly in both directions");
        }
        run
    }

    async fn drive(
        &self,
        spec: &ColumnSpec,
        run: &mut ColumnVerification,
    ) -> SortProbeResult<()> {
        let original = extract(self.driver, &spec.values).await?;
        tracing::debug!(column = %spec.name, rows = original.len(), "baseline captured");

        self.trigger(&spec.trigger).await?;
        transition(run, VerifyPhase::AscendingPending);
        let (actual_asc, waited) = self.await_render(spec, &original).await?;
        let expected = expected_order(&actual_asc, spec.mode)?;
        record_outcome(
            spec,
            run,
            SortDirection::Ascending,
            actual_asc.clone(),
            expected.ascending,
            waited,
        )?;
        transition(run, VerifyPhase::AscendingVerified);

        self.trigger(&spec.trigger).await?;
        transition(run, VerifyPhase::DescendingPending);
        let (actual_desc, waited) = self.await_render(spec, &actual_asc).await?;
        record_outcome(
            spec,
            run,
            SortDirection::Descending,
            actual_desc,
            expected.descending,
            waited,
        )?;
        transition(run, VerifyPhase::DescendingVerified);
        Ok(())
    }

    async fn trigger(&self, trigger: &Locator) -> SortProbeResult<()> {
        self.driver.scroll_into_view(trigger).await?;
        self.driver.click(trigger).await
    }

    async fn await_render(
        &self,
        spec: &ColumnSpec,
        baseline: &[String],
    ) -> SortProbeResult<(ValueSequence, Duration)> {
        let wait = &self.config.wait;
        match poll_for_change(self.driver, &spec.values, baseline, wait).await? {
            ChangeOutcome::Changed { values, elapsed } => Ok((values, elapsed)),
            ChangeOutcome::TimedOut { last, elapsed } => match self.config.no_op {
                NoOpPolicy::Fail => Err(SortProbeError::TimeoutExceeded {
                    locator: spec.values.to_string(),
                    ms: wait.timeout_ms,
                }),
                NoOpPolicy::AcceptUnchanged => {
                    tracing::info!(
                        column = %spec.name,
                        "no visible change, checking unchanged values"
                    );
                    Ok((last, elapsed))
                }
            },
        }
    }
}

/// Compare, push the outcome, then fail on mismatch
fn record_outcome(
    spec: &ColumnSpec,
    run: &mut ColumnVerification,
    direction: SortDirection,
    observed: ValueSequence,
    expected: ValueSequence,
    waited: Duration,
) -> SortProbeResult<()> {
    let passed = spec.mode.matches(&observed, &expected)?;
    run.outcomes.push(SortOutcome {
        column_name: spec.name.clone(),
        direction,
        observed: observed.clone(),
        expected: expected.clone(),
        passed,
        waited,
    });

    if passed {
        tracing::info!(column = %spec.name, %direction, "column sorted correctly");
        Ok(())
    } else {
        Err(SortProbeError::AssertionMismatch {
            column: spec.name.clone(),
            direction,
            expected,
            observed,
        })
    }
}

fn transition(run: &mut ColumnVerification, next: VerifyPhase) {
    tracing::debug!(column = %run.column, from = ?run.phase, to = ?next, "phase transition");
    run.phase = next;
}
