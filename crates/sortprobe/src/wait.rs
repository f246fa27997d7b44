//! Change Awaiter
//!
//! Bounded polling for an asynchronous table re-render.
//!
//! A sort click returns before the table has re-rendered, and the render
//! latency is unknown. A fixed sleep is flaky under slow renders and an
//! unbounded wait hangs forever when the sort turns out to be a no-op (the
//! rows were already in order, or only equal keys moved). So the awaiter
//! polls the column until it differs from a baseline, and gives up at a
//! deadline.
//!
//! Two layers:
//!
//! - [`poll_for_change`] returns a [`ChangeOutcome`] and never fails on
//!   timeout, for callers that want lenient handling
//! - [`await_change`] turns a timeout into [`SortProbeError::TimeoutExceeded`]

use crate::driver::TableDriver;
use crate::extract::{extract, ValueSequence};
use crate::locator::Locator;
use crate::result::{SortProbeError, SortProbeResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::Instant;

// =============================================================================
// CONSTANTS
// =============================================================================

/// Default timeout for a re-render (10 seconds)
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 10_000;

/// Default polling interval (50ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

// =============================================================================
// WAIT OPTIONS
// =============================================================================

/// Options for wait operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaitOptions {
    /// Timeout in milliseconds
    pub timeout_ms: u64,
    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl WaitOptions {
    /// Create new wait options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set timeout in milliseconds
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set polling interval in milliseconds
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Get timeout as Duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Get poll interval as Duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

// =============================================================================
// CHANGE OUTCOME
// =============================================================================

/// Result of polling a column for a change
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeOutcome {
    /// The column differs from the baseline
    Changed {
        /// First differing sequence observed
        values: ValueSequence,
        /// Time spent waiting
        elapsed: Duration,
    },
    /// The deadline passed with the column still equal to the baseline
    TimedOut {
        /// Last sequence observed (equal to the baseline)
        last: ValueSequence,
        /// Time spent waiting
        elapsed: Duration,
    },
}

impl ChangeOutcome {
    /// Check if the column changed
    #[must_use]
    pub const fn is_changed(&self) -> bool {
        matches!(self, Self::Changed { .. })
    }

    /// Time spent waiting
    #[must_use]
    pub const fn elapsed(&self) -> Duration {
        match self {
            Self::Changed { elapsed, .. } | Self::TimedOut { elapsed, .. } => *elapsed,
        }
    }

    /// The sequence the wait ended on
    #[must_use]
    pub fn into_values(self) -> ValueSequence {
        match self {
            Self::Changed { values, .. } => values,
            Self::TimedOut { last, .. } => last,
        }
    }
}

// =============================================================================
// POLLING
// =============================================================================

/// Poll `locator` until its values differ from `baseline` or the timeout
/// elapses
///
/// The column is read at least once, even with a zero timeout. Driver faults
/// abort the wait and propagate unchanged.
pub async fn poll_for_change<D>(
    driver: &D,
    locator: &Locator,
    baseline: &[String],
    options: &WaitOptions,
) -> SortProbeResult<ChangeOutcome>
where
    D: TableDriver + ?Sized,
{
    let start = Instant::now();
    let deadline = start + options.timeout();
    let mut polls = 0_u32;

    loop {
        let current = extract(driver, locator).await?;
        polls += 1;

        if current.as_slice() != baseline {
            tracing::debug!(
                locator = %locator,
                polls,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "column changed"
            );
            return Ok(ChangeOutcome::Changed {
                values: current,
                elapsed: start.elapsed(),
            });
        }

        let now = Instant::now();
        if now >= deadline {
            tracing::debug!(
                locator = %locator,
                polls,
                timeout_ms = options.timeout_ms,
                "column unchanged at deadline"
            );
            return Ok(ChangeOutcome::TimedOut {
                last: current,
                elapsed: start.elapsed(),
            });
        }

        let nap = options.poll_interval().min(deadline - now);
        tokio::time::sleep(nap).await;
    }
}

/// Wait until `locator` differs from `baseline` and return the new values
///
/// # Errors
///
/// Returns [`SortProbeError::TimeoutExceeded`] if the column never changes
/// within `options.timeout_ms`, or any driver fault.
pub async fn await_change<D>(
    driver: &D,
    locator: &Locator,
    baseline: &[String],
    options: &WaitOptions,
) -> SortProbeResult<ValueSequence>
where
    D: TableDriver + ?Sized,
{
    match poll_for_change(driver, locator, baseline, options).await? {
        ChangeOutcome::Changed { values, .. } => Ok(values),
        ChangeOutcome::TimedOut { .. } => Err(SortProbeError::TimeoutExceeded {
            locator: locator.to_string(),
            ms: options.timeout_ms,
        }),
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockColumn, MockTable, SortDefect};
    use crate::order::SortMode;

    fn surnames(delay_ms: u64) -> MockTable {
        MockTable::new()
            .with_render_delay(Duration::from_millis(delay_ms))
            .with_column(
                MockColumn::new("Last Name", "th.last", "td.last", SortMode::Lexicographic)
                    .with_cells(["Smith", "Adams", "Lee"]),
            )
    }

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| (*s).to_string()).collect()
    }

    mod wait_options_tests {
        use super::*;

        #[test]
        fn test_wait_options_default() {
            let opts = WaitOptions::default();
            assert_eq!(opts.timeout_ms, DEFAULT_WAIT_TIMEOUT_MS);
            assert_eq!(opts.poll_interval_ms, DEFAULT_POLL_INTERVAL_MS);
        }

        #[test]
        fn test_wait_options_chained() {
            let opts = WaitOptions::new().with_timeout(500).with_poll_interval(20);
            assert_eq!(opts.timeout(), Duration::from_millis(500));
            assert_eq!(opts.poll_interval(), Duration::from_millis(20));
        }

        #[test]
        fn test_wait_options_partial_yaml() {
            let opts: WaitOptions = serde_yaml_ng::from_str("timeout_ms: 2500").unwrap();
            assert_eq!(opts.timeout_ms, 2500);
            assert_eq!(opts.poll_interval_ms, DEFAULT_POLL_INTERVAL_MS);
        }
    }

    mod await_change_tests {
        use super::*;

        #[tokio::test]
        async fn test_returns_first_differing_sequence() {
            let table = surnames(60);
            let cells = Locator::css("td.last");
            let baseline = extract(&table, &cells).await.unwrap();
            table.click(&Locator::css("th.last")).await.unwrap();

            let opts = WaitOptions::new().with_timeout(2_000).with_poll_interval(10);
            let values = await_change(&table, &cells, &baseline, &opts).await.unwrap();
            assert_eq!(values, strings(&["Adams", "Lee", "Smith"]));
        }

        #[tokio::test]
        async fn test_no_op_sort_times_out_within_bound() {
            let table = surnames(0);
            let cells = Locator::css("td.last");
            table.click(&Locator::css("th.last")).await.unwrap();
            let sorted = extract(&table, &cells).await.unwrap();

            let opts = WaitOptions::new().with_timeout(500).with_poll_interval(50);
            let start = std::time::Instant::now();
            let err = await_change(&table, &cells, &sorted, &opts)
                .await
                .unwrap_err();
            let elapsed = start.elapsed();

            assert!(matches!(err, SortProbeError::TimeoutExceeded { ms: 500, .. }));
            assert!(elapsed >= Duration::from_millis(500));
            assert!(elapsed < Duration::from_millis(1_500));
        }

        #[tokio::test]
        async fn test_unresponsive_table_times_out() {
            let table = surnames(0).with_defect(SortDefect::Unresponsive);
            let cells = Locator::css("td.last");
            let baseline = extract(&table, &cells).await.unwrap();
            table.click(&Locator::css("th.last")).await.unwrap();

            let opts = WaitOptions::new().with_timeout(100).with_poll_interval(10);
            let err = await_change(&table, &cells, &baseline, &opts)
                .await
                .unwrap_err();
            assert!(err.is_timeout());
        }

        #[tokio::test]
        async fn test_driver_fault_propagates() {
            let table = surnames(0);
            table.fail_reads("target closed");
            let opts = WaitOptions::new().with_timeout(100);
            let err = await_change(&table, &Locator::css("td.last"), &[], &opts)
                .await
                .unwrap_err();
            assert!(matches!(err, SortProbeError::Collaborator { .. }));
        }
    }

    mod poll_for_change_tests {
        use super::*;

        #[tokio::test]
        async fn test_timed_out_carries_last_values() {
            let table = surnames(0);
            let cells = Locator::css("td.last");
            let baseline = extract(&table, &cells).await.unwrap();

            let opts = WaitOptions::new().with_timeout(60).with_poll_interval(10);
            let outcome = poll_for_change(&table, &cells, &baseline, &opts)
                .await
                .unwrap();
            assert!(!outcome.is_changed());
            assert!(outcome.elapsed() >= Duration::from_millis(60));
            assert_eq!(outcome.into_values(), baseline);
        }

        #[tokio::test]
        async fn test_zero_timeout_still_reads_once() {
            let table = surnames(0);
            let opts = WaitOptions::new().with_timeout(0);
            let outcome = poll_for_change(&table, &Locator::css("td.last"), &[], &opts)
                .await
                .unwrap();
            assert!(outcome.is_changed());
            assert_eq!(outcome.into_values(), strings(&["Smith", "Adams", "Lee"]));
        }
    }
}
