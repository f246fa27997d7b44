//! Sortprobe: sort verification for dynamically re-rendered web tables
//!
//! Sortprobe clicks the header of a sortable table column, waits for the
//! table to re-render, and checks that the column really is in ascending and
//! then descending order. Failures are recorded in a report together with a
//! snapshot of the page.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    SORTPROBE Architecture                        │
//! ├─────────────────────────────────────────────────────────────────┤
//! │   ┌────────────┐    ┌────────────┐    ┌────────────┐            │
//! │   │ Suite      │    │ Column     │    │ TableDriver│            │
//! │   │ (YAML)     │───►│ Sort       │───►│ (chromium  │            │
//! │   │            │    │ Verifier   │    │  or mock)  │            │
//! │   └────────────┘    └─────┬──────┘    └────────────┘            │
//! │                           │                                      │
//! │          extract ◄── await_change ──► expected_order             │
//! │                           │                                      │
//! │                     ┌─────▼──────┐                               │
//! │                     │ Report     │ JSON + HTML + snapshots       │
//! │                     └────────────┘                               │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use sortprobe::{
//!     ColumnSortVerifier, ColumnSpec, Locator, MockColumn, MockTable, SortMode, VerifierConfig,
//! };
//!
//! # async fn demo() -> sortprobe::SortProbeResult<()> {
//! let table = MockTable::new().with_column(
//!     MockColumn::new("Due", "th.dues", "td.dues", SortMode::Numeric)
//!         .with_cells(["$40.50", "$5.00", "$100.00"]),
//! );
//! let due = ColumnSpec::new(
//!     "Due",
//!     Locator::css("th.dues"),
//!     Locator::css("td.dues"),
//!     SortMode::Numeric,
//! );
//! let outcomes = ColumnSortVerifier::new(&table, VerifierConfig::new())
//!     .verify_column(&due)
//!     .await?;
//! assert!(outcomes.iter().all(|o| o.passed));
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod browser;
mod config;
mod driver;
mod extract;
mod harness;
mod locator;
pub mod mock;
mod order;
mod report;
mod result;
mod verify;

/// Bounded polling for asynchronous re-renders
pub mod wait;

pub use browser::BrowserConfig;
#[cfg(feature = "browser")]
pub use browser::ChromiumDriver;
pub use config::SuiteConfig;
pub use driver::{Screenshot, TableDriver};
pub use extract::{extract, ValueSequence};
pub use harness::{ColumnResult, SortSuite, SuiteHarness, SuiteResults};
pub use locator::{Locator, Selector};
pub use mock::{MockColumn, MockTable, SortDefect};
pub use order::{expected_order, parse_numeric, ExpectedOrder, SortMode};
pub use report::{
    CaseInfo, Report, ReportConfig, ReportEntry, ReportStatus, ReportTheme, DEFAULT_NAME,
    DEFAULT_TITLE,
};
pub use result::{SortProbeError, SortProbeResult};
pub use verify::{
    ColumnSortVerifier, ColumnSpec, ColumnVerification, NoOpPolicy, SortDirection, SortOutcome,
    VerifierConfig, VerifyPhase,
};
pub use wait::{
    await_change, poll_for_change, ChangeOutcome, WaitOptions, DEFAULT_POLL_INTERVAL_MS,
    DEFAULT_WAIT_TIMEOUT_MS,
};
