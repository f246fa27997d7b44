//! Suite configuration loaded from YAML.
//!
//! ```yaml
//! name: Table Sorting Test Cases
//! url: https://practice.expandtesting.com/tables
//! wait:
//!   timeout_ms: 10000
//!   poll_interval_ms: 50
//! no_op: fail
//! columns:
//!   - name: Last Name
//!     trigger: { xpath: "//table[@id='table2']//span[@class='last-name']" }
//!     values: { xpath: "//table[@id='table2']/tbody/tr/td[1]" }
//!   - name: Due
//!     trigger: { css: "#table2 span.dues" }
//!     values: { css: "#table2 tbody td.dues" }
//!     mode: numeric
//! report:
//!   directory: target
//!   author: qa
//!   category: functional testcase
//! browser:
//!   headless: true
//! ```

use crate::browser::BrowserConfig;
use crate::harness::SortSuite;
use crate::report::ReportConfig;
use crate::result::{SortProbeError, SortProbeResult};
use crate::verify::{ColumnSpec, NoOpPolicy, VerifierConfig};
use crate::wait::WaitOptions;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

fn default_name() -> String {
    crate::report::DEFAULT_NAME.to_string()
}

/// A complete suite: page, columns and run settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuiteConfig {
    /// Suite name
    #[serde(default = "default_name")]
    pub name: String,
    /// Page holding the table
    pub url: String,
    /// Columns to verify, in run order
    pub columns: Vec<ColumnSpec>,
    /// Re-render wait bounds
    #[serde(default)]
    pub wait: WaitOptions,
    /// No-op sort handling
    #[serde(default)]
    pub no_op: NoOpPolicy,
    /// Report locations and presentation
    #[serde(default)]
    pub report: ReportConfig,
    /// Browser launch options
    #[serde(default)]
    pub browser: BrowserConfig,
}

impl SuiteConfig {
    /// Parse and validate a suite from YAML text
    ///
    /// # Errors
    ///
    /// Returns [`SortProbeError::Config`] if the YAML is malformed or fails
    /// validation
    pub fn from_yaml_str(yaml: &str) -> SortProbeResult<Self> {
        let config: Self = serde_yaml_ng::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a suite file
    ///
    /// # Errors
    ///
    /// Returns [`SortProbeError::Config`] if the file cannot be read or is
    /// invalid
    pub fn load(path: impl AsRef<Path>) -> SortProbeResult<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|e| {
            SortProbeError::config(format!("cannot read {}: {e}", path.display()))
        })?;
        tracing::debug!(path = %path.display(), "loading suite");
        Self::from_yaml_str(&yaml)
    }

    /// Check structural constraints serde cannot express
    ///
    /// # Errors
    ///
    /// Returns [`SortProbeError::Config`] describing the first problem found
    pub fn validate(&self) -> SortProbeResult<()> {
        if self.url.trim().is_empty() {
            return Err(SortProbeError::config("url must not be empty"));
        }
        if self.columns.is_empty() {
            return Err(SortProbeError::config("suite has no columns"));
        }
        if self.wait.poll_interval_ms == 0 {
            return Err(SortProbeError::config("wait.poll_interval_ms must be positive"));
        }

        let mut names = HashSet::new();
        let mut ids = HashSet::new();
        for column in &self.columns {
            if column.name.trim().is_empty() {
                return Err(SortProbeError::config("column name must not be empty"));
            }
            if column.trigger.selector().as_str().is_empty()
                || column.values.selector().as_str().is_empty()
            {
                return Err(SortProbeError::config(format!(
                    "column {:?} has an empty selector",
                    column.name
                )));
            }
            if !names.insert(column.name.as_str()) {
                return Err(SortProbeError::config(format!(
                    "duplicate column {:?}",
                    column.name
                )));
            }
            if !ids.insert(column.test_id()) {
                return Err(SortProbeError::config(format!(
                    "column {:?} collides with another column's test id {}",
                    column.name,
                    column.test_id()
                )));
            }
        }
        Ok(())
    }

    /// Verifier settings for this suite
    #[must_use]
    pub fn verifier(&self) -> VerifierConfig {
        VerifierConfig::new()
            .with_wait(self.wait)
            .with_no_op(self.no_op)
    }

    /// Columns as a runnable suite
    #[must_use]
    pub fn suite(&self) -> SortSuite {
        SortSuite {
            name: self.name.clone(),
            columns: self.columns.clone(),
        }
    }
}
