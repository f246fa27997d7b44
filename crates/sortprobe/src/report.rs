//! Report and Failure Reporter
//!
//! An append-only record of test cases, flushed after every change to two
//! artifacts in the report directory:
//!
//! ```text
//! <directory>/
//! ├── report.json        machine-readable entries
//! ├── report.html        human-readable page (dark or standard theme)
//! └── images/
//!     └── <test_id>.png  snapshot of the page at failure time
//! ```
//!
//! A failed snapshot never loses the failure itself: it is logged and the
//! entry is still recorded, without a snapshot path.

use crate::driver::TableDriver;
use crate::result::{SortProbeError, SortProbeResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use uuid::Uuid;

/// Default HTML document title
pub const DEFAULT_TITLE: &str = "Dynamic Web Table Test Report";

/// Default report name shown in the page heading
pub const DEFAULT_NAME: &str = "Table Sorting Test Cases";

// =============================================================================
// ENTRIES
// =============================================================================

/// Status of a recorded test case
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    /// Test passed
    Pass,
    /// Test failed
    Fail,
}

impl ReportStatus {
    /// Check if status is passing
    #[must_use]
    pub const fn is_pass(&self) -> bool {
        matches!(self, Self::Pass)
    }

    const fn css_class(self) -> &'static str {
        match self {
            Self::Pass => "pass",
            Self::Fail => "fail",
        }
    }
}

/// Identity and timing of one test case
#[derive(Debug, Clone, Copy)]
pub struct CaseInfo<'a> {
    /// Stable test identifier
    pub test_id: &'a str,
    /// Human-readable description
    pub description: &'a str,
    /// How long the case ran
    pub duration: Duration,
}

/// One recorded test case
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportEntry {
    /// Stable test identifier
    pub test_id: String,
    /// Human-readable description
    pub description: String,
    /// Pass or fail
    pub status: ReportStatus,
    /// Failure detail
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Snapshot captured at failure time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<PathBuf>,
    /// Duration in milliseconds
    pub duration_ms: u64,
    /// Author tag
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// Category tag
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Device tag
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
    /// When the case was recorded
    pub timestamp: DateTime<Utc>,
}

impl ReportEntry {
    /// Create a passing entry
    #[must_use]
    pub fn pass(case: CaseInfo<'_>) -> Self {
        Self {
            test_id: case.test_id.to_string(),
            description: case.description.to_string(),
            status: ReportStatus::Pass,
            message: None,
            snapshot: None,
            duration_ms: case.duration.as_millis() as u64,
            author: None,
            category: None,
            device: None,
            timestamp: Utc::now(),
        }
    }

    /// Create a failing entry
    #[must_use]
    pub fn fail(case: CaseInfo<'_>, message: impl Into<String>) -> Self {
        Self {
            status: ReportStatus::Fail,
            message: Some(message.into()),
            ..Self::pass(case)
        }
    }

    /// Attach a snapshot path
    #[must_use]
    pub fn with_snapshot(mut self, path: impl Into<PathBuf>) -> Self {
        self.snapshot = Some(path.into());
        self
    }
}

// =============================================================================
// CONFIGURATION
// =============================================================================

/// Visual theme of the HTML artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportTheme {
    /// Light text on dark background
    #[default]
    Dark,
    /// Dark text on light background
    Standard,
}

/// Where and how the report is written
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Report directory
    pub directory: PathBuf,
    /// JSON artifact file name, relative to `directory`
    pub json_file: String,
    /// HTML artifact file name, relative to `directory`
    pub html_file: String,
    /// Snapshot directory, relative to `directory` unless absolute
    pub snapshot_dir: PathBuf,
    /// HTML document title
    pub title: String,
    /// Report name shown in the heading
    pub name: String,
    /// HTML theme
    pub theme: ReportTheme,
    /// Author tag applied to every entry
    pub author: Option<String>,
    /// Category tag applied to every entry
    pub category: Option<String>,
    /// Device tag applied to every entry
    pub device: Option<String>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("target"),
            json_file: "report.json".to_string(),
            html_file: "report.html".to_string(),
            snapshot_dir: PathBuf::from("images"),
            title: DEFAULT_TITLE.to_string(),
            name: DEFAULT_NAME.to_string(),
            theme: ReportTheme::Dark,
            author: None,
            category: None,
            device: None,
        }
    }
}

impl ReportConfig {
    /// Create config with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the report directory
    #[must_use]
    pub fn with_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.directory = directory.into();
        self
    }

    /// Set the HTML theme
    #[must_use]
    pub const fn with_theme(mut self, theme: ReportTheme) -> Self {
        self.theme = theme;
        self
    }

    /// Set the document title
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the author tag
    #[must_use]
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    /// Set the category tag
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Path of the JSON artifact
    #[must_use]
    pub fn json_path(&self) -> PathBuf {
        self.directory.join(&self.json_file)
    }

    /// Path of the HTML artifact
    #[must_use]
    pub fn html_path(&self) -> PathBuf {
        self.directory.join(&self.html_file)
    }

    /// Deterministic snapshot path for a test case
    #[must_use]
    pub fn snapshot_path(&self, test_id: &str) -> PathBuf {
        self.directory
            .join(&self.snapshot_dir)
            .join(format!("{test_id}.png"))
    }
}

// =============================================================================
// REPORT
// =============================================================================

#[derive(Serialize)]
struct ReportDocument<'a> {
    run_id: Uuid,
    title: &'a str,
    name: &'a str,
    started_at: DateTime<Utc>,
    generated_at: DateTime<Utc>,
    passed: usize,
    failed: usize,
    entries: &'a [ReportEntry],
}

/// Append-only test report
#[derive(Debug, Clone)]
pub struct Report {
    config: ReportConfig,
    run_id: Uuid,
    started_at: DateTime<Utc>,
    entries: Vec<ReportEntry>,
}

impl Report {
    /// Create an empty report for a new run
    #[must_use]
    pub fn new(config: ReportConfig) -> Self {
        Self {
            config,
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            entries: Vec::new(),
        }
    }

    /// Get the configuration
    #[must_use]
    pub const fn config(&self) -> &ReportConfig {
        &self.config
    }

    /// Unique id of this run
    #[must_use]
    pub const fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Recorded entries, in append order
    #[must_use]
    pub fn entries(&self) -> &[ReportEntry] {
        &self.entries
    }

    /// Number of passing entries
    #[must_use]
    pub fn passed_count(&self) -> usize {
        self.entries.iter().filter(|e| e.status.is_pass()).count()
    }

    /// Number of failing entries
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.entries.len() - self.passed_count()
    }

    /// Check if no entry failed
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.failed_count() == 0
    }

    /// One-line summary
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "{}: {}/{} passed",
            self.config.name,
            self.passed_count(),
            self.entries.len()
        )
    }

    /// Append an entry, filling unset tags from the configuration
    pub fn append(&mut self, mut entry: ReportEntry) {
        if entry.author.is_none() {
            entry.author.clone_from(&self.config.author);
        }
        if entry.category.is_none() {
            entry.category.clone_from(&self.config.category);
        }
        if entry.device.is_none() {
            entry.device.clone_from(&self.config.device);
        }
        tracing::debug!(test_id = %entry.test_id, status = ?entry.status, "report entry appended");
        self.entries.push(entry);
    }

    /// Write the JSON and HTML artifacts, creating the directory if needed
    ///
    /// # Errors
    ///
    /// Returns error if the directory or either file cannot be written
    pub fn flush(&self) -> SortProbeResult<()> {
        std::fs::create_dir_all(&self.config.directory)?;
        std::fs::write(self.config.json_path(), self.render_json()?)?;
        std::fs::write(self.config.html_path(), self.render_html())?;
        tracing::debug!(
            directory = %self.config.directory.display(),
            entries = self.entries.len(),
            "report flushed"
        );
        Ok(())
    }

    /// Record a passing case and flush
    ///
    /// # Errors
    ///
    /// Returns error if the report cannot be flushed
    pub fn on_success(&mut self, case: CaseInfo<'_>) -> SortProbeResult<()> {
        self.append(ReportEntry::pass(case));
        self.flush()
    }

    /// Record a failing case with a page snapshot and flush
    ///
    /// The snapshot goes to [`ReportConfig::snapshot_path`]. If capturing or
    /// writing it fails, a warning is logged and the entry is recorded
    /// without a snapshot.
    ///
    /// # Errors
    ///
    /// Returns error if the report cannot be flushed
    pub async fn on_failure<D>(
        &mut self,
        driver: &D,
        case: CaseInfo<'_>,
        error_detail: &str,
    ) -> SortProbeResult<()>
    where
        D: TableDriver + ?Sized,
    {
        let path = self.config.snapshot_path(case.test_id);
        let mut entry = ReportEntry::fail(case, error_detail);

        match capture_snapshot(driver, &path).await {
            Ok(()) => entry = entry.with_snapshot(path),
            Err(err) => {
                tracing::warn!(
                    test_id = %case.test_id,
                    error = %err,
                    "failed to capture failure snapshot"
                );
            }
        }

        self.append(entry);
        self.flush()
    }

    /// Render the JSON artifact
    ///
    /// # Errors
    ///
    /// Returns error if serialization fails
    pub fn render_json(&self) -> SortProbeResult<String> {
        let doc = ReportDocument {
            run_id: self.run_id,
            title: &self.config.title,
            name: &self.config.name,
            started_at: self.started_at,
            generated_at: Utc::now(),
            passed: self.passed_count(),
            failed: self.failed_count(),
            entries: &self.entries,
        };
        Ok(serde_json::to_string_pretty(&doc)?)
    }

    /// Render the HTML artifact
    #[must_use]
    pub fn render_html(&self) -> String {
        let mut html = String::new();

        html.push_str(&format!(
            r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <title>{}</title>
    <style>
{}    </style>
</head>
<body>
"#,
            escape_html(&self.config.title),
            theme_css(self.config.theme)
        ));

        html.push_str(&format!(
            r#"<div class="summary">
    <h1>{}</h1>
    <h2>Results: {}/{} passed</h2>
    <p>Run {} started {}</p>
</div>
"#,
            escape_html(&self.config.name),
            self.passed_count(),
            self.entries.len(),
            self.run_id,
            self.started_at.to_rfc3339()
        ));

        for entry in &self.entries {
            html.push_str(&format!(
                r#"<div class="test {}">
    <strong>{}</strong> - {:?} ({}ms)
    <p>{}</p>
"#,
                entry.status.css_class(),
                escape_html(&entry.test_id),
                entry.status,
                entry.duration_ms,
                escape_html(&entry.description)
            ));

            let tags: Vec<&str> = [&entry.author, &entry.category, &entry.device]
                .into_iter()
                .filter_map(Option::as_deref)
                .collect();
            if !tags.is_empty() {
                html.push_str("    <p class=\"tags\">");
                for tag in tags {
                    html.push_str(&format!("<span>{}</span>", escape_html(tag)));
                }
                html.push_str("</p>\n");
            }

            if let Some(message) = &entry.message {
                html.push_str(&format!(
                    "    <div class=\"error\">{}</div>\n",
                    escape_html(message)
                ));
            }

            if let Some(snapshot) = &entry.snapshot {
                let src = self.link_for(snapshot);
                html.push_str(&format!(
                    "    <a href=\"{src}\"><img class=\"snapshot\" src=\"{src}\" alt=\"{}\"></a>\n",
                    escape_html(&entry.test_id)
                ));
            }

            html.push_str(&format!(
                "    <small>{}</small>\n</div>\n",
                entry.timestamp.to_rfc3339()
            ));
        }

        html.push_str("</body>\n</html>\n");
        html
    }

    /// Snapshot link relative to the report directory when possible
    fn link_for(&self, snapshot: &Path) -> String {
        let relative = snapshot
            .strip_prefix(&self.config.directory)
            .unwrap_or(snapshot);
        escape_html(&relative.to_string_lossy())
    }
}

async fn capture_snapshot<D>(driver: &D, path: &Path) -> SortProbeResult<()>
where
    D: TableDriver + ?Sized,
{
    let screenshot = driver.screenshot().await?;
    if !screenshot.is_valid() {
        return Err(SortProbeError::collaborator("screenshot returned no data"));
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, &screenshot.data)?;
    tracing::debug!(
        path = %path.display(),
        bytes = screenshot.size_bytes(),
        "snapshot written"
    );
    Ok(())
}

const fn theme_css(theme: ReportTheme) -> &'static str {
    match theme {
        ReportTheme::Dark => {
            r"        body { font-family: -apple-system, 'Segoe UI', Roboto, sans-serif; margin: 20px; background: #1e1e2e; color: #e0e0e0; }
        .summary { background: #2a2a3c; padding: 20px; border-radius: 8px; margin-bottom: 20px; }
        .test { padding: 10px; margin: 5px 0; border-radius: 4px; background: #2a2a3c; }
        .test.pass { border-left: 4px solid #4caf50; }
        .test.fail { border-left: 4px solid #f44336; }
        .tags span { background: #3c3c52; padding: 2px 6px; margin-right: 4px; border-radius: 3px; }
        .error { color: #ff8a80; font-family: monospace; white-space: pre-wrap; }
        .snapshot { max-width: 480px; border: 1px solid #555; }
"
        }
        ReportTheme::Standard => {
            r"        body { font-family: -apple-system, 'Segoe UI', Roboto, sans-serif; margin: 20px; }
        .summary { background: #f5f5f5; padding: 20px; border-radius: 8px; margin-bottom: 20px; }
        .test { padding: 10px; margin: 5px 0; border-radius: 4px; }
        .test.pass { background: #e8f5e9; border-left: 4px solid #4caf50; }
        .test.fail { background: #ffebee; border-left: 4px solid #f44336; }
        .tags span { background: #eee; padding: 2px 6px; margin-right: 4px; border-radius: 3px; }
        .error { color: #d32f2f; font-family: monospace; white-space: pre-wrap; }
        .snapshot { max-width: 480px; border: 1px solid #ddd; }
"
        }
    }
}

/// Escape HTML special characters
fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
