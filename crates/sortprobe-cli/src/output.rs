//! Styled terminal output

use console::{style, Style, Term};
use sortprobe::{ColumnResult, SuiteResults};
use std::time::Duration;

/// Prints pass/fail lines and summaries
#[derive(Debug)]
pub struct Printer {
    term: Term,
    /// Whether to use colors
    pub use_color: bool,
    /// Quiet mode
    pub quiet: bool,
}

impl Default for Printer {
    fn default() -> Self {
        Self::new(true, false)
    }
}

impl Printer {
    /// Create a printer writing to stdout
    #[must_use]
    pub fn new(use_color: bool, quiet: bool) -> Self {
        Self {
            term: Term::stdout(),
            use_color,
            quiet,
        }
    }

    /// Print a line unless quiet
    pub fn line(&self, message: &str) {
        if !self.quiet {
            let _ = self.term.write_line(message);
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        if self.quiet {
            return;
        }

        let prefix = if self.use_color {
            style("✓").green().bold().to_string()
        } else {
            "PASS".to_string()
        };

        let _ = self.term.write_line(&format!("{prefix} {message}"));
    }

    /// Print a failure message
    pub fn failure(&self, message: &str) {
        // Failures print even in quiet mode
        let prefix = if self.use_color {
            style("✗").red().bold().to_string()
        } else {
            "FAIL".to_string()
        };

        let _ = self.term.write_line(&format!("{prefix} {message}"));
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        if self.quiet {
            return;
        }

        let prefix = if self.use_color {
            style("ℹ").blue().bold().to_string()
        } else {
            "INFO".to_string()
        };

        let _ = self.term.write_line(&format!("{prefix} {message}"));
    }

    /// Print a section header
    pub fn header(&self, title: &str) {
        if self.quiet {
            return;
        }

        let styled = if self.use_color {
            style(title).bold().underlined().to_string()
        } else {
            format!("=== {title} ===")
        };

        let _ = self.term.write_line("");
        let _ = self.term.write_line(&styled);
    }

    /// Print one column's result
    pub fn column(&self, result: &ColumnResult) {
        let timing = format!("({:.2}s)", result.duration.as_secs_f64());
        match &result.error {
            None => self.success(&format!("{} {timing}", result.test_id)),
            Some(error) => {
                self.failure(&format!("{} {timing}", result.test_id));
                let _ = self.term.write_line(&format!("    {error}"));
            }
        }
    }

    /// Print the suite summary
    pub fn summary(&self, results: &SuiteResults) {
        let failed = results.failed_count();
        if self.quiet && failed == 0 {
            return;
        }

        let _ = self.term.write_line("");
        let line = summary_line(
            results.passed_count(),
            failed,
            results.duration,
            self.use_color,
        );
        let _ = self.term.write_line(&line);
    }
}

fn summary_line(passed: usize, failed: usize, duration: Duration, use_color: bool) -> String {
    let total = passed + failed;
    let secs = duration.as_secs_f64();

    if use_color {
        let passed_style = Style::new().green().bold();
        let failed_style = Style::new().red().bold();
        let status = if failed > 0 {
            failed_style.apply_to("FAILED")
        } else {
            passed_style.apply_to("PASSED")
        };
        format!(
            "{status} {total} columns in {secs:.2}s ({} passed, {} failed)",
            passed_style.apply_to(passed),
            if failed > 0 {
                failed_style.apply_to(failed).to_string()
            } else {
                failed.to_string()
            }
        )
    } else {
        let status = if failed > 0 { "FAILED" } else { "PASSED" };
        format!("{status} {total} columns in {secs:.2}s ({passed} passed, {failed} failed)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_summary_line() {
        let line = summary_line(3, 1, Duration::from_millis(2_500), false);
        assert_eq!(line, "FAILED 4 columns in 2.50s (3 passed, 1 failed)");
    }

    #[test]
    fn test_plain_summary_all_passed() {
        let line = summary_line(2, 0, Duration::ZERO, false);
        assert!(line.starts_with("PASSED 2 columns"));
    }
}
