//! Result and error types for sortprobe.

use crate::verify::SortDirection;
use thiserror::Error;

/// Result type for sortprobe operations
pub type SortProbeResult<T> = Result<T, SortProbeError>;

/// Errors that can occur while verifying a table column
#[derive(Debug, Error)]
pub enum SortProbeError {
    /// The awaited DOM mutation did not materialize within the bound
    #[error("Timed out after {ms}ms waiting for {locator} to change")]
    TimeoutExceeded {
        /// Locator that was being watched
        locator: String,
        /// Timeout in milliseconds
        ms: u64,
    },

    /// Extracted order does not match the computed expected order
    #[error(
        "{column} column is NOT sorted correctly in {direction} order: expected {expected:?}, observed {observed:?}"
    )]
    AssertionMismatch {
        /// Column name
        column: String,
        /// Sort direction being checked
        direction: SortDirection,
        /// Expected sequence
        expected: Vec<String>,
        /// Observed sequence
        observed: Vec<String>,
    },

    /// Numeric normalization failed
    #[error("Cannot parse {raw:?} as a number")]
    UnparsableValue {
        /// The raw cell text
        raw: String,
    },

    /// Fault surfaced by the browser collaborator
    #[error("Browser collaborator fault: {message}")]
    Collaborator {
        /// Error message
        message: String,
    },

    /// Browser launch error
    #[error("Failed to launch browser: {message}")]
    BrowserLaunch {
        /// Error message
        message: String,
    },

    /// Invalid or unreadable suite configuration
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SortProbeError {
    /// Create a collaborator fault
    #[must_use]
    pub fn collaborator(message: impl Into<String>) -> Self {
        Self::Collaborator {
            message: message.into(),
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Whether this is a timeout rather than an ordering failure
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::TimeoutExceeded { .. })
    }
}

impl From<serde_yaml_ng::Error> for SortProbeError {
    fn from(err: serde_yaml_ng::Error) -> Self {
        Self::config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_display() {
        let err = SortProbeError::TimeoutExceeded {
            locator: "css=td.dues".to_string(),
            ms: 500,
        };
        assert_eq!(
            err.to_string(),
            "Timed out after 500ms waiting for css=td.dues to change"
        );
        assert!(err.is_timeout());
    }

    #[test]
    fn test_mismatch_display_names_column_and_direction() {
        let err = SortProbeError::AssertionMismatch {
            column: "Due".to_string(),
            direction: SortDirection::Descending,
            expected: vec!["2".to_string(), "1".to_string()],
            observed: vec!["1".to_string(), "2".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.starts_with("Due column is NOT sorted correctly in descending order"));
        assert!(msg.contains(r#"["2", "1"]"#));
        assert!(!err.is_timeout());
    }

    #[test]
    fn test_unparsable_display() {
        let err = SortProbeError::UnparsableValue {
            raw: "N/A".to_string(),
        };
        assert_eq!(err.to_string(), r#"Cannot parse "N/A" as a number"#);
    }

    #[test]
    fn test_io_from() {
        let err: SortProbeError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert!(matches!(err, SortProbeError::Io(_)));
    }
}
