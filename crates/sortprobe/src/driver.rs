//! TableDriver - Abstract Browser Collaborator
//!
//! The verification engine never talks to a browser directly. It issues the
//! handful of operations below through [`TableDriver`], which lets the same
//! engine run against Chromium over CDP ([`crate::ChromiumDriver`], feature
//! `browser`) or against the scripted in-memory table in [`crate::mock`].
//!
//! Every call returns (or fails) before the next one is issued. The page
//! update a click triggers is still asynchronous, which is why the engine
//! polls through [`crate::wait`] instead of trusting the click to finish the
//! re-render.

use crate::locator::Locator;
use crate::result::SortProbeResult;
use async_trait::async_trait;
use std::time::SystemTime;

/// Screenshot data with metadata
#[derive(Debug, Clone)]
pub struct Screenshot {
    /// Raw PNG data
    pub data: Vec<u8>,
    /// Timestamp when screenshot was taken
    pub timestamp: SystemTime,
}

impl Screenshot {
    /// Create a new screenshot
    #[must_use]
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            data,
            timestamp: SystemTime::now(),
        }
    }

    /// Get the size in bytes
    #[must_use]
    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }

    /// Check if screenshot has data
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.data.is_empty()
    }
}

/// Abstract driver trait for the browser collaborator
///
/// # Implementations
///
/// - `ChromiumDriver` - uses chromiumoxide (feature `browser`)
/// - `MockTable` - scripted table for unit testing
#[async_trait]
pub trait TableDriver: Send + Sync {
    /// Read the raw text of every element matching `locator`, in document order
    async fn texts(&self, locator: &Locator) -> SortProbeResult<Vec<String>>;

    /// Activate (click) the first element matching `locator`
    async fn click(&self, locator: &Locator) -> SortProbeResult<()>;

    /// Scroll the first element matching `locator` into view
    async fn scroll_into_view(&self, locator: &Locator) -> SortProbeResult<()>;

    /// Capture a full-page PNG snapshot
    async fn screenshot(&self) -> SortProbeResult<Screenshot>;
}
