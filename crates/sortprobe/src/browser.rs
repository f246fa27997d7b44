//! Browser control for live tables.
//!
//! With the `browser` feature, [`ChromiumDriver`] implements
//! [`TableDriver`](crate::TableDriver) over the Chrome DevTools Protocol using
//! chromiumoxide. Element lookups, clicks and scrolls run as injected
//! JavaScript against the first (or every) match of a selector, so CSS and
//! XPath locators behave the same way.

use serde::{Deserialize, Serialize};

/// Browser configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Run in headless mode
    pub headless: bool,
    /// Window width
    pub viewport_width: u32,
    /// Window height
    pub viewport_height: u32,
    /// Path to chromium binary (None = auto-detect)
    pub chromium_path: Option<String>,
    /// Sandbox mode (disable for containers)
    pub sandbox: bool,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            viewport_width: 1366,
            viewport_height: 768,
            chromium_path: None,
            sandbox: true,
        }
    }
}

impl BrowserConfig {
    /// Set viewport dimensions
    #[must_use]
    pub const fn with_viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport_width = width;
        self.viewport_height = height;
        self
    }

    /// Set headless mode
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set chromium path
    #[must_use]
    pub fn with_chromium_path(mut self, path: impl Into<String>) -> Self {
        self.chromium_path = Some(path.into());
        self
    }

    /// Disable sandbox (for containers/CI)
    #[must_use]
    pub const fn with_no_sandbox(mut self) -> Self {
        self.sandbox = false;
        self
    }
}

// ============================================================================
// CDP implementation
// ============================================================================

#[cfg(feature = "browser")]
#[allow(clippy::significant_drop_tightening, clippy::missing_errors_doc)]
mod cdp {
    use super::BrowserConfig;
    use crate::driver::{Screenshot, TableDriver};
    use crate::locator::Locator;
    use crate::result::{SortProbeError, SortProbeResult};
    use async_trait::async_trait;
    use base64::Engine;
    use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig as CdpConfig};
    use chromiumoxide::cdp::browser_protocol::page::{
        CaptureScreenshotFormat, CaptureScreenshotParams,
    };
    use chromiumoxide::error::CdpError;
    use chromiumoxide::page::Page as CdpPage;
    use futures::StreamExt;
    use serde::de::DeserializeOwned;
    use std::future::Future;
    use std::sync::Arc;
    use tokio::sync::Mutex;
    use tokio::task::JoinHandle;

    /// Chromium session driving a single page
    #[derive(Debug)]
    pub struct ChromiumDriver {
        config: BrowserConfig,
        browser: Arc<Mutex<CdpBrowser>>,
        page: Arc<Mutex<CdpPage>>,
        handle: JoinHandle<()>,
    }

    impl ChromiumDriver {
        /// Launch a browser and open a blank page
        ///
        /// # Errors
        ///
        /// Returns error if the browser cannot be launched
        pub async fn launch(config: BrowserConfig) -> SortProbeResult<Self> {
            let mut builder =
                CdpConfig::builder().window_size(config.viewport_width, config.viewport_height);

            if !config.headless {
                builder = builder.with_head();
            }

            if !config.sandbox {
                builder = builder.no_sandbox();
            }

            if let Some(ref path) = config.chromium_path {
                builder = builder.chrome_executable(path);
            }

            let cdp_config = builder
                .build()
                .map_err(|message| SortProbeError::BrowserLaunch { message })?;

            let (browser, mut handler) =
                CdpBrowser::launch(cdp_config)
                    .await
                    .map_err(|e| SortProbeError::BrowserLaunch {
                        message: e.to_string(),
                    })?;

            let handle = tokio::spawn(async move {
                while let Some(h) = handler.next().await {
                    if h.is_err() {
                        break;
                    }
                }
            });

            let page = browser
                .new_page("about:blank")
                .await
                .map_err(|e| SortProbeError::BrowserLaunch {
                    message: e.to_string(),
                })?;

            tracing::info!(headless = config.headless, "browser launched");

            Ok(Self {
                config,
                browser: Arc::new(Mutex::new(browser)),
                page: Arc::new(Mutex::new(page)),
                handle,
            })
        }

        /// Get the browser configuration
        #[must_use]
        pub const fn config(&self) -> &BrowserConfig {
            &self.config
        }

        /// Navigate to `url` and wait for the load to finish
        ///
        /// # Errors
        ///
        /// Returns error if navigation fails
        pub async fn goto(&self, url: &str) -> SortProbeResult<()> {
            let page = self.page.lock().await;
            let failed = |e: CdpError| {
                SortProbeError::collaborator(format!("navigation to {url} failed: {e}"))
            };
            page.goto(url).await.map_err(failed)?;
            page.wait_for_navigation().await.map_err(failed)?;
            tracing::info!(url, "page loaded");
            Ok(())
        }

        /// Close the browser and stop the CDP handler task
        ///
        /// The handler is aborted even when the close command fails.
        ///
        /// # Errors
        ///
        /// Returns error if Chromium rejects the close command
        pub async fn close(self) -> SortProbeResult<()> {
            let browser = self.browser;
            let shutdown = async move {
                let mut browser = browser.lock().await;
                browser
                    .close()
                    .await
                    .map_err(|e| SortProbeError::collaborator(e.to_string()))?;
                if let Err(err) = browser.wait().await {
                    tracing::warn!(error = %err, "chromium did not exit cleanly");
                }
                Ok::<(), SortProbeError>(())
            };
            close_then_abort(shutdown, self.handle).await
        }

        async fn eval<T: DeserializeOwned>(&self, script: String) -> SortProbeResult<T> {
            let page = self.page.lock().await;
            page.evaluate(script)
                .await
                .map_err(|e| SortProbeError::collaborator(e.to_string()))?
                .into_value()
                .map_err(|e| SortProbeError::collaborator(e.to_string()))
        }

        /// Run `action` on the first match of `locator`
        async fn act_on_first(&self, locator: &Locator, action: &str) -> SortProbeResult<()> {
            let script = format!(
                "(() => {{ const el = {}; if (!el) return false; {action}; return true; }})()",
                locator.selector().to_first_query()
            );
            if self.eval::<bool>(script).await? {
                Ok(())
            } else {
                Err(SortProbeError::collaborator(format!(
                    "no element matches {locator}"
                )))
            }
        }
    }

    #[async_trait]
    impl TableDriver for ChromiumDriver {
        async fn texts(&self, locator: &Locator) -> SortProbeResult<Vec<String>> {
            self.eval(locator.selector().to_texts_query()).await
        }

        async fn click(&self, locator: &Locator) -> SortProbeResult<()> {
            self.act_on_first(locator, "el.click()").await
        }

        async fn scroll_into_view(&self, locator: &Locator) -> SortProbeResult<()> {
            self.act_on_first(locator, "el.scrollIntoView({ block: 'center' })")
                .await
        }

        async fn screenshot(&self) -> SortProbeResult<Screenshot> {
            let page = self.page.lock().await;
            let params = CaptureScreenshotParams::builder()
                .format(CaptureScreenshotFormat::Png)
                .capture_beyond_viewport(true)
                .build();

            let shot = page
                .execute(params)
                .await
                .map_err(|e| SortProbeError::collaborator(e.to_string()))?;

            let data = base64::engine::general_purpose::STANDARD
                .decode(&shot.data)
                .map_err(|e| SortProbeError::collaborator(e.to_string()))?;
            Ok(Screenshot::new(data))
        }
    }

    /// Run `shutdown`, then stop the handler task whatever the outcome
    async fn close_then_abort<F>(shutdown: F, handle: JoinHandle<()>) -> SortProbeResult<()>
    where
        F: Future<Output = SortProbeResult<()>>,
    {
        let closed = shutdown.await;
        handle.abort();
        // Cancellation is the expected result here.
        let _ = handle.await;
        tracing::debug!(ok = closed.is_ok(), "browser closed");
        closed
    }

}

#[cfg(feature = "browser")]
pub use cdp::ChromiumDriver;
