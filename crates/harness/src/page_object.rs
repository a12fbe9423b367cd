//! Page Object Model support.
//!
//! [`BasePage`] is the element/action layer every page object composes: it
//! owns a shared driver and the harness configuration, resolves locators
//! on every call and adds the auto-waiting the raw driver lacks. Pages
//! implement [`PageObject`] to get navigation for free.

use crate::config::HarnessConfig;
use crate::driver::PageDriver;
use crate::locator::Locator;
use crate::result::{HarnessError, HarnessResult};
use crate::wait::{poll_until, WaitOptions};
use async_trait::async_trait;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Trait for page objects representing a page of the DMS UI.
///
/// # Example
///
/// ```ignore
/// let login = LoginPage::new(BasePage::new(driver, config));
/// login.navigate().await?;
/// login.login("advisor", "secret").await?;
/// assert!(login.is_logged_in().await?);
/// ```
#[async_trait]
pub trait PageObject: Send + Sync {
    /// Route of this page relative to the base URL (e.g. "/login")
    fn url_pattern(&self) -> &str;

    /// Shared element/action layer
    fn base(&self) -> &BasePage;

    /// Get the page name for logging/debugging
    fn page_name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Navigate to this page's route and wait for it to settle
    async fn navigate(&self) -> HarnessResult<()> {
        debug!(page = self.page_name(), "opening page");
        self.base().navigate_to(self.url_pattern()).await
    }

    /// Whether the browser is currently on this page's route
    async fn is_current(&self) -> HarnessResult<bool> {
        self.base().url_contains(self.url_pattern()).await
    }
}

/// Element/action layer shared by every page object
#[derive(Clone)]
pub struct BasePage {
    driver: Arc<dyn PageDriver>,
    config: HarnessConfig,
}

impl fmt::Debug for BasePage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasePage")
            .field("base_url", &self.config.base_url)
            .finish_non_exhaustive()
    }
}

impl BasePage {
    /// Compose a driver and configuration
    #[must_use]
    pub fn new(driver: Arc<dyn PageDriver>, config: HarnessConfig) -> Self {
        Self { driver, config }
    }

    /// Underlying driver
    #[must_use]
    pub fn driver(&self) -> &Arc<dyn PageDriver> {
        &self.driver
    }

    /// Harness configuration
    #[must_use]
    pub const fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Navigate to a path (resolved against the base URL) or absolute URL,
    /// then wait for the page to settle.
    pub async fn navigate_to(&self, path: &str) -> HarnessResult<()> {
        let url = self.config.url_for(path);
        info!(%url, "navigate");
        self.driver.goto(&url, self.config.navigation_timeout).await?;
        self.wait_for_page_settled().await
    }

    /// Wait until the document is loaded and network activity has stopped
    pub async fn wait_for_page_settled(&self) -> HarnessResult<()> {
        self.driver
            .wait_for_network_idle(self.config.navigation_timeout)
            .await
    }

    /// Wait until `locator` is visible.
    ///
    /// `timeout` falls back to the locator's own timeout, then the
    /// configured action timeout.
    pub async fn wait_for_element(&self, locator: &Locator, timeout: Option<Duration>) -> HarnessResult<()> {
        self.wait_for_visibility(locator, timeout, true).await
    }

    /// Wait until `locator` is hidden or gone
    pub async fn wait_for_element_gone(&self, locator: &Locator, timeout: Option<Duration>) -> HarnessResult<()> {
        self.wait_for_visibility(locator, timeout, false).await
    }

    async fn wait_for_visibility(&self, locator: &Locator, timeout: Option<Duration>, visible: bool) -> HarnessResult<()> {
        let options = self.wait_options(locator, timeout.unwrap_or_else(|| locator.timeout_or(self.config.action_timeout)));
        let selector = locator.selector();
        let result = poll_until(
            || async move { Ok::<_, HarnessError>(self.driver.is_visible(selector).await? == visible) },
            options,
        )
        .await?;
        if result.success {
            Ok(())
        } else {
            Err(HarnessError::ElementTimeout {
                locator: locator.to_string(),
                state: if visible { "visible" } else { "hidden" },
                ms: options.timeout_ms(),
            })
        }
    }

    /// Best-effort visibility probe.
    ///
    /// Polls for up to the visibility probe timeout and returns `false`
    /// instead of failing. Absent and hidden elements are indistinguishable
    /// here; use [`is_attached`](Self::is_attached) to tell them apart.
    pub async fn is_visible(&self, locator: &Locator) -> HarnessResult<bool> {
        let options = self.wait_options(locator, locator.timeout_or(self.config.visibility_probe_timeout));
        let selector = locator.selector();
        let result = poll_until(|| self.driver.is_visible(selector), options).await?;
        if !result.success {
            debug!(%locator, ms = options.timeout_ms(), "not visible");
        }
        Ok(result.success)
    }

    /// Whether at least one element matches right now, visible or not
    pub async fn is_attached(&self, locator: &Locator) -> HarnessResult<bool> {
        Ok(self.driver.count(locator.selector()).await? > 0)
    }

    /// Click once the element is actionable
    pub async fn click(&self, locator: &Locator) -> HarnessResult<()> {
        self.ensure_actionable("click", locator).await?;
        debug!(%locator, "click");
        self.driver.click(locator.selector()).await
    }

    /// Replace the element's value once it is actionable
    pub async fn fill(&self, locator: &Locator, value: &str) -> HarnessResult<()> {
        self.ensure_actionable("fill", locator).await?;
        debug!(%locator, len = value.len(), "fill");
        self.driver.fill(locator.selector(), value).await
    }

    /// Choose an option by value or label once the element is actionable
    pub async fn select_option(&self, locator: &Locator, value: &str) -> HarnessResult<()> {
        self.ensure_actionable("select", locator).await?;
        debug!(%locator, value, "select");
        self.driver.select_option(locator.selector(), value).await
    }

    /// Tick a checkbox
    pub async fn check(&self, locator: &Locator) -> HarnessResult<()> {
        self.set_checked(locator, true).await
    }

    /// Untick a checkbox
    pub async fn uncheck(&self, locator: &Locator) -> HarnessResult<()> {
        self.set_checked(locator, false).await
    }

    async fn set_checked(&self, locator: &Locator, checked: bool) -> HarnessResult<()> {
        self.ensure_actionable("check", locator).await?;
        debug!(%locator, checked, "check");
        self.driver.set_checked(locator.selector(), checked).await
    }

    /// Trimmed text of the first match, empty when absent
    pub async fn text(&self, locator: &Locator) -> HarnessResult<String> {
        Ok(self
            .driver
            .text_content(locator.selector())
            .await?
            .map(|t| t.trim().to_string())
            .unwrap_or_default())
    }

    /// Trimmed text of every match
    pub async fn all_texts(&self, locator: &Locator) -> HarnessResult<Vec<String>> {
        self.driver.all_text_contents(locator.selector()).await
    }

    /// Form value of the first match, empty when absent
    pub async fn value(&self, locator: &Locator) -> HarnessResult<String> {
        Ok(self
            .driver
            .input_value(locator.selector())
            .await?
            .unwrap_or_default())
    }

    /// Number of matches
    pub async fn count(&self, locator: &Locator) -> HarnessResult<usize> {
        self.driver.count(locator.selector()).await
    }

    /// Current page URL
    pub async fn current_url(&self) -> HarnessResult<String> {
        self.driver.current_url().await
    }

    /// Current document title
    pub async fn title(&self) -> HarnessResult<String> {
        self.driver.title().await
    }

    /// Whether the current URL contains `fragment`
    pub async fn url_contains(&self, fragment: &str) -> HarnessResult<bool> {
        Ok(self.current_url().await?.contains(fragment))
    }

    /// Whether the title equals `expected` exactly
    pub async fn title_equals(&self, expected: &str) -> HarnessResult<bool> {
        Ok(self.title().await? == expected)
    }

    /// Write a full-page PNG to the artifacts directory.
    ///
    /// The file is named `<name>-<timestamp>.png`; returns its path.
    pub async fn snapshot(&self, name: &str) -> HarnessResult<PathBuf> {
        let png = self.driver.screenshot().await?;
        tokio::fs::create_dir_all(&self.config.artifacts_dir).await?;
        let stamp = chrono::Local::now().format("%Y%m%dT%H%M%S%.3f");
        let path = self
            .config
            .artifacts_dir
            .join(format!("{}-{stamp}.png", sanitize_file_stem(name)));
        tokio::fs::write(&path, png).await?;
        info!(path = %path.display(), "snapshot written");
        Ok(path)
    }

    /// Poll until the first match is attached, visible and enabled
    async fn ensure_actionable(&self, action: &'static str, locator: &Locator) -> HarnessResult<()> {
        let options = self.wait_options(locator, locator.timeout_or(self.config.action_timeout));
        let selector = locator.selector();
        let result = poll_until(
            || async move {
                Ok::<_, HarnessError>(
                    self.driver.is_visible(selector).await? && self.driver.is_enabled(selector).await?,
                )
            },
            options,
        )
        .await?;
        if result.success {
            Ok(())
        } else {
            Err(HarnessError::interaction(
                action,
                locator.to_string(),
                format!("not attached, visible and enabled within {}ms", options.timeout_ms()),
            ))
        }
    }

    fn wait_options(&self, locator: &Locator, timeout: Duration) -> WaitOptions {
        WaitOptions::new()
            .with_timeout(timeout)
            .with_poll_interval(locator.options().poll_interval)
    }
}

fn sanitize_file_stem(name: &str) -> String {
    let stem: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if stem.is_empty() {
        "snapshot".to_string()
    } else {
        stem
    }
}
