//! Page driver abstraction.
//!
//! [`PageDriver`] is the capability set the page objects need from a
//! browser engine. Everything above this trait speaks in [`Selector`]s and
//! plain values; nothing above it knows which engine is underneath.
//!
//! # Implementations
//!
//! - [`MockDriver`] - in-memory DOM with scripted handlers, for tests
//! - `ChromiumDriver` - real Chromium over CDP (feature `browser`)
//!
//! All methods take `&self` so one driver can be shared by several page
//! objects through an `Arc`.

mod mock;

#[cfg(feature = "browser")]
mod chromium;

pub use mock::{ChangeHandler, ClickHandler, MockDom, MockDriver, MockElement, NavigateHandler};

#[cfg(feature = "browser")]
pub use chromium::ChromiumDriver;

use crate::locator::Selector;
use crate::result::HarnessResult;
use async_trait::async_trait;
use std::time::Duration;

/// Abstract driver trait for browser automation
///
/// Element methods resolve the selector at call time and act on the first
/// match. They never wait: auto-waiting lives in
/// [`BasePage`](crate::page_object::BasePage).
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// Navigate to an absolute URL, failing with `Navigation` after `timeout`
    async fn goto(&self, url: &str, timeout: Duration) -> HarnessResult<()>;

    /// Wait until the document is loaded and network activity has stopped
    async fn wait_for_network_idle(&self, timeout: Duration) -> HarnessResult<()>;

    /// Current page URL
    async fn current_url(&self) -> HarnessResult<String>;

    /// Current document title
    async fn title(&self) -> HarnessResult<String>;

    /// Number of elements matching the selector
    async fn count(&self, selector: &Selector) -> HarnessResult<usize>;

    /// Whether the first match exists and is rendered visibly
    async fn is_visible(&self, selector: &Selector) -> HarnessResult<bool>;

    /// Whether the first match exists and accepts input
    async fn is_enabled(&self, selector: &Selector) -> HarnessResult<bool>;

    /// Click the first match
    async fn click(&self, selector: &Selector) -> HarnessResult<()>;

    /// Replace the value of the first match
    async fn fill(&self, selector: &Selector, value: &str) -> HarnessResult<()>;

    /// Choose an option (by value or label) in the first match
    async fn select_option(&self, selector: &Selector, value: &str) -> HarnessResult<()>;

    /// Set the checked state of the first match
    async fn set_checked(&self, selector: &Selector, checked: bool) -> HarnessResult<()>;

    /// Text content of the first match, `None` when absent
    async fn text_content(&self, selector: &Selector) -> HarnessResult<Option<String>>;

    /// Trimmed text content of every match, in document order
    async fn all_text_contents(&self, selector: &Selector) -> HarnessResult<Vec<String>>;

    /// Form value of the first match, `None` when absent
    async fn input_value(&self, selector: &Selector) -> HarnessResult<Option<String>>;

    /// PNG screenshot of the full page
    async fn screenshot(&self) -> HarnessResult<Vec<u8>>;
}
