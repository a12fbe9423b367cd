//! In-memory driver for tests without a browser.
//!
//! A [`MockDom`] is a flat, ordered list of [`MockElement`]s keyed by the
//! selector that finds them. Behaviour is scripted: handlers registered for
//! a selector run on click or change and may rewrite the DOM, and a
//! navigate handler renders each route.

use super::PageDriver;
use crate::locator::Selector;
use crate::result::{HarnessError, HarnessResult};
use async_trait::async_trait;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// Runs when a matching element is clicked
pub type ClickHandler = Arc<dyn Fn(&mut MockDom) + Send + Sync>;

/// Runs after a matching element's value or checked state changes
pub type ChangeHandler = Arc<dyn Fn(&mut MockDom) + Send + Sync>;

/// Runs on every navigation with the target URL
pub type NavigateHandler = Arc<dyn Fn(&mut MockDom, &str) + Send + Sync>;

/// Minimal PNG signature returned as the mock screenshot
const PNG_SIGNATURE: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// A scripted element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockElement {
    /// Selector this element answers to
    pub selector: Selector,
    /// Text content
    pub text: String,
    /// Form value
    pub value: String,
    /// Options offered by a select element (empty accepts any value)
    pub options: Vec<String>,
    /// Rendered visibly
    pub visible: bool,
    /// Accepts input
    pub enabled: bool,
    /// Checkbox state
    pub checked: bool,
}

impl MockElement {
    /// Create a visible, enabled element with no text
    #[must_use]
    pub fn new(selector: impl Into<Selector>) -> Self {
        Self {
            selector: selector.into(),
            text: String::new(),
            value: String::new(),
            options: Vec::new(),
            visible: true,
            enabled: true,
            checked: false,
        }
    }

    /// Set text content
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Set form value
    #[must_use]
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    /// Restrict the values a select accepts
    #[must_use]
    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }

    /// Render hidden
    #[must_use]
    pub const fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    /// Render disabled
    #[must_use]
    pub const fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Whether a query selector finds this element
    #[must_use]
    pub fn matches(&self, query: &Selector) -> bool {
        &self.selector == query
    }
}

/// Scripted page state
#[derive(Default)]
pub struct MockDom {
    /// Current URL
    pub url: String,
    /// Document title
    pub title: String,
    elements: Vec<MockElement>,
    click_handlers: Vec<(Selector, ClickHandler)>,
    change_handlers: Vec<(Selector, ChangeHandler)>,
}

impl fmt::Debug for MockDom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockDom")
            .field("url", &self.url)
            .field("title", &self.title)
            .field("elements", &self.elements)
            .field("click_handlers", &self.click_handlers.len())
            .field("change_handlers", &self.change_handlers.len())
            .finish()
    }
}

impl MockDom {
    /// Append an element
    pub fn add(&mut self, element: MockElement) -> &mut Self {
        self.elements.push(element);
        self
    }

    /// Remove every element whose selector matches `query`
    pub fn remove(&mut self, query: &Selector) -> &mut Self {
        self.elements.retain(|el| !el.matches(query));
        self
    }

    /// Remove all elements and handlers, keeping URL and title
    pub fn clear(&mut self) {
        self.elements.clear();
        self.click_handlers.clear();
        self.change_handlers.clear();
    }

    /// Register a click handler
    pub fn on_click(&mut self, selector: impl Into<Selector>, handler: impl Fn(&mut Self) + Send + Sync + 'static) {
        let handler: ClickHandler = Arc::new(handler);
        self.click_handlers.push((selector.into(), handler));
    }

    /// Register a change handler (fill, select, check)
    pub fn on_change(&mut self, selector: impl Into<Selector>, handler: impl Fn(&mut Self) + Send + Sync + 'static) {
        let handler: ChangeHandler = Arc::new(handler);
        self.change_handlers.push((selector.into(), handler));
    }

    /// First element matching `query`
    #[must_use]
    pub fn find(&self, query: &Selector) -> Option<&MockElement> {
        self.elements.iter().find(|el| el.matches(query))
    }

    /// First element matching `query`, mutably
    pub fn find_mut(&mut self, query: &Selector) -> Option<&mut MockElement> {
        self.elements.iter_mut().find(|el| el.matches(query))
    }

    /// Every element matching `query`
    pub fn find_all<'a>(&'a self, query: &'a Selector) -> impl Iterator<Item = &'a MockElement> + 'a {
        self.elements.iter().filter(move |el| el.matches(query))
    }

    /// Form value of the first match, empty when absent
    #[must_use]
    pub fn value_of(&self, query: &Selector) -> String {
        self.find(query).map(|el| el.value.clone()).unwrap_or_default()
    }

    /// Checked state of the first match
    #[must_use]
    pub fn is_checked(&self, query: &Selector) -> bool {
        self.find(query).is_some_and(|el| el.checked)
    }

    /// Replace the text of the first match, adding the element if absent
    pub fn set_text(&mut self, selector: impl Into<Selector>, text: impl Into<String>) {
        let selector = selector.into();
        let text = text.into();
        match self.find_mut(&selector) {
            Some(el) => el.text = text,
            None => self.elements.push(MockElement::new(selector).with_text(text)),
        }
    }

    /// Show or hide the first match
    pub fn set_visible(&mut self, query: &Selector, visible: bool) {
        if let Some(el) = self.find_mut(query) {
            el.visible = visible;
        }
    }

    /// Enable or disable the first match
    pub fn set_enabled(&mut self, query: &Selector, enabled: bool) {
        if let Some(el) = self.find_mut(query) {
            el.enabled = enabled;
        }
    }

    fn handler_for(handlers: &[(Selector, ClickHandler)], element: &MockElement) -> Option<ClickHandler> {
        handlers
            .iter()
            .find(|(selector, _)| element.matches(selector))
            .map(|(_, handler)| Arc::clone(handler))
    }
}

/// Mock driver for unit and integration testing
pub struct MockDriver {
    dom: Mutex<MockDom>,
    on_navigate: Mutex<Option<NavigateHandler>>,
    history: Mutex<Vec<String>>,
    navigation_delay: Duration,
    settle_delay: Duration,
}

impl fmt::Debug for MockDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockDriver")
            .field("dom", &self.dom)
            .field("history", &self.history)
            .field("navigation_delay", &self.navigation_delay)
            .field("settle_delay", &self.settle_delay)
            .finish()
    }
}

impl Default for MockDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl MockDriver {
    /// Create a driver on `about:blank`
    #[must_use]
    pub fn new() -> Self {
        Self {
            dom: Mutex::new(MockDom {
                url: "about:blank".to_string(),
                ..MockDom::default()
            }),
            on_navigate: Mutex::new(None),
            history: Mutex::new(Vec::new()),
            navigation_delay: Duration::ZERO,
            settle_delay: Duration::ZERO,
        }
    }

    /// Make every navigation take `delay`
    #[must_use]
    pub const fn with_navigation_delay(mut self, delay: Duration) -> Self {
        self.navigation_delay = delay;
        self
    }

    /// Keep network activity going for `delay` after every settle request
    #[must_use]
    pub const fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    /// Install the route renderer
    pub fn on_navigate(&self, handler: impl Fn(&mut MockDom, &str) + Send + Sync + 'static) -> HarnessResult<()> {
        let handler: NavigateHandler = Arc::new(handler);
        *self
            .on_navigate
            .lock()
            .map_err(|_| HarnessError::driver("mock navigate handler lock poisoned"))? = Some(handler);
        Ok(())
    }

    /// Run `f` against the DOM
    pub fn with_dom<R>(&self, f: impl FnOnce(&mut MockDom) -> R) -> HarnessResult<R> {
        let mut dom = self.dom()?;
        Ok(f(&mut *dom))
    }

    /// Recorded calls, as `action:target`
    pub fn history(&self) -> HarnessResult<Vec<String>> {
        Ok(self.history_guard()?.clone())
    }

    /// Whether a call starting with `prefix` was recorded
    pub fn was_called(&self, prefix: &str) -> HarnessResult<bool> {
        Ok(self.history_guard()?.iter().any(|c| c.starts_with(prefix)))
    }

    fn dom(&self) -> HarnessResult<MutexGuard<'_, MockDom>> {
        self.dom
            .lock()
            .map_err(|_| HarnessError::driver("mock DOM lock poisoned"))
    }

    fn history_guard(&self) -> HarnessResult<MutexGuard<'_, Vec<String>>> {
        self.history
            .lock()
            .map_err(|_| HarnessError::driver("mock history lock poisoned"))
    }

    fn record(&self, call: String) -> HarnessResult<()> {
        self.history_guard()?.push(call);
        Ok(())
    }

    /// Mutate the first match, then fire its change handler
    fn change(
        &self,
        action: &'static str,
        selector: &Selector,
        apply: impl FnOnce(&mut MockElement) -> Result<(), String>,
    ) -> HarnessResult<()> {
        let mut dom = self.dom()?;
        let element = dom
            .find_mut(selector)
            .ok_or_else(|| HarnessError::interaction(action, selector.to_string(), "no matching element"))?;
        apply(element).map_err(|message| HarnessError::interaction(action, selector.to_string(), message))?;
        let snapshot = element.clone();
        if let Some(handler) = MockDom::handler_for(&dom.change_handlers, &snapshot) {
            handler(&mut *dom);
        }
        Ok(())
    }
}

#[async_trait]
impl PageDriver for MockDriver {
    async fn goto(&self, url: &str, timeout: Duration) -> HarnessResult<()> {
        self.record(format!("goto:{url}"))?;
        if self.navigation_delay > timeout {
            tokio::time::sleep(timeout).await;
            return Err(HarnessError::navigation_timeout(url, "load did not complete", timeout));
        }
        if !self.navigation_delay.is_zero() {
            tokio::time::sleep(self.navigation_delay).await;
        }

        let handler = self
            .on_navigate
            .lock()
            .map_err(|_| HarnessError::driver("mock navigate handler lock poisoned"))?
            .clone();
        let mut dom = self.dom()?;
        dom.url = url.to_string();
        if let Some(handler) = handler {
            handler(&mut *dom, url);
        }
        Ok(())
    }

    async fn wait_for_network_idle(&self, timeout: Duration) -> HarnessResult<()> {
        if self.settle_delay > timeout {
            tokio::time::sleep(timeout).await;
            let url = self.dom()?.url.clone();
            return Err(HarnessError::navigation_timeout(url, "network did not go idle", timeout));
        }
        if !self.settle_delay.is_zero() {
            tokio::time::sleep(self.settle_delay).await;
        }
        Ok(())
    }

    async fn current_url(&self) -> HarnessResult<String> {
        Ok(self.dom()?.url.clone())
    }

    async fn title(&self) -> HarnessResult<String> {
        Ok(self.dom()?.title.clone())
    }

    async fn count(&self, selector: &Selector) -> HarnessResult<usize> {
        Ok(self.dom()?.find_all(selector).count())
    }

    async fn is_visible(&self, selector: &Selector) -> HarnessResult<bool> {
        Ok(self.dom()?.find(selector).is_some_and(|el| el.visible))
    }

    async fn is_enabled(&self, selector: &Selector) -> HarnessResult<bool> {
        Ok(self.dom()?.find(selector).is_some_and(|el| el.enabled))
    }

    async fn click(&self, selector: &Selector) -> HarnessResult<()> {
        self.record(format!("click:{selector}"))?;
        let mut dom = self.dom()?;
        let element = dom
            .find(selector)
            .cloned()
            .ok_or_else(|| HarnessError::interaction("click", selector.to_string(), "no matching element"))?;
        if let Some(handler) = MockDom::handler_for(&dom.click_handlers, &element) {
            handler(&mut *dom);
        }
        Ok(())
    }

    async fn fill(&self, selector: &Selector, value: &str) -> HarnessResult<()> {
        self.record(format!("fill:{selector}"))?;
        self.change("fill", selector, |el| {
            el.value = value.to_string();
            Ok(())
        })
    }

    async fn select_option(&self, selector: &Selector, value: &str) -> HarnessResult<()> {
        self.record(format!("select:{selector}={value}"))?;
        self.change("select", selector, |el| {
            if !el.options.is_empty() && !el.options.iter().any(|o| o == value) {
                return Err(format!("no option {value:?}"));
            }
            el.value = value.to_string();
            Ok(())
        })
    }

    async fn set_checked(&self, selector: &Selector, checked: bool) -> HarnessResult<()> {
        self.record(format!("check:{selector}={checked}"))?;
        self.change("check", selector, |el| {
            el.checked = checked;
            Ok(())
        })
    }

    async fn text_content(&self, selector: &Selector) -> HarnessResult<Option<String>> {
        Ok(self.dom()?.find(selector).map(|el| el.text.clone()))
    }

    async fn all_text_contents(&self, selector: &Selector) -> HarnessResult<Vec<String>> {
        Ok(self
            .dom()?
            .find_all(selector)
            .map(|el| el.text.trim().to_string())
            .collect())
    }

    async fn input_value(&self, selector: &Selector) -> HarnessResult<Option<String>> {
        Ok(self.dom()?.find(selector).map(|el| el.value.clone()))
    }

    async fn screenshot(&self) -> HarnessResult<Vec<u8>> {
        self.record("screenshot".to_string())?;
        Ok(PNG_SIGNATURE.to_vec())
    }
}
