//! Chromium driver over CDP.
//!
//! Every element operation compiles its [`Selector`] to a DOM query and
//! runs a small script in the page. Scripts return `JSON.stringify`'d
//! values so `null`/`undefined` come back as data, not as missing results.

use super::PageDriver;
use crate::locator::Selector;
use crate::result::{HarnessError, HarnessResult};
use crate::wait::NETWORK_IDLE_THRESHOLD_MS;
use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::page::{CaptureScreenshotFormat, CaptureScreenshotParams};
use chromiumoxide::page::Page as CdpPage;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tokio::time::Instant;

const IDLE_POLL_MS: u64 = 100;

/// A Chromium tab driven through CDP
#[derive(Debug, Clone)]
pub struct ChromiumDriver {
    page: CdpPage,
}

#[derive(Debug, Deserialize)]
struct LoadProbe {
    ready: String,
    resources: usize,
}

impl ChromiumDriver {
    /// Wrap an open CDP page
    #[must_use]
    pub const fn new(page: CdpPage) -> Self {
        Self { page }
    }

    /// Evaluate `expr` and decode its JSON-serialized result
    async fn eval<T: DeserializeOwned>(&self, expr: &str) -> HarnessResult<T> {
        let script = format!("JSON.stringify({expr})");
        let raw: String = self
            .page
            .evaluate(script)
            .await
            .map_err(|e| HarnessError::driver(e.to_string()))?
            .into_value()
            .map_err(|e| HarnessError::driver(e.to_string()))?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Run an action script against the first match.
    ///
    /// The body sees the element as `el` and returns `"ok"` or a reason.
    async fn act(&self, action: &'static str, selector: &Selector, body: &str) -> HarnessResult<()> {
        let expr = format!(
            "(() => {{ const el = {query}; if (!el) return 'no matching element'; \
             el.scrollIntoView({{ block: 'center' }}); {body} }})()",
            query = selector.to_query()
        );
        let outcome: String = self.eval(&expr).await?;
        if outcome == "ok" {
            Ok(())
        } else {
            Err(HarnessError::interaction(action, selector.to_string(), outcome))
        }
    }
}

fn js_string(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

#[async_trait]
impl PageDriver for ChromiumDriver {
    async fn goto(&self, url: &str, timeout: Duration) -> HarnessResult<()> {
        match tokio::time::timeout(timeout, self.page.goto(url)).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(HarnessError::navigation(url, e.to_string())),
            Err(_) => Err(HarnessError::navigation_timeout(url, "load did not complete", timeout)),
        }
    }

    async fn wait_for_network_idle(&self, timeout: Duration) -> HarnessResult<()> {
        let probe = "({ ready: document.readyState, \
                     resources: performance.getEntriesByType('resource').length })";
        let deadline = Instant::now() + timeout;
        let quiet = Duration::from_millis(NETWORK_IDLE_THRESHOLD_MS);
        let mut last_count = None;
        let mut quiet_since = Instant::now();

        loop {
            let state: LoadProbe = self.eval(probe).await?;
            let now = Instant::now();
            if state.ready == "complete" {
                if last_count == Some(state.resources) {
                    if now.duration_since(quiet_since) >= quiet {
                        return Ok(());
                    }
                } else {
                    last_count = Some(state.resources);
                    quiet_since = now;
                }
            }
            if now >= deadline {
                return Err(HarnessError::navigation_timeout(
                    self.current_url().await.unwrap_or_default(),
                    "network did not go idle",
                    timeout,
                ));
            }
            tokio::time::sleep(Duration::from_millis(IDLE_POLL_MS).min(deadline - now)).await;
        }
    }

    async fn current_url(&self) -> HarnessResult<String> {
        Ok(self
            .page
            .url()
            .await
            .map_err(|e| HarnessError::driver(e.to_string()))?
            .unwrap_or_default())
    }

    async fn title(&self) -> HarnessResult<String> {
        Ok(self
            .page
            .get_title()
            .await
            .map_err(|e| HarnessError::driver(e.to_string()))?
            .unwrap_or_default())
    }

    async fn count(&self, selector: &Selector) -> HarnessResult<usize> {
        self.eval(&selector.to_count_query()).await
    }

    async fn is_visible(&self, selector: &Selector) -> HarnessResult<bool> {
        let expr = format!(
            "(() => {{ const el = {}; if (!el) return false; \
             const style = getComputedStyle(el); \
             return style.visibility !== 'hidden' && style.display !== 'none' && \
             !!(el.offsetWidth || el.offsetHeight || el.getClientRects().length); }})()",
            selector.to_query()
        );
        self.eval(&expr).await
    }

    async fn is_enabled(&self, selector: &Selector) -> HarnessResult<bool> {
        let expr = format!(
            "(() => {{ const el = {}; return !!el && !el.disabled && \
             el.getAttribute('aria-disabled') !== 'true'; }})()",
            selector.to_query()
        );
        self.eval(&expr).await
    }

    async fn click(&self, selector: &Selector) -> HarnessResult<()> {
        self.act("click", selector, "el.click(); return 'ok';").await
    }

    async fn fill(&self, selector: &Selector, value: &str) -> HarnessResult<()> {
        // Native setter so framework-controlled inputs observe the change
        let body = format!(
            "const proto = el instanceof HTMLTextAreaElement ? HTMLTextAreaElement.prototype \
             : HTMLInputElement.prototype; \
             const setter = Object.getOwnPropertyDescriptor(proto, 'value').set; \
             el.focus(); setter.call(el, {v}); \
             el.dispatchEvent(new Event('input', {{ bubbles: true }})); \
             el.dispatchEvent(new Event('change', {{ bubbles: true }})); return 'ok';",
            v = js_string(value)
        );
        self.act("fill", selector, &body).await
    }

    async fn select_option(&self, selector: &Selector, value: &str) -> HarnessResult<()> {
        let body = format!(
            "const want = {v}; \
             const opt = Array.from(el.options || []).find(o => o.value === want || o.text.trim() === want); \
             if (!opt) return 'no option ' + JSON.stringify(want); \
             el.value = opt.value; \
             el.dispatchEvent(new Event('input', {{ bubbles: true }})); \
             el.dispatchEvent(new Event('change', {{ bubbles: true }})); return 'ok';",
            v = js_string(value)
        );
        self.act("select", selector, &body).await
    }

    async fn set_checked(&self, selector: &Selector, checked: bool) -> HarnessResult<()> {
        let body = format!("if (el.checked !== {checked}) el.click(); return 'ok';");
        self.act("check", selector, &body).await
    }

    async fn text_content(&self, selector: &Selector) -> HarnessResult<Option<String>> {
        let expr = format!(
            "(() => {{ const el = {}; return el ? (el.innerText ?? el.textContent) : null; }})()",
            selector.to_query()
        );
        self.eval(&expr).await
    }

    async fn all_text_contents(&self, selector: &Selector) -> HarnessResult<Vec<String>> {
        let expr = format!("({}).map(el => (el.textContent || '').trim())", selector.to_all_query());
        self.eval(&expr).await
    }

    async fn input_value(&self, selector: &Selector) -> HarnessResult<Option<String>> {
        let expr = format!(
            "(() => {{ const el = {}; return el && 'value' in el ? String(el.value) : null; }})()",
            selector.to_query()
        );
        self.eval(&expr).await
    }

    async fn screenshot(&self) -> HarnessResult<Vec<u8>> {
        use base64::Engine;

        let params = CaptureScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .capture_beyond_viewport(true)
            .build();
        let screenshot = self
            .page
            .execute(params)
            .await
            .map_err(|e| HarnessError::driver(e.to_string()))?;
        base64::engine::general_purpose::STANDARD
            .decode(&screenshot.data)
            .map_err(|e| HarnessError::driver(e.to_string()))
    }
}
