//! Harness configuration.
//!
//! Read once at suite start from the process environment (and an optional
//! `.env` file), then passed explicitly to page objects and the API client.

use crate::model::Credentials;
use crate::result::{HarnessError, HarnessResult};
use std::path::PathBuf;
use std::time::Duration;

/// Application base URL
pub const ENV_BASE_URL: &str = "BASE_URL";
/// Login username
pub const ENV_USER: &str = "DMS_USER";
/// Login password
pub const ENV_PASS: &str = "DMS_PASS";
/// REST API base URL
pub const ENV_API_BASE_URL: &str = "API_BASE_URL";
/// REST API bearer token
pub const ENV_API_TOKEN: &str = "API_TOKEN";
/// Run the browser headless ("true"/"false")
pub const ENV_HEADLESS: &str = "DMS_HEADLESS";
/// Navigation timeout in milliseconds
pub const ENV_NAV_TIMEOUT_MS: &str = "DMS_NAV_TIMEOUT_MS";
/// Actionability timeout in milliseconds
pub const ENV_ACTION_TIMEOUT_MS: &str = "DMS_ACTION_TIMEOUT_MS";
/// HTTP request timeout in milliseconds
pub const ENV_API_TIMEOUT_MS: &str = "DMS_API_TIMEOUT_MS";
/// Directory for diagnostic snapshots
pub const ENV_ARTIFACTS_DIR: &str = "DMS_ARTIFACTS_DIR";
/// Chromium executable override
pub const ENV_CHROMIUM_PATH: &str = "CHROMIUM_PATH";

/// Default application URL
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";

/// Default navigation timeout (30 seconds)
pub const DEFAULT_NAV_TIMEOUT_MS: u64 = 30_000;
/// Default actionability timeout (10 seconds)
pub const DEFAULT_ACTION_TIMEOUT_MS: u64 = 10_000;
/// Default visibility probe timeout (5 seconds)
pub const DEFAULT_VISIBILITY_PROBE_MS: u64 = 5_000;
/// Default HTTP timeout (30 seconds)
pub const DEFAULT_API_TIMEOUT_MS: u64 = 30_000;

/// Harness configuration
#[derive(Clone)]
pub struct HarnessConfig {
    /// Application base URL (no trailing slash)
    pub base_url: String,
    /// REST API base URL (no trailing slash)
    pub api_base_url: String,
    /// Login username
    pub username: Option<String>,
    /// Login password
    pub password: Option<String>,
    /// REST API bearer token
    pub api_token: Option<String>,
    /// Run the browser headless
    pub headless: bool,
    /// Chromium executable override
    pub chromium_path: Option<String>,
    /// Bound on page loads
    pub navigation_timeout: Duration,
    /// Bound on waiting for an element to become actionable
    pub action_timeout: Duration,
    /// Bound on the best-effort visibility probe
    pub visibility_probe_timeout: Duration,
    /// Bound on one HTTP round trip
    pub api_timeout: Duration,
    /// Where diagnostic snapshots are written
    pub artifacts_dir: PathBuf,
}

impl std::fmt::Debug for HarnessConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HarnessConfig")
            .field("base_url", &self.base_url)
            .field("api_base_url", &self.api_base_url)
            .field("username", &self.username)
            .field("password", &redact(self.password.as_deref()))
            .field("api_token", &redact(self.api_token.as_deref()))
            .field("headless", &self.headless)
            .field("chromium_path", &self.chromium_path)
            .field("navigation_timeout", &self.navigation_timeout)
            .field("action_timeout", &self.action_timeout)
            .field("visibility_probe_timeout", &self.visibility_probe_timeout)
            .field("api_timeout", &self.api_timeout)
            .field("artifacts_dir", &self.artifacts_dir)
            .finish()
    }
}

fn redact(secret: Option<&str>) -> &'static str {
    match secret {
        Some(s) if !s.is_empty() => "<redacted>",
        _ => "<unset>",
    }
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_base_url: format!("{DEFAULT_BASE_URL}/api"),
            username: None,
            password: None,
            api_token: None,
            headless: true,
            chromium_path: None,
            navigation_timeout: Duration::from_millis(DEFAULT_NAV_TIMEOUT_MS),
            action_timeout: Duration::from_millis(DEFAULT_ACTION_TIMEOUT_MS),
            visibility_probe_timeout: Duration::from_millis(DEFAULT_VISIBILITY_PROBE_MS),
            api_timeout: Duration::from_millis(DEFAULT_API_TIMEOUT_MS),
            artifacts_dir: PathBuf::from("target/dms-artifacts"),
        }
    }
}

impl HarnessConfig {
    /// Load from the process environment, reading `.env` first if present.
    pub fn from_env() -> HarnessResult<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "loaded .env");
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> HarnessResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        let base_url = get(ENV_BASE_URL)
            .map_or(defaults.base_url, |u| u.trim_end_matches('/').to_string());
        let api_base_url = get(ENV_API_BASE_URL).map_or_else(
            || format!("{base_url}/api"),
            |u| u.trim_end_matches('/').to_string(),
        );

        Ok(Self {
            api_base_url,
            username: get(ENV_USER),
            password: get(ENV_PASS),
            api_token: get(ENV_API_TOKEN),
            headless: match get(ENV_HEADLESS) {
                Some(v) => parse_bool(ENV_HEADLESS, &v)?,
                None => defaults.headless,
            },
            chromium_path: get(ENV_CHROMIUM_PATH),
            navigation_timeout: parse_ms(ENV_NAV_TIMEOUT_MS, get(ENV_NAV_TIMEOUT_MS))?
                .unwrap_or(defaults.navigation_timeout),
            action_timeout: parse_ms(ENV_ACTION_TIMEOUT_MS, get(ENV_ACTION_TIMEOUT_MS))?
                .unwrap_or(defaults.action_timeout),
            visibility_probe_timeout: defaults.visibility_probe_timeout,
            api_timeout: parse_ms(ENV_API_TIMEOUT_MS, get(ENV_API_TIMEOUT_MS))?
                .unwrap_or(defaults.api_timeout),
            artifacts_dir: get(ENV_ARTIFACTS_DIR).map_or(defaults.artifacts_dir, PathBuf::from),
            base_url,
        })
    }

    /// Set the application base URL
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the REST API base URL
    #[must_use]
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set login credentials
    #[must_use]
    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Set the API token
    #[must_use]
    pub fn with_api_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    /// Set the action timeout
    #[must_use]
    pub const fn with_action_timeout(mut self, timeout: Duration) -> Self {
        self.action_timeout = timeout;
        self
    }

    /// Set the navigation timeout
    #[must_use]
    pub const fn with_navigation_timeout(mut self, timeout: Duration) -> Self {
        self.navigation_timeout = timeout;
        self
    }

    /// Set the visibility probe timeout
    #[must_use]
    pub const fn with_visibility_probe_timeout(mut self, timeout: Duration) -> Self {
        self.visibility_probe_timeout = timeout;
        self
    }

    /// Set the HTTP timeout
    #[must_use]
    pub const fn with_api_timeout(mut self, timeout: Duration) -> Self {
        self.api_timeout = timeout;
        self
    }

    /// Set the artifacts directory
    #[must_use]
    pub fn with_artifacts_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.artifacts_dir = dir.into();
        self
    }

    /// Configured login credentials
    pub fn credentials(&self) -> HarnessResult<Credentials> {
        let username = self
            .username
            .clone()
            .ok_or_else(|| HarnessError::config(ENV_USER, "not set"))?;
        let password = self
            .password
            .clone()
            .ok_or_else(|| HarnessError::config(ENV_PASS, "not set"))?;
        Ok(Credentials::new(username, password))
    }

    /// Configured API token
    pub fn api_token(&self) -> HarnessResult<&str> {
        self.api_token
            .as_deref()
            .ok_or_else(|| HarnessError::config(ENV_API_TOKEN, "not set"))
    }

    /// Resolve a path against the application base URL.
    ///
    /// Absolute URLs are returned unchanged.
    #[must_use]
    pub fn url_for(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Human-readable summary with secrets redacted
    #[must_use]
    pub fn summary(&self) -> Vec<(&'static str, String)> {
        vec![
            (ENV_BASE_URL, self.base_url.clone()),
            (ENV_API_BASE_URL, self.api_base_url.clone()),
            (ENV_USER, self.username.clone().unwrap_or_else(|| "<unset>".to_string())),
            (ENV_PASS, redact(self.password.as_deref()).to_string()),
            (ENV_API_TOKEN, redact(self.api_token.as_deref()).to_string()),
            (ENV_HEADLESS, self.headless.to_string()),
            (ENV_NAV_TIMEOUT_MS, self.navigation_timeout.as_millis().to_string()),
            (ENV_ACTION_TIMEOUT_MS, self.action_timeout.as_millis().to_string()),
            (ENV_API_TIMEOUT_MS, self.api_timeout.as_millis().to_string()),
            (ENV_ARTIFACTS_DIR, self.artifacts_dir.display().to_string()),
        ]
    }
}

fn parse_bool(key: &str, value: &str) -> HarnessResult<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(HarnessError::config(key, format!("expected a boolean, got '{other}'"))),
    }
}

fn parse_ms(key: &str, value: Option<String>) -> HarnessResult<Option<Duration>> {
    value
        .map(|v| {
            v.parse::<u64>()
                .map(Duration::from_millis)
                .map_err(|e| HarnessError::config(key, format!("'{v}' is not a millisecond count: {e}")))
        })
        .transpose()
}
