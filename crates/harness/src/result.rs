//! Result and error types for the DMS harness.

use thiserror::Error;

/// Result type for harness operations
pub type HarnessResult<T> = Result<T, HarnessError>;

/// Errors that can occur while driving the DMS UI or REST API
#[derive(Debug, Error)]
pub enum HarnessError {
    /// Browser executable not found
    #[error("Browser not found. Install Chromium or set CHROMIUM_PATH")]
    BrowserNotFound,

    /// Browser launch error
    #[error("Failed to launch browser: {message}")]
    BrowserLaunch {
        /// Error message
        message: String,
    },

    /// Page never finished loading
    #[error("Navigation to {url} failed: {message}")]
    Navigation {
        /// URL that failed
        url: String,
        /// Error message
        message: String,
        /// Whether the navigation deadline ran out, as opposed to a load failure
        timed_out: bool,
    },

    /// Element never reached the expected visibility state
    #[error("Timed out after {ms}ms waiting for {locator} to become {state}")]
    ElementTimeout {
        /// Locator description
        locator: String,
        /// Expected state ("visible", "hidden", ...)
        state: &'static str,
        /// Timeout in milliseconds
        ms: u64,
    },

    /// Element never became actionable, or the engine rejected the action
    #[error("Cannot {action} {locator}: {message}")]
    Interaction {
        /// Action name ("click", "fill", ...)
        action: &'static str,
        /// Locator description
        locator: String,
        /// Error message
        message: String,
    },

    /// Driver-level failure (script evaluation, screenshot, ...)
    #[error("Driver error: {message}")]
    Driver {
        /// Error message
        message: String,
    },

    /// API operation called before `init()` or after `dispose()`
    #[error("API client not initialized: call init() before {operation}")]
    NotInitialized {
        /// Operation that was attempted
        operation: String,
    },

    /// Request arguments cannot form a valid URL
    #[error("Invalid request {operation}: {message}")]
    InvalidRequest {
        /// Operation that was attempted
        operation: String,
        /// Error message
        message: String,
    },

    /// Assertion failed
    #[error(transparent)]
    Assertion(#[from] AssertionError),

    /// Missing or malformed configuration
    #[error("Configuration error ({key}): {message}")]
    Config {
        /// Environment key
        key: String,
        /// Error message
        message: String,
    },

    /// HTTP transport error (including request timeouts)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl HarnessError {
    /// Create an interaction error
    #[must_use]
    pub fn interaction(
        action: &'static str,
        locator: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Interaction {
            action,
            locator: locator.into(),
            message: message.into(),
        }
    }

    /// Create a navigation error for a load that failed outright
    #[must_use]
    pub fn navigation(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Navigation {
            url: url.into(),
            message: message.into(),
            timed_out: false,
        }
    }

    /// Create a navigation error for a deadline that ran out
    #[must_use]
    pub fn navigation_timeout(url: impl Into<String>, waiting_for: &str, timeout: std::time::Duration) -> Self {
        Self::Navigation {
            url: url.into(),
            message: format!("{waiting_for} within {}ms", timeout.as_millis()),
            timed_out: true,
        }
    }

    /// Create a driver error
    #[must_use]
    pub fn driver(message: impl Into<String>) -> Self {
        Self::Driver {
            message: message.into(),
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn config(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Config {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Whether this failure came from a bounded wait running out
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::ElementTimeout { .. } => true,
            Self::Navigation { timed_out, .. } => *timed_out,
            Self::Http(e) => e.is_timeout(),
            _ => false,
        }
    }
}

/// Assertion failures. Every variant carries expected and actual values.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AssertionError {
    /// HTTP status mismatch
    #[error("Expected status {expected}, got {actual}. Body: {body}")]
    StatusMismatch {
        /// Expected status code
        expected: u16,
        /// Actual status code
        actual: u16,
        /// Truncated response body
        body: String,
    },

    /// A named body field differs
    #[error("Field '{field}' mismatch: expected {expected}, got {actual}")]
    FieldMismatch {
        /// Field name
        field: String,
        /// Expected JSON value
        expected: String,
        /// Actual JSON value
        actual: String,
    },

    /// A named body field is absent
    #[error("Field '{field}' missing from body, expected {expected}")]
    MissingField {
        /// Field name
        field: String,
        /// Expected JSON value
        expected: String,
    },

    /// Response body is not shaped as expected
    #[error("Unexpected body: expected {expected}, got {actual}")]
    BodyShape {
        /// Expected shape
        expected: String,
        /// Actual body excerpt
        actual: String,
    },

    /// Elapsed time exceeded the budget
    #[error("Elapsed {actual_ms}ms exceeds budget {max_ms}ms")]
    LatencyExceeded {
        /// Actual elapsed milliseconds
        actual_ms: u64,
        /// Budget in milliseconds
        max_ms: u64,
    },

    /// Page state differs from expectation
    #[error("{what}: expected {expected:?}, got {actual:?}")]
    PageState {
        /// What was checked
        what: String,
        /// Expected value
        expected: String,
        /// Actual value
        actual: String,
    },
}
