//! HTTP responses as seen by tests.

use crate::result::HarnessResult;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

/// Anything the assertion helpers can inspect
pub trait ResponseLike {
    /// HTTP status code
    fn status(&self) -> u16;

    /// Raw body text
    fn body_text(&self) -> &str;

    /// Body parsed as JSON
    fn json(&self) -> HarnessResult<Value> {
        Ok(serde_json::from_str(self.body_text())?)
    }
}

/// A completed API call.
///
/// The body is kept as text and parsed only when asked for, so error
/// statuses with non-JSON bodies are still inspectable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    method: String,
    path: String,
    status: u16,
    elapsed: Duration,
    body: String,
}

impl ApiResponse {
    /// Assemble a response
    #[must_use]
    pub fn new(
        method: impl Into<String>,
        path: impl Into<String>,
        status: u16,
        elapsed: Duration,
        body: impl Into<String>,
    ) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            status,
            elapsed,
            body: body.into(),
        }
    }

    /// Request method
    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Request path (with query string)
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Round-trip time including the body
    #[must_use]
    pub const fn elapsed(&self) -> Duration {
        self.elapsed
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// DELETE outcome: either 200 or 204 counts
    #[must_use]
    pub const fn is_deleted(&self) -> bool {
        matches!(self.status, 200 | 204)
    }

    /// Deserialize the body
    pub fn json_as<T: DeserializeOwned>(&self) -> HarnessResult<T> {
        Ok(serde_json::from_str(&self.body)?)
    }

    /// A top-level body field, `None` when absent or the body is not a JSON object
    #[must_use]
    pub fn field(&self, name: &str) -> Option<Value> {
        match serde_json::from_str::<Value>(&self.body) {
            Ok(Value::Object(mut map)) => map.remove(name),
            _ => None,
        }
    }

    /// Non-empty `token` from a login response
    #[must_use]
    pub fn token(&self) -> Option<String> {
        match self.field("token") {
            Some(Value::String(t)) if !t.is_empty() => Some(t),
            _ => None,
        }
    }

    /// Server-assigned `id` from a create response, numeric ids stringified
    #[must_use]
    pub fn created_id(&self) -> Option<String> {
        match self.field("id")? {
            Value::String(id) => Some(id),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// String `error` field of an error body
    #[must_use]
    pub fn error_message(&self) -> Option<String> {
        match self.field("error") {
            Some(Value::String(e)) => Some(e),
            _ => None,
        }
    }
}

impl ResponseLike for ApiResponse {
    fn status(&self) -> u16 {
        self.status
    }

    fn body_text(&self) -> &str {
        &self.body
    }
}
