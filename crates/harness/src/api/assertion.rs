//! Response assertions: status, body subset and latency budgets.
//!
//! Every helper is a pure function over a [`ResponseLike`] and returns an
//! [`AssertionError`] carrying expected and actual values.

use super::response::ResponseLike;
use crate::result::AssertionError;
use serde_json::Value;
use std::time::{Duration, Instant};

const BODY_EXCERPT_CHARS: usize = 200;

/// Status code must equal `expected`
pub fn assert_status<R: ResponseLike + ?Sized>(response: &R, expected: u16) -> Result<(), AssertionError> {
    let actual = response.status();
    if actual == expected {
        Ok(())
    } else {
        Err(AssertionError::StatusMismatch {
            expected,
            actual,
            body: truncate(response.body_text(), BODY_EXCERPT_CHARS),
        })
    }
}

/// Every field of `expected` (a JSON object) must be present in the body
/// with an equal value. Fields not named in `expected` are ignored.
pub fn assert_body_fields<R: ResponseLike + ?Sized>(response: &R, expected: &Value) -> Result<(), AssertionError> {
    let Value::Object(expected_fields) = expected else {
        return Err(AssertionError::BodyShape {
            expected: "expected fields given as a JSON object".to_string(),
            actual: expected.to_string(),
        });
    };
    let body = match response.json() {
        Ok(Value::Object(map)) => map,
        _ => {
            return Err(AssertionError::BodyShape {
                expected: "JSON object".to_string(),
                actual: truncate(response.body_text(), BODY_EXCERPT_CHARS),
            })
        }
    };

    for (field, want) in expected_fields {
        match body.get(field) {
            None => {
                return Err(AssertionError::MissingField {
                    field: field.clone(),
                    expected: want.to_string(),
                })
            }
            Some(got) if !values_match(want, got) => {
                return Err(AssertionError::FieldMismatch {
                    field: field.clone(),
                    expected: want.to_string(),
                    actual: got.to_string(),
                })
            }
            Some(_) => {}
        }
    }
    Ok(())
}

/// Time since `start` must not exceed `max`
pub fn assert_response_time(start: Instant, max: Duration) -> Result<(), AssertionError> {
    let elapsed = start.elapsed();
    if elapsed <= max {
        Ok(())
    } else {
        Err(AssertionError::LatencyExceeded {
            actual_ms: elapsed.as_millis() as u64,
            max_ms: max.as_millis() as u64,
        })
    }
}

/// Body must carry a string `error` field; returns it
pub fn assert_error_body<R: ResponseLike + ?Sized>(response: &R) -> Result<String, AssertionError> {
    match response.json() {
        Ok(Value::Object(mut map)) => match map.remove("error") {
            Some(Value::String(message)) => Ok(message),
            Some(other) => Err(AssertionError::FieldMismatch {
                field: "error".to_string(),
                expected: "a string".to_string(),
                actual: other.to_string(),
            }),
            None => Err(AssertionError::MissingField {
                field: "error".to_string(),
                expected: "a string".to_string(),
            }),
        },
        _ => Err(AssertionError::BodyShape {
            expected: "JSON object with an \"error\" field".to_string(),
            actual: truncate(response.body_text(), BODY_EXCERPT_CHARS),
        }),
    }
}

// 100 and 100.0 are the same amount; two integers compare exactly
fn values_match(expected: &Value, actual: &Value) -> bool {
    match (expected, actual) {
        (Value::Number(a), Value::Number(b)) if a.is_f64() || b.is_f64() => {
            matches!((a.as_f64(), b.as_f64()), (Some(x), Some(y)) if (x - y).abs() < f64::EPSILON)
        }
        _ => expected == actual,
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}
