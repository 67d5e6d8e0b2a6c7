//! Body matching.
//!
//! Structured matching compares JSON documents semantically when the
//! response declares a JSON content type and falls back to exact text
//! otherwise. Text matching is always exact.

use super::mismatch::{Mismatch, MismatchKind};
use assert_json_diff::{assert_json_matches_no_panic, CompareMode, Config, NumericMode};

/// Body matching configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodyMatcher {
    /// JSON-aware comparison driven by the response content type
    Structured(String),

    /// Byte-for-byte comparison regardless of content type
    Text(String),
}

impl BodyMatcher {
    /// Check an observed body against this matcher.
    pub fn check(&self, content_type: Option<&str>, body: &[u8]) -> Option<Mismatch> {
        match self {
            BodyMatcher::Structured(expected) if is_json_content_type(content_type) => {
                json_equals(expected, body)
            }
            BodyMatcher::Structured(expected) | BodyMatcher::Text(expected) => {
                text_equals(expected, body)
            }
        }
    }
}

/// Whether a content type declares a JSON payload.
///
/// Any media type containing "json" counts, so `application/problem+json`
/// and `application/vnd.api+json; charset=utf-8` are both JSON.
pub fn is_json_content_type(content_type: Option<&str>) -> bool {
    content_type.is_some_and(|ct| ct.to_ascii_lowercase().contains("json"))
}

/// Compare two JSON documents structurally.
///
/// Key order and insignificant whitespace are ignored; object key sets must
/// be identical and arrays compare element-wise in order. Numbers compare
/// by value, so `1`, `1.0` and `1e0` are equal, but never equal a string.
pub fn json_equals(expected: &str, actual: &[u8]) -> Option<Mismatch> {
    let expected_json: serde_json::Value = match serde_json::from_str(expected) {
        Ok(v) => v,
        Err(e) => {
            return Some(Mismatch::new(
                MismatchKind::Body,
                format!("expected body is not valid JSON: {e}"),
            ))
        }
    };
    let actual_json: serde_json::Value = match serde_json::from_slice(actual) {
        Ok(v) => v,
        Err(e) => {
            return Some(Mismatch::new(
                MismatchKind::Body,
                format!(
                    "response body is not valid JSON: {e}; body was {:?}",
                    String::from_utf8_lossy(actual)
                ),
            ))
        }
    };

    assert_json_matches_no_panic(
        &actual_json,
        &expected_json,
        Config::new(CompareMode::Strict).numeric_mode(NumericMode::AssumeFloat),
    )
    .err()
    .map(|diff| {
        Mismatch::new(
            MismatchKind::Body,
            format!("body does not match expected JSON {expected_json}:\n{diff}"),
        )
    })
}

/// Compare bytes exactly.
pub fn text_equals(expected: &str, actual: &[u8]) -> Option<Mismatch> {
    if expected.as_bytes() == actual {
        return None;
    }
    Some(Mismatch::new(
        MismatchKind::Body,
        format!(
            "expected body {expected:?}, got {:?}",
            String::from_utf8_lossy(actual)
        ),
    ))
}
