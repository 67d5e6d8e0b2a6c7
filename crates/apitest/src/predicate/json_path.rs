//! JSONPath evaluation over response bodies.
//!
//! Path syntax belongs to the evaluator. The default evaluator implements
//! RFC 9535 via `serde_json_path`; callers can plug in their own.

use super::mismatch::{Mismatch, MismatchKind};
use serde_json::Value;
use serde_json_path::JsonPath;

/// Failure to evaluate a path expression.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EvalError {
    #[error("invalid JSONPath expression {path:?}: {reason}")]
    InvalidExpression { path: String, reason: String },
    #[error("response body is not valid JSON: {0}")]
    InvalidDocument(String),
}

/// The path-evaluation capability.
pub trait PathEvaluator: Send + Sync {
    /// Evaluate `expression` against `document`, returning every matched value.
    fn evaluate(&self, document: &Value, expression: &str) -> Result<Vec<Value>, EvalError>;
}

/// RFC 9535 JSONPath evaluator.
#[derive(Debug, Default, Clone, Copy)]
pub struct Rfc9535Evaluator;

impl PathEvaluator for Rfc9535Evaluator {
    fn evaluate(&self, document: &Value, expression: &str) -> Result<Vec<Value>, EvalError> {
        let path = JsonPath::parse(expression).map_err(|e| EvalError::InvalidExpression {
            path: expression.to_string(),
            reason: e.to_string(),
        })?;
        Ok(path.query(document).all().into_iter().cloned().collect())
    }
}

/// Parse a raw body and evaluate `expression` against it.
pub fn evaluate_body(
    evaluator: &dyn PathEvaluator,
    body: &[u8],
    expression: &str,
) -> Result<Vec<Value>, EvalError> {
    let document: Value =
        serde_json::from_slice(body).map_err(|e| EvalError::InvalidDocument(e.to_string()))?;
    evaluator.evaluate(&document, expression)
}

/// Mismatch for a path that could not be evaluated at all.
pub fn evaluation_mismatch(expression: &str, err: &EvalError) -> Mismatch {
    Mismatch::new(
        MismatchKind::JsonPath,
        format!("could not evaluate JSONPath {expression:?}: {err}"),
    )
    .with_key(expression)
}

/// Built-in judgements over the values a path matched.
#[derive(Debug, Clone, PartialEq)]
pub enum JsonPathCheck {
    /// The matched value equals this one
    Equal(Value),

    /// The matched values (or the single matched array/string) contain this one
    Contains(Value),

    /// The matched collection has this many entries
    Len(usize),
}

impl JsonPathCheck {
    /// Judge the values returned for `expression`.
    pub fn check(&self, expression: &str, values: &[Value]) -> Option<Mismatch> {
        let actual = collapse(values);
        let message = match self {
            JsonPathCheck::Equal(expected) => {
                if &actual == expected {
                    return None;
                }
                format!("expected JSONPath {expression:?} to equal {expected}, got {actual}")
            }
            JsonPathCheck::Contains(expected) => {
                if contains(values, expected) {
                    return None;
                }
                format!("expected JSONPath {expression:?} to contain {expected}, got {actual}")
            }
            JsonPathCheck::Len(expected) => {
                let len = length(values);
                if len == *expected {
                    return None;
                }
                format!("expected JSONPath {expression:?} to have length {expected}, got {len}")
            }
        };
        Some(Mismatch::new(MismatchKind::JsonPath, message).with_key(expression))
    }
}

// A single match stands for itself; anything else is judged as a list.
fn collapse(values: &[Value]) -> Value {
    match values {
        [single] => single.clone(),
        _ => Value::Array(values.to_vec()),
    }
}

fn contains(values: &[Value], expected: &Value) -> bool {
    match (values, expected) {
        ([Value::Array(items)], _) => items.contains(expected),
        ([Value::String(haystack)], Value::String(needle)) => haystack.contains(needle.as_str()),
        _ => values.contains(expected),
    }
}

fn length(values: &[Value]) -> usize {
    match values {
        [Value::Array(items)] => items.len(),
        [Value::Object(map)] => map.len(),
        [Value::String(s)] => s.chars().count(),
        _ => values.len(),
    }
}
