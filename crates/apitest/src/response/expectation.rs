//! Declared expectations and how each one is judged.

use crate::dispatch::Exchange;
use crate::predicate::{
    evaluate_body, evaluation_mismatch, match_subset, BodyMatcher, FieldKind, FieldMatcher,
    JsonPathCheck, MatchResult, Mismatch, MismatchKind, PathEvaluator,
};
use bytes::Bytes;
use hyper::{Request, Response};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Caller-supplied check over the response and the request that produced it.
pub type AssertFn = Box<dyn Fn(&Response<Bytes>, &Request<Bytes>)>;

/// Caller-supplied check over the values a JSONPath expression matched.
pub type JsonPathFn = Box<dyn Fn(Vec<Value>)>;

/// One declared expectation.
pub enum Expectation {
    Status(u16),
    Headers(BTreeMap<String, String>),
    /// Header presence or absence
    Header(FieldMatcher),
    Cookies(BTreeMap<String, String>),
    /// Cookie presence or absence
    Cookie(FieldMatcher),
    Body(BodyMatcher),
    Assert(AssertFn),
    JsonPath {
        path: String,
        callback: JsonPathFn,
    },
    JsonPathCheck {
        path: String,
        check: JsonPathCheck,
    },
}

impl Expectation {
    pub fn label(&self) -> &'static str {
        match self {
            Expectation::Status(_) => "status",
            Expectation::Headers(_) => "headers",
            Expectation::Header(_) => "header",
            Expectation::Cookies(_) => "cookies",
            Expectation::Cookie(_) => "cookie",
            Expectation::Body(BodyMatcher::Structured(_)) => "body",
            Expectation::Body(BodyMatcher::Text(_)) => "body_text",
            Expectation::Assert(_) => "assert",
            Expectation::JsonPath { .. } => "json_path",
            Expectation::JsonPathCheck { .. } => "json_path_check",
        }
    }

    /// Judge this expectation against the captured exchange.
    ///
    /// Custom callbacks run here; a panic inside one is not caught.
    pub fn evaluate(&self, exchange: &Exchange, evaluator: &dyn PathEvaluator) -> MatchResult {
        match self {
            Expectation::Status(expected) => {
                let actual = exchange.status().as_u16();
                if actual == *expected {
                    MatchResult::pass()
                } else {
                    MatchResult::fail(Mismatch::new(
                        MismatchKind::Status,
                        format!("expected status {expected}, got {actual}"),
                    ))
                }
            }
            Expectation::Headers(expected) => {
                match_subset(FieldKind::Header, expected, exchange.headers())
            }
            Expectation::Header(matcher) => matcher
                .check(FieldKind::Header, exchange.headers())
                .into(),
            Expectation::Cookies(expected) => {
                match_subset(FieldKind::Cookie, expected, exchange.cookies())
            }
            Expectation::Cookie(matcher) => matcher
                .check(FieldKind::Cookie, exchange.cookies())
                .into(),
            Expectation::Body(matcher) => matcher
                .check(exchange.content_type(), exchange.body())
                .into(),
            Expectation::Assert(callback) => {
                callback(exchange.response(), exchange.request());
                MatchResult::pass()
            }
            Expectation::JsonPath { path, callback } => {
                match evaluate_body(evaluator, exchange.body(), path) {
                    Ok(values) => {
                        callback(values);
                        MatchResult::pass()
                    }
                    Err(e) => MatchResult::fail(evaluation_mismatch(path, &e)),
                }
            }
            Expectation::JsonPathCheck { path, check } => {
                match evaluate_body(evaluator, exchange.body(), path) {
                    Ok(values) => check.check(path, &values).into(),
                    Err(e) => MatchResult::fail(evaluation_mismatch(path, &e)),
                }
            }
        }
    }
}

impl fmt::Debug for Expectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expectation::Status(code) => f.debug_tuple("Status").field(code).finish(),
            Expectation::Headers(map) => f.debug_tuple("Headers").field(map).finish(),
            Expectation::Header(m) => f.debug_tuple("Header").field(m).finish(),
            Expectation::Cookies(map) => f.debug_tuple("Cookies").field(map).finish(),
            Expectation::Cookie(m) => f.debug_tuple("Cookie").field(m).finish(),
            Expectation::Body(m) => f.debug_tuple("Body").field(m).finish(),
            Expectation::Assert(_) => f.write_str("Assert(<callback>)"),
            Expectation::JsonPath { path, .. } => f
                .debug_struct("JsonPath")
                .field("path", path)
                .finish_non_exhaustive(),
            Expectation::JsonPathCheck { path, check } => f
                .debug_struct("JsonPathCheck")
                .field("path", path)
                .field("check", check)
                .finish(),
        }
    }
}
