//! Response Matcher: collects expectations and judges them on `end()`.

use super::expectation::Expectation;
use super::reporter::Reporter;
use crate::dispatch::Exchange;
use crate::predicate::{
    BodyMatcher, FieldMatcher, JsonPathCheck, Mismatch, PathEvaluator, Rfc9535Evaluator,
};
use bytes::Bytes;
use hyper::{Request, Response};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Expectations bound to one captured exchange.
///
/// Every registration method appends to the expectation list and returns the
/// matcher. Nothing is checked until [`end`](Self::end).
pub struct ResponseMatcher {
    exchange: Exchange,
    expectations: Vec<Expectation>,
    reporter: Box<dyn Reporter>,
    evaluator: Arc<dyn PathEvaluator>,
}

impl fmt::Debug for ResponseMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponseMatcher")
            .field("exchange", &self.exchange)
            .field("expectations", &self.expectations)
            .finish_non_exhaustive()
    }
}

impl ResponseMatcher {
    pub fn new(exchange: Exchange, reporter: Box<dyn Reporter>) -> Self {
        Self {
            exchange,
            expectations: Vec::new(),
            reporter,
            evaluator: Arc::new(Rfc9535Evaluator),
        }
    }

    /// The captured request and response.
    pub fn exchange(&self) -> &Exchange {
        &self.exchange
    }

    /// Replace the JSONPath evaluator used by `json_path*` expectations.
    pub fn with_evaluator<E: PathEvaluator + 'static>(mut self, evaluator: E) -> Self {
        self.evaluator = Arc::new(evaluator);
        self
    }

    fn push(mut self, expectation: Expectation) -> Self {
        self.expectations.push(expectation);
        self
    }

    /// Expect this exact status code.
    pub fn status(self, status: u16) -> Self {
        self.push(Expectation::Status(status))
    }

    /// Expect every listed header with exactly this value. Other headers are ignored.
    pub fn headers<I, K, V>(self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.push(Expectation::Headers(collect_pairs(headers)))
    }

    pub fn header(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers([(name, value)])
    }

    pub fn header_present(self, name: impl Into<String>) -> Self {
        self.push(Expectation::Header(FieldMatcher::Present { name: name.into() }))
    }

    pub fn header_not_present(self, name: impl Into<String>) -> Self {
        self.push(Expectation::Header(FieldMatcher::Absent { name: name.into() }))
    }

    /// Expect every listed cookie with exactly this value. Other cookies are ignored.
    pub fn cookies<I, K, V>(self, cookies: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.push(Expectation::Cookies(collect_pairs(cookies)))
    }

    pub fn cookie_present(self, name: impl Into<String>) -> Self {
        self.push(Expectation::Cookie(FieldMatcher::Present { name: name.into() }))
    }

    pub fn cookie_not_present(self, name: impl Into<String>) -> Self {
        self.push(Expectation::Cookie(FieldMatcher::Absent { name: name.into() }))
    }

    /// Expect this body; compared as JSON when the response declares a JSON content type.
    pub fn body(self, expected: impl Into<String>) -> Self {
        self.push(Expectation::Body(BodyMatcher::Structured(expected.into())))
    }

    /// Expect exactly this body text.
    pub fn body_text(self, expected: impl Into<String>) -> Self {
        self.push(Expectation::Body(BodyMatcher::Text(expected.into())))
    }

    /// Run a custom check. Panics raised inside `callback` propagate out of `end()`.
    pub fn assert<F>(self, callback: F) -> Self
    where
        F: Fn(&Response<Bytes>, &Request<Bytes>) + 'static,
    {
        self.push(Expectation::Assert(Box::new(callback)))
    }

    /// Evaluate `path` against the JSON body and hand every match to `callback`.
    pub fn json_path<F>(self, path: impl Into<String>, callback: F) -> Self
    where
        F: Fn(Vec<Value>) + 'static,
    {
        self.push(Expectation::JsonPath {
            path: path.into(),
            callback: Box::new(callback),
        })
    }

    pub fn json_path_equal(self, path: impl Into<String>, expected: impl Into<Value>) -> Self {
        self.json_path_check(path, JsonPathCheck::Equal(expected.into()))
    }

    pub fn json_path_contains(self, path: impl Into<String>, expected: impl Into<Value>) -> Self {
        self.json_path_check(path, JsonPathCheck::Contains(expected.into()))
    }

    pub fn json_path_len(self, path: impl Into<String>, expected: usize) -> Self {
        self.json_path_check(path, JsonPathCheck::Len(expected))
    }

    fn json_path_check(self, path: impl Into<String>, check: JsonPathCheck) -> Self {
        self.push(Expectation::JsonPathCheck {
            path: path.into(),
            check,
        })
    }

    /// Evaluate every expectation in declaration order and report each mismatch.
    ///
    /// A failed expectation never stops the ones after it. Calling `end` again
    /// re-runs everything against the same exchange.
    pub fn end(&self) {
        for (index, expectation) in self.expectations.iter().enumerate() {
            debug!(index, kind = expectation.label(), "Evaluating expectation");
            let result = expectation.evaluate(&self.exchange, self.evaluator.as_ref());
            for mismatch in &result.mismatches {
                let message = self.format_failure(mismatch);
                warn!(kind = mismatch.kind.label(), "{}", message);
                self.reporter.report(&message);
            }
        }
        self.reporter.conclude();
    }

    fn format_failure(&self, mismatch: &Mismatch) -> String {
        match self.exchange.name() {
            Some(name) => format!("[{name}] {mismatch}"),
            None => mismatch.to_string(),
        }
    }
}

fn collect_pairs<I, K, V>(pairs: I) -> BTreeMap<String, String>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}
