//! Outcome types shared by every matcher.

use std::fmt;

/// Which facet of the exchange a mismatch was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MismatchKind {
    Status,
    Header,
    Cookie,
    Body,
    JsonPath,
}

impl MismatchKind {
    /// Get the label for this kind.
    pub fn label(&self) -> &'static str {
        match self {
            MismatchKind::Status => "status",
            MismatchKind::Header => "header",
            MismatchKind::Cookie => "cookie",
            MismatchKind::Body => "body",
            MismatchKind::JsonPath => "jsonpath",
        }
    }
}

/// A single failed comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mismatch {
    /// Facet that failed.
    pub kind: MismatchKind,
    /// Header name, cookie name or path expression the mismatch is about.
    pub key: Option<String>,
    /// Human-readable description citing expected and actual values.
    pub message: String,
}

impl Mismatch {
    pub fn new(kind: MismatchKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            key: None,
            message: message.into(),
        }
    }

    /// Set the key this mismatch refers to.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Result of evaluating one expectation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchResult {
    /// Every mismatch found; empty means the expectation passed.
    pub mismatches: Vec<Mismatch>,
}

impl MatchResult {
    pub fn pass() -> Self {
        Self::default()
    }

    pub fn fail(mismatch: Mismatch) -> Self {
        Self {
            mismatches: vec![mismatch],
        }
    }

    pub fn add(&mut self, mismatch: Mismatch) {
        self.mismatches.push(mismatch);
    }

    pub fn is_pass(&self) -> bool {
        self.mismatches.is_empty()
    }

    /// Merge another result into this one.
    pub fn merge(&mut self, other: MatchResult) {
        self.mismatches.extend(other.mismatches);
    }
}

impl From<Option<Mismatch>> for MatchResult {
    fn from(mismatch: Option<Mismatch>) -> Self {
        match mismatch {
            Some(m) => MatchResult::fail(m),
            None => MatchResult::pass(),
        }
    }
}

impl FromIterator<Mismatch> for MatchResult {
    fn from_iter<I: IntoIterator<Item = Mismatch>>(iter: I) -> Self {
        Self {
            mismatches: iter.into_iter().collect(),
        }
    }
}
