//! Subset matching for headers and cookies.
//!
//! Declared entries must be present with exactly the declared value;
//! anything else in the observed set is ignored. Presence checks are the
//! same comparison with the value left out.

use super::mismatch::{MatchResult, Mismatch, MismatchKind};
use cookie::CookieJar;
use hyper::HeaderMap;
use std::collections::{BTreeMap, HashMap};

/// Which named collection a matcher looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Header,
    Cookie,
}

impl FieldKind {
    fn label(&self) -> &'static str {
        match self {
            FieldKind::Header => "header",
            FieldKind::Cookie => "cookie",
        }
    }

    fn mismatch_kind(&self) -> MismatchKind {
        match self {
            FieldKind::Header => MismatchKind::Header,
            FieldKind::Cookie => MismatchKind::Cookie,
        }
    }
}

/// Anything that can be looked up by field name.
///
/// Returns every value stored under `name`; an empty vector means absent.
pub trait FieldSource {
    fn values(&self, name: &str) -> Vec<&str>;
}

impl FieldSource for HeaderMap {
    // Names are case-insensitive; values that are not visible ASCII are skipped.
    fn values(&self, name: &str) -> Vec<&str> {
        self.get_all(name)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect()
    }
}

impl FieldSource for CookieJar {
    fn values(&self, name: &str) -> Vec<&str> {
        self.get(name).map(|c| vec![c.value()]).unwrap_or_default()
    }
}

impl FieldSource for HashMap<String, String> {
    fn values(&self, name: &str) -> Vec<&str> {
        self.get(name).map(|v| vec![v.as_str()]).unwrap_or_default()
    }
}

impl FieldSource for BTreeMap<String, String> {
    fn values(&self, name: &str) -> Vec<&str> {
        self.get(name).map(|v| vec![v.as_str()]).unwrap_or_default()
    }
}

/// A single header or cookie check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldMatcher {
    /// Present with exactly this value
    Equals { name: String, value: String },

    /// Present with any value
    Present { name: String },

    /// Not present at all
    Absent { name: String },
}

impl FieldMatcher {
    /// Get the field name for this matcher.
    pub fn name(&self) -> &str {
        match self {
            FieldMatcher::Equals { name, .. } => name,
            FieldMatcher::Present { name } => name,
            FieldMatcher::Absent { name } => name,
        }
    }

    /// Check this matcher against an observed collection.
    pub fn check<S: FieldSource + ?Sized>(&self, kind: FieldKind, source: &S) -> Option<Mismatch> {
        let name = self.name();
        let actual = source.values(name);
        let label = kind.label();

        let message = match self {
            FieldMatcher::Equals { value, .. } => {
                if actual.iter().any(|a| a == value) {
                    return None;
                }
                if actual.is_empty() {
                    format!("expected {label} {name:?} to be {value:?}, but it was not present")
                } else {
                    format!(
                        "expected {label} {name:?} to be {value:?}, got {}",
                        quote_all(&actual)
                    )
                }
            }
            FieldMatcher::Present { .. } => {
                if !actual.is_empty() {
                    return None;
                }
                format!("expected {label} {name:?} to be present")
            }
            FieldMatcher::Absent { .. } => {
                if actual.is_empty() {
                    return None;
                }
                format!(
                    "expected {label} {name:?} not to be present, got {}",
                    quote_all(&actual)
                )
            }
        };

        Some(Mismatch::new(kind.mismatch_kind(), message).with_key(name))
    }
}

fn quote_all(values: &[&str]) -> String {
    values
        .iter()
        .map(|v| format!("{v:?}"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Check a declared subset of name/value pairs against an observed collection.
///
/// Every declared pair is checked; the result lists one mismatch per
/// missing or differing entry.
pub fn match_subset<S: FieldSource + ?Sized>(
    kind: FieldKind,
    expected: &BTreeMap<String, String>,
    source: &S,
) -> MatchResult {
    expected
        .iter()
        .filter_map(|(name, value)| {
            FieldMatcher::Equals {
                name: name.clone(),
                value: value.clone(),
            }
            .check(kind, source)
        })
        .collect()
}
