//! Pure matchers used to judge a captured exchange.
//!
//! Nothing in this module performs I/O or reports failures; every matcher
//! takes the observed data and returns the mismatches it found.
//!
//! # Module Structure
//!
//! - `mismatch` - Outcome types (`Mismatch`, `MatchResult`)
//! - `field_matcher` - Subset and presence matching for headers and cookies
//! - `body_matcher` - JSON-aware and exact body matching
//! - `json_path` - Path evaluation capability and built-in path checks

mod body_matcher;
mod field_matcher;
mod json_path;
mod mismatch;

pub use body_matcher::{is_json_content_type, json_equals, text_equals, BodyMatcher};
pub use field_matcher::{match_subset, FieldKind, FieldMatcher, FieldSource};
pub use json_path::{
    evaluate_body, evaluation_mismatch, EvalError, JsonPathCheck, PathEvaluator, Rfc9535Evaluator,
};
pub use mismatch::{MatchResult, Mismatch, MismatchKind};
