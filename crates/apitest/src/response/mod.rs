//! Response Matcher and failure reporting.
//!
//! # Module Structure
//!
//! - `matcher` - `ResponseMatcher`, the chainable expectation API
//! - `expectation` - Expectation kinds and their evaluation
//! - `reporter` - The `Reporter` sink plus `PanicReporter` and `Recorder`

mod expectation;
mod matcher;
mod reporter;

pub use expectation::{AssertFn, Expectation, JsonPathFn};
pub use matcher::ResponseMatcher;
pub use reporter::{PanicReporter, Recorder, Reporter};
