//! Failure sinks.

use parking_lot::Mutex;
use std::sync::Arc;

/// Receives one message per failed expectation.
///
/// `conclude` runs once at the end of every `end()` call, after all
/// expectations have been evaluated.
pub trait Reporter: Send + Sync {
    fn report(&self, message: &str);

    fn conclude(&self) {}
}

/// Fails the current test, listing every mismatch found by one `end()` call.
///
/// Each mismatch is also written to stderr as it is reported, so it stays
/// visible when a custom assertion panics before `end()` can conclude.
#[derive(Debug, Default)]
pub struct PanicReporter {
    pending: Mutex<Vec<String>>,
}

impl Reporter for PanicReporter {
    fn report(&self, message: &str) {
        eprintln!("apitest: {message}");
        self.pending.lock().push(message.to_string());
    }

    fn conclude(&self) {
        let failures = std::mem::take(&mut *self.pending.lock());
        if !failures.is_empty() {
            panic!(
                "{} expectation(s) failed:\n{}",
                failures.len(),
                failures.join("\n")
            );
        }
    }
}

/// Collects failures for later inspection.
///
/// Clones share the same buffer, so keep one handle and pass a clone to
/// `expect`.
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    failures: Arc<Mutex<Vec<String>>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every failure reported so far.
    pub fn failures(&self) -> Vec<String> {
        self.failures.lock().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.failures.lock().is_empty()
    }

    pub fn clear(&self) {
        self.failures.lock().clear();
    }
}

impl Reporter for Recorder {
    fn report(&self, message: &str) {
        self.failures.lock().push(message.to_string());
    }
}
