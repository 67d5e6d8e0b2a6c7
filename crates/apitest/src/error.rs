//! Error types for building and dispatching a test request.
//!
//! Expectation mismatches are not errors: they are collected as
//! [`Mismatch`](crate::predicate::Mismatch) values and routed to a
//! [`Reporter`](crate::response::Reporter).

/// Boxed error returned by handlers and services under test.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, ApiTestError>;

/// Error types for declaring and dispatching a request.
#[derive(Debug, thiserror::Error)]
pub enum ApiTestError {
    #[error("no HTTP method was set before dispatch")]
    MissingMethod,
    #[error("invalid HTTP method: {0}")]
    InvalidMethod(String),
    #[error("invalid basic auth credentials {0:?}: expected \"user:pass\"")]
    InvalidBasicAuth(String),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("failed to serialize request body: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("handler failed to produce a response: {0}")]
    Handler(BoxError),
    #[error("failed to start runtime: {0}")]
    Runtime(#[from] std::io::Error),
}

impl From<hyper::http::Error> for ApiTestError {
    fn from(e: hyper::http::Error) -> Self {
        ApiTestError::InvalidRequest(e.to_string())
    }
}
