//! Fluent in-process HTTP assertions.
//!
//! Build a request, dispatch it to a handler without opening a socket, and
//! check status, headers, cookies, body and JSONPath selections in one chain.
//!
//! ```no_run
//! use apitest::{ok, ApiTest, PanicReporter};
//! use bytes::Bytes;
//! use http_body_util::Full;
//! use hyper::{Request, Response};
//!
//! let handler = |_req: Request<Full<Bytes>>| async move {
//!     ok(Response::builder()
//!         .header("content-type", "application/json")
//!         .body(Full::new(Bytes::from_static(br#"{"a": 12345}"#)))
//!         .unwrap())
//! };
//!
//! ApiTest::new(handler)
//!     .get("/hello")
//!     .expect_blocking(PanicReporter::default())
//!     .unwrap()
//!     .status(200)
//!     .body(r#"{"a": 12345}"#)
//!     .json_path("$.a", |values| assert_eq!(values, vec![serde_json::json!(12345)]))
//!     .end();
//! ```
//!
//! # Module Structure
//!
//! - `request` - Request Builder (`ApiTest`, `RequestSpec`)
//! - `dispatch` - Handler capability and the captured `Exchange`
//! - `response` - Response Matcher and failure reporters
//! - `predicate` - Pure header/cookie, body and JSONPath matchers
//! - `config` - Base URL and debug logging settings
//! - `error` - Declaration and dispatch errors

pub mod config;
pub mod dispatch;
pub mod error;
pub mod predicate;
pub mod request;
pub mod response;

pub use config::Config;
pub use dispatch::{ok, Exchange, Handler, ServiceHandler};
pub use error::{ApiTestError, BoxError, Result};
pub use predicate::{EvalError, PathEvaluator, Rfc9535Evaluator};
pub use request::{ApiTest, RequestSpec};
pub use response::{PanicReporter, Recorder, Reporter, ResponseMatcher};
