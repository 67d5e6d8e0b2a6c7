//! Dispatcher: runs one request against the handler under test.
//!
//! This is the only place a chain touches the code under test. The handler
//! is invoked once, in-process, and the full response is captured together
//! with the request it was given.
//!
//! # Module Structure
//!
//! - `handler` - The `Handler` capability and its closure/`tower` adapters
//! - `exchange` - The captured `Exchange` and `Set-Cookie` parsing

mod exchange;
mod handler;

pub use exchange::{parse_set_cookies, Exchange};
pub use handler::{ok, Handler, ServiceHandler};

use crate::error::{ApiTestError, Result};
use bytes::Bytes;
use http_body_util::Full;
use hyper::{HeaderMap, Request};
use tracing::{debug, info};

/// Invoke `handler` with `request` and capture the exchange.
pub async fn dispatch(
    handler: &dyn Handler,
    request: Request<Bytes>,
    name: Option<String>,
    log_exchange: bool,
) -> Result<Exchange> {
    debug!(
        method = %request.method(),
        uri = %request.uri(),
        name = name.as_deref().unwrap_or(""),
        "Dispatching request"
    );
    if log_exchange {
        info!(
            "--> {} {}\n{}\n{}",
            request.method(),
            request.uri(),
            format_headers(request.headers()),
            String::from_utf8_lossy(request.body())
        );
    }

    let sent = copy_request(&request);
    let response = handler
        .call(request.map(Full::new))
        .await
        .map_err(ApiTestError::Handler)?;

    debug!(status = %response.status(), "Handler responded");
    if log_exchange {
        info!(
            "<-- {}\n{}\n{}",
            response.status(),
            format_headers(response.headers()),
            String::from_utf8_lossy(response.body())
        );
    }

    Ok(Exchange::new(name, sent, response))
}

// `Request` is not `Clone`; extensions are not carried over.
fn copy_request(request: &Request<Bytes>) -> Request<Bytes> {
    let mut copy = Request::new(request.body().clone());
    *copy.method_mut() = request.method().clone();
    *copy.uri_mut() = request.uri().clone();
    *copy.version_mut() = request.version();
    *copy.headers_mut() = request.headers().clone();
    copy
}

fn format_headers(headers: &HeaderMap) -> String {
    headers
        .iter()
        .map(|(k, v)| format!("{}: {}", k, String::from_utf8_lossy(v.as_bytes())))
        .collect::<Vec<_>>()
        .join("\n")
}
