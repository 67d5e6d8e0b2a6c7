//! Shared helpers for integration tests.

#![allow(dead_code)]

use bytes::Bytes;
use http_body_util::Full;
use hyper::{Request, Response, StatusCode};
use std::sync::Once;

static INIT: Once = Once::new();

/// Install a `RUST_LOG`-driven subscriber once per test binary.
pub fn init_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

pub fn status_only(status: StatusCode) -> Response<Full<Bytes>> {
    Response::builder()
        .status(status)
        .body(Full::new(Bytes::new()))
        .unwrap()
}

/// Decoded value of a query parameter, if present.
pub fn query_value(req: &Request<Full<Bytes>>, key: &str) -> Option<String> {
    req.uri().query()?.split('&').find_map(|pair| {
        let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
        (k == key).then(|| urlencoding::decode(v).map(|v| v.into_owned()).ok())?
    })
}

/// Value of a cookie sent in the `Cookie` header, if present.
pub fn request_cookie(req: &Request<Full<Bytes>>, name: &str) -> Option<String> {
    let header = req.headers().get("cookie")?.to_str().ok()?;
    cookie::Cookie::split_parse(header)
        .filter_map(Result::ok)
        .find(|c| c.name() == name)
        .map(|c| c.value().to_string())
}
