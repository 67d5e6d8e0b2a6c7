//! The captured request/response pair a chain asserts against.

use bytes::Bytes;
use cookie::{Cookie, CookieJar};
use hyper::header::{CONTENT_TYPE, SET_COOKIE};
use hyper::{HeaderMap, Request, Response, StatusCode};
use tracing::warn;

// Attribute names that may follow a cookie pair inside a Set-Cookie header.
const COOKIE_ATTRIBUTES: &[&str] = &[
    "path",
    "domain",
    "expires",
    "max-age",
    "secure",
    "httponly",
    "samesite",
    "partitioned",
    "priority",
    "version",
    "comment",
];

/// One dispatched request and the response it produced.
///
/// Read-only once created.
#[derive(Debug)]
pub struct Exchange {
    name: Option<String>,
    request: Request<Bytes>,
    response: Response<Bytes>,
    cookies: CookieJar,
}

impl Exchange {
    pub fn new(name: Option<String>, request: Request<Bytes>, response: Response<Bytes>) -> Self {
        let cookies = parse_set_cookies(response.headers());
        Self {
            name,
            request,
            response,
            cookies,
        }
    }

    /// Display name of the chain, if one was set.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The request exactly as the handler received it.
    pub fn request(&self) -> &Request<Bytes> {
        &self.request
    }

    pub fn response(&self) -> &Response<Bytes> {
        &self.response
    }

    pub fn status(&self) -> StatusCode {
        self.response.status()
    }

    pub fn headers(&self) -> &HeaderMap {
        self.response.headers()
    }

    pub fn body(&self) -> &Bytes {
        self.response.body()
    }

    /// Cookies set by the response.
    pub fn cookies(&self) -> &CookieJar {
        &self.cookies
    }

    pub fn content_type(&self) -> Option<&str> {
        self.headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
    }
}

/// Parse every `Set-Cookie` header into a jar.
///
/// Each `;`-separated pair that is not a cookie attribute becomes its own
/// cookie, so `ABC=1; Path=/` yields one cookie and `ABC=1; DEF=2` yields two.
pub fn parse_set_cookies(headers: &HeaderMap) -> CookieJar {
    let mut jar = CookieJar::new();

    for value in headers.get_all(SET_COOKIE) {
        let Ok(value) = value.to_str() else {
            warn!("Skipping non-ASCII Set-Cookie header");
            continue;
        };

        for segment in value.split(';').map(str::trim) {
            if segment.is_empty() {
                continue;
            }
            let name = segment.split_once('=').map_or(segment, |(n, _)| n).trim();
            if COOKIE_ATTRIBUTES
                .iter()
                .any(|attr| attr.eq_ignore_ascii_case(name))
            {
                continue;
            }
            match Cookie::parse(segment.to_string()) {
                Ok(cookie) => jar.add(cookie),
                Err(e) => warn!("Skipping malformed cookie {:?}: {}", segment, e),
            }
        }
    }

    jar
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyper::header::HeaderValue;

    fn headers_with(set_cookies: &[&'static str]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for value in set_cookies {
            headers.append(SET_COOKIE, HeaderValue::from_static(value));
        }
        headers
    }

    #[test]
    fn test_parse_skips_cookie_attributes() {
        let jar = parse_set_cookies(&headers_with(&[
            "session=abc123; Path=/; HttpOnly; Secure; SameSite=Lax; Max-Age=3600",
            "tracker=xyz; Priority=High; Version=1; Comment=analytics",
        ]));
        assert_eq!(jar.iter().count(), 2);
        assert!(jar.get("Priority").is_none());
        assert!(jar.get("Version").is_none());
        assert!(jar.get("Comment").is_none());
        assert_eq!(jar.get("tracker").map(|c| c.value()), Some("xyz"));
        assert_eq!(jar.get("session").map(|c| c.value()), Some("abc123"));
    }

    #[test]
    fn test_parse_multiple_pairs_in_one_header() {
        let jar = parse_set_cookies(&headers_with(&[
            "ABC=12345; DEF=67890; XXX=1fsadg235; VVV=9ig32g34g",
        ]));
        assert_eq!(jar.get("ABC").map(|c| c.value()), Some("12345"));
        assert_eq!(jar.get("DEF").map(|c| c.value()), Some("67890"));
        assert_eq!(jar.get("XXX").map(|c| c.value()), Some("1fsadg235"));
        assert_eq!(jar.get("VVV").map(|c| c.value()), Some("9ig32g34g"));
    }

    #[test]
    fn test_parse_multiple_headers() {
        let jar = parse_set_cookies(&headers_with(&[
            "a=1; Expires=Wed, 21 Oct 2015 07:28:00 GMT",
            "b=2; Domain=example.com",
        ]));
        assert_eq!(jar.iter().count(), 2);
        assert_eq!(jar.get("b").map(|c| c.value()), Some("2"));
    }

    #[test]
    fn test_malformed_segments_are_skipped() {
        let jar = parse_set_cookies(&headers_with(&["=novalue; ok=1; junk"]));
        assert_eq!(jar.iter().count(), 1);
        assert!(jar.get("ok").is_some());
    }

    #[test]
    fn test_exchange_accessors() {
        let request = Request::builder()
            .uri("http://localhost/hello")
            .body(Bytes::new())
            .unwrap();
        let response = Response::builder()
            .status(201)
            .header("content-type", "application/json")
            .header("set-cookie", "token=t1")
            .body(Bytes::from_static(b"{}"))
            .unwrap();

        let exchange = Exchange::new(Some("create".to_string()), request, response);
        assert_eq!(exchange.name(), Some("create"));
        assert_eq!(exchange.status(), StatusCode::CREATED);
        assert_eq!(exchange.content_type(), Some("application/json"));
        assert_eq!(exchange.body().as_ref(), b"{}");
        assert_eq!(exchange.request().uri().path(), "/hello");
        assert!(exchange.cookies().get("token").is_some());
    }
}
