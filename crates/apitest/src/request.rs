//! Request Builder: accumulates what to send before dispatch.

use crate::config::Config;
use crate::dispatch::{self, Exchange, Handler};
use crate::error::{ApiTestError, Result};
use crate::response::{Reporter, ResponseMatcher};
use base64::Engine;
use bytes::Bytes;
use cookie::Cookie;
use hyper::header::{HeaderName, HeaderValue, AUTHORIZATION, COOKIE};
use hyper::{Method, Request};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Hook run on the built request right before the handler sees it.
pub type Intercept = Box<dyn Fn(&mut Request<Bytes>)>;

/// Everything declared about the request to send.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestSpec {
    /// Human-readable name used to prefix failure messages
    pub name: Option<String>,
    /// Unset until one of the method setters is called
    pub method: Option<Method>,
    pub path: String,
    pub body: Option<Bytes>,
    pub query: BTreeMap<String, String>,
    pub headers: BTreeMap<String, String>,
    pub cookies: BTreeMap<String, String>,
    /// Username and password
    pub basic_auth: Option<(String, String)>,
}

impl RequestSpec {
    /// Build the concrete request this spec describes.
    pub fn build(&self, config: &Config) -> Result<Request<Bytes>> {
        let method = self.method.clone().ok_or(ApiTestError::MissingMethod)?;

        let mut request = Request::builder()
            .method(method)
            .uri(self.uri(config))
            .body(self.body.clone().unwrap_or_default())?;

        let headers = request.headers_mut();
        for (name, value) in &self.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| ApiTestError::InvalidRequest(format!("header name {name:?}: {e}")))?;
            let value = HeaderValue::from_str(value).map_err(|e| {
                ApiTestError::InvalidRequest(format!("value for header {name}: {e}"))
            })?;
            headers.insert(name, value);
        }

        if !self.cookies.is_empty() {
            let cookie_header = self
                .cookies
                .iter()
                .map(|(name, value)| Cookie::new(name.as_str(), value.as_str()).to_string())
                .collect::<Vec<_>>()
                .join("; ");
            let value = HeaderValue::from_str(&cookie_header)
                .map_err(|e| ApiTestError::InvalidRequest(format!("cookie header: {e}")))?;
            headers.insert(COOKIE, value);
        }

        if let Some((username, password)) = &self.basic_auth {
            let encoded = base64::engine::general_purpose::STANDARD
                .encode(format!("{username}:{password}"));
            let value = HeaderValue::from_str(&format!("Basic {encoded}"))
                .map_err(|e| ApiTestError::InvalidRequest(format!("authorization header: {e}")))?;
            headers.insert(AUTHORIZATION, value);
        }

        Ok(request)
    }

    fn uri(&self, config: &Config) -> String {
        let mut uri = config.base().to_string();
        if !self.path.starts_with('/') {
            uri.push('/');
        }
        uri.push_str(&self.path);

        if !self.query.is_empty() {
            let query = self
                .query
                .iter()
                .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
                .collect::<Vec<_>>()
                .join("&");
            uri.push(if self.path.contains('?') { '&' } else { '?' });
            uri.push_str(&query);
        }
        uri
    }
}

/// Fluent entry point: declare a request, dispatch it, then declare expectations.
///
/// ```no_run
/// use apitest::{ok, ApiTest, PanicReporter};
/// use bytes::Bytes;
/// use http_body_util::Full;
/// use hyper::{Request, Response};
///
/// # async fn run() -> apitest::Result<()> {
/// let handler = |_req: Request<Full<Bytes>>| async move {
///     ok(Response::new(Full::new(Bytes::from_static(b"hello"))))
/// };
///
/// ApiTest::new(handler)
///     .name("says hello")
///     .get("/hello")
///     .expect(PanicReporter::default())
///     .await?
///     .status(200)
///     .body_text("hello")
///     .end();
/// # Ok(())
/// # }
/// ```
pub struct ApiTest {
    handler: Arc<dyn Handler>,
    spec: RequestSpec,
    config: Config,
    intercepts: Vec<Intercept>,
}

impl fmt::Debug for ApiTest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiTest")
            .field("spec", &self.spec)
            .field("config", &self.config)
            .field("intercepts", &self.intercepts.len())
            .finish_non_exhaustive()
    }
}

impl ApiTest {
    pub fn new<H: Handler + 'static>(handler: H) -> Self {
        Self {
            handler: Arc::new(handler),
            spec: RequestSpec::default(),
            config: Config::default(),
            intercepts: Vec::new(),
        }
    }

    /// The request declared so far.
    pub fn spec(&self) -> &RequestSpec {
        &self.spec
    }

    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Log the full request and response when dispatching.
    pub fn debug(mut self) -> Self {
        self.config.debug = true;
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.spec.name = Some(name.into());
        self
    }

    pub fn get(self, path: impl Into<String>) -> Self {
        self.with_method(Method::GET, path)
    }

    pub fn post(self, path: impl Into<String>) -> Self {
        self.with_method(Method::POST, path)
    }

    pub fn put(self, path: impl Into<String>) -> Self {
        self.with_method(Method::PUT, path)
    }

    pub fn delete(self, path: impl Into<String>) -> Self {
        self.with_method(Method::DELETE, path)
    }

    pub fn patch(self, path: impl Into<String>) -> Self {
        self.with_method(Method::PATCH, path)
    }

    /// Set an arbitrary method by name.
    pub fn method(self, method: &str, path: impl Into<String>) -> Result<Self> {
        let method = Method::from_bytes(method.as_bytes())
            .map_err(|_| ApiTestError::InvalidMethod(method.to_string()))?;
        Ok(self.with_method(method, path))
    }

    fn with_method(mut self, method: Method, path: impl Into<String>) -> Self {
        self.spec.method = Some(method);
        self.spec.path = path.into();
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.spec.body = Some(Bytes::from(body.into()));
        self
    }

    pub fn body_bytes(mut self, body: impl Into<Bytes>) -> Self {
        self.spec.body = Some(body.into());
        self
    }

    /// Serialize `value` as the body. Does not set a content type.
    pub fn body_json<T: Serialize + ?Sized>(mut self, value: &T) -> Result<Self> {
        self.spec.body = Some(Bytes::from(serde_json::to_vec(value)?));
        Ok(self)
    }

    /// Merge query parameters; existing keys are overwritten.
    pub fn query<I, K, V>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        merge(&mut self.spec.query, params);
        self
    }

    pub fn query_param(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query([(key, value)])
    }

    /// Merge request headers; existing keys are overwritten.
    pub fn headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (name, value) in headers {
            let name = name.into();
            // Header names are case-insensitive; keep only the latest spelling.
            self.spec
                .headers
                .retain(|existing, _| !existing.eq_ignore_ascii_case(&name));
            self.spec.headers.insert(name, value.into());
        }
        self
    }

    pub fn header(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers([(name, value)])
    }

    /// Merge request cookies; existing names are overwritten.
    pub fn cookies<I, K, V>(mut self, cookies: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        merge(&mut self.spec.cookies, cookies);
        self
    }

    pub fn cookie(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.cookies([(name, value)])
    }

    /// Set basic auth from a `"user:pass"` string.
    ///
    /// Only the first colon separates the two, so passwords may contain colons.
    pub fn basic_auth(mut self, credentials: &str) -> Result<Self> {
        let (username, password) = credentials
            .split_once(':')
            .ok_or_else(|| ApiTestError::InvalidBasicAuth(credentials.to_string()))?;
        self.spec.basic_auth = Some((username.to_string(), password.to_string()));
        Ok(self)
    }

    /// Adjust the built request right before dispatch.
    pub fn intercept<F>(mut self, intercept: F) -> Self
    where
        F: Fn(&mut Request<Bytes>) + 'static,
    {
        self.intercepts.push(Box::new(intercept));
        self
    }

    /// Dispatch the request and start declaring expectations.
    pub async fn expect<R: Reporter + 'static>(self, reporter: R) -> Result<ResponseMatcher> {
        let exchange = self.dispatch().await?;
        Ok(ResponseMatcher::new(exchange, Box::new(reporter)))
    }

    /// Same as [`expect`](Self::expect) for synchronous tests.
    ///
    /// Must not be called from inside an async runtime.
    pub fn expect_blocking<R: Reporter + 'static>(self, reporter: R) -> Result<ResponseMatcher> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        runtime.block_on(self.expect(reporter))
    }

    async fn dispatch(self) -> Result<Exchange> {
        let mut request = self.spec.build(&self.config)?;
        for intercept in &self.intercepts {
            intercept(&mut request);
        }
        dispatch::dispatch(
            self.handler.as_ref(),
            request,
            self.spec.name,
            self.config.debug,
        )
        .await
    }
}

fn merge<I, K, V>(target: &mut BTreeMap<String, String>, entries: I)
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    target.extend(entries.into_iter().map(|(k, v)| (k.into(), v.into())));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::ok;
    use http_body_util::Full;
    use hyper::Response;
    use std::collections::HashMap;

    fn noop() -> ApiTest {
        ApiTest::new(|_req: Request<Full<Bytes>>| async move {
            ok(Response::new(Full::new(Bytes::new())))
        })
    }

    #[test]
    fn test_last_write_wins_for_scalars() {
        let test = noop()
            .get("/first")
            .post("/second")
            .body("one")
            .body("two")
            .name("a")
            .name("b");

        let spec = test.spec();
        assert_eq!(spec.method, Some(Method::POST));
        assert_eq!(spec.path, "/second");
        assert_eq!(spec.body.as_deref(), Some(&b"two"[..]));
        assert_eq!(spec.name.as_deref(), Some("b"));
    }

    #[test]
    fn test_maps_merge_additively() {
        let test = noop()
            .query([("a", "1"), ("b", "2")])
            .query(HashMap::from([("b", "3"), ("c", "4")]))
            .headers([("X-One", "1")])
            .header("x-one", "2")
            .header("X-Two", "2")
            .cookies([("c1", "v1")])
            .cookie("c2", "v2");

        let spec = test.spec();
        assert_eq!(spec.query.len(), 3);
        assert_eq!(spec.query["b"], "3");
        assert_eq!(spec.headers.len(), 2);
        assert_eq!(spec.headers["x-one"], "2");
        assert_eq!(spec.cookies.len(), 2);
    }

    #[test]
    fn test_basic_auth_is_validated_immediately() {
        let err = noop().basic_auth("no-colon").unwrap_err();
        assert!(matches!(err, ApiTestError::InvalidBasicAuth(s) if s == "no-colon"));

        let test = noop().basic_auth("user:pa:ss").unwrap();
        assert_eq!(
            test.spec().basic_auth,
            Some(("user".to_string(), "pa:ss".to_string()))
        );
    }

    #[test]
    fn test_invalid_method_is_rejected_immediately() {
        let err = noop().method("BAD METHOD", "/").unwrap_err();
        assert!(matches!(err, ApiTestError::InvalidMethod(_)));

        let test = noop().method("OPTIONS", "/").unwrap();
        assert_eq!(test.spec().method, Some(Method::OPTIONS));
    }

    #[test]
    fn test_body_json_does_not_set_content_type() {
        let test = noop()
            .post("/items")
            .body_json(&serde_json::json!({"a": 1}))
            .unwrap();
        let request = test.spec().build(&Config::default()).unwrap();
        assert_eq!(request.body().as_ref(), br#"{"a":1}"#);
        assert!(request.headers().get("content-type").is_none());
    }

    #[test]
    fn test_build_requires_method() {
        let err = noop().spec().build(&Config::default()).unwrap_err();
        assert!(matches!(err, ApiTestError::MissingMethod));
    }

    #[test]
    fn test_build_applies_every_field() {
        let test = noop()
            .delete("/items/1")
            .query([("q", "a b"), ("page", "2")])
            .header("My-Header", "12345")
            .cookies([("Cookie1", "Yummy"), ("Cookie2", "Crunchy")])
            .basic_auth("username:password")
            .unwrap();

        let request = test.spec().build(&Config::default()).unwrap();
        assert_eq!(request.method(), Method::DELETE);
        assert_eq!(
            request.uri().to_string(),
            "http://localhost/items/1?page=2&q=a%20b"
        );
        assert_eq!(request.headers()["my-header"], "12345");
        assert_eq!(request.headers()["cookie"], "Cookie1=Yummy; Cookie2=Crunchy");
        assert_eq!(
            request.headers()["authorization"],
            "Basic dXNlcm5hbWU6cGFzc3dvcmQ="
        );
    }

    #[test]
    fn test_query_appends_to_existing_query_string() {
        let test = noop().get("/search?x=1").query_param("y", "2");
        let request = test.spec().build(&Config::default()).unwrap();
        assert_eq!(request.uri().query(), Some("x=1&y=2"));
    }

    #[test]
    fn test_base_url_from_config() {
        let config = Config {
            base_url: "https://api.example.com/".to_string(),
            debug: false,
        };
        let request = noop()
            .get("v1/users")
            .spec()
            .build(&config)
            .unwrap();
        assert_eq!(request.uri().to_string(), "https://api.example.com/v1/users");
    }

    #[test]
    fn test_invalid_header_surfaces_at_build() {
        let test = noop().get("/").header("bad header", "x");
        let err = test.spec().build(&Config::default()).unwrap_err();
        assert!(matches!(err, ApiTestError::InvalidRequest(_)));
    }
}
