//! The handler capability a request chain dispatches to.

use crate::error::BoxError;
use async_trait::async_trait;
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Body;
use hyper::{Request, Response};
use std::convert::Infallible;
use std::future::Future;
use tower::{Service, ServiceExt};

/// Code under test: takes a fully formed request and produces a complete response.
///
/// Implemented for every `Fn(Request<Full<Bytes>>) -> impl Future<Output = Result<Response<B>, E>>`,
/// which is the shape hyper's `service_fn` accepts, so most handlers can be
/// passed as closures. Use [`ServiceHandler`] for `tower` services.
#[async_trait]
pub trait Handler: Send + Sync {
    /// Invoke the handler and collect the full response body.
    async fn call(&self, req: Request<Full<Bytes>>) -> Result<Response<Bytes>, BoxError>;
}

#[async_trait]
impl<F, Fut, B, E> Handler for F
where
    F: Fn(Request<Full<Bytes>>) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Response<B>, E>> + Send + 'static,
    B: Body + Send + 'static,
    B::Data: Send,
    B::Error: Into<BoxError>,
    E: Into<BoxError> + 'static,
{
    async fn call(&self, req: Request<Full<Bytes>>) -> Result<Response<Bytes>, BoxError> {
        let response = (self)(req).await.map_err(Into::into)?;
        collect_response(response).await
    }
}

/// Adapts a `tower::Service` (for example a web framework router) into a [`Handler`].
#[derive(Debug, Clone)]
pub struct ServiceHandler<S> {
    inner: S,
}

impl<S> ServiceHandler<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<S, B> Handler for ServiceHandler<S>
where
    S: Service<Request<Full<Bytes>>, Response = Response<B>> + Clone + Send + Sync + 'static,
    S::Future: Send,
    S::Error: Into<BoxError>,
    B: Body + Send + 'static,
    B::Data: Send,
    B::Error: Into<BoxError>,
{
    async fn call(&self, req: Request<Full<Bytes>>) -> Result<Response<Bytes>, BoxError> {
        let mut service = self.inner.clone();
        let ready = service.ready().await.map_err(Into::into)?;
        let response = Service::call(ready, req).await.map_err(Into::into)?;
        collect_response(response).await
    }
}

async fn collect_response<B>(response: Response<B>) -> Result<Response<Bytes>, BoxError>
where
    B: Body,
    B::Error: Into<BoxError>,
{
    let (parts, body) = response.into_parts();
    let bytes = body.collect().await.map_err(Into::into)?.to_bytes();
    Ok(Response::from_parts(parts, bytes))
}

/// Wrap a response for handlers that never fail.
pub fn ok<B>(response: Response<B>) -> Result<Response<B>, Infallible> {
    Ok(response)
}
