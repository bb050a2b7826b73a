//! Unary services over raw message bytes.

use std::convert::Infallible;
use std::sync::Arc;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures_util::future::BoxFuture;
use tonic::body::Body;
use tonic::server::{Grpc, NamedService, UnaryService};
use tonic::{Request, Response, Status};

use super::codec::RawCodec;

/// Business logic for a unary-only gRPC service.
///
/// `SERVICE` is the fully-qualified gRPC service name (`package.Service`);
/// `call` receives the bare method name and should answer
/// [`Status::unimplemented`] for names it does not serve.
pub trait UnaryHandler: Send + Sync + 'static {
    const SERVICE: &'static str;

    fn call(
        &self,
        method: &str,
        request: Request<Bytes>,
    ) -> BoxFuture<'static, Result<Bytes, Status>>;
}

/// tonic service adapter for a [`UnaryHandler`].
pub struct RawService<H> {
    handler: Arc<H>,
}

impl<H> RawService<H> {
    pub fn new(handler: H) -> Self {
        Self::from_arc(Arc::new(handler))
    }

    pub fn from_arc(handler: Arc<H>) -> Self {
        Self { handler }
    }
}

impl<H> Clone for RawService<H> {
    fn clone(&self) -> Self {
        Self {
            handler: Arc::clone(&self.handler),
        }
    }
}

impl<H: UnaryHandler> NamedService for RawService<H> {
    const NAME: &'static str = H::SERVICE;
}

impl<H: UnaryHandler> tower::Service<http::Request<Body>> for RawService<H> {
    type Response = http::Response<Body>;
    type Error = Infallible;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: http::Request<Body>) -> Self::Future {
        let method = req
            .uri()
            .path()
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .to_string();
        let call = MethodCall {
            handler: Arc::clone(&self.handler),
            method,
        };
        Box::pin(async move {
            let mut grpc = Grpc::new(RawCodec);
            Ok(grpc.unary(call, req).await)
        })
    }
}

struct MethodCall<H> {
    handler: Arc<H>,
    method: String,
}

impl<H: UnaryHandler> UnaryService<Bytes> for MethodCall<H> {
    type Response = Bytes;
    type Future = BoxFuture<'static, Result<Response<Bytes>, Status>>;

    fn call(&mut self, request: Request<Bytes>) -> Self::Future {
        let fut = self.handler.call(&self.method, request);
        Box::pin(async move { fut.await.map(Response::new) })
    }
}
