//! Transport bindings carried by a descriptor.

use std::convert::Infallible;
use std::fmt;
use std::sync::Arc;

use tonic::body::Body;
use tonic::server::NamedService;
use tonic::service::RoutesBuilder;

use crate::error::BoxError;
use crate::gateway::{BindContext, GatewayMux, LoopbackConnection};
use crate::rpc::{RawService, UnaryHandler};

type Installer = dyn Fn(&mut RoutesBuilder) + Send + Sync;

/// One gRPC service to be installed on the binary listener.
///
/// Wraps any tonic server (generated or [`RawService`]); the service is
/// cloned into the route table on every `run`.
#[derive(Clone)]
pub struct MethodBinding {
    service_name: &'static str,
    install: Arc<Installer>,
}

impl MethodBinding {
    pub fn new<S>(svc: S) -> Self
    where
        S: tower::Service<http::Request<Body>, Response = http::Response<Body>, Error = Infallible>
            + NamedService
            + Clone
            + Send
            + Sync
            + 'static,
        S::Future: Send + 'static,
    {
        Self {
            service_name: S::NAME,
            install: Arc::new(move |routes: &mut RoutesBuilder| {
                routes.add_service(svc.clone());
            }),
        }
    }

    /// Bind a [`UnaryHandler`] through the raw-bytes adapter.
    pub fn raw<H: UnaryHandler>(handler: H) -> Self {
        Self::new(RawService::new(handler))
    }

    /// Fully-qualified gRPC service name, e.g. `rpchost.v1.Ping`.
    pub fn service_name(&self) -> &'static str {
        self.service_name
    }

    pub(crate) fn install(&self, routes: &mut RoutesBuilder) {
        (self.install)(routes);
    }
}

impl fmt::Debug for MethodBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("MethodBinding").field(&self.service_name).finish()
    }
}

type BindFn = dyn Fn(&BindContext, &mut GatewayMux, &LoopbackConnection) -> Result<(), BoxError>
    + Send
    + Sync;

/// Registers HTTP routes for a service against the shared loopback connection.
#[derive(Clone)]
pub struct GatewayBinding {
    bind: Arc<BindFn>,
}

impl GatewayBinding {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&BindContext, &mut GatewayMux, &LoopbackConnection) -> Result<(), BoxError>
            + Send
            + Sync
            + 'static,
    {
        Self { bind: Arc::new(f) }
    }

    pub(crate) fn bind(
        &self,
        ctx: &BindContext,
        mux: &mut GatewayMux,
        loopback: &LoopbackConnection,
    ) -> Result<(), BoxError> {
        (self.bind)(ctx, mux, loopback)
    }
}

impl fmt::Debug for GatewayBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("GatewayBinding")
    }
}
