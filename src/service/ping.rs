//! Built-in echo service.
//!
//! `rpchost.v1.Ping/Ping` returns its request message unchanged and is
//! mirrored on the gateway as `POST /v1/ping`. The binary hosts it so a fresh
//! deployment can be probed over both transports.

use bytes::Bytes;
use futures_util::future::BoxFuture;
use tonic::{Request, Status};

use crate::gateway::forward_unary;
use crate::rpc::UnaryHandler;

use super::{GatewayBinding, MethodBinding, Service, ServiceDescriptor};

pub const PING_PATH: &str = "/rpchost.v1.Ping/Ping";
pub const PING_ROUTE: &str = "/v1/ping";

#[derive(Debug, Clone, Copy, Default)]
pub struct PingService;

impl UnaryHandler for PingService {
    const SERVICE: &'static str = "rpchost.v1.Ping";

    fn call(
        &self,
        method: &str,
        request: Request<Bytes>,
    ) -> BoxFuture<'static, Result<Bytes, Status>> {
        let result = match method {
            "Ping" => Ok(request.into_inner()),
            other => Err(Status::unimplemented(format!("unknown method {other}"))),
        };
        Box::pin(async move { result })
    }
}

impl Service for PingService {
    fn descriptor(&self) -> ServiceDescriptor {
        ServiceDescriptor::new("Ping")
            .with_method(MethodBinding::raw(*self))
            .with_gateway(GatewayBinding::new(|_ctx, mux, loopback| {
                mux.route(PING_ROUTE, forward_unary(loopback, PING_PATH))?;
                Ok(())
            }))
    }
}
