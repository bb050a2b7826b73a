//! Shared fixtures for host integration tests.
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::routing::get;
use bytes::Bytes;
use futures_util::future::BoxFuture;
use http::uri::PathAndQuery;
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tonic::transport::Endpoint;
use tonic::{Request, Status};

use rpc_host::discovery::{InMemoryRegistrar, Node, Protocol, Registrar, RegistryError};
use rpc_host::gateway::forward_unary;
use rpc_host::rpc::{CallRecord, RawCodec, StatsHandler, UnaryHandler};
use rpc_host::{
    GatewayBinding, Host, HostConfig, HostError, MethodBinding, Service, ServiceDescriptor,
};

/// Both listeners on ephemeral loopback ports, advertised as 127.0.0.1.
pub fn config(gateway: bool) -> HostConfig {
    let mut config = HostConfig::default();
    config.rpc.bind_host = "127.0.0.1".into();
    config.rpc.port = 0;
    config.rpc.advertise_host = Some("127.0.0.1".into());
    config.gateway.enabled = gateway;
    config.gateway.bind_host = "127.0.0.1".into();
    config.gateway.port = 0;
    config
}

/// `demo.Foo`: echo, a not-found failure, and a metadata probe.
pub struct Foo;

impl UnaryHandler for Foo {
    const SERVICE: &'static str = "demo.Foo";

    fn call(
        &self,
        method: &str,
        request: Request<Bytes>,
    ) -> BoxFuture<'static, Result<Bytes, Status>> {
        let result = match method {
            "Echo" => Ok(request.into_inner()),
            "Fail" => Err(Status::not_found("no such thing")),
            "Trace" => Ok(request
                .metadata()
                .get("traceparent")
                .and_then(|v| v.to_str().ok())
                .map(|v| Bytes::copy_from_slice(v.as_bytes()))
                .unwrap_or_default()),
            other => Err(Status::unimplemented(format!("unknown method {other}"))),
        };
        Box::pin(async move { result })
    }
}

impl Service for Foo {
    fn descriptor(&self) -> ServiceDescriptor {
        ServiceDescriptor::new("Foo")
            .with_method(MethodBinding::raw(Foo))
            .with_gateway(GatewayBinding::new(|_ctx, mux, loopback| {
                mux.route("/v1/foo/echo", forward_unary(loopback, "/demo.Foo/Echo"))?
                    .route("/v1/foo/fail", forward_unary(loopback, "/demo.Foo/Fail"))?
                    .route("/v1/foo/trace", forward_unary(loopback, "/demo.Foo/Trace"))?
                    .route("/v1/foo/missing", forward_unary(loopback, "/demo.Foo/Missing"))?
                    .route("/v1/foo/panic", get(explode))?;
                Ok(())
            }))
    }
}

async fn explode() -> &'static str {
    panic!("handler exploded")
}

/// `demo.Bar`: echo only.
pub struct Bar;

impl UnaryHandler for Bar {
    const SERVICE: &'static str = "demo.Bar";

    fn call(
        &self,
        method: &str,
        request: Request<Bytes>,
    ) -> BoxFuture<'static, Result<Bytes, Status>> {
        let result = match method {
            "Echo" => Ok(request.into_inner()),
            other => Err(Status::unimplemented(format!("unknown method {other}"))),
        };
        Box::pin(async move { result })
    }
}

impl Service for Bar {
    fn descriptor(&self) -> ServiceDescriptor {
        ServiceDescriptor::new("Bar")
            .with_method(MethodBinding::raw(Bar))
            .with_gateway(GatewayBinding::new(|_ctx, mux, loopback| {
                mux.route("/v1/bar/echo", forward_unary(loopback, "/demo.Bar/Echo"))?;
                Ok(())
            }))
    }
}

/// `Foo` whose gateway binding always fails.
pub struct BrokenGateway;

impl Service for BrokenGateway {
    fn descriptor(&self) -> ServiceDescriptor {
        ServiceDescriptor::new("Foo")
            .with_method(MethodBinding::raw(Foo))
            .with_gateway(GatewayBinding::new(|ctx, _mux, _loopback| {
                Err(format!("cannot bind {}", ctx.service()).into())
            }))
    }
}

/// A service with an arbitrary descriptor.
pub struct Described(pub ServiceDescriptor);

impl Service for Described {
    fn descriptor(&self) -> ServiceDescriptor {
        self.0.clone()
    }
}

/// Registrar that rejects everything.
pub struct RejectingRegistrar;

#[async_trait::async_trait]
impl Registrar for RejectingRegistrar {
    async fn register(&self, node: Node) -> Result<(), RegistryError> {
        Err(RegistryError::Rejected(format!("{} not welcome", node.service())))
    }
}

/// Stats handler that keeps every record.
#[derive(Clone, Default)]
pub struct CollectStats(pub Arc<Mutex<Vec<CallRecord>>>);

impl StatsHandler for CollectStats {
    fn handle(&self, record: &CallRecord) {
        self.0.lock().push(record.clone());
    }
}

pub fn spawn_host(host: Arc<Host>, cancel: CancellationToken) -> JoinHandle<Result<(), HostError>> {
    tokio::spawn(async move { host.run(cancel).await })
}

/// Poll until `count` nodes are registered.
pub async fn wait_for_nodes(registrar: &InMemoryRegistrar, count: usize) -> Vec<Node> {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            if registrar.len() >= count {
                return registrar.nodes();
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("nodes were not registered in time")
}

/// Port the first node of `protocol` advertises.
pub fn port_of(nodes: &[Node], protocol: Protocol) -> u16 {
    nodes
        .iter()
        .find(|n| n.protocol() == protocol)
        .map(Node::port)
        .expect("no node for protocol")
}

pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

/// Raw unary gRPC call against `127.0.0.1:port`.
pub async fn rpc_call(
    port: u16,
    path: &'static str,
    request: Request<Bytes>,
) -> Result<Bytes, Status> {
    let channel = Endpoint::from_shared(format!("http://127.0.0.1:{port}"))
        .unwrap()
        .connect()
        .await
        .unwrap();
    let mut grpc = tonic::client::Grpc::new(channel);
    grpc.ready().await.unwrap();
    grpc.unary(request, PathAndQuery::from_static(path), RawCodec)
        .await
        .map(tonic::Response::into_inner)
}
