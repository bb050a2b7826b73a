//! Lifecycle, registration and shutdown behaviour of the host.

use std::sync::Arc;
use std::time::Duration;

use axum::routing::get;
use tokio_util::sync::CancellationToken;

use rpc_host::discovery::{InMemoryRegistrar, Node, Protocol, RegistryError};
use rpc_host::{
    ConfigurationError, GatewayBinding, Host, HostError, MethodBinding, Phase, ServiceDescriptor,
    StartupError,
};

mod common;

use common::{spawn_host, wait_for_nodes, Bar, BrokenGateway, Described, Foo, RejectingRegistrar};

fn host_with(config: rpc_host::HostConfig, registrar: &InMemoryRegistrar) -> Arc<Host> {
    Arc::new(Host::builder(config).registrar(registrar.clone()).build())
}

#[test]
fn invalid_descriptor_is_rejected() {
    let host = Host::new(common::config(false));
    let err = host
        .register(Arc::new(Described(
            ServiceDescriptor::new("Foo")
                .with_method(MethodBinding::raw(Foo))
                .valid(false),
        )))
        .unwrap_err();

    assert!(matches!(
        err,
        HostError::Configuration(ConfigurationError::InvalidDescriptor { .. })
    ));
    assert!(host.services().is_empty());
}

#[test]
fn descriptor_without_method_bindings_is_rejected() {
    let host = Host::new(common::config(false));
    let err = host
        .register(Arc::new(Described(ServiceDescriptor::new("Empty"))))
        .unwrap_err();

    assert!(matches!(
        err,
        HostError::Configuration(ConfigurationError::NoMethodBindings { .. })
    ));
    assert!(host.services().is_empty());
    assert_eq!(host.phase(), Phase::Created);
}

#[tokio::test]
async fn rpc_only_registers_one_rpc_node_per_service() {
    let registrar = InMemoryRegistrar::new();
    let host = host_with(common::config(false), &registrar);
    host.register(Arc::new(Foo)).unwrap();
    host.register(Arc::new(Bar)).unwrap();

    let cancel = CancellationToken::new();
    let handle = spawn_host(Arc::clone(&host), cancel.clone());

    let nodes = wait_for_nodes(&registrar, 2).await;
    // Give a stray Http node the chance to show up.
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(registrar.nodes_for(Protocol::Rpc).len(), 2);
    assert!(registrar.nodes_for(Protocol::Http).is_empty());

    let port = nodes[0].port();
    assert_ne!(port, 0);
    assert_eq!(
        registrar.nodes(),
        vec![
            Node::new("127.0.0.1", port, Protocol::Rpc, "Foo"),
            Node::new("127.0.0.1", port, Protocol::Rpc, "Bar"),
        ]
    );

    cancel.cancel();
    handle.await.unwrap().unwrap();
}

#[tokio::test]
async fn foo_and_bar_on_default_port() {
    let registrar = InMemoryRegistrar::new();
    let mut config = common::config(false);
    config.rpc.port = 50051;
    let host = host_with(config, &registrar);
    host.register(Arc::new(Foo)).unwrap();
    host.register(Arc::new(Bar)).unwrap();

    let cancel = CancellationToken::new();
    let handle = spawn_host(Arc::clone(&host), cancel.clone());

    let nodes = wait_for_nodes(&registrar, 2).await;
    assert_eq!(
        nodes,
        vec![
            Node::new("127.0.0.1", 50051, Protocol::Rpc, "Foo"),
            Node::new("127.0.0.1", 50051, Protocol::Rpc, "Bar"),
        ]
    );
    assert!(registrar.nodes_for(Protocol::Http).is_empty());

    cancel.cancel();
    handle.await.unwrap().unwrap();
}

#[tokio::test]
async fn gateway_registers_matching_http_nodes() {
    let registrar = InMemoryRegistrar::new();
    let host = host_with(common::config(true), &registrar);
    host.register(Arc::new(Foo)).unwrap();
    host.register(Arc::new(Bar)).unwrap();

    let cancel = CancellationToken::new();
    let handle = spawn_host(Arc::clone(&host), cancel.clone());
    wait_for_nodes(&registrar, 4).await;

    let rpc = registrar.nodes_for(Protocol::Rpc);
    let http = registrar.nodes_for(Protocol::Http);
    assert_eq!(rpc.len(), 2);
    assert_eq!(http.len(), 2);
    for (r, h) in rpc.iter().zip(&http) {
        assert_eq!(r.service(), h.service());
        assert_eq!(r.host(), h.host());
        assert_ne!(r.port(), h.port());
    }

    cancel.cancel();
    handle.await.unwrap().unwrap();
}

#[tokio::test]
async fn failing_gateway_binding_aborts_startup() {
    let registrar = InMemoryRegistrar::new();
    let host = host_with(common::config(true), &registrar);
    host.register(Arc::new(BrokenGateway)).unwrap();

    let err = host.run(CancellationToken::new()).await.unwrap_err();

    assert!(matches!(
        &err,
        HostError::Startup(StartupError::GatewayBinding { service, .. }) if service == "Foo"
    ));
    assert!(err.is_fatal());
    assert!(registrar.nodes_for(Protocol::Http).is_empty());
    assert_eq!(host.phase(), Phase::Stopped);
}

#[tokio::test]
async fn cancellation_stops_both_units_promptly() {
    let registrar = InMemoryRegistrar::new();
    let host = host_with(common::config(true), &registrar);
    host.register(Arc::new(Foo)).unwrap();

    let cancel = CancellationToken::new();
    let handle = spawn_host(Arc::clone(&host), cancel.clone());

    tokio::time::sleep(Duration::from_millis(100)).await;
    cancel.cancel();

    let result = tokio::time::timeout(Duration::from_secs(2), handle)
        .await
        .expect("run did not return within 2s");
    result.unwrap().unwrap();
    assert_eq!(host.phase(), Phase::Stopped);
}

#[tokio::test]
async fn register_while_running_is_a_phase_error() {
    let registrar = InMemoryRegistrar::new();
    let host = host_with(common::config(false), &registrar);
    host.register(Arc::new(Foo)).unwrap();

    let cancel = CancellationToken::new();
    let handle = spawn_host(Arc::clone(&host), cancel.clone());
    wait_for_nodes(&registrar, 1).await;

    let err = host.register(Arc::new(Bar)).unwrap_err();
    assert!(matches!(
        err,
        HostError::Phase {
            operation: "register",
            phase: Phase::Running
        }
    ));
    assert!(!err.is_fatal());
    assert_eq!(host.services(), vec!["Foo".to_string()]);

    cancel.cancel();
    handle.await.unwrap().unwrap();

    assert!(matches!(
        host.register(Arc::new(Bar)),
        Err(HostError::Phase {
            phase: Phase::Stopped,
            ..
        })
    ));
}

#[tokio::test]
async fn registration_failure_is_fatal() {
    let host = Host::builder(common::config(true))
        .registrar(RejectingRegistrar)
        .build();
    host.register(Arc::new(Foo)).unwrap();

    let cancel = CancellationToken::new();
    let err = tokio::time::timeout(Duration::from_secs(2), host.run(cancel.clone()))
        .await
        .expect("run did not fail fast")
        .unwrap_err();

    assert!(matches!(
        err,
        HostError::Startup(StartupError::Registration {
            protocol: Protocol::Rpc,
            source: RegistryError::Rejected(_),
            ..
        })
    ));
    assert!(err.is_fatal());
    // The caller's token is left alone.
    assert!(!cancel.is_cancelled());
}

#[tokio::test]
async fn occupied_port_fails_before_any_registration() {
    let blocker = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = blocker.local_addr().unwrap().port();

    let registrar = InMemoryRegistrar::new();
    let mut config = common::config(false);
    config.rpc.port = port;
    let host = host_with(config, &registrar);
    host.register(Arc::new(Foo)).unwrap();

    let err = host.run(CancellationToken::new()).await.unwrap_err();
    assert!(matches!(
        err,
        HostError::Startup(StartupError::Bind {
            protocol: Protocol::Rpc,
            ..
        })
    ));
    assert!(registrar.is_empty());
}

#[tokio::test]
async fn runs_without_registrar() {
    let host = Arc::new(Host::new(common::config(true)));
    host.register(Arc::new(Foo)).unwrap();

    let cancel = CancellationToken::new();
    let handle = spawn_host(Arc::clone(&host), cancel.clone());
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(host.phase(), Phase::Running);

    cancel.cancel();
    handle.await.unwrap().unwrap();
}

#[tokio::test]
async fn overlapping_gateway_paths_fail_startup() {
    fn claim_same(name: &str, method: MethodBinding) -> Described {
        Described(
            ServiceDescriptor::new(name)
                .with_method(method)
                .with_gateway(GatewayBinding::new(|_ctx, mux, _loopback| {
                    mux.route("/same", get(|| async { "mine" }))?;
                    Ok(())
                })),
        )
    }

    let registrar = InMemoryRegistrar::new();
    let host = host_with(common::config(true), &registrar);
    host.register(Arc::new(claim_same("A", MethodBinding::raw(Foo))))
        .unwrap();
    host.register(Arc::new(claim_same("B", MethodBinding::raw(Bar))))
        .unwrap();

    let handle = spawn_host(Arc::clone(&host), CancellationToken::new());
    let err = handle.await.expect("run must not panic").unwrap_err();

    assert!(matches!(
        &err,
        HostError::Startup(StartupError::GatewayBinding { service, .. }) if service == "B"
    ));
    assert!(registrar.is_empty());
    assert_eq!(host.phase(), Phase::Stopped);
}
