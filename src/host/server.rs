//! The dual-protocol host.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tonic::service::RoutesBuilder;

use crate::config::{validate_config, HostConfig};
use crate::discovery::{Protocol, Registrar};
use crate::error::{HostError, ServeError, StartupError};
use crate::gateway::{BindContext, GatewayBridge, GatewayMux, LoopbackConnection, TraceHook};
use crate::lifecycle::Phase;
use crate::net::{self, AddressResolver};
use crate::rpc::{InterceptorChain, StatsHandler};
use crate::service::{Service, ServiceDescriptor};

use super::builder::HostBuilder;
use super::gateway_unit::GatewayUnit;
use super::rpc_unit::RpcUnit;
use super::Announcement;

struct Registered {
    // Held so the service outlives every binding cloned from its descriptor.
    _service: Arc<dyn Service>,
    descriptor: ServiceDescriptor,
}

struct HostState {
    phase: Phase,
    services: Vec<Registered>,
}

/// Shared view of the host phase, handed to tasks spawned by `run`.
#[derive(Clone)]
struct PhaseHandle(Arc<Mutex<HostState>>);

impl PhaseHandle {
    fn advance(&self, next: Phase) {
        let mut state = self.0.lock();
        let from = state.phase;
        match state.phase.advance(next) {
            Ok(()) => tracing::debug!(%from, to = %next, "Host phase changed"),
            Err(e) => tracing::trace!(error = %e, "Ignoring stale phase transition"),
        }
    }
}

/// Serves registered services on a binary listener and, optionally, an HTTP
/// gateway that forwards into it.
pub struct Host {
    config: HostConfig,
    interceptors: InterceptorChain,
    stats: Option<Arc<dyn StatsHandler>>,
    trace_hook: Arc<dyn TraceHook>,
    registrar: Option<Arc<dyn Registrar>>,
    resolver: Arc<dyn AddressResolver>,
    state: Arc<Mutex<HostState>>,
}

impl Host {
    pub fn builder(config: HostConfig) -> HostBuilder {
        HostBuilder::new(config)
    }

    /// A host with no registrar, interceptors or stats handler.
    pub fn new(config: HostConfig) -> Self {
        HostBuilder::new(config).build()
    }

    pub(crate) fn from_parts(
        config: HostConfig,
        interceptors: InterceptorChain,
        stats: Option<Arc<dyn StatsHandler>>,
        trace_hook: Arc<dyn TraceHook>,
        registrar: Option<Arc<dyn Registrar>>,
        resolver: Arc<dyn AddressResolver>,
    ) -> Self {
        Self {
            config,
            interceptors,
            stats,
            trace_hook,
            registrar,
            resolver,
            state: Arc::new(Mutex::new(HostState {
                phase: Phase::Created,
                services: Vec::new(),
            })),
        }
    }

    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.state.lock().phase
    }

    /// Names of the registered services, in registration order.
    pub fn services(&self) -> Vec<String> {
        self.state
            .lock()
            .services
            .iter()
            .map(|r| r.descriptor.name.clone())
            .collect()
    }

    /// Add a service. Rejected descriptors leave the host unchanged.
    pub fn register(&self, service: Arc<dyn Service>) -> Result<(), HostError> {
        let mut state = self.state.lock();
        if !state.phase.accepts_registration() {
            return Err(HostError::Phase {
                operation: "register",
                phase: state.phase,
            });
        }

        let descriptor = service.descriptor();
        descriptor.validate()?;

        let from = state.phase;
        state
            .phase
            .advance(Phase::Configured)
            .map_err(|_| HostError::Phase {
                operation: "register",
                phase: from,
            })?;

        tracing::info!(
            service = %descriptor.name,
            methods = descriptor.method_bindings.len(),
            gateway_bindings = descriptor.gateway_bindings.len(),
            "Service registered"
        );
        state.services.push(Registered {
            _service: service,
            descriptor,
        });
        Ok(())
    }

    /// Start both transports and block until they have stopped.
    ///
    /// Returns once `cancel` fires and both units have drained, or as soon as
    /// startup fails. A failing unit cancels its sibling; the error is
    /// returned after both have been joined.
    pub async fn run(&self, cancel: CancellationToken) -> Result<(), HostError> {
        let descriptors = {
            let mut state = self.state.lock();
            if !state.phase.accepts_registration() {
                return Err(HostError::Phase {
                    operation: "run",
                    phase: state.phase,
                });
            }
            state.phase = Phase::Running;
            state
                .services
                .iter()
                .map(|r| r.descriptor.clone())
                .collect::<Vec<_>>()
        };

        let phase = PhaseHandle(Arc::clone(&self.state));
        let units = cancel.child_token();

        let result = match self.start(&descriptors, &units).await {
            Ok((rpc, gateway)) => self.join(rpc, gateway, &units, &phase).await,
            Err(e) => {
                tracing::error!(error = %e, "Host startup failed");
                Err(e.into())
            }
        };

        phase.advance(Phase::Stopped);
        tracing::info!("Host stopped");
        result
    }

    /// Bind listeners, build route tables and wire the gateway.
    async fn start(
        &self,
        descriptors: &[ServiceDescriptor],
        units: &CancellationToken,
    ) -> Result<(RpcUnit, Option<GatewayUnit>), StartupError> {
        validate_config(&self.config).map_err(StartupError::InvalidConfig)?;

        let host = self.resolver.resolve()?;
        if host.is_empty() {
            return Err(StartupError::AdvertiseAddress(
                "resolved advertised host is empty".into(),
            ));
        }
        reject_duplicate_services(descriptors)?;

        tracing::info!(
            advertise_host = %host,
            services = descriptors.len(),
            gateway = self.config.gateway.enabled,
            "Host starting"
        );

        let (rpc_listener, rpc_addr) =
            net::bind(Protocol::Rpc, &self.config.rpc.bind_host, self.config.rpc.port).await?;

        let mut routes = RoutesBuilder::default();
        for descriptor in descriptors {
            for binding in &descriptor.method_bindings {
                binding.install(&mut routes);
                tracing::debug!(
                    service = %descriptor.name,
                    grpc_service = binding.service_name(),
                    "Installed method binding"
                );
            }
        }

        let announcement = Announcement {
            registrar: self.registrar.clone(),
            host,
            services: descriptors.iter().map(|d| d.name.clone()).collect(),
        };

        let gateway = if self.config.gateway.enabled {
            let router = self.wire_gateway(descriptors, rpc_addr.port(), units)?;
            let (listener, addr) = net::bind(
                Protocol::Http,
                &self.config.gateway.bind_host,
                self.config.gateway.port,
            )
            .await?;
            Some(GatewayUnit {
                listener,
                port: addr.port(),
                router,
                announcement: announcement.clone(),
                shutdown_timeout: self.config.gateway.shutdown_timeout(),
            })
        } else {
            None
        };

        let rpc = RpcUnit {
            listener: rpc_listener,
            port: rpc_addr.port(),
            routes: routes.routes(),
            interceptors: self.interceptors.clone(),
            stats: self.stats.clone(),
            announcement,
            shutdown_timeout: self.config.rpc.shutdown_timeout(),
        };

        Ok((rpc, gateway))
    }

    fn wire_gateway(
        &self,
        descriptors: &[ServiceDescriptor],
        rpc_port: u16,
        units: &CancellationToken,
    ) -> Result<axum::Router, StartupError> {
        let loopback = LoopbackConnection::dial(rpc_port, self.config.gateway.connect_timeout())?;
        let mut mux = GatewayMux::new();

        for descriptor in descriptors {
            let ctx = BindContext::new(descriptor.name.as_str(), units.clone());
            for binding in &descriptor.gateway_bindings {
                binding
                    .bind(&ctx, &mut mux, &loopback)
                    .map_err(|source| StartupError::GatewayBinding {
                        service: descriptor.name.clone(),
                        source,
                    })?;
            }
        }

        tracing::info!(
            routes = mux.paths().len(),
            loopback = %loopback.target(),
            "Gateway wired"
        );

        Ok(GatewayBridge::new(
            mux,
            Arc::clone(&self.trace_hook),
            self.config.gateway.request_timeout(),
        )
        .into_router())
    }

    async fn join(
        &self,
        rpc: RpcUnit,
        gateway: Option<GatewayUnit>,
        units: &CancellationToken,
        phase: &PhaseHandle,
    ) -> Result<(), HostError> {
        let draining = {
            let phase = phase.clone();
            let units = units.clone();
            tokio::spawn(async move {
                units.cancelled().await;
                phase.advance(Phase::Draining);
            })
        };

        let rpc_task = tokio::spawn(rpc.serve(units.clone()));
        let gateway_task = gateway.map(|unit| tokio::spawn(unit.serve(units.clone())));

        let (rpc_result, gateway_result) = tokio::join!(
            await_unit(Protocol::Rpc, rpc_task, units),
            async {
                match gateway_task {
                    Some(task) => await_unit(Protocol::Http, task, units).await,
                    None => Ok(()),
                }
            }
        );

        draining.abort();
        rpc_result.and(gateway_result)
    }
}

/// Wait for one unit; a failure cancels the sibling.
async fn await_unit(
    protocol: Protocol,
    task: JoinHandle<Result<(), HostError>>,
    units: &CancellationToken,
) -> Result<(), HostError> {
    let result = match task.await {
        Ok(result) => result,
        Err(e) => Err(ServeError::Join(protocol, e.to_string()).into()),
    };
    if let Err(e) = &result {
        tracing::error!(%protocol, error = %e, "Serving unit failed; stopping host");
        units.cancel();
    }
    result
}

fn reject_duplicate_services(descriptors: &[ServiceDescriptor]) -> Result<(), StartupError> {
    let mut seen = HashSet::new();
    for binding in descriptors.iter().flat_map(|d| &d.method_bindings) {
        if !seen.insert(binding.service_name()) {
            return Err(StartupError::DuplicateService(
                binding.service_name().to_string(),
            ));
        }
    }
    Ok(())
}
