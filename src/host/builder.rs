//! Programmatic host options.

use std::sync::Arc;

use crate::config::HostConfig;
use crate::discovery::Registrar;
use crate::gateway::{NoopTraceHook, TraceHook, W3cTraceHook};
use crate::net::{AddressResolver, LocalInterface, StaticAddress};
use crate::rpc::{CallInterceptor, InterceptorChain, StatsHandler};

use super::server::Host;

/// Collects the options that TOML cannot express.
///
/// ```no_run
/// # use rpc_host::{Host, HostConfig, discovery::InMemoryRegistrar};
/// let registrar = InMemoryRegistrar::new();
/// let host = Host::builder(HostConfig::default())
///     .registrar(registrar.clone())
///     .interceptor(|req: tonic::Request<()>| Ok::<_, tonic::Status>(req))
///     .build();
/// ```
pub struct HostBuilder {
    config: HostConfig,
    interceptors: Vec<Arc<dyn CallInterceptor>>,
    stats: Option<Arc<dyn StatsHandler>>,
    trace_hook: Option<Arc<dyn TraceHook>>,
    registrar: Option<Arc<dyn Registrar>>,
    resolver: Option<Arc<dyn AddressResolver>>,
}

impl HostBuilder {
    pub(crate) fn new(config: HostConfig) -> Self {
        Self {
            config,
            interceptors: Vec::new(),
            stats: None,
            trace_hook: None,
            registrar: None,
            resolver: None,
        }
    }

    /// Append an interceptor; binary calls pass through them in insertion order.
    pub fn interceptor<I: CallInterceptor>(mut self, interceptor: I) -> Self {
        self.interceptors.push(Arc::new(interceptor));
        self
    }

    pub fn stats_handler<H: StatsHandler>(mut self, handler: H) -> Self {
        self.stats = Some(Arc::new(handler));
        self
    }

    /// Overrides the hook chosen by `[trace]` configuration.
    pub fn trace_hook<H: TraceHook>(mut self, hook: H) -> Self {
        self.trace_hook = Some(Arc::new(hook));
        self
    }

    /// Without a registrar, node registration is skipped.
    pub fn registrar<R: Registrar>(mut self, registrar: R) -> Self {
        self.registrar = Some(Arc::new(registrar));
        self
    }

    /// Overrides `rpc.advertise_host` and local interface discovery.
    pub fn address_resolver<A: AddressResolver>(mut self, resolver: A) -> Self {
        self.resolver = Some(Arc::new(resolver));
        self
    }

    pub fn build(self) -> Host {
        let trace_hook: Arc<dyn TraceHook> = match self.trace_hook {
            Some(hook) => hook,
            None if self.config.trace.propagate => {
                Arc::new(W3cTraceHook::new(self.config.trace.extra_headers.iter()))
            }
            None => Arc::new(NoopTraceHook),
        };

        let configured = &self.config.rpc.advertise_host;
        let resolver: Arc<dyn AddressResolver> = match (self.resolver, configured) {
            (Some(resolver), _) => resolver,
            (None, Some(host)) => Arc::new(StaticAddress::new(host.clone())),
            (None, None) => Arc::new(LocalInterface),
        };

        Host::from_parts(
            self.config,
            InterceptorChain::new(self.interceptors),
            self.stats,
            trace_hook,
            self.registrar,
            resolver,
        )
    }
}
