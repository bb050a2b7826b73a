//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration for the host.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct HostConfig {
    /// Binary transport listener.
    pub rpc: RpcConfig,

    /// HTTP gateway listener and loopback settings.
    pub gateway: GatewayConfig,

    /// Trace header propagation through the gateway.
    pub trace: TraceConfig,

    /// Logging and metrics.
    pub observability: ObservabilityConfig,
}

/// Binary transport listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RpcConfig {
    /// Interface to bind.
    pub bind_host: String,

    /// Listener port. 0 picks an ephemeral port.
    pub port: u16,

    /// Host advertised to the registrar. Unset resolves the local interface.
    pub advertise_host: Option<String>,

    /// Drain deadline. Unset waits for in-flight calls indefinitely.
    pub shutdown_timeout_secs: Option<u64>,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            bind_host: "0.0.0.0".to_string(),
            port: 50051,
            advertise_host: None,
            shutdown_timeout_secs: None,
        }
    }
}

impl RpcConfig {
    pub fn shutdown_timeout(&self) -> Option<Duration> {
        self.shutdown_timeout_secs.map(Duration::from_secs)
    }
}

/// HTTP gateway configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Mirror services on the HTTP gateway.
    pub enabled: bool,

    /// Interface to bind.
    pub bind_host: String,

    /// Listener port. 0 picks an ephemeral port.
    pub port: u16,

    /// Per-request timeout applied to every gateway route.
    pub request_timeout_secs: u64,

    /// Drain deadline. Unset waits for in-flight requests indefinitely.
    pub shutdown_timeout_secs: Option<u64>,

    /// Connect timeout for the loopback channel into the binary listener.
    pub connect_timeout_secs: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bind_host: "0.0.0.0".to_string(),
            port: 8080,
            request_timeout_secs: 30,
            shutdown_timeout_secs: None,
            connect_timeout_secs: 5,
        }
    }
}

impl GatewayConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn shutdown_timeout(&self) -> Option<Duration> {
        self.shutdown_timeout_secs.map(Duration::from_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

/// Trace propagation configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct TraceConfig {
    /// Copy W3C trace headers into outgoing binary metadata.
    pub propagate: bool,

    /// Additional header names copied alongside `traceparent`/`tracestate`.
    pub extra_headers: Vec<String>,
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` overrides it.
    pub log_level: String,

    /// Log line format.
    pub log_format: LogFormat,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
