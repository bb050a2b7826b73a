//! Metrics collection and exposition.
//!
//! # Metrics
//! - `rpc_host_calls_total` (counter): binary calls by path, grpc code
//! - `rpc_host_call_duration_seconds` (histogram): binary call latency
//!
//! Both are recorded by `rpc::stats::MetricsStatsHandler`.

use std::net::SocketAddr;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use thiserror::Error;

#[derive(Debug, Error)]
#[error("failed to install Prometheus exporter on {addr}: {source}")]
pub struct MetricsError {
    addr: SocketAddr,
    #[source]
    source: BuildError,
}

/// Install the global recorder and serve `/metrics` on `addr`.
///
/// Must be called from within a tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), MetricsError> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|source| MetricsError { addr, source })?;

    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}
