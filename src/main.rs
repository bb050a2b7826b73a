//! `rpc-host` binary: serves the built-in ping service on both transports.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio_util::sync::CancellationToken;

use rpc_host::config::{load_config, validate_config, ConfigError, HostConfig};
use rpc_host::discovery::InMemoryRegistrar;
use rpc_host::lifecycle::cancel_on_signal;
use rpc_host::observability::{init_logging, init_metrics};
use rpc_host::rpc::MetricsStatsHandler;
use rpc_host::service::PingService;
use rpc_host::Host;

#[derive(Parser)]
#[command(name = "rpc-host")]
#[command(about = "Dual-protocol service host (gRPC + HTTP gateway)", long_about = None)]
struct Cli {
    /// TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `rpc.port`.
    #[arg(long)]
    rpc_port: Option<u16>,

    /// Override `gateway.port`.
    #[arg(long)]
    gateway_port: Option<u16>,

    /// Serve the binary transport only.
    #[arg(long)]
    no_gateway: bool,
}

impl Cli {
    fn into_config(self) -> Result<HostConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => HostConfig::default(),
        };

        if let Some(port) = self.rpc_port {
            config.rpc.port = port;
        }
        if let Some(port) = self.gateway_port {
            config.gateway.port = port;
        }
        if self.no_gateway {
            config.gateway.enabled = false;
        }

        validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Cli::parse().into_config()?;

    init_logging(&config.observability);
    tracing::info!("rpc-host v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        rpc_port = config.rpc.port,
        gateway_enabled = config.gateway.enabled,
        gateway_port = config.gateway.port,
        "Configuration loaded"
    );

    let mut builder = Host::builder(config.clone()).registrar(InMemoryRegistrar::new());

    if config.observability.metrics_enabled {
        // Validation guarantees the address parses.
        let addr = config.observability.metrics_address.parse()?;
        init_metrics(addr)?;
        builder = builder.stats_handler(MetricsStatsHandler);
    }

    let host = builder.build();
    host.register(Arc::new(PingService))?;

    let cancel = CancellationToken::new();
    let signals = cancel_on_signal(cancel.clone());

    let result = host.run(cancel).await;
    signals.abort();

    if let Err(e) = &result {
        tracing::error!(error = %e, fatal = e.is_fatal(), "Host terminated with error");
    }
    result?;

    tracing::info!("Shutdown complete");
    Ok(())
}
