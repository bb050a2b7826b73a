//! Registrar contract.

use async_trait::async_trait;

use crate::error::{BoxError, StartupError};

use super::node::{Node, Protocol};

/// Error reported by a registry backend.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("registry rejected node: {0}")]
    Rejected(String),

    #[error("registry unavailable: {0}")]
    Unavailable(#[source] BoxError),
}

/// External system of record for [`Node`]s.
///
/// Implementations own retry, heartbeat and expiry; the host calls
/// `register` exactly once per node.
#[async_trait]
pub trait Registrar: Send + Sync + 'static {
    async fn register(&self, node: Node) -> Result<(), RegistryError>;
}

/// Submit one node per service for `protocol`, stopping at the first failure.
pub async fn register_all(
    registrar: Option<&dyn Registrar>,
    host: &str,
    port: u16,
    protocol: Protocol,
    services: &[String],
) -> Result<(), StartupError> {
    let Some(registrar) = registrar else {
        tracing::info!(%protocol, "No registrar configured; skipping discovery registration");
        return Ok(());
    };

    for service in services {
        let node = Node::new(host, port, protocol, service.as_str());
        let endpoint = node.endpoint();
        registrar
            .register(node)
            .await
            .map_err(|source| StartupError::Registration {
                service: service.clone(),
                protocol,
                source,
            })?;
        tracing::info!(%protocol, service = %service, endpoint = %endpoint, "Registered node");
    }

    Ok(())
}
