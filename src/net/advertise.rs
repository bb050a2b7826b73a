//! Resolution of the host string advertised in discovery nodes.

use crate::error::StartupError;

/// Produces the publicly reachable host for this process.
pub trait AddressResolver: Send + Sync + 'static {
    fn resolve(&self) -> Result<String, StartupError>;
}

/// A fixed host from configuration.
#[derive(Debug, Clone)]
pub struct StaticAddress(String);

impl StaticAddress {
    pub fn new(host: impl Into<String>) -> Self {
        Self(host.into())
    }
}

impl AddressResolver for StaticAddress {
    fn resolve(&self) -> Result<String, StartupError> {
        let host = self.0.trim();
        if host.is_empty() {
            return Err(StartupError::AdvertiseAddress(
                "configured advertise host is empty".into(),
            ));
        }
        Ok(host.to_string())
    }
}

/// IP of the interface the OS would route outbound traffic through.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalInterface;

impl AddressResolver for LocalInterface {
    fn resolve(&self) -> Result<String, StartupError> {
        let ip = local_ip_address::local_ip()
            .map_err(|e| StartupError::AdvertiseAddress(e.to_string()))?;
        if ip.is_unspecified() {
            return Err(StartupError::AdvertiseAddress(format!(
                "local interface resolved to unspecified address {ip}"
            )));
        }
        tracing::debug!(%ip, "Resolved advertised host from local interface");
        Ok(ip.to_string())
    }
}
