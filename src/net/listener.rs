//! TCP listener binding.

use std::net::SocketAddr;

use tokio::net::TcpListener;

use crate::discovery::Protocol;
use crate::error::StartupError;

/// Bind `host:port` for `protocol`. Port 0 picks an ephemeral port; the
/// returned address carries the port actually bound.
pub async fn bind(
    protocol: Protocol,
    host: &str,
    port: u16,
) -> Result<(TcpListener, SocketAddr), StartupError> {
    let addr = if host.contains(':') && !host.starts_with('[') {
        format!("[{host}]:{port}")
    } else {
        format!("{host}:{port}")
    };

    let bind_error = |source| StartupError::Bind {
        protocol,
        addr: addr.clone(),
        source,
    };

    let listener = TcpListener::bind(&addr).await.map_err(bind_error)?;
    let local_addr = listener.local_addr().map_err(bind_error)?;

    tracing::info!(
        %protocol,
        address = %local_addr,
        "Listener bound"
    );

    Ok((listener, local_addr))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reports_ephemeral_port() {
        let (_listener, addr) = bind(Protocol::Rpc, "127.0.0.1", 0).await.unwrap();
        assert_ne!(addr.port(), 0);
    }

    #[tokio::test]
    async fn port_in_use_is_a_bind_error() {
        let (_held, addr) = bind(Protocol::Rpc, "127.0.0.1", 0).await.unwrap();
        let err = bind(Protocol::Http, "127.0.0.1", addr.port()).await.unwrap_err();
        assert!(matches!(
            err,
            StartupError::Bind {
                protocol: Protocol::Http,
                ..
            }
        ));
    }
}
