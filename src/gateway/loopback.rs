//! Loopback connection into the host's own binary listener.

use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use bytes::Bytes;
use http::uri::PathAndQuery;
use tonic::transport::{Channel, Endpoint};
use tonic::{Request, Response, Status};

use crate::error::StartupError;
use crate::rpc::RawCodec;

/// Client handle dialled back into the binary listener.
///
/// Cloning is cheap and every clone shares the same underlying channel;
/// concurrent calls are safe. Handlers cannot close or re-dial it.
#[derive(Debug, Clone)]
pub struct LoopbackConnection {
    channel: Channel,
    target: SocketAddr,
}

impl LoopbackConnection {
    /// Dial `127.0.0.1:port`.
    ///
    /// The connection is established lazily on first use: the binary
    /// listener is bound but not yet accepting when the gateway is wired.
    pub(crate) fn dial(port: u16, connect_timeout: Duration) -> Result<Self, StartupError> {
        let target = SocketAddr::from((Ipv4Addr::LOCALHOST, port));
        let channel = Endpoint::from_shared(format!("http://{target}"))
            .map_err(|source| StartupError::Loopback {
                addr: target,
                source,
            })?
            .connect_timeout(connect_timeout)
            .tcp_nodelay(true)
            .connect_lazy();

        tracing::debug!(%target, "Loopback connection prepared");
        Ok(Self { channel, target })
    }

    /// Address the channel dials.
    pub fn target(&self) -> SocketAddr {
        self.target
    }

    /// A handle to the shared channel, for generated tonic clients.
    pub fn channel(&self) -> Channel {
        self.channel.clone()
    }

    /// Issue a unary call with a raw message body.
    pub async fn unary(
        &self,
        path: &str,
        request: Request<Bytes>,
    ) -> Result<Response<Bytes>, Status> {
        let path = PathAndQuery::try_from(path)
            .map_err(|e| Status::internal(format!("invalid method path '{path}': {e}")))?;

        let mut client = tonic::client::Grpc::new(self.channel.clone());
        client
            .ready()
            .await
            .map_err(|e| Status::unavailable(format!("loopback not ready: {e}")))?;
        client.unary(request, path, RawCodec).await
    }
}
