//! Binary transport serving unit.

use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tokio_util::sync::CancellationToken;
use tonic::service::{InterceptorLayer, Routes};
use tonic::transport::Server;

use crate::discovery::Protocol;
use crate::error::{HostError, ServeError};
use crate::lifecycle::drain;
use crate::rpc::{CallStatsLayer, InterceptorChain, StatsHandler};

use super::Announcement;

pub(crate) struct RpcUnit {
    pub(crate) listener: TcpListener,
    pub(crate) port: u16,
    pub(crate) routes: Routes,
    pub(crate) interceptors: InterceptorChain,
    pub(crate) stats: Option<Arc<dyn StatsHandler>>,
    pub(crate) announcement: Announcement,
    pub(crate) shutdown_timeout: Option<Duration>,
}

impl RpcUnit {
    pub(crate) async fn serve(self, cancel: CancellationToken) -> Result<(), HostError> {
        self.announcement.submit(Protocol::Rpc, self.port).await?;

        tracing::info!(
            port = self.port,
            interceptors = self.interceptors.len(),
            "RPC server starting"
        );

        let shutdown = cancel.clone();
        let server = Server::builder()
            .layer(CallStatsLayer::new(self.stats))
            .layer(InterceptorLayer::new(self.interceptors))
            .add_routes(self.routes)
            .serve_with_incoming_shutdown(TcpListenerStream::new(self.listener), async move {
                shutdown.cancelled().await;
                tracing::info!("RPC server draining");
            });

        match drain(Protocol::Rpc, server, &cancel, self.shutdown_timeout).await {
            Some(Ok(())) => {
                tracing::info!("RPC server stopped");
                Ok(())
            }
            Some(Err(e)) => Err(ServeError::Rpc(e).into()),
            None => Ok(()),
        }
    }
}
