//! HTTP gateway serving unit.

use std::future::IntoFuture;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::discovery::Protocol;
use crate::error::{HostError, ServeError, ShutdownError};
use crate::lifecycle::drain;

use super::Announcement;

pub(crate) struct GatewayUnit {
    pub(crate) listener: TcpListener,
    pub(crate) port: u16,
    pub(crate) router: Router,
    pub(crate) announcement: Announcement,
    pub(crate) shutdown_timeout: Option<Duration>,
}

impl GatewayUnit {
    pub(crate) async fn serve(self, cancel: CancellationToken) -> Result<(), HostError> {
        self.announcement.submit(Protocol::Http, self.port).await?;

        tracing::info!(port = self.port, "HTTP gateway starting");

        let shutdown = cancel.clone();
        let server = axum::serve(self.listener, self.router.into_make_service())
            .with_graceful_shutdown(async move {
                shutdown.cancelled().await;
                tracing::info!("HTTP gateway draining");
            })
            .into_future();

        match drain(Protocol::Http, server, &cancel, self.shutdown_timeout).await {
            Some(Ok(())) => {
                tracing::info!("HTTP gateway stopped");
                Ok(())
            }
            Some(Err(e)) if cancel.is_cancelled() => {
                let err = ShutdownError::Failed {
                    protocol: Protocol::Http,
                    message: e.to_string(),
                };
                tracing::error!(error = %err, "HTTP gateway shutdown failed");
                Ok(())
            }
            Some(Err(e)) => Err(ServeError::Gateway(e).into()),
            None => Ok(()),
        }
    }
}
