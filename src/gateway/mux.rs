//! Gateway route table.

use axum::routing::MethodRouter;
use axum::Router;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// A route a gateway binding tried to add but could not.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error("gateway path '{0}' must start with '/'")]
    InvalidPath(String),

    #[error("gateway path '{0}' is already bound")]
    Conflict(String),
}

/// Route table handed to gateway bindings.
///
/// A thin wrapper over an axum [`Router`] so bindings can add routes through
/// `&mut` without taking ownership of the table. Each path is owned by
/// exactly one `route` call.
#[derive(Debug, Default)]
pub struct GatewayMux {
    router: Router,
    routes: Vec<String>,
}

impl GatewayMux {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a route. A malformed or already bound path is rejected and leaves
    /// the table unchanged.
    pub fn route(
        &mut self,
        path: &str,
        method_router: MethodRouter,
    ) -> Result<&mut Self, RouteError> {
        if !path.starts_with('/') {
            return Err(RouteError::InvalidPath(path.to_string()));
        }
        if self.routes.iter().any(|p| p == path) {
            return Err(RouteError::Conflict(path.to_string()));
        }

        self.router = std::mem::take(&mut self.router).route(path, method_router);
        self.routes.push(path.to_string());
        Ok(self)
    }

    /// Paths added through [`route`](Self::route), in order.
    pub fn paths(&self) -> &[String] {
        &self.routes
    }

    pub(crate) fn into_router(self) -> Router {
        self.router
    }
}

/// Context passed to gateway bindings.
#[derive(Debug, Clone)]
pub struct BindContext {
    service: String,
    cancel: CancellationToken,
}

impl BindContext {
    pub(crate) fn new(service: impl Into<String>, cancel: CancellationToken) -> Self {
        Self {
            service: service.into(),
            cancel,
        }
    }

    /// Identity of the service being bound.
    pub fn service(&self) -> &str {
        &self.service
    }

    /// Cancelled when the host starts draining. Bindings that spawn
    /// background work should stop on it.
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }
}
