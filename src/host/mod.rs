//! Host lifecycle manager.
//!
//! # Data Flow
//! ```text
//! Host::register(service)
//!     → descriptor validated, appended under the phase guard
//!
//! Host::run(cancel)
//!     → resolve advertised host, reject duplicate gRPC services
//!     → bind binary listener, install every method binding
//!     → [gateway] dial loopback, run every gateway binding, bind HTTP
//!     → spawn rpc_unit + gateway_unit
//!           each: register nodes → serve → drain on cancellation
//!     → join both, return first fatal error
//! ```
//!
//! # Design Decisions
//! - Both listeners bind before either unit registers a node, so a bind
//!   failure never leaves a stale advertisement behind
//! - Nodes are announced before the first accept; connections racing that
//!   window wait in the listen backlog until the server starts accepting
//! - A unit failing while the other serves cancels a child token, never the
//!   caller's token

pub mod builder;
mod gateway_unit;
mod rpc_unit;
pub mod server;

pub use builder::HostBuilder;
pub use server::Host;

use std::sync::Arc;

use crate::discovery::{register_all, Protocol, Registrar};
use crate::error::StartupError;

/// Nodes a unit submits once its listener is bound.
#[derive(Clone)]
pub(crate) struct Announcement {
    registrar: Option<Arc<dyn Registrar>>,
    host: String,
    services: Vec<String>,
}

impl Announcement {
    pub(crate) async fn submit(&self, protocol: Protocol, port: u16) -> Result<(), StartupError> {
        register_all(
            self.registrar.as_deref(),
            &self.host,
            port,
            protocol,
            &self.services,
        )
        .await
    }
}
