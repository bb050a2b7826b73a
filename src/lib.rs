//! Dual-protocol service host.
//!
//! Serves a set of registered services on one gRPC listener and, optionally,
//! mirrors them on an HTTP gateway that forwards into that listener over a
//! loopback connection. Both transports start, register with discovery and
//! drain as one unit.
//!
//! # Architecture Overview
//!
//! ```text
//!                     ┌──────────────────────────────────────────────┐
//!                     │                    HOST                      │
//!                     │                                              │
//!   gRPC client ──────┼─▶ rpc listener ─▶ interceptors ─▶ services   │
//!                     │        ▲                                     │
//!                     │        │ loopback channel                    │
//!                     │        │                                     │
//!   HTTP client ──────┼─▶ gateway ─▶ panic isolation ─▶ route table  │
//!                     │                                              │
//!                     │  ┌────────────────────────────────────────┐  │
//!                     │  │ discovery │ lifecycle │ observability  │  │
//!                     │  └────────────────────────────────────────┘  │
//!                     └──────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod discovery;
pub mod error;
pub mod gateway;
pub mod host;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod rpc;
pub mod service;

pub use config::HostConfig;
pub use error::{
    BoxError, ConfigurationError, HostError, ServeError, ShutdownError, StartupError,
};
pub use host::{Host, HostBuilder};
pub use lifecycle::Phase;
pub use service::{GatewayBinding, MethodBinding, Service, ServiceDescriptor};
