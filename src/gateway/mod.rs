//! HTTP gateway bridge.
//!
//! # Data Flow
//! ```text
//! HTTP request
//!     → bridge.rs (panic isolation, request id, tracing, timeout)
//!     → trace.rs (TraceHook enriches the request)
//!     → mux.rs (route table filled by each service's GatewayBinding)
//!     → forward.rs (HTTP body → gRPC call)
//!     → loopback.rs (shared channel into the host's own binary listener)
//! ```
//!
//! # Design Decisions
//! - Route registration belongs to services; the bridge only supplies the
//!   table and the loopback connection
//! - Panic isolation and the trace hook wrap every route unconditionally
//! - One loopback channel per run, cloned into handlers, never re-dialled

pub mod bridge;
pub mod forward;
pub mod loopback;
pub mod mux;
pub mod trace;

pub use bridge::GatewayBridge;
pub use forward::{forward_unary, http_status_for};
pub use loopback::LoopbackConnection;
pub use mux::{BindContext, GatewayMux, RouteError};
pub use trace::{NoopTraceHook, TraceContext, TraceHook, W3cTraceHook};
