//! Binary transport plumbing.
//!
//! # Data Flow
//! ```text
//! gRPC request
//!     → stats.rs (per-call telemetry, outermost)
//!     → interceptor.rs (ordered chain, first rejection wins)
//!     → tonic Routes (one entry per MethodBinding)
//!     → raw.rs (RawService dispatching to a UnaryHandler)
//!     → codec.rs (message bytes passed through untouched)
//! ```
//!
//! # Design Decisions
//! - Framing and dispatch stay in tonic; this module only adapts
//! - Raw bytes keep the gateway and hand-written services free of codegen
//! - Generated tonic servers plug in through the same MethodBinding seam

pub mod codec;
pub mod interceptor;
pub mod raw;
pub mod stats;

pub use codec::RawCodec;
pub use interceptor::{CallInterceptor, InterceptorChain};
pub use raw::{RawService, UnaryHandler};
pub use stats::{CallRecord, CallStatsLayer, MetricsStatsHandler, StatsHandler};
