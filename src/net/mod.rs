//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Configured host:port
//!     → listener.rs (bind, report the bound address)
//!     → handed to the serving unit for its transport
//!
//! Advertised host (advertise.rs):
//!     explicit config → StaticAddress
//!     otherwise       → LocalInterface (primary outbound interface)
//! ```
//!
//! # Design Decisions
//! - Both listeners bind during startup, before any node is advertised
//! - An empty advertised host is a startup error, never a silent default

pub mod advertise;
pub mod listener;

pub use advertise::{AddressResolver, LocalInterface, StaticAddress};
pub use listener::bind;
