//! Discovery registration.
//!
//! # Data Flow
//! ```text
//! Listener bound
//!     → one Node per registered service (node.rs)
//!     → Registrar::register (registrar.rs), one shot, no retry
//!     → accept loop starts
//! ```
//!
//! # Design Decisions
//! - Registration happens after bind but before the first accept; consumers
//!   may see a node a moment before its listener is accepting
//! - Deregistration, heartbeats and retries belong to the registry
//! - A registration failure is fatal for the host

pub mod memory;
pub mod node;
pub mod registrar;

pub use memory::InMemoryRegistrar;
pub use node::{Node, Protocol};
pub use registrar::{register_all, Registrar, RegistryError};
