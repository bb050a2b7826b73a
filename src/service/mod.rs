//! Service contract consumed by the host.
//!
//! # Data Flow
//! ```text
//! caller's Service
//!     → descriptor() (descriptor.rs)
//!     → MethodBinding installed on the binary listener (binding.rs)
//!     → GatewayBinding invoked with the route table + loopback (binding.rs)
//! ```

pub mod binding;
pub mod descriptor;
pub mod ping;

pub use binding::{GatewayBinding, MethodBinding};
pub use descriptor::ServiceDescriptor;
pub use ping::PingService;

/// A business object the host can expose.
///
/// The host keeps an `Arc` to the service for as long as it is registered;
/// the caller retains its own handle.
pub trait Service: Send + Sync + 'static {
    fn descriptor(&self) -> ServiceDescriptor;
}
