//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Phases (phase.rs):
//!     Created → Configured → Running → Draining → Stopped
//!
//! Shutdown (shutdown.rs):
//!     Token cancelled → Stop accepting → Drain in-flight work → (deadline) → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Cancel the shared token
//! ```
//!
//! # Design Decisions
//! - Phases only move forward; no cycles
//! - One cancellation token is shared by every serving unit
//! - Drain deadline is optional; unset means wait indefinitely

pub mod phase;
pub mod shutdown;
pub mod signals;

pub use phase::{Phase, PhaseError};
pub use shutdown::drain;
pub use signals::cancel_on_signal;
