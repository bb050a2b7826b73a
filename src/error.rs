//! Error taxonomy for the host.
//!
//! # Propagation
//! ```text
//! ConfigurationError → returned from Host::register, recoverable by the caller
//! StartupError       → returned from Host::run, fatal for the process
//! ServeError         → a transport died while serving, fatal for the process
//! ShutdownError      → logged while draining, never returned
//! ```
//!
//! Request-time panics never show up here; the gateway turns them into 500s.

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::ValidationError;
use crate::discovery::{Protocol, RegistryError};
use crate::lifecycle::Phase;

/// Boxed error returned by gateway binding functions and pluggable hooks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Rejected service descriptor.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("service '{service}' has an invalid descriptor")]
    InvalidDescriptor { service: String },

    #[error("service '{service}' declares no method bindings")]
    NoMethodBindings { service: String },
}

/// Failures that abort [`Host::run`](crate::Host::run) before both units are serving.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid host configuration: {}", join(.0))]
    InvalidConfig(Vec<ValidationError>),

    #[error("failed to resolve advertised host: {0}")]
    AdvertiseAddress(String),

    #[error("gRPC service '{0}' is bound more than once")]
    DuplicateService(String),

    #[error("failed to bind {protocol} listener on {addr}: {source}")]
    Bind {
        protocol: Protocol,
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to dial loopback connection to {addr}: {source}")]
    Loopback {
        addr: SocketAddr,
        #[source]
        source: tonic::transport::Error,
    },

    #[error("gateway binding for service '{service}' failed: {source}")]
    GatewayBinding {
        service: String,
        #[source]
        source: BoxError,
    },

    #[error("failed to register {protocol} node for service '{service}': {source}")]
    Registration {
        service: String,
        protocol: Protocol,
        #[source]
        source: RegistryError,
    },
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// A serving unit terminated without being asked to.
#[derive(Debug, Error)]
pub enum ServeError {
    #[error("rpc server error: {0}")]
    Rpc(#[from] tonic::transport::Error),

    #[error("gateway server error: {0}")]
    Gateway(#[from] std::io::Error),

    #[error("{0} unit terminated abnormally: {1}")]
    Join(Protocol, String),
}

/// Problems observed while draining. Logged, never propagated.
#[derive(Debug, Error)]
pub enum ShutdownError {
    #[error("{protocol} drain did not finish within {secs}s, forcing close")]
    DeadlineExceeded { protocol: Protocol, secs: u64 },

    #[error("failed to shut down {protocol} server: {message}")]
    Failed { protocol: Protocol, message: String },
}

/// Top-level error returned by [`Host`](crate::Host) operations.
#[derive(Debug, Error)]
pub enum HostError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error("operation '{operation}' is not allowed while the host is {phase}")]
    Phase {
        operation: &'static str,
        phase: Phase,
    },

    #[error(transparent)]
    Startup(#[from] StartupError),

    #[error(transparent)]
    Serve(#[from] ServeError),
}

impl HostError {
    /// Whether the process should terminate on this error.
    pub fn is_fatal(&self) -> bool {
        matches!(self, HostError::Startup(_) | HostError::Serve(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_errors_are_not_fatal() {
        let err: HostError = ConfigurationError::NoMethodBindings {
            service: "Foo".into(),
        }
        .into();
        assert!(!err.is_fatal());
        assert_eq!(err.to_string(), "service 'Foo' declares no method bindings");
    }

    #[test]
    fn startup_errors_are_fatal() {
        let err: HostError = StartupError::DuplicateService("demo.Foo".into()).into();
        assert!(err.is_fatal());
    }

    #[test]
    fn phase_error_names_operation_and_phase() {
        let err = HostError::Phase {
            operation: "register",
            phase: Phase::Running,
        };
        assert_eq!(
            err.to_string(),
            "operation 'register' is not allowed while the host is running"
        );
    }
}
