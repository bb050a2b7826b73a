//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0)
//! - Detect conflicting listeners
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: HostConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::HostConfig;

/// One semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("rpc.port and gateway.port are both {0}")]
    PortConflict(u16),

    #[error("{field} must be greater than zero")]
    ZeroTimeout { field: &'static str },

    #[error("rpc.advertise_host is set but empty")]
    EmptyAdvertiseHost,

    #[error("observability.metrics_address '{0}' is not a socket address")]
    MetricsAddress(String),
}

pub fn validate_config(config: &HostConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    // Port 0 binds two distinct ephemeral ports.
    if config.gateway.enabled && config.rpc.port != 0 && config.rpc.port == config.gateway.port {
        errors.push(ValidationError::PortConflict(config.rpc.port));
    }

    if config.gateway.request_timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout {
            field: "gateway.request_timeout_secs",
        });
    }
    if config.gateway.connect_timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout {
            field: "gateway.connect_timeout_secs",
        });
    }
    if config.rpc.shutdown_timeout_secs == Some(0) {
        errors.push(ValidationError::ZeroTimeout {
            field: "rpc.shutdown_timeout_secs",
        });
    }
    if config.gateway.shutdown_timeout_secs == Some(0) {
        errors.push(ValidationError::ZeroTimeout {
            field: "gateway.shutdown_timeout_secs",
        });
    }

    if matches!(&config.rpc.advertise_host, Some(host) if host.trim().is_empty()) {
        errors.push(ValidationError::EmptyAdvertiseHost);
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(validate_config(&HostConfig::default()).is_ok());
    }

    #[test]
    fn collects_every_problem() {
        let mut config = HostConfig::default();
        config.rpc.port = 7000;
        config.gateway.port = 7000;
        config.gateway.request_timeout_secs = 0;
        config.observability.metrics_enabled = true;
        config.observability.metrics_address = "nowhere".into();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::PortConflict(7000),
                ValidationError::ZeroTimeout {
                    field: "gateway.request_timeout_secs"
                },
                ValidationError::MetricsAddress("nowhere".into()),
            ]
        );
    }

    #[test]
    fn shared_port_is_fine_without_gateway() {
        let mut config = HostConfig::default();
        config.gateway.enabled = false;
        config.gateway.port = config.rpc.port;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn both_ephemeral_ports_do_not_conflict() {
        let mut config = HostConfig::default();
        config.rpc.port = 0;
        config.gateway.port = 0;
        assert!(validate_config(&config).is_ok());
    }
}
