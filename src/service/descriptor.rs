//! Service descriptors.

use std::fmt;

use crate::error::ConfigurationError;

use super::binding::{GatewayBinding, MethodBinding};

/// Metadata a service exposes to the host.
///
/// Only descriptors that are `valid` and carry at least one method binding
/// are accepted by [`Host::register`](crate::Host::register).
#[derive(Clone)]
pub struct ServiceDescriptor {
    /// Identity advertised in discovery nodes.
    pub name: String,
    pub valid: bool,
    pub method_bindings: Vec<MethodBinding>,
    pub gateway_bindings: Vec<GatewayBinding>,
}

impl ServiceDescriptor {
    /// A valid descriptor with no bindings yet.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            valid: true,
            method_bindings: Vec::new(),
            gateway_bindings: Vec::new(),
        }
    }

    pub fn with_method(mut self, binding: MethodBinding) -> Self {
        self.method_bindings.push(binding);
        self
    }

    pub fn with_gateway(mut self, binding: GatewayBinding) -> Self {
        self.gateway_bindings.push(binding);
        self
    }

    /// Mark the descriptor as (in)valid.
    pub fn valid(mut self, valid: bool) -> Self {
        self.valid = valid;
        self
    }

    /// Check the registration preconditions.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if !self.valid {
            return Err(ConfigurationError::InvalidDescriptor {
                service: self.name.clone(),
            });
        }
        if self.method_bindings.is_empty() {
            return Err(ConfigurationError::NoMethodBindings {
                service: self.name.clone(),
            });
        }
        Ok(())
    }
}

impl fmt::Debug for ServiceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let methods: Vec<_> = self
            .method_bindings
            .iter()
            .map(MethodBinding::service_name)
            .collect();
        f.debug_struct("ServiceDescriptor")
            .field("name", &self.name)
            .field("valid", &self.valid)
            .field("method_bindings", &methods)
            .field("gateway_bindings", &self.gateway_bindings.len())
            .finish()
    }
}
