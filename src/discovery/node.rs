//! Discovery node records.

use std::fmt;

use serde::Serialize;

/// Transport a node is reachable over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    /// Binary (gRPC) transport.
    Rpc,
    /// HTTP gateway.
    Http,
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Protocol::Rpc => f.write_str("rpc"),
            Protocol::Http => f.write_str("http"),
        }
    }
}

/// One service reachable over one transport.
///
/// Immutable once built; handed to the registrar by value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Node {
    host: String,
    port: u16,
    protocol: Protocol,
    service: String,
}

impl Node {
    pub fn new(
        host: impl Into<String>,
        port: u16,
        protocol: Protocol,
        service: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            protocol,
            service: service.into(),
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn protocol(&self) -> Protocol {
        self.protocol
    }

    /// Identity of the advertised service.
    pub fn service(&self) -> &str {
        &self.service
    }

    /// `host:port` as consumers would dial it.
    pub fn endpoint(&self) -> String {
        if self.host.contains(':') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}
