//! In-process registrar.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use super::node::{Node, Protocol};
use super::registrar::{Registrar, RegistryError};

/// Registrar that keeps nodes in memory.
///
/// Useful for single-process deployments and tests. Registering the same
/// node twice is rejected, mirroring registries that key on
/// `(service, protocol, endpoint)`.
#[derive(Debug, Default, Clone)]
pub struct InMemoryRegistrar {
    nodes: Arc<DashMap<Node, u64>>,
    seq: Arc<AtomicU64>,
}

impl InMemoryRegistrar {
    pub fn new() -> Self {
        Self::default()
    }

    /// All nodes in submission order.
    pub fn nodes(&self) -> Vec<Node> {
        let mut nodes: Vec<(u64, Node)> = self
            .nodes
            .iter()
            .map(|entry| (*entry.value(), entry.key().clone()))
            .collect();
        nodes.sort_by_key(|(seq, _)| *seq);
        nodes.into_iter().map(|(_, node)| node).collect()
    }

    /// Nodes advertised over `protocol`, in submission order.
    pub fn nodes_for(&self, protocol: Protocol) -> Vec<Node> {
        self.nodes()
            .into_iter()
            .filter(|n| n.protocol() == protocol)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[async_trait]
impl Registrar for InMemoryRegistrar {
    async fn register(&self, node: Node) -> Result<(), RegistryError> {
        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        match self.nodes.entry(node) {
            Entry::Occupied(e) => Err(RegistryError::Rejected(format!(
                "{} {} already registered at {}",
                e.key().protocol(),
                e.key().service(),
                e.key().endpoint()
            ))),
            Entry::Vacant(e) => {
                e.insert(seq);
                Ok(())
            }
        }
    }
}
