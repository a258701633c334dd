use dashmap::DashMap;
use std::sync::Arc;

use crate::factory::ServerFactory;

/// Servers that were bound, keyed by server name.
#[derive(Debug)]
pub struct ServerTable {
    servers: DashMap<String, Arc<ServerFactory>>,
}

impl ServerTable {
    pub fn new() -> Self {
        ServerTable {
            servers: DashMap::new(),
        }
    }

    pub fn insert(&self, name: impl Into<String>, server: Arc<ServerFactory>) {
        self.servers.insert(name.into(), server);
    }

    pub fn lookup(&self, name: &str) -> Option<Arc<ServerFactory>> {
        self.servers.get(name).map(|entry| Arc::clone(&*entry))
    }

    pub fn remove(&self, name: &str) -> Option<Arc<ServerFactory>> {
        self.servers.remove(name).map(|(_, v)| v)
    }

    /// Names in sorted order.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.servers.iter().map(|entry| entry.key().clone()).collect();
        names.sort();
        names
    }

    pub fn clear(&self) {
        self.servers.clear();
    }

    pub fn len(&self) -> usize {
        self.servers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.servers.is_empty()
    }
}

impl Default for ServerTable {
    fn default() -> Self {
        Self::new()
    }
}
