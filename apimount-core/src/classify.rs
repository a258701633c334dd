// Endpoint classification: group endpoint types by resolved base path

use indexmap::IndexMap;
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::Result;
use crate::ids::EndpointId;
use crate::resolver::{PathResolver, ResolvedPath};
use crate::scan::{EndpointScanner, ScanScope, ScannedEndpoint};

/// Endpoint types grouped by the exact (path, enabled) key they resolved to.
///
/// Buckets keep first-seen order and never hold the same endpoint twice.
/// Equality ignores bucket order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassificationTable {
    buckets: IndexMap<ResolvedPath, Vec<EndpointId>>,
}

impl ClassificationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `id` under `path`. Returns false when it was already there.
    pub fn insert(&mut self, path: ResolvedPath, id: EndpointId) -> bool {
        let bucket = self.buckets.entry(path).or_default();
        if bucket.contains(&id) {
            false
        } else {
            bucket.push(id);
            true
        }
    }

    pub fn get(&self, path: &ResolvedPath) -> Option<&[EndpointId]> {
        self.buckets.get(path).map(Vec::as_slice)
    }

    pub fn contains(&self, path: &ResolvedPath) -> bool {
        self.buckets.contains_key(path)
    }

    pub fn paths(&self) -> impl Iterator<Item = &ResolvedPath> {
        self.buckets.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ResolvedPath, &[EndpointId])> {
        self.buckets.iter().map(|(path, ids)| (path, ids.as_slice()))
    }

    /// Buckets that should be bound: enabled and non-empty.
    pub fn bindable(&self) -> impl Iterator<Item = (&ResolvedPath, &[EndpointId])> {
        self.iter()
            .filter(|(path, ids)| path.is_enabled() && !ids.is_empty())
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

/// Resolves every declaration of every scanned endpoint and buckets the
/// endpoints by result.
#[derive(Debug, Clone)]
pub struct EndpointClassifier {
    resolver: Arc<dyn PathResolver>,
}

impl EndpointClassifier {
    pub fn new(resolver: Arc<dyn PathResolver>) -> Self {
        EndpointClassifier { resolver }
    }

    /// Build a table from scanned endpoints.
    ///
    /// The first declaration that fails to resolve aborts the run; no partial
    /// table is returned.
    pub fn classify(&self, endpoints: &[ScannedEndpoint]) -> Result<ClassificationTable> {
        let mut table = ClassificationTable::new();

        for endpoint in endpoints {
            for declaration in &endpoint.declarations {
                let path = self.resolver.resolve_declaration(declaration)?;
                if table.insert(path.clone(), endpoint.id.clone()) {
                    debug!("Classified {} under {}", endpoint.id, path);
                } else {
                    debug!("{} already classified under {}", endpoint.id, path);
                }
            }
        }

        info!(
            "Classified {} endpoints into {} paths",
            endpoints.len(),
            table.len()
        );
        Ok(table)
    }

    pub fn scan_and_classify(
        &self,
        scanner: &dyn EndpointScanner,
        scope: &ScanScope,
    ) -> Result<ClassificationTable> {
        let endpoints = scanner.scan(scope)?;
        self.classify(&endpoints)
    }
}
