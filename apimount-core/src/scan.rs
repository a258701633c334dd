// Scanning contract: what the classifier consumes, independent of discovery

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::declaration::EndpointDeclaration;
use crate::error::Result;
use crate::ids::EndpointId;

/// Include / exclude package scopes for a scan.
///
/// Packages are dot separated and matched per segment, so `com.acme` covers
/// `com.acme` and `com.acme.api` but not `com.acmex`. An empty include list
/// covers everything. Exclusion always wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanScope {
    #[serde(default)]
    include: Vec<String>,
    #[serde(default)]
    exclude: Vec<String>,
}

impl ScanScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn include(mut self, package: impl Into<String>) -> Self {
        self.include.push(package.into());
        self
    }

    pub fn exclude(mut self, package: impl Into<String>) -> Self {
        self.exclude.push(package.into());
        self
    }

    pub fn with_include<I, S>(mut self, packages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include.extend(packages.into_iter().map(Into::into));
        self
    }

    pub fn with_exclude<I, S>(mut self, packages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude.extend(packages.into_iter().map(Into::into));
        self
    }

    pub fn matches(&self, package: &str) -> bool {
        if self.exclude.iter().any(|scope| covers(scope, package)) {
            return false;
        }
        self.include.is_empty() || self.include.iter().any(|scope| covers(scope, package))
    }
}

fn covers(scope: &str, package: &str) -> bool {
    match package.strip_prefix(scope) {
        Some(rest) => scope.is_empty() || rest.is_empty() || rest.starts_with('.'),
        None => false,
    }
}

/// One discovered endpoint type and every placement it declares.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScannedEndpoint {
    pub id: EndpointId,
    #[serde(default)]
    pub package: String,
    #[serde(default)]
    pub declarations: Vec<EndpointDeclaration>,
}

impl ScannedEndpoint {
    pub fn new(id: impl Into<EndpointId>, package: impl Into<String>) -> Self {
        ScannedEndpoint {
            id: id.into(),
            package: package.into(),
            declarations: Vec::new(),
        }
    }

    pub fn declare(mut self, declaration: EndpointDeclaration) -> Self {
        self.declarations.push(declaration);
        self
    }
}

/// Source of endpoint declarations.
pub trait EndpointScanner: Send + Sync + fmt::Debug {
    fn scan(&self, scope: &ScanScope) -> Result<Vec<ScannedEndpoint>>;
}

/// Scanner over a fixed list, e.g. assembled in code or read from a manifest.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StaticScanner {
    #[serde(default)]
    endpoints: Vec<ScannedEndpoint>,
}

impl StaticScanner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_endpoint(mut self, endpoint: ScannedEndpoint) -> Self {
        self.endpoints.push(endpoint);
        self
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn endpoints(&self) -> &[ScannedEndpoint] {
        &self.endpoints
    }
}

impl EndpointScanner for StaticScanner {
    fn scan(&self, scope: &ScanScope) -> Result<Vec<ScannedEndpoint>> {
        let found: Vec<ScannedEndpoint> = self
            .endpoints
            .iter()
            .filter(|endpoint| scope.matches(&endpoint.package))
            .cloned()
            .collect();
        debug!(
            "Scan matched {} of {} endpoints",
            found.len(),
            self.endpoints.len()
        );
        Ok(found)
    }
}
