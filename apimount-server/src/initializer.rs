// Turns a classification table into bound, customized servers.

use apimount_core::{
    AutoconfigError, ClassificationTable, EndpointClassifier, EndpointId, EndpointScanner,
    PathResolver, ResolvedPath,
};
use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::component::Endpoint;
use crate::error::ServerError;
use crate::factory::ServerFactory;
use crate::fragment::ConfigFragment;
use crate::merge::MergeEngine;
use crate::server_table::ServerTable;
use crate::settings::AutoConfigSettings;

/// Creates endpoint instances from their identifiers.
pub trait ServiceFactory: Send + Sync + fmt::Debug {
    fn instantiate(&self, id: &EndpointId) -> Result<Arc<dyn Endpoint>, ServerError>;
}

/// Creates and starts a server from a fully customized factory.
#[async_trait]
pub trait ServerBinder: Send + Sync + fmt::Debug {
    async fn bind(&self, name: &str, server: &ServerFactory) -> Result<(), ServerError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoundServer {
    pub name: String,
    pub path: ResolvedPath,
    pub endpoints: Vec<EndpointId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedServer {
    pub name: String,
    pub path: ResolvedPath,
    pub endpoints: Vec<EndpointId>,
    pub error: String,
}

/// Outcome of one initialization run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InitializationReport {
    pub bound: Vec<BoundServer>,
    pub disabled: Vec<ResolvedPath>,
    pub failed: Vec<FailedServer>,
}

/// Scans, classifies, instantiates, customizes and binds one server per
/// enabled base path.
#[derive(Debug)]
pub struct EndpointInitializer {
    scanner: Arc<dyn EndpointScanner>,
    classifier: EndpointClassifier,
    engine: MergeEngine,
    fragments: Vec<ConfigFragment>,
    services: Arc<dyn ServiceFactory>,
    binder: Arc<dyn ServerBinder>,
    settings: AutoConfigSettings,
    servers: ServerTable,
}

impl EndpointInitializer {
    pub fn builder() -> EndpointInitializerBuilder {
        EndpointInitializerBuilder::default()
    }

    pub fn servers(&self) -> &ServerTable {
        &self.servers
    }

    pub fn fragments(&self) -> &[ConfigFragment] {
        &self.fragments
    }

    /// Classify everything in scope without binding.
    pub fn classify(&self) -> Result<ClassificationTable, ServerError> {
        Ok(self
            .classifier
            .scan_and_classify(self.scanner.as_ref(), &self.settings.scope())?)
    }

    /// Instantiate the endpoints of one bucket and apply every applicable fragment.
    ///
    /// Takes `&self` only, so distinct paths can be assembled concurrently.
    pub fn build_server(
        &self,
        path: &ResolvedPath,
        ids: &[EndpointId],
    ) -> Result<ServerFactory, ServerError> {
        let beans = ids
            .iter()
            .map(|id| self.services.instantiate(id))
            .collect::<Result<Vec<_>, _>>()?;

        let mut server = ServerFactory::new(path.clone()).with_service_beans(beans);
        let applied = self.engine.customize(&mut server, &self.fragments)?;
        debug!("Applied {} fragments to server at {}", applied, path);
        Ok(server)
    }

    /// Run the whole pipeline.
    ///
    /// Resolution and instantiation errors abort the run. A bind failure is
    /// logged and recorded, and the remaining paths are still bound.
    pub async fn initialize(&self) -> Result<InitializationReport, ServerError> {
        let table = self.classify()?;
        let mut report = InitializationReport::default();

        for (path, ids) in table.iter() {
            if !path.is_enabled() {
                debug!("Skipping disabled path {} ({} endpoints)", path, ids.len());
                report.disabled.push(path.clone());
                continue;
            }
            if ids.is_empty() {
                continue;
            }

            let server = self.build_server(path, ids)?;
            let name = path.server_name();
            match self.binder.bind(&name, &server).await {
                Ok(()) => {
                    info!(
                        "Bound server {} at {} with {} endpoints",
                        name,
                        server.address(),
                        ids.len()
                    );
                    self.servers.insert(name.clone(), Arc::new(server));
                    report.bound.push(BoundServer {
                        name,
                        path: path.clone(),
                        endpoints: ids.to_vec(),
                    });
                }
                Err(err) => {
                    let endpoints = ids
                        .iter()
                        .map(EndpointId::simple_name)
                        .collect::<Vec<_>>()
                        .join(",");
                    warn!(
                        "Error creating server {} that was expected to contain endpoints {}: {}",
                        name, endpoints, err
                    );
                    report.failed.push(FailedServer {
                        name,
                        path: path.clone(),
                        endpoints: ids.to_vec(),
                        error: err.to_string(),
                    });
                }
            }
        }

        info!(
            "Initialization finished: {} bound, {} disabled, {} failed",
            report.bound.len(),
            report.disabled.len(),
            report.failed.len()
        );
        Ok(report)
    }
}

#[derive(Debug, Default)]
pub struct EndpointInitializerBuilder {
    resolver: Option<Arc<dyn PathResolver>>,
    scanner: Option<Arc<dyn EndpointScanner>>,
    services: Option<Arc<dyn ServiceFactory>>,
    binder: Option<Arc<dyn ServerBinder>>,
    fragments: Vec<ConfigFragment>,
    settings: AutoConfigSettings,
}

impl EndpointInitializerBuilder {
    pub fn resolver(mut self, resolver: Arc<dyn PathResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    pub fn scanner(mut self, scanner: Arc<dyn EndpointScanner>) -> Self {
        self.scanner = Some(scanner);
        self
    }

    pub fn services(mut self, services: Arc<dyn ServiceFactory>) -> Self {
        self.services = Some(services);
        self
    }

    pub fn binder(mut self, binder: Arc<dyn ServerBinder>) -> Self {
        self.binder = Some(binder);
        self
    }

    pub fn fragment(mut self, fragment: ConfigFragment) -> Self {
        self.fragments.push(fragment);
        self
    }

    pub fn fragments<I>(mut self, fragments: I) -> Self
    where
        I: IntoIterator<Item = ConfigFragment>,
    {
        self.fragments.extend(fragments);
        self
    }

    pub fn settings(mut self, settings: AutoConfigSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn build(self) -> Result<EndpointInitializer, AutoconfigError> {
        let resolver = self
            .resolver
            .ok_or_else(|| AutoconfigError::missing_dependency("a path resolver is required"))?;
        let scanner = self
            .scanner
            .ok_or_else(|| AutoconfigError::missing_dependency("an endpoint scanner is required"))?;
        let services = self
            .services
            .ok_or_else(|| AutoconfigError::missing_dependency("a service factory is required"))?;
        let binder = self
            .binder
            .ok_or_else(|| AutoconfigError::missing_dependency("a server binder is required"))?;

        let fragments = self
            .fragments
            .into_iter()
            .map(|fragment| fragment.resolve_scope(resolver.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        debug!("Resolved scopes of {} configuration fragments", fragments.len());

        Ok(EndpointInitializer {
            scanner,
            classifier: EndpointClassifier::new(Arc::clone(&resolver)),
            engine: MergeEngine::new(resolver),
            fragments,
            services,
            binder,
            settings: self.settings,
            servers: ServerTable::new(),
        })
    }
}
