//! apimount-plan
//!
//! Reads a JSON manifest of symbol sets, scanned endpoints, settings and
//! property-only configuration fragments, then runs the full initialization
//! pipeline against a dry-run binder that prints each server it would create.
//!
//! Usage: `apimount-plan <manifest.json>`. Set `APIMOUNT_LOG_DIR` to also log
//! to files and `RUST_LOG` to change the filter.

use anyhow::{Context, Result};
use apimount_core::{
    load_registry, DefaultPathResolver, EndpointId, ManifestLoader, PathResolver, ScannedEndpoint,
    StaticScanner, SymbolManifest,
};
use apimount_server::{
    init_logging, AutoConfigSettings, ConfigFragment, Endpoint, EndpointInitializer,
    FragmentConfig, FragmentScope, ServerBinder, ServerError, ServerFactory, ServiceFactory,
};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Deserialize)]
struct PlanManifest {
    #[serde(default)]
    settings: AutoConfigSettings,
    #[serde(default)]
    symbols: SymbolManifest,
    #[serde(default)]
    endpoints: Vec<ScannedEndpoint>,
    #[serde(default)]
    fragments: Vec<FragmentEntry>,
}

#[derive(Debug, Deserialize)]
struct FragmentEntry {
    name: String,
    #[serde(default)]
    scope: FragmentScope,
    #[serde(default)]
    properties: Map<String, Value>,
    #[serde(default)]
    show_in_catalog: Option<bool>,
}

impl FragmentEntry {
    fn into_fragment(self) -> apimount_core::Result<ConfigFragment> {
        let mut config = FragmentConfig::builder().properties(self.properties);
        if let Some(show) = self.show_in_catalog {
            config = config.show_in_catalog(show);
        }
        ConfigFragment::builder()
            .name(self.name)
            .config(config.build()?)
            .scope(self.scope)
            .build()
    }
}

/// Stand-in for a real endpoint: only knows its identifier.
#[derive(Debug)]
struct PlannedEndpoint(EndpointId);

impl Endpoint for PlannedEndpoint {
    fn endpoint_id(&self) -> &EndpointId {
        &self.0
    }
}

#[derive(Debug)]
struct PlanServices;

impl ServiceFactory for PlanServices {
    fn instantiate(&self, id: &EndpointId) -> Result<Arc<dyn Endpoint>, ServerError> {
        Ok(Arc::new(PlannedEndpoint(id.clone())))
    }
}

/// Prints what would be bound instead of binding it.
#[derive(Debug)]
struct DryRunBinder;

#[async_trait]
impl ServerBinder for DryRunBinder {
    async fn bind(&self, name: &str, server: &ServerFactory) -> Result<(), ServerError> {
        let endpoints: Vec<&str> = server
            .service_beans
            .iter()
            .map(|bean| bean.endpoint_id().as_str())
            .collect();
        let properties = serde_json::to_string(&server.properties)
            .map_err(|err| ServerError::bind(name, err.to_string()))?;
        println!(
            "{} {} endpoints=[{}] properties={}",
            name,
            server.path(),
            endpoints.join(", "),
            properties
        );
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let log_dir = std::env::var_os("APIMOUNT_LOG_DIR").map(PathBuf::from);
    let _guard = init_logging(log_dir.as_deref(), "apimount-plan")?;

    let manifest_path = std::env::args()
        .nth(1)
        .context("usage: apimount-plan <manifest.json>")?;
    let raw = std::fs::read_to_string(&manifest_path)
        .with_context(|| format!("reading manifest {}", manifest_path))?;
    let manifest: PlanManifest =
        serde_json::from_str(&raw).with_context(|| format!("parsing manifest {}", manifest_path))?;

    let registry = load_registry(&[&ManifestLoader::new(manifest.symbols)])?;
    let resolver: Arc<dyn PathResolver> = Arc::new(DefaultPathResolver::new(Arc::new(registry)));

    let scanner = manifest
        .endpoints
        .into_iter()
        .fold(StaticScanner::new(), StaticScanner::with_endpoint);

    let fragments = manifest
        .fragments
        .into_iter()
        .map(FragmentEntry::into_fragment)
        .collect::<apimount_core::Result<Vec<_>>>()?;

    let initializer = EndpointInitializer::builder()
        .resolver(resolver)
        .scanner(Arc::new(scanner))
        .services(Arc::new(PlanServices))
        .binder(Arc::new(DryRunBinder))
        .fragments(fragments)
        .settings(manifest.settings)
        .build()?;

    let report = initializer.initialize().await?;
    info!("Planned {} servers", report.bound.len());
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
