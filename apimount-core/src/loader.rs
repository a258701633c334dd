// Startup population of the symbol registry

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::Result;
use crate::registry::{SymbolEntry, SymbolKind, SymbolRegistry, SymbolSet};

/// A Rust type whose values are symbolic path segments of one kind.
///
/// Normally implemented through [`symbol_set!`](crate::symbol_set).
pub trait SymbolSource: Sized + 'static {
    const KIND: SymbolKind;
    const SET_NAME: &'static str;

    fn all() -> &'static [Self];

    fn symbol_name(&self) -> &'static str;

    fn fragment(&self) -> Option<&'static str>;

    fn is_enabled(&self) -> bool {
        true
    }

    /// Snapshot every value into a [`SymbolSet`].
    fn symbol_set() -> SymbolSet {
        Self::all().iter().fold(
            SymbolSet::new(Self::SET_NAME, Self::KIND),
            |set, value| {
                set.with_entry(SymbolEntry::new(
                    value.symbol_name(),
                    value.fragment().map(str::to_string),
                    value.is_enabled(),
                ))
            },
        )
    }
}

/// Discovers symbol sets and registers them.
pub trait RegistryLoader {
    fn load(&self, registry: &mut SymbolRegistry) -> Result<()>;
}

/// Loader over sets assembled in code.
#[derive(Debug, Clone, Default)]
pub struct StaticLoader {
    sets: Vec<SymbolSet>,
}

impl StaticLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_set(mut self, set: SymbolSet) -> Self {
        self.sets.push(set);
        self
    }

    pub fn with_source<T: SymbolSource>(self) -> Self {
        self.with_set(T::symbol_set())
    }
}

impl RegistryLoader for StaticLoader {
    fn load(&self, registry: &mut SymbolRegistry) -> Result<()> {
        for set in &self.sets {
            registry.register_set(set.clone());
        }
        Ok(())
    }
}

/// JSON document listing symbol sets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolManifest {
    #[serde(default)]
    pub sets: Vec<SymbolSet>,
}

/// Loader reading a [`SymbolManifest`].
#[derive(Debug, Clone, Default)]
pub struct ManifestLoader {
    manifest: SymbolManifest,
}

impl ManifestLoader {
    pub fn new(manifest: SymbolManifest) -> Self {
        ManifestLoader { manifest }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(Self::new(serde_json::from_str(json)?))
    }
}

impl RegistryLoader for ManifestLoader {
    fn load(&self, registry: &mut SymbolRegistry) -> Result<()> {
        for set in &self.manifest.sets {
            registry.register_set(set.clone());
        }
        Ok(())
    }
}

/// Build a registry by running each loader in order.
pub fn load_registry(loaders: &[&dyn RegistryLoader]) -> Result<SymbolRegistry> {
    let mut registry = SymbolRegistry::new();
    for loader in loaders {
        loader.load(&mut registry)?;
    }
    info!(
        "Symbol registry loaded: {} version sets, {} context sets, {} entries",
        registry.sets(SymbolKind::Version).len(),
        registry.sets(SymbolKind::Context).len(),
        registry.len()
    );
    Ok(registry)
}
