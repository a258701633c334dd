// Path resolution: symbolic version/context names -> concrete base path

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::declaration::EndpointDeclaration;
use crate::error::{AutoconfigError, Result};
use crate::registry::{SymbolEntry, SymbolKind, SymbolRegistry};

/// A resolved base path and whether it should be hosted.
///
/// Equality covers both fields: the same path with a different enabled flag
/// is a different key. The path always starts with `/`, however it was built.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "PathRecord")]
pub struct ResolvedPath {
    path: String,
    enabled: bool,
}

#[derive(Deserialize)]
struct PathRecord {
    path: String,
    enabled: bool,
}

impl From<PathRecord> for ResolvedPath {
    fn from(record: PathRecord) -> Self {
        ResolvedPath::new(record.path, record.enabled)
    }
}

impl ResolvedPath {
    /// `path` gains a leading `/` when it lacks one, so `""` becomes `/`.
    pub fn new(path: impl Into<String>, enabled: bool) -> Self {
        let mut path = path.into();
        if !path.starts_with('/') {
            path.insert(0, '/');
        }
        ResolvedPath { path, enabled }
    }

    pub fn root() -> Self {
        Self::new("/", true)
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Stable name for a server bound at this path, e.g. `server-v1-admin`.
    pub fn server_name(&self) -> String {
        format!("server{}", self.path.replace('/', "-"))
    }
}

impl fmt::Display for ResolvedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = if self.enabled { "enabled" } else { "disabled" };
        write!(f, "{} ({})", self.path, state)
    }
}

/// Concatenate already-resolved entries into a [`ResolvedPath`].
///
/// Fragments are appended in the order given; empty fragments add nothing.
/// The result is enabled only if every contributing entry is.
pub fn resolve_entries(version: Option<&SymbolEntry>, contexts: &[&SymbolEntry]) -> ResolvedPath {
    let mut enabled = true;
    let mut path = String::new();

    for entry in version.into_iter().chain(contexts.iter().copied()) {
        enabled = enabled && entry.is_enabled();
        if let Some(fragment) = entry.fragment() {
            path.push('/');
            path.push_str(fragment);
        }
    }

    ResolvedPath::new(path, enabled)
}

/// Turns endpoint declarations into resolved paths.
pub trait PathResolver: Send + Sync + fmt::Debug {
    /// Resolve a version name and ordered context names.
    fn resolve_path(&self, version: &str, contexts: &[String]) -> Result<ResolvedPath>;

    fn resolve_declaration(&self, declaration: &EndpointDeclaration) -> Result<ResolvedPath> {
        self.resolve_path(declaration.version_name(), declaration.context_names())
    }
}

/// [`PathResolver`] over a [`SymbolRegistry`], producing `/version/context1/context2`.
#[derive(Debug, Clone)]
pub struct DefaultPathResolver {
    registry: Arc<SymbolRegistry>,
}

impl DefaultPathResolver {
    pub fn new(registry: Arc<SymbolRegistry>) -> Self {
        DefaultPathResolver { registry }
    }
}

impl PathResolver for DefaultPathResolver {
    fn resolve_path(&self, version: &str, contexts: &[String]) -> Result<ResolvedPath> {
        let version_entry = if SymbolKind::Version.is_sentinel(version) {
            None
        } else {
            Some(
                self.registry
                    .lookup(SymbolKind::Version, version)
                    .ok_or_else(|| AutoconfigError::unresolved_version(version))?,
            )
        };

        let context_entries = contexts
            .iter()
            .map(|name| {
                self.registry
                    .lookup(SymbolKind::Context, name)
                    .ok_or_else(|| AutoconfigError::unresolved_context(name.as_str(), contexts))
            })
            .collect::<Result<Vec<_>>>()?;

        let resolved = resolve_entries(version_entry, &context_entries);
        debug!(
            "Resolved version '{}' contexts [{}] to {}",
            version,
            contexts.join(","),
            resolved
        );
        Ok(resolved)
    }
}
