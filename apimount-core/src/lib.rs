//! Symbol registry, path resolution and endpoint classification.
//!
//! Endpoint types declare where they live symbolically (a version name and
//! context names). The registry maps those names to path fragments, the
//! resolver turns a declaration into a concrete base path with an enabled
//! flag, and the classifier groups endpoint types by that result so each
//! distinct path can be hosted by its own server.

#[macro_use]
mod macros;

pub mod classify;
pub mod declaration;
pub mod error;
pub mod ids;
pub mod loader;
pub mod registry;
pub mod resolver;
pub mod scan;

pub use classify::{ClassificationTable, EndpointClassifier};
pub use declaration::EndpointDeclaration;
pub use error::{AutoconfigError, ErrorKind, Result};
pub use ids::EndpointId;
pub use loader::{
    load_registry, ManifestLoader, RegistryLoader, StaticLoader, SymbolManifest, SymbolSource,
};
pub use registry::{
    SymbolEntry, SymbolKind, SymbolRegistry, SymbolSet, EMPTY_API_CONTEXT, EMPTY_API_VERSION,
};
pub use resolver::{resolve_entries, DefaultPathResolver, PathResolver, ResolvedPath};
pub use scan::{EndpointScanner, ScanScope, ScannedEndpoint, StaticScanner};
