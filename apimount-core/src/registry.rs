// Version / context symbol registry
// Holds every known symbolic path segment, grouped into named sets per kind.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

use crate::error::{AutoconfigError, Result};

/// Sentinel version name meaning "no version supplied".
pub const EMPTY_API_VERSION: &str = "EMPTY_API_VERSION";

/// Sentinel context name meaning "no context supplied".
pub const EMPTY_API_CONTEXT: &str = "EMPTY_API_CONTEXT";

const REGISTERED_SET: &str = "registered";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolKind {
    Version,
    Context,
}

impl SymbolKind {
    pub fn sentinel(&self) -> &'static str {
        match self {
            SymbolKind::Version => EMPTY_API_VERSION,
            SymbolKind::Context => EMPTY_API_CONTEXT,
        }
    }

    /// Whether `name` stands for "nothing declared" for this kind.
    ///
    /// An empty version name is accepted as well; an empty context name is not.
    pub fn is_sentinel(&self, name: &str) -> bool {
        match self {
            SymbolKind::Version => name.is_empty() || name == EMPTY_API_VERSION,
            SymbolKind::Context => name == EMPTY_API_CONTEXT,
        }
    }
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SymbolKind::Version => "version",
            SymbolKind::Context => "context",
        };
        write!(f, "{}", s)
    }
}

fn default_enabled() -> bool {
    true
}

/// One symbolic value: a name, the path fragment it contributes and whether
/// endpoints carrying it should be hosted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SymbolEntry {
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    fragment: Option<String>,
    #[serde(default = "default_enabled")]
    enabled: bool,
}

impl SymbolEntry {
    pub fn new(name: impl Into<String>, fragment: Option<String>, enabled: bool) -> Self {
        SymbolEntry {
            name: name.into(),
            fragment,
            enabled,
        }
    }

    /// Enabled entry contributing `fragment`.
    pub fn enabled(name: impl Into<String>, fragment: impl Into<String>) -> Self {
        Self::new(name, Some(fragment.into()), true)
    }

    /// Disabled entry contributing `fragment`.
    pub fn disabled(name: impl Into<String>, fragment: impl Into<String>) -> Self {
        Self::new(name, Some(fragment.into()), false)
    }

    /// Entry with no fragment that is always enabled.
    pub fn empty(name: impl Into<String>) -> Self {
        Self::new(name, None, true)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Path fragment, `None` when absent or empty.
    pub fn fragment(&self) -> Option<&str> {
        self.fragment.as_deref().filter(|f| !f.is_empty())
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

/// A named group of entries of one kind, the equivalent of one enumeration
/// of symbolic values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolSet {
    name: String,
    kind: SymbolKind,
    #[serde(default)]
    entries: Vec<SymbolEntry>,
}

impl SymbolSet {
    pub fn new(name: impl Into<String>, kind: SymbolKind) -> Self {
        SymbolSet {
            name: name.into(),
            kind,
            entries: Vec::new(),
        }
    }

    pub fn versions(name: impl Into<String>) -> Self {
        Self::new(name, SymbolKind::Version)
    }

    pub fn contexts(name: impl Into<String>) -> Self {
        Self::new(name, SymbolKind::Context)
    }

    pub fn with_entry(mut self, entry: SymbolEntry) -> Self {
        self.entries.push(entry);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> SymbolKind {
        self.kind
    }

    pub fn entries(&self) -> &[SymbolEntry] {
        &self.entries
    }

    /// Exact, case-sensitive lookup.
    pub fn get(&self, name: &str) -> Option<&SymbolEntry> {
        self.entries.iter().find(|entry| entry.name == name)
    }
}

/// Registry of every known version and context set.
///
/// Populated once at startup and read-only afterwards. When a name exists in
/// more than one set of the same kind, the set registered first wins; the
/// collision is reported through [`SymbolRegistry::collisions`] and a warning
/// at registration time.
#[derive(Debug, Clone)]
pub struct SymbolRegistry {
    versions: Vec<SymbolSet>,
    contexts: Vec<SymbolSet>,
    empty_version: SymbolEntry,
    empty_context: SymbolEntry,
}

impl SymbolRegistry {
    pub fn new() -> Self {
        SymbolRegistry {
            versions: Vec::new(),
            contexts: Vec::new(),
            empty_version: SymbolEntry::empty(EMPTY_API_VERSION),
            empty_context: SymbolEntry::empty(EMPTY_API_CONTEXT),
        }
    }

    fn sets_mut(&mut self, kind: SymbolKind) -> &mut Vec<SymbolSet> {
        match kind {
            SymbolKind::Version => &mut self.versions,
            SymbolKind::Context => &mut self.contexts,
        }
    }

    pub fn sets(&self, kind: SymbolKind) -> &[SymbolSet] {
        match kind {
            SymbolKind::Version => &self.versions,
            SymbolKind::Context => &self.contexts,
        }
    }

    /// Register a single entry, after everything registered before it.
    ///
    /// Each call adds its own one-entry set so lookups keep registration order.
    pub fn register(
        &mut self,
        kind: SymbolKind,
        name: impl Into<String>,
        fragment: Option<String>,
        enabled: bool,
    ) {
        let entry = SymbolEntry::new(name, fragment, enabled);
        self.warn_on_collision(kind, entry.name(), REGISTERED_SET);
        self.sets_mut(kind)
            .push(SymbolSet::new(REGISTERED_SET, kind).with_entry(entry));
    }

    /// Register a whole set, after every set registered before it.
    pub fn register_set(&mut self, set: SymbolSet) {
        for entry in &set.entries {
            self.warn_on_collision(set.kind, entry.name(), &set.name);
        }
        debug!(
            "Registered {} set '{}' with {} entries",
            set.kind,
            set.name,
            set.entries.len()
        );
        self.sets_mut(set.kind).push(set);
    }

    fn warn_on_collision(&self, kind: SymbolKind, name: &str, incoming_set: &str) {
        if let Some(existing) = self.sets(kind).iter().find(|set| set.get(name).is_some()) {
            warn!(
                "{} name '{}' from set '{}' is already registered by set '{}'; the earlier entry wins",
                kind, name, incoming_set, existing.name
            );
        }
    }

    /// Look up a name without failing. Sentinels always resolve.
    pub fn lookup(&self, kind: SymbolKind, name: &str) -> Option<&SymbolEntry> {
        if kind.is_sentinel(name) {
            return Some(match kind {
                SymbolKind::Version => &self.empty_version,
                SymbolKind::Context => &self.empty_context,
            });
        }
        self.sets(kind).iter().find_map(|set| set.get(name))
    }

    pub fn resolve(&self, kind: SymbolKind, name: &str) -> Result<&SymbolEntry> {
        self.lookup(kind, name).ok_or_else(|| match kind {
            SymbolKind::Version => AutoconfigError::unresolved_version(name),
            SymbolKind::Context => AutoconfigError::unresolved_context(name, &[name.to_string()]),
        })
    }

    /// Every (kind, name) defined more than once, in first-registration order.
    pub fn collisions(&self) -> Vec<(SymbolKind, String)> {
        let mut found = Vec::new();
        for kind in [SymbolKind::Version, SymbolKind::Context] {
            let mut counts: IndexMap<&str, usize> = IndexMap::new();
            for set in self.sets(kind) {
                for entry in &set.entries {
                    *counts.entry(entry.name()).or_insert(0) += 1;
                }
            }
            found.extend(
                counts
                    .into_iter()
                    .filter(|(_, count)| *count > 1)
                    .map(|(name, _)| (kind, name.to_string())),
            );
        }
        found
    }

    /// Number of registered entries across all sets.
    pub fn len(&self) -> usize {
        self.versions
            .iter()
            .chain(self.contexts.iter())
            .map(|set| set.entries.len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for SymbolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinels_resolve_without_registration() {
        let registry = SymbolRegistry::new();
        assert!(registry.is_empty());

        for kind in [SymbolKind::Version, SymbolKind::Context] {
            let entry = registry.resolve(kind, kind.sentinel()).unwrap();
            assert_eq!(entry.fragment(), None);
            assert!(entry.is_enabled());
        }
    }

    #[test]
    fn test_empty_version_name_is_sentinel() {
        let registry = SymbolRegistry::new();
        assert!(registry.resolve(SymbolKind::Version, "").is_ok());
        assert!(registry.resolve(SymbolKind::Context, "").is_err());
    }

    #[test]
    fn test_register_and_resolve() {
        let mut registry = SymbolRegistry::new();
        registry.register(SymbolKind::Version, "EXTERNAL_V1", Some("v1".into()), true);
        registry.register(SymbolKind::Context, "ADMIN", Some("admin".into()), false);

        let version = registry.resolve(SymbolKind::Version, "EXTERNAL_V1").unwrap();
        assert_eq!(version.fragment(), Some("v1"));
        assert!(version.is_enabled());

        let context = registry.resolve(SymbolKind::Context, "ADMIN").unwrap();
        assert!(!context.is_enabled());

        // Kinds are separate namespaces
        assert!(registry.resolve(SymbolKind::Context, "EXTERNAL_V1").is_err());
        assert_eq!(registry.sets(SymbolKind::Version).len(), 1);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_single_entries_keep_registration_order() {
        let mut registry = SymbolRegistry::new();
        registry.register(SymbolKind::Context, "ADMIN", Some("admin".into()), true);
        registry.register_set(
            SymbolSet::contexts("Audience").with_entry(SymbolEntry::enabled("OPEN", "open")),
        );
        registry.register(SymbolKind::Context, "OPEN", Some("hijacked".into()), false);

        let open = registry.resolve(SymbolKind::Context, "OPEN").unwrap();
        assert_eq!(open.fragment(), Some("open"));
        assert!(open.is_enabled());
        assert_eq!(
            registry.resolve(SymbolKind::Context, "ADMIN").unwrap().fragment(),
            Some("admin")
        );
        assert_eq!(
            registry.collisions(),
            vec![(SymbolKind::Context, "OPEN".to_string())]
        );
    }

    #[test]
    fn test_repeated_single_registration_first_wins() {
        let mut registry = SymbolRegistry::new();
        registry.register(SymbolKind::Version, "V1", Some("v1".into()), true);
        registry.register(SymbolKind::Version, "V1", Some("other".into()), false);
        let entry = registry.resolve(SymbolKind::Version, "V1").unwrap();
        assert_eq!(entry.fragment(), Some("v1"));
        assert_eq!(registry.sets(SymbolKind::Version).len(), 2);
    }

    #[test]
    fn test_lookup_is_exact_and_case_sensitive() {
        let mut registry = SymbolRegistry::new();
        registry.register_set(
            SymbolSet::contexts("Audience").with_entry(SymbolEntry::enabled("OPEN", "open")),
        );
        assert!(registry.lookup(SymbolKind::Context, "OPEN").is_some());
        assert!(registry.lookup(SymbolKind::Context, "open").is_none());
        assert!(registry.lookup(SymbolKind::Context, "OPE").is_none());
        assert!(registry.lookup(SymbolKind::Context, "OPEN_X").is_none());
    }

    #[test]
    fn test_first_registered_set_wins_and_collision_is_reported() {
        let mut registry = SymbolRegistry::new();
        registry.register_set(
            SymbolSet::contexts("First").with_entry(SymbolEntry::enabled("SHARED", "first")),
        );
        registry.register_set(
            SymbolSet::contexts("Second").with_entry(SymbolEntry::disabled("SHARED", "second")),
        );

        let entry = registry.resolve(SymbolKind::Context, "SHARED").unwrap();
        assert_eq!(entry.fragment(), Some("first"));
        assert!(entry.is_enabled());
        assert_eq!(
            registry.collisions(),
            vec![(SymbolKind::Context, "SHARED".to_string())]
        );
    }

    #[test]
    fn test_empty_fragment_treated_as_absent() {
        let entry = SymbolEntry::new("ROOT", Some(String::new()), true);
        assert_eq!(entry.fragment(), None);
    }

    #[test]
    fn test_unresolved_error_names_symbol() {
        let registry = SymbolRegistry::new();
        let err = registry.resolve(SymbolKind::Version, "MISSING").unwrap_err();
        assert!(err.to_string().contains("MISSING"));
    }

    #[test]
    fn test_symbol_set_deserialization_defaults() {
        let json = r#"{"name":"Versions","kind":"version","entries":[{"name":"V1","fragment":"v1"},{"name":"V0","enabled":false}]}"#;
        let set: SymbolSet = serde_json::from_str(json).unwrap();
        assert_eq!(set.kind(), SymbolKind::Version);
        assert!(set.get("V1").unwrap().is_enabled());
        assert_eq!(set.get("V0").unwrap().fragment(), None);
        assert!(!set.get("V0").unwrap().is_enabled());
    }
}
