// Configuration fragments: immutable bundles of server customization

use apimount_core::{
    AutoconfigError, EndpointDeclaration, PathResolver, ResolvedPath, Result,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use crate::component::{Bus, Feature, Interceptor, Provider};
use crate::factory::Properties;

/// Property that hides a server from generated service catalogs.
pub const PRIVATE_ENDPOINT_KEY: &str = "endpoint.private";

/// The customization carried by one fragment.
///
/// Built through [`FragmentConfigBuilder`]; immutable afterwards.
#[derive(Debug, Clone, Default)]
pub struct FragmentConfig {
    bus: Option<Arc<dyn Bus>>,
    features: Vec<Arc<dyn Feature>>,
    in_interceptors: Vec<Arc<dyn Interceptor>>,
    out_interceptors: Vec<Arc<dyn Interceptor>>,
    in_fault_interceptors: Vec<Arc<dyn Interceptor>>,
    out_fault_interceptors: Vec<Arc<dyn Interceptor>>,
    providers: Vec<Arc<dyn Provider>>,
    properties: Properties,
}

impl FragmentConfig {
    pub fn builder() -> FragmentConfigBuilder {
        FragmentConfigBuilder::default()
    }

    pub fn bus(&self) -> Option<&Arc<dyn Bus>> {
        self.bus.as_ref()
    }

    pub fn features(&self) -> &[Arc<dyn Feature>] {
        &self.features
    }

    pub fn in_interceptors(&self) -> &[Arc<dyn Interceptor>] {
        &self.in_interceptors
    }

    pub fn out_interceptors(&self) -> &[Arc<dyn Interceptor>] {
        &self.out_interceptors
    }

    pub fn in_fault_interceptors(&self) -> &[Arc<dyn Interceptor>] {
        &self.in_fault_interceptors
    }

    pub fn out_fault_interceptors(&self) -> &[Arc<dyn Interceptor>] {
        &self.out_fault_interceptors
    }

    pub fn providers(&self) -> &[Arc<dyn Provider>] {
        &self.providers
    }

    pub fn properties(&self) -> &Properties {
        &self.properties
    }
}

/// Chaining builder for [`FragmentConfig`].
///
/// Invalid input does not panic mid-chain: the first problem is kept and
/// returned from [`build`](FragmentConfigBuilder::build).
#[derive(Debug, Default)]
pub struct FragmentConfigBuilder {
    config: FragmentConfig,
    error: Option<AutoconfigError>,
}

impl FragmentConfigBuilder {
    fn reject(mut self, message: impl Into<String>) -> Self {
        if self.error.is_none() {
            self.error = Some(AutoconfigError::invalid_fragment(message));
        }
        self
    }

    /// Bus used by the server. Most systems have only one and never set this.
    pub fn bus(mut self, bus: Arc<dyn Bus>) -> Self {
        self.config.bus = Some(bus);
        self
    }

    pub fn features<I>(mut self, features: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn Feature>>,
    {
        self.config.features.extend(features);
        self
    }

    pub fn feature(mut self, feature: Arc<dyn Feature>) -> Self {
        self.config.features.push(feature);
        self
    }

    pub fn in_interceptors<I>(mut self, interceptors: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn Interceptor>>,
    {
        self.config.in_interceptors.extend(interceptors);
        self
    }

    pub fn in_interceptor(mut self, interceptor: Arc<dyn Interceptor>) -> Self {
        self.config.in_interceptors.push(interceptor);
        self
    }

    pub fn out_interceptors<I>(mut self, interceptors: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn Interceptor>>,
    {
        self.config.out_interceptors.extend(interceptors);
        self
    }

    pub fn out_interceptor(mut self, interceptor: Arc<dyn Interceptor>) -> Self {
        self.config.out_interceptors.push(interceptor);
        self
    }

    pub fn in_fault_interceptors<I>(mut self, interceptors: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn Interceptor>>,
    {
        self.config.in_fault_interceptors.extend(interceptors);
        self
    }

    pub fn in_fault_interceptor(mut self, interceptor: Arc<dyn Interceptor>) -> Self {
        self.config.in_fault_interceptors.push(interceptor);
        self
    }

    pub fn out_fault_interceptors<I>(mut self, interceptors: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn Interceptor>>,
    {
        self.config.out_fault_interceptors.extend(interceptors);
        self
    }

    pub fn out_fault_interceptor(mut self, interceptor: Arc<dyn Interceptor>) -> Self {
        self.config.out_fault_interceptors.push(interceptor);
        self
    }

    pub fn providers<I>(mut self, providers: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn Provider>>,
    {
        self.config.providers.extend(providers);
        self
    }

    pub fn provider(mut self, provider: Arc<dyn Provider>) -> Self {
        self.config.providers.push(provider);
        self
    }

    /// Add one property. Both key and value are required: an empty key or a
    /// JSON `null` value is rejected.
    pub fn property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let key = key.into();
        let value = value.into();
        if key.is_empty() {
            return self.reject("property key is required");
        }
        if value.is_null() {
            return self.reject(format!("property '{}' requires a value", key));
        }
        self.config.properties.insert(key, value);
        self
    }

    pub fn properties<I, K, V>(self, properties: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        properties
            .into_iter()
            .fold(self, |builder, (key, value)| builder.property(key, value))
    }

    /// Servers are listed in service catalogs by default; `false` marks them private.
    pub fn show_in_catalog(mut self, show: bool) -> Self {
        if show {
            self.config.properties.shift_remove(PRIVATE_ENDPOINT_KEY);
        } else {
            self.config
                .properties
                .insert(PRIVATE_ENDPOINT_KEY.to_string(), Value::Bool(true));
        }
        self
    }

    pub fn build(self) -> Result<FragmentConfig> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.config),
        }
    }
}

/// Which servers a fragment customizes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FragmentScope {
    /// Every server.
    All,
    /// Servers at the path this declaration resolves to.
    Declaration(EndpointDeclaration),
    /// Servers at exactly this path and enabled flag.
    Path(ResolvedPath),
}

impl Default for FragmentScope {
    fn default() -> Self {
        FragmentScope::Declaration(EndpointDeclaration::default())
    }
}

/// A named configuration bundle plus the rule deciding where it applies.
#[derive(Debug, Clone)]
pub struct ConfigFragment {
    name: String,
    config: FragmentConfig,
    scope: FragmentScope,
}

impl ConfigFragment {
    pub fn builder() -> ConfigFragmentBuilder {
        ConfigFragmentBuilder::default()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &FragmentConfig {
        &self.config
    }

    pub fn scope(&self) -> &FragmentScope {
        &self.scope
    }

    pub fn applies_to_all(&self) -> bool {
        matches!(self.scope, FragmentScope::All)
    }

    /// The (path, enabled) key this fragment targets; `None` for [`FragmentScope::All`].
    pub fn target(&self, resolver: &dyn PathResolver) -> Result<Option<ResolvedPath>> {
        match &self.scope {
            FragmentScope::All => Ok(None),
            FragmentScope::Declaration(declaration) => {
                resolver.resolve_declaration(declaration).map(Some)
            }
            FragmentScope::Path(path) => Ok(Some(path.clone())),
        }
    }

    /// Replace a symbolic scope with the path it resolves to.
    ///
    /// Afterwards the fragment never consults a resolver again, so an unknown
    /// symbol surfaces here instead of during a merge.
    pub fn resolve_scope(self, resolver: &dyn PathResolver) -> Result<Self> {
        let scope = match self.target(resolver)? {
            Some(path) => FragmentScope::Path(path),
            None => FragmentScope::All,
        };
        Ok(ConfigFragment { scope, ..self })
    }

    pub fn applies_to(&self, resolver: &dyn PathResolver, key: &ResolvedPath) -> Result<bool> {
        Ok(match self.target(resolver)? {
            None => true,
            Some(target) => &target == key,
        })
    }
}

/// Builder for [`ConfigFragment`]. A configuration is mandatory.
///
/// Without an explicit scope the fragment targets the root path `/`.
#[derive(Debug, Default)]
pub struct ConfigFragmentBuilder {
    name: Option<String>,
    config: Option<FragmentConfig>,
    scope: FragmentScope,
}

impl ConfigFragmentBuilder {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn config(mut self, config: FragmentConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn scope(mut self, scope: FragmentScope) -> Self {
        self.scope = scope;
        self
    }

    pub fn applies_to_all(self) -> Self {
        self.scope(FragmentScope::All)
    }

    pub fn declaration(self, declaration: EndpointDeclaration) -> Self {
        self.scope(FragmentScope::Declaration(declaration))
    }

    pub fn path(self, path: ResolvedPath) -> Self {
        self.scope(FragmentScope::Path(path))
    }

    pub fn build(self) -> Result<ConfigFragment> {
        let config = self.config.ok_or_else(|| {
            AutoconfigError::missing_dependency("a configuration is required for a configuration fragment")
        })?;
        Ok(ConfigFragment {
            name: self.name.unwrap_or_else(|| "unnamed".to_string()),
            config,
            scope: self.scope,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apimount_core::{DefaultPathResolver, ErrorKind, SymbolEntry, SymbolRegistry, SymbolSet};
    use serde_json::json;

    #[derive(Debug)]
    struct Gzip;

    impl Feature for Gzip {
        fn name(&self) -> &str {
            "gzip"
        }
    }

    #[test]
    fn test_builder_collects_everything() {
        let config = FragmentConfig::builder()
            .feature(Arc::new(Gzip))
            .property("timeout", 30)
            .properties([("a", "x"), ("b", "y")])
            .build()
            .unwrap();
        assert_eq!(config.features().len(), 1);
        assert_eq!(config.properties().get("timeout"), Some(&json!(30)));
        assert_eq!(config.properties().len(), 3);
    }

    #[test]
    fn test_null_property_value_rejected() {
        let err = FragmentConfig::builder()
            .property("timeout", Value::Null)
            .property("fine", 1)
            .build()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidFragment);
        assert!(err.to_string().contains("timeout"));
    }

    #[test]
    fn test_empty_property_key_rejected() {
        let err = FragmentConfig::builder().property("", 1).build().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidFragment);
    }

    #[test]
    fn test_first_error_is_kept() {
        let err = FragmentConfig::builder()
            .property("retries", Value::Null)
            .property("", 1)
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("retries"));
    }

    #[test]
    fn test_show_in_catalog_toggles_private_property() {
        let hidden = FragmentConfig::builder().show_in_catalog(false).build().unwrap();
        assert_eq!(hidden.properties().get(PRIVATE_ENDPOINT_KEY), Some(&json!(true)));

        let shown = FragmentConfig::builder()
            .show_in_catalog(false)
            .show_in_catalog(true)
            .build()
            .unwrap();
        assert!(shown.properties().get(PRIVATE_ENDPOINT_KEY).is_none());
    }

    #[test]
    fn test_fragment_requires_config() {
        let err = ConfigFragment::builder().name("x").applies_to_all().build().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredDependency);
    }

    #[test]
    fn test_default_scope_is_root() {
        let fragment = ConfigFragment::builder()
            .config(FragmentConfig::default())
            .build()
            .unwrap();
        assert!(!fragment.applies_to_all());
        assert_eq!(fragment.name(), "unnamed");
        assert_eq!(fragment.scope(), &FragmentScope::Declaration(EndpointDeclaration::default()));
    }

    #[test]
    fn test_scope_deserialization() {
        let all: FragmentScope = serde_json::from_str(r#""all""#).unwrap();
        assert_eq!(all, FragmentScope::All);
        let scoped: FragmentScope =
            serde_json::from_str(r#"{"declaration":{"version":"V1","contexts":["OPEN"]}}"#).unwrap();
        assert_eq!(
            scoped,
            FragmentScope::Declaration(EndpointDeclaration::new("V1", ["OPEN"]))
        );
    }

    fn resolver() -> DefaultPathResolver {
        let mut registry = SymbolRegistry::new();
        registry.register_set(
            SymbolSet::versions("V").with_entry(SymbolEntry::enabled("EXTERNAL_V1", "v1")),
        );
        registry.register_set(
            SymbolSet::contexts("C").with_entry(SymbolEntry::enabled("ADMIN", "admin")),
        );
        DefaultPathResolver::new(Arc::new(registry))
    }

    #[test]
    fn test_path_scope_without_leading_slash_still_matches() {
        let scope: FragmentScope =
            serde_json::from_str(r#"{"path":{"path":"v1/admin","enabled":true}}"#).unwrap();
        let fragment = ConfigFragment::builder()
            .config(FragmentConfig::default())
            .scope(scope)
            .build()
            .unwrap();
        let key = ResolvedPath::new("/v1/admin", true);
        assert!(fragment.applies_to(&resolver(), &key).unwrap());
    }

    #[test]
    fn test_resolve_scope_pins_declaration_to_path() {
        let fragment = ConfigFragment::builder()
            .config(FragmentConfig::default())
            .declaration(EndpointDeclaration::new("EXTERNAL_V1", ["ADMIN"]))
            .build()
            .unwrap()
            .resolve_scope(&resolver())
            .unwrap();
        assert_eq!(
            fragment.scope(),
            &FragmentScope::Path(ResolvedPath::new("/v1/admin", true))
        );

        let global = ConfigFragment::builder()
            .config(FragmentConfig::default())
            .applies_to_all()
            .build()
            .unwrap()
            .resolve_scope(&resolver())
            .unwrap();
        assert!(global.applies_to_all());
    }

    #[test]
    fn test_resolve_scope_rejects_unknown_symbol() {
        let err = ConfigFragment::builder()
            .config(FragmentConfig::default())
            .declaration(EndpointDeclaration::contexts(["MISSING"]))
            .build()
            .unwrap()
            .resolve_scope(&resolver())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnresolvedSymbol);
        assert!(err.to_string().contains("MISSING"));
    }
}
