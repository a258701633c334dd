// End-to-end classification: registry -> resolver -> classifier

use apimount_core::{
    load_registry, symbol_set, AutoconfigError, ClassificationTable, DefaultPathResolver,
    EndpointClassifier, EndpointDeclaration, EndpointId, ErrorKind, ResolvedPath, ScanScope,
    ScannedEndpoint, StaticLoader, StaticScanner, SymbolKind, SymbolRegistry,
};
use proptest::prelude::*;
use std::sync::Arc;

symbol_set! {
    pub enum ApiVersions: Version {
        EXTERNAL_V1 => "v1",
        EXTERNAL_V2 => "v2",
        RETIRED => "v0" [enabled = false],
    }
}

symbol_set! {
    pub enum Audience: Context {
        ADMIN => "admin",
        OPEN => "open",
        TEST => "testing" [enabled = false],
        PUBLIC => "open",
    }
}

fn registry() -> Arc<SymbolRegistry> {
    let loader = StaticLoader::new()
        .with_source::<ApiVersions>()
        .with_source::<Audience>();
    Arc::new(load_registry(&[&loader]).unwrap())
}

fn classifier() -> EndpointClassifier {
    EndpointClassifier::new(Arc::new(DefaultPathResolver::new(registry())))
}

#[test]
fn sentinels_always_resolve() {
    let registry = registry();
    for kind in [SymbolKind::Version, SymbolKind::Context] {
        let entry = registry.resolve(kind, kind.sentinel()).unwrap();
        assert_eq!(entry.fragment(), None);
        assert!(entry.is_enabled());
    }
}

#[test]
fn versioned_admin_endpoint() {
    let table = classifier()
        .classify(&[ScannedEndpoint::new("api.Users", "api")
            .declare(EndpointDeclaration::new("EXTERNAL_V1", ["ADMIN"]))])
        .unwrap();
    assert!(table.contains(&ResolvedPath::new("/v1/admin", true)));
}

#[test]
fn one_disabled_component_disables_the_path() {
    let table = classifier()
        .classify(&[ScannedEndpoint::new("api.Canary", "api")
            .declare(EndpointDeclaration::new("EXTERNAL_V1", ["OPEN", "TEST"]))])
        .unwrap();
    let (path, ids) = table.iter().next().unwrap();
    assert_eq!(path.path(), "/v1/open/testing");
    assert!(!path.is_enabled());
    assert_eq!(ids, &[EndpointId::new("api.Canary")]);
    assert_eq!(table.bindable().count(), 0);
}

#[test]
fn distinct_symbols_with_same_fragment_share_a_bucket() {
    let endpoints = vec![
        ScannedEndpoint::new("api.Catalog", "api")
            .declare(EndpointDeclaration::contexts(["OPEN"]))
            .declare(EndpointDeclaration::contexts(["PUBLIC"])),
        ScannedEndpoint::new("api.Search", "api").declare(EndpointDeclaration::contexts(["PUBLIC"])),
    ];
    let table = classifier().classify(&endpoints).unwrap();

    assert_eq!(table.len(), 1);
    let bucket = table.get(&ResolvedPath::new("/open", true)).unwrap();
    assert_eq!(
        bucket,
        &[EndpointId::new("api.Catalog"), EndpointId::new("api.Search")]
    );
}

#[test]
fn unknown_names_are_reported() {
    let err = classifier()
        .classify(&[ScannedEndpoint::new("api.X", "api")
            .declare(EndpointDeclaration::version("EXTERNAL_V7"))])
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnresolvedSymbol);
    assert!(err.to_string().contains("EXTERNAL_V7"));

    let err = classifier()
        .classify(&[ScannedEndpoint::new("api.X", "api")
            .declare(EndpointDeclaration::new("EXTERNAL_V1", ["OPEN", "SECRET"]))])
        .unwrap_err();
    assert!(matches!(
        &err,
        AutoconfigError::UnresolvedSymbol { kind: SymbolKind::Context, name, .. } if name == "SECRET"
    ));
    assert!(err.to_string().contains("OPEN,SECRET"));
}

#[test]
fn scan_scope_filters_before_classification() {
    let scanner = StaticScanner::new()
        .with_endpoint(
            ScannedEndpoint::new("com.acme.api.Users", "com.acme.api")
                .declare(EndpointDeclaration::version("EXTERNAL_V1")),
        )
        .with_endpoint(
            ScannedEndpoint::new("com.acme.api.internal.Debug", "com.acme.api.internal")
                .declare(EndpointDeclaration::version("EXTERNAL_V2")),
        )
        .with_endpoint(
            ScannedEndpoint::new("org.vendor.Plugin", "org.vendor")
                .declare(EndpointDeclaration::version("EXTERNAL_V2")),
        );
    let scope = ScanScope::new()
        .include("com.acme")
        .exclude("com.acme.api.internal");

    let table = classifier().scan_and_classify(&scanner, &scope).unwrap();
    assert_eq!(table.len(), 1);
    assert!(table.contains(&ResolvedPath::new("/v1", true)));
}

const VERSIONS: &[&str] = &["", "EMPTY_API_VERSION", "EXTERNAL_V1", "EXTERNAL_V2", "RETIRED"];
const CONTEXTS: &[&str] = &["EMPTY_API_CONTEXT", "ADMIN", "OPEN", "TEST", "PUBLIC"];

fn declaration_strategy() -> impl Strategy<Value = EndpointDeclaration> {
    (
        prop::sample::select(VERSIONS),
        prop::collection::vec(prop::sample::select(CONTEXTS), 0..4),
    )
        .prop_map(|(version, contexts)| EndpointDeclaration::new(version, contexts))
}

fn endpoints_strategy() -> impl Strategy<Value = Vec<ScannedEndpoint>> {
    prop::collection::vec(
        (0..6usize, prop::collection::vec(declaration_strategy(), 0..4)),
        0..10,
    )
    .prop_map(|entries| {
        entries
            .into_iter()
            .map(|(n, declarations)| ScannedEndpoint {
                id: EndpointId::new(format!("api.Endpoint{n}")),
                package: "api".to_string(),
                declarations,
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn classification_is_deterministic(endpoints in endpoints_strategy()) {
        let classifier = classifier();
        let first = classifier.classify(&endpoints).unwrap();
        let second = classifier.classify(&endpoints).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn buckets_never_hold_duplicates(endpoints in endpoints_strategy()) {
        let table: ClassificationTable = classifier().classify(&endpoints).unwrap();
        for (_, ids) in table.iter() {
            let mut sorted = ids.to_vec();
            sorted.sort();
            sorted.dedup();
            prop_assert_eq!(sorted.len(), ids.len());
        }
    }

    #[test]
    fn paths_always_start_with_slash(endpoints in endpoints_strategy()) {
        let table = classifier().classify(&endpoints).unwrap();
        for path in table.paths() {
            prop_assert!(path.path().starts_with('/'));
        }
    }
}
