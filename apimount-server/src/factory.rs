use apimount_core::ResolvedPath;
use indexmap::IndexMap;
use serde_json::Value;
use std::sync::Arc;

use crate::component::{Bus, Endpoint, Feature, Interceptor, Provider};

/// Server properties. Later writes replace earlier ones.
pub type Properties = IndexMap<String, Value>;

/// Everything needed to create one server at one base path.
///
/// Starts empty apart from its path and endpoints, then accumulates
/// customization from configuration fragments before it is handed to the
/// binder.
#[derive(Debug, Clone)]
pub struct ServerFactory {
    path: ResolvedPath,
    pub service_beans: Vec<Arc<dyn Endpoint>>,
    pub bus: Option<Arc<dyn Bus>>,
    pub features: Vec<Arc<dyn Feature>>,
    pub in_interceptors: Vec<Arc<dyn Interceptor>>,
    pub out_interceptors: Vec<Arc<dyn Interceptor>>,
    pub in_fault_interceptors: Vec<Arc<dyn Interceptor>>,
    pub out_fault_interceptors: Vec<Arc<dyn Interceptor>>,
    pub providers: Vec<Arc<dyn Provider>>,
    pub properties: Properties,
}

impl ServerFactory {
    pub fn new(path: ResolvedPath) -> Self {
        ServerFactory {
            path,
            service_beans: Vec::new(),
            bus: None,
            features: Vec::new(),
            in_interceptors: Vec::new(),
            out_interceptors: Vec::new(),
            in_fault_interceptors: Vec::new(),
            out_fault_interceptors: Vec::new(),
            providers: Vec::new(),
            properties: Properties::new(),
        }
    }

    pub fn with_service_beans(mut self, beans: Vec<Arc<dyn Endpoint>>) -> Self {
        self.service_beans = beans;
        self
    }

    /// Key used to decide which scoped fragments apply.
    pub fn path(&self) -> &ResolvedPath {
        &self.path
    }

    pub fn address(&self) -> &str {
        self.path.path()
    }

    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    pub fn interceptor_count(&self) -> usize {
        self.in_interceptors.len()
            + self.out_interceptors.len()
            + self.in_fault_interceptors.len()
            + self.out_fault_interceptors.len()
    }
}
