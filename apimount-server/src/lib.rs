//! Per-path server assembly for classified endpoints.
//!
//! Configuration fragments carry interceptors, features, providers and
//! properties plus a rule for which servers they apply to. The merge engine
//! applies them in a fixed order onto each server factory, and the
//! initializer drives classification, instantiation, merging and binding.

pub mod component;
pub mod error;
pub mod factory;
pub mod fragment;
pub mod initializer;
pub mod logging;
pub mod merge;
pub mod server_table;
pub mod settings;

pub use component::{Bus, Endpoint, Feature, Interceptor, Provider};
pub use error::ServerError;
pub use factory::{Properties, ServerFactory};
pub use fragment::{
    ConfigFragment, ConfigFragmentBuilder, FragmentConfig, FragmentConfigBuilder, FragmentScope,
    PRIVATE_ENDPOINT_KEY,
};
pub use initializer::{
    BoundServer, EndpointInitializer, EndpointInitializerBuilder, FailedServer,
    InitializationReport, ServerBinder, ServiceFactory,
};
pub use logging::{init_logging, init_test_logging};
pub use merge::MergeEngine;
pub use server_table::ServerTable;
pub use settings::AutoConfigSettings;
