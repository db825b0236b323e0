//! Auth Config Module
//!
//! Registration factory for authentication configuration providers.
//!
//! ## Architecture
//!
//! - **Registry**: [`AuthConfigFactory`] holds at most one registration per
//!   `(layer, app context)` key and resolves lookups most specific first
//! - **Catalog**: [`ProviderCatalog`] maps class names to provider constructors
//! - **Stores**: class-based registrations are mirrored into a
//!   [`ProviderConfigSource`](auth_config_sdk::ProviderConfigSource); the JSON
//!   file store is the production one
//!
//! ## Startup
//!
//! [`config::AuthConfigFactoryConfig::load`] reads settings,
//! [`logging::init_file_logging`] opens the diagnostic log and
//! [`config::build_factory`] seeds the registry from the configured store.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

// Re-export SDK types
pub use auth_config_sdk::*;

pub mod config;
#[doc(hidden)]
pub mod domain;
pub mod infra;
pub mod logging;

pub use config::{AuthConfigFactoryConfig, FactoryConfigError, build_factory};
pub use domain::catalog::{ProviderCatalog, ProviderConstructor};
pub use domain::properties::clean_properties;
pub use domain::service::{
    AuthConfigFactory, FactoryOptions, ProviderSource, RefreshSummary, RegistrationSummary,
};
pub use infra::storage::{InMemoryConfigSource, JsonFileConfigSource, SourceDirective};
pub use logging::{LoggingError, init_file_logging};
