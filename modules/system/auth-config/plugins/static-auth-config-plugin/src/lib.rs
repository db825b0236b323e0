//! Static Auth Config Plugin
//!
//! Adds the [`STATIC_PROVIDER_CLASS`] provider class to a
//! [`ProviderCatalog`](auth_config::ProviderCatalog). Providers of this class
//! hold the properties and scope they were registered with.
//!
//! ## Store entry
//!
//! ```json
//! {
//!   "className": "static",
//!   "layer": "HttpServlet",
//!   "properties": { "realm": "default" }
//! }
//! ```

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod domain;

pub use domain::provider::{FAIL_PROPERTY, STATIC_PROVIDER_CLASS, StaticAuthConfigProvider};

use std::sync::Arc;

use auth_config::ProviderCatalog;

/// Install the static provider class into `catalog`.
pub fn register(catalog: &mut ProviderCatalog) {
    catalog.register_class(STATIC_PROVIDER_CLASS, |properties, layer, app_context| {
        let provider = StaticAuthConfigProvider::construct(properties, layer, app_context)?;
        Ok(Arc::new(provider))
    });
}

/// A catalog holding only the static provider class.
#[must_use]
pub fn catalog() -> ProviderCatalog {
    let mut catalog = ProviderCatalog::new();
    register(&mut catalog);
    catalog
}
