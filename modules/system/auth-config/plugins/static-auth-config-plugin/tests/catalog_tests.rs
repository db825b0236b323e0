#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Static provider class wired into a factory

use std::sync::Arc;

use auth_config::{
    AuthConfigFactory, AuthConfigProvider, InMemoryConfigSource, ProviderConfigEntry, RawProperties,
};
use serde_json::json;
use static_auth_config_plugin::{FAIL_PROPERTY, STATIC_PROVIDER_CLASS, catalog};

#[test]
fn test_static_class_is_registered() {
    let catalog = catalog();
    assert_eq!(catalog.class_names(), vec![STATIC_PROVIDER_CLASS.to_owned()]);
}

#[test]
fn test_factory_builds_static_providers_from_store() {
    let source = Arc::new(InMemoryConfigSource::with_entries(vec![
        ProviderConfigEntry::new(STATIC_PROVIDER_CLASS)
            .with_layer("HttpServlet")
            .with_property("realm", "default"),
        ProviderConfigEntry::new(STATIC_PROVIDER_CLASS)
            .with_app_context("broken")
            .with_property(FAIL_PROPERTY, "on purpose"),
    ]));
    let factory = AuthConfigFactory::new(source, catalog());

    assert_eq!(factory.len(), 1);
    let provider = factory
        .get_config_provider(Some("HttpServlet"), Some("host /app"), None)
        .unwrap();
    assert_eq!(provider.class_name(), STATIC_PROVIDER_CLASS);
}

#[test]
fn test_fail_property_surfaces_as_registration_error() {
    let factory = AuthConfigFactory::new(Arc::new(InMemoryConfigSource::new()), catalog());
    let mut props = RawProperties::new();
    props.insert(FAIL_PROPERTY.to_owned(), json!("nope"));
    let err = factory
        .register_class(STATIC_PROVIDER_CLASS, Some(props), None, None, None)
        .unwrap_err();

    assert!(err.is_provider_registration());
    assert!(err.to_string().contains("nope"));
    assert!(factory.is_empty());
}
