#![allow(clippy::unwrap_used, clippy::expect_used, dead_code)]

//! Common test utilities for auth-config integration tests

use std::sync::Arc;

use auth_config::{
    AuthConfigFactory, AuthConfigProvider, InMemoryConfigSource, ProviderCatalog,
    ProviderConfigEntry, ProviderInitError, ProviderProperties, RegistrationListener,
};
use parking_lot::Mutex;

pub const ECHO_CLASS: &str = "test.EchoProvider";
pub const REJECTING_CLASS: &str = "test.RejectingProvider";

/// Provider that remembers what it was built with.
#[derive(Debug)]
pub struct EchoProvider {
    pub properties: ProviderProperties,
    pub layer: Option<String>,
    pub app_context: Option<String>,
}

impl AuthConfigProvider for EchoProvider {
    fn class_name(&self) -> &str {
        ECHO_CLASS
    }
}

/// Self-registered provider with a fixed name.
pub struct NamedProvider(pub &'static str);

impl AuthConfigProvider for NamedProvider {
    fn class_name(&self) -> &str {
        self.0
    }
}

pub fn named(name: &'static str) -> Arc<dyn AuthConfigProvider> {
    Arc::new(NamedProvider(name))
}

/// Listener recording every notification it receives.
#[derive(Default)]
pub struct RecordingListener {
    calls: Mutex<Vec<(Option<String>, Option<String>)>>,
}

impl RecordingListener {
    pub fn calls(&self) -> Vec<(Option<String>, Option<String>)> {
        self.calls.lock().clone()
    }
}

impl RegistrationListener for RecordingListener {
    fn notify(&self, layer: Option<&str>, app_context: Option<&str>) {
        self.calls
            .lock()
            .push((layer.map(ToOwned::to_owned), app_context.map(ToOwned::to_owned)));
    }
}

pub fn listener() -> (Arc<RecordingListener>, Arc<dyn RegistrationListener>) {
    let recording = Arc::new(RecordingListener::default());
    let dyn_listener: Arc<dyn RegistrationListener> = recording.clone();
    (recording, dyn_listener)
}

pub fn catalog() -> ProviderCatalog {
    ProviderCatalog::new()
        .with_class(ECHO_CLASS, |props, layer, app_context| {
            Ok(Arc::new(EchoProvider {
                properties: props.clone(),
                layer: layer.map(ToOwned::to_owned),
                app_context: app_context.map(ToOwned::to_owned),
            }))
        })
        .with_class(REJECTING_CLASS, |_, _, _| {
            Err(ProviderInitError::new("rejected by test provider"))
        })
}

pub fn create_factory() -> (Arc<InMemoryConfigSource>, AuthConfigFactory) {
    create_factory_with(Vec::new())
}

pub fn create_factory_with(
    entries: Vec<ProviderConfigEntry>,
) -> (Arc<InMemoryConfigSource>, AuthConfigFactory) {
    let source = Arc::new(InMemoryConfigSource::with_entries(entries));
    let factory = AuthConfigFactory::new(source.clone(), catalog());
    (source, factory)
}

/// Class name of whatever provider the lookup resolves to.
pub fn resolved(factory: &AuthConfigFactory, layer: Option<&str>, app_context: Option<&str>) -> Option<String> {
    factory
        .get_config_provider(layer, app_context, None)
        .map(|p| p.class_name().to_owned())
}
