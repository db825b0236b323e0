//! Error types for the auth config module.

use thiserror::Error;

/// Errors returned by the auth config factory.
#[derive(Debug, Error)]
pub enum AuthConfigError {
    /// The declarative store could not be read or parsed.
    #[error("configuration load failed: {0}")]
    ConfigurationLoad(#[source] ConfigSourceError),

    /// The provider class is unknown or its constructor failed.
    #[error("provider registration failed for class {class_name}: {reason}")]
    ProviderRegistration {
        /// Class identifier that was requested.
        class_name: String,
        /// Why construction was rejected.
        reason: String,
    },

    /// Writing a directive to the declarative store failed.
    #[error("persisting registration failed: {0}")]
    Persistence(#[source] ConfigSourceError),
}

impl AuthConfigError {
    #[must_use]
    pub fn unknown_class(class_name: impl Into<String>) -> Self {
        let class_name = class_name.into();
        Self::ProviderRegistration {
            reason: format!("Unknown class : {class_name}"),
            class_name,
        }
    }

    #[must_use]
    pub fn is_provider_registration(&self) -> bool {
        matches!(self, Self::ProviderRegistration { .. })
    }

    #[must_use]
    pub fn is_persistence(&self) -> bool {
        matches!(self, Self::Persistence(_))
    }

    #[must_use]
    pub fn is_configuration_load(&self) -> bool {
        matches!(self, Self::ConfigurationLoad(_))
    }
}

/// Errors raised by a provider configuration store.
#[derive(Debug, Error)]
pub enum ConfigSourceError {
    #[error("I/O error on provider configuration store {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed provider configuration store {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize provider configuration: {0}")]
    Serialize(#[source] serde_json::Error),

    /// Store-specific failure that does not fit the other variants.
    #[error("provider configuration store unavailable: {0}")]
    Unavailable(String),
}

/// Error a provider constructor reports when it rejects its properties.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct ProviderInitError(pub String);

impl ProviderInitError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}
