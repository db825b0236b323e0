use auth_config_sdk::{AuthConfigProvider, ProviderInitError, ProviderProperties};

/// Class name the static provider is registered under.
pub const STATIC_PROVIDER_CLASS: &str = "static";

/// Property that makes construction fail; its value is the reported reason.
pub const FAIL_PROPERTY: &str = "fail";

/// Provider backed by the properties it was registered with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticAuthConfigProvider {
    properties: ProviderProperties,
    layer: Option<String>,
    app_context: Option<String>,
}

impl StaticAuthConfigProvider {
    /// # Errors
    ///
    /// Returns `ProviderInitError` when the `fail` property is set.
    pub fn construct(
        properties: &ProviderProperties,
        layer: Option<&str>,
        app_context: Option<&str>,
    ) -> Result<Self, ProviderInitError> {
        if let Some(reason) = properties.get(FAIL_PROPERTY) {
            tracing::debug!(reason = %reason, "static provider construction rejected");
            return Err(ProviderInitError::new(format!(
                "static provider rejected its properties: {reason}"
            )));
        }

        Ok(Self {
            properties: properties.clone(),
            layer: layer.map(ToOwned::to_owned),
            app_context: app_context.map(ToOwned::to_owned),
        })
    }

    #[must_use]
    pub fn properties(&self) -> &ProviderProperties {
        &self.properties
    }

    #[must_use]
    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties.get(name).map(String::as_str)
    }

    #[must_use]
    pub fn layer(&self) -> Option<&str> {
        self.layer.as_deref()
    }

    #[must_use]
    pub fn app_context(&self) -> Option<&str> {
        self.app_context.as_deref()
    }
}

impl AuthConfigProvider for StaticAuthConfigProvider {
    fn class_name(&self) -> &str {
        STATIC_PROVIDER_CLASS
    }
}
