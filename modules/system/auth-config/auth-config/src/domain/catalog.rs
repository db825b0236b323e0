use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use auth_config_sdk::{AuthConfigError, AuthConfigProvider, ProviderInitError, ProviderProperties};

/// Constructor for a provider class: `(properties, layer, app_context)`.
pub type ProviderConstructor = dyn Fn(
        &ProviderProperties,
        Option<&str>,
        Option<&str>,
    ) -> Result<Arc<dyn AuthConfigProvider>, ProviderInitError>
    + Send
    + Sync;

/// Registry of provider classes that class-name registrations can instantiate.
#[derive(Default, Clone)]
pub struct ProviderCatalog {
    classes: HashMap<String, Arc<ProviderConstructor>>,
}

impl ProviderCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a constructor under a class name, replacing any previous one.
    pub fn register_class<F>(&mut self, class_name: impl Into<String>, constructor: F)
    where
        F: Fn(
                &ProviderProperties,
                Option<&str>,
                Option<&str>,
            ) -> Result<Arc<dyn AuthConfigProvider>, ProviderInitError>
            + Send
            + Sync
            + 'static,
    {
        self.classes.insert(class_name.into(), Arc::new(constructor));
    }

    /// Builder form of [`Self::register_class`].
    #[must_use]
    pub fn with_class<F>(mut self, class_name: impl Into<String>, constructor: F) -> Self
    where
        F: Fn(
                &ProviderProperties,
                Option<&str>,
                Option<&str>,
            ) -> Result<Arc<dyn AuthConfigProvider>, ProviderInitError>
            + Send
            + Sync
            + 'static,
    {
        self.register_class(class_name, constructor);
        self
    }

    /// Check if a class is known
    #[must_use]
    pub fn contains(&self, class_name: &str) -> bool {
        self.classes.contains_key(class_name)
    }

    /// Get all class names, sorted
    #[must_use]
    pub fn class_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.classes.keys().cloned().collect();
        names.sort();
        names
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Instantiate `class_name` with the given properties and scope.
    ///
    /// # Errors
    ///
    /// Returns `ProviderRegistration` if the class is unknown or its
    /// constructor rejects the properties.
    pub fn construct(
        &self,
        class_name: &str,
        properties: &ProviderProperties,
        layer: Option<&str>,
        app_context: Option<&str>,
    ) -> Result<Arc<dyn AuthConfigProvider>, AuthConfigError> {
        let constructor = self
            .classes
            .get(class_name)
            .ok_or_else(|| AuthConfigError::unknown_class(class_name))?;

        constructor(properties, layer, app_context).map_err(|e| {
            AuthConfigError::ProviderRegistration {
                class_name: class_name.to_owned(),
                reason: e.to_string(),
            }
        })
    }
}

impl fmt::Debug for ProviderCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderCatalog")
            .field("classes", &self.class_names())
            .finish()
    }
}
