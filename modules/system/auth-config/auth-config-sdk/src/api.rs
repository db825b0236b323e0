//! Traits implemented by providers, listeners and configuration stores.

use crate::error::ConfigSourceError;
use crate::models::ProviderConfigEntry;

/// A provider of authentication configuration objects.
///
/// The factory treats providers as opaque: it only constructs, stores and
/// hands them out. Identity is pointer identity of the `Arc` holding them.
pub trait AuthConfigProvider: Send + Sync {
    /// Class identifier of this provider (for diagnostics and delete directives).
    fn class_name(&self) -> &str;
}

/// Callback invoked when a registration a caller looked up is removed or replaced.
pub trait RegistrationListener: Send + Sync {
    /// Called with the layer and app context of the affected registration.
    fn notify(&self, layer: Option<&str>, app_context: Option<&str>);
}

/// Persistent declarative store of provider registrations.
///
/// Implementations must be safe to call from any thread; the factory
/// serializes its own calls but may share the source with other owners.
pub trait ProviderConfigSource: Send + Sync {
    /// Returns every entry in store order.
    ///
    /// # Errors
    ///
    /// Returns `ConfigSourceError` if the store cannot be read or parsed.
    fn load_entries(&self) -> Result<Vec<ProviderConfigEntry>, ConfigSourceError>;

    /// Adds `entry`, replacing any entry registered for the same layer and app context.
    ///
    /// # Errors
    ///
    /// Returns `ConfigSourceError` if the store cannot be updated.
    fn add_entry(&self, entry: &ProviderConfigEntry) -> Result<(), ConfigSourceError>;

    /// Deletes the entries for `class_name` at the given layer and app context.
    ///
    /// `description` is informational; matching uses class and key only.
    /// Returns whether anything was deleted.
    ///
    /// # Errors
    ///
    /// Returns `ConfigSourceError` if the store cannot be updated.
    fn delete_entry(
        &self,
        class_name: &str,
        layer: Option<&str>,
        app_context: Option<&str>,
        description: Option<&str>,
    ) -> Result<bool, ConfigSourceError>;
}
