//! Registration registry for auth config providers.
//!
//! [`AuthConfigFactory`] owns every registration, resolves lookups with
//! layered `(layer, app context)` precedence and mirrors class-based
//! registrations into a [`ProviderConfigSource`].

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::{Arc, OnceLock};

use auth_config_sdk::{
    AuthConfigError, AuthConfigProvider, ProviderConfigEntry, ProviderConfigSource,
    ProviderProperties, RawProperties, RegistrationContext, RegistrationId, RegistrationKey,
    RegistrationListener,
};
use parking_lot::RwLock;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use super::catalog::ProviderCatalog;
use super::properties::clean_properties;
use super::registry::{PendingNotification, Registration, RegistryState};

static GLOBAL_FACTORY: OnceLock<Arc<AuthConfigFactory>> = OnceLock::new();

/// Renders an optional scope component the way the diagnostic log expects.
fn or_null(value: Option<&str>) -> &str {
    value.unwrap_or("null")
}

/// What a registration is built from.
pub enum ProviderSource {
    /// Build from a catalog class. Persistent: mirrored into the config source.
    Class {
        class_name: String,
        properties: Option<RawProperties>,
    },
    /// An already constructed provider. Not persisted.
    Instance(Arc<dyn AuthConfigProvider>),
}

impl ProviderSource {
    #[must_use]
    pub fn class(class_name: impl Into<String>, properties: Option<RawProperties>) -> Self {
        Self::Class {
            class_name: class_name.into(),
            properties,
        }
    }

    #[must_use]
    pub fn is_persistent(&self) -> bool {
        matches!(self, Self::Class { .. })
    }
}

impl fmt::Debug for ProviderSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Class { class_name, .. } => {
                f.debug_struct("Class").field("class_name", class_name).finish_non_exhaustive()
            }
            Self::Instance(provider) => f
                .debug_tuple("Instance")
                .field(&provider.class_name())
                .finish(),
        }
    }
}

/// Startup behaviour of the factory.
#[derive(Debug, Clone, Copy, Default)]
pub struct FactoryOptions {
    /// Return `ConfigurationLoad` instead of starting empty when the
    /// config source cannot be read.
    pub fail_on_load_error: bool,
}

/// Outcome of [`AuthConfigFactory::refresh`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RefreshSummary {
    pub added: usize,
    pub replaced: usize,
    pub removed: usize,
    pub unchanged: usize,
    /// Entries whose provider could not be built.
    pub skipped: usize,
}

/// Listing row for one active registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistrationSummary {
    pub id: RegistrationId,
    #[serde(flatten)]
    pub context: RegistrationContext,
    pub provider_class: String,
    pub listeners: usize,
}

#[derive(Default)]
struct RefreshPlan {
    staged: Vec<Registration>,
    redescribed: Vec<(RegistrationKey, Option<String>)>,
    stale: Vec<RegistrationKey>,
    summary: RefreshSummary,
}

/// The registration registry.
pub struct AuthConfigFactory {
    state: RwLock<RegistryState>,
    source: Arc<dyn ProviderConfigSource>,
    catalog: ProviderCatalog,
}

impl AuthConfigFactory {
    /// Create a factory and seed it from `source`.
    ///
    /// A source that cannot be read is logged and the factory starts empty.
    #[must_use]
    pub fn new(source: Arc<dyn ProviderConfigSource>, catalog: ProviderCatalog) -> Self {
        let factory = Self::empty(source, catalog);
        if let Err(e) = factory.seed() {
            error!(error = %e, "failed to load provider configuration, starting with no registrations");
        }
        factory
    }

    /// Create a factory and seed it from `source`, honoring `options`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationLoad` if `options.fail_on_load_error` is set and
    /// the source cannot be read.
    pub fn with_options(
        source: Arc<dyn ProviderConfigSource>,
        catalog: ProviderCatalog,
        options: FactoryOptions,
    ) -> Result<Self, AuthConfigError> {
        if !options.fail_on_load_error {
            return Ok(Self::new(source, catalog));
        }
        let factory = Self::empty(source, catalog);
        factory.seed()?;
        Ok(factory)
    }

    fn empty(source: Arc<dyn ProviderConfigSource>, catalog: ProviderCatalog) -> Self {
        Self {
            state: RwLock::new(RegistryState::default()),
            source,
            catalog,
        }
    }

    /// Register every stored entry without writing back to the source.
    fn seed(&self) -> Result<(), AuthConfigError> {
        let entries = self
            .source
            .load_entries()
            .map_err(AuthConfigError::ConfigurationLoad)?;
        debug!(count = entries.len(), "loaded provider configuration entries");

        let mut state = self.state.write();
        for entry in entries {
            let key = entry.key();
            let properties = clean_properties(entry.properties.as_ref());
            match self.build_class(&entry.class_name, properties, &key, entry.description) {
                Ok(registration) => {
                    info!(
                        class_name = %entry.class_name,
                        layer = or_null(key.layer()),
                        app_context = or_null(key.app_context()),
                        "registered provider from configuration"
                    );
                    state.insert(registration);
                }
                Err(e) => {
                    error!(
                        class_name = %entry.class_name,
                        layer = or_null(key.layer()),
                        app_context = or_null(key.app_context()),
                        error = %e,
                        "skipping provider configuration entry"
                    );
                }
            }
        }
        Ok(())
    }

    /// Register a provider, replacing whatever holds the same key.
    ///
    /// Class registrations are persisted through the config source before
    /// the in-memory table changes. An instance that replaces a persisted
    /// registration deletes the prior entry from the source.
    ///
    /// # Errors
    ///
    /// - `ProviderRegistration` if the class is unknown or rejects its properties
    /// - `Persistence` if the config source refuses the directive
    ///
    /// The registry is unchanged on error.
    pub fn register(
        &self,
        source: ProviderSource,
        layer: Option<&str>,
        app_context: Option<&str>,
        description: Option<&str>,
    ) -> Result<RegistrationId, AuthConfigError> {
        let (shown_layer, shown_context) = (or_null(layer), or_null(app_context));
        info!(
            layer = shown_layer,
            app_context = shown_context,
            "registerConfigProvider() called for layer {shown_layer} and appContext {shown_context}"
        );

        let key = RegistrationKey::new(layer, app_context);
        let description = description.map(ToOwned::to_owned);
        let registration = match source {
            ProviderSource::Class {
                class_name,
                properties,
            } => {
                let properties = clean_properties(properties.as_ref());
                self.build_class(&class_name, properties, &key, description)?
            }
            ProviderSource::Instance(provider) => Registration {
                id: RegistrationId::for_key(&key),
                key,
                provider,
                description,
                persistent: false,
                class_name: None,
                properties: ProviderProperties::new(),
                listeners: Vec::new(),
            },
        };
        let id = registration.id.clone();

        let replaced = {
            let mut state = self.state.write();
            self.write_back(state.get(&registration.key), &registration)?;
            state.insert(registration)
        };

        if let Some(pending) = replaced.and_then(PendingNotification::from_registration) {
            pending.deliver();
        }
        debug!(id = %id, "registration committed");
        Ok(id)
    }

    /// Register a catalog class as a persistent registration.
    ///
    /// # Errors
    ///
    /// Same as [`Self::register`].
    pub fn register_class(
        &self,
        class_name: &str,
        properties: Option<RawProperties>,
        layer: Option<&str>,
        app_context: Option<&str>,
        description: Option<&str>,
    ) -> Result<RegistrationId, AuthConfigError> {
        self.register(
            ProviderSource::class(class_name, properties),
            layer,
            app_context,
            description,
        )
    }

    /// Register an already constructed provider (a self-registration).
    ///
    /// # Errors
    ///
    /// Returns `Persistence` if this replaces a persisted registration and
    /// deleting its stored entry fails.
    pub fn register_instance(
        &self,
        provider: Arc<dyn AuthConfigProvider>,
        layer: Option<&str>,
        app_context: Option<&str>,
        description: Option<&str>,
    ) -> Result<RegistrationId, AuthConfigError> {
        self.register(
            ProviderSource::Instance(provider),
            layer,
            app_context,
            description,
        )
    }

    fn build_class(
        &self,
        class_name: &str,
        properties: ProviderProperties,
        key: &RegistrationKey,
        description: Option<String>,
    ) -> Result<Registration, AuthConfigError> {
        let provider =
            self.catalog
                .construct(class_name, &properties, key.layer(), key.app_context())?;
        Ok(Registration {
            id: RegistrationId::for_key(key),
            key: key.clone(),
            provider,
            description,
            persistent: true,
            class_name: Some(class_name.to_owned()),
            properties,
            listeners: Vec::new(),
        })
    }

    /// Issue the config source directive for replacing `prior` with `next`.
    fn write_back(
        &self,
        prior: Option<&Registration>,
        next: &Registration,
    ) -> Result<(), AuthConfigError> {
        if next.persistent {
            let entry = stored_entry(next);
            return self.source.add_entry(&entry).map_err(|e| {
                warn!(id = %next.id, error = %e, "failed to persist provider registration");
                AuthConfigError::Persistence(e)
            });
        }

        let Some(prior) = prior.filter(|p| p.persistent) else {
            return Ok(());
        };
        let Some(class_name) = prior.class_name.as_deref() else {
            return Ok(());
        };
        let deleted = self
            .source
            .delete_entry(
                class_name,
                prior.key.layer(),
                prior.key.app_context(),
                prior.description.as_deref(),
            )
            .map_err(|e| {
                warn!(id = %prior.id, error = %e, "failed to delete persisted provider registration");
                AuthConfigError::Persistence(e)
            })?;
        debug!(id = %prior.id, class_name, deleted, "forwarded delete for replaced registration");
        Ok(())
    }

    /// Resolve the provider for `(layer, app_context)`.
    ///
    /// Candidates are tried most specific first: exact, any layer with this
    /// context, this layer with any context, then the catch-all. When a
    /// listener is given and a registration matches, the listener is attached
    /// to that registration and called when it is removed or replaced.
    pub fn get_config_provider(
        &self,
        layer: Option<&str>,
        app_context: Option<&str>,
        listener: Option<Arc<dyn RegistrationListener>>,
    ) -> Option<Arc<dyn AuthConfigProvider>> {
        let (shown_layer, shown_context) = (or_null(layer), or_null(app_context));
        info!(
            layer = shown_layer,
            app_context = shown_context,
            "getConfigProvider called for Layer : {shown_layer} and AppContext :{shown_context}"
        );

        let key = RegistrationKey::new(layer, app_context);
        let provider = match listener {
            None => self.state.read().resolve(&key).map(|r| r.provider.clone()),
            Some(listener) => {
                let mut state = self.state.write();
                state.resolve_mut(&key).map(|r| {
                    r.attach_listener(listener);
                    r.provider.clone()
                })
            }
        };

        let outcome = if provider.is_some() { "non-null" } else { "null" };
        info!(
            layer = shown_layer,
            app_context = shown_context,
            "getConfigProvider returned {outcome} provider for Layer : {shown_layer} and AppContext :{shown_context}"
        );
        provider
    }

    /// Ids of active registrations, optionally only those holding `provider`.
    #[must_use]
    pub fn get_registration_ids(
        &self,
        provider: Option<&Arc<dyn AuthConfigProvider>>,
    ) -> BTreeSet<RegistrationId> {
        let state = self.state.read();
        match provider {
            None => state.ids(),
            Some(p) => state.ids_for_provider(p),
        }
    }

    #[must_use]
    pub fn get_registration_context(&self, id: &RegistrationId) -> Option<RegistrationContext> {
        let key = id.key()?;
        self.state.read().get(&key).map(Registration::context)
    }

    /// Remove a registration. Returns `false` for unknown ids.
    ///
    /// The config source is not touched; a persisted entry comes back on the
    /// next restart.
    pub fn remove_registration(&self, id: &RegistrationId) -> bool {
        info!(id = %id, "removeRegistration called");
        let Some(key) = id.key() else {
            debug!(id = %id, "not a registration id");
            return false;
        };

        let removed = self.state.write().remove(&key);
        let Some(registration) = removed else {
            return false;
        };
        if let Some(pending) = PendingNotification::from_registration(registration) {
            pending.deliver();
        }
        true
    }

    /// Detach `listener` from every registration whose key matches the filter.
    ///
    /// A `None` filter component matches any value. Returns the ids the
    /// listener was detached from.
    pub fn detach_listener(
        &self,
        listener: &Arc<dyn RegistrationListener>,
        layer: Option<&str>,
        app_context: Option<&str>,
    ) -> BTreeSet<RegistrationId> {
        let mut state = self.state.write();
        state
            .iter_mut()
            .filter(|r| r.key.matches_filter(layer, app_context))
            .filter_map(|r| r.detach_listener(listener).then(|| r.id.clone()))
            .collect()
    }

    /// Re-read the config source and reconcile persisted registrations.
    ///
    /// Entries with the same class and properties as the persisted
    /// registration keep their provider; only a changed description is copied
    /// over. New or changed entries are (re)built without writing back.
    /// Entries that cannot be built are logged and skipped, as at startup, and
    /// leave any current registration for their key in place. Keys held by
    /// instance registrations are skipped. Persisted registrations whose entry
    /// disappeared are removed and their listeners notified.
    ///
    /// # Errors
    ///
    /// `ConfigurationLoad` if the source cannot be read. Nothing changes on error.
    pub fn refresh(&self) -> Result<RefreshSummary, AuthConfigError> {
        let mut state = self.state.write();
        let entries = self
            .source
            .load_entries()
            .map_err(AuthConfigError::ConfigurationLoad)?;
        let plan = self.plan_refresh(&state, entries);

        for (key, description) in plan.redescribed {
            if let Some(registration) = state.get_mut(&key) {
                registration.description = description;
            }
        }
        let mut pending = Vec::new();
        for registration in plan.staged {
            if let Some(prior) = state.insert(registration) {
                pending.extend(PendingNotification::from_registration(prior));
            }
        }
        for key in &plan.stale {
            if let Some(prior) = state.remove(key) {
                pending.extend(PendingNotification::from_registration(prior));
            }
        }
        drop(state);

        for notification in pending {
            notification.deliver();
        }
        let summary = plan.summary;
        info!(
            added = summary.added,
            replaced = summary.replaced,
            removed = summary.removed,
            unchanged = summary.unchanged,
            skipped = summary.skipped,
            "provider configuration refreshed"
        );
        Ok(summary)
    }

    /// Build every registration a refresh needs without touching `state`.
    fn plan_refresh(&self, state: &RegistryState, entries: Vec<ProviderConfigEntry>) -> RefreshPlan {
        // Later entries for the same key win, as at startup.
        let desired: BTreeMap<RegistrationKey, ProviderConfigEntry> =
            entries.into_iter().map(|e| (e.key(), e)).collect();

        let mut plan = RefreshPlan::default();
        for (key, entry) in &desired {
            let properties = clean_properties(entry.properties.as_ref());
            let existing = state.get(key);
            if let Some(existing) = existing {
                if !existing.persistent {
                    debug!(id = %existing.id, "keeping self-registration over stored entry");
                    continue;
                }
                if existing.is_built_from(&entry.class_name, &properties) {
                    if existing.description != entry.description {
                        plan.redescribed.push((key.clone(), entry.description.clone()));
                    }
                    plan.summary.unchanged += 1;
                    continue;
                }
            }

            match self.build_class(&entry.class_name, properties, key, entry.description.clone()) {
                Ok(registration) => {
                    plan.staged.push(registration);
                    if existing.is_some() {
                        plan.summary.replaced += 1;
                    } else {
                        plan.summary.added += 1;
                    }
                }
                Err(e) => {
                    warn!(
                        class_name = %entry.class_name,
                        layer = or_null(key.layer()),
                        app_context = or_null(key.app_context()),
                        error = %e,
                        "skipping provider configuration entry on refresh"
                    );
                    plan.summary.skipped += 1;
                }
            }
        }

        plan.stale = state
            .iter()
            .filter(|r| r.persistent && !desired.contains_key(&r.key))
            .map(|r| r.key.clone())
            .collect();
        plan.summary.removed = plan.stale.len();
        plan
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.state.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.read().is_empty()
    }

    /// Snapshot of every active registration, ordered by id.
    #[must_use]
    pub fn registrations(&self) -> Vec<RegistrationSummary> {
        let state = self.state.read();
        let mut rows: Vec<RegistrationSummary> = state
            .iter()
            .map(|r| RegistrationSummary {
                id: r.id.clone(),
                context: r.context(),
                provider_class: r.provider.class_name().to_owned(),
                listeners: r.listeners.len(),
            })
            .collect();
        rows.sort_by(|a, b| a.id.cmp(&b.id));
        rows
    }

    #[must_use]
    pub fn catalog(&self) -> &ProviderCatalog {
        &self.catalog
    }

    /// Install the process-wide factory.
    ///
    /// # Errors
    ///
    /// Returns the factory back if one is already installed.
    pub fn install_global(factory: Arc<Self>) -> Result<(), Arc<Self>> {
        GLOBAL_FACTORY.set(factory)
    }

    /// The process-wide factory, if installed.
    #[must_use]
    pub fn global() -> Option<Arc<Self>> {
        GLOBAL_FACTORY.get().cloned()
    }
}

impl fmt::Debug for AuthConfigFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfigFactory")
            .field("registrations", &self.len())
            .field("catalog", &self.catalog)
            .finish_non_exhaustive()
    }
}

fn stored_entry(registration: &Registration) -> ProviderConfigEntry {
    let mut entry = ProviderConfigEntry::new(registration.class_name.clone().unwrap_or_default());
    entry.layer = registration.key.layer.clone();
    entry.app_context = registration.key.app_context.clone();
    entry.description = registration.description.clone();
    if !registration.properties.is_empty() {
        entry = entry.with_string_properties(&registration.properties);
    }
    entry
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::infra::storage::InMemoryConfigSource;
    use auth_config_sdk::ProviderInitError;

    struct Fixed(&'static str);

    impl AuthConfigProvider for Fixed {
        fn class_name(&self) -> &str {
            self.0
        }
    }

    fn catalog() -> ProviderCatalog {
        ProviderCatalog::new()
            .with_class("fixed", |_, _, _| Ok(Arc::new(Fixed("fixed"))))
            .with_class("broken", |_, _, _| Err(ProviderInitError::new("nope")))
    }

    fn factory() -> (Arc<InMemoryConfigSource>, AuthConfigFactory) {
        let source = Arc::new(InMemoryConfigSource::new());
        let factory = AuthConfigFactory::new(source.clone(), catalog());
        (source, factory)
    }

    #[test]
    fn or_null_renders_wildcards() {
        assert_eq!(or_null(None), "null");
        assert_eq!(or_null(Some("L")), "L");
    }

    #[test]
    fn class_registration_is_persistent() {
        let (source, factory) = factory();
        let id = factory
            .register_class("fixed", None, Some("L"), None, Some("d"))
            .unwrap();

        let ctx = factory.get_registration_context(&id).unwrap();
        assert!(ctx.persistent);
        assert_eq!(ctx.description.as_deref(), Some("d"));
        assert_eq!(source.entries().len(), 1);
    }

    #[test]
    fn failed_construction_leaves_registry_empty() {
        let (source, factory) = factory();
        let err = factory
            .register_class("broken", None, None, None, None)
            .unwrap_err();

        assert!(err.is_provider_registration());
        assert!(factory.is_empty());
        assert!(source.directives().is_empty());
    }

    #[test]
    fn stored_entry_omits_empty_properties() {
        let (_, factory) = factory();
        factory
            .register_class("fixed", None, None, Some("C"), None)
            .unwrap();
        let state = factory.state.read();
        let registration = state.get(&RegistrationKey::new(None, Some("C"))).unwrap();
        let entry = stored_entry(registration);
        assert_eq!(entry.class_name, "fixed");
        assert!(entry.properties.is_none());
        assert_eq!(entry.app_context.as_deref(), Some("C"));
    }

    #[test]
    fn registrations_are_sorted_by_id() {
        let (_, factory) = factory();
        factory
            .register_instance(Arc::new(Fixed("b")), Some("B"), None, None)
            .unwrap();
        factory
            .register_instance(Arc::new(Fixed("a")), Some("A"), None, None)
            .unwrap();

        let rows = factory.registrations();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].provider_class, "a");
        assert_eq!(rows[1].provider_class, "b");
    }
}
