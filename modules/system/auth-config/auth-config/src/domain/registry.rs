//! In-memory registration table with layered precedence resolution.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use auth_config_sdk::{
    AuthConfigProvider, ProviderProperties, RegistrationContext, RegistrationId, RegistrationKey,
    RegistrationListener,
};

/// A single active registration.
pub struct Registration {
    pub id: RegistrationId,
    pub key: RegistrationKey,
    pub provider: Arc<dyn AuthConfigProvider>,
    pub description: Option<String>,
    pub persistent: bool,
    /// Class the provider was built from; `None` for instance registrations.
    pub class_name: Option<String>,
    /// Filtered properties the provider was built with.
    pub properties: ProviderProperties,
    pub listeners: Vec<Arc<dyn RegistrationListener>>,
}

impl Registration {
    #[must_use]
    pub fn context(&self) -> RegistrationContext {
        RegistrationContext {
            layer: self.key.layer.clone(),
            app_context: self.key.app_context.clone(),
            description: self.description.clone(),
            persistent: self.persistent,
        }
    }

    /// Attach a listener; returns `false` if it was already attached.
    pub fn attach_listener(&mut self, listener: Arc<dyn RegistrationListener>) -> bool {
        if self.listeners.iter().any(|l| Arc::ptr_eq(l, &listener)) {
            return false;
        }
        self.listeners.push(listener);
        true
    }

    /// Detach a listener; returns whether it was attached.
    pub fn detach_listener(&mut self, listener: &Arc<dyn RegistrationListener>) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|l| !Arc::ptr_eq(l, listener));
        self.listeners.len() != before
    }

    /// Whether this registration was built from exactly this class and properties.
    #[must_use]
    pub fn is_built_from(&self, class_name: &str, properties: &ProviderProperties) -> bool {
        self.class_name.as_deref() == Some(class_name) && self.properties == *properties
    }
}

/// Listeners to call once the registry lock is released.
pub struct PendingNotification {
    pub key: RegistrationKey,
    pub listeners: Vec<Arc<dyn RegistrationListener>>,
}

impl PendingNotification {
    #[must_use]
    pub fn from_registration(registration: Registration) -> Option<Self> {
        if registration.listeners.is_empty() {
            return None;
        }
        Some(Self {
            key: registration.key,
            listeners: registration.listeners,
        })
    }

    pub fn deliver(self) {
        for listener in &self.listeners {
            listener.notify(self.key.layer(), self.key.app_context());
        }
    }
}

/// Registration table. At most one entry exists per key.
#[derive(Default)]
pub struct RegistryState {
    registrations: HashMap<RegistrationKey, Registration>,
}

impl RegistryState {
    #[must_use]
    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    #[must_use]
    pub fn get(&self, key: &RegistrationKey) -> Option<&Registration> {
        self.registrations.get(key)
    }

    pub fn get_mut(&mut self, key: &RegistrationKey) -> Option<&mut Registration> {
        self.registrations.get_mut(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Registration> {
        self.registrations.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Registration> {
        self.registrations.values_mut()
    }

    /// Best registration for a lookup, following the precedence chain.
    #[must_use]
    pub fn resolve(&self, key: &RegistrationKey) -> Option<&Registration> {
        key.lookup_chain()
            .iter()
            .find_map(|candidate| self.registrations.get(candidate))
    }

    pub fn resolve_mut(&mut self, key: &RegistrationKey) -> Option<&mut Registration> {
        let hit = key
            .lookup_chain()
            .into_iter()
            .find(|candidate| self.registrations.contains_key(candidate))?;
        self.registrations.get_mut(&hit)
    }

    /// Insert, returning the registration it replaced.
    pub fn insert(&mut self, registration: Registration) -> Option<Registration> {
        self.registrations
            .insert(registration.key.clone(), registration)
    }

    pub fn remove(&mut self, key: &RegistrationKey) -> Option<Registration> {
        self.registrations.remove(key)
    }

    #[must_use]
    pub fn ids(&self) -> BTreeSet<RegistrationId> {
        self.registrations.values().map(|r| r.id.clone()).collect()
    }

    #[must_use]
    pub fn ids_for_provider(&self, provider: &Arc<dyn AuthConfigProvider>) -> BTreeSet<RegistrationId> {
        self.registrations
            .values()
            .filter(|r| Arc::ptr_eq(&r.provider, provider))
            .map(|r| r.id.clone())
            .collect()
    }
}
