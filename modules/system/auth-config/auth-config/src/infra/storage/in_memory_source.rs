use std::sync::atomic::{AtomicBool, Ordering};

use auth_config_sdk::{ConfigSourceError, ProviderConfigEntry, ProviderConfigSource};
use parking_lot::Mutex;

/// A write directive received by [`InMemoryConfigSource`].
#[derive(Debug, Clone, PartialEq)]
pub enum SourceDirective {
    Add(ProviderConfigEntry),
    Delete {
        class_name: String,
        layer: Option<String>,
        app_context: Option<String>,
        description: Option<String>,
    },
}

/// Vector-backed provider configuration store.
///
/// Records every directive it receives and can be told to fail loads or
/// writes.
#[derive(Debug, Default)]
pub struct InMemoryConfigSource {
    entries: Mutex<Vec<ProviderConfigEntry>>,
    directives: Mutex<Vec<SourceDirective>>,
    fail_loads: AtomicBool,
    fail_writes: AtomicBool,
}

impl InMemoryConfigSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_entries(entries: Vec<ProviderConfigEntry>) -> Self {
        Self {
            entries: Mutex::new(entries),
            ..Self::default()
        }
    }

    /// Current stored entries.
    #[must_use]
    pub fn entries(&self) -> Vec<ProviderConfigEntry> {
        self.entries.lock().clone()
    }

    /// Directives received so far, oldest first.
    #[must_use]
    pub fn directives(&self) -> Vec<SourceDirective> {
        self.directives.lock().clone()
    }

    /// Change the store behind the factory's back, without recording a directive.
    pub fn push_entry(&self, entry: ProviderConfigEntry) {
        self.entries.lock().push(entry);
    }

    /// Drop every stored entry for `class_name`, without recording a directive.
    pub fn remove_class(&self, class_name: &str) {
        self.entries.lock().retain(|e| e.class_name != class_name);
    }

    pub fn replace_entries(&self, entries: Vec<ProviderConfigEntry>) {
        *self.entries.lock() = entries;
    }

    pub fn set_fail_loads(&self, fail: bool) {
        self.fail_loads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_writes(&self) -> Result<(), ConfigSourceError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(ConfigSourceError::Unavailable(
                "in-memory store rejects writes".to_owned(),
            ));
        }
        Ok(())
    }
}

impl ProviderConfigSource for InMemoryConfigSource {
    fn load_entries(&self) -> Result<Vec<ProviderConfigEntry>, ConfigSourceError> {
        if self.fail_loads.load(Ordering::SeqCst) {
            return Err(ConfigSourceError::Unavailable(
                "in-memory store rejects loads".to_owned(),
            ));
        }
        Ok(self.entries())
    }

    fn add_entry(&self, entry: &ProviderConfigEntry) -> Result<(), ConfigSourceError> {
        self.check_writes()?;
        let key = entry.key();
        let mut entries = self.entries.lock();
        entries.retain(|e| e.key() != key);
        entries.push(entry.clone());
        self.directives.lock().push(SourceDirective::Add(entry.clone()));
        Ok(())
    }

    fn delete_entry(
        &self,
        class_name: &str,
        layer: Option<&str>,
        app_context: Option<&str>,
        description: Option<&str>,
    ) -> Result<bool, ConfigSourceError> {
        self.check_writes()?;
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|e| {
            !(e.class_name == class_name
                && e.layer.as_deref() == layer
                && e.app_context.as_deref() == app_context)
        });
        self.directives.lock().push(SourceDirective::Delete {
            class_name: class_name.to_owned(),
            layer: layer.map(ToOwned::to_owned),
            app_context: app_context.map(ToOwned::to_owned),
            description: description.map(ToOwned::to_owned),
        });
        Ok(entries.len() != before)
    }
}
