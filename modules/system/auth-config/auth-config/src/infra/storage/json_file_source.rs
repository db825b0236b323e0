use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use auth_config_sdk::{ConfigSourceError, ProviderConfigEntry, ProviderConfigSource};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreDocument {
    #[serde(default)]
    entries: Vec<ProviderConfigEntry>,
}

/// Provider configuration store kept as a JSON document on disk.
///
/// The document has the shape `{ "entries": [ ... ] }`. A missing or empty
/// file is an empty store; it is created on the first write. Every write
/// replaces the file atomically through a temp file in the same directory.
#[derive(Debug)]
pub struct JsonFileConfigSource {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileConfigSource {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> ConfigSourceError {
        ConfigSourceError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }

    fn read_document(&self) -> Result<StoreDocument, ConfigSourceError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "provider configuration store not found, treating as empty");
                return Ok(StoreDocument::default());
            }
            Err(e) => return Err(self.io_error(e)),
        };

        if raw.trim().is_empty() {
            return Ok(StoreDocument::default());
        }

        serde_json::from_str(&raw).map_err(|source| ConfigSourceError::Parse {
            path: self.path.display().to_string(),
            source,
        })
    }

    fn write_document(&self, document: &StoreDocument) -> Result<(), ConfigSourceError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).map_err(|e| self.io_error(e))?;

        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| self.io_error(e))?;
        serde_json::to_writer_pretty(&mut tmp, document).map_err(ConfigSourceError::Serialize)?;
        tmp.write_all(b"\n").map_err(|e| self.io_error(e))?;
        tmp.as_file().sync_all().map_err(|e| self.io_error(e))?;
        tmp.persist(&self.path).map_err(|e| self.io_error(e.error))?;

        debug!(
            path = %self.path.display(),
            entries = document.entries.len(),
            "provider configuration store written"
        );
        Ok(())
    }
}

impl ProviderConfigSource for JsonFileConfigSource {
    fn load_entries(&self) -> Result<Vec<ProviderConfigEntry>, ConfigSourceError> {
        let _guard = self.lock.lock();
        Ok(self.read_document()?.entries)
    }

    fn add_entry(&self, entry: &ProviderConfigEntry) -> Result<(), ConfigSourceError> {
        let _guard = self.lock.lock();
        let mut document = self.read_document()?;
        let key = entry.key();
        match document.entries.iter_mut().find(|e| e.key() == key) {
            Some(existing) => *existing = entry.clone(),
            None => document.entries.push(entry.clone()),
        }
        // Hand-edited stores may repeat a key; keep one entry per key.
        let mut seen = false;
        document.entries.retain(|e| {
            if e.key() != key {
                return true;
            }
            let keep = !seen;
            seen = true;
            keep
        });
        self.write_document(&document)
    }

    fn delete_entry(
        &self,
        class_name: &str,
        layer: Option<&str>,
        app_context: Option<&str>,
        _description: Option<&str>,
    ) -> Result<bool, ConfigSourceError> {
        let _guard = self.lock.lock();
        let mut document = self.read_document()?;
        let before = document.entries.len();
        document.entries.retain(|e| {
            !(e.class_name == class_name
                && e.layer.as_deref() == layer
                && e.app_context.as_deref() == app_context)
        });
        if document.entries.len() == before {
            return Ok(false);
        }
        self.write_document(&document)?;
        Ok(true)
    }
}
