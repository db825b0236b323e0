//! Domain models for the auth config module.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Initialization properties handed to a provider constructor.
///
/// Only string values survive registration; see [`RawProperties`] for the
/// loosely typed form accepted at the API boundary.
pub type ProviderProperties = BTreeMap<String, String>;

/// Loosely typed property map as supplied by callers or read from the store.
pub type RawProperties = serde_json::Map<String, serde_json::Value>;

const WILDCARD: &str = "*";
const CONCRETE_PREFIX: char = '=';
const SEPARATOR: char = '/';

/// Scope of a registration: a message layer and an application context.
///
/// `None` in either position is the wildcard ("all layers" / "all contexts").
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RegistrationKey {
    /// Message layer, or `None` for every layer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layer: Option<String>,
    /// Application context, or `None` for every context.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_context: Option<String>,
}

impl RegistrationKey {
    /// Creates a key from optional layer and app context.
    #[must_use]
    pub fn new(layer: Option<&str>, app_context: Option<&str>) -> Self {
        Self {
            layer: layer.map(ToOwned::to_owned),
            app_context: app_context.map(ToOwned::to_owned),
        }
    }

    /// The catch-all key `(*, *)`.
    #[must_use]
    pub fn wildcard() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn layer(&self) -> Option<&str> {
        self.layer.as_deref()
    }

    #[must_use]
    pub fn app_context(&self) -> Option<&str> {
        self.app_context.as_deref()
    }

    /// Candidate keys for a lookup, most specific first.
    ///
    /// Order: exact match, any layer with this context, this layer with any
    /// context, then the catch-all. Duplicates are removed when the lookup
    /// itself carries wildcards.
    #[must_use]
    pub fn lookup_chain(&self) -> Vec<RegistrationKey> {
        let candidates = [
            self.clone(),
            Self {
                layer: None,
                app_context: self.app_context.clone(),
            },
            Self {
                layer: self.layer.clone(),
                app_context: None,
            },
            Self::wildcard(),
        ];

        let mut chain: Vec<RegistrationKey> = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            if !chain.contains(&candidate) {
                chain.push(candidate);
            }
        }
        chain
    }

    /// Returns `true` if this key is selected by the given filter.
    ///
    /// A `None` filter component matches any value, including the wildcard.
    #[must_use]
    pub fn matches_filter(&self, layer: Option<&str>, app_context: Option<&str>) -> bool {
        let layer_ok = layer.is_none_or(|l| self.layer() == Some(l));
        let context_ok = app_context.is_none_or(|c| self.app_context() == Some(c));
        layer_ok && context_ok
    }

    fn encode_component(value: Option<&str>) -> String {
        match value {
            None => WILDCARD.to_owned(),
            Some(v) => format!("{CONCRETE_PREFIX}{}", urlencoding::encode(v)),
        }
    }

    fn decode_component(raw: &str) -> Option<Option<String>> {
        if raw == WILDCARD {
            return Some(None);
        }
        let encoded = raw.strip_prefix(CONCRETE_PREFIX)?;
        urlencoding::decode(encoded)
            .ok()
            .map(|decoded| Some(decoded.into_owned()))
    }
}

impl fmt::Display for RegistrationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "layer={} appContext={}",
            self.layer().unwrap_or(WILDCARD),
            self.app_context().unwrap_or(WILDCARD)
        )
    }
}

/// Identifier of a registration.
///
/// Derived injectively from the [`RegistrationKey`], so an identifier is
/// stable across replacement and can never name two different keys.
/// The textual form is `<layer>/<app_context>` where each component is `*`
/// for a wildcard or `=` followed by the percent-encoded value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegistrationId(String);

impl RegistrationId {
    /// Builds the identifier for a key.
    #[must_use]
    pub fn for_key(key: &RegistrationKey) -> Self {
        Self(format!(
            "{}{SEPARATOR}{}",
            RegistrationKey::encode_component(key.layer()),
            RegistrationKey::encode_component(key.app_context())
        ))
    }

    /// Wraps an identifier received from a caller without validating it.
    #[must_use]
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Recovers the key this identifier was built from.
    ///
    /// Returns `None` for identifiers that were not produced by [`Self::for_key`].
    #[must_use]
    pub fn key(&self) -> Option<RegistrationKey> {
        let (layer, app_context) = self.0.split_once(SEPARATOR)?;
        Some(RegistrationKey {
            layer: RegistrationKey::decode_component(layer)?,
            app_context: RegistrationKey::decode_component(app_context)?,
        })
    }
}

impl fmt::Display for RegistrationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&RegistrationKey> for RegistrationId {
    fn from(key: &RegistrationKey) -> Self {
        Self::for_key(key)
    }
}

/// Read-only snapshot of a registration's metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationContext {
    /// Message layer, `None` when registered for all layers.
    pub layer: Option<String>,
    /// Application context, `None` when registered for all contexts.
    pub app_context: Option<String>,
    /// Human-readable description supplied at registration.
    pub description: Option<String>,
    /// `true` for class-name registrations backed by the declarative store.
    pub persistent: bool,
}

impl RegistrationContext {
    #[must_use]
    pub fn key(&self) -> RegistrationKey {
        RegistrationKey::new(self.layer.as_deref(), self.app_context.as_deref())
    }
}

/// One declarative registration as kept in the provider configuration store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfigEntry {
    /// Provider class identifier resolved through the provider catalog.
    pub class_name: String,
    /// Initialization properties. May contain non-string values, which are
    /// dropped when the entry is registered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<RawProperties>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_context: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ProviderConfigEntry {
    #[must_use]
    pub fn new(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            properties: None,
            layer: None,
            app_context: None,
            description: None,
        }
    }

    #[must_use]
    pub fn with_layer(mut self, layer: impl Into<String>) -> Self {
        self.layer = Some(layer.into());
        self
    }

    #[must_use]
    pub fn with_app_context(mut self, app_context: impl Into<String>) -> Self {
        self.app_context = Some(app_context.into());
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.properties
            .get_or_insert_with(RawProperties::new)
            .insert(key.into(), value.into());
        self
    }

    /// Replaces the properties with a string-only map.
    #[must_use]
    pub fn with_string_properties(mut self, properties: &ProviderProperties) -> Self {
        self.properties = Some(
            properties
                .iter()
                .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
                .collect(),
        );
        self
    }

    #[must_use]
    pub fn key(&self) -> RegistrationKey {
        RegistrationKey::new(self.layer.as_deref(), self.app_context.as_deref())
    }
}
