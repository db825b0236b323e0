//! Filtering of provider initialization properties.

use auth_config_sdk::{ProviderProperties, RawProperties};
use tracing::{debug, warn};

/// Keep only string-valued properties.
///
/// Providers accept string properties only. Every other value is dropped
/// and reported at `warn` so the omission shows up in the diagnostic log.
#[must_use]
pub fn clean_properties(raw: Option<&RawProperties>) -> ProviderProperties {
    let Some(raw) = raw else {
        return ProviderProperties::new();
    };

    let mut props = ProviderProperties::new();
    for (key, value) in raw {
        if let Some(text) = value.as_str() {
            debug!(key = %key, value = %text, "added key={key} with value = {text}");
            props.insert(key.clone(), text.to_owned());
        } else {
            warn!(key = %key, "found non-string value for key={key}");
        }
    }
    props
}
