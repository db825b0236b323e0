//! Auth Config SDK
//!
//! This crate provides the public contracts of the `auth-config` module:
//! - `AuthConfigProvider` - the unit being registered
//! - `RegistrationListener` - callback for removed or replaced registrations
//! - `ProviderConfigSource` - declarative store of class-based registrations
//! - `RegistrationKey` / `RegistrationId` / `RegistrationContext` models
//! - `AuthConfigError` for error handling
//!
//! ## Usage
//!
//! ```ignore
//! use auth_config_sdk::{RegistrationKey, RegistrationId};
//!
//! let key = RegistrationKey::new(Some("HttpServlet"), Some("server /app"));
//! let id = RegistrationId::for_key(&key);
//! assert_eq!(id.key(), Some(key));
//! ```

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]

pub mod api;
pub mod error;
pub mod models;

pub use api::{AuthConfigProvider, ProviderConfigSource, RegistrationListener};
pub use error::{AuthConfigError, ConfigSourceError, ProviderInitError};
pub use models::{
    ProviderConfigEntry, ProviderProperties, RawProperties, RegistrationContext, RegistrationId,
    RegistrationKey,
};
