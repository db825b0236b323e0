//! Process configuration for the auth config factory.
//!
//! Values are layered with figment, later layers winning:
//!
//! 1. built-in defaults
//! 2. an optional YAML file
//! 3. `PROVIDER_CONFIGURATION_FILE` / `LOG_FILE_LOCATION`
//! 4. `AUTH_CONFIG_*` variables (e.g. `AUTH_CONFIG_LOG_LEVEL`)

use std::path::{Path, PathBuf};
use std::sync::Arc;

use auth_config_sdk::AuthConfigError;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use serde::{Deserialize, Serialize};

use crate::domain::catalog::ProviderCatalog;
use crate::domain::service::{AuthConfigFactory, FactoryOptions};
use crate::infra::storage::JsonFileConfigSource;

pub const DEFAULT_LOG_FILE_NAME: &str = "authconfig.log";
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const ENV_PREFIX: &str = "AUTH_CONFIG_";

/// Unprefixed variables honored for compatibility with existing deployments.
const LEGACY_ENV_KEYS: [&str; 2] = ["provider_configuration_file", "log_file_location"];

#[derive(Debug, thiserror::Error)]
pub enum FactoryConfigError {
    #[error("invalid auth config settings: {0}")]
    Invalid(#[source] Box<figment::Error>),

    #[error("provider configuration file is not set (PROVIDER_CONFIGURATION_FILE)")]
    MissingProviderConfigurationFile,

    #[error("log file location is not set (LOG_FILE_LOCATION)")]
    MissingLogFileLocation,

    #[error(transparent)]
    Startup(#[from] AuthConfigError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthConfigFactoryConfig {
    /// Path of the JSON provider configuration store.
    pub provider_configuration_file: Option<PathBuf>,
    /// Directory the diagnostic log is written to.
    pub log_file_location: Option<PathBuf>,
    pub log_file_name: String,
    /// `EnvFilter` directive for the diagnostic log.
    pub log_level: String,
    pub fail_on_load_error: bool,
}

impl Default for AuthConfigFactoryConfig {
    fn default() -> Self {
        Self {
            provider_configuration_file: None,
            log_file_location: None,
            log_file_name: DEFAULT_LOG_FILE_NAME.to_owned(),
            log_level: DEFAULT_LOG_LEVEL.to_owned(),
            fail_on_load_error: false,
        }
    }
}

impl AuthConfigFactoryConfig {
    /// Load from defaults, an optional YAML file and the environment.
    ///
    /// A YAML path that does not exist is ignored.
    ///
    /// # Errors
    ///
    /// Returns `FactoryConfigError::Invalid` if a layer has malformed values
    /// or unknown keys.
    pub fn load(yaml: Option<&Path>) -> Result<Self, FactoryConfigError> {
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default()));
        if let Some(path) = yaml {
            figment = figment.merge(Yaml::file(path));
        }
        figment
            .merge(Env::raw().only(&LEGACY_ENV_KEYS))
            .merge(Env::prefixed(ENV_PREFIX))
            .extract()
            .map_err(|e| FactoryConfigError::Invalid(Box::new(e)))
    }

    /// # Errors
    ///
    /// Returns `MissingProviderConfigurationFile` when unset.
    pub fn provider_configuration_file(&self) -> Result<&Path, FactoryConfigError> {
        self.provider_configuration_file
            .as_deref()
            .ok_or(FactoryConfigError::MissingProviderConfigurationFile)
    }

    /// # Errors
    ///
    /// Returns `MissingLogFileLocation` when unset.
    pub fn log_file_location(&self) -> Result<&Path, FactoryConfigError> {
        self.log_file_location
            .as_deref()
            .ok_or(FactoryConfigError::MissingLogFileLocation)
    }

    /// Full path of the diagnostic log file.
    ///
    /// # Errors
    ///
    /// Returns `MissingLogFileLocation` when the directory is unset.
    pub fn log_file_path(&self) -> Result<PathBuf, FactoryConfigError> {
        Ok(self.log_file_location()?.join(&self.log_file_name))
    }

    #[must_use]
    pub fn factory_options(&self) -> FactoryOptions {
        FactoryOptions {
            fail_on_load_error: self.fail_on_load_error,
        }
    }
}

/// Build a factory backed by the JSON store named in `config`.
///
/// # Errors
///
/// Returns `MissingProviderConfigurationFile` if no store is configured, or
/// `Startup` if `fail_on_load_error` is set and the store cannot be read.
pub fn build_factory(
    config: &AuthConfigFactoryConfig,
    catalog: ProviderCatalog,
) -> Result<AuthConfigFactory, FactoryConfigError> {
    let path = config.provider_configuration_file()?;
    tracing::debug!(path = %path.display(), "using JSON provider configuration store");
    let source = Arc::new(JsonFileConfigSource::new(path));
    Ok(AuthConfigFactory::with_options(
        source,
        catalog,
        config.factory_options(),
    )?)
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use std::fs;

    const ENV_VARS: [&str; 4] = [
        "PROVIDER_CONFIGURATION_FILE",
        "LOG_FILE_LOCATION",
        "AUTH_CONFIG_LOG_LEVEL",
        "AUTH_CONFIG_FAIL_ON_LOAD_ERROR",
    ];

    fn clean_env<F: FnOnce()>(f: F) {
        temp_env::with_vars_unset(ENV_VARS, f);
    }

    #[test]
    fn defaults() {
        clean_env(|| {
            let cfg = AuthConfigFactoryConfig::load(None).unwrap();
            assert_eq!(cfg, AuthConfigFactoryConfig::default());
            assert!(matches!(
                cfg.provider_configuration_file(),
                Err(FactoryConfigError::MissingProviderConfigurationFile)
            ));
            assert!(matches!(
                cfg.log_file_path(),
                Err(FactoryConfigError::MissingLogFileLocation)
            ));
        });
    }

    #[test]
    fn legacy_env_vars_are_read() {
        temp_env::with_vars(
            [
                ("PROVIDER_CONFIGURATION_FILE", Some("/etc/auth/providers.json")),
                ("LOG_FILE_LOCATION", Some("/var/log/auth")),
                ("AUTH_CONFIG_LOG_LEVEL", None),
                ("AUTH_CONFIG_FAIL_ON_LOAD_ERROR", None),
            ],
            || {
                let cfg = AuthConfigFactoryConfig::load(None).unwrap();
                assert_eq!(
                    cfg.provider_configuration_file().unwrap(),
                    Path::new("/etc/auth/providers.json")
                );
                assert_eq!(
                    cfg.log_file_path().unwrap(),
                    PathBuf::from("/var/log/auth/authconfig.log")
                );
            },
        );
    }

    #[test]
    fn env_overrides_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let yaml = dir.path().join("auth.yaml");
        fs::write(
            &yaml,
            "log_level: debug\nlog_file_name: custom.log\nfail_on_load_error: false\n",
        )
        .unwrap();

        temp_env::with_vars(
            [
                ("PROVIDER_CONFIGURATION_FILE", None),
                ("LOG_FILE_LOCATION", None),
                ("AUTH_CONFIG_LOG_LEVEL", Some("trace")),
                ("AUTH_CONFIG_FAIL_ON_LOAD_ERROR", Some("true")),
            ],
            || {
                let cfg = AuthConfigFactoryConfig::load(Some(&yaml)).unwrap();
                assert_eq!(cfg.log_level, "trace");
                assert_eq!(cfg.log_file_name, "custom.log");
                assert!(cfg.fail_on_load_error);
                assert!(cfg.factory_options().fail_on_load_error);
            },
        );
    }

    #[test]
    fn unknown_yaml_key_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let yaml = dir.path().join("auth.yaml");
        fs::write(&yaml, "log_levle: debug\n").unwrap();

        clean_env(|| {
            let err = AuthConfigFactoryConfig::load(Some(&yaml)).unwrap_err();
            assert!(matches!(err, FactoryConfigError::Invalid(_)));
        });
    }

    #[test]
    fn build_factory_requires_store_path() {
        let cfg = AuthConfigFactoryConfig::default();
        let err = build_factory(&cfg, ProviderCatalog::new()).unwrap_err();
        assert!(matches!(err, FactoryConfigError::MissingProviderConfigurationFile));
    }
}
