//! Configuration module for Genlink
//!
//! Declares which provider backends exist, which one serves calls, and any
//! retry overrides. Files are YAML or JSON; `${VAR}` placeholders in provider
//! fields are resolved from the environment before validation.

mod env;
mod error;
mod schema;
mod secrets;
mod validator;

pub use env::interpolate;
pub use error::{ConfigError, ConfigResult, ValidationError, ValidationErrorKind};
pub use schema::{
    GenlinkConfig, ProviderSettings, ProviderType, RetrySettings, SUPPORTED_VERSION,
};
pub use secrets::SecretString;
pub use validator::ConfigValidator;

use std::fs;
use std::path::Path;
use tracing::debug;

/// Load a configuration from a YAML file
pub fn load_from_yaml<P: AsRef<Path>>(path: P) -> ConfigResult<GenlinkConfig> {
    let path = path.as_ref();
    let content = read(path)?;

    let config: GenlinkConfig =
        serde_yaml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            line: e.location().map(|l| l.line()),
            message: e.to_string(),
        })?;

    finish(path, config)
}

/// Load a configuration from a JSON file
pub fn load_from_json<P: AsRef<Path>>(path: P) -> ConfigResult<GenlinkConfig> {
    let path = path.as_ref();
    let content = read(path)?;

    let config: GenlinkConfig =
        serde_json::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            line: Some(e.line()),
            message: e.to_string(),
        })?;

    finish(path, config)
}

fn read(path: &Path) -> ConfigResult<String> {
    fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn finish(path: &Path, mut config: GenlinkConfig) -> ConfigResult<GenlinkConfig> {
    env::interpolate_config_env_vars(&mut config)?;
    ConfigValidator::new().validate(&config)?;

    debug!(
        path = %path.display(),
        provider = %config.provider,
        providers = config.providers.len(),
        "configuration loaded"
    );
    Ok(config)
}
