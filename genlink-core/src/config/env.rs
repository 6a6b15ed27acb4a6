//! Environment variable interpolation for configuration

use super::error::ConfigError;
use super::schema::GenlinkConfig;
use super::secrets::SecretString;
use super::validator::ENV_VAR_PATTERN;
use std::env;

/// Replace every `${VAR}` in `value` with the variable's value
pub fn interpolate(value: &str) -> Result<String, ConfigError> {
    let mut result = String::with_capacity(value.len());
    let mut last = 0;

    for cap in ENV_VAR_PATTERN.captures_iter(value) {
        let Some(full_match) = cap.get(0) else {
            continue;
        };
        let var_name = &cap[1];
        let resolved = env::var(var_name).map_err(|_| ConfigError::MissingEnvVar {
            var: var_name.to_string(),
        })?;

        result.push_str(&value[last..full_match.start()]);
        result.push_str(&resolved);
        last = full_match.end();
    }

    result.push_str(&value[last..]);
    Ok(result)
}

/// Interpolate the string fields of every enabled provider.
///
/// Disabled providers keep their placeholders, so an unset key for a
/// backend that is switched off does not fail the load.
pub fn interpolate_config_env_vars(config: &mut GenlinkConfig) -> Result<(), ConfigError> {
    for provider in config.providers.iter_mut().filter(|p| p.enabled) {
        let api_key = provider.api_key.expose_secret();
        if ENV_VAR_PATTERN.is_match(api_key) {
            provider.api_key = SecretString::new(interpolate(api_key)?);
        }

        for field in [
            &mut provider.base_url,
            &mut provider.model,
            &mut provider.organization,
        ] {
            if let Some(value) = field {
                if ENV_VAR_PATTERN.is_match(value) {
                    *value = interpolate(value)?;
                }
            }
        }
    }

    Ok(())
}
