//! Rules that look across the whole configuration

use super::error::{ValidationError, ValidationErrorKind};
use super::schema::GenlinkConfig;
use regex::Regex;
use std::sync::LazyLock;

/// `${VAR}` placeholder; group 1 is the variable name
pub(crate) static ENV_VAR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").expect("env var pattern is a valid regex")
});

/// Validates a loaded configuration before any adapter is built
#[derive(Debug, Default)]
pub struct ConfigValidator;

impl ConfigValidator {
    pub fn new() -> Self {
        Self
    }

    /// Per-entry schema rules, then selection, placeholders and retry policies
    pub fn validate(&self, config: &GenlinkConfig) -> Result<(), ValidationError> {
        config.validate()?;

        self.check_selection(config)?;
        self.check_placeholders(config)?;
        self.check_retry(config)?;

        Ok(())
    }

    /// The selected provider must be declared and enabled
    fn check_selection(&self, config: &GenlinkConfig) -> Result<(), ValidationError> {
        let selected = &config.provider;
        match config.providers.iter().find(|p| &p.name == selected) {
            None => Err(ValidationError::at(
                "provider",
                ValidationErrorKind::UnknownSelection(selected.clone()),
            )),
            Some(p) if !p.enabled => Err(ValidationError::at(
                "provider",
                ValidationErrorKind::DisabledSelection(selected.clone()),
            )),
            Some(_) => Ok(()),
        }
    }

    /// A `${VAR}` left in an enabled key means interpolation never ran
    fn check_placeholders(&self, config: &GenlinkConfig) -> Result<(), ValidationError> {
        let enabled = config.providers.iter().enumerate().filter(|(_, p)| p.enabled);
        for (i, provider) in enabled {
            if let Some(cap) = ENV_VAR_PATTERN.captures(provider.api_key.expose_secret()) {
                return Err(ValidationError::at(
                    format!("providers[{}].api_key", i),
                    ValidationErrorKind::UnresolvedPlaceholder(cap[1].to_string()),
                ));
            }
        }
        Ok(())
    }

    fn check_retry(&self, config: &GenlinkConfig) -> Result<(), ValidationError> {
        let policies = [
            ("retry.generation", config.retry.generation),
            ("retry.validation", config.retry.validation),
        ];

        for (path, policy) in policies {
            if let Some(policy) = policy {
                policy.validate().map_err(|e| ValidationError::at(path, e))?;
            }
        }
        Ok(())
    }
}
