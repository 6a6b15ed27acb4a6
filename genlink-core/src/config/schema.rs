//! Configuration schema structures with serde support

use super::error::{ValidationError, ValidationErrorKind};
use super::secrets::SecretString;
use crate::providers::retry::{RetryConfig, AI_API, FAST_OPERATION};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Schema version this crate understands
pub const SUPPORTED_VERSION: &str = "0.1";

/// Root configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GenlinkConfig {
    /// Schema version (required - no default)
    pub version: String,

    /// Name of the provider that serves calls
    pub provider: String,

    /// Configured providers
    #[serde(default)]
    pub providers: Vec<ProviderSettings>,

    /// Retry policy overrides
    #[serde(default)]
    pub retry: RetrySettings,
}

/// One provider entry
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderSettings {
    /// Unique provider name
    pub name: String,

    /// Backend type
    #[serde(rename = "type")]
    pub provider_type: ProviderType,

    /// API key (supports environment variable interpolation)
    pub api_key: SecretString,

    /// Override for the backend's API base URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Override for the adapter's default model
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// OpenAI organization id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,

    /// Whether this provider is built at startup
    #[serde(default = "default_true")]
    pub enabled: bool,
}

/// Supported backend types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderType {
    Anthropic,
    OpenAI,
}

impl ProviderType {
    /// Canonical provider name
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderType::Anthropic => crate::providers::anthropic::NAME,
            ProviderType::OpenAI => crate::providers::openai::NAME,
        }
    }
}

/// Retry overrides; unset entries fall back to the canonical configs
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RetrySettings {
    /// Policy for `generate`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generation: Option<RetryConfig>,

    /// Policy for `validate`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<RetryConfig>,
}

impl RetrySettings {
    pub fn generation_or_default(&self) -> RetryConfig {
        self.generation.unwrap_or(AI_API)
    }

    pub fn validation_or_default(&self) -> RetryConfig {
        self.validation.unwrap_or(FAST_OPERATION)
    }
}

fn default_true() -> bool {
    true
}

impl GenlinkConfig {
    /// Check the rules that need no environment or cross-field lookups
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.version != SUPPORTED_VERSION {
            return Err(ValidationError::at(
                "version",
                ValidationErrorKind::UnsupportedVersion {
                    found: self.version.clone(),
                    supported: SUPPORTED_VERSION,
                },
            ));
        }

        if self.providers.is_empty() {
            return Err(ValidationError::at("providers", ValidationErrorKind::NoProviders));
        }

        let mut seen_names = HashSet::new();
        for (i, provider) in self.providers.iter().enumerate() {
            let path = format!("providers[{}]", i);
            if !seen_names.insert(provider.name.as_str()) {
                return Err(ValidationError::at(
                    format!("{}.name", path),
                    ValidationErrorKind::DuplicateName(provider.name.clone()),
                ));
            }
            provider.validate(&path)?;
        }

        if self.provider.trim().is_empty() {
            return Err(ValidationError::at("provider", ValidationErrorKind::NoSelection));
        }

        Ok(())
    }
}

impl ProviderSettings {
    /// Check one provider entry; `path` locates it in error reports
    pub fn validate(&self, path: &str) -> Result<(), ValidationError> {
        let at = |key: &str, kind: ValidationErrorKind| -> Result<(), ValidationError> {
            Err(ValidationError::at(format!("{}.{}", path, key), kind))
        };

        if self.name.trim().is_empty() {
            return at("name", ValidationErrorKind::EmptyName);
        }

        // A disabled provider may omit its key
        if self.enabled && self.api_key.expose_secret().trim().is_empty() {
            return at("api_key", ValidationErrorKind::EmptyApiKey);
        }

        if let Some(base_url) = &self.base_url {
            match url::Url::parse(base_url) {
                Ok(url) if matches!(url.scheme(), "http" | "https") => {}
                Ok(url) => {
                    return at(
                        "base_url",
                        ValidationErrorKind::BadBaseUrl(format!(
                            "scheme '{}' is not http or https",
                            url.scheme()
                        )),
                    )
                }
                Err(e) => return at("base_url", ValidationErrorKind::BadBaseUrl(e.to_string())),
            }
        }

        if self.model.as_deref().is_some_and(|m| m.trim().is_empty()) {
            return at("model", ValidationErrorKind::BlankModel);
        }

        Ok(())
    }
}
