//! Errors raised while loading a configuration or building the facade from it

use crate::providers::adapter::BuildError;
use crate::providers::retry::RetryConfigError;
use std::path::PathBuf;
use thiserror::Error;

/// Anything that stops a configuration from turning into a working facade
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Syntax or shape error; `line` is 1-based when the parser reports one
    #[error("cannot parse {}: {message}", .path.display())]
    Parse {
        path: PathBuf,
        line: Option<usize>,
        message: String,
    },

    #[error("environment variable {var} referenced by the configuration is not set")]
    MissingEnvVar { var: String },

    #[error("invalid configuration: {0}")]
    Validation(#[from] ValidationError),

    /// The facade cannot pick an adapter to serve calls
    #[error("no provider to serve calls: {message}")]
    Selection { message: String },

    #[error(transparent)]
    Provider(#[from] BuildError),
}

/// A rule the configuration breaks, located by the path of the offending key
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{path}: {kind}")]
pub struct ValidationError {
    /// Dotted path such as `providers[1].api_key` or `retry.generation`
    pub path: String,
    pub kind: ValidationErrorKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationErrorKind {
    #[error("schema version '{found}' is not supported (this build reads \"{supported}\")")]
    UnsupportedVersion {
        found: String,
        supported: &'static str,
    },

    #[error("no providers are declared")]
    NoProviders,

    #[error("provider name must not be empty")]
    EmptyName,

    #[error("provider name '{0}' is declared more than once")]
    DuplicateName(String),

    #[error("an enabled provider needs a non-empty API key")]
    EmptyApiKey,

    #[error("API key still contains the placeholder ${{{0}}}")]
    UnresolvedPlaceholder(String),

    #[error("base URL is unusable: {0}")]
    BadBaseUrl(String),

    #[error("model override must not be blank")]
    BlankModel,

    #[error("no provider selected")]
    NoSelection,

    #[error("selected provider '{0}' is not declared")]
    UnknownSelection(String),

    #[error("selected provider '{0}' is disabled")]
    DisabledSelection(String),

    #[error(transparent)]
    Retry(#[from] RetryConfigError),
}

impl ValidationError {
    pub fn at(path: impl Into<String>, kind: impl Into<ValidationErrorKind>) -> Self {
        Self {
            path: path.into(),
            kind: kind.into(),
        }
    }
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::at("providers[0].api_key", ValidationErrorKind::EmptyApiKey);
        assert_eq!(
            err.to_string(),
            "providers[0].api_key: an enabled provider needs a non-empty API key"
        );

        let err = ValidationError::at(
            "providers[0].api_key",
            ValidationErrorKind::UnresolvedPlaceholder("OPENAI_API_KEY".to_string()),
        );
        assert!(err.to_string().ends_with("placeholder ${OPENAI_API_KEY}"));
    }

    #[test]
    fn test_retry_errors_convert() {
        let err = ValidationError::at("retry.generation", RetryConfigError::NoAttempts);
        assert_eq!(err.kind, ValidationErrorKind::Retry(RetryConfigError::NoAttempts));
        assert_eq!(err.to_string(), "retry.generation: max_attempts must be at least 1");
    }

    #[test]
    fn test_build_error_converts() {
        let err: ConfigError = BuildError::MissingApiKey {
            provider: "openai",
        }
        .into();
        assert!(matches!(err, ConfigError::Provider(_)));
    }
}
