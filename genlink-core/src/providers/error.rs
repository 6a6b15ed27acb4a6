//! Provider error types and handling

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for provider operations
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Normalized failure of a provider call.
///
/// Every variant names the provider it came from. Nothing backend-specific
/// (HTTP client errors, JSON errors, response shapes) leaks past this type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// The adapter's own per-attempt deadline fired
    #[error("{provider}: request timed out after {timeout_ms} ms")]
    Timeout {
        provider: String,
        message: String,
        timeout_ms: u64,
    },

    /// The backend throttled the request
    #[error("{provider}: rate limit exceeded: {message}")]
    RateLimited { provider: String, message: String },

    /// A response arrived but carried no usable text
    #[error("{provider}: invalid response: {message}")]
    InvalidResponse { provider: String, message: String },

    /// The API key was rejected
    #[error("{provider}: unauthorized: {message}")]
    Unauthorized { provider: String, message: String },

    /// 5xx or connection-level failure
    #[error("{provider}: provider unavailable: {message}")]
    ProviderUnavailable { provider: String, message: String },

    /// Anything else, with the raw message preserved
    #[error("{provider}: {message}")]
    Unknown { provider: String, message: String },
}

/// Fieldless mirror of the [`ProviderError`] variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Timeout,
    RateLimited,
    InvalidResponse,
    Unauthorized,
    ProviderUnavailable,
    Unknown,
}

impl ErrorKind {
    /// Status code the HTTP layer should answer with
    pub fn status_code(self) -> u16 {
        match self {
            ErrorKind::Timeout => 504,
            ErrorKind::Unauthorized => 401,
            ErrorKind::RateLimited => 429,
            ErrorKind::InvalidResponse | ErrorKind::ProviderUnavailable | ErrorKind::Unknown => {
                500
            }
        }
    }

    /// Whether a later attempt has a realistic chance of succeeding
    pub fn is_transient(self) -> bool {
        matches!(
            self,
            ErrorKind::Timeout | ErrorKind::RateLimited | ErrorKind::ProviderUnavailable
        )
    }
}

impl ProviderError {
    pub fn timeout(provider: impl Into<String>, timeout_ms: u64) -> Self {
        ProviderError::Timeout {
            provider: provider.into(),
            message: format!("no response within {} ms", timeout_ms),
            timeout_ms,
        }
    }

    pub fn rate_limited(provider: impl Into<String>, message: impl Into<String>) -> Self {
        ProviderError::RateLimited {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn invalid_response(provider: impl Into<String>, message: impl Into<String>) -> Self {
        ProviderError::InvalidResponse {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn unauthorized(provider: impl Into<String>, message: impl Into<String>) -> Self {
        ProviderError::Unauthorized {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn unavailable(provider: impl Into<String>, message: impl Into<String>) -> Self {
        ProviderError::ProviderUnavailable {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn unknown(provider: impl Into<String>, message: impl Into<String>) -> Self {
        ProviderError::Unknown {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ProviderError::Timeout { .. } => ErrorKind::Timeout,
            ProviderError::RateLimited { .. } => ErrorKind::RateLimited,
            ProviderError::InvalidResponse { .. } => ErrorKind::InvalidResponse,
            ProviderError::Unauthorized { .. } => ErrorKind::Unauthorized,
            ProviderError::ProviderUnavailable { .. } => ErrorKind::ProviderUnavailable,
            ProviderError::Unknown { .. } => ErrorKind::Unknown,
        }
    }

    /// Name of the provider this error is attributed to
    pub fn provider(&self) -> &str {
        match self {
            ProviderError::Timeout { provider, .. }
            | ProviderError::RateLimited { provider, .. }
            | ProviderError::InvalidResponse { provider, .. }
            | ProviderError::Unauthorized { provider, .. }
            | ProviderError::ProviderUnavailable { provider, .. }
            | ProviderError::Unknown { provider, .. } => provider,
        }
    }

    /// Human-readable message, safe to log
    pub fn message(&self) -> &str {
        match self {
            ProviderError::Timeout { message, .. }
            | ProviderError::RateLimited { message, .. }
            | ProviderError::InvalidResponse { message, .. }
            | ProviderError::Unauthorized { message, .. }
            | ProviderError::ProviderUnavailable { message, .. }
            | ProviderError::Unknown { message, .. } => message,
        }
    }

    /// Configured deadline, for `Timeout` only
    pub fn timeout_ms(&self) -> Option<u64> {
        match self {
            ProviderError::Timeout { timeout_ms, .. } => Some(*timeout_ms),
            _ => None,
        }
    }

    pub fn is_transient(&self) -> bool {
        self.kind().is_transient()
    }

    pub fn status_code(&self) -> u16 {
        self.kind().status_code()
    }
}
