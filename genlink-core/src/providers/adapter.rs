//! Provider adapter trait and shared attempt logic
//!
//! Defines the capability every backend exposes and the retry/deadline
//! plumbing the concrete adapters share.

use crate::config::SecretString;
use crate::protocol::GenerationRequest;
use crate::providers::classify::{classify, RawError};
use crate::providers::deadline::run_with_deadline;
use crate::providers::error::ProviderResult;
use crate::providers::retry::{RetryConfig, RetryExecutor, AI_API, FAST_OPERATION};
use async_trait::async_trait;
use std::future::Future;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Token budget applied when the caller sets none
pub const DEFAULT_MAX_TOKENS: u32 = 1024;

/// Temperature applied when the caller sets none
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Per-attempt timeout applied when the caller sets none
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Prompt and budget used by `validate()`
const VALIDATION_PROMPT: &str = "ping";
const VALIDATION_MAX_TOKENS: u32 = 1;
const VALIDATION_TIMEOUT_MS: u64 = 10_000;

/// Core trait that all provider adapters implement
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// Stable provider identifier ("anthropic", "openai", ...)
    fn name(&self) -> &str;

    /// Generate text for `request`, retrying under the generation policy
    async fn generate(&self, request: &GenerationRequest) -> ProviderResult<String> {
        self.generate_with_cancel(request, &CancellationToken::new())
            .await
    }

    /// Like [`generate`](Self::generate), but stops as soon as `cancel` fires
    async fn generate_with_cancel(
        &self,
        request: &GenerationRequest,
        cancel: &CancellationToken,
    ) -> ProviderResult<String>;

    /// Check that the provider answers with the configured key.
    ///
    /// Never fails: an unreachable or rejecting provider yields `false`.
    async fn validate(&self) -> bool;
}

/// Request values after defaults are applied
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout_ms: u64,
}

impl GenerationParams {
    /// Fill unset request options with the adapter defaults
    pub fn resolve(request: &GenerationRequest) -> Self {
        Self {
            max_tokens: request.max_tokens().unwrap_or(DEFAULT_MAX_TOKENS),
            temperature: request.temperature().unwrap_or(DEFAULT_TEMPERATURE),
            timeout_ms: request.timeout_ms().unwrap_or(DEFAULT_TIMEOUT_MS),
        }
    }

    fn validation() -> Self {
        Self {
            max_tokens: VALIDATION_MAX_TOKENS,
            temperature: 0.0,
            timeout_ms: VALIDATION_TIMEOUT_MS,
        }
    }
}

/// Errors raised while constructing an adapter
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("{provider}: API key must not be empty")]
    MissingApiKey { provider: &'static str },

    #[error("{provider}: {header} header value contains invalid characters")]
    InvalidHeader {
        provider: &'static str,
        header: &'static str,
    },

    #[error("{provider}: invalid base URL '{url}': {source}")]
    InvalidBaseUrl {
        provider: &'static str,
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("failed to create HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Construction settings shared by every adapter
#[derive(Debug, Clone)]
pub struct AdapterConfig {
    pub api_key: SecretString,
    pub base_url: Option<String>,
    pub model: Option<String>,
    /// OpenAI organization header; ignored by other backends
    pub organization: Option<String>,
    pub generation_retry: RetryConfig,
    pub validation_retry: RetryConfig,
}

impl AdapterConfig {
    pub fn new(api_key: impl Into<SecretString>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: None,
            model: None,
            organization: None,
            generation_retry: AI_API,
            validation_retry: FAST_OPERATION,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_organization(mut self, organization: impl Into<String>) -> Self {
        self.organization = Some(organization.into());
        self
    }

    pub fn with_generation_retry(mut self, retry: RetryConfig) -> Self {
        self.generation_retry = retry;
        self
    }

    pub fn with_validation_retry(mut self, retry: RetryConfig) -> Self {
        self.validation_retry = retry;
        self
    }
}

/// Join a base URL and an endpoint path, checking the base parses
pub(crate) fn endpoint_url(
    provider: &'static str,
    base_url: &str,
    path: &str,
) -> Result<String, BuildError> {
    url::Url::parse(base_url).map_err(|source| BuildError::InvalidBaseUrl {
        provider,
        url: base_url.to_string(),
        source,
    })?;

    Ok(format!("{}{}", base_url.trim_end_matches('/'), path))
}

/// Run one backend call per attempt under a deadline, retrying per `retry`.
pub(crate) async fn generate_with_retry<F, Fut>(
    provider: &str,
    retry: RetryConfig,
    request: &GenerationRequest,
    cancel: &CancellationToken,
    call: F,
) -> ProviderResult<String>
where
    F: Fn(GenerationParams) -> Fut,
    Fut: Future<Output = Result<String, RawError>>,
{
    let params = GenerationParams::resolve(request);

    RetryExecutor::new(retry)
        .execute_cancellable(cancel, |attempt| {
            let call = call(params);
            async move {
                debug!(provider, attempt, timeout_ms = params.timeout_ms, "generation attempt");
                run_with_deadline(params.timeout_ms, cancel, call)
                    .await
                    .map_err(|raw| classify(provider, raw))
            }
        })
        .await
}

/// Issue a minimal generation under `retry` and report whether it succeeded.
///
/// A response without text still proves the key and connectivity, so it
/// counts as valid.
pub(crate) async fn validate_with_retry<F, Fut>(provider: &str, retry: RetryConfig, call: F) -> bool
where
    F: Fn(&'static str, GenerationParams) -> Fut,
    Fut: Future<Output = Result<String, RawError>>,
{
    let params = GenerationParams::validation();
    let cancel = CancellationToken::new();

    let result = RetryExecutor::new(retry)
        .execute_cancellable(&cancel, |attempt| {
            let call = call(VALIDATION_PROMPT, params);
            let cancel = &cancel;
            async move {
                debug!(provider, attempt, "validation attempt");
                match run_with_deadline(params.timeout_ms, cancel, call).await {
                    Ok(_) | Err(RawError::UnusableResponse(_)) => Ok(()),
                    Err(raw) => Err(classify(provider, raw)),
                }
            }
        })
        .await;

    match result {
        Ok(()) => {
            info!(provider, "provider connection validated");
            true
        }
        Err(error) => {
            warn!(provider, kind = ?error.kind(), "provider validation failed: {}", error);
            false
        }
    }
}
