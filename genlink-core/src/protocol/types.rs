//! Core protocol types for generation calls
//!
//! A [`GenerationRequest`] is built once per call and never mutated. Options the
//! caller leaves unset stay unset here; provider adapters fill in their
//! defaults when they translate the request.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Inclusive upper bound accepted for `temperature`.
pub const MAX_TEMPERATURE: f32 = 2.0;

/// Errors raised while building a request from caller input
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RequestError {
    /// The prompt was empty or whitespace only
    #[error("prompt must not be empty")]
    EmptyPrompt,

    /// `max_tokens` was zero
    #[error("max_tokens must be a positive integer")]
    ZeroMaxTokens,

    /// `temperature` outside `[0, 2]` or not a number
    #[error("temperature must be within [0, 2], got {0}")]
    TemperatureOutOfRange(f32),

    /// `timeout_ms` was zero
    #[error("timeout must be a positive number of milliseconds")]
    ZeroTimeout,
}

/// Optional knobs a caller may pass alongside a prompt
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationOptions {
    /// Upper bound on generated tokens
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Sampling temperature
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Per-attempt timeout in milliseconds
    #[serde(default, rename = "timeout", skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

/// Caller-facing input contract: `{ prompt, options? }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationInput {
    pub prompt: String,

    #[serde(default)]
    pub options: GenerationOptions,
}

/// A validated, immutable generation request
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    prompt: String,
    options: GenerationOptions,
}

impl GenerationRequest {
    /// Create a request with no options set
    pub fn new(prompt: impl Into<String>) -> Result<Self, RequestError> {
        Self::with_options(prompt, GenerationOptions::default())
    }

    /// Create a request with explicit options, validating every range
    pub fn with_options(
        prompt: impl Into<String>,
        options: GenerationOptions,
    ) -> Result<Self, RequestError> {
        let prompt = prompt.into();
        if prompt.trim().is_empty() {
            return Err(RequestError::EmptyPrompt);
        }

        if options.max_tokens == Some(0) {
            return Err(RequestError::ZeroMaxTokens);
        }

        if let Some(temperature) = options.temperature {
            // NaN fails the range check as well
            if !(0.0..=MAX_TEMPERATURE).contains(&temperature) {
                return Err(RequestError::TemperatureOutOfRange(temperature));
            }
        }

        if options.timeout_ms == Some(0) {
            return Err(RequestError::ZeroTimeout);
        }

        Ok(Self { prompt, options })
    }

    /// Start a builder for the given prompt
    pub fn builder(prompt: impl Into<String>) -> GenerationRequestBuilder {
        GenerationRequestBuilder {
            prompt: prompt.into(),
            options: GenerationOptions::default(),
        }
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn max_tokens(&self) -> Option<u32> {
        self.options.max_tokens
    }

    pub fn temperature(&self) -> Option<f32> {
        self.options.temperature
    }

    pub fn timeout_ms(&self) -> Option<u64> {
        self.options.timeout_ms
    }

    pub fn options(&self) -> &GenerationOptions {
        &self.options
    }
}

impl TryFrom<GenerationInput> for GenerationRequest {
    type Error = RequestError;

    fn try_from(input: GenerationInput) -> Result<Self, Self::Error> {
        Self::with_options(input.prompt, input.options)
    }
}

/// Fluent builder for [`GenerationRequest`]
#[derive(Debug, Clone)]
pub struct GenerationRequestBuilder {
    prompt: String,
    options: GenerationOptions,
}

impl GenerationRequestBuilder {
    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.options.max_tokens = Some(max_tokens);
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.options.temperature = Some(temperature);
        self
    }

    pub fn timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.options.timeout_ms = Some(timeout_ms);
        self
    }

    /// Validate and build the request
    pub fn build(self) -> Result<GenerationRequest, RequestError> {
        GenerationRequest::with_options(self.prompt, self.options)
    }
}
