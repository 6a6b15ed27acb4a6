//! Anthropic provider adapter
//!
//! Talks to the Messages API (`POST /v1/messages`).

use crate::http::HttpClient;
use crate::protocol::GenerationRequest;
use crate::providers::adapter::{
    endpoint_url, generate_with_retry, validate_with_retry, AdapterConfig, BuildError,
    GenerationParams, ProviderAdapter,
};
use crate::providers::classify::RawError;
use crate::providers::error::ProviderResult;
use crate::providers::retry::RetryConfig;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

pub const NAME: &str = "anthropic";
pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1";
pub const DEFAULT_MODEL: &str = "claude-3-5-sonnet-latest";
const API_VERSION: &str = "2023-06-01";

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: [UserMessage<'a>; 1],
}

#[derive(Debug, Serialize)]
struct UserMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text { text: String },
    #[serde(other)]
    Other,
}

impl MessagesResponse {
    /// Concatenated text blocks, or `None` when there are none with content
    fn into_text(self) -> Option<String> {
        let text: String = self
            .content
            .into_iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text),
                ContentBlock::Other => None,
            })
            .collect();

        (!text.is_empty()).then_some(text)
    }
}

/// Anthropic adapter. Holds one HTTP client and never mutates after construction.
#[derive(Debug)]
pub struct AnthropicAdapter {
    http: HttpClient,
    headers: HeaderMap,
    url: String,
    model: String,
    generation_retry: RetryConfig,
    validation_retry: RetryConfig,
}

impl AnthropicAdapter {
    pub fn new(config: AdapterConfig) -> Result<Self, BuildError> {
        let api_key = config.api_key.expose_secret();
        if api_key.trim().is_empty() {
            return Err(BuildError::MissingApiKey { provider: NAME });
        }

        let mut headers = HeaderMap::new();
        let mut key = HeaderValue::from_str(api_key).map_err(|_| BuildError::InvalidHeader {
            provider: NAME,
            header: "x-api-key",
        })?;
        key.set_sensitive(true);
        headers.insert("x-api-key", key);
        headers.insert("anthropic-version", HeaderValue::from_static(API_VERSION));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let base_url = config.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);

        Ok(Self {
            http: HttpClient::new()?,
            headers,
            url: endpoint_url(NAME, base_url, "/messages")?,
            model: config.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            generation_retry: config.generation_retry,
            validation_retry: config.validation_retry,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// A single Messages API call, without retry or deadline
    async fn complete(&self, prompt: &str, params: GenerationParams) -> Result<String, RawError> {
        let body = MessagesRequest {
            model: &self.model,
            max_tokens: params.max_tokens,
            temperature: params.temperature,
            messages: [UserMessage {
                role: "user",
                content: prompt,
            }],
        };

        let response: MessagesResponse = self
            .http
            .post_json(NAME, &self.url, &self.headers, &body)
            .await?;

        response.into_text().ok_or_else(|| {
            RawError::UnusableResponse("response contained no text content".to_string())
        })
    }
}

#[async_trait]
impl ProviderAdapter for AnthropicAdapter {
    fn name(&self) -> &str {
        NAME
    }

    async fn generate_with_cancel(
        &self,
        request: &GenerationRequest,
        cancel: &CancellationToken,
    ) -> ProviderResult<String> {
        generate_with_retry(NAME, self.generation_retry, request, cancel, |params| {
            self.complete(request.prompt(), params)
        })
        .await
    }

    async fn validate(&self) -> bool {
        validate_with_retry(NAME, self.validation_retry, |prompt, params| {
            self.complete(prompt, params)
        })
        .await
    }
}
