//! OpenAI provider adapter
//!
//! Talks to the Chat Completions API (`POST /v1/chat/completions`).

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
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

pub const NAME: &str = "openai";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    #[serde(default)]
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl ChatCompletionResponse {
    /// Content of the first choice, or `None` when absent or empty
    fn into_text(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .filter(|content| !content.is_empty())
    }
}

/// OpenAI adapter. Holds one HTTP client and never mutates after construction.
#[derive(Debug)]
pub struct OpenAIAdapter {
    http: HttpClient,
    headers: HeaderMap,
    url: String,
    model: String,
    generation_retry: RetryConfig,
    validation_retry: RetryConfig,
}

impl OpenAIAdapter {
    pub fn new(config: AdapterConfig) -> Result<Self, BuildError> {
        let api_key = config.api_key.expose_secret();
        if api_key.trim().is_empty() {
            return Err(BuildError::MissingApiKey { provider: NAME });
        }

        let mut headers = HeaderMap::new();
        let mut bearer = HeaderValue::from_str(&format!("Bearer {}", api_key)).map_err(|_| {
            BuildError::InvalidHeader {
                provider: NAME,
                header: "Authorization",
            }
        })?;
        bearer.set_sensitive(true);
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(organization) = &config.organization {
            let value =
                HeaderValue::from_str(organization).map_err(|_| BuildError::InvalidHeader {
                    provider: NAME,
                    header: "OpenAI-Organization",
                })?;
            headers.insert("OpenAI-Organization", value);
        }

        let base_url = config.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);

        Ok(Self {
            http: HttpClient::new()?,
            headers,
            url: endpoint_url(NAME, base_url, "/chat/completions")?,
            model: config.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            generation_retry: config.generation_retry,
            validation_retry: config.validation_retry,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// A single Chat Completions call, without retry or deadline
    async fn complete(&self, prompt: &str, params: GenerationParams) -> Result<String, RawError> {
        let body = ChatCompletionRequest {
            model: &self.model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens: params.max_tokens,
            temperature: params.temperature,
        };

        let response: ChatCompletionResponse = self
            .http
            .post_json(NAME, &self.url, &self.headers, &body)
            .await?;

        response.into_text().ok_or_else(|| {
            RawError::UnusableResponse("first choice contained no message content".to_string())
        })
    }
}

#[async_trait]
impl ProviderAdapter for OpenAIAdapter {
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
