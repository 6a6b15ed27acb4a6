//! HTTP client implementation using reqwest

use crate::providers::classify::RawError;
use reqwest::header::HeaderMap;
use reqwest::{Client, ClientBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Maximum response size (10MB)
const MAX_RESPONSE_SIZE: usize = 10 * 1024 * 1024;

/// Default user agent
const USER_AGENT: &str = concat!("genlink/", env!("CARGO_PKG_VERSION"));

/// Shared HTTP client with connection pooling.
///
/// There is no overall request timeout here: each attempt is bounded by the
/// adapter's deadline, which drops the in-flight future.
#[derive(Debug, Clone)]
pub struct HttpClient {
    /// The underlying reqwest client (internally reference counted)
    client: Client,

    /// Maximum response size to prevent OOM
    max_response_size: usize,
}

impl HttpClient {
    /// Create a new HTTP client with default settings
    pub fn new() -> Result<Self, reqwest::Error> {
        Self::with_config(Duration::from_secs(10), 10)
    }

    /// Create a new HTTP client with custom pool and connect settings
    pub fn with_config(
        connect_timeout: Duration,
        max_idle_per_host: usize,
    ) -> Result<Self, reqwest::Error> {
        let client = ClientBuilder::new()
            .pool_max_idle_per_host(max_idle_per_host)
            .pool_idle_timeout(Duration::from_secs(90))
            .connect_timeout(connect_timeout)
            .user_agent(USER_AGENT)
            .gzip(true)
            .build()?;

        Ok(Self {
            client,
            max_response_size: MAX_RESPONSE_SIZE,
        })
    }

    /// POST a JSON body and decode a JSON response.
    ///
    /// Non-2xx answers come back as [`RawError::Http`] with the body kept for
    /// classification. Every call carries a fresh `X-Request-ID`.
    pub async fn post_json<B, R>(
        &self,
        provider: &str,
        url: &str,
        headers: &HeaderMap,
        body: &B,
    ) -> Result<R, RawError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let request_id = Uuid::new_v4();
        debug!(provider, %request_id, url, "sending request");

        let response = self
            .client
            .post(url)
            .headers(headers.clone())
            .header("X-Request-ID", request_id.to_string())
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = match response.text().await {
                Ok(body) => body,
                Err(e) => {
                    debug!(provider, %request_id, error = %e, "could not read error body");
                    String::new()
                }
            };
            warn!(provider, %request_id, status = status.as_u16(), "request failed");
            return Err(RawError::Http {
                status: status.as_u16(),
                body,
            });
        }

        if let Some(content_length) = response.content_length() {
            if content_length as usize > self.max_response_size {
                return Err(RawError::UnusableResponse(format!(
                    "response size {} exceeds maximum {}",
                    content_length, self.max_response_size
                )));
            }
        }

        let bytes = response.bytes().await?;
        if bytes.len() > self.max_response_size {
            return Err(RawError::UnusableResponse(format!(
                "response size {} exceeds maximum {}",
                bytes.len(),
                self.max_response_size
            )));
        }

        let decoded = serde_json::from_slice(&bytes)?;
        info!(provider, %request_id, "request completed");
        Ok(decoded)
    }
}
