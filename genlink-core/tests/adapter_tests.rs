//! Integration tests for the Anthropic and OpenAI adapters against mock servers

use genlink_core::protocol::GenerationRequest;
use genlink_core::providers::{
    AdapterConfig, AnthropicAdapter, ErrorKind, OpenAIAdapter, ProviderAdapter, ProviderError,
    RetryConfig, AI_API, FAST_OPERATION,
};
use serde_json::json;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_partial_json, body_string_contains, header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Same attempt ceiling as `policy`, with millisecond backoff
fn fast(policy: RetryConfig) -> RetryConfig {
    RetryConfig {
        base_delay_ms: 5,
        max_delay_ms: 20,
        ..policy
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn anthropic(server: &MockServer) -> AnthropicAdapter {
    init_tracing();
    AnthropicAdapter::new(
        AdapterConfig::new("sk-ant-test")
            .with_base_url(format!("{}/v1", server.uri()))
            .with_generation_retry(fast(AI_API))
            .with_validation_retry(fast(FAST_OPERATION)),
    )
    .unwrap()
}

fn openai(server: &MockServer) -> OpenAIAdapter {
    init_tracing();
    OpenAIAdapter::new(
        AdapterConfig::new("sk-test")
            .with_base_url(format!("{}/v1", server.uri()))
            .with_organization("org-test")
            .with_generation_retry(fast(AI_API))
            .with_validation_retry(fast(FAST_OPERATION)),
    )
    .unwrap()
}

fn anthropic_text(text: &str) -> serde_json::Value {
    json!({
        "id": "msg_01",
        "type": "message",
        "role": "assistant",
        "content": [{ "type": "text", "text": text }],
        "stop_reason": "end_turn"
    })
}

fn openai_text(text: &str) -> serde_json::Value {
    json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": text },
            "finish_reason": "stop"
        }]
    })
}

async fn request_count(server: &MockServer) -> usize {
    server.received_requests().await.unwrap_or_default().len()
}

#[tokio::test]
async fn test_anthropic_generate_sends_headers_and_defaults() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .and(header("x-api-key", "sk-ant-test"))
        .and(header("anthropic-version", "2023-06-01"))
        .and(header_exists("x-request-id"))
        .and(body_partial_json(json!({
            "max_tokens": 1024,
            "temperature": 0.7,
            "messages": [{ "role": "user", "content": "Hello" }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(anthropic_text("Hi there!")))
        .expect(1)
        .mount(&server)
        .await;

    let adapter = anthropic(&server);
    let request = GenerationRequest::new("Hello").unwrap();

    assert_eq!(adapter.generate(&request).await.unwrap(), "Hi there!");
}

#[tokio::test]
async fn test_openai_generate_sends_headers_and_options() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(header("openai-organization", "org-test"))
        .and(body_partial_json(json!({
            "model": "gpt-4o-mini",
            "max_tokens": 64,
            "temperature": 0.0
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(openai_text("Hello from OpenAI")))
        .expect(1)
        .mount(&server)
        .await;

    let adapter = openai(&server);
    let request = GenerationRequest::builder("Hello")
        .max_tokens(64)
        .temperature(0.0)
        .build()
        .unwrap();

    assert_eq!(adapter.generate(&request).await.unwrap(), "Hello from OpenAI");
}

#[tokio::test]
async fn test_slow_backend_times_out_with_configured_deadline() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(anthropic_text("too late"))
                .set_delay(Duration::from_millis(1000)),
        )
        .mount(&server)
        .await;

    let adapter = anthropic(&server);
    let request = GenerationRequest::builder("Hello")
        .timeout_ms(10)
        .build()
        .unwrap();

    let err = adapter.generate(&request).await.unwrap_err();
    assert_eq!(err, ProviderError::timeout("anthropic", 10));
    assert_eq!(err.timeout_ms(), Some(10));
    assert_eq!(err.status_code(), 504);
}

#[tokio::test]
async fn test_timeout_is_retried_up_to_max_attempts() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(openai_text("too late"))
                .set_delay(Duration::from_millis(2000)),
        )
        .mount(&server)
        .await;

    let adapter = openai(&server);
    let request = GenerationRequest::builder("Hello")
        .timeout_ms(200)
        .build()
        .unwrap();

    let err = adapter.generate(&request).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Timeout);
    assert_eq!(request_count(&server).await, AI_API.max_attempts as usize);
}

#[tokio::test]
async fn test_validate_with_rejected_key_returns_false() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "type": "error",
            "error": { "type": "authentication_error", "message": "invalid x-api-key" }
        })))
        .mount(&server)
        .await;

    let adapter = anthropic(&server);

    assert!(!adapter.validate().await);
    assert_eq!(request_count(&server).await, FAST_OPERATION.max_attempts as usize);
}

#[tokio::test]
async fn test_validate_uses_minimal_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_partial_json(json!({ "max_tokens": 1 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(openai_text("pong")))
        .expect(1)
        .mount(&server)
        .await;

    assert!(openai(&server).validate().await);
}

#[tokio::test]
async fn test_validate_accepts_response_without_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "content": [] })))
        .expect(1)
        .mount(&server)
        .await;

    assert!(anthropic(&server).validate().await);
}

#[tokio::test]
async fn test_empty_content_is_invalid_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(openai_text("")))
        .mount(&server)
        .await;

    let adapter = openai(&server);
    let request = GenerationRequest::new("Hello").unwrap();

    let err = adapter.generate(&request).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidResponse);
    assert_eq!(err.provider(), "openai");
}

#[tokio::test]
async fn test_missing_text_blocks_is_invalid_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": [{ "type": "tool_use", "id": "toolu_1", "name": "x", "input": {} }]
        })))
        .mount(&server)
        .await;

    let adapter = anthropic(&server);
    let request = GenerationRequest::new("Hello").unwrap();

    let err = adapter.generate(&request).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidResponse);
}

#[tokio::test]
async fn test_malformed_body_is_invalid_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
        .mount(&server)
        .await;

    let request = GenerationRequest::new("Hello").unwrap();
    let err = openai(&server).generate(&request).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidResponse);
}

#[tokio::test]
async fn test_rate_limit_is_classified_after_retries() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "error": { "message": "Rate limit reached for requests", "type": "requests" }
        })))
        .mount(&server)
        .await;

    let request = GenerationRequest::new("Hello").unwrap();
    let err = openai(&server).generate(&request).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::RateLimited);
    assert_eq!(err.message(), "Rate limit reached for requests");
    assert_eq!(request_count(&server).await, AI_API.max_attempts as usize);
}

#[tokio::test]
async fn test_transient_only_policy_stops_on_rejected_key() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": { "message": "Incorrect API key provided", "type": "invalid_request_error" }
        })))
        .mount(&server)
        .await;

    init_tracing();
    let adapter = OpenAIAdapter::new(
        AdapterConfig::new("sk-test")
            .with_base_url(format!("{}/v1", server.uri()))
            .with_generation_retry(fast(AI_API).transient_only()),
    )
    .unwrap();

    let request = GenerationRequest::new("Hello").unwrap();
    let err = adapter.generate(&request).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Unauthorized);
    assert_eq!(err.message(), "Incorrect API key provided");
    assert_eq!(request_count(&server).await, 1);
}

#[tokio::test]
async fn test_transient_failures_recover() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(529).set_body_json(json!({
            "type": "error",
            "error": { "type": "overloaded_error", "message": "Overloaded" }
        })))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(anthropic_text("recovered")))
        .mount(&server)
        .await;

    let request = GenerationRequest::new("Hello").unwrap();
    let text = anthropic(&server).generate(&request).await.unwrap();

    assert_eq!(text, "recovered");
    assert_eq!(request_count(&server).await, 3);
}

#[tokio::test]
async fn test_concurrent_calls_are_independent() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_string_contains("retry me"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_string_contains("retry me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(openai_text("eventually")))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_string_contains("answer now"))
        .respond_with(ResponseTemplate::new(200).set_body_json(openai_text("immediately")))
        .mount(&server)
        .await;

    let adapter = openai(&server);
    let slow = GenerationRequest::new("retry me").unwrap();
    let quick = GenerationRequest::new("answer now").unwrap();

    let (slow_result, quick_result) = tokio::join!(adapter.generate(&slow), adapter.generate(&quick));

    assert_eq!(slow_result.unwrap(), "eventually");
    assert_eq!(quick_result.unwrap(), "immediately");
    assert_eq!(request_count(&server).await, 4);
}

#[tokio::test]
async fn test_unreachable_backend_is_unavailable() {
    init_tracing();
    let adapter = OpenAIAdapter::new(
        AdapterConfig::new("sk-test")
            .with_base_url("http://127.0.0.1:1/v1")
            .with_generation_retry(fast(AI_API)),
    )
    .unwrap();

    let request = GenerationRequest::new("Hello").unwrap();
    let err = adapter.generate(&request).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ProviderUnavailable);
    assert_eq!(err.status_code(), 500);
}

#[tokio::test]
async fn test_caller_cancellation_stops_the_call() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(anthropic_text("too late"))
                .set_delay(Duration::from_millis(2000)),
        )
        .mount(&server)
        .await;

    let adapter = anthropic(&server);
    let request = GenerationRequest::new("Hello").unwrap();
    let cancel = CancellationToken::new();

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        trigger.cancel();
    });

    let err = adapter
        .generate_with_cancel(&request, &cancel)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Unknown);
    assert!(err.message().contains("cancelled"));
    assert_eq!(request_count(&server).await, 1);
}
