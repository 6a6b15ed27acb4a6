//! Classification of raw provider failures into [`ProviderError`]
//!
//! Adapters collect whatever went wrong during an attempt as a [`RawError`]
//! and hand it to [`classify`]. The mapping is pure and does no logging.

use crate::http::error::error_message_from_body;
use crate::providers::error::ProviderError;
use thiserror::Error;

/// Failure of a single attempt, before normalization
#[derive(Debug, Error)]
pub enum RawError {
    /// The adapter's own deadline fired while the call was in flight
    #[error("deadline of {timeout_ms} ms elapsed")]
    DeadlineElapsed { timeout_ms: u64 },

    /// The caller's cancellation token fired
    #[error("request cancelled by caller")]
    CallerCancelled,

    /// Already normalized by an inner layer
    #[error(transparent)]
    Normalized(#[from] ProviderError),

    /// Non-2xx response
    #[error("HTTP {status}")]
    Http { status: u16, body: String },

    /// Failure inside the HTTP client
    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    /// Response body was not the JSON shape the backend documents
    #[error(transparent)]
    Decode(#[from] serde_json::Error),

    /// Response arrived but cannot be used (no text, oversized)
    #[error("{0}")]
    UnusableResponse(String),

    /// Anything else
    #[error("{0}")]
    Other(String),
}

/// Map a raw failure onto the normalized taxonomy.
///
/// Rules apply in order: own deadline, already normalized, 401/403,
/// 429 or rate-limit wording, 5xx or connection failure, unusable
/// response, everything else.
pub fn classify(provider: &str, raw: impl Into<RawError>) -> ProviderError {
    match raw.into() {
        RawError::DeadlineElapsed { timeout_ms } => ProviderError::timeout(provider, timeout_ms),
        RawError::Normalized(err) => err,
        RawError::Http { status, body } => {
            let message =
                error_message_from_body(&body).unwrap_or_else(|| format!("HTTP error {}", status));
            classify_status(provider, status, message)
        }
        RawError::Transport(err) => classify_transport(provider, err),
        RawError::Decode(err) => ProviderError::invalid_response(
            provider,
            format!("response body could not be decoded: {}", err),
        ),
        RawError::UnusableResponse(detail) => ProviderError::invalid_response(provider, detail),
        RawError::CallerCancelled => ProviderError::unknown(provider, "request cancelled by caller"),
        RawError::Other(message) => classify_message(provider, message),
    }
}

fn classify_status(provider: &str, status: u16, message: String) -> ProviderError {
    match status {
        401 | 403 => ProviderError::unauthorized(provider, message),
        429 => ProviderError::rate_limited(provider, message),
        _ if mentions_rate_limit(&message) => ProviderError::rate_limited(provider, message),
        500..=599 => ProviderError::unavailable(provider, message),
        _ => ProviderError::unknown(provider, format!("HTTP {}: {}", status, message)),
    }
}

fn classify_transport(provider: &str, err: reqwest::Error) -> ProviderError {
    if let Some(status) = err.status() {
        return classify_status(provider, status.as_u16(), err.to_string());
    }

    if err.is_connect() || err.is_timeout() || err.is_request() {
        return ProviderError::unavailable(provider, format!("connection failed: {}", err));
    }

    if err.is_decode() || err.is_body() {
        return ProviderError::invalid_response(
            provider,
            format!("response body could not be read: {}", err),
        );
    }

    classify_message(provider, err.to_string())
}

fn classify_message(provider: &str, message: String) -> ProviderError {
    if mentions_rate_limit(&message) {
        ProviderError::rate_limited(provider, message)
    } else if mentions_connection_failure(&message) {
        ProviderError::unavailable(provider, message)
    } else {
        ProviderError::unknown(provider, message)
    }
}

fn mentions_rate_limit(message: &str) -> bool {
    let lower = message.to_lowercase();
    lower.contains("rate limit")
        || lower.contains("rate_limit")
        || lower.contains("ratelimit")
        || lower.contains("too many requests")
}

fn mentions_connection_failure(message: &str) -> bool {
    let lower = message.to_lowercase();
    [
        "connection refused",
        "connection reset",
        "econnrefused",
        "econnreset",
        "enotfound",
        "dns error",
    ]
    .iter()
    .any(|pattern| lower.contains(pattern))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::error::ErrorKind;
    use test_case::test_case;

    fn http(status: u16, body: &str) -> RawError {
        RawError::Http {
            status,
            body: body.to_string(),
        }
    }

    #[test_case(401, ErrorKind::Unauthorized ; "unauthorized")]
    #[test_case(403, ErrorKind::Unauthorized ; "forbidden")]
    #[test_case(429, ErrorKind::RateLimited ; "too many requests")]
    #[test_case(500, ErrorKind::ProviderUnavailable ; "internal error")]
    #[test_case(503, ErrorKind::ProviderUnavailable ; "service unavailable")]
    #[test_case(529, ErrorKind::ProviderUnavailable ; "anthropic overloaded")]
    #[test_case(400, ErrorKind::Unknown ; "bad request")]
    #[test_case(404, ErrorKind::Unknown ; "not found")]
    fn test_status_codes(status: u16, expected: ErrorKind) {
        assert_eq!(classify("openai", http(status, "")).kind(), expected);
    }

    #[test]
    fn test_deadline_becomes_timeout_with_configured_ms() {
        let err = classify("anthropic", RawError::DeadlineElapsed { timeout_ms: 10 });
        assert_eq!(err, ProviderError::timeout("anthropic", 10));
    }

    #[test]
    fn test_caller_cancellation_is_not_a_timeout() {
        let err = classify("anthropic", RawError::CallerCancelled);
        assert_eq!(err.kind(), ErrorKind::Unknown);
        assert!(err.message().contains("cancelled"));
    }

    #[test]
    fn test_normalized_errors_pass_through() {
        let original = ProviderError::unauthorized("openai", "bad key");
        assert_eq!(classify("anthropic", original.clone()), original);

        let twice = classify("openai", classify("openai", http(429, "")));
        assert_eq!(twice, classify("openai", http(429, "")));
    }

    #[test]
    fn test_rate_limit_wording_without_429() {
        let err = classify("openai", http(400, r#"{"error":{"message":"Rate limit reached"}}"#));
        assert_eq!(err.kind(), ErrorKind::RateLimited);

        let err = classify("openai", RawError::Other("Too Many Requests".to_string()));
        assert_eq!(err.kind(), ErrorKind::RateLimited);
    }

    #[test]
    fn test_body_message_is_preserved() {
        let err = classify(
            "anthropic",
            http(401, r#"{"error":{"type":"authentication_error","message":"invalid x-api-key"}}"#),
        );
        assert_eq!(err.message(), "invalid x-api-key");
    }

    #[test]
    fn test_unusable_responses_are_invalid() {
        let decode = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        assert_eq!(classify("openai", decode).kind(), ErrorKind::InvalidResponse);

        let missing = RawError::UnusableResponse("no text content".to_string());
        assert_eq!(classify("openai", missing).kind(), ErrorKind::InvalidResponse);
    }

    #[test]
    fn test_connection_wording_is_unavailable() {
        let err = classify("openai", RawError::Other("connect ECONNREFUSED 127.0.0.1".into()));
        assert_eq!(err.kind(), ErrorKind::ProviderUnavailable);
    }

    #[test]
    fn test_unrecognized_message_is_preserved() {
        let err = classify("openai", RawError::Other("something odd".to_string()));
        assert_eq!(err, ProviderError::unknown("openai", "something odd"));
    }
}
