//! Genlink Core Library
//!
//! A uniform, resilient way to ask a hosted language model for a text
//! completion. One adapter per backend (Anthropic, OpenAI) translates a
//! provider-neutral [`GenerationRequest`] into the backend's HTTP API, bounds
//! each attempt with a deadline, retries with exponential backoff, and
//! normalizes every failure into a [`ProviderError`].

pub mod config;
pub mod http;
pub mod protocol;
pub mod providers;

pub use config::{load_from_json, load_from_yaml, ConfigError, GenlinkConfig, SecretString};
pub use protocol::{GenerationOptions, GenerationRequest, RequestError};
pub use providers::{
    AdapterConfig, ErrorKind, ProviderAdapter, ProviderError, ProviderFacade, ProviderResult,
    RetryConfig, AI_API, FAST_OPERATION,
};

/// Returns the version of the Genlink Core library.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
