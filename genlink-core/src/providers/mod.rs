//! Provider adapters and the resilience layer around them
//!
//! Every backend call flows through the same pipeline: per-attempt deadline,
//! classification of the raw failure into a [`ProviderError`], and retry with
//! exponential backoff. The [`ProviderFacade`] routes callers to the adapter
//! chosen at construction.

pub mod adapter;
pub mod anthropic;
pub mod classify;
pub mod deadline;
pub mod error;
pub mod facade;
pub mod openai;
pub mod retry;

pub use adapter::{AdapterConfig, BuildError, GenerationParams, ProviderAdapter};
pub use classify::{classify, RawError};
pub use deadline::{run_with_deadline, Deadline};
pub use error::{ErrorKind, ProviderError, ProviderResult};
pub use facade::{FacadeBuilder, ProviderFacade};
pub use retry::{
    retry_with_backoff, RetryConfig, RetryConfigError, RetryExecutor, RetryOn, AI_API,
    FAST_OPERATION,
};

// Re-export concrete providers
pub use anthropic::AnthropicAdapter;
pub use openai::OpenAIAdapter;
