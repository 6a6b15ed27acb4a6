//! Retry policy with exponential backoff and jitter
//!
//! Two named configurations cover every call the adapters make:
//! [`FAST_OPERATION`] for connectivity checks and [`AI_API`] for generation.

use crate::providers::error::{ProviderError, ProviderResult};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Which failures are worth another attempt
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetryOn {
    /// Every failure is retried until attempts run out
    #[default]
    Any,
    /// Only timeouts, rate limits and unavailability are retried
    TransientOnly,
}

/// Configuration for retry behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RetryConfig {
    /// Total attempts including the first one
    pub max_attempts: u32,

    /// Delay before the second attempt (milliseconds)
    pub base_delay_ms: u64,

    /// Cap on any single delay (milliseconds)
    pub max_delay_ms: u64,

    /// Multiply each delay by a random factor in `[0.5, 1.5]`
    pub jitter: bool,

    #[serde(default)]
    pub retry_on: RetryOn,
}

/// Cheap connectivity checks: fail fast
pub const FAST_OPERATION: RetryConfig = RetryConfig {
    max_attempts: 2,
    base_delay_ms: 500,
    max_delay_ms: 2_000,
    jitter: true,
    retry_on: RetryOn::Any,
};

/// Generation calls: more patience
pub const AI_API: RetryConfig = RetryConfig {
    max_attempts: 3,
    base_delay_ms: 1_000,
    max_delay_ms: 10_000,
    jitter: true,
    retry_on: RetryOn::Any,
};

/// Invariant violated by a [`RetryConfig`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RetryConfigError {
    #[error("max_attempts must be at least 1")]
    NoAttempts,

    #[error("max_delay_ms ({max_delay_ms}) must not be below base_delay_ms ({base_delay_ms})")]
    CapBelowBase { base_delay_ms: u64, max_delay_ms: u64 },
}

impl RetryConfig {
    /// Same config, retrying only transient failures
    pub const fn transient_only(self) -> Self {
        Self {
            retry_on: RetryOn::TransientOnly,
            ..self
        }
    }

    /// Same config without jitter
    pub const fn without_jitter(self) -> Self {
        Self {
            jitter: false,
            ..self
        }
    }

    pub fn validate(&self) -> Result<(), RetryConfigError> {
        if self.max_attempts == 0 {
            return Err(RetryConfigError::NoAttempts);
        }
        if self.max_delay_ms < self.base_delay_ms {
            return Err(RetryConfigError::CapBelowBase {
                base_delay_ms: self.base_delay_ms,
                max_delay_ms: self.max_delay_ms,
            });
        }
        Ok(())
    }

    /// Delay to wait after failed attempt number `attempt` (1-based)
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(63);
        let backoff = self
            .base_delay_ms
            .saturating_mul(1u64 << exponent)
            .min(self.max_delay_ms);

        let delay_ms = if self.jitter {
            let factor = rand::thread_rng().gen_range(0.5..=1.5);
            ((backoff as f64 * factor) as u64).min(self.max_delay_ms)
        } else {
            backoff
        };

        Duration::from_millis(delay_ms)
    }

    /// Whether a failure on attempt `attempt` should be followed by another
    pub fn should_retry(&self, error: &ProviderError, attempt: u32) -> bool {
        if attempt >= self.max_attempts {
            return false;
        }

        match self.retry_on {
            RetryOn::Any => true,
            RetryOn::TransientOnly => error.is_transient(),
        }
    }
}

/// Executor for retry operations
#[derive(Debug, Clone)]
pub struct RetryExecutor {
    config: RetryConfig,
}

impl RetryExecutor {
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Execute an operation with retry logic
    pub async fn execute<F, T, Fut>(&self, operation: F) -> ProviderResult<T>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = ProviderResult<T>>,
    {
        self.execute_cancellable(&CancellationToken::new(), operation)
            .await
    }

    /// Execute an operation with retry logic, giving up once `cancel` fires.
    ///
    /// The operation receives the 1-based attempt number. When the token
    /// fires during a backoff sleep, the error of the last attempt is
    /// returned without another attempt.
    pub async fn execute_cancellable<F, T, Fut>(
        &self,
        cancel: &CancellationToken,
        mut operation: F,
    ) -> ProviderResult<T>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = ProviderResult<T>>,
    {
        let mut attempt = 1;

        loop {
            let error = match operation(attempt).await {
                Ok(value) => return Ok(value),
                Err(error) => error,
            };

            if cancel.is_cancelled() || !self.config.should_retry(&error, attempt) {
                debug!(
                    provider = error.provider(),
                    attempt,
                    kind = ?error.kind(),
                    "giving up: {}",
                    error
                );
                return Err(error);
            }

            let delay = self.config.delay_for_attempt(attempt);
            warn!(
                provider = error.provider(),
                attempt,
                max_attempts = self.config.max_attempts,
                delay_ms = delay.as_millis() as u64,
                kind = ?error.kind(),
                "attempt failed, retrying: {}",
                error
            );

            tokio::select! {
                _ = cancel.cancelled() => return Err(error),
                _ = tokio::time::sleep(delay) => {}
            }
            attempt += 1;
        }
    }
}

/// Run `operation` under `config`, returning the first success or the last error
pub async fn retry_with_backoff<F, T, Fut>(config: RetryConfig, operation: F) -> ProviderResult<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = ProviderResult<T>>,
{
    RetryExecutor::new(config).execute(operation).await
}
