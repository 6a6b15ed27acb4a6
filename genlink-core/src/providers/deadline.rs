//! Per-attempt deadlines built on cancellation tokens
//!
//! Each attempt arms a fresh [`Deadline`]. Its timer task is aborted when the
//! guard drops, so every exit path of an attempt cleans up the same way.

use crate::providers::classify::RawError;
use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// A single-use cancellation signal that fires after a fixed duration
#[derive(Debug)]
pub struct Deadline {
    token: CancellationToken,
    timer: JoinHandle<()>,
}

impl Deadline {
    /// Start the timer. Must be called from within a tokio runtime.
    pub fn arm(timeout: Duration) -> Self {
        let token = CancellationToken::new();
        let trigger = token.clone();
        let timer = tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            trigger.cancel();
        });

        Self { token, timer }
    }

    /// Token that is cancelled when the deadline passes
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn has_fired(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl Drop for Deadline {
    fn drop(&mut self) {
        self.timer.abort();
    }
}

/// Race `call` against a fresh deadline and the caller's cancellation token.
///
/// The caller's token wins ties, then the deadline, so a result that lands
/// after the deadline fired is never returned.
pub async fn run_with_deadline<T, F>(
    timeout_ms: u64,
    caller: &CancellationToken,
    call: F,
) -> Result<T, RawError>
where
    F: Future<Output = Result<T, RawError>>,
{
    let deadline = Deadline::arm(Duration::from_millis(timeout_ms));

    tokio::select! {
        biased;
        _ = caller.cancelled() => Err(RawError::CallerCancelled),
        _ = deadline.token().cancelled() => Err(RawError::DeadlineElapsed { timeout_ms }),
        result = call => result,
    }
}
