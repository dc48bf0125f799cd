use connectors::error::ConnectorError;
use serde::{Deserialize, Serialize};
use std::{future::Future, time::Duration};
use thiserror::Error;
use tokio::time::sleep;
use tracing::warn;

/// Outcome of running a fetch under the retry policy.
#[derive(Debug, Error)]
pub enum RetryError {
    /// The error was not a transient transport failure; no retry applies.
    #[error("{0}")]
    Fatal(ConnectorError),

    /// The error was transient but the configured attempts ran out.
    #[error("Retry attempts exhausted: {0}")]
    AttemptsExceeded(ConnectorError),
}

impl RetryError {
    pub fn into_inner(self) -> ConnectorError {
        match self {
            RetryError::Fatal(err) | RetryError::AttemptsExceeded(err) => err,
        }
    }
}

/// Bounded retry with exponential backoff for transient transport failures.
///
/// The default of a single attempt preserves the historical fail-fast
/// contract; retries are an opt-in resilience knob, never silent behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    pub max_attempts: usize,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 1,
            base_delay_ms: 500,
            max_delay_ms: 10_000,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: usize, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay_ms: base_delay.as_millis() as u64,
            max_delay_ms: max_delay.as_millis().max(base_delay.as_millis()) as u64,
        }
    }

    /// Runs `op`, retrying transient failures up to `max_attempts` total
    /// tries with exponentially growing, capped delays between them.
    pub async fn run<F, Fut, T>(&self, mut op: F) -> Result<T, RetryError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ConnectorError>>,
    {
        let mut attempt = 0;

        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) if !err.is_retryable() => return Err(RetryError::Fatal(err)),
                Err(err) => {
                    attempt += 1;
                    if attempt >= self.max_attempts.max(1) {
                        return Err(RetryError::AttemptsExceeded(err));
                    }

                    let delay = self.backoff_delay(attempt);
                    warn!(attempt, ?delay, error = %err, "Transient fetch failure, backing off");
                    sleep(delay).await;
                }
            }
        }
    }

    fn backoff_delay(&self, attempt: usize) -> Duration {
        if self.base_delay_ms == 0 {
            return Duration::from_millis(0);
        }

        let factor = 1u64 << attempt.min(6) as u32;
        let delay_ms = self.base_delay_ms.saturating_mul(factor);
        Duration::from_millis(delay_ms.min(self.max_delay_ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn transient() -> ConnectorError {
        ConnectorError::Transport("connection reset".into())
    }

    #[tokio::test]
    async fn default_policy_fails_on_first_transient_error() {
        let calls = AtomicUsize::new(0);
        let result: Result<(), _> = RetryPolicy::default()
            .run(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(transient()) }
            })
            .await;

        assert!(matches!(result, Err(RetryError::AttemptsExceeded(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retries_transient_errors_until_success() {
        let policy = RetryPolicy::new(3, Duration::from_millis(1), Duration::from_millis(5));
        let calls = AtomicUsize::new(0);

        let result = policy
            .run(|| {
                let attempt = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if attempt < 2 {
                        Err(transient())
                    } else {
                        Ok(attempt)
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn fatal_errors_are_never_retried() {
        let policy = RetryPolicy::new(5, Duration::from_millis(1), Duration::from_millis(5));
        let calls = AtomicUsize::new(0);

        let result: Result<(), _> = policy
            .run(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                async {
                    Err(ConnectorError::Api {
                        status: 400,
                        body: "bad query".into(),
                    })
                }
            })
            .await;

        assert!(matches!(result, Err(RetryError::Fatal(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn backoff_grows_and_caps() {
        let policy = RetryPolicy::new(10, Duration::from_millis(100), Duration::from_millis(400));
        assert_eq!(policy.backoff_delay(1), Duration::from_millis(200));
        assert_eq!(policy.backoff_delay(2), Duration::from_millis(400));
        assert_eq!(policy.backoff_delay(6), Duration::from_millis(400));
    }
}
