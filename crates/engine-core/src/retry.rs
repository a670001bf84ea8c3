use connectors::error::AdapterError;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::warn;

/// Indicates whether an error should be retried or treated as fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDisposition {
    Retry,
    Stop,
}

/// Result of running an operation under the retry policy.
#[derive(Debug)]
pub enum RetryError<E> {
    /// The error was considered fatal and is returned as-is.
    Fatal(E),
    /// The error was retryable, but every attempt failed.
    AttemptsExceeded { attempts: usize, last: E },
}

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, the first one included. Never below 1.
    pub max_attempts: usize,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::retry_once()
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: usize, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            max_delay: max_delay.max(base_delay),
        }
    }

    /// One retry after a short pause; the hardening applied to list requests.
    pub fn retry_once() -> Self {
        Self::new(2, Duration::from_millis(250), Duration::from_secs(2))
    }

    pub fn no_retry() -> Self {
        Self::new(1, Duration::ZERO, Duration::ZERO)
    }

    /// Executes `op` until it succeeds, fails fatally, or runs out of attempts.
    pub async fn run<F, Fut, T, E, Classifier>(
        &self,
        mut op: F,
        classify: Classifier,
    ) -> Result<T, RetryError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        Classifier: Fn(&E) -> RetryDisposition,
        E: std::fmt::Display,
    {
        let mut attempt = 0;

        loop {
            match op().await {
                Ok(result) => return Ok(result),
                Err(err) => {
                    if classify(&err) == RetryDisposition::Stop {
                        return Err(RetryError::Fatal(err));
                    }

                    attempt += 1;
                    if attempt >= self.max_attempts {
                        return Err(RetryError::AttemptsExceeded {
                            attempts: attempt,
                            last: err,
                        });
                    }

                    let delay = self.backoff_delay(attempt - 1);
                    warn!(attempt, ?delay, "Transient failure, retrying: {err}");
                    sleep(delay).await;
                }
            }
        }
    }

    fn backoff_delay(&self, retry: usize) -> Duration {
        if self.base_delay.is_zero() {
            return Duration::ZERO;
        }

        let factor = 1u32 << retry.min(6);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }
}

pub fn classify_adapter_error(err: &AdapterError) -> RetryDisposition {
    if err.is_transient() {
        RetryDisposition::Retry
    } else {
        RetryDisposition::Stop
    }
}
