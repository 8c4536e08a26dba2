//! Timeout and retry decorator for provider calls

use rand::Rng;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

use super::{ProviderError, ProviderResult};

/// Bounded-timeout, jittered-backoff retry policy.
///
/// Each attempt is cut off after `timeout`. Only transient failures are
/// retried; the last error is returned once retries are exhausted. An
/// optional `budget` caps the whole sequence of attempts and backoffs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    timeout: Duration,
    max_retries: u32,
    base_backoff: Duration,
    budget: Option<Duration>,
}

impl RetryPolicy {
    pub fn new(timeout: Duration, max_retries: u32, base_backoff: Duration) -> Self {
        Self {
            timeout,
            max_retries,
            base_backoff,
            budget: None,
        }
    }

    /// Give up with a timeout once `budget` has elapsed across all attempts
    pub fn with_budget(mut self, budget: Duration) -> Self {
        self.budget = Some(budget);
        self
    }

    /// Single attempt, no retry
    pub fn once(timeout: Duration) -> Self {
        Self::new(timeout, 0, Duration::ZERO)
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn budget(&self) -> Option<Duration> {
        self.budget
    }

    /// Run `call` under this policy. `label` names the provider in logs.
    pub async fn run<T, F, Fut>(&self, label: &str, call: F) -> ProviderResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ProviderResult<T>>,
    {
        let Some(budget) = self.budget else {
            return self.run_attempts(label, call).await;
        };

        match tokio::time::timeout(budget, self.run_attempts(label, call)).await {
            Ok(outcome) => outcome,
            Err(_) => {
                warn!(
                    provider = label,
                    budget_ms = budget.as_millis() as u64,
                    "Provider call budget exhausted"
                );
                Err(ProviderError::Timeout {
                    after_ms: budget.as_millis() as u64,
                })
            }
        }
    }

    async fn run_attempts<T, F, Fut>(&self, label: &str, mut call: F) -> ProviderResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ProviderResult<T>>,
    {
        let mut attempt = 0;
        loop {
            let outcome = match tokio::time::timeout(self.timeout, call()).await {
                Ok(result) => result,
                Err(_) => Err(ProviderError::Timeout {
                    after_ms: self.timeout.as_millis() as u64,
                }),
            };

            match outcome {
                Ok(value) => {
                    if attempt > 0 {
                        debug!(provider = label, attempt = attempt + 1, "Provider call recovered");
                    }
                    return Ok(value);
                }
                Err(err) if err.is_transient() && attempt < self.max_retries => {
                    let delay = self.backoff_for(attempt);
                    warn!(
                        provider = label,
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "Provider call failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Backoff before retry number `attempt + 1`: base × 2^attempt × U[0.5, 1.5)
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let exponential = self
            .base_backoff
            .saturating_mul(2u32.saturating_pow(attempt));
        let jitter: f64 = rand::thread_rng().gen_range(0.5..1.5);
        exponential.mul_f64(jitter)
    }
}
