//! Retry + circuit breaker facade for the single upstream dependency.
//!
//! Every outbound call goes through [`ResilienceFacade::call`]. Each underlying
//! attempt first asks the [`CircuitBreaker`] for permission, then its outcome
//! is recorded in the breaker's sliding window. The retry budget belongs to
//! one logical call; the window is shared by all calls on the facade.
//!
//! ```text
//! call ──▶ breaker permits? ──no──▶ ApiError::circuit_open
//!              │yes
//!              ▼
//!          attempt ──▶ record outcome ──▶ retryable and budget left? ──yes──▶ sleep, loop
//!                                              │no
//!                                              ▼
//!                                         CallResult
//! ```

use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

use crate::circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitState};
use crate::error::{ApiError, CallResult, FailureKind};
use crate::http_client::{HttpError, HttpResponse};
use crate::retry::{Backoff, RetryPolicy};

/// Dependency name used when none is configured.
pub const DEFAULT_DEPENDENCY: &str = "snapgene";

/// Resilience settings for one upstream dependency.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResiliencePolicy {
    pub max_attempts: u32,
    pub backoff: Backoff,
    pub failure_rate_threshold: f32,
    pub sliding_window_size: usize,
    pub open_timeout: Duration,
}

impl Default for ResiliencePolicy {
    fn default() -> Self {
        let retry = RetryPolicy::default();
        let breaker = CircuitBreakerConfig::default();
        Self {
            max_attempts: retry.max_attempts,
            backoff: retry.backoff,
            failure_rate_threshold: breaker.failure_rate_threshold,
            sliding_window_size: breaker.sliding_window_size,
            open_timeout: breaker.open_timeout,
        }
    }
}

impl ResiliencePolicy {
    /// Fixed delay between attempts and the given window size, defaults elsewhere.
    pub fn new(backoff_delay: Duration, sliding_window_size: usize) -> Self {
        Self {
            backoff: Backoff::Fixed {
                delay: backoff_delay,
            },
            sliding_window_size,
            ..Self::default()
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn with_failure_rate_threshold(mut self, percent: f32) -> Self {
        self.failure_rate_threshold = percent;
        self
    }

    pub fn with_open_timeout(mut self, open_timeout: Duration) -> Self {
        self.open_timeout = open_timeout;
        self
    }

    fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts.max(1),
            backoff: self.backoff,
        }
    }

    fn breaker_config(&self) -> CircuitBreakerConfig {
        CircuitBreakerConfig {
            failure_rate_threshold: self.failure_rate_threshold,
            sliding_window_size: self.sliding_window_size,
            open_timeout: self.open_timeout,
        }
    }
}

/// Executes upstream calls under retry and circuit breaker protection.
///
/// Safe to share between tasks; hold it in an `Arc`.
#[derive(Debug)]
pub struct ResilienceFacade {
    policy: ResiliencePolicy,
    retry: RetryPolicy,
    breaker: CircuitBreaker,
}

impl Default for ResilienceFacade {
    fn default() -> Self {
        Self::new(DEFAULT_DEPENDENCY, ResiliencePolicy::default())
    }
}

impl ResilienceFacade {
    pub fn new(dependency: impl Into<String>, policy: ResiliencePolicy) -> Self {
        Self {
            policy,
            retry: policy.retry_policy(),
            breaker: CircuitBreaker::new(dependency, policy.breaker_config()),
        }
    }

    pub fn dependency(&self) -> &str {
        self.breaker.name()
    }

    pub const fn policy(&self) -> &ResiliencePolicy {
        &self.policy
    }

    pub fn circuit_state(&self) -> CircuitState {
        self.breaker.state()
    }

    pub const fn circuit_breaker(&self) -> &CircuitBreaker {
        &self.breaker
    }

    /// Runs `operation` until it succeeds, fails terminally, spends its
    /// attempt budget, or the circuit opens.
    ///
    /// A call refused up front gets a circuit-open failure; a call whose own
    /// attempt opens the circuit gets that attempt's failure, without sleeping.
    ///
    /// `operation` is invoked once per attempt and must build a fresh call
    /// each time. A 2xx response is a success; anything else is translated
    /// into an [`ApiError`].
    pub async fn call<F, Fut>(&self, mut operation: F) -> CallResult<HttpResponse>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<HttpResponse, HttpError>>,
    {
        let mut attempt = 1;
        loop {
            if !self.breaker.allow_request() {
                debug!(
                    dependency = %self.dependency(),
                    attempt,
                    "call rejected by open circuit"
                );
                return Err(ApiError::circuit_open(self.dependency()));
            }

            let failure = match operation().await {
                Ok(response) if response.is_success() => {
                    self.breaker.record_success();
                    return Ok(response);
                }
                Ok(response) => ApiError::from_response(&response),
                Err(error) => ApiError::from_transport(&error),
            };

            // The dependency answered a caller mistake; that says nothing
            // about its health.
            if failure.kind() == FailureKind::Client {
                self.breaker.record_success();
            } else {
                self.breaker.record_failure();
            }

            // Any further attempt would be refused; keep the upstream failure.
            if self.breaker.state() == CircuitState::Open {
                debug!(
                    dependency = %self.dependency(),
                    attempt,
                    error = %failure,
                    "circuit opened, returning upstream failure"
                );
                return Err(failure);
            }

            if !self.retry.should_retry(&failure, attempt) {
                if failure.retryable() {
                    warn!(
                        dependency = %self.dependency(),
                        attempts = attempt,
                        error = %failure,
                        "attempt budget exhausted"
                    );
                }
                return Err(failure);
            }

            attempt += 1;
            let delay = self.retry.delay_before(attempt);
            warn!(
                dependency = %self.dependency(),
                next_attempt = attempt,
                delay_ms = delay.as_millis() as u64,
                error = %failure,
                "retrying upstream call"
            );
            tokio::time::sleep(delay).await;
        }
    }
}
