use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use tracing::{info, warn};

/// Runtime circuit state for upstream calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

/// Circuit breaker thresholds and timers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircuitBreakerConfig {
    /// Failure percentage (0-100] at or above which a full window opens the circuit.
    pub failure_rate_threshold: f32,
    /// Number of most recent attempt outcomes kept for the failure rate.
    pub sliding_window_size: usize,
    /// How long the circuit stays open before admitting a trial call.
    pub open_timeout: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_rate_threshold: 50.0,
            sliding_window_size: 50,
            open_timeout: Duration::from_secs(60),
        }
    }
}

#[derive(Debug)]
struct CircuitInner {
    state: CircuitState,
    /// `true` marks a failed attempt.
    window: VecDeque<bool>,
    failures: usize,
    opened_at: Option<Instant>,
    trial_started_at: Option<Instant>,
}

impl CircuitInner {
    fn new(capacity: usize) -> Self {
        Self {
            state: CircuitState::Closed,
            window: VecDeque::with_capacity(capacity),
            failures: 0,
            opened_at: None,
            trial_started_at: None,
        }
    }

    fn reset_window(&mut self) {
        self.window.clear();
        self.failures = 0;
    }

    fn push(&mut self, failed: bool, capacity: usize) {
        if self.window.len() == capacity {
            if let Some(true) = self.window.pop_front() {
                self.failures -= 1;
            }
        }
        self.window.push_back(failed);
        if failed {
            self.failures += 1;
        }
    }

    fn failure_rate(&self) -> f32 {
        if self.window.is_empty() {
            return 0.0;
        }
        self.failures as f32 * 100.0 / self.window.len() as f32
    }

    fn open(&mut self) {
        self.state = CircuitState::Open;
        self.opened_at = Some(Instant::now());
        self.trial_started_at = None;
        self.reset_window();
    }

    fn close(&mut self) {
        self.state = CircuitState::Closed;
        self.opened_at = None;
        self.trial_started_at = None;
        self.reset_window();
    }
}

/// Thread-safe circuit breaker over a count-based sliding window of attempt outcomes.
#[derive(Debug)]
pub struct CircuitBreaker {
    name: String,
    config: CircuitBreakerConfig,
    inner: Mutex<CircuitInner>,
}

impl CircuitBreaker {
    pub fn new(name: impl Into<String>, config: CircuitBreakerConfig) -> Self {
        let config = CircuitBreakerConfig {
            sliding_window_size: config.sliding_window_size.max(1),
            ..config
        };
        Self {
            name: name.into(),
            config,
            inner: Mutex::new(CircuitInner::new(config.sliding_window_size)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub const fn config(&self) -> &CircuitBreakerConfig {
        &self.config
    }

    /// Asks permission for one attempt.
    ///
    /// An open circuit past its timeout moves to half-open and admits exactly
    /// one trial attempt; every other request is refused until that trial
    /// is recorded.
    pub fn allow_request(&self) -> bool {
        let mut inner = self
            .inner
            .lock()
            .expect("circuit breaker lock is not poisoned");
        match inner.state {
            CircuitState::Closed => true,
            CircuitState::HalfOpen => {
                // A trial whose outcome never arrived (dropped caller) is
                // replaced once it is older than the open timeout.
                let trial_pending = inner
                    .trial_started_at
                    .map(|started| started.elapsed() < self.config.open_timeout)
                    .unwrap_or(false);
                if trial_pending {
                    false
                } else {
                    inner.trial_started_at = Some(Instant::now());
                    true
                }
            }
            CircuitState::Open => {
                let can_probe = inner
                    .opened_at
                    .map(|opened_at| opened_at.elapsed() >= self.config.open_timeout)
                    .unwrap_or(false);

                if can_probe {
                    info!(dependency = %self.name, "circuit half-open, admitting trial call");
                    inner.state = CircuitState::HalfOpen;
                    inner.opened_at = None;
                    inner.trial_started_at = Some(Instant::now());
                    true
                } else {
                    false
                }
            }
        }
    }

    pub fn record_success(&self) {
        let mut inner = self
            .inner
            .lock()
            .expect("circuit breaker lock is not poisoned");
        match inner.state {
            CircuitState::HalfOpen => {
                info!(dependency = %self.name, "trial call succeeded, circuit closed");
                inner.close();
            }
            CircuitState::Closed => inner.push(false, self.config.sliding_window_size),
            // Outcome of an attempt admitted before the circuit opened.
            CircuitState::Open => {}
        }
    }

    pub fn record_failure(&self) {
        let mut inner = self
            .inner
            .lock()
            .expect("circuit breaker lock is not poisoned");
        match inner.state {
            CircuitState::HalfOpen => {
                warn!(dependency = %self.name, "trial call failed, circuit re-opened");
                inner.open();
            }
            CircuitState::Closed => {
                inner.push(true, self.config.sliding_window_size);
                let rate = inner.failure_rate();
                if inner.window.len() == self.config.sliding_window_size
                    && rate >= self.config.failure_rate_threshold
                {
                    warn!(
                        dependency = %self.name,
                        failure_rate = rate,
                        window = self.config.sliding_window_size,
                        "failure rate over threshold, circuit opened"
                    );
                    inner.open();
                }
            }
            CircuitState::Open => {}
        }
    }

    pub fn state(&self) -> CircuitState {
        let inner = self
            .inner
            .lock()
            .expect("circuit breaker lock is not poisoned");
        inner.state
    }

    /// Failure percentage of the outcomes currently in the window.
    pub fn failure_rate(&self) -> f32 {
        let inner = self
            .inner
            .lock()
            .expect("circuit breaker lock is not poisoned");
        inner.failure_rate()
    }

    /// Number of outcomes currently in the window.
    pub fn buffered_calls(&self) -> usize {
        let inner = self
            .inner
            .lock()
            .expect("circuit breaker lock is not poisoned");
        inner.window.len()
    }
}
