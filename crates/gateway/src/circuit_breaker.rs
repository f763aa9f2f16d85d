//! Circuit breaker gating the submit path only (spec §4.1).
//!
//! Trips to `Open` when the failure rate reaches 50% over a rolling window
//! of at least 5 calls, probes once after 30s in `HalfOpen`, and returns to
//! `Closed` on that probe's first success or back to `Open` on its first
//! failure.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::{Duration, Instant};

const WINDOW_SIZE: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

#[derive(Debug, Clone)]
pub struct CircuitBreakerStats {
    pub state: CircuitState,
    pub successes: u64,
    pub failures: u64,
    pub open_count: u64,
    pub last_failure: Option<Instant>,
}

struct Inner {
    state: CircuitState,
    window: VecDeque<bool>,
    successes: u64,
    failures: u64,
    open_count: u64,
    last_failure: Option<Instant>,
    opened_at: Option<Instant>,
}

pub struct CircuitBreaker {
    failure_threshold: f64,
    min_volume: u32,
    open_duration: Duration,
    inner: Mutex<Inner>,
}

impl CircuitBreaker {
    pub fn new(failure_threshold: f64, min_volume: u32, open_duration: Duration) -> Self {
        Self {
            failure_threshold,
            min_volume,
            open_duration,
            inner: Mutex::new(Inner {
                state: CircuitState::Closed,
                window: VecDeque::with_capacity(WINDOW_SIZE),
                successes: 0,
                failures: 0,
                open_count: 0,
                last_failure: None,
                opened_at: None,
            }),
        }
    }

    /// Whether a submit may proceed. Transitions `Open -> HalfOpen` once the
    /// open duration has elapsed, admitting exactly the probing call.
    pub fn allow_request(&self) -> bool {
        let mut inner = self.inner.lock().expect("circuit breaker mutex poisoned");
        match inner.state {
            CircuitState::Closed => true,
            CircuitState::HalfOpen => false,
            CircuitState::Open => {
                let elapsed = inner
                    .opened_at
                    .map(|t| t.elapsed())
                    .unwrap_or(Duration::ZERO);
                if elapsed >= self.open_duration {
                    inner.state = CircuitState::HalfOpen;
                    true
                } else {
                    false
                }
            }
        }
    }

    pub fn record_success(&self) {
        let mut inner = self.inner.lock().expect("circuit breaker mutex poisoned");
        inner.successes += 1;
        push_outcome(&mut inner.window, true);
        match inner.state {
            CircuitState::HalfOpen => {
                inner.state = CircuitState::Closed;
                inner.window.clear();
            }
            CircuitState::Closed => {
                // stays closed regardless of window composition once healthy
            }
            CircuitState::Open => {}
        }
    }

    pub fn record_failure(&self) {
        let mut inner = self.inner.lock().expect("circuit breaker mutex poisoned");
        inner.failures += 1;
        inner.last_failure = Some(Instant::now());
        push_outcome(&mut inner.window, false);

        match inner.state {
            CircuitState::HalfOpen => {
                inner.state = CircuitState::Open;
                inner.opened_at = Some(Instant::now());
                inner.open_count += 1;
            }
            CircuitState::Closed => {
                let volume = inner.window.len() as u32;
                if volume >= self.min_volume {
                    let failure_rate =
                        inner.window.iter().filter(|ok| !**ok).count() as f64 / volume as f64;
                    if failure_rate >= self.failure_threshold {
                        inner.state = CircuitState::Open;
                        inner.opened_at = Some(Instant::now());
                        inner.open_count += 1;
                    }
                }
            }
            CircuitState::Open => {}
        }
    }

    pub fn stats(&self) -> CircuitBreakerStats {
        let inner = self.inner.lock().expect("circuit breaker mutex poisoned");
        CircuitBreakerStats {
            state: inner.state,
            successes: inner.successes,
            failures: inner.failures,
            open_count: inner.open_count,
            last_failure: inner.last_failure,
        }
    }
}

fn push_outcome(window: &mut VecDeque<bool>, ok: bool) {
    if window.len() == WINDOW_SIZE {
        window.pop_front();
    }
    window.push_back(ok);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn breaker() -> CircuitBreaker {
        CircuitBreaker::new(0.5, 5, Duration::from_millis(30))
    }

    #[test]
    fn stays_closed_below_min_volume() {
        let cb = breaker();
        for _ in 0..4 {
            cb.record_failure();
        }
        assert_eq!(cb.stats().state, CircuitState::Closed);
        assert!(cb.allow_request());
    }

    #[test]
    fn trips_open_at_failure_threshold_and_volume() {
        let cb = breaker();
        for _ in 0..5 {
            cb.record_failure();
        }
        assert_eq!(cb.stats().state, CircuitState::Open);
        assert!(!cb.allow_request());
    }

    #[test]
    fn half_opens_after_open_duration_then_closes_on_success() {
        let cb = breaker();
        for _ in 0..5 {
            cb.record_failure();
        }
        std::thread::sleep(Duration::from_millis(40));
        assert!(cb.allow_request());
        assert_eq!(cb.stats().state, CircuitState::HalfOpen);
        cb.record_success();
        assert_eq!(cb.stats().state, CircuitState::Closed);
    }

    #[test]
    fn half_open_failure_reopens_circuit() {
        let cb = breaker();
        for _ in 0..5 {
            cb.record_failure();
        }
        std::thread::sleep(Duration::from_millis(40));
        assert!(cb.allow_request());
        cb.record_failure();
        assert_eq!(cb.stats().state, CircuitState::Open);
        assert_eq!(cb.stats().open_count, 2);
    }

    #[test]
    fn mixed_outcomes_below_threshold_stay_closed() {
        let cb = breaker();
        cb.record_success();
        cb.record_failure();
        cb.record_success();
        cb.record_failure();
        cb.record_success();
        assert_eq!(cb.stats().state, CircuitState::Closed);
    }
}
