//! # Circuit Breaker
//!
//! Stops calling an upstream target after repeated transient failures, giving
//! it time to recover.
//!
//! ## States
//! - **Closed**: requests pass through; each transient failure is counted.
//! - **Open**: entered after `failure_threshold` consecutive failures. Every
//!   request fails fast until `break_duration` has passed since opening.
//! - **HalfOpen**: a single trial request is let through. Success closes the
//!   circuit, failure opens it again with a fresh break.
//!
//! ## Usage
//! ```ignore
//! let breaker = CircuitBreaker::new("https://api.frankfurter.app", 5, Duration::from_secs(30));
//!
//! let permit = breaker.try_acquire()?;
//! match send().await {
//!     Ok(_) => permit.record_success(),
//!     Err(_) => permit.record_failure(),
//! }
//! ```
//!
//! All transitions happen under one mutex, so concurrent failures produce
//! exactly one Closed to Open transition and at most one trial is in flight.

use parking_lot::Mutex;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::error::{ResilienceError, ResilienceResult};

/// Phase of the circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitPhase {
    /// Normal operation - requests pass through
    Closed,
    /// Failing fast after too many failures
    Open,
    /// Probing whether the target recovered
    HalfOpen,
}

/// Point-in-time view of a breaker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CircuitState {
    pub phase: CircuitPhase,
    pub consecutive_failures: u32,
    /// When the circuit last opened.
    pub opened_at: Option<Instant>,
}

impl CircuitState {
    fn closed() -> Self {
        Self {
            phase: CircuitPhase::Closed,
            consecutive_failures: 0,
            opened_at: None,
        }
    }
}

#[derive(Debug)]
struct BreakerInner {
    state: CircuitState,
    trial_in_flight: bool,
    times_opened: u64,
}

/// Circuit breaker for one upstream target.
pub struct CircuitBreaker {
    target: String,
    inner: Mutex<BreakerInner>,
    /// Consecutive failures that open the circuit.
    failure_threshold: u32,
    /// Time spent open before a trial is allowed.
    break_duration: Duration,
}

impl CircuitBreaker {
    /// Create a closed breaker.
    pub fn new(target: impl Into<String>, failure_threshold: u32, break_duration: Duration) -> Self {
        Self {
            target: target.into(),
            inner: Mutex::new(BreakerInner {
                state: CircuitState::closed(),
                trial_in_flight: false,
                times_opened: 0,
            }),
            failure_threshold: failure_threshold.max(1),
            break_duration,
        }
    }

    /// Target this breaker guards.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Current state. Does not advance Open to HalfOpen.
    pub fn state(&self) -> CircuitState {
        self.inner.lock().state.clone()
    }

    pub fn phase(&self) -> CircuitPhase {
        self.inner.lock().state.phase
    }

    /// How many times the circuit has opened.
    pub fn times_opened(&self) -> u64 {
        self.inner.lock().times_opened
    }

    /// Ask to send one request.
    ///
    /// Fails with [`ResilienceError::CircuitOpen`] while the circuit is open,
    /// or while it is half-open and the trial request is still in flight.
    pub fn try_acquire(&self) -> ResilienceResult<BreakerPermit<'_>> {
        let mut inner = self.inner.lock();

        match inner.state.phase {
            CircuitPhase::Closed => Ok(BreakerPermit::new(self, false)),
            CircuitPhase::Open => {
                let cooled_down = inner
                    .state
                    .opened_at
                    .map_or(true, |opened| opened.elapsed() >= self.break_duration);

                if !cooled_down {
                    return Err(self.open_error());
                }

                inner.state.phase = CircuitPhase::HalfOpen;
                inner.trial_in_flight = true;
                info!(target_url = %self.target, "Circuit half-open, sending trial request");
                Ok(BreakerPermit::new(self, true))
            }
            CircuitPhase::HalfOpen => {
                if inner.trial_in_flight {
                    return Err(self.open_error());
                }
                inner.trial_in_flight = true;
                Ok(BreakerPermit::new(self, true))
            }
        }
    }

    /// Force the breaker back to closed.
    pub fn reset(&self) {
        let mut inner = self.inner.lock();
        inner.state = CircuitState::closed();
        inner.trial_in_flight = false;
    }

    fn open_error(&self) -> ResilienceError {
        ResilienceError::CircuitOpen {
            target: self.target.clone(),
        }
    }

    fn on_success(&self, trial: bool) {
        let mut inner = self.inner.lock();

        match inner.state.phase {
            CircuitPhase::Closed => inner.state.consecutive_failures = 0,
            CircuitPhase::HalfOpen if trial => {
                inner.state = CircuitState::closed();
                inner.trial_in_flight = false;
                info!(target_url = %self.target, "Circuit closed after successful trial");
            }
            // Outcome of a request admitted before the circuit opened.
            _ => debug!(target_url = %self.target, "Ignoring stale success"),
        }
    }

    fn on_failure(&self, trial: bool) {
        let mut inner = self.inner.lock();

        match inner.state.phase {
            CircuitPhase::Closed => {
                inner.state.consecutive_failures += 1;
                if inner.state.consecutive_failures >= self.failure_threshold {
                    inner.state.phase = CircuitPhase::Open;
                    inner.state.opened_at = Some(Instant::now());
                    inner.times_opened += 1;
                    warn!(
                        target_url = %self.target,
                        failures = inner.state.consecutive_failures,
                        "Circuit breaker tripped to OPEN"
                    );
                }
            }
            CircuitPhase::HalfOpen if trial => {
                inner.state.consecutive_failures += 1;
                inner.state.phase = CircuitPhase::Open;
                inner.state.opened_at = Some(Instant::now());
                inner.trial_in_flight = false;
                inner.times_opened += 1;
                warn!(target_url = %self.target, "Trial request failed, circuit re-opened");
            }
            _ => debug!(target_url = %self.target, "Ignoring stale failure"),
        }
    }

    fn abandon_trial(&self) {
        let mut inner = self.inner.lock();
        if inner.state.phase == CircuitPhase::HalfOpen {
            inner.trial_in_flight = false;
        }
    }
}

/// Permission to send one request. Report the outcome with
/// [`record_success`](Self::record_success) or
/// [`record_failure`](Self::record_failure); dropping an unreported trial
/// permit frees the trial slot.
#[must_use]
pub struct BreakerPermit<'a> {
    breaker: &'a CircuitBreaker,
    trial: bool,
    settled: bool,
}

impl<'a> BreakerPermit<'a> {
    fn new(breaker: &'a CircuitBreaker, trial: bool) -> Self {
        Self {
            breaker,
            trial,
            settled: false,
        }
    }

    /// Whether this is the half-open trial request.
    pub fn is_trial(&self) -> bool {
        self.trial
    }

    pub fn record_success(mut self) {
        self.settled = true;
        self.breaker.on_success(self.trial);
    }

    pub fn record_failure(mut self) {
        self.settled = true;
        self.breaker.on_failure(self.trial);
    }
}

impl Drop for BreakerPermit<'_> {
    fn drop(&mut self) {
        if self.trial && !self.settled {
            self.breaker.abandon_trial();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn make_breaker() -> CircuitBreaker {
        CircuitBreaker::new("http://rates", 5, Duration::from_secs(30))
    }

    fn fail(breaker: &CircuitBreaker, times: usize) {
        for _ in 0..times {
            breaker.try_acquire().unwrap().record_failure();
        }
    }

    #[test]
    fn test_breaker_starts_closed() {
        let breaker = make_breaker();
        assert_eq!(breaker.phase(), CircuitPhase::Closed);
        assert!(breaker.try_acquire().is_ok());
    }

    #[test]
    fn test_breaker_trips_after_threshold() {
        let breaker = make_breaker();

        fail(&breaker, 4);
        assert_eq!(breaker.phase(), CircuitPhase::Closed);
        assert_eq!(breaker.state().consecutive_failures, 4);

        fail(&breaker, 1);
        assert_eq!(breaker.phase(), CircuitPhase::Open);
        assert!(breaker.state().opened_at.is_some());
        assert!(matches!(
            breaker.try_acquire(),
            Err(ResilienceError::CircuitOpen { .. })
        ));
    }

    #[test]
    fn test_success_resets_failures() {
        let breaker = make_breaker();

        fail(&breaker, 3);
        breaker.try_acquire().unwrap().record_success();

        assert_eq!(breaker.state().consecutive_failures, 0);
        fail(&breaker, 4);
        assert_eq!(breaker.phase(), CircuitPhase::Closed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_half_open_after_break() {
        let breaker = make_breaker();
        fail(&breaker, 5);

        tokio::time::advance(Duration::from_secs(29)).await;
        assert!(breaker.try_acquire().is_err());

        tokio::time::advance(Duration::from_secs(1)).await;
        let trial = breaker.try_acquire().unwrap();
        assert!(trial.is_trial());
        assert_eq!(breaker.phase(), CircuitPhase::HalfOpen);

        // Only one trial at a time.
        assert!(breaker.try_acquire().is_err());

        trial.record_success();
        assert_eq!(breaker.state(), CircuitState::closed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_trial_reopens() {
        let breaker = make_breaker();
        fail(&breaker, 5);
        let first_opened = breaker.state().opened_at.unwrap();

        tokio::time::advance(Duration::from_secs(30)).await;
        breaker.try_acquire().unwrap().record_failure();

        let state = breaker.state();
        assert_eq!(state.phase, CircuitPhase::Open);
        assert!(state.opened_at.unwrap() > first_opened);
        assert_eq!(breaker.times_opened(), 2);
        assert!(breaker.try_acquire().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_abandoned_trial_frees_slot() {
        let breaker = make_breaker();
        fail(&breaker, 5);
        tokio::time::advance(Duration::from_secs(30)).await;

        drop(breaker.try_acquire().unwrap());

        assert_eq!(breaker.phase(), CircuitPhase::HalfOpen);
        assert!(breaker.try_acquire().unwrap().is_trial());
    }

    #[test]
    fn test_stale_success_keeps_circuit_open() {
        let breaker = make_breaker();
        let early = breaker.try_acquire().unwrap();

        fail(&breaker, 5);
        early.record_success();

        assert_eq!(breaker.phase(), CircuitPhase::Open);
    }

    #[test]
    fn test_concurrent_failures_trip_once() {
        use std::thread;

        let breaker = Arc::new(make_breaker());

        let handles: Vec<_> = (0..10)
            .map(|_| {
                let b = Arc::clone(&breaker);
                thread::spawn(move || {
                    for _ in 0..20 {
                        if let Ok(permit) = b.try_acquire() {
                            permit.record_failure();
                        }
                    }
                })
            })
            .collect();

        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(breaker.phase(), CircuitPhase::Open);
        assert_eq!(breaker.times_opened(), 1);
    }
}
