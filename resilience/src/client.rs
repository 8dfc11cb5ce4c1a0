//! Outbound GET wrapper applying retry and circuit breaking.

use std::sync::Arc;

use dashmap::DashMap;
use tracing::{debug, instrument, warn};

use crate::circuit_breaker::{CircuitBreaker, CircuitPhase, CircuitState};
use crate::config::ResilienceConfig;
use crate::error::{ResilienceError, ResilienceResult};
use crate::retry::{is_transient_status, RetryPolicy};
use crate::transport::{HttpResponse, HttpTransport, ReqwestTransport, TransportError};

/// HTTP client that retries transient failures and fails fast on unhealthy
/// targets.
///
/// The breaker wraps the retry loop: it gates entry to a call and is updated
/// for every attempt, so retries count toward opening the circuit.
pub struct ResilientClient {
    transport: Arc<dyn HttpTransport>,
    retry: RetryPolicy,
    config: ResilienceConfig,
    /// One breaker per upstream target, shared by all callers.
    breakers: DashMap<String, Arc<CircuitBreaker>>,
}

impl ResilientClient {
    /// Create a client over the given transport.
    pub fn new(transport: Arc<dyn HttpTransport>, config: ResilienceConfig) -> Self {
        Self {
            transport,
            retry: config.retry_policy(),
            config,
            breakers: DashMap::new(),
        }
    }

    /// Create a client backed by `reqwest`.
    pub fn with_reqwest(config: ResilienceConfig) -> ResilienceResult<Self> {
        let transport = ReqwestTransport::new(config.request_timeout)?;
        Ok(Self::new(Arc::new(transport), config))
    }

    /// Breaker key for a URL: its scheme, host and port.
    pub fn target_of(url: &str) -> String {
        match reqwest::Url::parse(url) {
            Ok(parsed) => parsed.origin().ascii_serialization(),
            Err(_) => url.to_string(),
        }
    }

    /// Breaker guarding the target of `url`.
    pub fn breaker_for(&self, url: &str) -> Arc<CircuitBreaker> {
        let target = Self::target_of(url);
        self.breakers
            .entry(target.clone())
            .or_insert_with(|| {
                Arc::new(CircuitBreaker::new(
                    target,
                    self.config.failure_threshold,
                    self.config.break_duration,
                ))
            })
            .clone()
    }

    /// State of the breaker for `target`, if it has seen any request.
    pub fn breaker_state(&self, target: &str) -> Option<CircuitState> {
        self.breakers.get(target).map(|b| b.state())
    }

    /// Send a GET request to `url`.
    ///
    /// Returns the response for any 2xx status. Other statuses and network
    /// failures map to [`ResilienceError`]. `CircuitOpen` is returned only
    /// when the call is rejected before any request was sent; once this call
    /// has attempted the target, a circuit opening ends the retries with
    /// `UpstreamUnavailable`.
    #[instrument(skip(self))]
    pub async fn get(&self, url: &str) -> ResilienceResult<HttpResponse> {
        let breaker = self.breaker_for(url);
        let max_attempts = self.retry.max_attempts();
        let mut attempt = 0;
        let mut last_reason = String::new();

        loop {
            let permit = match breaker.try_acquire() {
                Ok(permit) => permit,
                Err(e) if attempt == 0 => return Err(e),
                Err(_) => return Err(self.unavailable(url, attempt, last_reason)),
            };
            attempt += 1;

            let reason = match self.send(url).await {
                Ok(response) if response.is_success() => {
                    permit.record_success();
                    debug!(attempt, status = response.status, "Upstream request succeeded");
                    return Ok(response);
                }
                Ok(response) if !is_transient_status(response.status) => {
                    permit.record_success();
                    return Err(ResilienceError::UpstreamStatus {
                        url: url.to_string(),
                        status: response.status,
                    });
                }
                Ok(response) => {
                    permit.record_failure();
                    format!("HTTP {}", response.status)
                }
                Err(e) => {
                    permit.record_failure();
                    e.to_string()
                }
            };

            if attempt >= max_attempts {
                return Err(self.unavailable(url, attempt, reason));
            }
            if breaker.phase() != CircuitPhase::Closed {
                warn!(attempts = attempt, "Circuit opened, abandoning retries");
                return Err(self.unavailable(url, attempt, reason));
            }

            let delay = self.retry.delay_for(attempt);
            warn!(
                attempt,
                delay_ms = delay.as_millis() as u64,
                reason = %reason,
                "Transient upstream failure, retrying"
            );
            tokio::time::sleep(delay).await;
            last_reason = reason;
        }
    }

    fn unavailable(&self, url: &str, attempts: u32, reason: String) -> ResilienceError {
        warn!(attempts, reason = %reason, "Upstream retries exhausted");
        ResilienceError::UpstreamUnavailable {
            url: url.to_string(),
            attempts,
            reason,
        }
    }

    async fn send(&self, url: &str) -> Result<HttpResponse, TransportError> {
        match tokio::time::timeout(self.config.request_timeout, self.transport.get(url)).await {
            Ok(outcome) => outcome,
            Err(_) => Err(TransportError::Timeout),
        }
    }
}
