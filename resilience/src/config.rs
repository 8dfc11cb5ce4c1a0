//! Resilient client configuration.

use std::time::Duration;

use ratewarden_common::{constants, limits};

use crate::retry::RetryPolicy;

/// Configuration for retry, circuit breaking and timeouts.
#[derive(Debug, Clone)]
pub struct ResilienceConfig {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Delay before the first retry.
    pub initial_backoff: Duration,
    /// Consecutive transient failures that open a circuit.
    pub failure_threshold: u32,
    /// How long an open circuit fails fast.
    pub break_duration: Duration,
    /// Timeout for each attempt.
    pub request_timeout: Duration,
}

impl Default for ResilienceConfig {
    fn default() -> Self {
        Self {
            max_retries: limits::MAX_RETRIES,
            initial_backoff: constants::initial_backoff(),
            failure_threshold: limits::CIRCUIT_FAILURE_THRESHOLD,
            break_duration: constants::circuit_break_duration(),
            request_timeout: constants::request_timeout(),
        }
    }
}

impl ResilienceConfig {
    /// Load overrides from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(retries) = std::env::var("UPSTREAM_MAX_RETRIES") {
            if let Ok(retries) = retries.parse() {
                config.max_retries = retries;
            }
        }

        if let Ok(secs) = std::env::var("UPSTREAM_TIMEOUT_SECS") {
            if let Ok(secs) = secs.parse() {
                config.request_timeout = Duration::from_secs(secs);
            }
        }

        if let Ok(threshold) = std::env::var("CIRCUIT_FAILURE_THRESHOLD") {
            if let Ok(threshold) = threshold.parse() {
                config.failure_threshold = threshold;
            }
        }

        if let Ok(secs) = std::env::var("CIRCUIT_BREAK_SECS") {
            if let Ok(secs) = secs.parse() {
                config.break_duration = Duration::from_secs(secs);
            }
        }

        config
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.failure_threshold == 0 {
            return Err("Circuit failure threshold cannot be 0".to_string());
        }

        if self.request_timeout.is_zero() {
            return Err("Request timeout cannot be zero".to_string());
        }

        Ok(())
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_retries, self.initial_backoff)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ResilienceConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.retry_policy(), RetryPolicy::default());
        assert_eq!(config.failure_threshold, 5);
        assert_eq!(config.break_duration, Duration::from_secs(30));
    }

    #[test]
    fn test_invalid_config() {
        let config = ResilienceConfig {
            failure_threshold: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
