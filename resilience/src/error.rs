//! Resilience error types.

use thiserror::Error;

/// Errors surfaced by the resilient client.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResilienceError {
    /// The circuit for the target is open; no request was sent.
    #[error("Circuit open for {target}")]
    CircuitOpen { target: String },

    /// Every attempt failed with a transient error.
    #[error("Upstream unavailable after {attempts} attempts for {url}: {reason}")]
    UpstreamUnavailable {
        url: String,
        attempts: u32,
        reason: String,
    },

    /// The upstream answered with a non-transient error status.
    #[error("Upstream returned HTTP {status} for {url}")]
    UpstreamStatus { url: String, status: u16 },

    /// The HTTP client could not be built.
    #[error("HTTP client setup failed: {0}")]
    ClientSetup(String),
}

impl ResilienceError {
    /// Check if a later call may succeed without any change on the caller's side.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ResilienceError::CircuitOpen { .. } | ResilienceError::UpstreamUnavailable { .. }
        )
    }

    /// Get error code for logs and callers.
    pub fn error_code(&self) -> &'static str {
        match self {
            ResilienceError::CircuitOpen { .. } => "CIRCUIT_OPEN",
            ResilienceError::UpstreamUnavailable { .. } => "UPSTREAM_UNAVAILABLE",
            ResilienceError::UpstreamStatus { .. } => "UPSTREAM_STATUS",
            ResilienceError::ClientSetup(_) => "CLIENT_SETUP",
        }
    }
}

/// Result type for resilient client operations.
pub type ResilienceResult<T> = Result<T, ResilienceError>;
