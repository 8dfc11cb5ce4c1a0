//! FX error types.

use ratewarden_resilience::ResilienceError;
use thiserror::Error;

/// Errors that can occur when serving exchange rates.
#[derive(Debug, Error)]
pub enum FxError {
    /// The upstream call failed: circuit open, retries exhausted, or an
    /// error status.
    #[error(transparent)]
    Upstream(#[from] ResilienceError),

    /// The response body was not the expected JSON.
    #[error("Failed to parse {endpoint} response: {source}")]
    Deserialization {
        endpoint: String,
        source: serde_json::Error,
    },

    /// The response parsed but breaks a data invariant.
    #[error("Invalid {endpoint} payload: {reason}")]
    InvalidPayload { endpoint: String, reason: String },

    /// Currency code is not in the provider's catalog.
    #[error("Currency not supported: {0}")]
    UnsupportedCurrency(String),

    /// Request parameters are out of range.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl FxError {
    /// Whether the call failed fast on an open circuit, without a network
    /// attempt.
    pub fn is_circuit_open(&self) -> bool {
        matches!(self, FxError::Upstream(ResilienceError::CircuitOpen { .. }))
    }

    /// Check if a later call may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            FxError::Upstream(e) => e.is_retryable(),
            _ => false,
        }
    }

    /// Get error code for callers.
    pub fn error_code(&self) -> &'static str {
        match self {
            FxError::Upstream(e) => e.error_code(),
            FxError::Deserialization { .. } => "DESERIALIZATION_ERROR",
            FxError::InvalidPayload { .. } => "INVALID_PAYLOAD",
            FxError::UnsupportedCurrency(_) => "UNSUPPORTED_CURRENCY",
            FxError::InvalidRequest(_) => "INVALID_REQUEST",
            FxError::Configuration(_) => "CONFIGURATION_ERROR",
        }
    }
}

/// Result type for FX operations.
pub type FxResult<T> = Result<T, FxError>;
