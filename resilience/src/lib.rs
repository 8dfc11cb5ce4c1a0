//! Ratewarden Resilience
//!
//! Outbound HTTP calls to the rate provider go through [`ResilientClient`],
//! which composes two policies around a pluggable [`HttpTransport`]:
//!
//! - Retry with exponential back-off on transient failures (5xx, 408, 429,
//!   connection errors and attempt timeouts).
//! - A circuit breaker per upstream target that fails fast while the
//!   target is unhealthy.
//!
//! # Example
//!
//! ```rust,ignore
//! use ratewarden_resilience::{ResilienceConfig, ResilientClient};
//!
//! let client = ResilientClient::with_reqwest(ResilienceConfig::default())?;
//! let response = client.get("https://api.frankfurter.app/currencies").await?;
//! ```

pub mod circuit_breaker;
pub mod client;
pub mod config;
pub mod error;
pub mod retry;
pub mod transport;

pub use circuit_breaker::{CircuitBreaker, CircuitPhase, CircuitState};
pub use client::ResilientClient;
pub use config::ResilienceConfig;
pub use error::{ResilienceError, ResilienceResult};
pub use retry::{is_transient_status, RetryPolicy};
pub use transport::{HttpResponse, HttpTransport, ReqwestTransport, TransportError};

#[cfg(any(test, feature = "test-utils"))]
pub use transport::MockTransport;
