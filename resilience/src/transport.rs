//! Transport seam for outbound GET requests.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

use crate::error::{ResilienceError, ResilienceResult};

/// Status and body of an upstream response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// A 200 response with the given body.
    pub fn ok(body: impl Into<String>) -> Self {
        Self::new(200, body)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Network-level failures. All of them are transient.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("connection failed: {0}")]
    Connect(String),

    #[error("request timed out")]
    Timeout,

    #[error("failed to read response body: {0}")]
    Body(String),
}

/// Issues a single GET request with no policy applied.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn get(&self, url: &str) -> Result<HttpResponse, TransportError>;
}

/// `reqwest`-backed transport.
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Create a transport whose requests time out after `timeout`.
    pub fn new(timeout: Duration) -> ResilienceResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ResilienceError::ClientSetup(e.to_string()))?;

        Ok(Self { client })
    }
}

fn classify(error: reqwest::Error) -> TransportError {
    if error.is_timeout() {
        TransportError::Timeout
    } else {
        TransportError::Connect(error.to_string())
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &str) -> Result<HttpResponse, TransportError> {
        let response = self.client.get(url).send().await.map_err(classify)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::Timeout
            } else {
                TransportError::Body(e.to_string())
            }
        })?;

        Ok(HttpResponse { status, body })
    }
}

/// Scripted transport for testing.
///
/// Scripted outcomes are consumed first, in order; after that requests are
/// answered from the route table, and unknown URLs get a 404.
#[cfg(any(test, feature = "test-utils"))]
pub struct MockTransport {
    routes: dashmap::DashMap<String, HttpResponse>,
    script: parking_lot::Mutex<std::collections::VecDeque<Result<HttpResponse, TransportError>>>,
    requests: parking_lot::Mutex<Vec<String>>,
    delay: parking_lot::Mutex<Option<Duration>>,
}

#[cfg(any(test, feature = "test-utils"))]
impl MockTransport {
    pub fn new() -> Self {
        Self {
            routes: dashmap::DashMap::new(),
            script: parking_lot::Mutex::new(std::collections::VecDeque::new()),
            requests: parking_lot::Mutex::new(Vec::new()),
            delay: parking_lot::Mutex::new(None),
        }
    }

    /// Answer `url` with `response` once the script is exhausted.
    pub fn route(&self, url: impl Into<String>, response: HttpResponse) {
        self.routes.insert(url.into(), response);
    }

    /// Queue an outcome for the next unscripted request.
    pub fn push(&self, outcome: Result<HttpResponse, TransportError>) {
        self.script.lock().push_back(outcome);
    }

    /// Queue a bodiless response with `status`.
    pub fn push_status(&self, status: u16) {
        self.push(Ok(HttpResponse::new(status, "")));
    }

    /// Sleep this long before answering each request.
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock() = Some(delay);
    }

    /// Number of requests received.
    pub fn calls(&self) -> usize {
        self.requests.lock().len()
    }

    /// Number of requests received for `url`.
    pub fn calls_to(&self, url: &str) -> usize {
        self.requests.lock().iter().filter(|u| *u == url).count()
    }

    /// URLs requested so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().clone()
    }
}

#[cfg(any(test, feature = "test-utils"))]
impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(any(test, feature = "test-utils"))]
#[async_trait]
impl HttpTransport for MockTransport {
    async fn get(&self, url: &str) -> Result<HttpResponse, TransportError> {
        self.requests.lock().push(url.to_string());

        let delay = *self.delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(outcome) = self.script.lock().pop_front() {
            return outcome;
        }

        Ok(self
            .routes
            .get(url)
            .map(|r| r.clone())
            .unwrap_or_else(|| HttpResponse::new(404, "not found")))
    }
}
