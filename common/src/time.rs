//! Timing constants shared by the cache and the upstream client.

/// Cache and resilience timing constants.
pub mod constants {
    use std::time::Duration;

    /// TTL for every cached provider response (5 minutes).
    pub fn cache_ttl() -> Duration {
        Duration::from_secs(5 * 60)
    }

    /// Per-attempt timeout for upstream requests (30 seconds).
    pub fn request_timeout() -> Duration {
        Duration::from_secs(30)
    }

    /// Delay before the first retry; doubled for each further retry (2 seconds).
    pub fn initial_backoff() -> Duration {
        Duration::from_secs(2)
    }

    /// How long an open circuit rejects requests before a trial (30 seconds).
    pub fn circuit_break_duration() -> Duration {
        Duration::from_secs(30)
    }
}

/// Policy limits.
pub mod limits {
    /// Retries after the first attempt.
    pub const MAX_RETRIES: u32 = 3;

    /// Consecutive transient failures that open a circuit.
    pub const CIRCUIT_FAILURE_THRESHOLD: u32 = 5;

    /// Upper bound on cached entries before expired ones are swept.
    pub const CACHE_MAX_ENTRIES: usize = 10_000;
}
