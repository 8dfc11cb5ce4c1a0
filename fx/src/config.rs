//! Rate provider configuration.

use std::time::Duration;

use ratewarden_resilience::ResilienceConfig;

use crate::cache::CacheStoreConfig;

/// Main configuration for the rate provider.
#[derive(Debug, Clone)]
pub struct FxConfig {
    /// Base URL of the upstream rate provider.
    pub provider_base_url: String,
    /// Cache configuration.
    pub cache: CacheStoreConfig,
    /// Retry, circuit breaker and timeout configuration.
    pub resilience: ResilienceConfig,
}

impl Default for FxConfig {
    fn default() -> Self {
        Self {
            provider_base_url: "https://api.frankfurter.app/".to_string(),
            cache: CacheStoreConfig::default(),
            resilience: ResilienceConfig::default(),
        }
    }
}

impl FxConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self {
            resilience: ResilienceConfig::from_env(),
            ..Self::default()
        };

        if let Ok(url) = std::env::var("CURRENCY_PROVIDER_BASE_URL") {
            config.provider_base_url = url;
        }

        if let Ok(ttl) = std::env::var("RATE_CACHE_TTL_SECS") {
            if let Ok(ttl) = ttl.parse() {
                config.cache.default_ttl = Duration::from_secs(ttl);
            }
        }

        config
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.provider_base_url.is_empty() {
            return Err("Provider base URL cannot be empty".to_string());
        }

        if !self.provider_base_url.starts_with("http://")
            && !self.provider_base_url.starts_with("https://")
        {
            return Err(format!(
                "Provider base URL must be http(s): {}",
                self.provider_base_url
            ));
        }

        if self.cache.default_ttl.is_zero() {
            return Err("Cache TTL cannot be zero".to_string());
        }

        self.resilience.validate()
    }
}
