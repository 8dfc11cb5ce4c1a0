//! Ratewarden FX
//!
//! Cache-aside access to a remote exchange-rate provider.
//!
//! # Features
//!
//! - Supported-currency catalog, latest rates per base currency and
//!   historical series, each cached for five minutes
//! - Paginated historical series served from one cached fetch per date range
//! - Upstream calls through the retrying, circuit-breaking
//!   [`ResilientClient`](ratewarden_resilience::ResilientClient)
//! - Currency-code validation against the provider's catalog
//!
//! # Example
//!
//! ```rust,ignore
//! use ratewarden_fx::{FxConfig, HttpRateProvider, RateProvider};
//! use ratewarden_common::CurrencyCode;
//!
//! let provider = HttpRateProvider::from_config(&FxConfig::from_env())?;
//!
//! let snapshot = provider.get_exchange_rates(&CurrencyCode::eur()).await?;
//! let rate = provider.lookup_exchange_rate(&CurrencyCode::usd(), &CurrencyCode::inr()).await?;
//! ```

pub mod cache;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod provider;
pub mod validator;

pub use cache::{CacheStats, CacheStore, CacheStoreConfig, SharedCacheStore};
pub use config::FxConfig;
pub use endpoints::Endpoints;
pub use error::{FxError, FxResult};
pub use provider::{cache_keys, HttpRateProvider, RateProvider};
pub use validator::{is_supported, CurrencyValidator};
