//! Rate provider trait and the cached HTTP implementation.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use ratewarden_common::{
    CurrencyCode, ExchangeRateSnapshot, HistoricalRateSeries, HistoricalRatesRequest,
    SupportedCurrencyCatalog,
};
use ratewarden_resilience::ResilientClient;

use crate::cache::{CacheStore, SharedCacheStore};
use crate::config::FxConfig;
use crate::endpoints::Endpoints;
use crate::error::{FxError, FxResult};

/// Cache keys for provider responses.
pub mod cache_keys {
    use chrono::NaiveDate;
    use ratewarden_common::CurrencyCode;

    pub const SUPPORTED_CURRENCIES: &str = "supported-currencies";

    /// Latest rates for a base currency.
    pub fn rates(base: &CurrencyCode) -> String {
        format!("rates:{}", base)
    }

    /// Full historical series for a base currency and date range. Paging
    /// parameters are not part of the key.
    pub fn history(base: &CurrencyCode, from: NaiveDate, to: NaiveDate) -> String {
        format!("history:{}:{}..{}", base, from, to)
    }
}

/// Exchange-rate operations offered to callers.
///
/// Currency codes are expected to be validated and upper case already.
#[async_trait]
pub trait RateProvider: Send + Sync {
    /// Currencies offered by the provider.
    async fn get_supported_currencies(&self) -> FxResult<SupportedCurrencyCatalog>;

    /// Latest rates against `base`.
    async fn get_exchange_rates(&self, base: &CurrencyCode) -> FxResult<ExchangeRateSnapshot>;

    /// Rate from `base` to `to`, or `None` if the snapshot has no such rate.
    async fn lookup_exchange_rate(
        &self,
        base: &CurrencyCode,
        to: &CurrencyCode,
    ) -> FxResult<Option<Decimal>> {
        let snapshot = self.get_exchange_rates(base).await?;
        Ok(snapshot.rate_for(to.code()))
    }

    /// Rate from `base` to `to`, with zero standing in for "not available".
    async fn calculate_exchange_rate(
        &self,
        base: &CurrencyCode,
        to: &CurrencyCode,
    ) -> FxResult<Decimal> {
        Ok(self
            .lookup_exchange_rate(base, to)
            .await?
            .unwrap_or(Decimal::ZERO))
    }

    /// One page of the historical series described by `request`.
    async fn get_historical_exchange_rates(
        &self,
        request: &HistoricalRatesRequest,
    ) -> FxResult<HistoricalRateSeries>;
}

/// [`RateProvider`] backed by the remote provider, with cache-aside reads.
pub struct HttpRateProvider {
    client: Arc<ResilientClient>,
    cache: SharedCacheStore,
    endpoints: Endpoints,
}

impl HttpRateProvider {
    pub fn new(client: Arc<ResilientClient>, cache: SharedCacheStore, endpoints: Endpoints) -> Self {
        Self {
            client,
            cache,
            endpoints,
        }
    }

    /// Build a provider with a `reqwest` transport and a fresh cache.
    pub fn from_config(config: &FxConfig) -> FxResult<Self> {
        config.validate().map_err(FxError::Configuration)?;

        let client = ResilientClient::with_reqwest(config.resilience.clone())?;
        let cache = CacheStore::with_config(config.cache.clone());

        Ok(Self::new(
            Arc::new(client),
            Arc::new(cache),
            Endpoints::new(config.provider_base_url.clone()),
        ))
    }

    pub fn cache(&self) -> &SharedCacheStore {
        &self.cache
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Return the cached value under `key`, or fetch, check, cache and
    /// return it. Nothing is cached when the fetch or the check fails.
    async fn get_or_fetch<T, C>(
        &self,
        key: &str,
        endpoint: &'static str,
        url: String,
        check: C,
    ) -> FxResult<T>
    where
        T: DeserializeOwned + Clone + Send + Sync + 'static,
        C: Fn(&T) -> Result<(), String> + Send,
    {
        if let Some(hit) = self.cache.get::<T>(key) {
            return Ok(hit);
        }

        info!(endpoint, url = %url, "Fetching from rate provider");
        let value: T = self.fetch(endpoint, &url).await?;

        if let Err(reason) = check(&value) {
            warn!(endpoint, reason = %reason, "Provider payload rejected");
            return Err(FxError::InvalidPayload {
                endpoint: endpoint.to_string(),
                reason,
            });
        }

        self.cache.insert(key, value.clone());
        Ok(value)
    }

    async fn fetch<T: DeserializeOwned>(&self, endpoint: &'static str, url: &str) -> FxResult<T> {
        let response = self.client.get(url).await.map_err(|e| {
            warn!(endpoint, url, error = %e, code = e.error_code(), "Rate provider request failed");
            FxError::from(e)
        })?;

        serde_json::from_str(&response.body).map_err(|source| {
            warn!(endpoint, url, error = %source, "Failed to parse provider response");
            FxError::Deserialization {
                endpoint: endpoint.to_string(),
                source,
            }
        })
    }
}

#[async_trait]
impl RateProvider for HttpRateProvider {
    #[instrument(skip(self))]
    async fn get_supported_currencies(&self) -> FxResult<SupportedCurrencyCatalog> {
        self.get_or_fetch(
            cache_keys::SUPPORTED_CURRENCIES,
            "currencies",
            self.endpoints.currencies(),
            |_: &SupportedCurrencyCatalog| Ok(()),
        )
        .await
    }

    #[instrument(skip(self), fields(base = %base))]
    async fn get_exchange_rates(&self, base: &CurrencyCode) -> FxResult<ExchangeRateSnapshot> {
        self.get_or_fetch(
            &cache_keys::rates(base),
            "latest",
            self.endpoints.latest(base),
            ExchangeRateSnapshot::validate,
        )
        .await
    }

    #[instrument(skip(self, request), fields(
        base = %request.base_currency,
        from = %request.from_date,
        to = %request.to_date,
        page = request.page_number,
        page_size = request.page_size
    ))]
    async fn get_historical_exchange_rates(
        &self,
        request: &HistoricalRatesRequest,
    ) -> FxResult<HistoricalRateSeries> {
        let key = cache_keys::history(&request.base_currency, request.from_date, request.to_date);
        let url = self
            .endpoints
            .history(&request.base_currency, request.from_date, request.to_date);

        if let Some(series) = self.cache.get::<HistoricalRateSeries>(&key) {
            return Ok(series.page(request.page_number, request.page_size));
        }

        let catalog = self.get_supported_currencies().await?;
        let series: HistoricalRateSeries = self
            .get_or_fetch(&key, "history", url, |series: &HistoricalRateSeries| {
                series.validate()?;
                series.check_currencies(&catalog)
            })
            .await?;

        Ok(series.page(request.page_number, request.page_size))
    }
}
