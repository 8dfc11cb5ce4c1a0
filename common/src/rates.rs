//! Exchange-rate snapshots and historical series.
//!
//! Field names follow the upstream provider payloads, so these types are
//! deserialized straight from the response bodies.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::currency::{CurrencyCode, SupportedCurrencyCatalog};

fn default_amount() -> Decimal {
    Decimal::ONE
}

fn check_rates(rates: &BTreeMap<CurrencyCode, Decimal>) -> Result<(), String> {
    match rates.iter().find(|(_, rate)| **rate < Decimal::ZERO) {
        Some((code, rate)) => Err(format!("negative rate {} for {}", rate, code)),
        None => Ok(()),
    }
}

/// Latest rates for one base currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeRateSnapshot {
    /// Amount of base currency the rates are quoted for.
    #[serde(default = "default_amount")]
    pub amount: Decimal,
    /// Currency the rates are expressed against.
    #[serde(rename = "base")]
    pub base_currency: CurrencyCode,
    /// Business day the rates belong to.
    #[serde(rename = "date")]
    pub as_of_date: NaiveDate,
    /// Rate per quote currency.
    pub rates: BTreeMap<CurrencyCode, Decimal>,
}

impl ExchangeRateSnapshot {
    /// Create a snapshot quoted for one unit of the base currency.
    pub fn new(
        base_currency: CurrencyCode,
        as_of_date: NaiveDate,
        rates: BTreeMap<CurrencyCode, Decimal>,
    ) -> Self {
        Self {
            amount: Decimal::ONE,
            base_currency,
            as_of_date,
            rates,
        }
    }

    /// Rate for a quote currency, if the snapshot carries one.
    pub fn rate_for(&self, code: &str) -> Option<Decimal> {
        self.rates.get(code).copied()
    }

    /// Check that no rate is negative.
    pub fn validate(&self) -> Result<(), String> {
        check_rates(&self.rates)
    }
}

/// Per-day rates for a base currency over a date range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoricalRateSeries {
    #[serde(default = "default_amount")]
    pub amount: Decimal,
    #[serde(rename = "base")]
    pub base_currency: CurrencyCode,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Rates keyed by date, iterated in date order.
    pub rates: BTreeMap<NaiveDate, BTreeMap<CurrencyCode, Decimal>>,
}

impl HistoricalRateSeries {
    /// Number of dates in the series.
    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    /// Dates carried by the series, in order.
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.rates.keys().copied().collect()
    }

    /// Window of the series for a 1-based page.
    ///
    /// Skips `(page_number - 1) * page_size` dates and keeps up to
    /// `page_size`. A page past the end has no rates. Amount, base and the
    /// range boundaries are copied unchanged.
    pub fn page(&self, page_number: u32, page_size: u32) -> Self {
        let size = page_size as usize;
        let skip = (page_number.saturating_sub(1) as usize).saturating_mul(size);

        Self {
            amount: self.amount,
            base_currency: self.base_currency.clone(),
            start_date: self.start_date,
            end_date: self.end_date,
            rates: self
                .rates
                .iter()
                .skip(skip)
                .take(size)
                .map(|(date, rates)| (*date, rates.clone()))
                .collect(),
        }
    }

    /// Check that no rate on any date is negative.
    pub fn validate(&self) -> Result<(), String> {
        for (date, rates) in &self.rates {
            check_rates(rates).map_err(|e| format!("{} on {}", e, date))?;
        }
        Ok(())
    }

    /// Check that every quoted currency is offered by `catalog`.
    pub fn check_currencies(&self, catalog: &SupportedCurrencyCatalog) -> Result<(), String> {
        for (date, rates) in &self.rates {
            if let Some(code) = rates.keys().find(|code| !catalog.contains(code.code())) {
                return Err(format!("unsupported currency {} on {}", code, date));
            }
        }
        Ok(())
    }
}

/// Request for a page of historical rates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoricalRatesRequest {
    pub base_currency: CurrencyCode,
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
    /// 1-based page number.
    pub page_number: u32,
    /// Dates per page.
    pub page_size: u32,
}

impl HistoricalRatesRequest {
    /// Default page size.
    pub const DEFAULT_PAGE_SIZE: u32 = 5;

    /// Create a request for the first page.
    pub fn new(base_currency: CurrencyCode, from_date: NaiveDate, to_date: NaiveDate) -> Self {
        Self {
            base_currency,
            from_date,
            to_date,
            page_number: 1,
            page_size: Self::DEFAULT_PAGE_SIZE,
        }
    }

    /// Select a page.
    pub fn with_page(mut self, page_number: u32, page_size: u32) -> Self {
        self.page_number = page_number;
        self.page_size = page_size;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn make_series(days: u32) -> HistoricalRateSeries {
        let rates = (1..=days)
            .map(|d| {
                let mut day = BTreeMap::new();
                day.insert(CurrencyCode::usd(), Decimal::from(d));
                (date(d), day)
            })
            .collect();

        HistoricalRateSeries {
            amount: Decimal::ONE,
            base_currency: CurrencyCode::eur(),
            start_date: date(1),
            end_date: date(days.max(1)),
            rates,
        }
    }

    #[test]
    fn test_page_windows() {
        let series = make_series(5);

        assert_eq!(series.page(2, 2).dates(), vec![date(3), date(4)]);
        assert_eq!(series.page(3, 2).dates(), vec![date(5)]);
        assert!(series.page(4, 2).is_empty());
    }

    #[test]
    fn test_page_keeps_series_metadata() {
        let series = make_series(5);
        let page = series.page(9, 2);

        assert!(page.is_empty());
        assert_eq!(page.base_currency, CurrencyCode::eur());
        assert_eq!(page.start_date, date(1));
        assert_eq!(page.end_date, date(5));
        assert_eq!(page.amount, Decimal::ONE);
    }

    #[test]
    fn test_snapshot_parses_latest_payload() {
        let body = r#"{"amount":1.0,"base":"USD","date":"2024-03-01","rates":{"INR":83,"EUR":0.92}}"#;
        let snapshot: ExchangeRateSnapshot = serde_json::from_str(body).unwrap();

        assert_eq!(snapshot.base_currency, CurrencyCode::usd());
        assert_eq!(snapshot.as_of_date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(snapshot.rate_for("INR"), Some(dec!(83)));
        assert_eq!(snapshot.rate_for("EUR"), Some(dec!(0.92)));
        assert_eq!(snapshot.rate_for("XYZ"), None);
        assert!(snapshot.validate().is_ok());
    }

    #[test]
    fn test_series_parses_history_payload() {
        let body = r#"{
            "amount": 1.0,
            "base": "EUR",
            "start_date": "2024-01-02",
            "end_date": "2024-01-03",
            "rates": {
                "2024-01-03": {"USD": 1.0919},
                "2024-01-02": {"USD": 1.0956}
            }
        }"#;
        let series: HistoricalRateSeries = serde_json::from_str(body).unwrap();

        assert_eq!(series.len(), 2);
        assert_eq!(series.dates(), vec![date(2), date(3)]);
    }

    #[test]
    fn test_negative_rate_rejected() {
        let mut rates = BTreeMap::new();
        rates.insert(CurrencyCode::usd(), dec!(-1.5));
        let snapshot = ExchangeRateSnapshot::new(CurrencyCode::eur(), date(1), rates);

        assert!(snapshot.validate().is_err());
    }

    #[test]
    fn test_negative_zero_rate_accepted() {
        let mut zero = Decimal::ZERO;
        zero.set_sign_negative(true);
        let mut rates = BTreeMap::new();
        rates.insert(CurrencyCode::usd(), zero);
        let snapshot = ExchangeRateSnapshot::new(CurrencyCode::eur(), date(1), rates);

        assert!(snapshot.validate().is_ok());
    }

    #[test]
    fn test_series_currencies_checked_against_catalog() {
        let series = make_series(3);
        let mut catalog = SupportedCurrencyCatalog::new();
        catalog.insert("EUR", "Euro");

        assert!(series.check_currencies(&catalog).is_err());

        catalog.insert("USD", "United States Dollar");
        assert!(series.check_currencies(&catalog).is_ok());
    }

    proptest! {
        #[test]
        fn pages_partition_the_series(days in 0u32..28, page_size in 1u32..8) {
            let series = make_series(days);
            let pages = (days + page_size - 1) / page_size;

            let mut seen = Vec::new();
            for page_number in 1..=pages {
                let page = series.page(page_number, page_size);
                prop_assert!(page.len() <= page_size as usize);
                seen.extend(page.dates());
            }

            prop_assert_eq!(seen, series.dates());
            prop_assert!(series.page(pages + 1, page_size).is_empty());
        }
    }
}
