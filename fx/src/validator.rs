//! Currency-code and request validation against the provider catalog.
//!
//! The rate provider trusts its inputs; callers run these checks first.

use ratewarden_common::{CurrencyCode, HistoricalRatesRequest, SupportedCurrencyCatalog};

use crate::error::{FxError, FxResult};

/// Exact, case-sensitive check of `code` against the catalog.
pub fn is_supported(code: &str, catalog: &SupportedCurrencyCatalog) -> bool {
    catalog.contains(code)
}

/// Validates caller input against one catalog snapshot.
#[derive(Debug, Clone, Copy)]
pub struct CurrencyValidator<'a> {
    catalog: &'a SupportedCurrencyCatalog,
}

impl<'a> CurrencyValidator<'a> {
    pub fn new(catalog: &'a SupportedCurrencyCatalog) -> Self {
        Self { catalog }
    }

    /// Trim and upper-case a raw code.
    pub fn normalize(code: &str) -> CurrencyCode {
        CurrencyCode::new(code)
    }

    pub fn is_supported(&self, code: &str) -> bool {
        is_supported(code, self.catalog)
    }

    /// Normalize `code` and check it is in the catalog.
    pub fn ensure_supported(&self, code: &str) -> FxResult<CurrencyCode> {
        let normalized = Self::normalize(code);
        if self.is_supported(normalized.code()) {
            Ok(normalized)
        } else {
            Err(FxError::UnsupportedCurrency(normalized.to_string()))
        }
    }

    /// Check paging bounds, currency and date order of a history request.
    ///
    /// Returns the request with its base currency normalized.
    pub fn validate_history_request(
        &self,
        request: &HistoricalRatesRequest,
    ) -> FxResult<HistoricalRatesRequest> {
        if request.page_number == 0 || request.page_size == 0 {
            return Err(FxError::InvalidRequest(
                "Page number and page size must be greater than 0".to_string(),
            ));
        }

        let base_currency = self.ensure_supported(request.base_currency.code())?;

        if request.from_date > request.to_date {
            return Err(FxError::InvalidRequest(format!(
                "From date {} cannot be after to date {}",
                request.from_date, request.to_date
            )));
        }

        Ok(HistoricalRatesRequest {
            base_currency,
            ..request.clone()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn make_catalog() -> SupportedCurrencyCatalog {
        let mut catalog = SupportedCurrencyCatalog::new();
        catalog.insert("EUR", "Euro");
        catalog.insert("USD", "United States Dollar");
        catalog
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, day).unwrap()
    }

    #[test]
    fn test_is_supported_is_exact() {
        let catalog = make_catalog();

        assert!(is_supported("EUR", &catalog));
        assert!(!is_supported("eur", &catalog));
        assert!(!is_supported("XYZ", &catalog));
        assert!(!is_supported("EUR", &SupportedCurrencyCatalog::new()));
    }

    #[test]
    fn test_ensure_supported_normalizes() {
        let catalog = make_catalog();
        let validator = CurrencyValidator::new(&catalog);

        assert_eq!(validator.ensure_supported(" usd").unwrap(), CurrencyCode::usd());
        assert!(matches!(
            validator.ensure_supported("try"),
            Err(FxError::UnsupportedCurrency(code)) if code == "TRY"
        ));
    }

    #[test]
    fn test_history_request_rules() {
        let catalog = make_catalog();
        let validator = CurrencyValidator::new(&catalog);
        let request = HistoricalRatesRequest::new(CurrencyCode::eur(), date(1), date(10));

        assert!(validator.validate_history_request(&request).is_ok());

        let zero_page = request.clone().with_page(0, 5);
        assert!(matches!(
            validator.validate_history_request(&zero_page),
            Err(FxError::InvalidRequest(_))
        ));

        let zero_size = request.clone().with_page(1, 0);
        assert!(validator.validate_history_request(&zero_size).is_err());

        let reversed = HistoricalRatesRequest::new(CurrencyCode::eur(), date(10), date(1));
        assert!(matches!(
            validator.validate_history_request(&reversed),
            Err(FxError::InvalidRequest(_))
        ));

        let unknown = HistoricalRatesRequest::new(CurrencyCode::new("GBP"), date(1), date(2));
        assert!(matches!(
            validator.validate_history_request(&unknown),
            Err(FxError::UnsupportedCurrency(_))
        ));
    }
}
