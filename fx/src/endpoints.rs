//! Upstream provider URLs.

use chrono::NaiveDate;
use ratewarden_common::CurrencyCode;

/// Builds request URLs against the configured provider base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    base_url: String,
}

impl Endpoints {
    /// A trailing slash is added to `base_url` when missing.
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        Self { base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `{base}currencies`
    pub fn currencies(&self) -> String {
        format!("{}currencies", self.base_url)
    }

    /// `{base}latest?base={CODE}`
    pub fn latest(&self, base: &CurrencyCode) -> String {
        format!("{}latest?base={}", self.base_url, base)
    }

    /// `{base}{from}..{to}?base={CODE}`
    pub fn history(&self, base: &CurrencyCode, from: NaiveDate, to: NaiveDate) -> String {
        format!(
            "{}{}..{}?base={}",
            self.base_url,
            from.format("%Y-%m-%d"),
            to.format("%Y-%m-%d"),
            base
        )
    }
}
