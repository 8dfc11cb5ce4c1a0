//! Subcommands: normalize and validate input, call the provider, render JSON.

use anyhow::{bail, Result};
use chrono::NaiveDate;
use clap::Subcommand;
use serde_json::json;
use tracing::info;

use ratewarden_common::HistoricalRatesRequest;
use ratewarden_fx::{CurrencyValidator, RateProvider};

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// List the currencies offered by the provider
    Currencies,

    /// Latest rates for a base currency
    Latest {
        /// Base currency code
        #[arg(short, long, default_value = "EUR")]
        base: String,
    },

    /// Rate from one currency to another
    Convert {
        /// Source currency code
        #[arg(long)]
        from: String,

        /// Target currency code
        #[arg(long)]
        to: String,
    },

    /// One page of historical rates
    History {
        /// Base currency code
        #[arg(short, long)]
        base: String,

        /// First date (YYYY-MM-DD)
        #[arg(long)]
        from: NaiveDate,

        /// Last date (YYYY-MM-DD)
        #[arg(long)]
        to: NaiveDate,

        /// Page number, starting at 1
        #[arg(long, default_value = "1")]
        page: u32,

        /// Dates per page
        #[arg(long, default_value = "5")]
        page_size: u32,
    },
}

/// Run a command and return its JSON output.
pub async fn run(provider: &dyn RateProvider, command: Command) -> Result<String> {
    let catalog = provider.get_supported_currencies().await?;
    let validator = CurrencyValidator::new(&catalog);

    let output = match command {
        Command::Currencies => serde_json::to_value(&catalog)?,
        Command::Latest { base } => {
            let base = validator.ensure_supported(&base)?;
            serde_json::to_value(provider.get_exchange_rates(&base).await?)?
        }
        Command::Convert { from, to } => {
            let from = validator.ensure_supported(&from)?;
            let to = validator.ensure_supported(&to)?;

            match provider.lookup_exchange_rate(&from, &to).await? {
                Some(rate) => json!({ "from": from, "to": to, "rate": rate }),
                None => bail!("Exchange rate not found for {}/{}", from, to),
            }
        }
        Command::History {
            base,
            from,
            to,
            page,
            page_size,
        } => {
            let request = HistoricalRatesRequest::new(base.as_str().into(), from, to)
                .with_page(page, page_size);
            let request = validator.validate_history_request(&request)?;
            let series = provider.get_historical_exchange_rates(&request).await?;
            info!(dates = series.len(), page, "Historical page served");
            serde_json::to_value(series)?
        }
    };

    Ok(serde_json::to_string_pretty(&output)?)
}
