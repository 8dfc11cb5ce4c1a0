//! Ratewarden CLI
//!
//! Exchange-rate lookups through the cached, resilient rate provider.

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ratewarden_fx::{FxConfig, HttpRateProvider};

mod commands;

use commands::Command;

/// Ratewarden CLI
#[derive(Parser, Debug)]
#[command(name = "ratewarden")]
#[command(about = "Cached exchange-rate lookups")]
struct Args {
    /// Rate provider base URL (overrides CURRENCY_PROVIDER_BASE_URL)
    #[arg(long)]
    base_url: Option<String>,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

fn init_logging(json: bool) {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
    );
    let registry = tracing_subscriber::registry().with(filter);

    // Logs go to stderr so stdout carries only the JSON result.
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.json_logs);

    // Load configuration
    let mut config = FxConfig::from_env();
    if let Some(url) = args.base_url {
        config.provider_base_url = url;
    }
    if let Err(e) = config.validate() {
        error!(error = %e, "Invalid configuration");
        return Err(anyhow::anyhow!("Configuration error: {}", e));
    }

    info!(provider = %config.provider_base_url, "Starting Ratewarden");

    let provider = HttpRateProvider::from_config(&config)?;
    let output = commands::run(&provider, args.command).await?;
    println!("{}", output);

    Ok(())
}
