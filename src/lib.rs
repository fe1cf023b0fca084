pub mod cli;
pub mod core;
pub mod providers;

use crate::core::config::{AppConfig, FetcherConfig, ProviderKind};
use crate::core::{Conversion, ConversionRequest};
use anyhow::Result;
use tracing::{debug, info};

/// Inputs for one conversion, as collected from the command line.
#[derive(Debug, Clone, Default)]
pub struct ConvertArgs {
    pub amount: f64,
    pub from: String,
    pub to: String,
    pub base: Option<String>,
    pub round: Option<u32>,
    pub provider: Option<ProviderKind>,
    pub details: bool,
}

/// Runs a single conversion end to end.
///
/// `api_key` is resolved by the caller; this function never reads the
/// process environment.
pub async fn run(
    args: ConvertArgs,
    api_key: Option<String>,
    config_path: Option<&str>,
) -> Result<Conversion> {
    info!("Currency converter starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let base = args.base.unwrap_or_else(|| config.base.clone()).to_uppercase();
    let round = args.round.unwrap_or(config.round);
    let request = ConversionRequest::new(args.amount, &args.from, &args.to, round)?;

    let provider = args.provider.unwrap_or(config.provider);
    let fetcher_config = FetcherConfig::new(api_key, provider, &config);
    debug!(?fetcher_config, "Resolved fetcher configuration");

    let source = providers::HttpRateSource::new(fetcher_config);
    cli::convert::run(&source, request, &base, args.details).await
}
