use clap::Parser;
use fxconv::cli::ui;
use fxconv::core::config::{FetcherConfig, ProviderKind};
use fxconv::core::log::init_logging;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(version, about = "Simple currency converter using a web API key")]
struct Cli {
    /// Amount to convert (e.g., 100)
    #[arg(allow_negative_numbers = true)]
    amount: f64,

    /// From currency code (e.g., USD)
    from_currency: String,

    /// To currency code (e.g., EUR)
    to_currency: String,

    /// Base currency for the rate table request [default: USD]
    #[arg(long)]
    base: Option<String>,

    /// Round the result to this many decimals [default: 2]
    #[arg(long, value_parser = clap::value_parser!(u32).range(0..=12))]
    round: Option<u32>,

    /// Rate provider to query
    #[arg(short, long, value_enum)]
    provider: Option<ProviderKind>,

    /// Show a detailed table instead of a single line
    #[arg(short, long)]
    details: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long)]
    config_path: Option<String>,
}

impl From<&Cli> for fxconv::ConvertArgs {
    fn from(cli: &Cli) -> fxconv::ConvertArgs {
        fxconv::ConvertArgs {
            amount: cli.amount,
            from: cli.from_currency.clone(),
            to: cli.to_currency.clone(),
            base: cli.base.clone(),
            round: cli.round,
            provider: cli.provider,
            details: cli.details,
        }
    }
}

/// A `.env` load failure worth reporting. A missing file is not one.
fn dotenv_failure<T>(result: &dotenvy::Result<T>) -> Option<&dotenvy::Error> {
    result.as_ref().err().filter(|e| !e.not_found())
}

/// Single diagnostic line for a failed conversion, including every cause.
fn error_line(error: &anyhow::Error) -> String {
    format!("❌ Error: {error:#}").replace('\n', " ")
}

/// Process status: 0 on success, 1 on any failure after argument parsing.
fn exit_status<T>(result: &anyhow::Result<T>) -> u8 {
    match result {
        Ok(_) => 0,
        Err(e) => {
            tracing::error!(error = ?e, "Conversion failed");
            eprintln!("{}", ui::style_text(&error_line(e), ui::StyleType::Error));
            1
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let dotenv = dotenvy::dotenv();
    let cli = Cli::parse();

    init_logging(cli.verbose);
    if let Some(e) = dotenv_failure(&dotenv) {
        tracing::debug!(error = %e, "Failed to load .env file");
    }

    let api_key = FetcherConfig::api_key_from_env();
    let result = fxconv::run((&cli).into(), api_key, cli.config_path.as_deref()).await;

    ExitCode::from(exit_status(&result))
}
