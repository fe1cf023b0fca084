//! Error taxonomy for fetching rate tables and converting amounts

use thiserror::Error;

/// Maximum number of characters of a response body kept for diagnostics.
pub const SNIPPET_LEN: usize = 200;

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("Missing API key. Put it in .env as API_KEY=...")]
    MissingCredential,

    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP {status}: {snippet}")]
    Http { status: u16, snippet: String },

    #[error("Unexpected API response: {snippet}")]
    UnexpectedResponseShape { snippet: String },

    #[error("Failed to parse API response: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Unsupported currency in set: {from}, {to}")]
    UnsupportedCurrency { from: String, to: String },

    #[error("Invalid amount: {0}")]
    InvalidAmount(f64),
}

/// Truncates `text` to at most [`SNIPPET_LEN`] characters.
pub fn snippet(text: &str) -> String {
    text.chars().take(SNIPPET_LEN).collect()
}
