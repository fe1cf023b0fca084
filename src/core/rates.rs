//! Rate table abstractions and core types

use async_trait::async_trait;
use std::collections::HashMap;

use super::error::ConvertError;

/// Rates for every known currency, expressed as units per one unit of `base`.
#[derive(Debug, Clone, PartialEq)]
pub struct RateTable {
    pub base: String,
    pub rates: HashMap<String, f64>,
    pub updated: String,
}

impl RateTable {
    pub fn rate(&self, code: &str) -> Option<f64> {
        self.rates.get(&code.to_uppercase()).copied()
    }
}

#[async_trait]
pub trait RateSource: Send + Sync {
    /// Fetches the latest rate table for `base`.
    async fn fetch_rates(&self, base: &str) -> Result<RateTable, ConvertError>;
}
