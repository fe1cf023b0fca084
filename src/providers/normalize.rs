//! Normalizes the supported provider response shapes into a [`RateTable`].

use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use tracing::{debug, warn};

use crate::core::error::{ConvertError, snippet};
use crate::core::rates::RateTable;

const UNKNOWN_UPDATE: &str = "unknown";

/// ExchangeRate-API `latest` body.
#[derive(Debug, Deserialize)]
pub struct ExchangeRateApiBody {
    base_code: Option<String>,
    conversion_rates: HashMap<String, RateValue>,
    time_last_update_utc: Option<String>,
}

/// CurrencyFreaks `rates/latest` body. Rates arrive as numeric strings.
#[derive(Debug, Deserialize)]
pub struct CurrencyFreaksBody {
    base: Option<String>,
    rates: HashMap<String, RateValue>,
    date: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RateValue {
    Number(f64),
    Text(String),
    Other(Value),
}

impl RateValue {
    /// The rate as a finite, strictly positive number.
    fn usable(&self) -> Option<f64> {
        let rate = match self {
            RateValue::Number(n) => *n,
            RateValue::Text(s) => s.trim().parse().ok()?,
            RateValue::Other(_) => return None,
        };
        (rate.is_finite() && rate > 0.0).then_some(rate)
    }
}

/// A provider response, discriminated by which rates key the body carries.
#[derive(Debug)]
pub enum ProviderResponse {
    ExchangeRateApi(ExchangeRateApiBody),
    CurrencyFreaks(CurrencyFreaksBody),
}

impl ProviderResponse {
    pub fn from_body(body: &str) -> Result<Self, ConvertError> {
        let value: Value = serde_json::from_str(body)?;

        let keys = value
            .as_object()
            .map(|obj| (obj.contains_key("conversion_rates"), obj.contains_key("rates")));

        match keys {
            Some((true, _)) => {
                debug!("Detected ExchangeRate-API response shape");
                Ok(Self::ExchangeRateApi(serde_json::from_value(value)?))
            }
            Some((false, true)) => {
                debug!("Detected CurrencyFreaks response shape");
                Ok(Self::CurrencyFreaks(serde_json::from_value(value)?))
            }
            _ => Err(ConvertError::UnexpectedResponseShape {
                snippet: snippet(body),
            }),
        }
    }

    /// Produces the canonical table. `requested_base` fills in a missing base.
    pub fn normalize(self, requested_base: &str) -> RateTable {
        let (base, raw_rates, updated) = match self {
            Self::ExchangeRateApi(body) => (
                body.base_code,
                body.conversion_rates,
                body.time_last_update_utc,
            ),
            Self::CurrencyFreaks(body) => (body.base, body.rates, body.date),
        };

        let rates = collect_rates(raw_rates);
        let base = base
            .unwrap_or_else(|| requested_base.to_string())
            .to_uppercase();

        match rates.get(&base) {
            Some(rate) if (*rate - 1.0).abs() > f64::EPSILON => {
                warn!(%base, rate, "Base currency does not map to 1.0 in rate table");
            }
            None => debug!(%base, "Base currency missing from rate table"),
            _ => {}
        }

        RateTable {
            base,
            rates,
            updated: updated.unwrap_or_else(|| UNKNOWN_UPDATE.to_string()),
        }
    }
}

/// Uppercases codes and skips unusable entries. When a code appears in
/// several casings the uppercase spelling wins.
fn collect_rates(raw_rates: HashMap<String, RateValue>) -> HashMap<String, f64> {
    let mut rates = HashMap::with_capacity(raw_rates.len());

    for (code, value) in raw_rates {
        let Some(rate) = value.usable() else {
            warn!(%code, ?value, "Skipping unusable rate");
            continue;
        };

        let upper = code.to_uppercase();
        let is_canonical = upper == code;
        match rates.entry(upper) {
            Entry::Vacant(entry) => {
                entry.insert(rate);
            }
            Entry::Occupied(mut entry) => {
                warn!(
                    currency = %entry.key(),
                    duplicate = %code,
                    "Rate table lists a currency more than once"
                );
                if is_canonical {
                    entry.insert(rate);
                }
            }
        }
    }

    rates
}

/// Parses and normalizes a raw response body.
pub fn normalize_body(body: &str, requested_base: &str) -> Result<RateTable, ConvertError> {
    Ok(ProviderResponse::from_body(body)?.normalize(requested_base))
}
