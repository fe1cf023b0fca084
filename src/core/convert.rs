//! Cross-rate conversion and result rounding

use rust_decimal::prelude::*;
use std::collections::HashMap;

use super::error::ConvertError;
use super::rates::RateTable;

/// A single conversion parsed from the command line.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionRequest {
    pub amount: f64,
    pub from: String,
    pub to: String,
    pub round_digits: u32,
}

impl ConversionRequest {
    pub fn new(amount: f64, from: &str, to: &str, round_digits: u32) -> Result<Self, ConvertError> {
        if !amount.is_finite() {
            return Err(ConvertError::InvalidAmount(amount));
        }
        Ok(Self {
            amount,
            from: from.to_uppercase(),
            to: to.to_uppercase(),
            round_digits,
        })
    }
}

/// The outcome of applying a request to a fetched rate table.
#[derive(Debug, Clone, PartialEq)]
pub struct Conversion {
    pub request: ConversionRequest,
    pub result: f64,
    pub rounded: f64,
    /// Units of `to` per one unit of `from`.
    pub rate: f64,
    pub rates_base: String,
    pub updated: String,
}

impl Conversion {
    pub fn from_table(request: ConversionRequest, table: &RateTable) -> Result<Self, ConvertError> {
        let result = convert(request.amount, &request.from, &request.to, &table.rates)?;
        let rate = convert(1.0, &request.from, &request.to, &table.rates)?;
        Ok(Conversion {
            rounded: round_half_even(result, request.round_digits),
            result,
            rate,
            rates_base: table.base.clone(),
            updated: table.updated.clone(),
            request,
        })
    }
}

/// Converts `amount` from `from_code` to `to_code`.
///
/// Both rates are relative to the same base, so the base cancels out of the
/// ratio and any two currencies in the table can be converted.
pub fn convert(
    amount: f64,
    from_code: &str,
    to_code: &str,
    rates: &HashMap<String, f64>,
) -> Result<f64, ConvertError> {
    let from_code = from_code.to_uppercase();
    let to_code = to_code.to_uppercase();

    match (rates.get(&from_code), rates.get(&to_code)) {
        (Some(rate_from), Some(rate_to)) => Ok(amount * (rate_to / rate_from)),
        _ => Err(ConvertError::UnsupportedCurrency {
            from: from_code,
            to: to_code,
        }),
    }
}

/// Rounds `value` to `digits` decimal places, ties to even.
///
/// Rounding happens on the shortest decimal form of the float, so `0.125`
/// rounds to `0.12` and `0.135` to `0.14`. Values outside the decimal range
/// are returned unchanged.
pub fn round_half_even(value: f64, digits: u32) -> f64 {
    Decimal::from_f64(value)
        .map(|d| d.round_dp_with_strategy(digits, RoundingStrategy::MidpointNearestEven))
        .and_then(|d| d.to_f64())
        .unwrap_or(value)
}
