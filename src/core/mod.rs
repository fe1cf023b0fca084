//! Core business logic abstractions

pub mod config;
pub mod convert;
pub mod error;
pub mod log;
pub mod rates;

// Re-export main types for cleaner imports
pub use convert::{Conversion, ConversionRequest, convert, round_half_even};
pub use error::ConvertError;
pub use rates::{RateSource, RateTable};
