//! Terminal presentation for conversions

pub mod convert;
pub mod ui;
