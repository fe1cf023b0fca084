pub mod normalize;
pub mod rate_api;

pub use normalize::{ProviderResponse, normalize_body};
pub use rate_api::{FETCH_TIMEOUT, HttpRateSource, build_url};
