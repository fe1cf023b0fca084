use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, instrument};

use super::normalize::normalize_body;
use crate::core::config::{FetcherConfig, ProviderKind};
use crate::core::error::{ConvertError, snippet};
use crate::core::rates::{RateSource, RateTable};

/// Upper bound on the single rate-table request.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Builds the provider URL for `base`. `base` is uppercased.
pub fn build_url(provider: ProviderKind, base_url: &str, api_key: &str, base: &str) -> String {
    let base_url = base_url.trim_end_matches('/');
    let base = base.to_uppercase();
    match provider {
        ProviderKind::ExchangerateApi => format!("{base_url}/v6/{api_key}/latest/{base}"),
        ProviderKind::CurrencyFreaks => {
            format!("{base_url}/v2.0/rates/latest?apikey={api_key}&base={base}")
        }
    }
}

// HttpRateSource implementation for RateSource
pub struct HttpRateSource {
    config: FetcherConfig,
    timeout: Duration,
}

impl HttpRateSource {
    pub fn new(config: FetcherConfig) -> Self {
        HttpRateSource {
            config,
            timeout: FETCH_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl RateSource for HttpRateSource {
    #[instrument(
        name = "RateTableFetch",
        skip(self),
        fields(provider = ?self.config.provider)
    )]
    async fn fetch_rates(&self, base: &str) -> Result<RateTable, ConvertError> {
        let api_key = match self.config.api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => key,
            _ => return Err(ConvertError::MissingCredential),
        };

        let base = base.to_uppercase();
        let url = build_url(self.config.provider, &self.config.base_url, api_key, &base);
        debug!(base = %base, "Requesting rate table from {}", self.config.base_url);

        let client = reqwest::Client::builder()
            .user_agent(concat!("fxconv/", env!("CARGO_PKG_VERSION")))
            .timeout(self.timeout)
            .build()?;

        let response = client.get(&url).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(ConvertError::Http {
                status: status.as_u16(),
                snippet: snippet(&text),
            });
        }

        let table = normalize_body(&text, &base)?;
        debug!(
            base = %table.base,
            currencies = table.rates.len(),
            updated = %table.updated,
            "Received rate table"
        );
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::AppConfig;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn source(provider: ProviderKind, api_key: Option<&str>, server: &MockServer) -> HttpRateSource {
        let mut config = FetcherConfig::new(
            api_key.map(str::to_string),
            provider,
            &AppConfig::default(),
        );
        config.base_url = server.uri();
        HttpRateSource::new(config)
    }

    #[test]
    fn test_build_url() {
        assert_eq!(
            build_url(
                ProviderKind::ExchangerateApi,
                "https://v6.exchangerate-api.com/",
                "KEY",
                "usd"
            ),
            "https://v6.exchangerate-api.com/v6/KEY/latest/USD"
        );
        assert_eq!(
            build_url(
                ProviderKind::CurrencyFreaks,
                "https://api.currencyfreaks.com",
                "KEY",
                "eur"
            ),
            "https://api.currencyfreaks.com/v2.0/rates/latest?apikey=KEY&base=EUR"
        );
    }

    #[tokio::test]
    async fn test_successful_exchangerate_api_fetch() {
        let mock_server = MockServer::start().await;
        let mock_response = r#"{
            "result": "success",
            "base_code": "USD",
            "time_last_update_utc": "Fri, 27 Mar 2026 00:00:01 +0000",
            "conversion_rates": {"USD": 1, "EUR": 0.9, "INR": 83.25}
        }"#;

        Mock::given(method("GET"))
            .and(path("/v6/test-key/latest/USD"))
            .respond_with(ResponseTemplate::new(200).set_body_string(mock_response))
            .expect(1)
            .mount(&mock_server)
            .await;

        let provider = source(ProviderKind::ExchangerateApi, Some("test-key"), &mock_server);
        let table = provider.fetch_rates("usd").await.expect("Failed to fetch rates");

        assert_eq!(table.base, "USD");
        assert_eq!(table.rate("EUR"), Some(0.9));
        assert_eq!(table.rate("INR"), Some(83.25));
        assert_eq!(table.updated, "Fri, 27 Mar 2026 00:00:01 +0000");
    }

    #[tokio::test]
    async fn test_successful_currency_freaks_fetch() {
        let mock_server = MockServer::start().await;
        let mock_response = r#"{
            "date": "2026-03-27 00:00:00+00",
            "base": "EUR",
            "rates": {"EUR": "1.0", "USD": "1.1111", "GBP": "0.86"}
        }"#;

        Mock::given(method("GET"))
            .and(path("/v2.0/rates/latest"))
            .and(query_param("apikey", "test-key"))
            .and(query_param("base", "EUR"))
            .respond_with(ResponseTemplate::new(200).set_body_string(mock_response))
            .expect(1)
            .mount(&mock_server)
            .await;

        let provider = source(ProviderKind::CurrencyFreaks, Some("test-key"), &mock_server);
        let table = provider.fetch_rates("eur").await.expect("Failed to fetch rates");

        assert_eq!(table.base, "EUR");
        assert_eq!(table.rate("USD"), Some(1.1111));
        assert_eq!(table.updated, "2026-03-27 00:00:00+00");
    }

    #[tokio::test]
    async fn test_missing_api_key_makes_no_request() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&mock_server)
            .await;

        for key in [None, Some(""), Some("   ")] {
            let provider = source(ProviderKind::ExchangerateApi, key, &mock_server);
            let result = provider.fetch_rates("USD").await;
            assert!(matches!(result, Err(ConvertError::MissingCredential)));
        }
    }

    #[tokio::test]
    async fn test_http_error_response() {
        let mock_server = MockServer::start().await;
        let body = format!(r#"{{"result":"error","error-type":"invalid-key","pad":"{}"}}"#, "x".repeat(400));

        Mock::given(method("GET"))
            .and(path("/v6/bad-key/latest/USD"))
            .respond_with(ResponseTemplate::new(403).set_body_string(body))
            .mount(&mock_server)
            .await;

        let provider = source(ProviderKind::ExchangerateApi, Some("bad-key"), &mock_server);
        let result = provider.fetch_rates("USD").await;

        match result {
            Err(ConvertError::Http { status, snippet }) => {
                assert_eq!(status, 403);
                assert_eq!(snippet.chars().count(), 200);
                assert!(snippet.contains("invalid-key"));
            }
            other => panic!("Expected HTTP error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unexpected_response_shape() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"data": {}}"#))
            .mount(&mock_server)
            .await;

        let provider = source(ProviderKind::ExchangerateApi, Some("test-key"), &mock_server);
        let result = provider.fetch_rates("USD").await;
        assert!(matches!(
            result,
            Err(ConvertError::UnexpectedResponseShape { .. })
        ));
    }

    #[tokio::test]
    async fn test_malformed_json_response() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&mock_server)
            .await;

        let provider = source(ProviderKind::ExchangerateApi, Some("test-key"), &mock_server);
        let result = provider.fetch_rates("USD").await;
        assert!(matches!(result, Err(ConvertError::Parse(_))));
    }

    fn closed_port_uri() -> String {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("Failed to bind");
        let port = listener.local_addr().expect("No local address").port();
        drop(listener);
        format!("http://127.0.0.1:{port}")
    }

    #[tokio::test]
    async fn test_connection_failure_is_transport_error() {
        let mut config = FetcherConfig::new(
            Some("test-key".to_string()),
            ProviderKind::ExchangerateApi,
            &AppConfig::default(),
        );
        config.base_url = closed_port_uri();
        let provider = HttpRateSource::new(config);

        let result = provider.fetch_rates("USD").await;
        match result {
            Err(err @ ConvertError::Transport(_)) => {
                assert!(err.to_string().starts_with("Network error:"));
            }
            other => panic!("Expected transport error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_slow_response_times_out() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"{"conversion_rates": {"USD": 1}}"#)
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&mock_server)
            .await;

        let provider = source(ProviderKind::ExchangerateApi, Some("test-key"), &mock_server)
            .with_timeout(Duration::from_millis(100));
        let result = provider.fetch_rates("USD").await;

        match result {
            Err(ConvertError::Transport(e)) => assert!(e.is_timeout(), "{e:?}"),
            other => panic!("Expected timeout, got {other:?}"),
        }
    }
}
