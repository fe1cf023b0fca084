use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::Deserialize;
use std::{fs, path::PathBuf};
use tracing::debug;

pub const API_KEY_VAR: &str = "API_KEY";

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// ExchangeRate-API (v6.exchangerate-api.com)
    #[default]
    ExchangerateApi,
    /// CurrencyFreaks (api.currencyfreaks.com)
    CurrencyFreaks,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ExchangeRateApiConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CurrencyFreaksConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ProvidersConfig {
    #[serde(default = "ProvidersConfig::default_exchangerate_api")]
    pub exchangerate_api: ExchangeRateApiConfig,
    #[serde(default = "ProvidersConfig::default_currency_freaks")]
    pub currency_freaks: CurrencyFreaksConfig,
}

impl ProvidersConfig {
    fn default_exchangerate_api() -> ExchangeRateApiConfig {
        ExchangeRateApiConfig {
            base_url: "https://v6.exchangerate-api.com".to_string(),
        }
    }

    fn default_currency_freaks() -> CurrencyFreaksConfig {
        CurrencyFreaksConfig {
            base_url: "https://api.currencyfreaks.com".to_string(),
        }
    }

    pub fn base_url(&self, kind: ProviderKind) -> &str {
        match kind {
            ProviderKind::ExchangerateApi => &self.exchangerate_api.base_url,
            ProviderKind::CurrencyFreaks => &self.currency_freaks.base_url,
        }
    }
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        ProvidersConfig {
            exchangerate_api: Self::default_exchangerate_api(),
            currency_freaks: Self::default_currency_freaks(),
        }
    }
}

fn default_base() -> String {
    "USD".to_string()
}

fn default_round() -> u32 {
    2
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub provider: ProviderKind,
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default = "default_base")]
    pub base: String,
    #[serde(default = "default_round")]
    pub round: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            provider: ProviderKind::default(),
            providers: ProvidersConfig::default(),
            base: default_base(),
            round: default_round(),
        }
    }
}

impl AppConfig {
    /// Loads the config file at the default location, falling back to defaults
    /// when no file exists there.
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!("No config file at {}, using defaults", config_path.display());
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("", "", "fxconv")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }
}

/// Everything the rate fetcher needs, resolved once at startup.
#[derive(Clone)]
pub struct FetcherConfig {
    pub api_key: Option<String>,
    pub provider: ProviderKind,
    pub base_url: String,
}

impl FetcherConfig {
    pub fn new(api_key: Option<String>, provider: ProviderKind, config: &AppConfig) -> Self {
        FetcherConfig {
            api_key,
            provider,
            base_url: config.providers.base_url(provider).to_string(),
        }
    }

    /// Reads the API key from the process environment.
    pub fn api_key_from_env() -> Option<String> {
        std::env::var(API_KEY_VAR).ok()
    }
}

// Keeps the key out of debug logs.
impl std::fmt::Debug for FetcherConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetcherConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("provider", &self.provider)
            .field("base_url", &self.base_url)
            .finish()
    }
}
