//! Runtime configuration loaded from the environment.
//!
//! Values are read once into a [`Config`] and passed explicitly to the data
//! clients and the snapshot cache. Call `dotenvy::dotenv()` first to pick up
//! a local `.env` file.

use chrono::NaiveDate;
use std::env;
use std::time::Duration;
use thiserror::Error;
use url::Url;

pub const DEFAULT_FRED_BASE_URL: &str = "https://api.stlouisfed.org";
pub const DEFAULT_COT_BASE_URL: &str = "https://publicreporting.cftc.gov";
/// CFTC contract market code for Euro FX futures on CME.
pub const DEFAULT_COT_MARKET_CODE: &str = "099741";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value} ({reason})")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone)]
pub struct Config {
    /// FRED API key. Requests are skipped when absent.
    pub fred_api_key: Option<String>,
    pub cache_ttl: Duration,
    pub observation_start: NaiveDate,
    pub fred_base_url: String,
    pub cot_base_url: String,
    pub cot_market_code: String,
    pub request_timeout: Duration,
    /// Observations spanned by the trailing policy-rate change.
    pub rate_change_lookback: usize,
    pub max_retries: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fred_api_key: None,
            cache_ttl: Duration::from_secs(3600),
            observation_start: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default(),
            fred_base_url: DEFAULT_FRED_BASE_URL.to_string(),
            cot_base_url: DEFAULT_COT_BASE_URL.to_string(),
            cot_market_code: DEFAULT_COT_MARKET_CODE.to_string(),
            request_timeout: Duration::from_secs(10),
            rate_change_lookback: 3,
            max_retries: 2,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let fred_api_key = env::var("FRED_KEY").ok().filter(|k| !k.trim().is_empty());

        let cache_ttl = match env::var("CACHE_TTL_SECS") {
            Ok(v) => Duration::from_secs(parse_number("CACHE_TTL_SECS", &v)?),
            Err(_) => defaults.cache_ttl,
        };

        let observation_start = match env::var("OBSERVATION_START") {
            Ok(v) => NaiveDate::parse_from_str(&v, "%Y-%m-%d").map_err(|e| ConfigError::Invalid {
                key: "OBSERVATION_START",
                value: v.clone(),
                reason: e.to_string(),
            })?,
            Err(_) => defaults.observation_start,
        };

        let fred_base_url = match env::var("FRED_BASE_URL") {
            Ok(v) => parse_url("FRED_BASE_URL", &v)?,
            Err(_) => defaults.fred_base_url,
        };

        let cot_base_url = match env::var("COT_BASE_URL") {
            Ok(v) => parse_url("COT_BASE_URL", &v)?,
            Err(_) => defaults.cot_base_url,
        };

        let cot_market_code = env::var("COT_MARKET_CODE").unwrap_or(defaults.cot_market_code);

        let request_timeout = match env::var("REQUEST_TIMEOUT_SECS") {
            Ok(v) => Duration::from_secs(parse_number("REQUEST_TIMEOUT_SECS", &v)?),
            Err(_) => defaults.request_timeout,
        };

        let rate_change_lookback = match env::var("RATE_CHANGE_LOOKBACK") {
            Ok(v) => parse_number::<usize>("RATE_CHANGE_LOOKBACK", &v)?,
            Err(_) => defaults.rate_change_lookback,
        };
        if rate_change_lookback == 0 {
            return Err(ConfigError::Invalid {
                key: "RATE_CHANGE_LOOKBACK",
                value: "0".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        let max_retries = match env::var("HTTP_MAX_RETRIES") {
            Ok(v) => parse_number("HTTP_MAX_RETRIES", &v)?,
            Err(_) => defaults.max_retries,
        };

        Ok(Self {
            fred_api_key,
            cache_ttl,
            observation_start,
            fred_base_url,
            cot_base_url,
            cot_market_code,
            request_timeout,
            rate_change_lookback,
            max_retries,
        })
    }

    pub fn with_fred_api_key(mut self, key: impl Into<String>) -> Self {
        self.fred_api_key = Some(key.into());
        self
    }

    pub fn with_base_urls(mut self, fred: impl Into<String>, cot: impl Into<String>) -> Self {
        self.fred_base_url = fred.into();
        self.cot_base_url = cot.into();
        self
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }
}

/// Deployment environment name from `APP_ENV`, defaulting to `sandbox`.
pub fn get_environment() -> String {
    env::var("APP_ENV")
        .map(|e| e.to_lowercase())
        .unwrap_or_else(|_| "sandbox".to_string())
}

fn parse_number<T>(key: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse::<T>().map_err(|e| ConfigError::Invalid {
        key,
        value: value.to_string(),
        reason: e.to_string(),
    })
}

/// Validates an endpoint URL and returns it without a trailing slash.
fn parse_url(key: &'static str, value: &str) -> Result<String, ConfigError> {
    let url = Url::parse(value).map_err(|e| ConfigError::Invalid {
        key,
        value: value.to_string(),
        reason: e.to_string(),
    })?;
    if url.cannot_be_a_base() {
        return Err(ConfigError::Invalid {
            key,
            value: value.to_string(),
            reason: "not an http(s) base url".to_string(),
        });
    }
    Ok(value.trim_end_matches('/').to_string())
}
