//! CFTC Commitments of Traders client (public reporting Socrata API).

use crate::config::Config;
use crate::models::snapshot::Reading;
use crate::services::error::{truncate_body, DataError};
use crate::services::retry_policy;
use backon::Retryable;
use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// Legacy futures-only report.
const LEGACY_FUTURES_PATH: &str = "/resource/6dca-aqww.json";

/// Non-commercial (speculative) positioning from the latest report.
#[derive(Debug, Clone, PartialEq)]
pub struct CotPosition {
    pub report_date: Option<NaiveDate>,
    pub long: i64,
    pub short: i64,
}

impl CotPosition {
    pub fn net(&self) -> i64 {
        self.long - self.short
    }
}

#[derive(Debug, Deserialize)]
struct CotRow {
    #[serde(default)]
    report_date_as_yyyy_mm_dd: Option<String>,
    #[serde(default)]
    noncomm_positions_long_all: Value,
    #[serde(default)]
    noncomm_positions_short_all: Value,
}

/// Socrata serializes numbers as strings; accept both.
fn contracts(field: &str, value: &Value) -> Result<i64, DataError> {
    let parsed = match value {
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Number(n) => n.as_f64(),
        _ => None,
    };
    parsed
        .filter(|v| v.is_finite())
        .map(|v| v.round() as i64)
        .ok_or_else(|| DataError::Malformed(format!("{} is not a number: {}", field, value)))
}

impl CotRow {
    fn into_position(self) -> Result<CotPosition, DataError> {
        let long = contracts("noncomm_positions_long_all", &self.noncomm_positions_long_all)?;
        let short = contracts("noncomm_positions_short_all", &self.noncomm_positions_short_all)?;
        // Report dates look like "2024-06-11T00:00:00.000".
        let report_date = self
            .report_date_as_yyyy_mm_dd
            .as_deref()
            .and_then(|d| d.get(..10))
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok());
        Ok(CotPosition {
            report_date,
            long,
            short,
        })
    }
}

pub struct CotClient {
    http: Client,
    base_url: String,
    market_code: String,
    max_retries: usize,
}

impl CotClient {
    pub fn new(config: &Config) -> Result<Self, DataError> {
        let http = Client::builder().timeout(config.request_timeout).build()?;
        Ok(Self::with_client(config, http))
    }

    pub fn with_client(config: &Config, http: Client) -> Self {
        Self {
            http,
            base_url: config.cot_base_url.trim_end_matches('/').to_string(),
            market_code: config.cot_market_code.clone(),
            max_retries: config.max_retries,
        }
    }

    pub async fn latest_position(&self) -> Result<CotPosition, DataError> {
        (|| self.fetch_latest())
            .retry(retry_policy(self.max_retries))
            .when(DataError::is_transient)
            .notify(|err: &DataError, delay: Duration| {
                warn!(
                    market = %self.market_code,
                    error = %err,
                    delay_ms = delay.as_millis() as u64,
                    "CotClient: retrying latest report"
                );
            })
            .await
    }

    /// Net speculative contracts (long minus short).
    pub async fn net_speculative(&self) -> Result<Reading, DataError> {
        let position = self.latest_position().await?;
        Ok(Reading::new(position.net() as f64))
    }

    async fn fetch_latest(&self) -> Result<CotPosition, DataError> {
        let url = format!("{}{}", self.base_url, LEGACY_FUTURES_PATH);
        let response = self
            .http
            .get(&url)
            .query(&[
                ("cftc_contract_market_code", self.market_code.as_str()),
                ("$order", "report_date_as_yyyy_mm_dd DESC"),
                ("$limit", "1"),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(DataError::Status {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        let rows: Vec<CotRow> = serde_json::from_str(&body)
            .map_err(|e| DataError::Malformed(format!("COT {}: {}", self.market_code, e)))?;
        let row = rows.into_iter().next().ok_or_else(|| DataError::Empty {
            series: format!("COT {}", self.market_code),
        })?;
        let position = row.into_position()?;

        debug!(
            market = %self.market_code,
            long = position.long,
            short = position.short,
            net = position.net(),
            "CotClient: latest report"
        );
        Ok(position)
    }
}
