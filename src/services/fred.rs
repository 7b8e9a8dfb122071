//! FRED (St. Louis Fed) time-series client.

use crate::config::Config;
use crate::models::snapshot::Reading;
use crate::services::derived::latest_value;
use crate::services::error::{truncate_body, DataError};
use crate::services::retry_policy;
use backon::Retryable;
use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

const OBSERVATIONS_PATH: &str = "/fred/series/observations";

/// A single dated observation. FRED marks unavailable points with `"."`.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub date: NaiveDate,
    pub value: Reading,
}

#[derive(Debug, Deserialize)]
struct ObservationsResponse {
    observations: Vec<RawObservation>,
}

#[derive(Debug, Deserialize)]
struct RawObservation {
    date: String,
    value: String,
}

impl RawObservation {
    fn parse(self) -> Result<Observation, DataError> {
        let date = NaiveDate::parse_from_str(&self.date, "%Y-%m-%d")
            .map_err(|e| DataError::Malformed(format!("bad observation date {}: {}", self.date, e)))?;
        let value = match self.value.trim() {
            "" | "." => Reading::missing(),
            v => v.parse::<f64>().map(Reading::new).unwrap_or_default(),
        };
        Ok(Observation { date, value })
    }
}

pub struct FredClient {
    http: Client,
    base_url: String,
    api_key: Option<String>,
    observation_start: NaiveDate,
    max_retries: usize,
}

impl FredClient {
    pub fn new(config: &Config) -> Result<Self, DataError> {
        let http = Client::builder().timeout(config.request_timeout).build()?;
        Ok(Self::with_client(config, http))
    }

    pub fn with_client(config: &Config, http: Client) -> Self {
        Self {
            http,
            base_url: config.fred_base_url.trim_end_matches('/').to_string(),
            api_key: config.fred_api_key.clone(),
            observation_start: config.observation_start,
            max_retries: config.max_retries,
        }
    }

    /// Observations from the configured start date, oldest first.
    pub async fn observations(&self, series_id: &str) -> Result<Vec<Observation>, DataError> {
        self.observations_since(series_id, self.observation_start).await
    }

    pub async fn observations_since(
        &self,
        series_id: &str,
        start: NaiveDate,
    ) -> Result<Vec<Observation>, DataError> {
        let api_key = self.api_key.as_deref().ok_or(DataError::MissingCredential)?;

        (|| self.fetch_observations(series_id, api_key, start))
            .retry(retry_policy(self.max_retries))
            .when(DataError::is_transient)
            .notify(|err: &DataError, delay: Duration| {
                warn!(
                    series = series_id,
                    error = %err,
                    delay_ms = delay.as_millis() as u64,
                    "FredClient: retrying {}",
                    series_id
                );
            })
            .await
    }

    /// Most recent available value of a series.
    pub async fn latest(&self, series_id: &str) -> Result<Reading, DataError> {
        let observations = self.observations(series_id).await?;
        Ok(latest_value(&observations))
    }

    async fn fetch_observations(
        &self,
        series_id: &str,
        api_key: &str,
        start: NaiveDate,
    ) -> Result<Vec<Observation>, DataError> {
        let url = format!("{}{}", self.base_url, OBSERVATIONS_PATH);
        let start = start.format("%Y-%m-%d").to_string();

        let response = self
            .http
            .get(&url)
            .query(&[
                ("series_id", series_id),
                ("api_key", api_key),
                ("file_type", "json"),
                ("observation_start", start.as_str()),
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

        let parsed: ObservationsResponse = serde_json::from_str(&body)
            .map_err(|e| DataError::Malformed(format!("{}: {}", series_id, e)))?;
        if parsed.observations.is_empty() {
            return Err(DataError::Empty {
                series: series_id.to_string(),
            });
        }

        let observations = parsed
            .observations
            .into_iter()
            .map(RawObservation::parse)
            .collect::<Result<Vec<_>, _>>()?;

        debug!(
            series = series_id,
            count = observations.len(),
            "FredClient: fetched {} observations",
            observations.len()
        );
        Ok(observations)
    }
}
