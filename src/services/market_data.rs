//! Snapshot providers: assemble indicator readings for the signal engine.

use crate::config::Config;
use crate::metrics::Metrics;
use crate::models::snapshot::{Indicator, Reading, Snapshot};
use crate::services::cot::CotClient;
use crate::services::derived::{trailing_change_bps, year_over_year, MONTHLY_PERIODS_PER_YEAR};
use crate::services::error::DataError;
use crate::services::fred::FredClient;
use async_trait::async_trait;
use chrono::{Months, NaiveDate, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

pub const REAL_YIELD_SERIES: &str = "DFII10";
pub const BROAD_DOLLAR_SERIES: &str = "DTWEXBGS";
pub const GOLD_FIX_SERIES: &str = "GOLDAMGBD228NLBM";
pub const CPI_SERIES: &str = "CPIAUCSL";
pub const VIX_SERIES: &str = "VIXCLS";
pub const FED_FUNDS_SERIES: &str = "FEDFUNDS";

#[async_trait]
pub trait MacroDataProvider: Send + Sync {
    /// Assemble a complete snapshot. Unavailable indicators are missing.
    async fn fetch_snapshot(&self) -> Snapshot;
}

/// Fetches every indicator from FRED and the CFTC concurrently.
pub struct LiveMacroProvider {
    fred: FredClient,
    cot: CotClient,
    observation_start: NaiveDate,
    rate_change_lookback: usize,
    metrics: Option<Arc<Metrics>>,
}

impl LiveMacroProvider {
    pub fn new(config: &Config) -> Result<Self, DataError> {
        Ok(Self::with_clients(
            config,
            FredClient::new(config)?,
            CotClient::new(config)?,
        ))
    }

    pub fn with_clients(config: &Config, fred: FredClient, cot: CotClient) -> Self {
        Self {
            fred,
            cot,
            observation_start: config.observation_start,
            rate_change_lookback: config.rate_change_lookback,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Year-over-year needs a year of history before the display window.
    fn cpi_start(&self) -> NaiveDate {
        self.observation_start
            .checked_sub_months(Months::new(MONTHLY_PERIODS_PER_YEAR as u32 + 1))
            .unwrap_or(self.observation_start)
    }

    fn resolve(&self, indicator: Indicator, result: Result<Reading, DataError>) -> Reading {
        let reading = match result {
            Ok(reading) => reading,
            Err(e) => {
                warn!(
                    indicator = indicator.key(),
                    error = %e,
                    "LiveMacroProvider: {} unavailable, treating as missing",
                    indicator
                );
                Reading::missing()
            }
        };
        if reading.is_missing() {
            if let Some(metrics) = &self.metrics {
                metrics.record_missing(indicator);
            }
        }
        reading
    }
}

#[async_trait]
impl MacroDataProvider for LiveMacroProvider {
    async fn fetch_snapshot(&self) -> Snapshot {
        let cpi_start = self.cpi_start();
        let (real_yield, dollar, gold, vix, cpi, fed_funds, positioning) = tokio::join!(
            self.fred.latest(REAL_YIELD_SERIES),
            self.fred.latest(BROAD_DOLLAR_SERIES),
            self.fred.latest(GOLD_FIX_SERIES),
            self.fred.latest(VIX_SERIES),
            self.fred.observations_since(CPI_SERIES, cpi_start),
            self.fred.observations(FED_FUNDS_SERIES),
            self.cot.net_speculative(),
        );

        let cpi_yoy = cpi.map(|obs| year_over_year(&obs, MONTHLY_PERIODS_PER_YEAR));
        let rate_change =
            fed_funds.map(|obs| trailing_change_bps(&obs, self.rate_change_lookback));

        let snapshot = Snapshot::builder()
            .as_of(Utc::now())
            .with_reading(Indicator::RealYield10Y, self.resolve(Indicator::RealYield10Y, real_yield))
            .with_reading(Indicator::BroadDollarIndex, self.resolve(Indicator::BroadDollarIndex, dollar))
            .with_reading(Indicator::GoldPrice, self.resolve(Indicator::GoldPrice, gold))
            .with_reading(Indicator::CpiYoy, self.resolve(Indicator::CpiYoy, cpi_yoy))
            .with_reading(Indicator::Vix, self.resolve(Indicator::Vix, vix))
            .with_reading(
                Indicator::PolicyRateChangeBps,
                self.resolve(Indicator::PolicyRateChangeBps, rate_change),
            )
            .with_reading(
                Indicator::EurNetSpeculative,
                self.resolve(Indicator::EurNetSpeculative, positioning),
            )
            .build();

        if let Some(metrics) = &self.metrics {
            metrics.snapshot_fetches_total.inc();
        }
        info!(
            missing = ?snapshot.missing_indicators(),
            "LiveMacroProvider: snapshot assembled"
        );
        snapshot
    }
}

/// Serves a fixed snapshot. Counts fetches so cache behaviour can be observed.
pub struct StaticMacroProvider {
    snapshot: Snapshot,
    fetches: AtomicUsize,
}

impl StaticMacroProvider {
    pub fn new(snapshot: Snapshot) -> Self {
        Self {
            snapshot,
            fetches: AtomicUsize::new(0),
        }
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MacroDataProvider for StaticMacroProvider {
    async fn fetch_snapshot(&self) -> Snapshot {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.snapshot.clone()
    }
}
