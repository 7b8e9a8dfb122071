//! Prometheus metrics for the HTTP layer and snapshot acquisition.

use crate::models::snapshot::Indicator;
use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};

pub struct Metrics {
    registry: Registry,
    pub http_requests_total: IntCounter,
    pub http_request_duration_seconds: Histogram,
    pub http_requests_in_flight: IntGauge,
    pub snapshot_fetches_total: IntCounter,
    pub indicator_missing_total: IntCounterVec,
    pub signals_emitted: IntGauge,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let http_requests_total =
            IntCounter::new("http_requests_total", "Total HTTP requests served")?;
        let http_request_duration_seconds = Histogram::with_opts(HistogramOpts::new(
            "http_request_duration_seconds",
            "HTTP request latency in seconds",
        ))?;
        let http_requests_in_flight =
            IntGauge::new("http_requests_in_flight", "HTTP requests currently being served")?;
        let snapshot_fetches_total = IntCounter::new(
            "snapshot_fetches_total",
            "Snapshots assembled from upstream data sources",
        )?;
        let indicator_missing_total = IntCounterVec::new(
            Opts::new(
                "indicator_missing_total",
                "Indicators that resolved to missing during snapshot assembly",
            ),
            &["indicator"],
        )?;
        let signals_emitted =
            IntGauge::new("signals_emitted", "Entries in the most recent ranked signal table")?;

        registry.register(Box::new(http_requests_total.clone()))?;
        registry.register(Box::new(http_request_duration_seconds.clone()))?;
        registry.register(Box::new(http_requests_in_flight.clone()))?;
        registry.register(Box::new(snapshot_fetches_total.clone()))?;
        registry.register(Box::new(indicator_missing_total.clone()))?;
        registry.register(Box::new(signals_emitted.clone()))?;

        Ok(Self {
            registry,
            http_requests_total,
            http_request_duration_seconds,
            http_requests_in_flight,
            snapshot_fetches_total,
            indicator_missing_total,
            signals_emitted,
        })
    }

    pub fn record_missing(&self, indicator: Indicator) {
        self.indicator_missing_total
            .with_label_values(&[indicator.key()])
            .inc();
    }

    /// Render all registered metrics in the Prometheus text format.
    pub fn export(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
