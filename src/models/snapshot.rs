//! Indicator snapshot consumed by the signal engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Indicators known to the rule set and the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Indicator {
    #[serde(rename = "real_yield_10y")]
    RealYield10Y,
    BroadDollarIndex,
    GoldPrice,
    CpiYoy,
    Vix,
    PolicyRateChangeBps,
    EurNetSpeculative,
}

impl Indicator {
    /// Every indicator, in display order.
    pub const ALL: [Indicator; 7] = [
        Indicator::RealYield10Y,
        Indicator::BroadDollarIndex,
        Indicator::GoldPrice,
        Indicator::CpiYoy,
        Indicator::Vix,
        Indicator::PolicyRateChangeBps,
        Indicator::EurNetSpeculative,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Indicator::RealYield10Y => "real_yield_10y",
            Indicator::BroadDollarIndex => "broad_dollar_index",
            Indicator::GoldPrice => "gold_price",
            Indicator::CpiYoy => "cpi_yoy",
            Indicator::Vix => "vix",
            Indicator::PolicyRateChangeBps => "policy_rate_change_bps",
            Indicator::EurNetSpeculative => "eur_net_speculative",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Indicator::RealYield10Y => "US 10-Y Real Yield (DFII10)",
            Indicator::BroadDollarIndex => "Broad USD Index (DTWEXBGS)",
            Indicator::GoldPrice => "London Gold Fix USD (GOLD)",
            Indicator::CpiYoy => "US CPI YoY (CPIAUCSL)",
            Indicator::Vix => "CBOE Volatility Index (VIXCLS)",
            Indicator::PolicyRateChangeBps => "Fed Funds Trailing Change (FEDFUNDS)",
            Indicator::EurNetSpeculative => "EUR Net Speculative Positioning (COT)",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            Indicator::RealYield10Y | Indicator::CpiYoy => "%",
            Indicator::BroadDollarIndex | Indicator::Vix => "index",
            Indicator::GoldPrice => "USD/oz",
            Indicator::PolicyRateChangeBps => "bps",
            Indicator::EurNetSpeculative => "contracts",
        }
    }
}

impl fmt::Display for Indicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Indicator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Indicator::ALL
            .iter()
            .copied()
            .find(|indicator| indicator.key() == s)
            .ok_or_else(|| format!("Unknown indicator: {}", s))
    }
}

/// A numeric indicator value that may be missing.
///
/// Non-finite inputs are stored as missing, and every comparison against a
/// missing reading is false.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Reading(Option<f64>);

impl Reading {
    pub fn new(value: f64) -> Self {
        if value.is_finite() {
            Self(Some(value))
        } else {
            Self(None)
        }
    }

    pub const fn missing() -> Self {
        Self(None)
    }

    pub fn value(&self) -> Option<f64> {
        self.0
    }

    pub fn is_missing(&self) -> bool {
        self.0.is_none()
    }

    pub fn above(&self, threshold: f64) -> bool {
        self.0.is_some_and(|v| v > threshold)
    }

    pub fn below(&self, threshold: f64) -> bool {
        self.0.is_some_and(|v| v < threshold)
    }

    pub fn at_least(&self, threshold: f64) -> bool {
        self.0.is_some_and(|v| v >= threshold)
    }

    pub fn at_most(&self, threshold: f64) -> bool {
        self.0.is_some_and(|v| v <= threshold)
    }

    pub fn equals(&self, threshold: f64) -> bool {
        self.0.is_some_and(|v| v == threshold)
    }
}

impl From<f64> for Reading {
    fn from(value: f64) -> Self {
        Reading::new(value)
    }
}

impl From<Option<f64>> for Reading {
    fn from(value: Option<f64>) -> Self {
        value.map(Reading::new).unwrap_or_default()
    }
}

/// Complete set of indicator values for one signal-derivation pass.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Snapshot {
    readings: BTreeMap<Indicator, Reading>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    as_of: Option<DateTime<Utc>>,
}

impl Snapshot {
    pub fn builder() -> SnapshotBuilder {
        SnapshotBuilder::default()
    }

    /// Look up an indicator. Absent indicators resolve to a missing reading.
    pub fn get(&self, indicator: Indicator) -> Reading {
        self.readings.get(&indicator).copied().unwrap_or_default()
    }

    /// Look up an indicator by its key. Unknown keys resolve to missing.
    pub fn get_named(&self, key: &str) -> Reading {
        key.parse::<Indicator>()
            .map(|indicator| self.get(indicator))
            .unwrap_or_default()
    }

    pub fn as_of(&self) -> Option<DateTime<Utc>> {
        self.as_of
    }

    pub fn missing_indicators(&self) -> Vec<Indicator> {
        Indicator::ALL
            .iter()
            .copied()
            .filter(|indicator| self.get(*indicator).is_missing())
            .collect()
    }

    /// Rows for the snapshot table, one per known indicator.
    pub fn rows(&self) -> Vec<SnapshotRow> {
        Indicator::ALL
            .iter()
            .map(|indicator| SnapshotRow {
                indicator: *indicator,
                label: indicator.label(),
                unit: indicator.unit(),
                value: self.get(*indicator).value(),
            })
            .collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct SnapshotBuilder {
    readings: BTreeMap<Indicator, Reading>,
    as_of: Option<DateTime<Utc>>,
}

impl SnapshotBuilder {
    pub fn with(self, indicator: Indicator, value: f64) -> Self {
        self.with_reading(indicator, Reading::new(value))
    }

    pub fn with_reading(mut self, indicator: Indicator, reading: Reading) -> Self {
        self.readings.insert(indicator, reading);
        self
    }

    pub fn as_of(mut self, timestamp: DateTime<Utc>) -> Self {
        self.as_of = Some(timestamp);
        self
    }

    pub fn build(self) -> Snapshot {
        Snapshot {
            readings: self.readings,
            as_of: self.as_of,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SnapshotRow {
    pub indicator: Indicator,
    pub label: &'static str,
    pub unit: &'static str,
    pub value: Option<f64>,
}
