//! Trade signal models.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Tradable instruments the rule set can recommend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Instrument {
    #[serde(rename = "XAUUSD")]
    XauUsd,
    #[serde(rename = "EURUSD")]
    EurUsd,
    #[serde(rename = "AUDJPY")]
    AudJpy,
    #[serde(rename = "USDJPY")]
    UsdJpy,
}

impl Instrument {
    pub fn symbol(&self) -> &'static str {
        match self {
            Instrument::XauUsd => "XAUUSD",
            Instrument::EurUsd => "EURUSD",
            Instrument::AudJpy => "AUDJPY",
            Instrument::UsdJpy => "USDJPY",
        }
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SignalDirection {
    Long,
    Short,
}

impl fmt::Display for SignalDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalDirection::Long => f.write_str("LONG"),
            SignalDirection::Short => f.write_str("SHORT"),
        }
    }
}

/// One rule's recommendation before deduplication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawSignal {
    pub instrument: Instrument,
    pub direction: SignalDirection,
    /// Rule-assigned conviction, 0-100.
    pub confidence: u8,
    pub reason: String,
}

impl RawSignal {
    pub fn new(
        instrument: Instrument,
        direction: SignalDirection,
        confidence: u8,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            instrument,
            direction,
            confidence: confidence.min(100),
            reason: reason.into(),
        }
    }

    pub fn long(instrument: Instrument, confidence: u8, reason: impl Into<String>) -> Self {
        Self::new(instrument, SignalDirection::Long, confidence, reason)
    }

    pub fn short(instrument: Instrument, confidence: u8, reason: impl Into<String>) -> Self {
        Self::new(instrument, SignalDirection::Short, confidence, reason)
    }

    pub fn key(&self) -> (Instrument, SignalDirection) {
        (self.instrument, self.direction)
    }
}

/// Deduplicated signals ordered by descending confidence.
///
/// Holds at most one entry per (instrument, direction). Built only by
/// [`crate::signals::ranking::rank_signals`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct RankedSignalTable {
    signals: Vec<RawSignal>,
}

impl RankedSignalTable {
    pub(crate) fn from_ranked(signals: Vec<RawSignal>) -> Self {
        Self { signals }
    }

    pub fn signals(&self) -> &[RawSignal] {
        &self.signals
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RawSignal> {
        self.signals.iter()
    }

    pub fn len(&self) -> usize {
        self.signals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }

    pub fn find(&self, instrument: Instrument, direction: SignalDirection) -> Option<&RawSignal> {
        self.signals
            .iter()
            .find(|s| s.instrument == instrument && s.direction == direction)
    }
}

impl<'a> IntoIterator for &'a RankedSignalTable {
    type Item = &'a RawSignal;
    type IntoIter = std::slice::Iter<'a, RawSignal>;

    fn into_iter(self) -> Self::IntoIter {
        self.signals.iter()
    }
}
