//! Threshold rules mapping snapshot conditions to candidate signals.
//!
//! Each rule looks at the snapshot only. Rules never see each other's
//! output, so contradicting recommendations are resolved by the ranking
//! step, not here.

use crate::models::signal::{Instrument, RawSignal};
use crate::models::snapshot::{Indicator, Snapshot};

pub const POLICY_RATE_MOVE_BPS: f64 = 25.0;
pub const REAL_YIELD_FLOOR_PCT: f64 = 0.0;
pub const REAL_YIELD_CEILING_PCT: f64 = 1.0;
pub const INFLATION_HEDGE_PCT: f64 = 4.0;
pub const DOLLAR_EXTREME_HIGH: f64 = 120.0;
pub const DOLLAR_EXTREME_LOW: f64 = 95.0;
pub const RISK_OFF_VIX: f64 = 25.0;
pub const CROWDED_POSITIONING_CONTRACTS: f64 = 50_000.0;

/// An independent predicate over a snapshot that emits zero or more signals.
pub trait Rule {
    fn name(&self) -> &'static str;

    fn evaluate(&self, snapshot: &Snapshot) -> Vec<RawSignal>;
}

/// Ordered collection of rules. Order defines emission order.
pub struct RuleSet {
    rules: Vec<Box<dyn Rule + Send + Sync>>,
}

impl RuleSet {
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// The full macro rule set.
    pub fn standard() -> Self {
        Self::empty()
            .with_rule(PolicyRateBias)
            .with_rule(RealYieldGold)
            .with_rule(InflationHedge)
            .with_rule(DollarMeanReversion)
            .with_rule(RiskSentiment)
            .with_rule(CarryProxy)
            .with_rule(PositioningContrarian)
    }

    pub fn with_rule(mut self, rule: impl Rule + Send + Sync + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(dyn Rule + Send + Sync)> {
        self.rules.iter().map(|r| r.as_ref())
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::standard()
    }
}

/// Trailing Fed funds moves of a full hike or cut bias USD and gold.
pub struct PolicyRateBias;

impl Rule for PolicyRateBias {
    fn name(&self) -> &'static str {
        "policy_rate_bias"
    }

    fn evaluate(&self, snapshot: &Snapshot) -> Vec<RawSignal> {
        let change = snapshot.get(Indicator::PolicyRateChangeBps);
        let Some(bps) = change.value() else {
            return Vec::new();
        };

        if change.at_least(POLICY_RATE_MOVE_BPS) {
            vec![
                RawSignal::short(
                    Instrument::EurUsd,
                    70,
                    format!("Policy rate up {:.0} bps over trailing window: USD tightening bias", bps),
                ),
                RawSignal::short(
                    Instrument::XauUsd,
                    60,
                    format!("Policy rate up {:.0} bps: higher carry cost for gold", bps),
                ),
            ]
        } else if change.at_most(-POLICY_RATE_MOVE_BPS) {
            vec![
                RawSignal::long(
                    Instrument::EurUsd,
                    70,
                    format!("Policy rate down {:.0} bps over trailing window: USD easing bias", bps.abs()),
                ),
                RawSignal::long(
                    Instrument::XauUsd,
                    60,
                    format!("Policy rate down {:.0} bps: lower carry cost for gold", bps.abs()),
                ),
            ]
        } else {
            Vec::new()
        }
    }
}

/// Real yields are the opportunity cost of holding gold.
pub struct RealYieldGold;

impl Rule for RealYieldGold {
    fn name(&self) -> &'static str {
        "real_yield_gold"
    }

    fn evaluate(&self, snapshot: &Snapshot) -> Vec<RawSignal> {
        let real_yield = snapshot.get(Indicator::RealYield10Y);
        let Some(value) = real_yield.value() else {
            return Vec::new();
        };

        if real_yield.below(REAL_YIELD_FLOOR_PCT) {
            vec![RawSignal::long(
                Instrument::XauUsd,
                80,
                format!(
                    "Negative real yields ({:.2}%) lower the opportunity cost of holding gold",
                    value
                ),
            )]
        } else if real_yield.above(REAL_YIELD_CEILING_PCT) {
            vec![RawSignal::short(
                Instrument::XauUsd,
                70,
                format!(
                    "Real yield above 1% ({:.2}%) raises the opportunity cost of holding gold",
                    value
                ),
            )]
        } else {
            Vec::new()
        }
    }
}

pub struct InflationHedge;

impl Rule for InflationHedge {
    fn name(&self) -> &'static str {
        "inflation_hedge"
    }

    fn evaluate(&self, snapshot: &Snapshot) -> Vec<RawSignal> {
        let cpi = snapshot.get(Indicator::CpiYoy);
        match cpi.value() {
            Some(value) if cpi.above(INFLATION_HEDGE_PCT) => vec![RawSignal::long(
                Instrument::XauUsd,
                70,
                format!("CPI inflation at {:.1}% YoY: gold as inflation hedge", value),
            )],
            _ => Vec::new(),
        }
    }
}

/// Extremes in the broad dollar index tend to revert.
pub struct DollarMeanReversion;

impl Rule for DollarMeanReversion {
    fn name(&self) -> &'static str {
        "dollar_mean_reversion"
    }

    fn evaluate(&self, snapshot: &Snapshot) -> Vec<RawSignal> {
        let index = snapshot.get(Indicator::BroadDollarIndex);
        let Some(value) = index.value() else {
            return Vec::new();
        };

        if index.at_least(DOLLAR_EXTREME_HIGH) {
            vec![RawSignal::long(
                Instrument::XauUsd,
                55,
                format!("USD basket extreme at {:.1}: mean reversion favours gold", value),
            )]
        } else if index.at_most(DOLLAR_EXTREME_LOW) {
            vec![RawSignal::long(
                Instrument::XauUsd,
                65,
                format!("USD basket weak at {:.1}: soft dollar supports gold", value),
            )]
        } else {
            Vec::new()
        }
    }
}

pub struct RiskSentiment;

impl Rule for RiskSentiment {
    fn name(&self) -> &'static str {
        "risk_sentiment"
    }

    fn evaluate(&self, snapshot: &Snapshot) -> Vec<RawSignal> {
        let vix = snapshot.get(Indicator::Vix);
        match vix.value() {
            Some(value) if vix.at_least(RISK_OFF_VIX) => vec![
                RawSignal::short(
                    Instrument::AudJpy,
                    60,
                    format!("VIX at {:.1}: risk-off flows favour the yen", value),
                ),
                RawSignal::long(
                    Instrument::XauUsd,
                    60,
                    format!("VIX at {:.1}: risk-off demand for gold", value),
                ),
            ],
            _ => Vec::new(),
        }
    }
}

/// Shares the real-yield ceiling with [`RealYieldGold`] but trades USDJPY.
pub struct CarryProxy;

impl Rule for CarryProxy {
    fn name(&self) -> &'static str {
        "carry_proxy"
    }

    fn evaluate(&self, snapshot: &Snapshot) -> Vec<RawSignal> {
        let real_yield = snapshot.get(Indicator::RealYield10Y);
        match real_yield.value() {
            Some(value) if real_yield.above(REAL_YIELD_CEILING_PCT) => vec![RawSignal::long(
                Instrument::UsdJpy,
                65,
                format!("Real yield at {:.2}%: positive USD carry versus JPY", value),
            )],
            _ => Vec::new(),
        }
    }
}

/// Fades crowded speculative positioning in EUR futures.
pub struct PositioningContrarian;

impl Rule for PositioningContrarian {
    fn name(&self) -> &'static str {
        "positioning_contrarian"
    }

    fn evaluate(&self, snapshot: &Snapshot) -> Vec<RawSignal> {
        let net = snapshot.get(Indicator::EurNetSpeculative);
        let Some(value) = net.value() else {
            return Vec::new();
        };
        let contracts = group_thousands(value.round() as i64);

        if net.above(CROWDED_POSITIONING_CONTRACTS) {
            vec![RawSignal::short(
                Instrument::EurUsd,
                60,
                format!(
                    "Net speculative EUR positioning at {} contracts: crowded long, fade it",
                    contracts
                ),
            )]
        } else if net.below(-CROWDED_POSITIONING_CONTRACTS) {
            vec![RawSignal::long(
                Instrument::EurUsd,
                60,
                format!(
                    "Net speculative EUR positioning at {} contracts: crowded short, fade it",
                    contracts
                ),
            )]
        } else {
            Vec::new()
        }
    }
}

/// Formats a signed integer with comma thousands separators.
pub(crate) fn group_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        grouped.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}
