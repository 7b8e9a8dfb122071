//! Unit tests for signal engine

use macrosignals::models::signal::{Instrument, RawSignal, SignalDirection};
use macrosignals::models::snapshot::{Indicator, Reading, Snapshot};
use macrosignals::signals::engine::{derive_signals, SignalEngine};
use macrosignals::signals::rules::{Rule, RuleSet};
use std::collections::HashSet;

fn full_snapshot() -> Snapshot {
    Snapshot::builder()
        .with(Indicator::RealYield10Y, -0.4)
        .with(Indicator::BroadDollarIndex, 94.0)
        .with(Indicator::GoldPrice, 2350.0)
        .with(Indicator::CpiYoy, 5.2)
        .with(Indicator::Vix, 31.0)
        .with(Indicator::PolicyRateChangeBps, -50.0)
        .with(Indicator::EurNetSpeculative, -72_500.0)
        .build()
}

/// A grid of snapshots touching both sides of every threshold.
fn snapshot_grid() -> Vec<Snapshot> {
    let real_yields = [f64::NAN, -0.5, 0.0, 0.5, 1.0, 1.5];
    let dollar = [f64::NAN, 90.0, 95.0, 110.0, 120.0, 125.0];
    let vix = [f64::NAN, 15.0, 25.0];
    let rate = [f64::NAN, -30.0, -25.0, 0.0, 25.0, 40.0];
    let positioning = [f64::NAN, -60_000.0, 0.0, 50_000.0, 60_000.0];

    let mut grid = Vec::new();
    for ry in real_yields {
        for dx in dollar {
            for v in vix {
                for r in rate {
                    for p in positioning {
                        grid.push(
                            Snapshot::builder()
                                .with(Indicator::RealYield10Y, ry)
                                .with(Indicator::BroadDollarIndex, dx)
                                .with(Indicator::Vix, v)
                                .with(Indicator::PolicyRateChangeBps, r)
                                .with(Indicator::EurNetSpeculative, p)
                                .with(Indicator::CpiYoy, if ry.is_nan() { 4.5 } else { 3.0 })
                                .build(),
                        );
                    }
                }
            }
        }
    }
    grid
}

#[test]
fn test_empty_snapshot_produces_no_signals() {
    let table = derive_signals(&Snapshot::default());
    assert!(table.is_empty());
}

#[test]
fn test_no_duplicate_instrument_direction_pairs() {
    for snapshot in snapshot_grid() {
        let table = derive_signals(&snapshot);
        let mut seen = HashSet::new();
        for signal in &table {
            assert!(
                seen.insert((signal.instrument, signal.direction)),
                "duplicate {:?} {:?} for {:?}",
                signal.instrument,
                signal.direction,
                snapshot
            );
        }
    }
}

#[test]
fn test_confidence_is_non_increasing() {
    for snapshot in snapshot_grid() {
        let table = derive_signals(&snapshot);
        for pair in table.signals().windows(2) {
            assert!(pair[0].confidence >= pair[1].confidence);
        }
    }
}

#[test]
fn test_table_empty_iff_no_rule_fired() {
    let engine = SignalEngine::standard();
    for snapshot in snapshot_grid() {
        let raw = engine.collect_raw(&snapshot);
        let table = engine.derive(&snapshot);
        assert_eq!(raw.is_empty(), table.is_empty());
    }
}

#[test]
fn test_derivation_is_deterministic() {
    let snapshot = full_snapshot();
    let first = derive_signals(&snapshot);
    let second = derive_signals(&snapshot);
    assert_eq!(first, second);
    assert!(!first.is_empty());
}

#[test]
fn test_full_snapshot_ranking() {
    let table = derive_signals(&full_snapshot());
    let ranked: Vec<(Instrument, SignalDirection, u8)> = table
        .iter()
        .map(|s| (s.instrument, s.direction, s.confidence))
        .collect();

    assert_eq!(
        ranked,
        vec![
            (Instrument::XauUsd, SignalDirection::Long, 80),
            (Instrument::EurUsd, SignalDirection::Long, 70),
            (Instrument::AudJpy, SignalDirection::Short, 60),
        ]
    );
    assert!(table.signals()[0].reason.starts_with("Negative real yields"));
    // The positioning rule's LONG EURUSD @60 lost to the rate cut's @70.
    assert!(table.signals()[1].reason.contains("Policy rate down 50 bps"));
}

#[test]
fn test_missing_indicator_matches_skipped_rule() {
    let engine = SignalEngine::standard();
    let base = Snapshot::builder()
        .with(Indicator::BroadDollarIndex, 125.0)
        .with(Indicator::Vix, 30.0);

    let with_missing = base
        .clone()
        .with_reading(Indicator::RealYield10Y, Reading::missing())
        .build();
    let absent = base.build();

    assert_eq!(engine.derive(&with_missing), engine.derive(&absent));
    assert_eq!(engine.derive(&with_missing), derive_signals(&absent));
}

#[test]
fn test_nan_indicator_never_fires() {
    for indicator in Indicator::ALL {
        let snapshot = Snapshot::builder().with(indicator, f64::NAN).build();
        assert!(derive_signals(&snapshot).is_empty(), "{} fired on NaN", indicator);
    }
}

struct FixedRule(Vec<RawSignal>);

impl Rule for FixedRule {
    fn name(&self) -> &'static str {
        "fixed"
    }

    fn evaluate(&self, _snapshot: &Snapshot) -> Vec<RawSignal> {
        self.0.clone()
    }
}

#[test]
fn test_custom_rules_reduce_once_after_all_fire() {
    let engine = SignalEngine::with_rules(
        RuleSet::empty()
            .with_rule(FixedRule(vec![RawSignal::long(Instrument::XauUsd, 60, "early")]))
            .with_rule(FixedRule(vec![RawSignal::long(Instrument::XauUsd, 80, "late")])),
    );

    assert_eq!(engine.rules().len(), 2);
    let table = engine.derive(&Snapshot::default());
    assert_eq!(table.len(), 1);
    assert_eq!(table.signals()[0].reason, "late");
}
