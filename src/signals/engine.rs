//! Signal engine: evaluates every rule against a snapshot, then ranks once.

use crate::models::signal::{RankedSignalTable, RawSignal};
use crate::models::snapshot::Snapshot;
use crate::signals::ranking::rank_signals;
use crate::signals::rules::RuleSet;
use tracing::{debug, warn};

pub struct SignalEngine {
    rules: RuleSet,
}

impl SignalEngine {
    pub fn standard() -> Self {
        Self::with_rules(RuleSet::standard())
    }

    pub fn with_rules(rules: RuleSet) -> Self {
        if rules.is_empty() {
            warn!("SignalEngine: no rules installed, every table will be empty");
        }
        Self { rules }
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Run all rules to completion and reduce their output into a ranked table.
    pub fn derive(&self, snapshot: &Snapshot) -> RankedSignalTable {
        let raw = self.collect_raw(snapshot);
        let raw_count = raw.len();
        let table = rank_signals(raw);

        debug!(
            raw_signals = raw_count,
            ranked_signals = table.len(),
            "SignalEngine: derived {} signals from {} candidates",
            table.len(),
            raw_count
        );
        table
    }

    /// Concatenated rule output in emission order, before ranking.
    pub fn collect_raw(&self, snapshot: &Snapshot) -> Vec<RawSignal> {
        let mut raw = Vec::new();
        for rule in self.rules.iter() {
            let emitted = rule.evaluate(snapshot);
            if !emitted.is_empty() {
                debug!(rule = rule.name(), count = emitted.len(), "SignalEngine: rule fired");
            }
            raw.extend(emitted);
        }
        raw
    }
}

impl Default for SignalEngine {
    fn default() -> Self {
        Self::standard()
    }
}

/// Derive ranked signals with the standard rule set.
pub fn derive_signals(snapshot: &Snapshot) -> RankedSignalTable {
    SignalEngine::standard().derive(snapshot)
}
