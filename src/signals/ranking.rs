//! Deduplication and ranking of raw rule output.

use crate::models::signal::{Instrument, RankedSignalTable, RawSignal, SignalDirection};
use std::collections::HashMap;

/// Collapse raw signals into a [`RankedSignalTable`].
///
/// Signals sharing an (instrument, direction) keep only the highest
/// confidence entry; the first one seen wins a tie. Survivors are ordered by
/// descending confidence, then by the order in which they were emitted.
pub fn rank_signals(raw: Vec<RawSignal>) -> RankedSignalTable {
    let mut best: HashMap<(Instrument, SignalDirection), usize> = HashMap::new();
    let mut survivors: Vec<Option<(usize, RawSignal)>> = Vec::with_capacity(raw.len());

    for (emitted_at, signal) in raw.into_iter().enumerate() {
        match best.get(&signal.key()) {
            Some(&slot) => {
                let replace = survivors[slot]
                    .as_ref()
                    .is_some_and(|(_, current)| signal.confidence > current.confidence);
                if replace {
                    survivors[slot] = Some((emitted_at, signal));
                }
            }
            None => {
                best.insert(signal.key(), survivors.len());
                survivors.push(Some((emitted_at, signal)));
            }
        }
    }

    let mut ranked: Vec<(usize, RawSignal)> = survivors.into_iter().flatten().collect();
    ranked.sort_by(|(a_idx, a), (b_idx, b)| {
        b.confidence
            .cmp(&a.confidence)
            .then_with(|| a_idx.cmp(b_idx))
    });

    RankedSignalTable::from_ranked(ranked.into_iter().map(|(_, signal)| signal).collect())
}
