//! Shared data models spanning the engine layers.

pub mod signal;
pub mod snapshot;

pub use signal::{Instrument, RankedSignalTable, RawSignal, SignalDirection};
pub use snapshot::{Indicator, Reading, Snapshot, SnapshotBuilder, SnapshotRow};
