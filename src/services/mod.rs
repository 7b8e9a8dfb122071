//! Data acquisition: upstream API clients, derived indicators and the
//! snapshot cache that feeds the signal engine.

pub mod cache;
pub mod cot;
pub mod derived;
pub mod error;
pub mod fred;
pub mod market_data;

pub use cache::{Clock, ManualClock, SnapshotCache, SystemClock};
pub use cot::{CotClient, CotPosition};
pub use error::DataError;
pub use fred::{FredClient, Observation};
pub use market_data::{LiveMacroProvider, MacroDataProvider, StaticMacroProvider};

use backon::ExponentialBuilder;
use std::time::Duration;

/// Backoff shared by the upstream clients for transient failures.
pub(crate) fn retry_policy(max_retries: usize) -> ExponentialBuilder {
    ExponentialBuilder::default()
        .with_min_delay(Duration::from_millis(100))
        .with_max_delay(Duration::from_secs(2))
        .with_max_times(max_retries)
}
