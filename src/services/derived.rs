//! Indicators derived from observation series.
//!
//! Series are oldest first. The latest point is the last available one;
//! comparison points are counted back by position in the raw series, so an
//! unavailable base makes the result missing rather than shifting it.

use crate::models::snapshot::Reading;
use crate::services::fred::Observation;

/// Observations per year for a monthly series.
pub const MONTHLY_PERIODS_PER_YEAR: usize = 12;

/// Derived values are rounded to this many decimal places to absorb float
/// noise at rule thresholds.
const DERIVED_PRECISION: f64 = 1e6;

fn round_derived(value: f64) -> Reading {
    Reading::new((value * DERIVED_PRECISION).round() / DERIVED_PRECISION)
}

/// Latest available value and the value `periods` observations before it.
fn latest_and_base(observations: &[Observation], periods: usize) -> Option<(f64, f64)> {
    if periods == 0 {
        return None;
    }
    let latest_idx = observations.iter().rposition(|o| !o.value.is_missing())?;
    let base_idx = latest_idx.checked_sub(periods)?;
    Some((
        observations[latest_idx].value.value()?,
        observations[base_idx].value.value()?,
    ))
}

/// Last available value in the series.
pub fn latest_value(observations: &[Observation]) -> Reading {
    observations
        .iter()
        .rev()
        .find(|o| !o.value.is_missing())
        .map(|o| o.value)
        .unwrap_or_default()
}

/// Percent change between the latest value and the one `periods` earlier.
pub fn year_over_year(observations: &[Observation], periods: usize) -> Reading {
    match latest_and_base(observations, periods) {
        Some((latest, base)) if base != 0.0 => round_derived((latest / base - 1.0) * 100.0),
        _ => Reading::missing(),
    }
}

/// Change over the trailing `periods` observations of a percent-valued
/// series, in basis points.
pub fn trailing_change_bps(observations: &[Observation], periods: usize) -> Reading {
    match latest_and_base(observations, periods) {
        Some((latest, earlier)) => round_derived((latest - earlier) * 100.0),
        None => Reading::missing(),
    }
}
