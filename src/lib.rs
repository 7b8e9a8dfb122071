//! Macro signal engine: derives ranked FX and gold trade signals from a
//! snapshot of macroeconomic and positioning indicators.

pub mod config;
pub mod core;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod services;
pub mod signals;
