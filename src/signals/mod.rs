//! Signal derivation: rules, ranking and the engine that ties them together.

pub mod engine;
pub mod ranking;
pub mod rules;

pub use engine::{derive_signals, SignalEngine};
pub use ranking::rank_signals;
pub use rules::{Rule, RuleSet};
