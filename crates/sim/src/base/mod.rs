//! Base numeric types shared by the rest of the crate.
//!
//! This module provides the payoff value type, the compressive transform used
//! to turn raw gene values into insulation responses, and a small streaming
//! accumulator for gene statistics.

pub mod fitness;
mod stats;
mod transform;

pub use fitness::Payoff;
pub use stats::RunningStats;
pub use transform::scale;
