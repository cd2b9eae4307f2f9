//! Summary statistics of a population.
//!
//! These are the records handed to an [`OutputSink`](crate::storage::OutputSink):
//! - per-patch gene means, standard deviations and occupancy
//! - the mean reaction norm of the whole population
//!
//! [`evaluate_payoff`] replays a recorded population without breeding.

pub mod payoff;
pub mod reaction_norm;
pub mod summary;

pub use payoff::{cycle_generations, evaluate_payoff, PayoffEvaluation};
pub use reaction_norm::ReactionNorm;
pub use summary::{GenerationSummary, PatchSummary};
