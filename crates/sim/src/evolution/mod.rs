//! Evolution module providing mutation and selection.
//!
//! This module implements the evolutionary processes acting on genomes:
//! - **Mutation**: independent Gaussian perturbation of eligible genes
//! - **Selection**: lifetime payoff from mismatch, costs and crowding

pub mod mutation;
pub mod selection;

pub use mutation::{MutationModel, DEFAULT_MUTATION_STEP};
pub use selection::{density_factor, PayoffModel};
