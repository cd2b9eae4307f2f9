//! # Simulation Crate
//!
//! The `sim` crate provides the core logic for simulating the evolution of
//! phenotypic plasticity. Animals carry a nine-gene genome that decides how
//! their insulation follows a noisy environmental cue. They live on patches
//! with fluctuating environments and may migrate between them. Breeding is
//! payoff-proportional, either at a constant population size or with a
//! Poisson offspring count.
//!
//! Modules cover genomes, environments, evolutionary operators, the
//! simulation engine and replicate runner, summary statistics and storage.

pub mod analysis;
pub mod base;
pub mod environment;
pub mod errors;
pub mod evolution;
pub mod genome;
pub mod prelude;
pub mod simulation;
pub mod storage;
