//! Genomes and the animals that carry them.

mod animal;
mod genes;

pub use animal::Animal;
pub use genes::{Gene, Genome, GENE_COUNT};
