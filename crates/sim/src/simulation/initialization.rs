//! Founder populations.
//!
//! A run either starts from random founders or from the per-patch gene
//! statistics of an earlier run, typically the final summary of a
//! constant-size run used to seed a variable-size one.

use crate::analysis::GenerationSummary;
use crate::errors::{GenomeError, PopulationError};
use crate::genome::{Animal, Gene, Genome, GENE_COUNT};
use crate::simulation::Population;
use rand::Rng;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

/// How the founder population is created.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum InitialPopulation {
    /// Random genomes on uniformly chosen patches.
    #[default]
    Random,
    /// Genomes drawn around recorded per-patch means.
    FromSummary(GenerationSummary),
}

impl InitialPopulation {
    /// Create the founders.
    ///
    /// For [`InitialPopulation::FromSummary`] each patch receives as many
    /// founders as it had occupants, and every gene is drawn from
    /// `Normal(mean, |std|)`; a zero standard deviation gives the mean exactly.
    /// Probability genes are clamped into [0, 1]. A summary without occupants
    /// is rejected.
    pub fn build<R: Rng + ?Sized>(
        &self,
        target_size: usize,
        n_patches: usize,
        rng: &mut R,
    ) -> Result<Population, PopulationError> {
        match self {
            InitialPopulation::Random => Population::random(target_size, n_patches, rng),
            InitialPopulation::FromSummary(summary) => {
                if summary.population_size() == 0 {
                    return Err(PopulationError::NoFounders {
                        generation: summary.generation,
                    });
                }
                let mut animals = Vec::with_capacity(summary.population_size());
                for patch in &summary.patches {
                    if patch.patch >= n_patches {
                        return Err(PopulationError::InvalidPosition {
                            index: animals.len(),
                            position: patch.patch,
                            patches: n_patches,
                        });
                    }
                    for _ in 0..patch.occupancy {
                        let genome = seeded_genome(&patch.means, &patch.std_devs, rng)?;
                        animals.push(Animal::new(genome, patch.patch));
                    }
                }
                Population::with_target(animals, target_size, n_patches)
            }
        }
    }

    /// Clock of the recorded run, if the founders come from one.
    pub fn start_time(&self) -> Option<u64> {
        match self {
            InitialPopulation::Random => None,
            InitialPopulation::FromSummary(summary) => Some(summary.time),
        }
    }
}

fn seeded_genome<R: Rng + ?Sized>(
    means: &[f64; GENE_COUNT],
    std_devs: &[f64; GENE_COUNT],
    rng: &mut R,
) -> Result<Genome, GenomeError> {
    let mut values = [0.0; GENE_COUNT];
    for gene in Gene::ALL {
        let i = gene.index();
        let sd = std_devs[i].abs();
        values[i] = if sd > 0.0 {
            means[i] + sd * rng.sample::<f64, _>(StandardNormal)
        } else {
            means[i]
        };
    }
    clamp_unit_genes(&mut values);
    Genome::new(values)
}

fn clamp_unit_genes(values: &mut [f64; GENE_COUNT]) {
    for gene in Gene::UNIT_INTERVAL {
        let slot = &mut values[gene.index()];
        *slot = slot.clamp(0.0, 1.0);
    }
}
