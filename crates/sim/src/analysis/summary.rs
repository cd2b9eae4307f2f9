use crate::base::RunningStats;
use crate::genome::{Gene, GENE_COUNT};
use crate::simulation::Population;
use serde::{Deserialize, Serialize};

/// Gene statistics of the animals on one patch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatchSummary {
    /// Patch index
    pub patch: usize,
    /// Name of the patch environment
    pub name: String,
    /// Number of animals on the patch
    pub occupancy: usize,
    /// Gene means in canonical order; all zero for an empty patch
    pub means: [f64; GENE_COUNT],
    /// Sample standard deviations in canonical order; zero below two animals
    pub std_devs: [f64; GENE_COUNT],
}

impl PatchSummary {
    /// Empty summary for a patch without animals.
    pub fn empty(patch: usize, name: impl Into<String>) -> Self {
        Self {
            patch,
            name: name.into(),
            occupancy: 0,
            means: [0.0; GENE_COUNT],
            std_devs: [0.0; GENE_COUNT],
        }
    }

    #[inline]
    pub fn mean(&self, gene: Gene) -> f64 {
        self.means[gene.index()]
    }

    #[inline]
    pub fn std_dev(&self, gene: Gene) -> f64 {
        self.std_devs[gene.index()]
    }

    /// Iterate `(gene, mean, std_dev)` in canonical order.
    pub fn genes(&self) -> impl Iterator<Item = (Gene, f64, f64)> + '_ {
        Gene::ALL
            .into_iter()
            .map(|gene| (gene, self.mean(gene), self.std_dev(gene)))
    }
}

/// Snapshot of a population at the start of a generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationSummary {
    pub generation: usize,
    /// Global time step at which the snapshot was taken
    pub time: u64,
    /// Set on the snapshot taken after the last generation
    pub is_final: bool,
    /// One entry per patch, in ascending patch order
    pub patches: Vec<PatchSummary>,
}

impl GenerationSummary {
    /// Summarize `population`, naming patches after `names`.
    ///
    /// Patches without a name fall back to `patch<N>`.
    pub fn from_population<S: AsRef<str>>(
        population: &Population,
        names: &[S],
        time: u64,
        is_final: bool,
    ) -> Self {
        let n_patches = population.n_patches();
        let mut accumulators = vec![[RunningStats::new(); GENE_COUNT]; n_patches];
        for animal in population.animals() {
            let stats = &mut accumulators[animal.position()];
            for (slot, &value) in stats.iter_mut().zip(animal.genome().values()) {
                slot.push(value);
            }
        }

        let patches = accumulators
            .iter()
            .enumerate()
            .map(|(patch, stats)| {
                let name = names
                    .get(patch)
                    .map(|n| n.as_ref().to_string())
                    .unwrap_or_else(|| format!("patch{patch}"));
                let occupancy = stats[0].count();
                if occupancy == 0 {
                    return PatchSummary::empty(patch, name);
                }
                PatchSummary {
                    patch,
                    name,
                    occupancy,
                    means: stats.map(|s| s.mean()),
                    std_devs: stats.map(|s| s.std_dev()),
                }
            })
            .collect();

        Self {
            generation: population.generation(),
            time,
            is_final,
            patches,
        }
    }

    /// Total number of animals over all patches.
    pub fn population_size(&self) -> usize {
        self.patches.iter().map(|p| p.occupancy).sum()
    }

    /// Occupancy per patch.
    pub fn occupancy(&self) -> Vec<usize> {
        self.patches.iter().map(|p| p.occupancy).collect()
    }

    /// Population-wide mean of one gene, weighted by occupancy.
    pub fn overall_mean(&self, gene: Gene) -> f64 {
        let size = self.population_size();
        if size == 0 {
            return 0.0;
        }
        self.patches
            .iter()
            .map(|p| p.mean(gene) * p.occupancy as f64)
            .sum::<f64>()
            / size as f64
    }
}
