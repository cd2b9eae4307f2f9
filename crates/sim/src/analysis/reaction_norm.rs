use crate::base::{scale, RunningStats};
use crate::simulation::Population;
use serde::{Deserialize, Serialize};

/// Mean reaction norm of a population.
///
/// Holds the population means of the intercept and slope of both insulation
/// channels: `(I0, b)` for the cue-reliant and `(I0p, bp)` for the
/// cue-independent channel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReactionNorm {
    pub generation: usize,
    pub i0: f64,
    pub b: f64,
    pub i0p: f64,
    pub bp: f64,
}

impl ReactionNorm {
    /// Average over every animal; all zero for an empty population.
    pub fn from_population(population: &Population) -> Self {
        let mut stats = [RunningStats::new(); 4];
        for animal in population.animals() {
            let g = animal.genome();
            for (slot, value) in stats.iter_mut().zip([g.i0(), g.b(), g.i0p(), g.bp()]) {
                slot.push(value);
            }
        }
        let [i0, b, i0p, bp] = stats.map(|s| s.mean());
        Self {
            generation: population.generation(),
            i0,
            b,
            i0p,
            bp,
        }
    }

    /// Insulation produced by the cue-reliant channel for `cue`.
    pub fn cue_reliant(&self, cue: f64) -> f64 {
        scale(self.i0) + scale(self.b) * cue
    }

    /// Insulation produced by the cue-independent channel for `cue`.
    pub fn cue_independent(&self, cue: f64) -> f64 {
        scale(self.i0p) + scale(self.bp) * cue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genome::{Animal, Genome};

    #[test]
    fn test_means_over_population() {
        let animals = vec![
            Animal::new(
                Genome::new([1.0, 0.9, 0.5, 0.2, 0.0, 2.0, 0.0, 0.0, 0.0]).unwrap(),
                0,
            ),
            Animal::new(
                Genome::new([1.0, 0.9, 0.5, 0.4, 1.0, 0.0, -2.0, 0.0, 0.0]).unwrap(),
                1,
            ),
        ];
        let population = Population::new(2, animals, 2).unwrap();
        let norm = ReactionNorm::from_population(&population);
        assert!((norm.i0 - 0.3).abs() < 1e-12);
        assert!((norm.b - 1.0).abs() < 1e-12);
        assert!((norm.i0p - 0.5).abs() < 1e-12);
        assert!((norm.bp + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_population() {
        let population = Population::new(0, Vec::new(), 1).unwrap();
        let norm = ReactionNorm::from_population(&population);
        assert_eq!(norm.i0, 0.0);
        assert_eq!(norm.bp, 0.0);
    }

    #[test]
    fn test_channel_evaluation() {
        let norm = ReactionNorm {
            generation: 0,
            i0: 0.0,
            b: 2.0,
            i0p: 2.0,
            bp: 0.0,
        };
        assert!((norm.cue_reliant(0.5) - 0.5).abs() < 1e-12);
        assert!((norm.cue_independent(0.5) - 1.0).abs() < 1e-12);
    }
}
