use crate::base::{scale, Payoff};
use crate::evolution::{density_factor, MutationModel, PayoffModel};
use crate::genome::Genome;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// A single organism: its genome plus the life-history state of one generation.
///
/// Animals are never carried over between generations; breeding replaces every
/// animal with a fresh offspring whose counters start at zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Animal {
    genome: Genome,
    /// Sum of |insulation - E| over every lived step
    mismatch: f64,
    adjustments: u32,
    migrations: u32,
    insulation: f64,
    position: usize,
}

impl Animal {
    /// Create a newborn on `position`.
    ///
    /// Insulation starts at the raw `I0` gene value.
    pub fn new(genome: Genome, position: usize) -> Self {
        Self {
            insulation: genome.i0(),
            genome,
            mismatch: 0.0,
            adjustments: 0,
            migrations: 0,
            position,
        }
    }

    /// Founder with a random genome on a uniformly chosen patch.
    pub fn random<R: Rng + ?Sized>(n_patches: usize, rng: &mut R) -> Self {
        let genome = Genome::random(rng);
        let position = rng.random_range(0..n_patches.max(1));
        Self::new(genome, position)
    }

    #[inline]
    pub fn genome(&self) -> &Genome {
        &self.genome
    }

    #[inline]
    pub fn mismatch(&self) -> f64 {
        self.mismatch
    }

    #[inline]
    pub fn adjustments(&self) -> u32 {
        self.adjustments
    }

    #[inline]
    pub fn migrations(&self) -> u32 {
        self.migrations
    }

    #[inline]
    pub fn insulation(&self) -> f64 {
        self.insulation
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.position
    }

    /// Live one time step.
    ///
    /// `env` and `cue` hold the true state and the cue of every patch. The
    /// insulation update and the mismatch both use the patch the animal sits on
    /// at the start of the step, even if it migrates during the step. A forced
    /// reaction opens both the migration and the adaptation gate.
    pub fn react<R: Rng + ?Sized>(&mut self, env: &[f64], cue: &[f64], force: bool, rng: &mut R) {
        let pos = self.position;
        let n_patches = env.len();

        if force || rng.random::<f64>() < self.genome.ma() {
            if rng.random::<f64>() < self.genome.m() {
                self.migrate(n_patches, rng);
            }
        }

        if force || rng.random::<f64>() < self.genome.a() {
            self.insulation = if rng.random::<f64>() < self.genome.h() {
                scale(self.genome.i0()) + scale(self.genome.b()) * cue[pos]
            } else {
                scale(self.genome.i0p()) + scale(self.genome.bp()) * cue[pos]
            };
            self.adjustments += 1;
        }

        self.mismatch += (self.insulation - env[pos]).abs();
    }

    /// Move to a uniformly chosen other patch.
    ///
    /// With a single patch there is nowhere to go and nothing changes.
    fn migrate<R: Rng + ?Sized>(&mut self, n_patches: usize, rng: &mut R) {
        if n_patches < 2 {
            return;
        }
        let offset = rng.random_range(1..n_patches);
        self.position = (self.position + offset) % n_patches;
        self.migrations += 1;
    }

    /// Lifetime payoff given the occupancy of every patch and the carrying
    /// capacity (the configured population size).
    pub fn lifetime_payoff(&self, occupancy: &[usize], capacity: usize, model: &PayoffModel) -> Payoff {
        let crowding = occupancy.get(self.position).copied().unwrap_or(0);
        model.payoff(
            self.mismatch,
            self.adjustments,
            self.migrations,
            self.genome.is_plastic(),
            density_factor(crowding, capacity),
        )
    }

    /// A newborn child on this animal's patch, carrying a mutated copy of its genome.
    pub fn offspring<R: Rng + ?Sized>(&self, mutation: &MutationModel, rng: &mut R) -> Self {
        Self::new(self.genome.mutated(mutation, rng), self.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genome::Gene;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn genome(values: [f64; 9]) -> Genome {
        Genome::new(values).unwrap()
    }

    #[test]
    fn test_new_animal_state() {
        let g = genome([1.0, 0.9, 0.5, 0.4, -0.3, 1.0, 0.5, 0.0, 0.0]);
        let animal = Animal::new(g, 2);
        assert_eq!(animal.insulation(), 0.4);
        assert_eq!(animal.mismatch(), 0.0);
        assert_eq!(animal.adjustments(), 0);
        assert_eq!(animal.migrations(), 0);
        assert_eq!(animal.position(), 2);
    }

    #[test]
    fn test_unforced_non_plastic_only_accumulates_mismatch() {
        let g = genome([1.0, 0.0, 0.0, 0.4, 0.0, 0.0, 0.0, 0.0, 0.0]);
        let mut animal = Animal::new(g, 0);
        let mut rng = StdRng::seed_from_u64(42);
        animal.react(&[1.0], &[1.0], false, &mut rng);
        animal.react(&[-1.0], &[-1.0], false, &mut rng);
        assert_eq!(animal.adjustments(), 0);
        assert!((animal.mismatch() - (0.6 + 1.4)).abs() < 1e-12);
    }

    #[test]
    fn test_forced_reaction_uses_cue_channel() {
        // h = 1 so the cue-reliant channel is always chosen
        let g = genome([1.0, 0.0, 0.0, 2.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        let mut animal = Animal::new(g, 0);
        let mut rng = StdRng::seed_from_u64(42);
        animal.react(&[0.5], &[0.3], true, &mut rng);
        assert_eq!(animal.adjustments(), 1);
        assert!((animal.insulation() - 1.0).abs() < 1e-12);
        assert!((animal.mismatch() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_cue_independent_channel() {
        // h = 0 picks the I0p/bp channel; scale(2) = 1
        let g = genome([0.0, 0.9, 1.0, 0.0, 0.0, 0.0, 2.0, 0.0, 0.0]);
        let mut animal = Animal::new(g, 0);
        let mut rng = StdRng::seed_from_u64(5);
        animal.react(&[0.0], &[0.7], false, &mut rng);
        assert!((animal.insulation() - 0.7).abs() < 1e-12);
    }

    #[test]
    fn test_forced_migration_moves_to_other_patch() {
        let g = genome([1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0]);
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..50 {
            let mut animal = Animal::new(g, 1);
            animal.react(&[0.0, 0.0, 0.0], &[0.0, 0.0, 0.0], true, &mut rng);
            assert_ne!(animal.position(), 1);
            assert!(animal.position() < 3);
            assert_eq!(animal.migrations(), 1);
        }
    }

    #[test]
    fn test_migration_with_single_patch_is_noop() {
        let g = genome([1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0]);
        let mut animal = Animal::new(g, 0);
        let mut rng = StdRng::seed_from_u64(9);
        animal.react(&[0.0], &[0.0], true, &mut rng);
        assert_eq!(animal.position(), 0);
        assert_eq!(animal.migrations(), 0);
    }

    #[test]
    fn test_mismatch_uses_start_of_step_patch() {
        let g = genome([1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0]);
        let mut animal = Animal::new(g, 0);
        let mut rng = StdRng::seed_from_u64(13);
        // Insulation becomes scale(0) + scale(0) * C[0] = 0
        animal.react(&[0.25, 10.0], &[0.0, 0.0], true, &mut rng);
        assert_eq!(animal.position(), 1);
        assert!((animal.mismatch() - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_lifetime_payoff_density() {
        let g = genome([1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        let animal = Animal::new(g, 1);
        let model = PayoffModel::default();
        let payoff = animal.lifetime_payoff(&[0, 5], 10, &model);
        assert!((payoff.get() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_offspring_resets_state_and_keeps_position() {
        let g = genome([1.0, 0.9, 1.0, 0.3, 0.0, 1.0, 0.0, 0.0, 0.0]);
        let mut parent = Animal::new(g, 2);
        let mut rng = StdRng::seed_from_u64(1);
        parent.react(&[0.0, 0.0, 1.0], &[0.0, 0.0, 1.0], true, &mut rng);
        let child = parent.offspring(&MutationModel::none(), &mut rng);
        assert_eq!(child.position(), 2);
        assert_eq!(child.mismatch(), 0.0);
        assert_eq!(child.adjustments(), 0);
        assert_eq!(child.genome().get(Gene::I0), 0.3);
        assert_eq!(child.insulation(), 0.3);
    }
}
