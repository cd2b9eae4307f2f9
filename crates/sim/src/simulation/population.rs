//! Population management and breeding.
//!
//! A [`Population`] owns its animals and keeps the per-patch occupancy in sync
//! with membership. Breeding replaces every animal with offspring drawn in
//! proportion to lifetime payoff, under one of two regulation regimes.

use crate::base::{fitness::mean_payoff, Payoff};
use crate::errors::{BreedError, PopulationError};
use crate::evolution::{MutationModel, PayoffModel};
use crate::genome::Animal;
use rand::seq::index;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Poisson};
use rand_xoshiro::Xoshiro256PlusPlus;
use rayon::prelude::*;

/// Statistics of one breeding event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BreedStats {
    /// Number of offspring produced before resampling
    pub pool_size: usize,
    /// Population size after breeding
    pub size: usize,
    /// Mean lifetime payoff of the parents
    pub mean_payoff: f64,
}

/// Result of a breeding event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BreedOutcome {
    /// A new generation replaced the parents.
    Bred(BreedStats),
    /// No offspring were produced; the population is now empty.
    Extinct(BreedStats),
}

impl BreedOutcome {
    pub fn stats(&self) -> &BreedStats {
        match self {
            BreedOutcome::Bred(stats) | BreedOutcome::Extinct(stats) => stats,
        }
    }

    pub fn is_extinct(&self) -> bool {
        matches!(self, BreedOutcome::Extinct(_))
    }
}

/// A population of animals spread over a fixed number of patches.
#[derive(Debug, Clone)]
pub struct Population {
    /// The animals in this population
    animals: Vec<Animal>,
    /// Target size, also the carrying capacity used by the payoff
    target_size: usize,
    n_patches: usize,
    /// Animals per patch
    occupancy: Vec<usize>,
    /// Generation counter
    generation: usize,
}

impl Population {
    /// Create a population from an explicit list of animals.
    ///
    /// `size` must equal the number of animals and is used as the target size.
    pub fn new(size: usize, animals: Vec<Animal>, n_patches: usize) -> Result<Self, PopulationError> {
        if size != animals.len() {
            return Err(PopulationError::SizeMismatch {
                declared: size,
                actual: animals.len(),
            });
        }
        Self::with_target(animals, size, n_patches)
    }

    /// Create a population whose current size may differ from its target.
    ///
    /// Used for seeded starts of the variable-size regime, where the founders
    /// are fewer than the carrying capacity.
    pub fn with_target(
        animals: Vec<Animal>,
        target_size: usize,
        n_patches: usize,
    ) -> Result<Self, PopulationError> {
        if n_patches == 0 {
            return Err(PopulationError::NoPatches);
        }
        if let Some((index, animal)) = animals
            .iter()
            .enumerate()
            .find(|(_, a)| a.position() >= n_patches)
        {
            return Err(PopulationError::InvalidPosition {
                index,
                position: animal.position(),
                patches: n_patches,
            });
        }
        let mut population = Self {
            animals,
            target_size,
            n_patches,
            occupancy: Vec::new(),
            generation: 0,
        };
        population.occupancy = population.positions();
        Ok(population)
    }

    /// Founder population of random animals on uniformly chosen patches.
    pub fn random<R: Rng + ?Sized>(
        size: usize,
        n_patches: usize,
        rng: &mut R,
    ) -> Result<Self, PopulationError> {
        if n_patches == 0 {
            return Err(PopulationError::NoPatches);
        }
        let animals = (0..size).map(|_| Animal::random(n_patches, rng)).collect();
        Self::new(size, animals, n_patches)
    }

    /// Get the current generation number.
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Get the number of animals in the population.
    pub fn size(&self) -> usize {
        self.animals.len()
    }

    /// True once the population has died out.
    pub fn is_empty(&self) -> bool {
        self.animals.is_empty()
    }

    pub fn target_size(&self) -> usize {
        self.target_size
    }

    pub fn n_patches(&self) -> usize {
        self.n_patches
    }

    /// Get all animals as a slice.
    pub fn animals(&self) -> &[Animal] {
        &self.animals
    }

    /// Occupancy as of the last membership change.
    pub fn occupancy(&self) -> &[usize] {
        &self.occupancy
    }

    /// Count the animals on every patch.
    pub fn positions(&self) -> Vec<usize> {
        let mut counts = vec![0; self.n_patches];
        for animal in &self.animals {
            counts[animal.position()] += 1;
        }
        counts
    }

    /// Let every animal live one time step.
    ///
    /// Each animal draws from its own stream seeded from `rng`, so the result
    /// does not depend on how rayon schedules the work.
    pub fn react<R: Rng + ?Sized>(&mut self, env: &[f64], cue: &[f64], force: bool, rng: &mut R) {
        let seeds: Vec<u64> = (0..self.animals.len()).map(|_| rng.random()).collect();
        self.animals
            .par_iter_mut()
            .zip(seeds.par_iter())
            .for_each(|(animal, &seed)| {
                let mut local_rng = Xoshiro256PlusPlus::seed_from_u64(seed);
                animal.react(env, cue, force, &mut local_rng);
            });
    }

    /// Lifetime payoff of every animal against the current occupancy.
    pub fn payoffs(&self, model: &PayoffModel) -> Vec<Payoff> {
        self.animals
            .par_iter()
            .map(|animal| animal.lifetime_payoff(&self.occupancy, self.target_size, model))
            .collect()
    }

    /// Breed with constant population size.
    ///
    /// Each animal leaves Poisson(payoff / mean payoff) offspring. The pool is
    /// then subsampled without replacement down to the target size, or padded
    /// with copies of random pool members up to it. On error the population is
    /// left untouched.
    pub fn breed_constant<R: Rng + ?Sized>(
        &mut self,
        model: &PayoffModel,
        mutation: &MutationModel,
        rng: &mut R,
    ) -> Result<BreedOutcome, BreedError> {
        let payoffs = self.payoffs(model);
        let mean = mean_payoff(&payoffs);
        if mean <= 0.0 {
            return Err(BreedError::ZeroMeanPayoff);
        }

        let mut pool = self.offspring_pool(&payoffs, mean, mutation, rng);
        let pool_size = pool.len();
        if pool.is_empty() {
            return Err(BreedError::NoOffspring);
        }

        if pool_size > self.target_size {
            pool = subsample(pool, self.target_size, rng);
        } else if pool_size < self.target_size {
            let clones: Vec<Animal> = (0..self.target_size - pool_size)
                .map(|_| {
                    let source = &pool[rng.random_range(0..pool_size)];
                    Animal::new(*source.genome(), source.position())
                })
                .collect();
            pool.extend(clones);
        }

        self.replace(pool);
        Ok(BreedOutcome::Bred(BreedStats {
            pool_size,
            size: self.size(),
            mean_payoff: mean,
        }))
    }

    /// Breed with variable population size.
    ///
    /// Each animal leaves Poisson(payoff * q) offspring. A pool larger than the
    /// target is subsampled; a smaller one is kept as is. An empty pool leaves
    /// an empty population.
    pub fn breed_variable<R: Rng + ?Sized>(
        &mut self,
        model: &PayoffModel,
        mutation: &MutationModel,
        rng: &mut R,
    ) -> BreedOutcome {
        let payoffs = self.payoffs(model);
        let mean = mean_payoff(&payoffs);

        let mut pool = self.offspring_pool(&payoffs, model.max_payoff(), mutation, rng);
        let pool_size = pool.len();
        if pool_size > self.target_size {
            pool = subsample(pool, self.target_size, rng);
        }

        self.replace(pool);
        let stats = BreedStats {
            pool_size,
            size: self.size(),
            mean_payoff: mean,
        };
        if self.is_empty() {
            BreedOutcome::Extinct(stats)
        } else {
            BreedOutcome::Bred(stats)
        }
    }

    /// Draw offspring counts from the master stream, then create the mutated
    /// children in parallel with one seeded stream per child.
    fn offspring_pool<R: Rng + ?Sized>(
        &self,
        payoffs: &[Payoff],
        reference: f64,
        mutation: &MutationModel,
        rng: &mut R,
    ) -> Vec<Animal> {
        let mut parents = Vec::with_capacity(self.animals.len());
        for (index, payoff) in payoffs.iter().enumerate() {
            let count = poisson_count(payoff.expected_offspring(reference), rng);
            parents.extend(std::iter::repeat(index).take(count));
        }

        let seeds: Vec<u64> = (0..parents.len()).map(|_| rng.random()).collect();
        parents
            .par_iter()
            .zip(seeds.par_iter())
            .map(|(&parent, &seed)| {
                let mut local_rng = Xoshiro256PlusPlus::seed_from_u64(seed);
                self.animals[parent].offspring(mutation, &mut local_rng)
            })
            .collect()
    }

    fn replace(&mut self, animals: Vec<Animal>) {
        self.animals = animals;
        self.occupancy = self.positions();
        self.generation += 1;
    }
}

/// Poisson draw that yields 0 for a zero or invalid expectation.
fn poisson_count<R: Rng + ?Sized>(lambda: f64, rng: &mut R) -> usize {
    match Poisson::new(lambda) {
        Ok(poisson) => poisson.sample(rng) as usize,
        Err(_) => 0,
    }
}

/// Keep `amount` members of `pool`, chosen without replacement.
fn subsample<R: Rng + ?Sized>(pool: Vec<Animal>, amount: usize, rng: &mut R) -> Vec<Animal> {
    index::sample(rng, pool.len(), amount)
        .into_iter()
        .map(|i| pool[i].clone())
        .collect()
}
