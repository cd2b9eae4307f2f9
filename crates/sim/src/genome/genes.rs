use crate::errors::GenomeError;
use crate::evolution::MutationModel;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of genes in every genome.
pub const GENE_COUNT: usize = 9;

/// Named gene loci, in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Gene {
    /// Probability of relying on the cue when adjusting
    H,
    /// Plasticity switch; values above 0.5 enable costly plasticity
    S,
    /// Per-step probability of adjusting insulation
    A,
    /// Baseline insulation of the cue-reliant channel
    I0,
    /// Baseline insulation of the cue-independent channel
    I0p,
    /// Cue slope of the cue-reliant channel
    B,
    /// Cue slope of the cue-independent channel
    Bp,
    /// Migration probability
    M,
    /// Probability of being able to migrate in a step
    Ma,
}

impl Gene {
    /// All genes in canonical order.
    pub const ALL: [Gene; GENE_COUNT] = [
        Gene::H,
        Gene::S,
        Gene::A,
        Gene::I0,
        Gene::I0p,
        Gene::B,
        Gene::Bp,
        Gene::M,
        Gene::Ma,
    ];

    /// Genes that mutate in every reproduction event.
    pub const ALWAYS_MUTABLE: [Gene; 5] = [Gene::H, Gene::S, Gene::I0, Gene::I0p, Gene::M];

    /// Genes that only exist in plastic genomes; zero otherwise.
    pub const PLASTIC: [Gene; 4] = [Gene::A, Gene::B, Gene::Bp, Gene::Ma];

    /// Genes interpreted as probabilities and clamped to [0, 1].
    pub const UNIT_INTERVAL: [Gene; 5] = [Gene::H, Gene::S, Gene::A, Gene::M, Gene::Ma];

    /// Position of this gene in the canonical order.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Short name used in summaries and on disk.
    pub fn name(self) -> &'static str {
        match self {
            Gene::H => "h",
            Gene::S => "s",
            Gene::A => "a",
            Gene::I0 => "I0",
            Gene::I0p => "I0p",
            Gene::B => "b",
            Gene::Bp => "bp",
            Gene::M => "m",
            Gene::Ma => "ma",
        }
    }
}

impl fmt::Display for Gene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Gene {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Gene::ALL
            .into_iter()
            .find(|gene| gene.name() == s)
            .ok_or_else(|| format!("Unknown gene: {s}"))
    }
}

/// The heritable reaction norm of an animal.
///
/// Values are kept in canonical [`Gene`] order. A genome whose switch `s` is
/// at most 0.5 is non-plastic, and its plastic genes (`a`, `b`, `bp`, `ma`)
/// are held at zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Genome {
    values: [f64; GENE_COUNT],
}

impl Genome {
    /// Build a genome from raw gene values.
    ///
    /// Values must be finite. The plasticity switch is applied immediately, so
    /// the plastic genes of a non-plastic genome are zeroed.
    pub fn new(values: [f64; GENE_COUNT]) -> Result<Self, GenomeError> {
        for gene in Gene::ALL {
            let value = values[gene.index()];
            if !value.is_finite() {
                return Err(GenomeError::NonFinite {
                    gene: gene.name(),
                    value,
                });
            }
        }
        let mut genome = Self { values };
        genome.enforce_plasticity();
        Ok(genome)
    }

    /// Build a genome from a slice, which must hold exactly nine values.
    pub fn from_slice(values: &[f64]) -> Result<Self, GenomeError> {
        let values: [f64; GENE_COUNT] =
            values
                .try_into()
                .map_err(|_| GenomeError::WrongLength {
                    expected: GENE_COUNT,
                    found: values.len(),
                })?;
        Self::new(values)
    }

    /// Random founder genome.
    ///
    /// Founders always rely on the cue (`h = 1`) and never migrate
    /// (`m = ma = 0`); everything else is drawn uniformly.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut values = [0.0; GENE_COUNT];
        values[Gene::H.index()] = 1.0;
        values[Gene::S.index()] = rng.random::<f64>();
        values[Gene::A.index()] = rng.random::<f64>();
        values[Gene::I0.index()] = rng.random_range(-1.0..1.0);
        values[Gene::I0p.index()] = rng.random_range(-1.0..1.0);
        values[Gene::B.index()] = rng.random_range(-2.0..2.0);
        values[Gene::Bp.index()] = rng.random_range(-2.0..2.0);
        let mut genome = Self { values };
        genome.enforce_plasticity();
        genome
    }

    /// Value of a single gene.
    #[inline]
    pub fn get(&self, gene: Gene) -> f64 {
        self.values[gene.index()]
    }

    /// All values in canonical order.
    #[inline]
    pub fn values(&self) -> &[f64; GENE_COUNT] {
        &self.values
    }

    #[inline]
    pub fn h(&self) -> f64 {
        self.get(Gene::H)
    }

    #[inline]
    pub fn s(&self) -> f64 {
        self.get(Gene::S)
    }

    #[inline]
    pub fn a(&self) -> f64 {
        self.get(Gene::A)
    }

    #[inline]
    pub fn i0(&self) -> f64 {
        self.get(Gene::I0)
    }

    #[inline]
    pub fn i0p(&self) -> f64 {
        self.get(Gene::I0p)
    }

    #[inline]
    pub fn b(&self) -> f64 {
        self.get(Gene::B)
    }

    #[inline]
    pub fn bp(&self) -> f64 {
        self.get(Gene::Bp)
    }

    #[inline]
    pub fn m(&self) -> f64 {
        self.get(Gene::M)
    }

    #[inline]
    pub fn ma(&self) -> f64 {
        self.get(Gene::Ma)
    }

    /// True if the plasticity switch is on (`s > 0.5`).
    #[inline]
    pub fn is_plastic(&self) -> bool {
        self.s() > 0.5
    }

    /// Copy of this genome with one gene replaced.
    pub fn with_gene(&self, gene: Gene, value: f64) -> Result<Self, GenomeError> {
        let mut values = self.values;
        values[gene.index()] = value;
        Self::new(values)
    }

    /// Mutate in place.
    ///
    /// The always-mutable genes are perturbed first. The plastic genes are then
    /// perturbed if the (possibly mutated) switch is on, and zeroed otherwise.
    /// Probability genes are finally clamped to [0, 1].
    pub fn mutate<R: Rng + ?Sized>(&mut self, model: &MutationModel, rng: &mut R) {
        for gene in Gene::ALWAYS_MUTABLE {
            let slot = &mut self.values[gene.index()];
            *slot = model.perturb(*slot, rng);
        }
        if self.is_plastic() {
            for gene in Gene::PLASTIC {
                let slot = &mut self.values[gene.index()];
                *slot = model.perturb(*slot, rng);
            }
        } else {
            self.zero_plastic();
        }
        for gene in Gene::UNIT_INTERVAL {
            let slot = &mut self.values[gene.index()];
            *slot = slot.clamp(0.0, 1.0);
        }
    }

    /// Mutated copy of this genome.
    pub fn mutated<R: Rng + ?Sized>(&self, model: &MutationModel, rng: &mut R) -> Self {
        let mut child = *self;
        child.mutate(model, rng);
        child
    }

    fn enforce_plasticity(&mut self) {
        if !self.is_plastic() {
            self.zero_plastic();
        }
    }

    fn zero_plastic(&mut self) {
        for gene in Gene::PLASTIC {
            self.values[gene.index()] = 0.0;
        }
    }
}

impl TryFrom<&[f64]> for Genome {
    type Error = GenomeError;

    fn try_from(values: &[f64]) -> Result<Self, Self::Error> {
        Self::from_slice(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn plastic_genome() -> Genome {
        Genome::new([0.8, 0.9, 0.5, 0.1, -0.2, 1.5, -1.0, 0.3, 0.4]).unwrap()
    }

    #[test]
    fn test_gene_order_and_names() {
        let names: Vec<&str> = Gene::ALL.iter().map(|g| g.name()).collect();
        assert_eq!(names, ["h", "s", "a", "I0", "I0p", "b", "bp", "m", "ma"]);
        for (i, gene) in Gene::ALL.iter().enumerate() {
            assert_eq!(gene.index(), i);
        }
    }

    #[test]
    fn test_gene_from_str() {
        assert_eq!("I0p".parse::<Gene>().unwrap(), Gene::I0p);
        assert!("x".parse::<Gene>().is_err());
    }

    #[test]
    fn test_from_slice_wrong_length() {
        let err = Genome::from_slice(&[0.0; 7]).unwrap_err();
        assert_eq!(
            err,
            GenomeError::WrongLength {
                expected: 9,
                found: 7
            }
        );
    }

    #[test]
    fn test_new_rejects_non_finite() {
        let mut values = [0.0; GENE_COUNT];
        values[Gene::B.index()] = f64::NAN;
        assert!(matches!(
            Genome::new(values),
            Err(GenomeError::NonFinite { gene: "b", .. })
        ));
    }

    #[test]
    fn test_non_plastic_genome_zeroes_plastic_genes() {
        let genome = Genome::new([1.0, 0.5, 0.7, 0.1, 0.2, 1.0, 1.0, 0.3, 0.9]).unwrap();
        assert!(!genome.is_plastic());
        assert_eq!(genome.a(), 0.0);
        assert_eq!(genome.b(), 0.0);
        assert_eq!(genome.bp(), 0.0);
        assert_eq!(genome.ma(), 0.0);
        assert_eq!(genome.m(), 0.3);
        assert_eq!(genome.i0p(), 0.2);
    }

    #[test]
    fn test_random_genome_ranges() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..500 {
            let g = Genome::random(&mut rng);
            assert_eq!(g.h(), 1.0);
            assert_eq!(g.m(), 0.0);
            assert_eq!(g.ma(), 0.0);
            assert!((0.0..1.0).contains(&g.s()));
            assert!((-1.0..1.0).contains(&g.i0()));
            assert!((-1.0..1.0).contains(&g.i0p()));
            if g.is_plastic() {
                assert!((-2.0..2.0).contains(&g.b()));
            } else {
                assert_eq!(g.a(), 0.0);
                assert_eq!(g.b(), 0.0);
                assert_eq!(g.bp(), 0.0);
            }
        }
    }

    #[test]
    fn test_mutate_keeps_unit_genes_clamped() {
        let model = MutationModel::with_step(1.0, 5.0).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        let mut genome = plastic_genome();
        for _ in 0..200 {
            genome.mutate(&model, &mut rng);
            for gene in Gene::UNIT_INTERVAL {
                let v = genome.get(gene);
                assert!((0.0..=1.0).contains(&v), "{gene} = {v}");
            }
            if !genome.is_plastic() {
                for gene in Gene::PLASTIC {
                    assert_eq!(genome.get(gene), 0.0);
                }
            }
        }
    }

    #[test]
    fn test_switched_off_genome_stays_non_plastic_without_s_mutation() {
        let model = MutationModel::new(1.0).unwrap();
        let mut rng = StdRng::seed_from_u64(11);
        let mut genome = Genome::new([1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]).unwrap();
        for _ in 0..100 {
            genome.mutate(&model, &mut rng);
            // Small steps from s = 0 stay well below the switch point
            if genome.s() <= 0.5 {
                assert_eq!(genome.a(), 0.0);
                assert_eq!(genome.b(), 0.0);
                assert_eq!(genome.bp(), 0.0);
                assert_eq!(genome.ma(), 0.0);
            }
        }
    }

    #[test]
    fn test_zero_rate_is_identity_for_plastic_genome() {
        let model = MutationModel::none();
        let mut rng = StdRng::seed_from_u64(1);
        let genome = plastic_genome();
        assert_eq!(genome.mutated(&model, &mut rng), genome);
    }

    #[test]
    fn test_unclamped_genes_can_leave_unit_interval() {
        let model = MutationModel::with_step(1.0, 100.0).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        let genome = plastic_genome().mutated(&model, &mut rng);
        let outside = [Gene::I0, Gene::I0p]
            .iter()
            .any(|&g| !(0.0..=1.0).contains(&genome.get(g)));
        assert!(outside);
    }

    #[test]
    fn test_with_gene() {
        let genome = plastic_genome().with_gene(Gene::S, 0.1).unwrap();
        assert!(!genome.is_plastic());
        assert_eq!(genome.b(), 0.0);
    }
}
