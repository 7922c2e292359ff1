use std::fmt;

use super::{Cutoffs, Fate, ReapReport, VariationSettings, VARIATION_TOTAL};
use crate::error::{GeneticError, Result};
use crate::individual::{Crossover, Generator, Individual};
use crate::population::ScoredIndividual;
use crate::rng::RandomNumberGenerator;
use crate::selection::RankBiasedSampler;

/// Mutation magnitude used for every mutation the reaper performs.
pub const MUTATION_SIGMA: f32 = 5.0;

const MIN_PARENTS: usize = 2;
const MAX_PARENTS: usize = 4;

/// Chance that a culled slot receives a freshly generated individual rather than
/// a mutated elite.
const REGENERATION_CHANCE: f64 = 0.5;

/// The next generation together with the fate counts that produced it.
#[derive(Debug, Clone)]
pub struct Reaped<I> {
    pub population: Vec<ScoredIndividual<I>>,
    pub report: ReapReport,
}

/// Produces the next generation from a ranked population.
///
/// The reaper owns the domain's crossover and generator functions. It is also the
/// optimizer's source of fresh individuals when sowing.
pub struct Reaper<I> {
    crossover: Box<dyn Crossover<I>>,
    generator: Box<dyn Generator<I>>,
    elitism_percent: f64,
    eliminated_percent: f64,
    mutation_probability: f32,
    variation: VariationSettings,
}

impl<I> fmt::Debug for Reaper<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reaper")
            .field("elitism_percent", &self.elitism_percent)
            .field("eliminated_percent", &self.eliminated_percent)
            .field("mutation_probability", &self.mutation_probability)
            .field("variation", &self.variation)
            .finish_non_exhaustive()
    }
}

impl<I: Individual> Reaper<I> {
    /// Creates a reaper with no elitism, no culling, a mutation probability of 0.5
    /// and default variation ratios.
    pub fn new(crossover: Box<dyn Crossover<I>>, generator: Box<dyn Generator<I>>) -> Self {
        Self {
            crossover,
            generator,
            elitism_percent: 0.0,
            eliminated_percent: 0.0,
            mutation_probability: 0.5,
            variation: VariationSettings::default(),
        }
    }

    /// Sets the elite and culled fractions.
    ///
    /// # Errors
    ///
    /// Returns an error if either lies outside `[0, 0.9375]` or they sum to more
    /// than 1.
    pub fn with_bands(mut self, elitism_percent: f64, eliminated_percent: f64) -> Result<Self> {
        super::validate_bands(elitism_percent, eliminated_percent)?;
        self.elitism_percent = elitism_percent;
        self.eliminated_percent = eliminated_percent;
        Ok(self)
    }

    /// # Errors
    ///
    /// Returns an error if `probability` is outside `[0, 1]`.
    pub fn with_mutation_probability(mut self, probability: f32) -> Result<Self> {
        crate::error::ensure_in_range(
            "mutation_probability",
            probability as f64,
            0.0,
            1.0,
            "[0, 1]",
        )?;
        self.mutation_probability = probability;
        Ok(self)
    }

    pub fn with_variation(mut self, variation: VariationSettings) -> Self {
        self.variation = variation;
        self
    }

    /// Band boundaries for a population of `population_size`.
    pub fn cutoffs(&self, population_size: usize) -> Result<Cutoffs> {
        Cutoffs::new(population_size, self.elitism_percent, self.eliminated_percent)
    }

    /// Creates a fresh random individual.
    pub fn generate(&self, rng: &mut RandomNumberGenerator) -> I {
        self.generator.generate(rng)
    }

    /// Builds the next generation from `population`, which must be sorted best
    /// first.
    ///
    /// Always returns exactly `population.len()` individuals, all unscored.
    ///
    /// # Errors
    ///
    /// Returns an error if the population is empty.
    pub fn reap(
        &self,
        population: &[ScoredIndividual<I>],
        rng: &mut RandomNumberGenerator,
    ) -> Result<Reaped<I>> {
        let n = population.len();
        if n == 0 {
            return Err(GeneticError::EmptyPopulation);
        }

        let cutoffs = self.cutoffs(n)?;
        let sampler = RankBiasedSampler::new(n)?;
        let mut report = ReapReport::default();
        let mut next = Vec::with_capacity(n);

        for scored in &population[..cutoffs.elite_end] {
            next.push(ScoredIndividual::new(scored.individual.clone()));
            report.record(Fate::Elite);
        }

        for slot in cutoffs.elite_end..cutoffs.cull_begin {
            let draw = rng.index(VARIATION_TOTAL as usize) as u32;
            let fate = self.variation.fate_for(draw);
            let individual = match fate {
                Fate::Survived => population[slot].individual.clone(),
                Fate::Mutated => {
                    let source = &population[rng.index(cutoffs.survivors)].individual;
                    source.mutate(self.mutation_probability, MUTATION_SIGMA, rng)
                }
                _ => self.breed(population, cutoffs.survivors, &sampler, rng)?,
            };
            next.push(ScoredIndividual::new(individual));
            report.record(fate);
        }

        // Culled slots borrow from the elite band, or from all survivors when
        // there is no elite band.
        let donors = if cutoffs.elite_end > 0 {
            cutoffs.elite_end
        } else {
            cutoffs.survivors
        };
        for _ in cutoffs.cull_begin..n {
            let (individual, fate) = if rng.chance(REGENERATION_CHANCE) {
                (self.generator.generate(rng), Fate::Generated)
            } else {
                let source = &population[rng.index(donors)].individual;
                (
                    source.mutate(self.mutation_probability, MUTATION_SIGMA, rng),
                    Fate::Cloned,
                )
            };
            next.push(ScoredIndividual::new(individual));
            report.record(fate);
        }

        debug_assert_eq!(next.len(), n);
        Ok(Reaped {
            population: next,
            report,
        })
    }

    fn breed(
        &self,
        population: &[ScoredIndividual<I>],
        survivors: usize,
        sampler: &RankBiasedSampler,
        rng: &mut RandomNumberGenerator,
    ) -> Result<I> {
        let count = rng.between(MIN_PARENTS, MAX_PARENTS);
        let ranks = sampler.sample_many(survivors, count, rng)?;
        let parents: Vec<&I> = ranks.iter().map(|&r| &population[r].individual).collect();
        Ok(self.crossover.crossover(&parents, rng))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Tags record where an individual came from.
    #[derive(Clone, Debug, PartialEq)]
    enum Tag {
        Original(usize),
        Mutant(usize),
        Child(Vec<usize>),
        Fresh,
    }

    impl Individual for Tag {
        fn mutate(&self, _p: f32, sigma: f32, _rng: &mut RandomNumberGenerator) -> Self {
            assert_eq!(sigma, MUTATION_SIGMA);
            match self {
                Tag::Original(i) => Tag::Mutant(*i),
                other => other.clone(),
            }
        }

        fn name(&self) -> String {
            format!("{:?}", self)
        }
    }

    fn reaper() -> Reaper<Tag> {
        let crossover = |parents: &[&Tag], _rng: &mut RandomNumberGenerator| {
            Tag::Child(
                parents
                    .iter()
                    .map(|p| match p {
                        Tag::Original(i) => *i,
                        _ => usize::MAX,
                    })
                    .collect(),
            )
        };
        let generator = |_rng: &mut RandomNumberGenerator| Tag::Fresh;
        Reaper::<Tag>::new(Box::new(crossover), Box::new(generator))
    }

    fn ranked(n: usize) -> Vec<ScoredIndividual<Tag>> {
        (0..n)
            .map(|i| {
                let mut scored = ScoredIndividual::new(Tag::Original(i));
                scored.raw_score = Some(i as f32);
                scored.normalized_score = Some(1.0 - i as f32 / n as f32);
                scored
            })
            .collect()
    }

    #[test]
    fn test_population_size_is_preserved() {
        let reaper = reaper().with_bands(0.2, 0.3).unwrap();
        let mut rng = RandomNumberGenerator::from_seed(11);

        for n in [1, 2, 3, 10, 37] {
            let reaped = reaper.reap(&ranked(n), &mut rng).unwrap();
            assert_eq!(reaped.population.len(), n);
            assert_eq!(reaped.report.total(), n);
            assert!(reaped
                .population
                .iter()
                .all(|s| s.raw_score.is_none() && s.normalized_score.is_none()));
        }
    }

    #[test]
    fn test_elites_are_copied_unchanged() {
        let reaper = reaper().with_bands(0.25, 0.25).unwrap();
        let mut rng = RandomNumberGenerator::from_seed(3);
        let reaped = reaper.reap(&ranked(20), &mut rng).unwrap();

        assert_eq!(reaped.report.elite, 5);
        for i in 0..5 {
            assert_eq!(reaped.population[i].individual, Tag::Original(i));
        }
    }

    #[test]
    fn test_fate_distribution() {
        let reaper = reaper()
            .with_variation(VariationSettings::new(6, 4, 2).unwrap())
            .with_bands(0.0, 0.0)
            .unwrap();
        let mut rng = RandomNumberGenerator::from_seed(42);
        let report = reaper.reap(&ranked(100), &mut rng).unwrap().report;

        assert_eq!(report.survived + report.mutated + report.crossed, 100);
        assert!((report.survived as i64 - 17).abs() <= 15, "{:?}", report);
        assert!((report.mutated as i64 - 50).abs() <= 15, "{:?}", report);
        assert!((report.crossed as i64 - 33).abs() <= 15, "{:?}", report);
    }

    #[test]
    fn test_contested_fates() {
        let reaper = reaper().with_bands(0.1, 0.2).unwrap();
        let mut rng = RandomNumberGenerator::from_seed(5);
        let reaped = reaper.reap(&ranked(50), &mut rng).unwrap();
        let cutoffs = reaper.cutoffs(50).unwrap();

        for slot in cutoffs.elite_end..cutoffs.cull_begin {
            match &reaped.population[slot].individual {
                Tag::Original(i) => assert_eq!(*i, slot),
                Tag::Mutant(i) => assert!(*i < cutoffs.survivors),
                Tag::Child(parents) => {
                    assert!((MIN_PARENTS..=MAX_PARENTS).contains(&parents.len()));
                    assert!(parents.iter().all(|p| *p < cutoffs.survivors));
                }
                Tag::Fresh => panic!("contested slot {} was regenerated", slot),
            }
        }
    }

    #[test]
    fn test_culled_slots_come_from_elites_or_generator() {
        let reaper = reaper().with_bands(0.1, 0.5).unwrap();
        let mut rng = RandomNumberGenerator::from_seed(8);
        let reaped = reaper.reap(&ranked(40), &mut rng).unwrap();

        for scored in &reaped.population[20..] {
            match &scored.individual {
                Tag::Fresh => {}
                Tag::Mutant(i) => assert!(*i < 4),
                other => panic!("unexpected culled individual {:?}", other),
            }
        }
        assert_eq!(reaped.report.generated + reaped.report.cloned, 20);
        assert!(reaped.report.generated > 0);
        assert!(reaped.report.cloned > 0);
    }

    #[test]
    fn test_culled_slots_without_elites() {
        let reaper = reaper().with_bands(0.0, 0.5).unwrap();
        let mut rng = RandomNumberGenerator::from_seed(9);
        let reaped = reaper.reap(&ranked(10), &mut rng).unwrap();

        for scored in &reaped.population[5..] {
            if let Tag::Mutant(i) = scored.individual {
                assert!(i < 5);
            }
        }
    }

    #[test]
    fn test_empty_contested_band() {
        let reaper = reaper().with_bands(0.9375, 0.0625).unwrap();
        let mut rng = RandomNumberGenerator::from_seed(1);
        let reaped = reaper.reap(&ranked(16), &mut rng).unwrap();

        assert_eq!(reaped.population.len(), 16);
        assert_eq!(reaped.report.elite, 15);
        assert_eq!(reaped.report.generated + reaped.report.cloned, 1);
    }

    #[test]
    fn test_reproducible_with_seed() {
        let reaper = reaper().with_bands(0.1, 0.3).unwrap();
        let a = reaper
            .reap(&ranked(30), &mut RandomNumberGenerator::from_seed(77))
            .unwrap();
        let b = reaper
            .reap(&ranked(30), &mut RandomNumberGenerator::from_seed(77))
            .unwrap();
        assert_eq!(a.population, b.population);
    }

    #[test]
    fn test_empty_population_is_rejected() {
        let reaper = reaper();
        let mut rng = RandomNumberGenerator::from_seed(0);
        assert!(matches!(
            reaper.reap(&[], &mut rng),
            Err(GeneticError::EmptyPopulation)
        ));
    }

    #[test]
    fn test_invalid_settings() {
        assert!(reaper().with_mutation_probability(1.5).is_err());
        assert!(reaper().with_bands(0.5, 0.6).is_err());
    }
}
