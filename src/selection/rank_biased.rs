use crate::error::{GeneticError, Result};
use crate::rng::RandomNumberGenerator;

/// Samples ranks from a best-first population with a bias towards the top.
///
/// A uniformly drawn rank `r` is accepted with probability `(n - r) / n`, where `n`
/// is the population size; rejected draws are repeated. Rank 0 is always accepted
/// and the last rank of the population almost never is.
///
/// # Examples
///
/// ```
/// use evoreap::selection::RankBiasedSampler;
/// use evoreap::rng::RandomNumberGenerator;
/// use evoreap::error::Result;
///
/// fn main() -> Result<()> {
///     let sampler = RankBiasedSampler::new(20)?;
///     let mut rng = RandomNumberGenerator::from_seed(4);
///
///     // Pick three parents among the 15 survivors.
///     let parents = sampler.sample_many(15, 3, &mut rng)?;
///     assert_eq!(parents.len(), 3);
///     assert!(parents.iter().all(|&rank| rank < 15));
///
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct RankBiasedSampler {
    population_size: usize,
}

impl RankBiasedSampler {
    /// # Errors
    ///
    /// Returns an error if `population_size` is zero.
    pub fn new(population_size: usize) -> Result<Self> {
        if population_size == 0 {
            return Err(GeneticError::EmptyPopulation);
        }
        Ok(Self { population_size })
    }

    /// Probability of accepting a draw of `rank`.
    pub fn acceptance(&self, rank: usize) -> f64 {
        let n = self.population_size as f64;
        ((n - rank as f64) / n).max(0.0)
    }

    /// Draws one rank in `[0, candidates)`.
    ///
    /// # Errors
    ///
    /// Returns an error if there are no candidates or more candidates than the
    /// population holds.
    pub fn sample(&self, candidates: usize, rng: &mut RandomNumberGenerator) -> Result<usize> {
        if candidates == 0 {
            return Err(GeneticError::EmptyPopulation);
        }
        if candidates > self.population_size {
            return Err(GeneticError::Configuration(format!(
                "Cannot sample among {} candidates from a population of {}",
                candidates, self.population_size
            )));
        }

        loop {
            let rank = rng.index(candidates);
            if rng.chance(self.acceptance(rank)) {
                return Ok(rank);
            }
        }
    }

    /// Draws `count` ranks in `[0, candidates)`, with replacement.
    pub fn sample_many(
        &self,
        candidates: usize,
        count: usize,
        rng: &mut RandomNumberGenerator,
    ) -> Result<Vec<usize>> {
        (0..count).map(|_| self.sample(candidates, rng)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acceptance() {
        let sampler = RankBiasedSampler::new(4).unwrap();
        assert_eq!(sampler.acceptance(0), 1.0);
        assert_eq!(sampler.acceptance(1), 0.75);
        assert_eq!(sampler.acceptance(3), 0.25);
    }

    #[test]
    fn test_bias_towards_top() {
        let sampler = RankBiasedSampler::new(10).unwrap();
        let mut rng = RandomNumberGenerator::from_seed(42);

        let mut counts = [0usize; 10];
        for rank in sampler.sample_many(10, 5000, &mut rng).unwrap() {
            counts[rank] += 1;
        }

        // Expected frequencies are proportional to 10, 9, ..., 1.
        assert!(counts[0] > counts[9] * 4);
        assert!(counts[..5].iter().sum::<usize>() > counts[5..].iter().sum::<usize>());
    }

    #[test]
    fn test_invalid_inputs() {
        assert!(RankBiasedSampler::new(0).is_err());

        let sampler = RankBiasedSampler::new(3).unwrap();
        let mut rng = RandomNumberGenerator::from_seed(0);
        assert!(matches!(
            sampler.sample(0, &mut rng),
            Err(GeneticError::EmptyPopulation)
        ));
        assert!(sampler.sample(4, &mut rng).is_err());
    }
}
