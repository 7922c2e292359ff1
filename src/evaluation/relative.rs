//! Ordering a population with a pairwise comparator.

use super::Comparator;
use crate::error::{GeneticError, Result};
use crate::individual::Individual;
use crate::population::{normalize_by_rank, ScoredIndividual};
use crate::rng::RandomNumberGenerator;
use crate::tournament::{rank_with, RankingStats};

/// Ranks the population by tournament and returns it best first.
///
/// The ranker orders worst first, so its output is reversed here. Raw scores become
/// rank positions and normalized scores fall linearly from 1.0 to 0.0. The input is
/// left untouched, so a failed ranking still has the population to fall back on.
pub fn rank_population<I, C>(
    population: &[ScoredIndividual<I>],
    comparator: &C,
    rng: &mut RandomNumberGenerator,
) -> Result<(Vec<ScoredIndividual<I>>, RankingStats)>
where
    I: Individual,
    C: Comparator<I> + ?Sized,
{
    if population.is_empty() {
        return Err(GeneticError::EmptyPopulation);
    }

    let individuals: Vec<I> = population.iter().map(|s| s.individual.clone()).collect();
    let ranking = rank_with(individuals, comparator, rng)?;

    let mut ranked: Vec<ScoredIndividual<I>> = ranking
        .items
        .into_iter()
        .rev()
        .map(ScoredIndividual::new)
        .collect();
    normalize_by_rank(&mut ranked);

    Ok((ranked, ranking.stats))
}
