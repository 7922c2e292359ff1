//! Parallel scoring with an absolute fitness function.

use rayon::prelude::*;
use rayon::ThreadPool;

use super::Fitness;
use crate::error::{GeneticError, Result};
use crate::individual::Individual;
use crate::population::{normalize_raw, sort_by_raw, ScoredIndividual};

/// Scores every individual on `pool`, then sorts best first and normalizes.
///
/// Each task writes only to its own individual, so no locking is involved. The
/// first failing or non-finite score aborts the whole evaluation.
///
/// Returns `false` when every individual scored the same.
pub fn evaluate_population<I, F>(
    population: &mut [ScoredIndividual<I>],
    fitness: &F,
    pool: &ThreadPool,
    maximize: bool,
) -> Result<bool>
where
    I: Individual,
    F: Fitness<I> + ?Sized,
{
    if population.is_empty() {
        return Err(GeneticError::EmptyPopulation);
    }

    pool.install(|| {
        population.par_iter_mut().try_for_each(|scored| {
            let score = fitness.evaluate(&scored.individual)?;

            if !score.is_finite() {
                return Err(GeneticError::FitnessCalculation(format!(
                    "Non-finite fitness score {} for individual {}",
                    score,
                    scored.individual.name()
                )));
            }

            scored.raw_score = Some(score);
            scored.normalized_score = None;
            Ok(())
        })
    })?;

    sort_by_raw(population, maximize);
    let spread = normalize_raw(population);
    if !spread {
        tracing::warn!(
            population = population.len(),
            "All individuals scored the same; treating them as equally fit"
        );
    }
    Ok(spread)
}
