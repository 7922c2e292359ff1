//! # Scored Individuals
//!
//! A population is a `Vec<ScoredIndividual<I>>` whose order encodes rank: index 0
//! is the best individual once the population has been evaluated. Scores are
//! transient and are cleared on every individual produced by reaping.

use std::cmp::Ordering;

use crate::individual::Individual;

/// An individual together with the scores assigned to it in the current generation.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredIndividual<I> {
    /// The candidate solution.
    pub individual: I,
    /// Unnormalized fitness. Lower is better unless the run maximizes.
    pub raw_score: Option<f32>,
    /// Fitness rescaled so the best individual is 1.0 and the worst 0.0.
    pub normalized_score: Option<f32>,
}

impl<I: Individual> ScoredIndividual<I> {
    /// Wraps an individual with no scores.
    pub fn new(individual: I) -> Self {
        Self {
            individual,
            raw_score: None,
            normalized_score: None,
        }
    }

    /// Clears both scores.
    pub fn clear_scores(&mut self) {
        self.raw_score = None;
        self.normalized_score = None;
    }

    /// Normalized score, treating a missing score as the worst possible.
    pub fn normalized_or_min(&self) -> f32 {
        self.normalized_score.unwrap_or(f32::NEG_INFINITY)
    }
}

impl<I: Individual> From<I> for ScoredIndividual<I> {
    fn from(individual: I) -> Self {
        Self::new(individual)
    }
}

/// Sorts by raw score so the best individual comes first.
///
/// Unscored individuals sink to the end.
pub fn sort_by_raw<I: Individual>(population: &mut [ScoredIndividual<I>], maximize: bool) {
    population.sort_by(|a, b| match (a.raw_score, b.raw_score) {
        (Some(x), Some(y)) if maximize => y.total_cmp(&x),
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}

/// Sorts by normalized score, descending. The sort is stable.
pub fn sort_by_normalized<I: Individual>(population: &mut [ScoredIndividual<I>]) {
    population.sort_by(|a, b| b.normalized_or_min().total_cmp(&a.normalized_or_min()));
}

/// Rescales raw scores of a best-first population into `[0, 1]`.
///
/// Computes `(score - worst) / (best - worst)`, which maps the best individual to 1.0
/// and the worst to 0.0 whether lower or higher raw scores are better. When every
/// individual scored the same, all of them receive 1.0. Returns `false` in that case.
pub fn normalize_raw<I: Individual>(population: &mut [ScoredIndividual<I>]) -> bool {
    let best = population.first().and_then(|s| s.raw_score);
    let worst = population.last().and_then(|s| s.raw_score);

    let (best, worst) = match (best, worst) {
        (Some(best), Some(worst)) => (best, worst),
        _ => return false,
    };

    let range = best - worst;
    if range == 0.0 {
        population
            .iter_mut()
            .for_each(|s| s.normalized_score = Some(1.0));
        return false;
    }

    population.iter_mut().for_each(|s| {
        s.normalized_score = s.raw_score.map(|raw| (raw - worst) / range);
    });
    true
}

/// Assigns rank-based scores to a best-first population.
///
/// The raw score is the rank (0 is best) and the normalized score falls linearly
/// from 1.0 at the top to 0.0 at the bottom.
pub fn normalize_by_rank<I: Individual>(population: &mut [ScoredIndividual<I>]) {
    let last = population.len().saturating_sub(1);
    population.iter_mut().enumerate().for_each(|(rank, s)| {
        s.raw_score = Some(rank as f32);
        s.normalized_score = Some(if last == 0 {
            1.0
        } else {
            1.0 - rank as f32 / last as f32
        });
    });
}

/// Population standard deviation of the normalized scores.
pub fn normalized_std_dev<I: Individual>(population: &[ScoredIndividual<I>]) -> f32 {
    let scores: Vec<f32> = population
        .iter()
        .filter_map(|s| s.normalized_score)
        .collect();
    if scores.len() < 2 {
        return 0.0;
    }

    let n = scores.len() as f32;
    let mean = scores.iter().sum::<f32>() / n;
    let variance = scores.iter().map(|s| (s - mean).powi(2)).sum::<f32>() / n;
    variance.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::RandomNumberGenerator;

    #[derive(Clone, Debug, PartialEq)]
    struct Value(f32);

    impl Individual for Value {
        fn mutate(&self, _p: f32, _s: f32, _rng: &mut RandomNumberGenerator) -> Self {
            self.clone()
        }

        fn name(&self) -> String {
            self.0.to_string()
        }
    }

    fn scored(raws: &[f32]) -> Vec<ScoredIndividual<Value>> {
        raws.iter()
            .map(|&r| ScoredIndividual {
                individual: Value(r),
                raw_score: Some(r),
                normalized_score: None,
            })
            .collect()
    }

    #[test]
    fn test_minimization_normalization() {
        let mut population = scored(&[4.0, 1.0, 3.0, 2.0]);
        sort_by_raw(&mut population, false);
        assert!(normalize_raw(&mut population));

        let raws: Vec<f32> = population.iter().filter_map(|s| s.raw_score).collect();
        assert_eq!(raws, vec![1.0, 2.0, 3.0, 4.0]);
        assert_eq!(population[0].normalized_score, Some(1.0));
        assert_eq!(population[3].normalized_score, Some(0.0));
        for s in &population {
            let n = s.normalized_score.unwrap();
            assert!((0.0..=1.0).contains(&n));
        }
    }

    #[test]
    fn test_maximization_normalization() {
        let mut population = scored(&[4.0, 1.0, 3.0, 2.0]);
        sort_by_raw(&mut population, true);
        normalize_raw(&mut population);

        assert_eq!(population[0].individual, Value(4.0));
        assert_eq!(population[0].normalized_score, Some(1.0));
        assert_eq!(population[3].normalized_score, Some(0.0));
    }

    #[test]
    fn test_degenerate_scores_all_best() {
        let mut population = scored(&[2.0, 2.0, 2.0]);
        sort_by_raw(&mut population, false);
        assert!(!normalize_raw(&mut population));
        assert!(population.iter().all(|s| s.normalized_score == Some(1.0)));
    }

    #[test]
    fn test_rank_normalization() {
        let mut population = scored(&[0.0, 0.0, 0.0]);
        normalize_by_rank(&mut population);
        let normalized: Vec<f32> = population
            .iter()
            .filter_map(|s| s.normalized_score)
            .collect();
        assert_eq!(normalized, vec![1.0, 0.5, 0.0]);

        let mut single = scored(&[5.0]);
        normalize_by_rank(&mut single);
        assert_eq!(single[0].normalized_score, Some(1.0));
    }

    #[test]
    fn test_std_dev() {
        let mut population = scored(&[0.0, 0.0]);
        population[0].normalized_score = Some(1.0);
        population[1].normalized_score = Some(0.0);
        assert!((normalized_std_dev(&population) - 0.5).abs() < 1e-6);
        assert_eq!(normalized_std_dev(&population[..1]), 0.0);
    }

    #[test]
    fn test_sort_by_normalized_descending() {
        let mut population = scored(&[0.0, 0.0, 0.0]);
        population[0].normalized_score = Some(-0.5);
        population[1].normalized_score = Some(0.7);
        population[2].normalized_score = None;
        sort_by_normalized(&mut population);
        assert_eq!(population[0].normalized_score, Some(0.7));
        assert_eq!(population[1].normalized_score, Some(-0.5));
        assert_eq!(population[2].normalized_score, None);
    }
}
