//! # Evaluation
//!
//! An optimizer judges its population in exactly one of two ways:
//!
//! - **Absolute**: a [`Fitness`] function scores every individual on its own. Scores
//!   follow the minimization convention unless the run is configured to maximize.
//!   Individuals are independent, so they are scored in parallel.
//! - **Relative**: a [`Comparator`] only says how much better one individual is than
//!   another. The population is then ordered by the
//!   [`TournamentRanker`](crate::tournament::TournamentRanker).
pub mod absolute;
pub mod caching;
pub mod relative;

use std::fmt;

use crate::error::Result;

/// Scores a single individual.
///
/// Any `Fn(&I) -> f32` closure is a fitness function. Implement the trait directly
/// when evaluation can fail; an error aborts the run.
pub trait Fitness<I>: Send + Sync {
    fn evaluate(&self, individual: &I) -> Result<f32>;
}

impl<I, F> Fitness<I> for F
where
    F: Fn(&I) -> f32 + Send + Sync,
{
    fn evaluate(&self, individual: &I) -> Result<f32> {
        Ok(self(individual))
    }
}

/// Judges two individuals against each other.
///
/// Returns the signed magnitude by which `left` is better (positive) or worse
/// (negative) than `right`; zero is a draw. The comparator is not required to be
/// transitive, but the ranking it produces is only meaningful if it roughly is.
/// Any `Fn(&I, &I) -> f32` closure is a comparator.
pub trait Comparator<I>: Send + Sync {
    fn compare(&self, left: &I, right: &I) -> f32;
}

impl<I, F> Comparator<I> for F
where
    F: Fn(&I, &I) -> f32 + Send + Sync,
{
    fn compare(&self, left: &I, right: &I) -> f32 {
        self(left, right)
    }
}

/// The evaluation mode of an optimizer.
pub enum Evaluator<I> {
    Absolute(Box<dyn Fitness<I>>),
    Relative(Box<dyn Comparator<I>>),
}

impl<I> Evaluator<I> {
    pub fn is_absolute(&self) -> bool {
        matches!(self, Evaluator::Absolute(_))
    }
}

impl<I> fmt::Debug for Evaluator<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Evaluator::Absolute(_) => f.write_str("Evaluator::Absolute"),
            Evaluator::Relative(_) => f.write_str("Evaluator::Relative"),
        }
    }
}

pub use caching::{CacheKey, CachedFitness, CachingFitness, ThreadLocalCachedFitness};
