//! # Niching
//!
//! A niche strategy lowers the normalized score of individuals that crowd around
//! better-ranked ones, so the reaper does not spend the whole population on one
//! peak. It runs after evaluation and before reaping, and leaves the population
//! sorted best first again.
pub mod density;

use std::fmt::Debug;

use crate::error::Result;
use crate::individual::Individual;
use crate::population::ScoredIndividual;

pub use density::{Niche, NicheDensity};

/// Distance between two individuals, supplied by the domain.
///
/// Any `Fn(&I, &I) -> f32` closure is a distance.
pub trait Distance<I>: Send + Sync {
    fn distance(&self, a: &I, b: &I) -> f32;
}

impl<I, F> Distance<I> for F
where
    F: Fn(&I, &I) -> f32 + Send + Sync,
{
    fn distance(&self, a: &I, b: &I) -> f32 {
        self(a, b)
    }
}

/// Summary of one penalty pass.
#[derive(Debug, Clone, PartialEq)]
pub struct NicheReport {
    /// Number of niches found in the surviving prefix.
    pub niches: usize,
    /// Average number of individuals per niche, reference included.
    pub density: f32,
    /// Radius used for this pass.
    pub radius: f32,
    /// Radius for the next pass.
    pub next_radius: f32,
    /// Number of individuals whose score was lowered.
    pub penalized: usize,
}

/// Penalizes over-clustered individuals.
pub trait NicheStrategy<I: Individual>: Debug + Send {
    /// Lowers normalized scores of crowded individuals and re-sorts the population
    /// best first.
    ///
    /// `population` arrives sorted best first. Only the first `survivors`
    /// individuals, those not about to be culled, take part.
    fn penalize(
        &mut self,
        population: &mut [ScoredIndividual<I>],
        survivors: usize,
    ) -> Result<NicheReport>;
}
