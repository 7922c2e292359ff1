//! # Individual Trait
//!
//! The `Individual` trait defines the interface for candidate solutions driven by the
//! engine. An individual only needs to produce a mutated copy of itself and a display
//! name. Crossover combines several parents of one concrete type, so it is supplied
//! separately through the [`Crossover`] trait, as is the [`Generator`] that creates
//! fresh random individuals.
//!
//! ## Example
//!
//! ```rust
//! use evoreap::individual::Individual;
//! use evoreap::rng::RandomNumberGenerator;
//!
//! #[derive(Clone, Debug, PartialEq)]
//! struct Coefficients {
//!     values: Vec<f32>,
//! }
//!
//! impl Individual for Coefficients {
//!     fn mutate(&self, probability: f32, sigma: f32, rng: &mut RandomNumberGenerator) -> Self {
//!         let values = self
//!             .values
//!             .iter()
//!             .map(|v| {
//!                 if rng.unit() < probability {
//!                     v + (rng.unit() * 2.0 - 1.0) * sigma
//!                 } else {
//!                     *v
//!                 }
//!             })
//!             .collect();
//!         Self { values }
//!     }
//!
//!     fn name(&self) -> String {
//!         format!("{:?}", self.values)
//!     }
//! }
//!
//! let parent = Coefficients { values: vec![1.0, 2.0] };
//! let mut rng = RandomNumberGenerator::from_seed(1);
//! let child = parent.mutate(1.0, 5.0, &mut rng);
//!
//! // The parent is never modified.
//! assert_eq!(parent.values, vec![1.0, 2.0]);
//! assert_eq!(child.values.len(), 2);
//! ```

use std::fmt::Debug;

use crate::rng::RandomNumberGenerator;

/// Trait for types that represent candidate solutions.
///
/// Types implementing this trait must also implement `Clone`, `Debug`, `Send`, and `Sync`
/// so populations can be evaluated in parallel and handed to a background run.
pub trait Individual: Clone + Debug + Send + Sync + 'static {
    /// Returns a mutated copy of this individual.
    ///
    /// `probability` is the per-gene chance of a change and `sigma` its magnitude.
    /// Implementations must leave `self` untouched.
    fn mutate(&self, probability: f32, sigma: f32, rng: &mut RandomNumberGenerator) -> Self;

    /// Human-readable name used in log output. Not a uniqueness key.
    fn name(&self) -> String;
}

/// Combines two or more parents of the same concrete type into one child.
///
/// Any `Fn(&[&I], &mut RandomNumberGenerator) -> I` closure is a crossover.
pub trait Crossover<I>: Send + Sync {
    fn crossover(&self, parents: &[&I], rng: &mut RandomNumberGenerator) -> I;
}

impl<I, F> Crossover<I> for F
where
    F: Fn(&[&I], &mut RandomNumberGenerator) -> I + Send + Sync,
{
    fn crossover(&self, parents: &[&I], rng: &mut RandomNumberGenerator) -> I {
        self(parents, rng)
    }
}

/// Creates a fresh random individual.
///
/// Used to sow the initial population and to refill culled slots. Any
/// `Fn(&mut RandomNumberGenerator) -> I` closure is a generator.
pub trait Generator<I>: Send + Sync {
    fn generate(&self, rng: &mut RandomNumberGenerator) -> I;
}

impl<I, F> Generator<I> for F
where
    F: Fn(&mut RandomNumberGenerator) -> I + Send + Sync,
{
    fn generate(&self, rng: &mut RandomNumberGenerator) -> I {
        self(rng)
    }
}
