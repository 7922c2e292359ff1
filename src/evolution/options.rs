//! # EvolutionOptions
//!
//! The `EvolutionOptions` struct holds the tunables of an optimization run. Every
//! setter validates its argument, and the builder validates the whole set again in
//! `build()`, so a bad value is reported when it is assigned rather than in the
//! middle of a run.
//!
//! ## Example
//!
//! ```rust
//! use evoreap::evolution::options::EvolutionOptions;
//! use evoreap::reaping::VariationSettings;
//!
//! let options = EvolutionOptions::builder()
//!     .num_generations(50)
//!     .population_size(64)
//!     .elitism_percent(0.125)
//!     .eliminated_percent(0.25)
//!     .mutation_probability(0.3)
//!     .variation(VariationSettings::new(6, 4, 2).unwrap())
//!     .workers(4)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(options.get_population_size(), 64);
//!
//! // Out-of-range values are rejected.
//! assert!(EvolutionOptions::builder().elitism_percent(0.95).build().is_err());
//! ```
//!
//! ## Fields
//!
//! - `num_generations`: generations executed by one call to `run`.
//! - `population_size`: individuals per generation, at least 2. Replaced by the
//!   length of an initial population when one is supplied.
//! - `elitism_percent`: fraction of the best individuals copied unchanged, in
//!   `[0, 0.9375]`.
//! - `eliminated_percent`: fraction of the worst individuals replaced, in
//!   `[0, 0.9375]`. Together with `elitism_percent` at most 1.
//! - `mutation_probability`: per-gene mutation chance, in `[0, 1]`.
//! - `variation`: weights of survival, mutation and crossover in the contested band.
//! - `workers`: threads used for absolute fitness evaluation, at least 1.
//! - `maximize`: whether higher raw fitness is better. Only meaningful with an
//!   absolute fitness function.

use crate::error::{ensure_in_range, GeneticError, Result};
use crate::reaping::{validate_bands, VariationSettings};

const MIN_POPULATION_SIZE: usize = 2;

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct EvolutionOptions {
    num_generations: usize,
    population_size: usize,
    elitism_percent: f64,
    eliminated_percent: f64,
    mutation_probability: f32,
    variation: VariationSettings,
    workers: usize,
    maximize: bool,
}

impl EvolutionOptions {
    pub fn get_num_generations(&self) -> usize {
        self.num_generations
    }

    pub fn get_population_size(&self) -> usize {
        self.population_size
    }

    pub fn get_elitism_percent(&self) -> f64 {
        self.elitism_percent
    }

    pub fn get_eliminated_percent(&self) -> f64 {
        self.eliminated_percent
    }

    pub fn get_mutation_probability(&self) -> f32 {
        self.mutation_probability
    }

    pub fn get_variation(&self) -> VariationSettings {
        self.variation
    }

    pub fn get_workers(&self) -> usize {
        self.workers
    }

    pub fn is_maximizing(&self) -> bool {
        self.maximize
    }

    /// Sets the number of generations.
    pub fn set_num_generations(&mut self, num_generations: usize) {
        self.num_generations = num_generations;
    }

    /// Sets the population size.
    ///
    /// # Errors
    ///
    /// Returns an error if `population_size` is below 2.
    pub fn set_population_size(&mut self, population_size: usize) -> Result<()> {
        validate_population_size(population_size)?;
        self.population_size = population_size;
        Ok(())
    }

    /// Sets the elite fraction.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is outside `[0, 0.9375]` or would push the sum
    /// with `eliminated_percent` above 1.
    pub fn set_elitism_percent(&mut self, elitism_percent: f64) -> Result<()> {
        validate_bands(elitism_percent, self.eliminated_percent)?;
        self.elitism_percent = elitism_percent;
        Ok(())
    }

    /// Sets the culled fraction.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is outside `[0, 0.9375]` or would push the sum
    /// with `elitism_percent` above 1.
    pub fn set_eliminated_percent(&mut self, eliminated_percent: f64) -> Result<()> {
        validate_bands(self.elitism_percent, eliminated_percent)?;
        self.eliminated_percent = eliminated_percent;
        Ok(())
    }

    /// Sets the mutation probability.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is outside `[0, 1]`.
    pub fn set_mutation_probability(&mut self, mutation_probability: f32) -> Result<()> {
        validate_mutation_probability(mutation_probability)?;
        self.mutation_probability = mutation_probability;
        Ok(())
    }

    /// Sets the variation ratios.
    pub fn set_variation(&mut self, variation: VariationSettings) -> Result<()> {
        variation.validate()?;
        self.variation = variation;
        Ok(())
    }

    /// Sets the number of evaluation threads.
    ///
    /// # Errors
    ///
    /// Returns an error if `workers` is zero.
    pub fn set_workers(&mut self, workers: usize) -> Result<()> {
        validate_workers(workers)?;
        self.workers = workers;
        Ok(())
    }

    /// Sets whether higher raw fitness is better.
    pub fn set_maximize(&mut self, maximize: bool) {
        self.maximize = maximize;
    }

    /// Checks every field. Useful after deserializing options.
    pub fn validate(&self) -> Result<()> {
        validate_population_size(self.population_size)?;
        validate_bands(self.elitism_percent, self.eliminated_percent)?;
        validate_mutation_probability(self.mutation_probability)?;
        self.variation.validate()?;
        validate_workers(self.workers)
    }

    /// Returns a builder for creating an `EvolutionOptions` instance.
    pub fn builder() -> EvolutionOptionsBuilder {
        EvolutionOptionsBuilder::default()
    }
}

impl Default for EvolutionOptions {
    fn default() -> Self {
        Self {
            num_generations: 100,
            population_size: 100,
            elitism_percent: 0.1,
            eliminated_percent: 0.2,
            mutation_probability: 0.5,
            variation: VariationSettings::default(),
            workers: default_workers(),
            maximize: false,
        }
    }
}

fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

fn validate_population_size(population_size: usize) -> Result<()> {
    if population_size < MIN_POPULATION_SIZE {
        return Err(GeneticError::InvalidParameter {
            parameter: "population_size",
            value: population_size as f64,
            range: "[2, inf)",
        });
    }
    Ok(())
}

fn validate_mutation_probability(mutation_probability: f32) -> Result<()> {
    ensure_in_range(
        "mutation_probability",
        mutation_probability as f64,
        0.0,
        1.0,
        "[0, 1]",
    )
}

fn validate_workers(workers: usize) -> Result<()> {
    if workers == 0 {
        return Err(GeneticError::InvalidParameter {
            parameter: "workers",
            value: 0.0,
            range: "[1, inf)",
        });
    }
    Ok(())
}

/// Builder for `EvolutionOptions`.
///
/// Unset fields take their default values. Validation happens in [`build`].
///
/// [`build`]: EvolutionOptionsBuilder::build
#[derive(Debug, Clone, Default)]
pub struct EvolutionOptionsBuilder {
    num_generations: Option<usize>,
    population_size: Option<usize>,
    elitism_percent: Option<f64>,
    eliminated_percent: Option<f64>,
    mutation_probability: Option<f32>,
    variation: Option<VariationSettings>,
    workers: Option<usize>,
    maximize: Option<bool>,
}

impl EvolutionOptionsBuilder {
    pub fn num_generations(mut self, value: usize) -> Self {
        self.num_generations = Some(value);
        self
    }

    pub fn population_size(mut self, value: usize) -> Self {
        self.population_size = Some(value);
        self
    }

    pub fn elitism_percent(mut self, value: f64) -> Self {
        self.elitism_percent = Some(value);
        self
    }

    pub fn eliminated_percent(mut self, value: f64) -> Self {
        self.eliminated_percent = Some(value);
        self
    }

    pub fn mutation_probability(mut self, value: f32) -> Self {
        self.mutation_probability = Some(value);
        self
    }

    pub fn variation(mut self, value: VariationSettings) -> Self {
        self.variation = Some(value);
        self
    }

    pub fn workers(mut self, value: usize) -> Self {
        self.workers = Some(value);
        self
    }

    pub fn maximize(mut self, value: bool) -> Self {
        self.maximize = Some(value);
        self
    }

    /// Builds the `EvolutionOptions` instance.
    ///
    /// # Errors
    ///
    /// Returns the first validation failure, naming the offending parameter.
    pub fn build(self) -> Result<EvolutionOptions> {
        let defaults = EvolutionOptions::default();
        let options = EvolutionOptions {
            num_generations: self.num_generations.unwrap_or(defaults.num_generations),
            population_size: self.population_size.unwrap_or(defaults.population_size),
            elitism_percent: self.elitism_percent.unwrap_or(defaults.elitism_percent),
            eliminated_percent: self
                .eliminated_percent
                .unwrap_or(defaults.eliminated_percent),
            mutation_probability: self
                .mutation_probability
                .unwrap_or(defaults.mutation_probability),
            variation: self.variation.unwrap_or(defaults.variation),
            workers: self.workers.unwrap_or(defaults.workers),
            maximize: self.maximize.unwrap_or(defaults.maximize),
        };
        options.validate()?;
        Ok(options)
    }
}
