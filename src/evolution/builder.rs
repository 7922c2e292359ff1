use rayon::ThreadPoolBuilder;

use super::{EvolutionOptions, Optimizer};
use crate::{
    error::{GeneticError, OptionExt, Result, ResultExt},
    evaluation::{Comparator, Evaluator, Fitness},
    individual::{Crossover, Generator, Individual},
    niche::NicheStrategy,
    reaping::Reaper,
};

/// Assembles an [`Optimizer`] from its collaborators.
///
/// Exactly one of [`with_fitness`](Self::with_fitness) and
/// [`with_comparator`](Self::with_comparator) must be given, together with a
/// crossover and a generator.
///
/// ```
/// use evoreap::{EvolutionOptions, Individual, OptimizerBuilder, RandomNumberGenerator};
///
/// #[derive(Clone, Debug)]
/// struct Guess(f32);
///
/// impl Individual for Guess {
///     fn mutate(&self, _p: f32, sigma: f32, rng: &mut RandomNumberGenerator) -> Self {
///         Guess(self.0 + (rng.unit() - 0.5) * sigma)
///     }
///
///     fn name(&self) -> String {
///         self.0.to_string()
///     }
/// }
///
/// let optimizer = OptimizerBuilder::<Guess>::new()
///     .with_options(EvolutionOptions::builder().population_size(10).build().unwrap())
///     .with_fitness(|g: &Guess| (g.0 - 42.0).abs())
///     .with_crossover(|parents: &[&Guess], _rng: &mut RandomNumberGenerator| {
///         Guess(parents.iter().map(|p| p.0).sum::<f32>() / parents.len() as f32)
///     })
///     .with_generator(|rng: &mut RandomNumberGenerator| Guess(rng.unit() * 100.0))
///     .build();
/// assert!(optimizer.is_ok());
/// ```
pub struct OptimizerBuilder<I: Individual> {
    options: Option<EvolutionOptions>,
    fitness: Option<Box<dyn Fitness<I>>>,
    comparator: Option<Box<dyn Comparator<I>>>,
    crossover: Option<Box<dyn Crossover<I>>>,
    generator: Option<Box<dyn Generator<I>>>,
    initial_population: Option<Vec<I>>,
    niche: Option<Box<dyn NicheStrategy<I>>>,
}

impl<I: Individual> OptimizerBuilder<I> {
    pub fn new() -> Self {
        Self {
            options: None,
            fitness: None,
            comparator: None,
            crossover: None,
            generator: None,
            initial_population: None,
            niche: None,
        }
    }

    pub fn with_options(mut self, options: EvolutionOptions) -> Self {
        self.options = Some(options);
        self
    }

    /// Scores individuals one at a time.
    pub fn with_fitness<F>(mut self, fitness: F) -> Self
    where
        F: Fitness<I> + 'static,
    {
        self.fitness = Some(Box::new(fitness));
        self
    }

    /// Orders individuals by pairwise tournament.
    pub fn with_comparator<C>(mut self, comparator: C) -> Self
    where
        C: Comparator<I> + 'static,
    {
        self.comparator = Some(Box::new(comparator));
        self
    }

    pub fn with_crossover<C>(mut self, crossover: C) -> Self
    where
        C: Crossover<I> + 'static,
    {
        self.crossover = Some(Box::new(crossover));
        self
    }

    pub fn with_generator<G>(mut self, generator: G) -> Self
    where
        G: Generator<I> + 'static,
    {
        self.generator = Some(Box::new(generator));
        self
    }

    /// Starts from these individuals instead of generated ones. The population size
    /// becomes the number of individuals given.
    pub fn with_initial_population(mut self, population: Vec<I>) -> Self {
        self.initial_population = Some(population);
        self
    }

    pub fn with_niche_strategy<N>(mut self, strategy: N) -> Self
    where
        N: NicheStrategy<I> + 'static,
    {
        self.niche = Some(Box::new(strategy));
        self
    }

    /// Validates the configuration and builds the optimizer and its worker pool.
    pub fn build(self) -> Result<Optimizer<I>> {
        let mut options = self.options.unwrap_or_default();
        options.validate()?;

        let evaluator = match (self.fitness, self.comparator) {
            (Some(fitness), None) => Evaluator::Absolute(fitness),
            (None, Some(comparator)) => {
                if options.is_maximizing() {
                    tracing::warn!("`maximize` has no effect when ranking with a comparator");
                }
                Evaluator::Relative(comparator)
            }
            (Some(_), Some(_)) => {
                return Err(GeneticError::Configuration(
                    "Specify either a fitness function or a comparator, not both".to_string(),
                ))
            }
            (None, None) => {
                return Err(GeneticError::Configuration(
                    "Neither a fitness function nor a comparator specified".to_string(),
                ))
            }
        };

        let crossover = self.crossover.ok_or_else_genetic(|| {
            GeneticError::Configuration("Crossover not specified".to_string())
        })?;

        let generator = self.generator.ok_or_else_genetic(|| {
            GeneticError::Configuration("Generator not specified".to_string())
        })?;

        if let Some(initial) = &self.initial_population {
            options.set_population_size(initial.len())?;
        }

        let reaper = Reaper::new(crossover, generator)
            .with_bands(options.get_elitism_percent(), options.get_eliminated_percent())?
            .with_mutation_probability(options.get_mutation_probability())?
            .with_variation(options.get_variation());

        let pool = ThreadPoolBuilder::new()
            .num_threads(options.get_workers())
            .build()
            .context("Failed to build worker pool")?;

        tracing::debug!(
            population_size = options.get_population_size(),
            workers = options.get_workers(),
            absolute = evaluator.is_absolute(),
            niching = self.niche.is_some(),
            "Optimizer built"
        );

        Ok(Optimizer::new(
            options,
            evaluator,
            reaper,
            self.niche,
            self.initial_population,
            pool,
        ))
    }
}

impl<I: Individual> Default for OptimizerBuilder<I> {
    fn default() -> Self {
        Self::new()
    }
}
