//! # Optimizer
//!
//! The `Optimizer` owns the population and drives the generation loop:
//!
//! 1. evaluate (absolute fitness) or rank (tournament), leaving the population
//!    sorted best first,
//! 2. let the niche strategy, if any, penalize crowded survivors,
//! 3. record the best individual as this generation's champion,
//! 4. reap the next generation.
//!
//! A run is reproducible: every random decision is drawn from the
//! [`RandomNumberGenerator`] passed in by the caller.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use rayon::ThreadPool;
use tracing::instrument;

use super::champions::Champions;
use super::options::EvolutionOptions;
use crate::error::{GeneticError, OptionExt, Result};
use crate::evaluation::{absolute, relative, Evaluator};
use crate::individual::Individual;
use crate::niche::NicheStrategy;
use crate::population::ScoredIndividual;
use crate::reaping::Reaper;
use crate::rng::RandomNumberGenerator;
use crate::tournament::RankingStats;

/// Lifecycle of an optimizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptimizerState {
    /// No population yet.
    Unsown,
    /// A population is waiting for the next generation.
    Ready,
    Evaluating,
    NichePenalizing,
    Reaping,
    /// The last `run` completed. Running again continues from here.
    Done,
}

pub struct Optimizer<I: Individual> {
    options: EvolutionOptions,
    evaluator: Evaluator<I>,
    reaper: Reaper<I>,
    niche: Option<Box<dyn NicheStrategy<I>>>,
    initial_population: Option<Vec<I>>,
    pool: ThreadPool,
    population: Vec<ScoredIndividual<I>>,
    champions: Champions<I>,
    generation: Arc<AtomicUsize>,
    state: OptimizerState,
    ranking_stats: RankingStats,
    last_ranking: Option<RankingStats>,
}

impl<I: Individual> fmt::Debug for Optimizer<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Optimizer")
            .field("options", &self.options)
            .field("evaluator", &self.evaluator)
            .field("reaper", &self.reaper)
            .field("niche", &self.niche)
            .field("population", &self.population.len())
            .field("generation", &self.generation())
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl<I: Individual> Optimizer<I> {
    pub(crate) fn new(
        options: EvolutionOptions,
        evaluator: Evaluator<I>,
        reaper: Reaper<I>,
        niche: Option<Box<dyn NicheStrategy<I>>>,
        initial_population: Option<Vec<I>>,
        pool: ThreadPool,
    ) -> Self {
        Self {
            options,
            evaluator,
            reaper,
            niche,
            initial_population,
            pool,
            population: Vec::new(),
            champions: Champions::new(),
            generation: Arc::new(AtomicUsize::new(0)),
            state: OptimizerState::Unsown,
            ranking_stats: RankingStats::default(),
            last_ranking: None,
        }
    }

    /// Returns a builder for creating an `Optimizer`.
    pub fn builder() -> super::OptimizerBuilder<I> {
        super::OptimizerBuilder::new()
    }

    pub fn options(&self) -> &EvolutionOptions {
        &self.options
    }

    /// Current population. Sorted best first only between evaluation and reaping.
    pub fn population(&self) -> &[ScoredIndividual<I>] {
        &self.population
    }

    /// Shared handle to the champion history.
    pub fn champions(&self) -> &Champions<I> {
        &self.champions
    }

    /// Number of completed generations since construction or the last reset.
    pub fn generation(&self) -> usize {
        self.generation.load(Ordering::Acquire)
    }

    pub fn state(&self) -> OptimizerState {
        self.state
    }

    /// Tournament statistics accumulated over every generation.
    pub fn ranking_stats(&self) -> &RankingStats {
        &self.ranking_stats
    }

    /// Tournament statistics of the most recent generation.
    pub fn last_ranking(&self) -> Option<&RankingStats> {
        self.last_ranking.as_ref()
    }

    /// Creates the initial population.
    ///
    /// Uses a copy of the supplied initial population when there is one, otherwise
    /// `population_size` generated individuals.
    pub fn sow(&mut self, rng: &mut RandomNumberGenerator) {
        self.population = match &self.initial_population {
            Some(initial) => initial.iter().cloned().map(ScoredIndividual::new).collect(),
            None => (0..self.options.get_population_size())
                .map(|_| ScoredIndividual::new(self.reaper.generate(rng)))
                .collect(),
        };
        self.state = OptimizerState::Ready;
        tracing::debug!(population = self.population.len(), "Population sown");
    }

    /// Runs one generation and returns its champion.
    ///
    /// Sows first if there is no population yet.
    ///
    /// # Errors
    ///
    /// Fails if the fitness function fails or returns a non-finite score, or if
    /// the tournament ranker is misused. The population of the failed generation is
    /// kept with its scores cleared and the optimizer returns to
    /// [`OptimizerState::Ready`].
    #[instrument(level = "debug", skip_all, fields(generation = self.generation()))]
    pub fn step(&mut self, rng: &mut RandomNumberGenerator) -> Result<ScoredIndividual<I>> {
        if self.state == OptimizerState::Unsown {
            self.sow(rng);
        }

        let result = self.advance(rng);
        if let Err(e) = &result {
            tracing::warn!(error = %e, "Generation failed, population kept");
            self.state = OptimizerState::Ready;
        }
        result
    }

    fn advance(&mut self, rng: &mut RandomNumberGenerator) -> Result<ScoredIndividual<I>> {
        self.state = OptimizerState::Evaluating;
        self.population
            .iter_mut()
            .for_each(ScoredIndividual::clear_scores);

        match &self.evaluator {
            Evaluator::Absolute(fitness) => {
                absolute::evaluate_population(
                    &mut self.population,
                    fitness.as_ref(),
                    &self.pool,
                    self.options.is_maximizing(),
                )?;
            }
            Evaluator::Relative(comparator) => {
                let (ranked, stats) =
                    relative::rank_population(&self.population, comparator.as_ref(), rng)?;
                self.population = ranked;
                tracing::debug!(
                    comparisons = stats.comparisons,
                    draws = stats.draws,
                    histogram = ?stats.histogram,
                    "Population ranked"
                );
                self.ranking_stats.merge(&stats);
                self.last_ranking = Some(stats);
            }
        }

        self.state = OptimizerState::NichePenalizing;
        if let Some(niche) = self.niche.as_mut() {
            let cutoffs = self.reaper.cutoffs(self.population.len())?;
            niche.penalize(&mut self.population, cutoffs.survivors)?;
        }

        let champion = self
            .population
            .first()
            .cloned()
            .ok_or_else_genetic(|| GeneticError::EmptyPopulation)?;

        self.state = OptimizerState::Reaping;
        let reaped = self.reaper.reap(&self.population, rng)?;
        tracing::debug!(
            elite = reaped.report.elite,
            survived = reaped.report.survived,
            mutated = reaped.report.mutated,
            crossed = reaped.report.crossed,
            generated = reaped.report.generated,
            cloned = reaped.report.cloned,
            "Next generation reaped"
        );
        self.population = reaped.population;

        let generation = self.generation.fetch_add(1, Ordering::AcqRel);
        tracing::info!(
            generation,
            champion = %champion.individual.name(),
            raw_score = ?champion.raw_score,
            "Generation champion"
        );
        self.champions.push(champion.clone());
        self.state = OptimizerState::Ready;

        Ok(champion)
    }

    /// Runs `num_generations` generations and returns the latest champion.
    ///
    /// Calling `run` again continues with the current population. Generations and
    /// champions accumulate until [`reset`](Self::reset).
    #[instrument(level = "info", skip_all, fields(generations = self.options.get_num_generations()))]
    pub fn run(&mut self, rng: &mut RandomNumberGenerator) -> Result<Option<ScoredIndividual<I>>> {
        if self.state == OptimizerState::Unsown {
            self.sow(rng);
        }

        for _ in 0..self.options.get_num_generations() {
            self.step(rng)?;
        }

        self.state = OptimizerState::Done;
        tracing::info!(generation = self.generation(), "Optimization finished");
        Ok(self.champions.latest())
    }

    /// Runs on a background thread.
    ///
    /// The returned handle reads champions and the generation count while the run
    /// is in progress, and hands the optimizer back on [`join`](OptimizationHandle::join).
    pub fn spawn(self, mut rng: RandomNumberGenerator) -> OptimizationHandle<I> {
        let champions = self.champions.clone();
        let generation = Arc::clone(&self.generation);

        let thread = thread::spawn(move || -> Result<Optimizer<I>> {
            let mut optimizer = self;
            optimizer.run(&mut rng)?;
            Ok(optimizer)
        });

        OptimizationHandle {
            champions,
            generation,
            thread,
        }
    }

    /// Drops the population and history so the next `run` starts from scratch.
    pub fn reset(&mut self) {
        self.population.clear();
        self.champions.clear();
        self.generation.store(0, Ordering::Release);
        self.ranking_stats = RankingStats::default();
        self.last_ranking = None;
        self.state = OptimizerState::Unsown;
    }
}

/// Handle to an optimization running on a background thread.
#[derive(Debug)]
pub struct OptimizationHandle<I: Individual> {
    champions: Champions<I>,
    generation: Arc<AtomicUsize>,
    thread: JoinHandle<Result<Optimizer<I>>>,
}

impl<I: Individual> OptimizationHandle<I> {
    /// Live champion history.
    pub fn champions(&self) -> &Champions<I> {
        &self.champions
    }

    /// Number of generations completed so far.
    pub fn generation(&self) -> usize {
        self.generation.load(Ordering::Acquire)
    }

    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    /// Waits for the run to end and returns the optimizer.
    ///
    /// # Errors
    ///
    /// Returns the run's error, or [`GeneticError::Evolution`] if the thread
    /// panicked.
    pub fn join(self) -> Result<Optimizer<I>> {
        self.thread.join().map_err(|_| {
            GeneticError::Evolution("Optimization thread panicked".to_string())
        })?
    }
}
