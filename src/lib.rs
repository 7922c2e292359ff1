pub mod error;
pub mod evaluation;
pub mod evolution;
pub mod individual;
pub mod niche;
pub mod population;
pub mod reaping;
pub mod rng;
pub mod selection;
pub mod tournament;

// Re-export commonly used types for convenience
pub use error::{GeneticError, OptionExt, Result, ResultExt};
pub use evaluation::{Comparator, Evaluator, Fitness};
pub use evolution::{
    Champions, EvolutionOptions, OptimizationHandle, Optimizer, OptimizerBuilder, OptimizerState,
};
pub use individual::{Crossover, Generator, Individual};
pub use niche::{Distance, NicheDensity, NicheStrategy};
pub use population::ScoredIndividual;
pub use reaping::{Reaper, VariationSettings};
pub use rng::RandomNumberGenerator;
pub use tournament::{Ranking, RankingStats, TournamentRanker};
