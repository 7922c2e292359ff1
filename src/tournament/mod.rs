//! # Tournament Ranking
//!
//! Ranking by pairwise comparison only. [`TournamentRanker`] is a resumable state
//! machine fed one comparison result at a time; [`rank_with`] drives it to
//! completion when the comparator is available in-process.
pub mod ranker;

use crate::error::Result;
use crate::evaluation::Comparator;
use crate::rng::RandomNumberGenerator;

pub use ranker::{Ranking, RankingStats, Step, TournamentRanker, HISTOGRAM_BUCKETS};

/// Ranks `items` worst first, pulling every comparison from `comparator`.
///
/// The ranker's pivots are seeded from `rng`. A comparator that is not transitive
/// still terminates, but the resulting order depends on the pivots it met.
pub fn rank_with<T, C>(
    items: Vec<T>,
    comparator: &C,
    rng: &mut RandomNumberGenerator,
) -> Result<Ranking<T>>
where
    C: Comparator<T> + ?Sized,
{
    TournamentRanker::from_rng(items, rng).run(comparator)
}
