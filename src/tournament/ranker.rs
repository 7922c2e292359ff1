//! # TournamentRanker
//!
//! Orders a sequence using only pairwise comparison results, supplied one at a
//! time by the caller. Internally this is quicksort with a random pivot, driven by
//! an explicit queue of `[begin, end)` ranges instead of recursion. For the current
//! range the ranker asks for every remaining element compared against the pivot;
//! once they are all classified the range is rewritten as
//! `[worse or equal][pivot][better]` and both sides are queued if they still hold at
//! least two elements.
//!
//! The ranker never calls a comparator itself, so results may come from another
//! thread, another process or a batch job. Only their order matters.
//!
//! The final sequence is ascending by quality: an element the comparator judges
//! better than the pivot ends up after it.
//!
//! ## Example
//!
//! ```rust
//! use evoreap::tournament::TournamentRanker;
//!
//! let mut ranker = TournamentRanker::new(vec![3, 1, 2], 0);
//! while let Some((candidate, pivot)) = ranker.pending() {
//!     let result = (*candidate - *pivot) as f32;
//!     ranker.submit(result).unwrap();
//! }
//! assert!(ranker.is_finished());
//!
//! let ranking = ranker.finish().unwrap();
//! assert_eq!(ranking.items, vec![1, 2, 3]);
//! assert_eq!(ranking.stats.draws, 0);
//! ```

use std::collections::VecDeque;
use std::iter;

use crate::error::{GeneticError, Result};
use crate::evaluation::Comparator;
use crate::rng::RandomNumberGenerator;

/// Number of buckets in the comparison magnitude histogram.
pub const HISTOGRAM_BUCKETS: usize = 7;

/// Width of one histogram bucket. The last bucket collects everything above.
const HISTOGRAM_WIDTH: f32 = 10.0;

/// Outcome of submitting one comparison result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// The current range still needs results.
    Pending,
    /// The current range was partitioned and another range is now current.
    RangeComplete,
    /// Every range is partitioned; the sequence is fully ordered.
    Finished,
}

/// Counters collected while ranking.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RankingStats {
    /// Total comparison results received.
    pub comparisons: usize,
    /// Results that were exactly zero.
    pub draws: usize,
    /// Counts of `|result|` in buckets 0–9, 10–19, …, 60 and above.
    pub histogram: [usize; HISTOGRAM_BUCKETS],
}

impl RankingStats {
    fn record(&mut self, result: f32) {
        self.comparisons += 1;
        if result == 0.0 {
            self.draws += 1;
        }
        let bucket = (result.abs() / HISTOGRAM_WIDTH) as usize;
        self.histogram[bucket.min(HISTOGRAM_BUCKETS - 1)] += 1;
    }

    /// Adds another set of counters to this one.
    pub fn merge(&mut self, other: &RankingStats) {
        self.comparisons += other.comparisons;
        self.draws += other.draws;
        self.histogram
            .iter_mut()
            .zip(other.histogram.iter())
            .for_each(|(a, b)| *a += b);
    }
}

/// A completed ranking.
#[derive(Debug, Clone, PartialEq)]
pub struct Ranking<T> {
    /// The reordered items, worst first.
    pub items: Vec<T>,
    pub stats: RankingStats,
}

#[derive(Debug, Clone)]
struct Partition {
    begin: usize,
    end: usize,
    /// Next element awaiting a result. The pivot sits at `end - 1`.
    cursor: usize,
    better: Vec<usize>,
    worse: Vec<usize>,
}

impl Partition {
    fn new(begin: usize, end: usize) -> Self {
        Self {
            begin,
            end,
            cursor: begin,
            better: Vec::new(),
            worse: Vec::new(),
        }
    }

    fn pivot(&self) -> usize {
        self.end - 1
    }

    fn is_classified(&self) -> bool {
        self.cursor >= self.pivot()
    }
}

/// Incremental, externally driven comparison sort.
#[derive(Debug, Clone)]
pub struct TournamentRanker<T> {
    items: Vec<T>,
    queue: VecDeque<(usize, usize)>,
    current: Option<Partition>,
    rng: RandomNumberGenerator,
    stats: RankingStats,
    range_complete: bool,
}

impl<T> TournamentRanker<T> {
    /// Creates a ranker over `items` whose pivots are drawn from a generator seeded
    /// with `seed`.
    pub fn new(items: Vec<T>, seed: u64) -> Self {
        let mut queue = VecDeque::new();
        if items.len() >= 2 {
            queue.push_back((0, items.len()));
        }

        let mut ranker = Self {
            items,
            queue,
            current: None,
            rng: RandomNumberGenerator::from_seed(seed),
            stats: RankingStats::default(),
            range_complete: false,
        };
        ranker.advance();
        ranker
    }

    /// Creates a ranker seeded from the caller's generator.
    pub fn from_rng(items: Vec<T>, rng: &mut RandomNumberGenerator) -> Self {
        Self::new(items, rng.next_seed())
    }

    /// The `(candidate, pivot)` pair whose result is needed next, or `None` once the
    /// ranking is finished.
    pub fn pending(&self) -> Option<(&T, &T)> {
        self.current
            .as_ref()
            .map(|p| (&self.items[p.cursor], &self.items[p.pivot()]))
    }

    /// The pivot of the current range and every candidate still waiting for a
    /// result, in the order the results must be submitted.
    pub fn outstanding(&self) -> Option<(&T, Vec<&T>)> {
        self.current.as_ref().map(|p| {
            let candidates = self.items[p.cursor..p.pivot()].iter().collect();
            (&self.items[p.pivot()], candidates)
        })
    }

    /// Records the result of comparing the pending candidate against the pivot.
    ///
    /// Positive means the candidate is better than the pivot. Zero counts as a draw
    /// and is grouped with the worse elements.
    pub fn submit(&mut self, result: f32) -> Result<Step> {
        if result.is_nan() {
            return Err(GeneticError::Ranking(
                "Comparison result is NaN".to_string(),
            ));
        }

        let partition = self.current.as_mut().ok_or_else(|| {
            GeneticError::Ranking("Result submitted after ranking finished".to_string())
        })?;

        self.stats.record(result);
        let candidate = partition.cursor;
        if result > 0.0 {
            partition.better.push(candidate);
        } else {
            partition.worse.push(candidate);
        }
        partition.cursor += 1;

        if !partition.is_classified() {
            self.range_complete = false;
            return Ok(Step::Pending);
        }

        if let Some(done) = self.current.take() {
            self.rewrite(done);
        }
        self.advance();
        self.range_complete = true;

        Ok(if self.current.is_none() {
            Step::Finished
        } else {
            Step::RangeComplete
        })
    }

    /// Submits the results for every outstanding candidate of the current range.
    ///
    /// The batch must cover exactly the candidates returned by [`outstanding`].
    ///
    /// [`outstanding`]: TournamentRanker::outstanding
    pub fn submit_batch(&mut self, results: &[f32]) -> Result<Step> {
        let expected = self
            .current
            .as_ref()
            .map(|p| p.pivot() - p.cursor)
            .unwrap_or(0);
        if results.len() != expected {
            return Err(GeneticError::Ranking(format!(
                "Batch holds {} results but the current range needs {}",
                results.len(),
                expected
            )));
        }

        let mut step = Step::Pending;
        for &result in results {
            step = self.submit(result)?;
        }
        Ok(step)
    }

    /// Whether the most recent submission completed a range.
    pub fn is_range_complete(&self) -> bool {
        self.range_complete
    }

    pub fn is_finished(&self) -> bool {
        self.current.is_none()
    }

    pub fn comparisons(&self) -> usize {
        self.stats.comparisons
    }

    pub fn draws(&self) -> usize {
        self.stats.draws
    }

    pub fn histogram(&self) -> &[usize; HISTOGRAM_BUCKETS] {
        &self.stats.histogram
    }

    /// Consumes the ranker and returns the ordered items.
    pub fn finish(self) -> Result<Ranking<T>> {
        if !self.is_finished() {
            return Err(GeneticError::Ranking(format!(
                "Ranking is not finished: {} ranges still queued",
                self.queue.len() + 1
            )));
        }

        Ok(Ranking {
            items: self.items,
            stats: self.stats,
        })
    }

    /// Drives the ranking to completion with an in-process comparator.
    pub fn run<C>(mut self, comparator: &C) -> Result<Ranking<T>>
    where
        C: Comparator<T> + ?Sized,
    {
        while let Some((candidate, pivot)) = self.pending() {
            let result = comparator.compare(candidate, pivot);
            self.submit(result)?;
        }
        self.finish()
    }

    fn advance(&mut self) {
        self.current = match self.queue.pop_front() {
            Some((begin, end)) => {
                let pivot = begin + self.rng.index(end - begin);
                self.items.swap(pivot, end - 1);
                Some(Partition::new(begin, end))
            }
            None => None,
        };
    }

    fn rewrite(&mut self, partition: Partition) {
        let Partition {
            begin,
            end,
            better,
            worse,
            ..
        } = partition;
        let pivot = end - 1;

        let order: Vec<usize> = worse
            .iter()
            .copied()
            .chain(iter::once(pivot))
            .chain(better.iter().copied())
            .collect();

        let mut slots: Vec<Option<T>> = self.items.drain(begin..end).map(Some).collect();
        let reordered: Vec<T> = order
            .iter()
            .filter_map(|&index| slots[index - begin].take())
            .collect();
        self.items.splice(begin..begin, reordered);

        let pivot_position = begin + worse.len();
        if pivot_position - begin >= 2 {
            self.queue.push_back((begin, pivot_position));
        }
        if end - (pivot_position + 1) >= 2 {
            self.queue.push_back((pivot_position + 1, end));
        }
    }
}
