//! # Fitness Caching
//!
//! Elite individuals are carried into the next generation unchanged and are scored
//! again every generation. Wrapping an expensive fitness function in a cache skips
//! those repeated evaluations. Only successful scores are cached.
//!
//! The cache lives inside the fitness function. The scores stored on
//! [`ScoredIndividual`](crate::population::ScoredIndividual) are still cleared and
//! recomputed each generation.
//!
//! ## Example
//!
//! ```rust
//! use evoreap::evaluation::{CacheKey, CachingFitness, Fitness};
//! use evoreap::individual::Individual;
//! use evoreap::rng::RandomNumberGenerator;
//!
//! #[derive(Clone, Debug)]
//! struct Dial(i32);
//!
//! impl Individual for Dial {
//!     fn mutate(&self, _p: f32, sigma: f32, _rng: &mut RandomNumberGenerator) -> Self {
//!         Dial(self.0 + sigma as i32)
//!     }
//!
//!     fn name(&self) -> String {
//!         self.0.to_string()
//!     }
//! }
//!
//! impl CacheKey for Dial {
//!     type Key = i32;
//!
//!     fn cache_key(&self) -> i32 {
//!         self.0
//!     }
//! }
//!
//! let fitness = |d: &Dial| (d.0 - 10).abs() as f32;
//! let cached = fitness.with_global_cache();
//!
//! assert_eq!(cached.evaluate(&Dial(7)).unwrap(), 3.0);
//! assert_eq!(cached.cache_size(), 1);
//! ```

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::marker::PhantomData;
use std::sync::{Arc, Mutex, PoisonError};

use super::Fitness;
use crate::error::Result;
use crate::individual::Individual;

/// A trait for individuals that can be used as cache keys.
///
/// Individuals that would receive the same fitness score should produce the same key.
pub trait CacheKey: Individual {
    /// The type of the cache key.
    type Key: Eq + Hash + Clone + Debug + Send + Sync;

    fn cache_key(&self) -> Self::Key;
}

/// A fitness function whose scores are memoized in one mutex-protected map shared
/// by every worker thread.
#[derive(Debug, Clone)]
pub struct CachedFitness<I, F>
where
    I: CacheKey,
    F: Fitness<I>,
{
    fitness: F,
    cache: Arc<Mutex<HashMap<I::Key, f32>>>,
    _marker: PhantomData<fn(&I)>,
}

impl<I, F> CachedFitness<I, F>
where
    I: CacheKey,
    F: Fitness<I>,
{
    pub fn new(fitness: F) -> Self {
        Self {
            fitness,
            cache: Arc::new(Mutex::new(HashMap::new())),
            _marker: PhantomData,
        }
    }

    /// Creates a cached fitness function with a pre-populated cache.
    pub fn with_cache(fitness: F, cache: HashMap<I::Key, f32>) -> Self {
        Self {
            fitness,
            cache: Arc::new(Mutex::new(cache)),
            _marker: PhantomData,
        }
    }

    /// Returns a reference to the wrapped fitness function.
    pub fn inner(&self) -> &F {
        &self.fitness
    }

    pub fn cache_size(&self) -> usize {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn clear_cache(&self) {
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Returns a copy of the cache.
    pub fn get_cache(&self) -> HashMap<I::Key, f32> {
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl<I, F> Fitness<I> for CachedFitness<I, F>
where
    I: CacheKey,
    F: Fitness<I>,
{
    fn evaluate(&self, individual: &I) -> Result<f32> {
        let key = individual.cache_key();

        if let Some(score) = self
            .cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
        {
            return Ok(*score);
        }

        // Evaluate without holding the lock so other workers are not serialized.
        let score = self.fitness.evaluate(individual)?;
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, score);

        Ok(score)
    }
}

/// A per-thread cache of fitness scores.
///
/// Each rayon worker keeps its own map, so lookups never contend.
#[derive(Debug)]
pub struct ThreadLocalCache<I>
where
    I: CacheKey,
{
    cache: thread_local::ThreadLocal<RefCell<HashMap<I::Key, f32>>>,
}

impl<I> ThreadLocalCache<I>
where
    I: CacheKey,
{
    pub fn new() -> Self {
        Self {
            cache: thread_local::ThreadLocal::new(),
        }
    }

    pub fn get(&self, key: &I::Key) -> Option<f32> {
        self.cache
            .get()
            .and_then(|cell| cell.try_borrow().ok())
            .and_then(|cache| cache.get(key).copied())
    }

    pub fn insert(&self, key: I::Key, value: f32) {
        let cell = self.cache.get_or(|| RefCell::new(HashMap::new()));
        if let Ok(mut cache) = cell.try_borrow_mut() {
            cache.insert(key, value);
        }
    }

    /// Clears the cache for the current thread.
    pub fn clear(&self) {
        if let Some(cell) = self.cache.get() {
            if let Ok(mut cache) = cell.try_borrow_mut() {
                cache.clear();
            }
        }
    }

    /// Number of scores cached by the current thread.
    pub fn len(&self) -> usize {
        self.cache
            .get()
            .and_then(|cell| cell.try_borrow().ok())
            .map_or(0, |cache| cache.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<I> Default for ThreadLocalCache<I>
where
    I: CacheKey,
{
    fn default() -> Self {
        Self::new()
    }
}

/// A fitness function whose scores are memoized per worker thread.
#[derive(Debug, Clone)]
pub struct ThreadLocalCachedFitness<I, F>
where
    I: CacheKey,
    F: Fitness<I>,
{
    fitness: F,
    cache: Arc<ThreadLocalCache<I>>,
}

impl<I, F> ThreadLocalCachedFitness<I, F>
where
    I: CacheKey,
    F: Fitness<I>,
{
    pub fn new(fitness: F) -> Self {
        Self {
            fitness,
            cache: Arc::new(ThreadLocalCache::new()),
        }
    }

    pub fn inner(&self) -> &F {
        &self.fitness
    }

    /// Clears the cache for the current thread.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Number of scores cached by the current thread.
    pub fn cache_size(&self) -> usize {
        self.cache.len()
    }
}

impl<I, F> Fitness<I> for ThreadLocalCachedFitness<I, F>
where
    I: CacheKey,
    F: Fitness<I>,
{
    fn evaluate(&self, individual: &I) -> Result<f32> {
        let key = individual.cache_key();

        if let Some(score) = self.cache.get(&key) {
            return Ok(score);
        }

        let score = self.fitness.evaluate(individual)?;
        self.cache.insert(key, score);

        Ok(score)
    }
}

/// Extension methods wrapping any fitness function in a cache.
pub trait CachingFitness<I: CacheKey>: Fitness<I> + Sized {
    /// Wraps this fitness function with a cache shared by all threads.
    fn with_global_cache(self) -> CachedFitness<I, Self> {
        CachedFitness::new(self)
    }

    /// Wraps this fitness function with one cache per thread.
    fn with_thread_local_cache(self) -> ThreadLocalCachedFitness<I, Self> {
        ThreadLocalCachedFitness::new(self)
    }
}

impl<I, F> CachingFitness<I> for F
where
    I: CacheKey,
    F: Fitness<I>,
{
}
