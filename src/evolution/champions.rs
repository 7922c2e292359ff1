use std::sync::{Arc, PoisonError, RwLock};

use crate::individual::Individual;
use crate::population::ScoredIndividual;

/// History of the best individual of every completed generation.
///
/// Clones share the same history, so a handle to a background run can read
/// champions while the run appends to them.
#[derive(Debug, Clone)]
pub struct Champions<I> {
    history: Arc<RwLock<Vec<ScoredIndividual<I>>>>,
}

impl<I: Individual> Champions<I> {
    pub fn new() -> Self {
        Self {
            history: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub(crate) fn push(&self, champion: ScoredIndividual<I>) {
        self.history
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(champion);
    }

    pub(crate) fn clear(&self) {
        self.history
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Copy of the history, oldest first.
    pub fn snapshot(&self) -> Vec<ScoredIndividual<I>> {
        self.history
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Champion of the most recent generation.
    pub fn latest(&self) -> Option<ScoredIndividual<I>> {
        self.history
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.history
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<I: Individual> Default for Champions<I> {
    fn default() -> Self {
        Self::new()
    }
}
