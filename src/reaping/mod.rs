//! # Reaping
//!
//! Reaping turns a ranked population into the next generation. The population is
//! split into three bands by two cutoffs:
//!
//! - the elite band `[0, elite_end)` is copied unchanged,
//! - the contested band `[elite_end, cull_begin)` is refilled by survival, mutation
//!   or crossover, weighted by [`VariationSettings`],
//! - the culled band `[cull_begin, n)` is replaced by fresh or mutated individuals.
//!
//! Everything before `cull_begin` is the surviving prefix, the pool parents and
//! mutation sources are drawn from.
pub mod reaper;

use crate::error::{ensure_in_range, GeneticError, Result};

pub use reaper::{Reaped, Reaper, MUTATION_SIGMA};

/// The three variation ratios always add up to this.
pub const VARIATION_TOTAL: u32 = 12;

/// Largest allowed elitism or eliminated fraction, 15/16.
pub const MAX_BAND_FRACTION: f64 = 0.9375;

/// Relative weights, out of [`VARIATION_TOTAL`], of the fates a contested slot can
/// meet.
///
/// ```
/// use evoreap::reaping::VariationSettings;
///
/// let variation = VariationSettings::new(6, 4, 2).unwrap();
/// assert_eq!(variation.survival_ratio(), 2);
///
/// assert!(VariationSettings::new(6, 4, 3).is_err());
/// ```
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariationSettings {
    mutation_ratio: u32,
    crossover_ratio: u32,
    survival_ratio: u32,
}

impl VariationSettings {
    /// # Errors
    ///
    /// Returns [`GeneticError::InvalidVariation`] unless the ratios sum to
    /// [`VARIATION_TOTAL`].
    pub fn new(mutation_ratio: u32, crossover_ratio: u32, survival_ratio: u32) -> Result<Self> {
        let settings = Self {
            mutation_ratio,
            crossover_ratio,
            survival_ratio,
        };
        settings.validate()?;
        Ok(settings)
    }

    pub fn mutation_ratio(&self) -> u32 {
        self.mutation_ratio
    }

    pub fn crossover_ratio(&self) -> u32 {
        self.crossover_ratio
    }

    pub fn survival_ratio(&self) -> u32 {
        self.survival_ratio
    }

    pub(crate) fn validate(&self) -> Result<()> {
        let total = self
            .mutation_ratio
            .saturating_add(self.crossover_ratio)
            .saturating_add(self.survival_ratio);
        if total != VARIATION_TOTAL {
            return Err(GeneticError::InvalidVariation {
                total,
                expected: VARIATION_TOTAL,
            });
        }
        Ok(())
    }

    /// Maps a draw in `[0, VARIATION_TOTAL)` to a fate.
    ///
    /// Survival occupies the lowest values, mutation the next ones, crossover the
    /// rest.
    pub fn fate_for(&self, draw: u32) -> Fate {
        if draw < self.survival_ratio {
            Fate::Survived
        } else if draw < self.survival_ratio + self.mutation_ratio {
            Fate::Mutated
        } else {
            Fate::Crossed
        }
    }
}

impl Default for VariationSettings {
    fn default() -> Self {
        Self {
            mutation_ratio: 6,
            crossover_ratio: 4,
            survival_ratio: 2,
        }
    }
}

/// How an individual of the next generation came to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fate {
    /// Copied from the elite band.
    Elite,
    /// Contested slot kept its own individual.
    Survived,
    /// Contested slot got a mutated copy of a survivor.
    Mutated,
    /// Contested slot got the child of several survivors.
    Crossed,
    /// Culled slot got a freshly generated individual.
    Generated,
    /// Culled slot got a mutated copy of an elite.
    Cloned,
}

/// Number of individuals of each fate produced by one reaping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReapReport {
    pub elite: usize,
    pub survived: usize,
    pub mutated: usize,
    pub crossed: usize,
    pub generated: usize,
    pub cloned: usize,
}

impl ReapReport {
    pub fn record(&mut self, fate: Fate) {
        match fate {
            Fate::Elite => self.elite += 1,
            Fate::Survived => self.survived += 1,
            Fate::Mutated => self.mutated += 1,
            Fate::Crossed => self.crossed += 1,
            Fate::Generated => self.generated += 1,
            Fate::Cloned => self.cloned += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.elite + self.survived + self.mutated + self.crossed + self.generated + self.cloned
    }
}

/// Band boundaries for a population of a given size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cutoffs {
    /// First index past the elite band.
    pub elite_end: usize,
    /// First index of the culled band.
    pub cull_begin: usize,
    /// Length of the surviving prefix, never zero for a non-empty population.
    pub survivors: usize,
}

impl Cutoffs {
    /// Computes the cutoffs for `population_size` individuals.
    ///
    /// # Errors
    ///
    /// Returns an error if either fraction lies outside `[0, 0.9375]` or they sum to
    /// more than 1.
    pub fn new(population_size: usize, elitism_percent: f64, eliminated_percent: f64) -> Result<Self> {
        validate_bands(elitism_percent, eliminated_percent)?;

        let n = population_size as f64;
        let elite_end = (n * elitism_percent).floor() as usize;
        let cull_begin = elite_end.max((n * (1.0 - eliminated_percent)).floor() as usize);
        let survivors = cull_begin.max(1).min(population_size.max(1));

        Ok(Self {
            elite_end,
            cull_begin,
            survivors,
        })
    }

    /// Number of contested slots.
    pub fn contested(&self) -> usize {
        self.cull_begin - self.elite_end
    }
}

pub(crate) fn validate_bands(elitism_percent: f64, eliminated_percent: f64) -> Result<()> {
    ensure_in_range(
        "elitism_percent",
        elitism_percent,
        0.0,
        MAX_BAND_FRACTION,
        "[0, 0.9375]",
    )?;
    ensure_in_range(
        "eliminated_percent",
        eliminated_percent,
        0.0,
        MAX_BAND_FRACTION,
        "[0, 0.9375]",
    )?;
    if elitism_percent + eliminated_percent > 1.0 {
        return Err(GeneticError::Configuration(format!(
            "elitism_percent ({}) and eliminated_percent ({}) must not sum to more than 1",
            elitism_percent, eliminated_percent
        )));
    }
    Ok(())
}
