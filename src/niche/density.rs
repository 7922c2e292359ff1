//! # Niche Density Strategy
//!
//! Groups the surviving prefix into niches around better-ranked reference
//! individuals and penalizes every member by `stddev / 10 / distance²`, where
//! `stddev` is the spread of normalized scores among survivors. Every pair of
//! members of the same niche is also penalized by the same formula, both members
//! paying. The reference itself is never penalized.
//!
//! A niche is a contiguous run of the best-first order: the scan walks forward
//! from the reference and stops at the first individual outside the radius.
//!
//! The niche radius adapts between calls. With `S` survivors and an average niche
//! size `density`, the radius is multiplied by `2 * density^p` where
//! `p = -2 ln 2 / ln S`: all singletons double it, a density of `sqrt(S)` keeps it,
//! one niche holding everybody halves it.
//!
//! ## Example
//!
//! ```rust
//! use evoreap::niche::NicheDensity;
//!
//! let distance = |a: &f32, b: &f32| (a - b).abs();
//! let strategy = NicheDensity::new(distance, 0.5)
//!     .unwrap()
//!     .with_radius_bounds(0.01, 10.0)
//!     .unwrap();
//! assert_eq!(strategy.radius(), 0.5);
//! ```

use std::fmt;

use super::{Distance, NicheReport, NicheStrategy};
use crate::error::{ensure_in_range, GeneticError, Result};
use crate::individual::Individual;
use crate::population::{normalized_std_dev, sort_by_normalized, ScoredIndividual};

const PENALTY_DIVISOR: f32 = 10.0;

/// Distances are clamped to this before squaring, so identical individuals get a
/// large but finite penalty.
const MIN_DISTANCE: f32 = 1e-3;

/// A cluster of survivors within the radius of a reference individual.
///
/// Built and discarded within a single penalty pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Niche {
    /// Population index of the best-ranked individual of the niche.
    pub reference: usize,
    /// Population index and distance to the reference of every other member.
    pub members: Vec<(usize, f32)>,
    /// Radius the niche was built with.
    pub max_radius: f32,
}

impl Niche {
    /// Number of individuals in the niche, reference included.
    pub fn size(&self) -> usize {
        self.members.len() + 1
    }
}

/// Adaptive-radius niche penalty.
pub struct NicheDensity<D> {
    distance: D,
    radius: f32,
    min_radius: f32,
    max_radius: f32,
}

impl<D> NicheDensity<D> {
    /// Creates the strategy with a starting radius.
    ///
    /// # Errors
    ///
    /// Returns an error if `initial_radius` is not a positive finite number.
    pub fn new(distance: D, initial_radius: f32) -> Result<Self> {
        if !(initial_radius.is_finite() && initial_radius > 0.0) {
            return Err(GeneticError::InvalidParameter {
                parameter: "initial_radius",
                value: initial_radius as f64,
                range: "(0, inf)",
            });
        }

        Ok(Self {
            distance,
            radius: initial_radius,
            min_radius: f32::MIN_POSITIVE,
            max_radius: f32::MAX,
        })
    }

    /// Keeps the adapted radius within `[min_radius, max_radius]`.
    pub fn with_radius_bounds(mut self, min_radius: f32, max_radius: f32) -> Result<Self> {
        if !(min_radius.is_finite() && min_radius > 0.0) {
            return Err(GeneticError::InvalidParameter {
                parameter: "min_radius",
                value: min_radius as f64,
                range: "(0, inf)",
            });
        }
        ensure_in_range(
            "max_radius",
            max_radius as f64,
            min_radius as f64,
            f32::MAX as f64,
            "[min_radius, inf)",
        )?;

        self.min_radius = min_radius;
        self.max_radius = max_radius;
        self.radius = self.radius.clamp(min_radius, max_radius);
        Ok(self)
    }

    /// Radius the next pass will use.
    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Radius multiplier for a pass that found `density` individuals per niche among
    /// `survivors`.
    pub fn resize_factor(density: f32, survivors: usize) -> f32 {
        if survivors < 2 || density <= 0.0 {
            return 1.0;
        }
        let power = -2.0 * std::f32::consts::LN_2 / (survivors as f32).ln();
        2.0 * density.powf(power)
    }
}

impl<D> NicheDensity<D> {
    /// Partitions a best-first slice of survivors into niches.
    ///
    /// The first unprocessed individual becomes a reference. The scan walks forward
    /// from it while each next individual lies within the radius of the reference;
    /// the first one outside the radius starts the next niche.
    pub fn find_niches<I>(&self, survivors: &[ScoredIndividual<I>]) -> Vec<Niche>
    where
        I: Individual,
        D: Distance<I>,
    {
        let mut niches = Vec::new();
        let mut reference = 0;

        while reference < survivors.len() {
            let mut members = Vec::new();
            let mut next = reference + 1;
            while next < survivors.len() {
                let d = self.distance.distance(
                    &survivors[reference].individual,
                    &survivors[next].individual,
                );
                if d > self.radius {
                    break;
                }
                members.push((next, d));
                next += 1;
            }

            niches.push(Niche {
                reference,
                members,
                max_radius: self.radius,
            });
            reference = next;
        }

        niches
    }
}

fn penalty(std_dev: f32, distance: f32) -> f32 {
    std_dev / PENALTY_DIVISOR / distance.max(MIN_DISTANCE).powi(2)
}

impl<I, D> NicheStrategy<I> for NicheDensity<D>
where
    I: Individual,
    D: Distance<I>,
{
    fn penalize(
        &mut self,
        population: &mut [ScoredIndividual<I>],
        survivors: usize,
    ) -> Result<NicheReport> {
        let survivors = survivors.min(population.len());
        if survivors == 0 {
            return Err(GeneticError::EmptyPopulation);
        }

        let std_dev = normalized_std_dev(&population[..survivors]);
        let niches = self.find_niches(&population[..survivors]);

        let mut penalties = vec![0.0f32; population.len()];
        for niche in &niches {
            for &(member, d) in &niche.members {
                penalties[member] += penalty(std_dev, d);
            }

            for (position, &(a, _)) in niche.members.iter().enumerate() {
                for &(b, _) in &niche.members[position + 1..] {
                    let d = self
                        .distance
                        .distance(&population[a].individual, &population[b].individual);
                    let p = penalty(std_dev, d);
                    penalties[a] += p;
                    penalties[b] += p;
                }
            }
        }

        let mut penalized = 0;
        for (scored, &p) in population.iter_mut().zip(penalties.iter()) {
            if p > 0.0 {
                scored.normalized_score = scored.normalized_score.map(|n| n - p);
                penalized += 1;
            }
        }
        sort_by_normalized(population);

        let density = survivors as f32 / niches.len() as f32;
        let radius = self.radius;
        let next_radius = (radius * Self::resize_factor(density, survivors))
            .clamp(self.min_radius, self.max_radius);
        self.radius = next_radius;

        let report = NicheReport {
            niches: niches.len(),
            density,
            radius,
            next_radius,
            penalized,
        };
        tracing::debug!(
            niches = report.niches,
            density = report.density,
            radius = report.radius,
            next_radius = report.next_radius,
            penalized = report.penalized,
            "Applied niche penalties"
        );
        Ok(report)
    }
}

impl<D> fmt::Debug for NicheDensity<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NicheDensity")
            .field("radius", &self.radius)
            .field("min_radius", &self.min_radius)
            .field("max_radius", &self.max_radius)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::population::normalize_by_rank;
    use crate::rng::RandomNumberGenerator;

    #[derive(Clone, Debug, PartialEq)]
    struct Spot(f32);

    impl Individual for Spot {
        fn mutate(&self, _p: f32, sigma: f32, _rng: &mut RandomNumberGenerator) -> Self {
            Spot(self.0 + sigma)
        }

        fn name(&self) -> String {
            format!("spot@{}", self.0)
        }
    }

    fn line_distance(a: &Spot, b: &Spot) -> f32 {
        (a.0 - b.0).abs()
    }

    fn ranked(positions: &[f32]) -> Vec<ScoredIndividual<Spot>> {
        let mut population: Vec<ScoredIndividual<Spot>> = positions
            .iter()
            .map(|&x| ScoredIndividual::new(Spot(x)))
            .collect();
        normalize_by_rank(&mut population);
        population
    }

    #[test]
    fn test_identical_population_shrinks_radius() {
        let mut population = ranked(&[1.0; 16]);
        let mut strategy = NicheDensity::new(line_distance, 1.0).unwrap();

        let report = strategy.penalize(&mut population, 16).unwrap();

        assert_eq!(report.niches, 1);
        assert_eq!(report.density, 16.0);
        assert!(strategy.radius() < 1.0);
        assert!((strategy.radius() - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_spread_population_grows_radius() {
        let positions: Vec<f32> = (0..16).map(|i| i as f32 * 100.0).collect();
        let mut population = ranked(&positions);
        let mut strategy = NicheDensity::new(line_distance, 1.0).unwrap();

        let report = strategy.penalize(&mut population, 16).unwrap();

        assert_eq!(report.niches, 16);
        assert_eq!(report.penalized, 0);
        assert!((strategy.radius() - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_resize_factor_anchor_points() {
        let survivors = 16;
        assert!((NicheDensity::<()>::resize_factor(1.0, survivors) - 2.0).abs() < 1e-5);
        assert!((NicheDensity::<()>::resize_factor(4.0, survivors) - 1.0).abs() < 1e-5);
        assert!((NicheDensity::<()>::resize_factor(16.0, survivors) - 0.5).abs() < 1e-5);
        assert_eq!(NicheDensity::<()>::resize_factor(1.0, 1), 1.0);
    }

    #[test]
    fn test_crowded_individual_drops_in_rank() {
        // Index 1 sits right on top of the leader; index 2 is far away.
        let mut population = ranked(&[0.0, 0.05, 10.0, 20.0]);
        let mut strategy = NicheDensity::new(line_distance, 1.0).unwrap();

        let report = strategy.penalize(&mut population, 4).unwrap();

        assert_eq!(report.penalized, 1);
        assert_eq!(population[0].individual, Spot(0.0));
        assert_eq!(population[3].individual, Spot(0.05));
        assert!(population[3].normalized_score.unwrap() < 0.0);
    }

    #[test]
    fn test_members_penalize_each_other() {
        let population = ranked(&[0.0, 0.5, 0.6, 50.0]);
        let strategy = NicheDensity::new(line_distance, 1.0).unwrap();

        let niches = strategy.find_niches(&population);
        assert_eq!(niches.len(), 2);
        assert_eq!(niches[0].reference, 0);
        assert_eq!(niches[0].size(), 3);
        assert_eq!(niches[1].reference, 3);

        let mut penalized = population.clone();
        let mut strategy = NicheDensity::new(line_distance, 1.0).unwrap();
        strategy.penalize(&mut penalized, 4).unwrap();

        let score_of = |pop: &[ScoredIndividual<Spot>], x: f32| {
            pop.iter()
                .find(|s| s.individual == Spot(x))
                .and_then(|s| s.normalized_score)
                .unwrap()
        };
        let std_dev = normalized_std_dev(&population);
        let cross = penalty(std_dev, 0.6 - 0.5);
        let drop_b = score_of(&population[..], 0.5) - score_of(&penalized[..], 0.5);
        let drop_c = score_of(&population[..], 0.6) - score_of(&penalized[..], 0.6);
        assert!((drop_b - penalty(std_dev, 0.5) - cross).abs() < 1e-2);
        assert!((drop_c - penalty(std_dev, 0.6) - cross).abs() < 1e-2);
        assert_eq!(score_of(&population[..], 0.0), score_of(&penalized[..], 0.0));
    }

    #[test]
    fn test_scan_stops_at_first_distant_individual() {
        let mut population = ranked(&[0.0, 5.0, 0.1]);
        let mut strategy = NicheDensity::new(line_distance, 1.0).unwrap();

        let niches = strategy.find_niches(&population);
        assert_eq!(niches.len(), 3);
        assert!(niches.iter().all(|n| n.members.is_empty()));

        let report = strategy.penalize(&mut population, 3).unwrap();
        assert_eq!(report.niches, 3);
        assert_eq!(report.penalized, 0);
        assert_eq!(report.density, 1.0);
        assert!((report.next_radius - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_niches_are_contiguous_runs() {
        let population = ranked(&[0.0, 0.5, 3.0, 3.2, 0.2]);
        let strategy = NicheDensity::new(line_distance, 1.0).unwrap();

        let niches = strategy.find_niches(&population);
        let layout: Vec<(usize, Vec<usize>)> = niches
            .iter()
            .map(|n| (n.reference, n.members.iter().map(|&(i, _)| i).collect()))
            .collect();
        assert_eq!(layout, vec![(0, vec![1]), (2, vec![3]), (4, vec![])]);
    }

    #[test]
    fn test_culled_tail_untouched() {
        let mut population = ranked(&[0.0, 0.1, 0.0, 0.0]);
        let mut strategy = NicheDensity::new(line_distance, 1.0).unwrap();

        let report = strategy.penalize(&mut population, 2).unwrap();
        assert_eq!(report.niches, 1);
        assert_eq!(report.penalized, 1);
    }

    #[test]
    fn test_radius_bounds() {
        let mut population = ranked(&[1.0; 8]);
        let mut strategy = NicheDensity::new(line_distance, 1.0)
            .unwrap()
            .with_radius_bounds(0.9, 1.5)
            .unwrap();

        strategy.penalize(&mut population, 8).unwrap();
        assert_eq!(strategy.radius(), 0.9);

        assert!(NicheDensity::new(line_distance, 0.0).is_err());
        assert!(NicheDensity::new(line_distance, 1.0)
            .unwrap()
            .with_radius_bounds(2.0, 1.0)
            .is_err());
    }
}
