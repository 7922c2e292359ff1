mod common;

use common::{random_polynomial, uniform_crossover, Polynomial};
use evoreap::{
    niche::NicheStrategy, EvolutionOptions, NicheDensity, OptimizerBuilder,
    RandomNumberGenerator, ScoredIndividual,
};

fn euclidean(a: &Polynomial, b: &Polynomial) -> f32 {
    a.coefficients
        .iter()
        .zip(&b.coefficients)
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f32>()
        .sqrt()
}

fn scored(coefficients: Vec<f32>, normalized: f32) -> ScoredIndividual<Polynomial> {
    let mut scored = ScoredIndividual::new(Polynomial { coefficients });
    scored.normalized_score = Some(normalized);
    scored
}

#[test]
fn test_crowded_peak_yields_to_distinct_individual() {
    // Ten near-copies of the leader, then one distant individual.
    let mut population: Vec<ScoredIndividual<Polynomial>> = (0..10)
        .map(|i| scored(vec![1.0 + i as f32 * 0.001, 0.0, 0.0], 1.0 - i as f32 * 0.05))
        .collect();
    population.push(scored(vec![-4.0, 3.0, 0.0], 0.4));

    let mut strategy = NicheDensity::new(euclidean, 0.5).unwrap();
    let report = strategy.penalize(&mut population, 11).unwrap();

    assert_eq!(report.niches, 2);
    assert_eq!(report.penalized, 9);
    assert_eq!(population[0].individual.coefficients[0], 1.0);
    assert_eq!(population[1].individual.coefficients, vec![-4.0, 3.0, 0.0]);
    assert!(report.next_radius < report.radius);
}

#[test]
fn test_radius_responds_to_density() {
    let mut strategy = NicheDensity::new(euclidean, 1.0).unwrap();

    // Survivors far apart: every niche is a singleton and the radius doubles.
    let mut spread: Vec<ScoredIndividual<Polynomial>> = (0..8)
        .map(|i| scored(vec![i as f32 * 10.0, 0.0, 0.0], 1.0 - i as f32 / 7.0))
        .collect();
    let report = strategy.penalize(&mut spread, 8).unwrap();
    assert_eq!(report.niches, 8);
    assert!((report.next_radius - 2.0).abs() < 1e-4);

    // Everybody inside one niche: the radius halves.
    let mut crowded: Vec<ScoredIndividual<Polynomial>> = (0..8)
        .map(|i| scored(vec![i as f32 * 0.01, 0.0, 0.0], 1.0 - i as f32 / 7.0))
        .collect();
    let report = strategy.penalize(&mut crowded, 8).unwrap();
    assert_eq!(report.niches, 1);
    assert!((report.next_radius - 1.0).abs() < 1e-4);
}

#[test]
fn test_optimizer_with_niching() {
    let options = EvolutionOptions::builder()
        .num_generations(15)
        .population_size(32)
        .elitism_percent(0.125)
        .eliminated_percent(0.25)
        .build()
        .unwrap();
    let strategy = NicheDensity::new(euclidean, 0.25)
        .unwrap()
        .with_radius_bounds(0.01, 4.0)
        .unwrap();
    let mut optimizer = OptimizerBuilder::<Polynomial>::new()
        .with_options(options)
        .with_fitness(|p: &Polynomial| p.mean_squared_error())
        .with_crossover(uniform_crossover)
        .with_generator(random_polynomial)
        .with_niche_strategy(strategy)
        .build()
        .unwrap();
    let mut rng = RandomNumberGenerator::from_seed(17);

    optimizer.run(&mut rng).unwrap();

    assert_eq!(optimizer.population().len(), 32);
    assert_eq!(optimizer.champions().len(), 15);
    assert!(optimizer
        .champions()
        .snapshot()
        .iter()
        .all(|c| c.raw_score.map_or(false, f32::is_finite)));
}
