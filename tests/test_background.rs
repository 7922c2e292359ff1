mod common;

use common::{random_polynomial, uniform_crossover, Polynomial};
use evoreap::{EvolutionOptions, OptimizerBuilder, OptimizerState, RandomNumberGenerator};

#[test]
fn test_spawned_run_matches_blocking_run() {
    let build = || {
        OptimizerBuilder::<Polynomial>::new()
            .with_options(
                EvolutionOptions::builder()
                    .num_generations(12)
                    .population_size(24)
                    .workers(2)
                    .build()
                    .unwrap(),
            )
            .with_fitness(|p: &Polynomial| p.mean_squared_error())
            .with_crossover(uniform_crossover)
            .with_generator(random_polynomial)
            .build()
            .unwrap()
    };

    let mut blocking = build();
    blocking
        .run(&mut RandomNumberGenerator::from_seed(21))
        .unwrap();

    let handle = build().spawn(RandomNumberGenerator::from_seed(21));
    let live = handle.champions().clone();
    assert!(handle.generation() <= 12);

    let background = handle.join().unwrap();
    assert_eq!(background.state(), OptimizerState::Done);
    assert_eq!(background.generation(), 12);
    assert_eq!(live.snapshot(), blocking.champions().snapshot());
}
