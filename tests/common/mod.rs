#![allow(dead_code)]

use evoreap::{Individual, RandomNumberGenerator};

/// Sample points of `y = 2x² - 3x + 1` on `[-2, 2]`.
pub fn target_points() -> Vec<(f32, f32)> {
    (0..=16)
        .map(|i| {
            let x = -2.0 + i as f32 * 0.25;
            (x, 2.0 * x * x - 3.0 * x + 1.0)
        })
        .collect()
}

/// Quadratic candidate, coefficients lowest degree first.
#[derive(Clone, Debug, PartialEq)]
pub struct Polynomial {
    pub coefficients: Vec<f32>,
}

impl Polynomial {
    pub fn eval(&self, x: f32) -> f32 {
        self.coefficients
            .iter()
            .rev()
            .fold(0.0, |acc, c| acc * x + c)
    }

    pub fn mean_squared_error(&self) -> f32 {
        let points = target_points();
        points
            .iter()
            .map(|(x, y)| (self.eval(*x) - y).powi(2))
            .sum::<f32>()
            / points.len() as f32
    }
}

impl Individual for Polynomial {
    fn mutate(&self, probability: f32, sigma: f32, rng: &mut RandomNumberGenerator) -> Self {
        let coefficients = self
            .coefficients
            .iter()
            .map(|c| {
                if rng.unit() < probability {
                    c + (rng.unit() * 2.0 - 1.0) * sigma * 0.05
                } else {
                    *c
                }
            })
            .collect();
        Self { coefficients }
    }

    fn name(&self) -> String {
        format!("{:?}", self.coefficients)
    }
}

/// Each coefficient comes from a randomly chosen parent.
pub fn uniform_crossover(parents: &[&Polynomial], rng: &mut RandomNumberGenerator) -> Polynomial {
    let coefficients = (0..parents[0].coefficients.len())
        .map(|i| parents[rng.index(parents.len())].coefficients[i])
        .collect();
    Polynomial { coefficients }
}

pub fn random_polynomial(rng: &mut RandomNumberGenerator) -> Polynomial {
    Polynomial {
        coefficients: (0..3).map(|_| rng.unit() * 10.0 - 5.0).collect(),
    }
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}
