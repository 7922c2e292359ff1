//! # Evolution
//!
//! The optimizer, its configuration and the handles used to observe a run.
pub mod builder;
pub mod champions;
pub mod optimizer;
pub mod options;

pub use builder::OptimizerBuilder;
pub use champions::Champions;
pub use optimizer::{OptimizationHandle, Optimizer, OptimizerState};
pub use options::{EvolutionOptions, EvolutionOptionsBuilder};
