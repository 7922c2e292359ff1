//! # Error Types
//!
//! This module defines the error type shared by every component of the engine.
//! Configuration mistakes are reported when options are assigned or an optimizer
//! is built; runtime failures (a fitness function that fails or produces a
//! non-finite score, a misused tournament ranker) abort the current run.
//!
//! ## Examples
//!
//! Using the `Result` type:
//!
//! ```rust
//! use evoreap::error::{GeneticError, Result};
//!
//! fn some_function() -> Result<()> {
//!     // Function implementation
//!     Ok(())
//! }
//!
//! fn caller() {
//!     match some_function() {
//!         Ok(_) => println!("Success!"),
//!         Err(e) => println!("Error: {}", e),
//!     }
//! }
//! ```
//!
//! Using the `ResultExt` trait to add context to errors:
//!
//! ```rust
//! use evoreap::error::{Result, ResultExt};
//!
//! fn parse_degree(raw: &str) -> Result<u32> {
//!     raw.parse::<u32>().context("Failed to parse polynomial degree")
//! }
//!
//! assert!(parse_degree("3").is_ok());
//! assert!(parse_degree("three").is_err());
//! ```
//!
//! Using the `OptionExt` trait to convert `Option` to `Result`:
//!
//! ```rust
//! use evoreap::error::{GeneticError, OptionExt};
//!
//! fn find_best_candidate(candidates: &[i32]) -> evoreap::error::Result<i32> {
//!     candidates.iter().max().cloned().ok_or_else_genetic(||
//!         GeneticError::EmptyPopulation
//!     )
//! }
//! ```

use std::error::Error as StdError;
use std::fmt;
use thiserror::Error;

/// Represents errors that can occur while configuring or running an optimization.
#[derive(Error, Debug)]
pub enum GeneticError {
    /// Error that occurs when an invalid configuration is provided.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A numeric tunable was assigned a value outside its valid range.
    #[error("Invalid parameter `{parameter}`: {value} is outside the valid range {range}")]
    InvalidParameter {
        parameter: &'static str,
        value: f64,
        range: &'static str,
    },

    /// The variation ratios do not add up to the fixed total.
    #[error("Invalid variation settings: ratios sum to {total}, expected {expected}")]
    InvalidVariation { total: u32, expected: u32 },

    /// Error that occurs when an empty population is encountered.
    #[error("Empty population error: Cannot operate on an empty population")]
    EmptyPopulation,

    /// Error that occurs when a fitness calculation fails.
    #[error("Fitness calculation error: {0}")]
    FitnessCalculation(String),

    /// Error that occurs when the tournament ranker is driven incorrectly.
    #[error("Ranking error: {0}")]
    Ranking(String),

    /// Error that occurs when an evolution process fails.
    #[error("Evolution error: {0}")]
    Evolution(String),

    /// A generic error with a custom message.
    #[error("{0}")]
    Other(String),
}

/// A specialized Result type for evolutionary optimization.
///
/// This type is a convenience wrapper around `std::result::Result` with the error type
/// fixed to `GeneticError`.
pub type Result<T> = std::result::Result<T, GeneticError>;

/// Extension trait for Result to add context to errors.
///
/// This trait provides a convenient way to add context to errors when
/// converting from one error type to `GeneticError`.
pub trait ResultExt<T, E> {
    /// Converts the error to a `GeneticError::Other` prefixed with `context`.
    fn context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static;
}

impl<T, E> ResultExt<T, E> for std::result::Result<T, E>
where
    E: StdError + Send + Sync + 'static,
{
    fn context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static,
    {
        self.map_err(|e| GeneticError::Other(format!("{}: {}", context, e)))
    }
}

/// Extension trait for Option to convert to Result with a custom error.
pub trait OptionExt<T> {
    /// Converts an `Option<T>` to a `Result<T, GeneticError>` using
    /// a closure to generate the error.
    fn ok_or_else_genetic<F>(self, err_fn: F) -> Result<T>
    where
        F: FnOnce() -> GeneticError;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_else_genetic<F>(self, err_fn: F) -> Result<T>
    where
        F: FnOnce() -> GeneticError,
    {
        self.ok_or_else(err_fn)
    }
}

/// Checks that `value` lies in the closed interval `[min, max]`.
pub(crate) fn ensure_in_range(
    parameter: &'static str,
    value: f64,
    min: f64,
    max: f64,
    range: &'static str,
) -> Result<()> {
    if value.is_finite() && (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(GeneticError::InvalidParameter {
            parameter,
            value,
            range,
        })
    }
}
