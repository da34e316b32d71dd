//! Error type shared by the engine and the bundled fitness functions.

use crate::ga::Phenotype;

/// Errors reported by configuration, construction and fitness evaluation.
///
/// Contract violations inside the epoch loop (a selection method that
/// leaves the wrong number of members) are panics, not values of this type.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeneticError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A decoded genotype produced a fitness that cannot take part in
    /// selection or statistics (for example `1 / f(x)` with `f(x) == 0`).
    ///
    /// `value` is the fitness the computation would have produced.
    #[error("invalid fitness value {value} at {point}")]
    InvalidFitnessValue { point: Phenotype, value: f64 },

    #[error("expression error: {0}")]
    Expression(String),
}
