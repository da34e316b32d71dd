//! Bundled fitness functions.
//!
//! - [`OptimizationFunction1D`], [`OptimizationFunction2D`]: optimize a
//!   real function over one or two ranges, decoding the genotype of a
//!   [`BinaryGenotype`](crate::ga::BinaryGenotype) chromosome
//! - [`SymbolicRegressionFitness`], [`TimeSeriesPredictionFitness`]: score
//!   chromosomes whose textual form is a [`polish`] expression

mod optimization;
pub mod polish;
mod regression;

pub use optimization::{
    decode, split_genotype, OptimizationFunction1D, OptimizationFunction2D, OptimizationMode,
};
pub use regression::{SymbolicRegressionFitness, TimeSeriesPredictionFitness};
