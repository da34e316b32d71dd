//! Population-based genetic search engine.
//!
//! Provides a generic, strategy-driven genetic algorithm:
//!
//! - **Population**: owns the chromosomes of one search and advances them one
//!   epoch at a time (crossover → mutation → selection → statistics).
//! - **Strategy contracts**: [`ga::Chromosome`], [`ga::FitnessFunction`] and
//!   [`ga::SelectionMethod`] are the seams where problem-specific behavior
//!   plugs in.
//! - **Selection methods**: elite, rank and roulette-wheel selection.
//! - **Encodings**: binary strings, expression trees and permutations.
//! - **Fitness functions**: 1-D and 2-D function optimization over binary
//!   genotypes, plus symbolic regression and time-series prediction over
//!   polish-notation expressions.
//!
//! # Architecture
//!
//! The engine is single-threaded and synchronous. Each [`ga::Population`]
//! owns its own seedable random number generator and is `Send`, so
//! independent populations can run on separate threads without sharing
//! state; fitness functions and selection methods are `Send + Sync` and
//! may be shared between them. The termination condition belongs to the
//! caller; [`ga::EpochRunner`] is a ready-made driver loop for the common
//! stop conditions.

pub mod error;
pub mod fitness;
pub mod ga;
pub mod random;
pub mod range;

pub use error::GeneticError;
pub use range::Range;
