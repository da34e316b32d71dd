//! Core trait definitions for the genetic engine.
//!
//! Three contracts connect [`Population`](super::Population) to a concrete
//! problem: [`Chromosome`] (the unit of search), [`FitnessFunction`] (how
//! good a chromosome is) and [`SelectionMethod`] (who survives an epoch).

use rand::{Rng, RngCore};
use std::fmt;

/// A candidate solution in the population.
///
/// Higher fitness is better. Chromosomes carry their own fitness value,
/// which the engine sets through [`evaluate`](Chromosome::evaluate) right
/// after a chromosome is created, recombined or mutated.
///
/// `Display` renders the genotype; fitness functions that interpret the
/// textual form (symbolic regression) rely on it.
///
/// # Implementing
///
/// ```ignore
/// #[derive(Clone)]
/// struct Gene {
///     value: f64,
///     fitness: f64,
/// }
///
/// impl Chromosome for Gene {
///     fn fitness(&self) -> f64 { self.fitness }
///     fn set_fitness(&mut self, f: f64) { self.fitness = f; }
///     fn create_offspring<R: Rng + ?Sized>(&self, rng: &mut R) -> Self {
///         Gene { value: rng.random_range(-1.0..1.0), fitness: 0.0 }
///     }
///     fn crossover<R: Rng + ?Sized>(&mut self, pair: &mut Self, _rng: &mut R) {
///         std::mem::swap(&mut self.value, &mut pair.value);
///     }
///     fn mutate<R: Rng + ?Sized>(&mut self, rng: &mut R) {
///         self.value += rng.random_range(-0.1..0.1);
///     }
/// }
/// ```
pub trait Chromosome: Clone + fmt::Display + Send + Sync {
    /// Returns the fitness assigned by the last evaluation.
    fn fitness(&self) -> f64;

    /// Stores a freshly computed fitness.
    fn set_fitness(&mut self, fitness: f64);

    /// Creates a new random chromosome structurally compatible with `self`
    /// (same length, same gene set, ...).
    fn create_offspring<R: Rng + ?Sized>(&self, rng: &mut R) -> Self;

    /// Recombines `self` and `pair` in place, turning both into offspring.
    ///
    /// Both chromosomes are always of the same concrete type; pairs that
    /// are structurally incompatible may be left untouched.
    fn crossover<R: Rng + ?Sized>(&mut self, pair: &mut Self, rng: &mut R);

    /// Perturbs the chromosome in place.
    fn mutate<R: Rng + ?Sized>(&mut self, rng: &mut R);

    /// Computes and stores this chromosome's fitness.
    fn evaluate(&mut self, function: &dyn FitnessFunction<Self>) {
        let fitness = function.evaluate(self);
        self.set_fitness(fitness);
    }
}

/// A chromosome whose genotype is a fixed-width unsigned integer.
///
/// Required by the function-optimization fitness functions, which decode
/// the integer into one or two real coordinates.
pub trait BinaryGenotype {
    /// The genotype, masked to [`length`](BinaryGenotype::length) bits.
    fn value(&self) -> u64;

    /// Largest representable genotype (`2^length - 1`).
    fn max_value(&self) -> u64;

    /// Number of significant bits, at most 64.
    fn length(&self) -> u32;
}

/// Maps a chromosome to a score, and to a domain value for reporting.
///
/// Evaluation must be a deterministic function of the chromosome's genetic
/// content. Functions built on fallible machinery (expression evaluation)
/// degrade to `0.0` instead of failing.
///
/// `Send + Sync` so that a population borrowing the function can be moved
/// to a worker thread, and one function can serve several populations.
pub trait FitnessFunction<C: Chromosome>: Send + Sync {
    /// Scores the chromosome. Higher is better.
    fn evaluate(&self, chromosome: &C) -> f64;

    /// Decodes the chromosome into its phenotype.
    ///
    /// Used for inspection and logging only; the epoch loop never calls it.
    fn translate(&self, chromosome: &C) -> Phenotype;
}

/// Reduces an oversized population to an exact target size.
///
/// After `apply_selection(population, size, rng)` returns, `population`
/// must hold exactly `size` chromosomes. The engine never asks for more
/// members than the population currently holds and treats any other
/// outcome as a broken contract.
pub trait SelectionMethod<C: Chromosome>: Send + Sync {
    fn apply_selection(&self, population: &mut Vec<C>, size: usize, rng: &mut dyn RngCore);
}

/// The decoded, domain-meaningful value of a chromosome.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Phenotype {
    /// A single coordinate (1-D optimization).
    Scalar(f64),
    /// An `(x, y)` coordinate pair (2-D optimization).
    Point(f64, f64),
    /// A textual expression (symbolic regression, time-series prediction).
    Expression(String),
}

impl fmt::Display for Phenotype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phenotype::Scalar(x) => write!(f, "{x}"),
            Phenotype::Point(x, y) => write!(f, "({x}, {y})"),
            Phenotype::Expression(expr) => f.write_str(expr),
        }
    }
}
