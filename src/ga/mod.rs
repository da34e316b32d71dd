//! Genetic search engine.
//!
//! A generic, strategy-driven genetic algorithm. Problems plug in through
//! three contracts; the engine owns the population and its random number
//! generator.
//!
//! # Core Traits
//!
//! - [`Chromosome`]: A candidate solution that can be cloned, spawned,
//!   recombined, mutated and evaluated
//! - [`FitnessFunction`]: Scores a chromosome and decodes its phenotype
//! - [`SelectionMethod`]: Reduces an oversized population to a target size
//! - [`BinaryGenotype`]: Integer genotype access for binary encodings
//!
//! # Key Types
//!
//! - [`Population`]: The epoch loop (crossover → mutation → selection)
//! - [`PopulationConfig`]: Size, operator rates, shuffling, seed
//! - [`EpochRunner`]: Drives epochs until a stop condition holds
//! - [`BinaryChromosome`]: Fixed-width bit-string encoding
//! - [`GpTreeChromosome`]: Expression tree emitting polish notation
//! - [`PermutationChromosome`]: Ordering of `0..n` with OX/PMX/successor
//!   crossover
//! - [`EliteSelection`], [`RankSelection`], [`RouletteWheelSelection`]
//!
//! # References
//!
//! - Holland (1975), *Adaptation in Natural and Artificial Systems*
//! - Goldberg (1989), *Genetic Algorithms in Search, Optimization, and Machine Learning*

mod binary;
mod config;
mod gp;
pub mod permutation;
mod population;
mod runner;
mod selection;
mod types;

pub use binary::{bit_mask, BinaryChromosome};
pub use config::{
    PopulationConfig, CROSSOVER_RATE_RANGE, MUTATION_RATE_RANGE, RANDOM_SELECTION_PORTION_RANGE,
};
pub use gp::{GpFunction, GpGene, GpTreeChromosome, GpTreeNode};
pub use permutation::{PermutationChromosome, PermutationCrossover, PermutationMutation};
pub use population::Population;
pub use runner::{EpochRunner, RunConfig, RunResult, StopReason};
pub use selection::{EliteSelection, RankSelection, RouletteWheelSelection};
pub use types::{BinaryGenotype, Chromosome, FitnessFunction, Phenotype, SelectionMethod};
