//! Fixed-width binary chromosome.
//!
//! The genotype is an unsigned integer of up to 64 bits. It is the encoding
//! expected by the function-optimization fitness functions.

use super::types::{BinaryGenotype, Chromosome};
use rand::Rng;
use std::fmt;

/// Mask with the lowest `length` bits set.
///
/// `length == 0` yields `0` and `length >= 64` yields `u64::MAX`, so the
/// result never depends on how the platform treats out-of-range shifts.
///
/// ```
/// use u_evolve::ga::bit_mask;
///
/// assert_eq!(bit_mask(0), 0);
/// assert_eq!(bit_mask(3), 0b111);
/// assert_eq!(bit_mask(64), u64::MAX);
/// ```
pub fn bit_mask(length: u32) -> u64 {
    match length {
        0 => 0,
        n if n >= 64 => u64::MAX,
        n => u64::MAX >> (64 - n),
    }
}

/// A chromosome made of `length` random bits.
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryChromosome {
    length: u32,
    value: u64,
    fitness: f64,
}

impl BinaryChromosome {
    /// Shortest supported chromosome.
    pub const MIN_LENGTH: u32 = 2;
    /// Longest supported chromosome.
    pub const MAX_LENGTH: u32 = 64;

    /// Creates a random chromosome. `length` is clamped to `[2, 64]`.
    pub fn new<R: Rng + ?Sized>(length: u32, rng: &mut R) -> Self {
        Self::with_value(length, rng.random())
    }

    /// Creates a chromosome with an explicit genotype.
    ///
    /// Bits above `length` are dropped, so equal genotypes compare equal.
    pub fn with_value(length: u32, value: u64) -> Self {
        let length = length.clamp(Self::MIN_LENGTH, Self::MAX_LENGTH);
        Self {
            length,
            value: value & bit_mask(length),
            fitness: 0.0,
        }
    }
}

impl BinaryGenotype for BinaryChromosome {
    fn value(&self) -> u64 {
        self.value
    }

    fn max_value(&self) -> u64 {
        bit_mask(self.length)
    }

    fn length(&self) -> u32 {
        self.length
    }
}

impl Chromosome for BinaryChromosome {
    fn fitness(&self) -> f64 {
        self.fitness
    }

    fn set_fitness(&mut self, fitness: f64) {
        self.fitness = fitness;
    }

    fn create_offspring<R: Rng + ?Sized>(&self, rng: &mut R) -> Self {
        Self::new(self.length, rng)
    }

    /// Single-point crossover. Pairs of different length are left as is.
    fn crossover<R: Rng + ?Sized>(&mut self, pair: &mut Self, rng: &mut R) {
        if pair.length != self.length {
            return;
        }
        let point = 63 - rng.random_range(0..self.length - 1);
        let low = u64::MAX >> point;
        let high = !low;

        let (a, b) = (self.value, pair.value);
        self.value = (a & low) | (b & high);
        pair.value = (b & low) | (a & high);
    }

    /// Flips one random bit.
    fn mutate<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.value ^= 1u64 << rng.random_range(0..self.length);
    }
}

impl fmt::Display for BinaryChromosome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bit in (0..self.length).rev() {
            let c = if (self.value >> bit) & 1 == 1 { '1' } else { '0' };
            write!(f, "{c}")?;
        }
        Ok(())
    }
}
