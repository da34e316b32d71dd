//! Selection methods.
//!
//! A selection method reduces the population grown by crossover and
//! mutation back to a target size. Different methods provide different
//! selection pressure.
//!
//! All methods assume **maximization** (higher fitness = better).
//!
//! # References
//!
//! - Blickle & Thiele (1996), "A Comparison of Selection Schemes used in
//!   Evolutionary Algorithms"
//! - Goldberg & Deb (1991), "A Comparative Analysis of Selection Schemes
//!   Used in Genetic Algorithms"

use super::types::{Chromosome, SelectionMethod};
use rand::{Rng, RngCore};

/// Sorts chromosomes by fitness, best first.
pub(crate) fn sort_by_fitness_desc<C: Chromosome>(members: &mut [C]) {
    members.sort_by(|a, b| {
        b.fitness()
            .partial_cmp(&a.fitness())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

/// Elite selection: keep the `size` fittest chromosomes.
///
/// With `shuffle` enabled, `size / 2` random swaps are applied to the
/// survivors so that crossover does not always pair neighbors of similar
/// rank.
///
/// # Examples
///
/// ```
/// use u_evolve::ga::EliteSelection;
///
/// let sel = EliteSelection::default();
/// assert!(sel.shuffle);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EliteSelection {
    pub shuffle: bool,
}

impl Default for EliteSelection {
    fn default() -> Self {
        Self { shuffle: true }
    }
}

impl EliteSelection {
    pub fn new(shuffle: bool) -> Self {
        Self { shuffle }
    }
}

impl<C: Chromosome> SelectionMethod<C> for EliteSelection {
    fn apply_selection(&self, population: &mut Vec<C>, size: usize, rng: &mut dyn RngCore) {
        sort_by_fitness_desc(population);
        population.truncate(size);

        if self.shuffle {
            for _ in 0..size / 2 {
                let a = rng.random_range(0..size);
                let b = rng.random_range(0..size);
                population.swap(a, b);
            }
        }
    }
}

/// Rank-based selection.
///
/// Chromosomes are sorted by fitness and selection probability is
/// proportional to rank position, not raw fitness value. The best of `n`
/// chromosomes gets weight `n`, the worst weight `1`. This avoids the
/// scaling problems of roulette wheel selection and works with negative
/// fitness values.
///
/// Reference: Baker (1985), "Adaptive Selection Methods for Genetic
/// Algorithms"
///
/// # Complexity
/// O(n log n) sort, O(n) per drawn chromosome
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RankSelection;

impl<C: Chromosome> SelectionMethod<C> for RankSelection {
    fn apply_selection(&self, population: &mut Vec<C>, size: usize, rng: &mut dyn RngCore) {
        let n = population.len();
        if n == 0 {
            return;
        }
        sort_by_fitness_desc(population);

        let total = (n * (n + 1) / 2) as f64;
        let mut wheel = Vec::with_capacity(n);
        let mut cumulative = 0.0;
        for rank in 0..n {
            cumulative += (n - rank) as f64 / total;
            wheel.push(cumulative);
        }

        let selected: Vec<C> = (0..size)
            .map(|_| population[spin(&wheel, rng)].clone())
            .collect();
        *population = selected;
    }
}

/// Fitness-proportionate (roulette wheel) selection.
///
/// Probability of selection is proportional to fitness, so fitness must be
/// non-negative. When the fitness sum is not positive the wheel is
/// meaningless and chromosomes are drawn uniformly.
///
/// Members with `+∞` fitness (the exact optimum of a minimized function)
/// take the whole wheel: draws are uniform among them only.
///
/// **Warning**: Susceptible to super-individual dominance when
/// fitness variance is high.
///
/// # Complexity
/// O(n) per drawn chromosome (linear scan)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouletteWheelSelection;

impl<C: Chromosome> SelectionMethod<C> for RouletteWheelSelection {
    fn apply_selection(&self, population: &mut Vec<C>, size: usize, rng: &mut dyn RngCore) {
        let n = population.len();
        if n == 0 {
            return;
        }

        let infinite: Vec<usize> = (0..n)
            .filter(|&i| population[i].fitness() == f64::INFINITY)
            .collect();
        let selected: Vec<C> = if !infinite.is_empty() {
            (0..size)
                .map(|_| population[infinite[rng.random_range(0..infinite.len())]].clone())
                .collect()
        } else {
            let wheel = proportional_wheel(population);
            (0..size)
                .map(|_| {
                    let i = match &wheel {
                        Some(wheel) => spin(wheel, rng),
                        None => rng.random_range(0..n),
                    };
                    population[i].clone()
                })
                .collect()
        };
        *population = selected;
    }
}

/// Cumulative normalized fitness, or `None` if the sum is not a usable
/// positive number.
fn proportional_wheel<C: Chromosome>(population: &[C]) -> Option<Vec<f64>> {
    let mut fitness_sum: f64 = population.iter().map(|c| c.fitness()).sum();
    // finite values whose sum overflows: rescale by the largest one
    let scale = if fitness_sum == f64::INFINITY {
        let max = population
            .iter()
            .map(|c| c.fitness())
            .fold(f64::NEG_INFINITY, f64::max);
        fitness_sum = population.iter().map(|c| c.fitness() / max).sum();
        max
    } else {
        1.0
    };
    if !(fitness_sum > 0.0 && fitness_sum.is_finite()) {
        return None;
    }

    let mut cumulative = 0.0;
    let wheel = population
        .iter()
        .map(|c| {
            cumulative += c.fitness() / scale / fitness_sum;
            cumulative
        })
        .collect();
    Some(wheel)
}

/// Returns the first slot whose cumulative bound covers a uniform draw.
fn spin(wheel: &[f64], rng: &mut dyn RngCore) -> usize {
    let value: f64 = rng.random();
    wheel
        .iter()
        .position(|&bound| value <= bound)
        .unwrap_or(wheel.len() - 1) // floating-point fallback
}
