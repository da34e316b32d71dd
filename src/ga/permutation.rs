//! Permutation chromosome and its operators.
//!
//! The operators work on `&[usize]` index vectors and are usable on their
//! own; [`PermutationChromosome`] wraps them behind the [`Chromosome`]
//! contract for ordering problems (tours, job sequences).
//!
//! # Crossover Operators
//!
//! - [`successor_crossover`]: builds each child by following successor
//!   links of both parents
//! - [`order_crossover`] (OX): Davis (1985) — preserves relative order
//! - [`pmx_crossover`] (PMX): Goldberg & Lingle (1985) — preserves absolute position
//!
//! # Mutation Operators
//!
//! - [`swap_mutation`]: Exchange two random positions — O(1)
//! - [`insert_mutation`]: Remove and reinsert at random position — O(n)
//! - [`invert_mutation`]: Reverse a random segment (2-opt) — O(n)
//!
//! # References
//!
//! - Davis (1985), "Applying Adaptive Algorithms to Epistatic Domains"
//! - Goldberg & Lingle (1985), "Alleles, Loci, and the Traveling Salesman Problem"

use super::types::Chromosome;
use crate::error::GeneticError;
use rand::Rng;
use std::fmt;

// ============================================================================
// Crossover operators
// ============================================================================

/// Successor crossover for permutations.
///
/// The first child starts with `parent2[0]`; each next gene is the
/// cyclic successor of the previous gene in one of the parents (chosen at
/// random when both are free). If both successors are already used, a
/// random unused gene is taken. The second child is built the same way
/// with the parents' roles exchanged.
///
/// # Panics
/// Panics if parents have different lengths.
pub fn successor_crossover<R: Rng + ?Sized>(
    parent1: &[usize],
    parent2: &[usize],
    rng: &mut R,
) -> (Vec<usize>, Vec<usize>) {
    assert_eq!(parent1.len(), parent2.len(), "parents must have equal length");
    let child1 = successor_child(parent1, parent2, rng);
    let child2 = successor_child(parent2, parent1, rng);
    (child1, child2)
}

fn successor_child<R: Rng + ?Sized>(
    parent1: &[usize],
    parent2: &[usize],
    rng: &mut R,
) -> Vec<usize> {
    let n = parent1.len();
    if n == 0 {
        return Vec::new();
    }
    let next1 = successors(parent1);
    let next2 = successors(parent2);

    let mut used = vec![false; n];
    let mut child = Vec::with_capacity(n);
    let mut prev = parent2[0];
    child.push(prev);
    used[prev] = true;

    while child.len() < n {
        let (a, b) = (next1[prev], next2[prev]);
        prev = match (!used[a], !used[b]) {
            (true, true) => {
                if rng.random_bool(0.5) {
                    a
                } else {
                    b
                }
            }
            (true, false) => a,
            (false, true) => b,
            (false, false) => {
                // first free gene at or above a random start, else below it
                let start = rng.random_range(0..n);
                (start..n)
                    .chain((0..start).rev())
                    .find(|&g| !used[g])
                    .unwrap_or(start)
            }
        };
        child.push(prev);
        used[prev] = true;
    }
    child
}

/// `next[g]` is the gene following `g` in `perm`, wrapping at the end.
fn successors(perm: &[usize]) -> Vec<usize> {
    let n = perm.len();
    let mut next = vec![0; n];
    for (i, &gene) in perm.iter().enumerate() {
        next[gene] = perm[(i + 1) % n];
    }
    next
}

/// Order Crossover (OX) for permutations.
///
/// Preserves the **relative order** of elements from both parents.
///
/// # Algorithm (Davis, 1985)
///
/// 1. Select a random segment `[start, end]` from parent1
/// 2. Copy segment to child at the same positions
/// 3. Fill remaining positions with elements from parent2, in their original
///    order, skipping elements already present in the child
///
/// # Complexity
/// O(n) time, O(n) space
///
/// # Panics
/// Panics if parents have different lengths or are empty.
pub fn order_crossover<R: Rng + ?Sized>(
    parent1: &[usize],
    parent2: &[usize],
    rng: &mut R,
) -> (Vec<usize>, Vec<usize>) {
    let n = parent1.len();
    assert_eq!(n, parent2.len(), "parents must have equal length");
    assert!(n > 0, "parents must not be empty");

    if n == 1 {
        return (parent1.to_vec(), parent2.to_vec());
    }

    let (start, end) = random_segment(n, rng);

    let child1 = ox_build_child(parent1, parent2, start, end);
    let child2 = ox_build_child(parent2, parent1, start, end);

    (child1, child2)
}

/// Build one OX child: copy segment from `template`, fill from `donor`.
fn ox_build_child(template: &[usize], donor: &[usize], start: usize, end: usize) -> Vec<usize> {
    let n = template.len();
    let mut child = vec![usize::MAX; n];
    let mut in_segment = vec![false; n];

    for i in start..=end {
        child[i] = template[i];
        in_segment[template[i]] = true;
    }

    // fill after the segment, wrapping around
    let mut pos = (end + 1) % n;
    for offset in 0..n {
        let gene = donor[(end + 1 + offset) % n];
        if !in_segment[gene] {
            child[pos] = gene;
            pos = (pos + 1) % n;
        }
    }

    child
}

/// Partially Mapped Crossover (PMX) for permutations.
///
/// Preserves the **absolute position** of elements from both parents
/// as much as possible.
///
/// # Algorithm (Goldberg & Lingle, 1985)
///
/// 1. Select a random segment `[start, end]` from parent1
/// 2. Copy segment to child at the same positions
/// 3. For each element in parent2's segment that isn't in the child yet,
///    find its position through the mapping chain and place it there
/// 4. Fill remaining positions from parent2
///
/// # Complexity
/// O(n) time, O(n) space
///
/// # Panics
/// Panics if parents have different lengths or are empty.
pub fn pmx_crossover<R: Rng + ?Sized>(
    parent1: &[usize],
    parent2: &[usize],
    rng: &mut R,
) -> (Vec<usize>, Vec<usize>) {
    let n = parent1.len();
    assert_eq!(n, parent2.len(), "parents must have equal length");
    assert!(n > 0, "parents must not be empty");

    if n == 1 {
        return (parent1.to_vec(), parent2.to_vec());
    }

    let (start, end) = random_segment(n, rng);

    let child1 = pmx_build_child(parent1, parent2, start, end);
    let child2 = pmx_build_child(parent2, parent1, start, end);

    (child1, child2)
}

/// Build one PMX child: copy segment from `template`, map from `donor`.
fn pmx_build_child(template: &[usize], donor: &[usize], start: usize, end: usize) -> Vec<usize> {
    let n = template.len();
    let sentinel = usize::MAX;
    let mut child = vec![sentinel; n];
    let mut placed = vec![false; n];

    let mut donor_position = vec![0; n];
    for (i, &gene) in donor.iter().enumerate() {
        donor_position[gene] = i;
    }

    for i in start..=end {
        child[i] = template[i];
        placed[template[i]] = true;
    }

    // donor segment genes not yet placed follow the mapping chain out of
    // the segment
    for i in start..=end {
        let gene = donor[i];
        if placed[gene] {
            continue;
        }
        let mut pos = i;
        loop {
            pos = donor_position[template[pos]];
            if pos < start || pos > end {
                child[pos] = gene;
                placed[gene] = true;
                break;
            }
        }
    }

    for i in 0..n {
        if child[i] == sentinel {
            child[i] = donor[i];
        }
    }

    child
}

// ============================================================================
// Mutation operators
// ============================================================================

/// Swap mutation: exchange two random positions.
///
/// # Complexity
/// O(1)
pub fn swap_mutation<R: Rng + ?Sized>(perm: &mut [usize], rng: &mut R) {
    let n = perm.len();
    if n < 2 {
        return;
    }
    let i = rng.random_range(0..n);
    let j = rng.random_range(0..n);
    perm.swap(i, j);
}

/// Insert mutation: remove an element and reinsert at a random position.
///
/// # Complexity
/// O(n) due to array shifting
pub fn insert_mutation<R: Rng + ?Sized>(perm: &mut Vec<usize>, rng: &mut R) {
    let n = perm.len();
    if n < 2 {
        return;
    }
    let from = rng.random_range(0..n);
    let item = perm.remove(from);
    let to = rng.random_range(0..n); // n-1 elements, but 0..n insertion points
    perm.insert(to, item);
}

/// Invert mutation: reverse a random segment (2-opt move).
///
/// # Complexity
/// O(n) worst case for segment reversal
pub fn invert_mutation<R: Rng + ?Sized>(perm: &mut [usize], rng: &mut R) {
    let n = perm.len();
    if n < 2 {
        return;
    }
    let (start, end) = random_segment(n, rng);
    perm[start..=end].reverse();
}

/// Pick a random segment `[start, end]` within `0..n` where `start <= end`.
fn random_segment<R: Rng + ?Sized>(n: usize, rng: &mut R) -> (usize, usize) {
    let a = rng.random_range(0..n);
    let b = rng.random_range(0..n);
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

// ============================================================================
// Chromosome
// ============================================================================

/// Crossover operator used by [`PermutationChromosome`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PermutationCrossover {
    #[default]
    Successor,
    Order,
    PartiallyMapped,
}

/// Mutation operator used by [`PermutationChromosome`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PermutationMutation {
    #[default]
    Swap,
    Insert,
    Invert,
}

/// A permutation of `0..length`.
///
/// New chromosomes start from the identity and receive `length / 2`
/// random swaps.
///
/// # Examples
///
/// ```
/// use u_evolve::ga::{PermutationChromosome, PermutationCrossover};
/// use u_evolve::random::create_rng;
///
/// let mut rng = create_rng(3);
/// let tour = PermutationChromosome::new(6, &mut rng)
///     .with_crossover(PermutationCrossover::Order);
///
/// let mut genes = tour.genes().to_vec();
/// genes.sort();
/// assert_eq!(genes, vec![0, 1, 2, 3, 4, 5]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct PermutationChromosome {
    genes: Vec<usize>,
    crossover: PermutationCrossover,
    mutation: PermutationMutation,
    fitness: f64,
}

impl PermutationChromosome {
    pub const MIN_LENGTH: usize = 2;
    pub const MAX_LENGTH: usize = 65536;

    /// Creates a random permutation. `length` is clamped to `[2, 65536]`.
    pub fn new<R: Rng + ?Sized>(length: usize, rng: &mut R) -> Self {
        let length = length.clamp(Self::MIN_LENGTH, Self::MAX_LENGTH);
        let mut genes: Vec<usize> = (0..length).collect();
        for _ in 0..length / 2 {
            swap_mutation(&mut genes, rng);
        }
        Self {
            genes,
            crossover: PermutationCrossover::default(),
            mutation: PermutationMutation::default(),
            fitness: 0.0,
        }
    }

    /// Wraps an explicit permutation.
    ///
    /// # Errors
    ///
    /// [`GeneticError::InvalidArgument`] if `genes` is not a permutation of
    /// `0..genes.len()` or is shorter than 2.
    pub fn from_genes(genes: Vec<usize>) -> Result<Self, GeneticError> {
        if genes.len() < Self::MIN_LENGTH || genes.len() > Self::MAX_LENGTH {
            return Err(GeneticError::InvalidArgument(format!(
                "permutation length {} outside [{}, {}]",
                genes.len(),
                Self::MIN_LENGTH,
                Self::MAX_LENGTH
            )));
        }
        let mut seen = vec![false; genes.len()];
        for &gene in &genes {
            if gene >= genes.len() || seen[gene] {
                return Err(GeneticError::InvalidArgument(format!(
                    "not a permutation: gene {gene} is out of range or repeated"
                )));
            }
            seen[gene] = true;
        }
        Ok(Self {
            genes,
            crossover: PermutationCrossover::default(),
            mutation: PermutationMutation::default(),
            fitness: 0.0,
        })
    }

    pub fn with_crossover(mut self, crossover: PermutationCrossover) -> Self {
        self.crossover = crossover;
        self
    }

    pub fn with_mutation(mut self, mutation: PermutationMutation) -> Self {
        self.mutation = mutation;
        self
    }

    pub fn genes(&self) -> &[usize] {
        &self.genes
    }

    pub fn len(&self) -> usize {
        self.genes.len()
    }

    /// Always `false`; a permutation holds at least two genes.
    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }
}

impl Chromosome for PermutationChromosome {
    fn fitness(&self) -> f64 {
        self.fitness
    }

    fn set_fitness(&mut self, fitness: f64) {
        self.fitness = fitness;
    }

    fn create_offspring<R: Rng + ?Sized>(&self, rng: &mut R) -> Self {
        Self::new(self.genes.len(), rng)
            .with_crossover(self.crossover)
            .with_mutation(self.mutation)
    }

    /// Applies `self`'s crossover operator. Pairs of different length are
    /// left as is.
    fn crossover<R: Rng + ?Sized>(&mut self, pair: &mut Self, rng: &mut R) {
        if pair.genes.len() != self.genes.len() {
            return;
        }
        let (child1, child2) = match self.crossover {
            PermutationCrossover::Successor => successor_crossover(&self.genes, &pair.genes, rng),
            PermutationCrossover::Order => order_crossover(&self.genes, &pair.genes, rng),
            PermutationCrossover::PartiallyMapped => pmx_crossover(&self.genes, &pair.genes, rng),
        };
        self.genes = child1;
        pair.genes = child2;
    }

    fn mutate<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        match self.mutation {
            PermutationMutation::Swap => swap_mutation(&mut self.genes, rng),
            PermutationMutation::Insert => insert_mutation(&mut self.genes, rng),
            PermutationMutation::Invert => invert_mutation(&mut self.genes, rng),
        }
    }
}

impl fmt::Display for PermutationChromosome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, gene) in self.genes.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{gene}")?;
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
