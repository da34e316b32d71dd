//! Function optimization over binary genotypes.
//!
//! The genotype of a [`BinaryGenotype`] chromosome is decoded linearly into
//! one ([`OptimizationFunction1D`]) or two ([`OptimizationFunction2D`]) real
//! coordinates, and the user function is evaluated at the decoded point.

use crate::error::GeneticError;
use crate::ga::{bit_mask, BinaryGenotype, Chromosome, FitnessFunction, Phenotype};
use crate::range::Range;

/// Whether the optimized function should be maximized or minimized.
///
/// In minimization mode the fitness is `1 / f`, so `f` must be non-zero
/// and should be positive over the whole range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OptimizationMode {
    #[default]
    Maximization,
    Minimization,
}

impl OptimizationMode {
    /// Converts a function value into a fitness value.
    ///
    /// # Errors
    ///
    /// [`GeneticError::InvalidFitnessValue`] if `y` is NaN, or if `y == 0`
    /// in minimization mode. The error's `value` is the fitness the
    /// conversion would have produced (NaN, or `+∞` for a zero).
    pub fn fitness(
        self,
        y: f64,
        point: impl FnOnce() -> Phenotype,
    ) -> Result<f64, GeneticError> {
        if y.is_nan() {
            return Err(GeneticError::InvalidFitnessValue {
                point: point(),
                value: f64::NAN,
            });
        }
        match self {
            OptimizationMode::Maximization => Ok(y),
            OptimizationMode::Minimization if y == 0.0 => Err(GeneticError::InvalidFitnessValue {
                point: point(),
                value: f64::INFINITY,
            }),
            OptimizationMode::Minimization => Ok(1.0 / y),
        }
    }
}

/// Maps `value ∈ [0, max_value]` linearly onto `range`.
///
/// A zero-width genotype (`max_value == 0`) decodes to `range.min`.
pub fn decode(value: u64, max_value: u64, range: &Range) -> f64 {
    if max_value == 0 {
        return range.min;
    }
    value as f64 * range.length() / max_value as f64 + range.min
}

/// Splits a `length`-bit genotype into its x (low) and y (high) halves.
///
/// The x half takes `length / 2` bits, the y half the remaining
/// `length - length / 2`. Returns `((x, x_max), (y, y_max))` where the
/// maxima are the all-ones masks of each half.
///
/// ```
/// use u_evolve::fitness::split_genotype;
///
/// // 8 bits: y = 1011, x = 0110
/// assert_eq!(split_genotype(0b1011_0110, 8), ((0b0110, 0xF), (0b1011, 0xF)));
/// ```
pub fn split_genotype(value: u64, length: u32) -> ((u64, u64), (u64, u64)) {
    let length = length.min(64);
    let x_length = length / 2;
    let y_length = length - x_length;

    let x_max = bit_mask(x_length);
    let y_max = bit_mask(y_length);

    let x = value & x_max;
    let y = value.checked_shr(x_length).unwrap_or(0);

    ((x, x_max), (y, y_max))
}

/// Maximizes or minimizes `f(x)` over a range.
///
/// The chromosome value `v` decodes to
/// `x = v * range.length() / max_value + range.min`.
///
/// # Examples
///
/// ```
/// use u_evolve::fitness::{OptimizationFunction1D, OptimizationMode};
/// use u_evolve::ga::{BinaryChromosome, FitnessFunction, Phenotype};
/// use u_evolve::Range;
///
/// let f = OptimizationFunction1D::new(Range::new(0.0, 255.0), |x: f64| x * x)
///     .with_mode(OptimizationMode::Minimization);
///
/// let c = BinaryChromosome::with_value(8, 2);
/// assert_eq!(f.translate(&c), Phenotype::Scalar(2.0));
/// assert_eq!(f.evaluate(&c), 0.25);
/// ```
#[derive(Debug, Clone)]
pub struct OptimizationFunction1D<F> {
    range: Range,
    mode: OptimizationMode,
    function: F,
}

impl<F: Fn(f64) -> f64> OptimizationFunction1D<F> {
    /// Creates a maximizing optimization function over `range`.
    pub fn new(range: Range, function: F) -> Self {
        Self {
            range,
            mode: OptimizationMode::Maximization,
            function,
        }
    }

    pub fn with_mode(mut self, mode: OptimizationMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn range(&self) -> Range {
        self.range
    }

    pub fn set_range(&mut self, range: Range) {
        self.range = range;
    }

    pub fn mode(&self) -> OptimizationMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: OptimizationMode) {
        self.mode = mode;
    }

    /// Value of the optimized function at `x`.
    pub fn function_value(&self, x: f64) -> f64 {
        (self.function)(x)
    }

    /// Decodes the genotype into `x`.
    pub fn decode<G: BinaryGenotype + ?Sized>(&self, genotype: &G) -> f64 {
        decode(genotype.value(), genotype.max_value(), &self.range)
    }

    /// Computes the fitness, reporting values that cannot be used.
    pub fn try_evaluate<G>(&self, genotype: &G) -> Result<f64, GeneticError>
    where
        G: BinaryGenotype + ?Sized,
    {
        let x = self.decode(genotype);
        let y = (self.function)(x);
        self.mode.fitness(y, || Phenotype::Scalar(x))
    }
}

impl<C, F> FitnessFunction<C> for OptimizationFunction1D<F>
where
    C: Chromosome + BinaryGenotype,
    F: Fn(f64) -> f64 + Send + Sync,
{
    /// Fitness of the decoded point.
    ///
    /// Minimization at a zero of the function yields `+∞`; a NaN function
    /// value yields `0.0`.
    fn evaluate(&self, chromosome: &C) -> f64 {
        self.try_evaluate(chromosome).unwrap_or_else(degrade)
    }

    fn translate(&self, chromosome: &C) -> Phenotype {
        Phenotype::Scalar(self.decode(chromosome))
    }
}

/// Maximizes or minimizes `f(x, y)` over two ranges.
///
/// The chromosome's bits are split by [`split_genotype`]: the low half
/// encodes `x`, the high half `y`, each decoded like the 1-D case.
#[derive(Debug, Clone)]
pub struct OptimizationFunction2D<F> {
    range_x: Range,
    range_y: Range,
    mode: OptimizationMode,
    function: F,
}

impl<F: Fn(f64, f64) -> f64> OptimizationFunction2D<F> {
    /// Creates a maximizing optimization function over `range_x × range_y`.
    pub fn new(range_x: Range, range_y: Range, function: F) -> Self {
        Self {
            range_x,
            range_y,
            mode: OptimizationMode::Maximization,
            function,
        }
    }

    pub fn with_mode(mut self, mode: OptimizationMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn range_x(&self) -> Range {
        self.range_x
    }

    pub fn set_range_x(&mut self, range: Range) {
        self.range_x = range;
    }

    pub fn range_y(&self) -> Range {
        self.range_y
    }

    pub fn set_range_y(&mut self, range: Range) {
        self.range_y = range;
    }

    pub fn mode(&self) -> OptimizationMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: OptimizationMode) {
        self.mode = mode;
    }

    pub fn function_value(&self, x: f64, y: f64) -> f64 {
        (self.function)(x, y)
    }

    /// Decodes the genotype into `(x, y)`.
    pub fn decode<G: BinaryGenotype + ?Sized>(&self, genotype: &G) -> (f64, f64) {
        let ((x, x_max), (y, y_max)) = split_genotype(genotype.value(), genotype.length());
        (
            decode(x, x_max, &self.range_x),
            decode(y, y_max, &self.range_y),
        )
    }

    /// Computes the fitness, reporting values that cannot be used.
    pub fn try_evaluate<G>(&self, genotype: &G) -> Result<f64, GeneticError>
    where
        G: BinaryGenotype + ?Sized,
    {
        let (x, y) = self.decode(genotype);
        let z = (self.function)(x, y);
        self.mode.fitness(z, || Phenotype::Point(x, y))
    }
}

impl<C, F> FitnessFunction<C> for OptimizationFunction2D<F>
where
    C: Chromosome + BinaryGenotype,
    F: Fn(f64, f64) -> f64 + Send + Sync,
{
    /// Same degradation rules as [`OptimizationFunction1D`].
    fn evaluate(&self, chromosome: &C) -> f64 {
        self.try_evaluate(chromosome).unwrap_or_else(degrade)
    }

    fn translate(&self, chromosome: &C) -> Phenotype {
        let (x, y) = self.decode(chromosome);
        Phenotype::Point(x, y)
    }
}

fn degrade(err: GeneticError) -> f64 {
    tracing::warn!(error = %err, "fitness value replaced");
    match err {
        GeneticError::InvalidFitnessValue { value, .. } if value.is_nan() => 0.0,
        GeneticError::InvalidFitnessValue { value, .. } => value,
        _ => 0.0,
    }
}
