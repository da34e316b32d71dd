//! Fitness functions over polish-notation expressions.
//!
//! The chromosome's `Display` output is read as a [`polish`](super::polish)
//! expression; [`GpTreeChromosome`](crate::ga::GpTreeChromosome) is the
//! bundled encoding that produces one. Fitness is `100 / (error + 1)` where
//! `error` is the summed absolute prediction error; an expression that
//! cannot be evaluated, or that predicts NaN, scores `0.0`.

use super::polish;
use crate::error::GeneticError;
use crate::ga::{Chromosome, FitnessFunction, Phenotype};

fn score(error: Result<f64, GeneticError>) -> f64 {
    match error {
        Ok(error) => 100.0 / (error + 1.0),
        Err(err) => {
            tracing::debug!(error = %err, "expression scored as zero");
            0.0
        }
    }
}

fn predict(expression: &str, variables: &[f64], sample: usize) -> Result<f64, GeneticError> {
    let y = polish::evaluate(expression, variables)?;
    if y.is_nan() {
        return Err(GeneticError::Expression(format!(
            "prediction for sample {sample} is NaN"
        )));
    }
    Ok(y)
}

/// Symbolic regression: find `y = f(x)` fitting sampled `(x, y)` pairs.
///
/// Variable `$0` is `x`; `$1`, `$2`, ... are the given constants.
///
/// # Examples
///
/// ```
/// use u_evolve::fitness::SymbolicRegressionFitness;
///
/// let fitness = SymbolicRegressionFitness::new(
///     vec![[0.0, 1.0], [1.0, 3.0], [2.0, 5.0]],
///     vec![2.0],
/// );
/// // y = 2x + 1
/// assert_eq!(fitness.total_error("$0 $1 * 1 +").unwrap(), 0.0);
/// ```
#[derive(Debug, Clone)]
pub struct SymbolicRegressionFitness {
    data: Vec<[f64; 2]>,
    constants: Vec<f64>,
}

impl SymbolicRegressionFitness {
    pub fn new(data: Vec<[f64; 2]>, constants: Vec<f64>) -> Self {
        Self { data, constants }
    }

    pub fn data(&self) -> &[[f64; 2]] {
        &self.data
    }

    pub fn constants(&self) -> &[f64] {
        &self.constants
    }

    /// Sum of `|f(x) - y|` over all samples.
    pub fn total_error(&self, expression: &str) -> Result<f64, GeneticError> {
        let mut variables = Vec::with_capacity(self.constants.len() + 1);
        variables.push(0.0);
        variables.extend_from_slice(&self.constants);

        let mut error = 0.0;
        for (i, &[x, y]) in self.data.iter().enumerate() {
            variables[0] = x;
            error += (predict(expression, &variables, i)? - y).abs();
        }
        Ok(error)
    }
}

impl<C: Chromosome> FitnessFunction<C> for SymbolicRegressionFitness {
    fn evaluate(&self, chromosome: &C) -> f64 {
        score(self.total_error(&chromosome.to_string()))
    }

    fn translate(&self, chromosome: &C) -> Phenotype {
        Phenotype::Expression(chromosome.to_string())
    }
}

/// Time-series prediction: find a function predicting the next value from
/// a sliding window of previous ones.
///
/// Variables `$0 .. $(window-1)` hold the window, most recent value first;
/// the constants follow. The last `prediction_size` values of the series
/// are held back and not used for scoring.
#[derive(Debug, Clone)]
pub struct TimeSeriesPredictionFitness {
    data: Vec<f64>,
    window_size: usize,
    prediction_size: usize,
    constants: Vec<f64>,
}

impl TimeSeriesPredictionFitness {
    /// # Errors
    ///
    /// [`GeneticError::InvalidArgument`] if the window is not smaller than
    /// the series, or if the series leaves no sample to score after the
    /// window and the prediction part.
    pub fn new(
        data: Vec<f64>,
        window_size: usize,
        prediction_size: usize,
        constants: Vec<f64>,
    ) -> Result<Self, GeneticError> {
        if window_size >= data.len() {
            return Err(GeneticError::InvalidArgument(
                "window size must be less than the data length".into(),
            ));
        }
        if data.len() < window_size + prediction_size + 1 {
            return Err(GeneticError::InvalidArgument(
                "data must be long enough for the window and the prediction".into(),
            ));
        }
        Ok(Self {
            data,
            window_size,
            prediction_size,
            constants,
        })
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    pub fn prediction_size(&self) -> usize {
        self.prediction_size
    }

    /// Sum of one-step prediction errors over the scored part of the series.
    pub fn total_error(&self, expression: &str) -> Result<f64, GeneticError> {
        let window = self.window_size;
        let mut variables = vec![0.0; window + self.constants.len()];
        variables[window..].copy_from_slice(&self.constants);

        let samples = self.data.len() - window - self.prediction_size;
        let mut error = 0.0;
        for i in 0..samples {
            for (j, slot) in variables[..window].iter_mut().enumerate() {
                *slot = self.data[i + window - 1 - j];
            }
            error += (predict(expression, &variables, i)? - self.data[i + window]).abs();
        }
        Ok(error)
    }
}

impl<C: Chromosome> FitnessFunction<C> for TimeSeriesPredictionFitness {
    fn evaluate(&self, chromosome: &C) -> f64 {
        score(self.total_error(&chromosome.to_string()))
    }

    fn translate(&self, chromosome: &C) -> Phenotype {
        Phenotype::Expression(chromosome.to_string())
    }
}
