//! Driver loop for a population.
//!
//! [`Population`] itself has no termination condition. [`EpochRunner`]
//! calls [`Population::run_epoch`] until one of the conditions in
//! [`RunConfig`] holds or an external cancellation flag is raised.

use super::population::Population;
use super::types::Chromosome;
use crate::error::GeneticError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Stop conditions for [`EpochRunner`].
///
/// ```
/// use u_evolve::ga::RunConfig;
///
/// let config = RunConfig::default()
///     .with_max_epochs(1000)
///     .with_fitness_threshold(99.5)
///     .with_stagnation_limit(0);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RunConfig {
    /// Maximum number of epochs (0 = unbounded).
    pub max_epochs: usize,

    /// Stop once `fitness_max` reaches this value.
    pub fitness_threshold: Option<f64>,

    /// Number of epochs without a new `fitness_max` before stopping.
    ///
    /// Set to 0 to disable stagnation-based termination.
    pub stagnation_limit: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            max_epochs: 500,
            fitness_threshold: None,
            stagnation_limit: 50,
        }
    }
}

impl RunConfig {
    pub fn with_max_epochs(mut self, n: usize) -> Self {
        self.max_epochs = n;
        self
    }

    pub fn with_fitness_threshold(mut self, threshold: f64) -> Self {
        self.fitness_threshold = Some(threshold);
        self
    }

    /// Sets the stagnation limit (0 to disable).
    pub fn with_stagnation_limit(mut self, limit: usize) -> Self {
        self.stagnation_limit = limit;
        self
    }

    /// Rejects configurations that could never stop on their own.
    pub fn validate(&self) -> Result<(), GeneticError> {
        if self.max_epochs == 0 && self.fitness_threshold.is_none() && self.stagnation_limit == 0 {
            return Err(GeneticError::InvalidConfig(
                "at least one of max_epochs, fitness_threshold or stagnation_limit must be set"
                    .into(),
            ));
        }
        if let Some(t) = self.fitness_threshold {
            if t.is_nan() {
                return Err(GeneticError::InvalidConfig(
                    "fitness_threshold must not be NaN".into(),
                ));
            }
        }
        Ok(())
    }
}

/// Why a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    MaxEpochs,
    ThresholdReached,
    Stagnation,
    Cancelled,
}

/// Outcome of an [`EpochRunner`] run.
#[derive(Debug, Clone)]
pub struct RunResult<C: Chromosome> {
    /// Number of epochs executed.
    pub epochs: usize,

    /// Snapshot of the best chromosome at the end of the run.
    pub best: Option<C>,

    /// `fitness_max` at the end of the run.
    pub best_fitness: f64,

    /// `fitness_max` before the first epoch and after each epoch.
    pub fitness_history: Vec<f64>,

    pub stop_reason: StopReason,
}

/// Runs epochs on a population until a stop condition holds.
///
/// # Usage
///
/// ```ignore
/// let mut population = Population::with_config(config, ancestor, &fitness, &selection)?;
/// let result = EpochRunner::run(&mut population, &RunConfig::default())?;
/// println!("best fitness: {}", result.best_fitness);
/// ```
pub struct EpochRunner;

impl EpochRunner {
    /// Runs until a [`RunConfig`] condition holds.
    pub fn run<C: Chromosome>(
        population: &mut Population<'_, C>,
        config: &RunConfig,
    ) -> Result<RunResult<C>, GeneticError> {
        Self::run_with_cancel(population, config, None)
    }

    /// Runs with an optional cancellation token.
    ///
    /// The flag is checked between epochs; an epoch in progress always
    /// completes, so the population is left at its stable size.
    pub fn run_with_cancel<C: Chromosome>(
        population: &mut Population<'_, C>,
        config: &RunConfig,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<RunResult<C>, GeneticError> {
        config.validate()?;

        let mut fitness_history = Vec::with_capacity(config.max_epochs.min(4096) + 1);
        fitness_history.push(population.fitness_max());

        let mut best_fitness = population.fitness_max();
        let mut stagnation_counter = 0usize;
        let mut epochs = 0usize;

        let stop_reason = loop {
            if let Some(ref flag) = cancel {
                if flag.load(Ordering::Relaxed) {
                    break StopReason::Cancelled;
                }
            }
            if config.max_epochs > 0 && epochs >= config.max_epochs {
                break StopReason::MaxEpochs;
            }

            population.run_epoch();
            epochs += 1;

            let fitness = population.fitness_max();
            fitness_history.push(fitness);

            if fitness > best_fitness {
                best_fitness = fitness;
                stagnation_counter = 0;
            } else {
                stagnation_counter += 1;
            }

            if let Some(threshold) = config.fitness_threshold {
                if fitness >= threshold {
                    break StopReason::ThresholdReached;
                }
            }
            if config.stagnation_limit > 0 && stagnation_counter >= config.stagnation_limit {
                break StopReason::Stagnation;
            }
        };

        tracing::info!(
            epochs,
            fitness_max = population.fitness_max(),
            reason = ?stop_reason,
            "run finished"
        );

        Ok(RunResult {
            epochs,
            best: population.best_chromosome().cloned(),
            best_fitness: population.fitness_max(),
            fitness_history,
            stop_reason,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
