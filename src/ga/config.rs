//! Population configuration.
//!
//! [`PopulationConfig`] holds the parameters that control one population's
//! epoch loop.

use crate::error::GeneticError;

/// Valid interval for [`PopulationConfig::crossover_rate`].
pub const CROSSOVER_RATE_RANGE: (f64, f64) = (0.1, 1.0);
/// Valid interval for [`PopulationConfig::mutation_rate`].
pub const MUTATION_RATE_RANGE: (f64, f64) = (0.1, 1.0);
/// Valid interval for [`PopulationConfig::random_selection_portion`].
pub const RANDOM_SELECTION_PORTION_RANGE: (f64, f64) = (0.0, 0.9);

/// Configuration for a [`Population`](super::Population).
///
/// Rates are clamped into their valid interval when set through the
/// builder methods; `size` cannot be clamped and is checked by
/// [`validate`](PopulationConfig::validate).
///
/// # Defaults
///
/// ```
/// use u_evolve::ga::PopulationConfig;
///
/// let config = PopulationConfig::default();
/// assert_eq!(config.size, 100);
/// assert_eq!(config.crossover_rate, 0.75);
/// assert_eq!(config.mutation_rate, 0.1);
/// assert_eq!(config.random_selection_portion, 0.0);
/// ```
///
/// # Builder Pattern
///
/// ```
/// use u_evolve::ga::PopulationConfig;
///
/// let config = PopulationConfig::new(40)
///     .with_crossover_rate(0.9)
///     .with_mutation_rate(0.2)
///     .with_random_selection_portion(0.1)
///     .with_seed(42);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PopulationConfig {
    /// Stable number of chromosomes, restored by every selection.
    pub size: usize,

    /// Probability of recombining a neighboring pair (0.1–1.0).
    pub crossover_rate: f64,

    /// Probability of adding a mutated copy of a member (0.1–1.0).
    pub mutation_rate: f64,

    /// Fraction of each new generation filled with fresh random
    /// chromosomes instead of selected ones (0.0–0.9).
    pub random_selection_portion: f64,

    /// Whether to shuffle the members after every epoch.
    ///
    /// Crossover pairs neighbors, so shuffling changes which members meet.
    pub auto_shuffling: bool,

    /// Random seed for reproducibility.
    ///
    /// `None` uses a random seed.
    pub seed: Option<u64>,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            size: 100,
            crossover_rate: 0.75,
            mutation_rate: 0.1,
            random_selection_portion: 0.0,
            auto_shuffling: false,
            seed: None,
        }
    }
}

impl PopulationConfig {
    /// Default configuration with the given population size.
    pub fn new(size: usize) -> Self {
        Self {
            size,
            ..Self::default()
        }
    }

    /// Sets the population size.
    pub fn with_size(mut self, size: usize) -> Self {
        self.size = size;
        self
    }

    /// Sets the crossover rate, clamped to `[0.1, 1.0]`.
    pub fn with_crossover_rate(mut self, rate: f64) -> Self {
        self.crossover_rate = clamp_crossover_rate(rate);
        self
    }

    /// Sets the mutation rate, clamped to `[0.1, 1.0]`.
    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = clamp_mutation_rate(rate);
        self
    }

    /// Sets the random selection portion, clamped to `[0.0, 0.9]`.
    pub fn with_random_selection_portion(mut self, portion: f64) -> Self {
        self.random_selection_portion = clamp_random_selection_portion(portion);
        self
    }

    /// Enables or disables shuffling after each epoch.
    pub fn with_auto_shuffling(mut self, enabled: bool) -> Self {
        self.auto_shuffling = enabled;
        self
    }

    /// Sets the random seed for reproducibility.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Number of members replaced by fresh random chromosomes on each
    /// selection: `floor(random_selection_portion * size)`.
    pub fn random_amount(&self) -> usize {
        random_amount(self.random_selection_portion, self.size)
    }

    /// Validates the configuration.
    ///
    /// Fields assigned directly (bypassing the clamping builders) are
    /// checked against their intervals as well.
    pub fn validate(&self) -> Result<(), GeneticError> {
        if self.size < 1 {
            return Err(GeneticError::InvalidConfig(
                "population size must be at least 1".into(),
            ));
        }
        check_interval("crossover_rate", self.crossover_rate, CROSSOVER_RATE_RANGE)?;
        check_interval("mutation_rate", self.mutation_rate, MUTATION_RATE_RANGE)?;
        check_interval(
            "random_selection_portion",
            self.random_selection_portion,
            RANDOM_SELECTION_PORTION_RANGE,
        )?;
        Ok(())
    }
}

fn check_interval(name: &str, value: f64, (lo, hi): (f64, f64)) -> Result<(), GeneticError> {
    if value >= lo && value <= hi {
        Ok(())
    } else {
        Err(GeneticError::InvalidConfig(format!(
            "{name} must lie in [{lo}, {hi}], got {value}"
        )))
    }
}

fn clamp_into(value: f64, (lo, hi): (f64, f64)) -> f64 {
    // NaN falls back to the lower bound
    if value.is_nan() {
        lo
    } else {
        value.clamp(lo, hi)
    }
}

pub(crate) fn random_amount(portion: f64, size: usize) -> usize {
    (portion * size as f64) as usize
}

pub(crate) fn clamp_crossover_rate(rate: f64) -> f64 {
    clamp_into(rate, CROSSOVER_RATE_RANGE)
}

pub(crate) fn clamp_mutation_rate(rate: f64) -> f64 {
    clamp_into(rate, MUTATION_RATE_RANGE)
}

pub(crate) fn clamp_random_selection_portion(portion: f64) -> f64 {
    clamp_into(portion, RANDOM_SELECTION_PORTION_RANGE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PopulationConfig::default();
        assert_eq!(config.size, 100);
        assert!((config.crossover_rate - 0.75).abs() < 1e-10);
        assert!((config.mutation_rate - 0.1).abs() < 1e-10);
        assert!((config.random_selection_portion - 0.0).abs() < 1e-15);
        assert!(!config.auto_shuffling);
        assert!(config.seed.is_none());
    }

    #[test]
    fn test_builder_pattern() {
        let config = PopulationConfig::new(30)
            .with_crossover_rate(0.8)
            .with_mutation_rate(0.3)
            .with_random_selection_portion(0.2)
            .with_auto_shuffling(true)
            .with_seed(7);

        assert_eq!(config.size, 30);
        assert!((config.crossover_rate - 0.8).abs() < 1e-10);
        assert!((config.mutation_rate - 0.3).abs() < 1e-10);
        assert!((config.random_selection_portion - 0.2).abs() < 1e-10);
        assert!(config.auto_shuffling);
        assert_eq!(config.seed, Some(7));
    }

    #[test]
    fn test_clamp_rates() {
        let config = PopulationConfig::default()
            .with_crossover_rate(0.0)
            .with_mutation_rate(5.0)
            .with_random_selection_portion(1.0);

        assert!((config.crossover_rate - 0.1).abs() < 1e-10);
        assert!((config.mutation_rate - 1.0).abs() < 1e-10);
        assert!((config.random_selection_portion - 0.9).abs() < 1e-10);

        let config = PopulationConfig::default()
            .with_crossover_rate(5.0)
            .with_mutation_rate(-1.0)
            .with_random_selection_portion(-0.5);

        assert!((config.crossover_rate - 1.0).abs() < 1e-10);
        assert!((config.mutation_rate - 0.1).abs() < 1e-10);
        assert!((config.random_selection_portion - 0.0).abs() < 1e-15);
    }

    #[test]
    fn test_clamp_nan_to_lower_bound() {
        let config = PopulationConfig::default().with_mutation_rate(f64::NAN);
        assert!((config.mutation_rate - 0.1).abs() < 1e-10);
    }

    #[test]
    fn test_validate_ok() {
        assert!(PopulationConfig::default().validate().is_ok());
        assert!(PopulationConfig::new(1).validate().is_ok());
    }

    #[test]
    fn test_validate_zero_size() {
        let err = PopulationConfig::new(0).validate().unwrap_err();
        assert!(matches!(err, GeneticError::InvalidConfig(_)));
    }

    #[test]
    fn test_validate_rejects_unclamped_fields() {
        let config = PopulationConfig {
            crossover_rate: 0.05,
            ..PopulationConfig::default()
        };
        assert!(config.validate().is_err());

        let config = PopulationConfig {
            random_selection_portion: 0.95,
            ..PopulationConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_random_amount_floors() {
        let config = PopulationConfig::new(10).with_random_selection_portion(0.5);
        assert_eq!(config.random_amount(), 5);

        let config = PopulationConfig::new(7).with_random_selection_portion(0.3);
        assert_eq!(config.random_amount(), 2);

        let config = PopulationConfig::new(1).with_random_selection_portion(0.9);
        assert_eq!(config.random_amount(), 0);
    }
}
