//! Population life-cycle.
//!
//! [`Population`] owns the chromosomes of one search and advances them one
//! epoch at a time: crossover → mutation → selection → statistics.

use super::config::{
    clamp_crossover_rate, clamp_mutation_rate, clamp_random_selection_portion, random_amount,
    PopulationConfig,
};
use super::selection::sort_by_fitness_desc;
use super::types::{Chromosome, FitnessFunction, SelectionMethod};
use crate::error::GeneticError;
use crate::random::rng_from_seed;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;
use std::ops::Index;

/// A population of chromosomes evolving under one fitness function and one
/// selection method.
///
/// The population holds exactly [`size`](Population::size) members after
/// construction and after every [`selection`](Population::selection),
/// [`run_epoch`](Population::run_epoch), [`regenerate`](Population::regenerate)
/// and [`migrate`](Population::migrate). [`crossover`](Population::crossover)
/// and [`mutate`](Population::mutate) only append offspring, so between them
/// and the next selection the population may be larger.
///
/// The fitness function and selection method are borrowed for the
/// population's lifetime and may be shared between populations. Randomness
/// comes from a generator owned by the population.
///
/// # Usage
///
/// ```
/// use u_evolve::fitness::OptimizationFunction1D;
/// use u_evolve::ga::{BinaryChromosome, EliteSelection, Population, PopulationConfig};
/// use u_evolve::random::create_rng;
/// use u_evolve::Range;
///
/// let fitness = OptimizationFunction1D::new(Range::new(0.0, 255.0), |x: f64| {
///     (x / 23.0).cos() * (x / 50.0).sin() + 2.0
/// });
/// let selection = EliteSelection::default();
/// let ancestor = BinaryChromosome::new(32, &mut create_rng(1));
///
/// let config = PopulationConfig::new(40).with_seed(42);
/// let mut population =
///     Population::with_config(config, ancestor, &fitness, &selection).unwrap();
///
/// for _ in 0..50 {
///     population.run_epoch();
/// }
/// assert_eq!(population.len(), 40);
/// assert!(population.fitness_max() > 2.0);
/// ```
pub struct Population<'a, C: Chromosome> {
    members: Vec<C>,
    size: usize,

    crossover_rate: f64,
    mutation_rate: f64,
    random_selection_portion: f64,
    auto_shuffling: bool,

    fitness_function: &'a dyn FitnessFunction<C>,
    selection_method: &'a dyn SelectionMethod<C>,
    rng: StdRng,

    fitness_max: f64,
    fitness_sum: f64,
    fitness_avg: f64,
    best: Option<C>,
}

impl<'a, C: Chromosome> Population<'a, C> {
    /// Creates a population of `size` chromosomes with default rates.
    ///
    /// See [`with_config`](Population::with_config).
    pub fn new(
        size: usize,
        ancestor: C,
        fitness_function: &'a dyn FitnessFunction<C>,
        selection_method: &'a dyn SelectionMethod<C>,
    ) -> Result<Self, GeneticError> {
        Self::with_config(
            PopulationConfig::new(size),
            ancestor,
            fitness_function,
            selection_method,
        )
    }

    /// Creates a population from a configuration.
    ///
    /// `ancestor` is evaluated and becomes member 0; the remaining
    /// `size - 1` members are its evaluated offspring.
    ///
    /// # Errors
    ///
    /// [`GeneticError::InvalidConfig`] if `config.size < 1` or a rate lies
    /// outside its interval.
    pub fn with_config(
        config: PopulationConfig,
        mut ancestor: C,
        fitness_function: &'a dyn FitnessFunction<C>,
        selection_method: &'a dyn SelectionMethod<C>,
    ) -> Result<Self, GeneticError> {
        config.validate()?;

        let mut rng = rng_from_seed(config.seed);

        ancestor.evaluate(fitness_function);
        let mut members = Vec::with_capacity(config.size);
        members.push(ancestor);
        let offspring = offspring_of(&members[0], config.size - 1, fitness_function, &mut rng);
        members.extend(offspring);

        let mut population = Self {
            members,
            size: config.size,
            crossover_rate: config.crossover_rate,
            mutation_rate: config.mutation_rate,
            random_selection_portion: config.random_selection_portion,
            auto_shuffling: config.auto_shuffling,
            fitness_function,
            selection_method,
            rng,
            fitness_max: 0.0,
            fitness_sum: 0.0,
            fitness_avg: 0.0,
            best: None,
        };
        population.refresh_statistics();

        tracing::debug!(size = population.size, "population created");
        Ok(population)
    }

    /// Discards every member and refills the population with fresh
    /// offspring of the current member 0.
    pub fn regenerate(&mut self) {
        let ancestor = self.members[0].clone();
        self.members.clear();
        let fresh = offspring_of(&ancestor, self.size, self.fitness_function, &mut self.rng);
        self.members.extend(fresh);
        self.refresh_statistics();
    }

    /// Recombines neighboring pairs `(i - 1, i)` for odd `i < size`.
    ///
    /// Each pair is recombined with probability `crossover_rate`; both
    /// offspring are evaluated and appended.
    pub fn crossover(&mut self) {
        for i in (1..self.size).step_by(2) {
            if self.rng.random::<f64>() <= self.crossover_rate {
                let mut c1 = self.members[i - 1].clone();
                let mut c2 = self.members[i].clone();

                c1.crossover(&mut c2, &mut self.rng);
                c1.evaluate(self.fitness_function);
                c2.evaluate(self.fitness_function);

                self.members.push(c1);
                self.members.push(c2);
            }
        }
    }

    /// Appends an evaluated mutant of each of the first `size` members with
    /// probability `mutation_rate`.
    pub fn mutate(&mut self) {
        for i in 0..self.size {
            if self.rng.random::<f64>() <= self.mutation_rate {
                let mut mutant = self.members[i].clone();
                mutant.mutate(&mut self.rng);
                mutant.evaluate(self.fitness_function);
                self.members.push(mutant);
            }
        }
    }

    /// Restores the population to `size` members and refreshes statistics.
    ///
    /// The selection method keeps `size - floor(random_selection_portion * size)`
    /// members; the rest are fresh offspring of the new member 0.
    ///
    /// # Panics
    ///
    /// Panics if the selection method leaves a different number of members
    /// than requested.
    pub fn selection(&mut self) {
        let injected = random_amount(self.random_selection_portion, self.size);
        let target = self.size - injected;

        self.selection_method
            .apply_selection(&mut self.members, target, &mut self.rng);
        assert_eq!(
            self.members.len(),
            target,
            "selection method must leave exactly {target} members"
        );

        if injected > 0 {
            let fresh = offspring_of(
                &self.members[0],
                injected,
                self.fitness_function,
                &mut self.rng,
            );
            self.members.extend(fresh);
        }

        self.refresh_statistics();
    }

    /// Advances the population by one generation.
    pub fn run_epoch(&mut self) {
        self.crossover();
        self.mutate();
        self.selection();

        if self.auto_shuffling {
            self.shuffle();
        }

        tracing::debug!(
            fitness_max = self.fitness_max,
            fitness_avg = self.fitness_avg,
            "epoch complete"
        );
    }

    /// Randomly reorders the members.
    pub fn shuffle(&mut self) {
        self.members.shuffle(&mut self.rng);
    }

    /// Exchanges `count` members with `other`.
    ///
    /// `selector` picks `count` migrants from a copy of each population.
    /// Each population then drops its `count` worst members and takes in
    /// the other side's migrants, so both sizes are preserved.
    ///
    /// # Errors
    ///
    /// [`GeneticError::InvalidConfig`] if `count` exceeds either size.
    pub fn migrate(
        &mut self,
        other: &mut Population<'_, C>,
        count: usize,
        selector: &dyn SelectionMethod<C>,
    ) -> Result<(), GeneticError> {
        if count > self.size || count > other.size {
            return Err(GeneticError::InvalidConfig(format!(
                "cannot migrate {count} members between populations of size {} and {}",
                self.size, other.size
            )));
        }

        let mut outgoing = self.members[..self.size].to_vec();
        let mut incoming = other.members[..other.size].to_vec();
        selector.apply_selection(&mut outgoing, count, &mut self.rng);
        selector.apply_selection(&mut incoming, count, &mut other.rng);
        assert_eq!(
            outgoing.len(),
            count,
            "selection method must leave exactly {count} migrants"
        );
        assert_eq!(
            incoming.len(),
            count,
            "selection method must leave exactly {count} migrants"
        );

        sort_by_fitness_desc(&mut self.members);
        self.members.truncate(self.size - count);
        self.members.extend(incoming);

        sort_by_fitness_desc(&mut other.members);
        other.members.truncate(other.size - count);
        other.members.extend(outgoing);

        self.refresh_statistics();
        other.refresh_statistics();

        tracing::debug!(count, "migration complete");
        Ok(())
    }

    /// Logs the statistics at `debug` level and every member (genotype,
    /// phenotype, fitness) at `trace` level.
    pub fn trace(&self) {
        tracing::debug!(
            fitness_max = self.fitness_max,
            fitness_sum = self.fitness_sum,
            fitness_avg = self.fitness_avg,
            members = self.members.len(),
            "population statistics"
        );
        for member in &self.members {
            tracing::trace!(
                genotype = %member,
                phenotype = %self.fitness_function.translate(member),
                fitness = member.fitness(),
                "member"
            );
        }
    }

    // Max tracking is seeded with 0 and uses strict `>`: a population whose
    // fitness values are all <= 0 leaves `best` unchanged.
    fn refresh_statistics(&mut self) {
        self.fitness_max = 0.0;
        self.fitness_sum = 0.0;

        let mut best_index = None;
        for (i, member) in self.members.iter().enumerate() {
            let fitness = member.fitness();
            self.fitness_sum += fitness;
            if fitness > self.fitness_max {
                self.fitness_max = fitness;
                best_index = Some(i);
            }
        }
        if let Some(i) = best_index {
            self.best = Some(self.members[i].clone());
        }
        self.fitness_avg = self.fitness_sum / self.size as f64;
    }

    // ---- Accessors ----

    /// Stable population size.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Current number of members.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Always `false` for a constructed population.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&C> {
        self.members.get(index)
    }

    pub fn members(&self) -> &[C] {
        &self.members
    }

    /// Highest fitness found by the last statistics refresh (0 if none is
    /// positive).
    pub fn fitness_max(&self) -> f64 {
        self.fitness_max
    }

    pub fn fitness_sum(&self) -> f64 {
        self.fitness_sum
    }

    /// `fitness_sum / size`.
    pub fn fitness_avg(&self) -> f64 {
        self.fitness_avg
    }

    /// Snapshot of the member that set [`fitness_max`](Population::fitness_max).
    ///
    /// Survives later epochs even if that member is selected out; it is
    /// only replaced when a later refresh finds a positive maximum.
    pub fn best_chromosome(&self) -> Option<&C> {
        self.best.as_ref()
    }

    pub fn crossover_rate(&self) -> f64 {
        self.crossover_rate
    }

    /// Sets the crossover rate, clamped to `[0.1, 1.0]`.
    pub fn set_crossover_rate(&mut self, rate: f64) {
        self.crossover_rate = clamp_crossover_rate(rate);
    }

    pub fn mutation_rate(&self) -> f64 {
        self.mutation_rate
    }

    /// Sets the mutation rate, clamped to `[0.1, 1.0]`.
    pub fn set_mutation_rate(&mut self, rate: f64) {
        self.mutation_rate = clamp_mutation_rate(rate);
    }

    pub fn random_selection_portion(&self) -> f64 {
        self.random_selection_portion
    }

    /// Sets the random selection portion, clamped to `[0.0, 0.9]`.
    pub fn set_random_selection_portion(&mut self, portion: f64) {
        self.random_selection_portion = clamp_random_selection_portion(portion);
    }

    pub fn auto_shuffling(&self) -> bool {
        self.auto_shuffling
    }

    pub fn set_auto_shuffling(&mut self, enabled: bool) {
        self.auto_shuffling = enabled;
    }
}

impl<C: Chromosome> Index<usize> for Population<'_, C> {
    type Output = C;

    fn index(&self, index: usize) -> &C {
        &self.members[index]
    }
}

/// Creates `count` evaluated offspring of `ancestor`.
fn offspring_of<C: Chromosome>(
    ancestor: &C,
    count: usize,
    fitness_function: &dyn FitnessFunction<C>,
    rng: &mut StdRng,
) -> Vec<C> {
    (0..count)
        .map(|_| {
            let mut child = ancestor.create_offspring(rng);
            child.evaluate(fitness_function);
            child
        })
        .collect()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fitness::{OptimizationFunction1D, OptimizationMode};
    use crate::ga::{BinaryChromosome, EliteSelection, Phenotype, RouletteWheelSelection};
    use crate::ga::BinaryGenotype;
    use crate::Range;
    use rand::RngCore;
    use std::fmt;
    use std::sync::Mutex;

    // ---- Scalar gene: fitness is the gene value itself ----

    #[derive(Clone, Debug)]
    struct Gene {
        value: f64,
        fitness: f64,
        // offspring copy the parent value instead of drawing a new one
        identical_offspring: bool,
    }

    impl Gene {
        /// Ancestor at 5.0 whose offspring draw values from the population RNG.
        fn seeded() -> Self {
            Gene {
                value: 5.0,
                fitness: 0.0,
                identical_offspring: false,
            }
        }

        fn fixed(value: f64) -> Self {
            Gene {
                value,
                fitness: 0.0,
                identical_offspring: true,
            }
        }
    }

    impl fmt::Display for Gene {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{}", self.value)
        }
    }

    impl Chromosome for Gene {
        fn fitness(&self) -> f64 {
            self.fitness
        }
        fn set_fitness(&mut self, fitness: f64) {
            self.fitness = fitness;
        }
        fn create_offspring<R: Rng + ?Sized>(&self, rng: &mut R) -> Self {
            let value = if self.identical_offspring {
                self.value
            } else {
                rng.random_range(0.0..10.0)
            };
            Gene {
                value,
                fitness: 0.0,
                identical_offspring: self.identical_offspring,
            }
        }
        fn crossover<R: Rng + ?Sized>(&mut self, pair: &mut Self, _rng: &mut R) {
            let mean = (self.value + pair.value) / 2.0;
            self.value = mean;
            pair.value = mean;
        }
        fn mutate<R: Rng + ?Sized>(&mut self, _rng: &mut R) {
            self.value += 1.0;
        }
    }

    struct Identity;

    impl FitnessFunction<Gene> for Identity {
        fn evaluate(&self, chromosome: &Gene) -> f64 {
            chromosome.value
        }
        fn translate(&self, chromosome: &Gene) -> Phenotype {
            Phenotype::Scalar(chromosome.value)
        }
    }

    /// Keeps the first `size` members and records the requested size.
    #[derive(Default)]
    struct RecordingSelection {
        last_size: Mutex<Option<usize>>,
    }

    impl RecordingSelection {
        fn last_size(&self) -> Option<usize> {
            *self.last_size.lock().unwrap()
        }
    }

    impl SelectionMethod<Gene> for RecordingSelection {
        fn apply_selection(
            &self,
            population: &mut Vec<Gene>,
            size: usize,
            _rng: &mut dyn RngCore,
        ) {
            *self.last_size.lock().unwrap() = Some(size);
            population.truncate(size);
        }
    }

    /// Violates the contract by never removing anything.
    struct KeepAll;

    impl SelectionMethod<Gene> for KeepAll {
        fn apply_selection(
            &self,
            _population: &mut Vec<Gene>,
            _size: usize,
            _rng: &mut dyn RngCore,
        ) {
        }
    }

    fn seeded(size: usize, seed: u64) -> PopulationConfig {
        PopulationConfig::new(size).with_seed(seed)
    }

    fn population<'a>(
        config: PopulationConfig,
        ancestor: Gene,
        selection: &'a dyn SelectionMethod<Gene>,
    ) -> Population<'a, Gene> {
        Population::with_config(config, ancestor, &Identity, selection).unwrap()
    }

    // ---- Construction ----

    #[test]
    fn test_construction_fills_to_size() {
        let elite = EliteSelection::default();
        for size in [1, 2, 7, 50] {
            let ancestor = Gene::seeded();
            let expected = Identity.evaluate(&ancestor);
            let pop = population(seeded(size, 1), ancestor, &elite);
            assert_eq!(pop.len(), size);
            assert_eq!(pop.size(), size);
            assert_eq!(pop[0].fitness(), expected);
        }
    }

    #[test]
    fn test_construction_evaluates_every_member() {
        let elite = EliteSelection::default();
        let pop = population(seeded(20, 5), Gene::seeded(), &elite);
        for member in pop.members() {
            assert_eq!(member.fitness(), member.value);
        }
    }

    #[test]
    fn test_zero_size_rejected() {
        let elite = EliteSelection::default();
        let result = Population::new(0, Gene::seeded(), &Identity, &elite);
        assert!(matches!(result, Err(GeneticError::InvalidConfig(_))));
    }

    // ---- Threading ----

    #[test]
    fn test_population_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<Population<'static, Gene>>();
        assert_send::<Population<'static, BinaryChromosome>>();
    }

    #[test]
    fn test_population_runs_on_worker_thread() {
        let elite = EliteSelection::default();
        let mut pop = population(seeded(10, 3), Gene::seeded(), &elite);

        let len = std::thread::scope(|s| {
            s.spawn(move || {
                for _ in 0..5 {
                    pop.run_epoch();
                }
                pop.len()
            })
            .join()
            .unwrap()
        });
        assert_eq!(len, 10);
    }

    // ---- Operators ----

    #[test]
    fn test_crossover_appends_pairs() {
        let elite = EliteSelection::default();
        let config = seeded(7, 3).with_crossover_rate(1.0);
        let mut pop = population(config, Gene::seeded(), &elite);
        pop.crossover();
        // pairs (0,1), (2,3), (4,5)
        assert_eq!(pop.len(), 7 + 6);
        for child in &pop.members()[7..] {
            assert_eq!(child.fitness(), child.value);
        }
    }

    #[test]
    fn test_crossover_rate_gates_pairs() {
        let elite = EliteSelection::default();
        let config = seeded(40, 17).with_crossover_rate(0.1);
        let mut pop = population(config, Gene::seeded(), &elite);
        pop.crossover();

        // 20 pairs at 10% each; all 20 firing has probability 1e-20
        let growth = pop.len() - 40;
        assert!(growth < 40, "every pair was recombined: {growth}");
        assert_eq!(growth % 2, 0);
    }

    #[test]
    fn test_mutate_appends_one_per_member() {
        let elite = EliteSelection::default();
        let config = seeded(6, 3).with_mutation_rate(1.0);
        let mut pop = population(config, Gene::fixed(2.0), &elite);
        pop.mutate();
        assert_eq!(pop.len(), 12);
        for mutant in &pop.members()[6..] {
            assert_eq!(mutant.value, 3.0);
            assert_eq!(mutant.fitness(), 3.0);
        }
    }

    #[test]
    fn test_mutation_rate_gates_members() {
        let elite = EliteSelection::default();
        let config = seeded(40, 17).with_mutation_rate(0.1);
        let mut pop = population(config, Gene::fixed(2.0), &elite);
        pop.mutate();

        let growth = pop.len() - 40;
        assert!(growth < 40, "every member was mutated: {growth}");
        for mutant in &pop.members()[40..] {
            assert_eq!(mutant.fitness(), 3.0);
        }
    }

    #[test]
    fn test_single_member_population_has_no_pairs() {
        let elite = EliteSelection::default();
        let config = seeded(1, 3).with_crossover_rate(1.0);
        let mut pop = population(config, Gene::seeded(), &elite);
        pop.crossover();
        assert_eq!(pop.len(), 1);
        pop.run_epoch();
        assert_eq!(pop.len(), 1);
    }

    // ---- Selection ----

    #[test]
    fn test_random_selection_portion_target() {
        let recorder = RecordingSelection::default();
        let config = seeded(10, 11).with_random_selection_portion(0.5);
        let mut pop = population(config, Gene::seeded(), &recorder);

        pop.selection();

        assert_eq!(recorder.last_size(), Some(5));
        assert_eq!(pop.len(), 10);
    }

    #[test]
    fn test_random_portion_members_are_evaluated_offspring() {
        let recorder = RecordingSelection::default();
        let config = seeded(10, 11)
            .with_random_selection_portion(0.5)
            .with_mutation_rate(1.0);
        let mut pop = population(config, Gene::fixed(4.0), &recorder);

        // mutants (5.0) sit behind the originals and are cut by truncation
        pop.mutate();
        pop.selection();

        assert_eq!(pop.len(), 10);
        for member in &pop.members()[5..] {
            assert_eq!(member.value, 4.0);
            assert_eq!(member.fitness(), 4.0);
        }
    }

    #[test]
    fn test_selection_without_random_portion_targets_size() {
        let recorder = RecordingSelection::default();
        let mut pop = population(seeded(8, 2), Gene::seeded(), &recorder);
        pop.mutate();
        pop.selection();
        assert_eq!(recorder.last_size(), Some(8));
        assert_eq!(pop.len(), 8);
    }

    #[test]
    #[should_panic(expected = "selection method must leave exactly")]
    fn test_selection_contract_violation_panics() {
        let keep_all = KeepAll;
        let config = seeded(4, 2).with_mutation_rate(1.0);
        let mut pop = population(config, Gene::seeded(), &keep_all);
        pop.mutate();
        pop.selection();
    }

    #[test]
    fn test_statistics_after_selection() {
        let elite = EliteSelection::new(false);
        let config = seeded(12, 21).with_mutation_rate(0.5);
        let mut pop = population(config, Gene::seeded(), &elite);

        for _ in 0..5 {
            pop.run_epoch();
            let sum: f64 = pop.members().iter().map(|c| c.fitness()).sum();
            let max = pop
                .members()
                .iter()
                .map(|c| c.fitness())
                .fold(f64::NEG_INFINITY, f64::max);

            assert!((pop.fitness_sum() - sum).abs() < 1e-9);
            assert_eq!(pop.fitness_avg(), pop.fitness_sum() / 12.0);
            assert_eq!(pop.fitness_max(), max);
            assert_eq!(pop.best_chromosome().map(|c| c.fitness()), Some(max));
        }
    }

    #[test]
    fn test_regenerate_with_identical_offspring() {
        let elite = EliteSelection::default();
        let mut pop = population(seeded(4, 8), Gene::fixed(3.0), &elite);

        pop.regenerate();

        assert_eq!(pop.len(), 4);
        for member in pop.members() {
            assert_eq!(member.fitness(), 3.0);
        }
        assert_eq!(pop.fitness_max(), pop.fitness_avg());
        assert_eq!(pop.fitness_max(), 3.0);
    }

    #[test]
    fn test_regenerate_discards_evolved_members() {
        let elite = EliteSelection::default();
        let config = seeded(4, 8).with_mutation_rate(1.0);
        let mut pop = population(config, Gene::fixed(1.0), &elite);
        for _ in 0..3 {
            pop.run_epoch();
        }
        assert!(pop.fitness_max() > 1.0);

        pop.regenerate();
        // offspring of the best member copy its value
        let template = pop[0].value;
        assert!(pop.members().iter().all(|c| c.value == template));
    }

    // ---- Known sharp edge: max tracking starts at zero ----

    #[test]
    fn test_zero_fitness_leaves_best_unset() {
        let elite = EliteSelection::default();
        let mut pop = population(seeded(5, 1), Gene::fixed(0.0), &elite);
        pop.selection();
        assert_eq!(pop.fitness_max(), 0.0);
        assert!(pop.best_chromosome().is_none());
    }

    #[test]
    fn test_negative_fitness_is_not_tracked_as_max() {
        let elite = EliteSelection::default();
        let mut pop = population(seeded(5, 1), Gene::fixed(-2.0), &elite);
        pop.selection();
        // the true maximum is -2, but tracking is seeded with 0
        assert_eq!(pop.fitness_max(), 0.0);
        assert!(pop.best_chromosome().is_none());
        assert_eq!(pop.fitness_sum(), -10.0);
        assert_eq!(pop.fitness_avg(), -2.0);
    }

    // ---- Epochs ----

    #[test]
    fn test_run_epoch_preserves_size() {
        let elite = EliteSelection::default();
        let config = seeded(15, 4)
            .with_crossover_rate(1.0)
            .with_mutation_rate(1.0)
            .with_random_selection_portion(0.2);
        let mut pop = population(config, Gene::seeded(), &elite);
        for _ in 0..30 {
            pop.run_epoch();
            assert_eq!(pop.len(), 15);
        }
    }

    #[test]
    fn test_elite_epochs_never_lose_best() {
        let elite = EliteSelection::default();
        let mut pop = population(seeded(10, 4), Gene::seeded(), &elite);
        let mut previous = pop.fitness_max();
        for _ in 0..20 {
            pop.run_epoch();
            assert!(pop.fitness_max() >= previous);
            previous = pop.fitness_max();
        }
    }

    #[test]
    fn test_roulette_keeps_exact_minimum() {
        // f(x) = x on [0, 3]: genotype 0 decodes to the zero, fitness +inf
        let fitness = OptimizationFunction1D::new(Range::new(0.0, 3.0), |x: f64| x)
            .with_mode(OptimizationMode::Minimization);
        let roulette = RouletteWheelSelection;
        let ancestor = BinaryChromosome::with_value(2, 0);
        let mut pop = Population::with_config(seeded(4, 1), ancestor, &fitness, &roulette).unwrap();
        assert_eq!(pop.fitness_max(), f64::INFINITY);

        for _ in 0..5 {
            pop.run_epoch();
            assert_eq!(pop.fitness_max(), f64::INFINITY);
        }
        assert_eq!(pop.best_chromosome().map(|c| c.value()), Some(0));
    }

    #[test]
    fn test_auto_shuffling_preserves_members() {
        let elite = EliteSelection::new(false);
        let config = seeded(10, 6).with_auto_shuffling(true);
        let mut pop = population(config, Gene::seeded(), &elite);
        assert!(pop.auto_shuffling());
        pop.run_epoch();
        assert_eq!(pop.len(), 10);
        let sum: f64 = pop.members().iter().map(|c| c.fitness()).sum();
        assert!((pop.fitness_sum() - sum).abs() < 1e-9);
    }

    #[test]
    fn test_shuffle_keeps_multiset() {
        let elite = EliteSelection::default();
        let mut pop = population(seeded(12, 9), Gene::seeded(), &elite);
        let mut before: Vec<f64> = pop.members().iter().map(|c| c.value).collect();
        pop.shuffle();
        let mut after: Vec<f64> = pop.members().iter().map(|c| c.value).collect();
        before.sort_by(f64::total_cmp);
        after.sort_by(f64::total_cmp);
        assert_eq!(before, after);
    }

    #[test]
    fn test_same_seed_same_run() {
        let elite = EliteSelection::default();
        let run = || {
            let mut pop = population(seeded(10, 99), Gene::seeded(), &elite);
            for _ in 0..10 {
                pop.run_epoch();
            }
            pop.members().iter().map(|c| c.value).collect::<Vec<_>>()
        };
        assert_eq!(run(), run());
    }

    // ---- Rates ----

    #[test]
    fn test_rate_setters_clamp() {
        let elite = EliteSelection::default();
        let mut pop = Population::new(3, Gene::seeded(), &Identity, &elite).unwrap();

        pop.set_crossover_rate(0.0);
        assert_eq!(pop.crossover_rate(), 0.1);
        pop.set_crossover_rate(5.0);
        assert_eq!(pop.crossover_rate(), 1.0);

        pop.set_mutation_rate(0.0);
        assert_eq!(pop.mutation_rate(), 0.1);
        pop.set_mutation_rate(5.0);
        assert_eq!(pop.mutation_rate(), 1.0);

        pop.set_random_selection_portion(-1.0);
        assert_eq!(pop.random_selection_portion(), 0.0);
        pop.set_random_selection_portion(5.0);
        assert_eq!(pop.random_selection_portion(), 0.9);
    }

    // ---- Migration ----

    #[test]
    fn test_migrate_exchanges_best() {
        let elite = EliteSelection::new(false);
        let mut low = population(seeded(6, 1), Gene::fixed(1.0), &elite);
        let mut high = population(seeded(4, 2), Gene::fixed(9.0), &elite);

        low.migrate(&mut high, 2, &elite).unwrap();

        assert_eq!(low.len(), 6);
        assert_eq!(high.len(), 4);
        assert_eq!(low.members().iter().filter(|c| c.value == 9.0).count(), 2);
        assert_eq!(high.members().iter().filter(|c| c.value == 1.0).count(), 2);
        assert_eq!(low.fitness_max(), 9.0);
        assert!((high.fitness_sum() - 20.0).abs() < 1e-12);
    }

    #[test]
    fn test_migrate_rejects_oversized_count() {
        let elite = EliteSelection::default();
        let mut a = population(seeded(6, 1), Gene::seeded(), &elite);
        let mut b = population(seeded(3, 2), Gene::seeded(), &elite);
        let result = a.migrate(&mut b, 4, &elite);
        assert!(matches!(result, Err(GeneticError::InvalidConfig(_))));
        assert_eq!(a.len(), 6);
        assert_eq!(b.len(), 3);
    }

    #[test]
    fn test_trace_does_not_disturb_population() {
        let elite = EliteSelection::default();
        let pop = population(seeded(3, 1), Gene::seeded(), &elite);
        let before: Vec<f64> = pop.members().iter().map(|c| c.value).collect();
        pop.trace();
        let after: Vec<f64> = pop.members().iter().map(|c| c.value).collect();
        assert_eq!(before, after);
    }
}
