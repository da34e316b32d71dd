//! Genetic-programming tree chromosome.
//!
//! A [`GpTreeChromosome`] is an expression tree over the arithmetic and
//! elementary functions understood by [`polish`](crate::fitness::polish).
//! Its `Display` output is the postfix form of the tree, so it plugs
//! directly into [`SymbolicRegressionFitness`](crate::fitness::SymbolicRegressionFitness)
//! and [`TimeSeriesPredictionFitness`](crate::fitness::TimeSeriesPredictionFitness).
//!
//! # Operators
//!
//! - **Crossover**: swaps a random subtree of each parent, then trims both
//!   trees back to the maximum level
//! - **Mutation**: walks down a random path and regenerates one node (or the
//!   subtree below a leaf)
//!
//! # References
//!
//! - Koza (1992), *Genetic Programming: On the Programming of Computers by
//!   Means of Natural Selection*

use super::types::Chromosome;
use crate::error::GeneticError;
use rand::Rng;
use std::fmt;

/// A function gene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GpFunction {
    Add,
    Subtract,
    Multiply,
    Divide,
    Sin,
    Cos,
    Ln,
    Exp,
    Sqrt,
}

impl GpFunction {
    pub const ALL: [GpFunction; 9] = [
        GpFunction::Add,
        GpFunction::Subtract,
        GpFunction::Multiply,
        GpFunction::Divide,
        GpFunction::Sin,
        GpFunction::Cos,
        GpFunction::Ln,
        GpFunction::Exp,
        GpFunction::Sqrt,
    ];

    /// Number of operands the function pops.
    pub fn arity(self) -> usize {
        match self {
            GpFunction::Add | GpFunction::Subtract | GpFunction::Multiply | GpFunction::Divide => 2,
            _ => 1,
        }
    }

    /// Postfix token.
    pub fn symbol(self) -> &'static str {
        match self {
            GpFunction::Add => "+",
            GpFunction::Subtract => "-",
            GpFunction::Multiply => "*",
            GpFunction::Divide => "/",
            GpFunction::Sin => "sin",
            GpFunction::Cos => "cos",
            GpFunction::Ln => "ln",
            GpFunction::Exp => "exp",
            GpFunction::Sqrt => "sqrt",
        }
    }
}

/// One node's gene: a function or a variable reference (`$k`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GpGene {
    Function(GpFunction),
    Argument(usize),
}

impl GpGene {
    pub fn arity(self) -> usize {
        match self {
            GpGene::Function(function) => function.arity(),
            GpGene::Argument(_) => 0,
        }
    }

    /// A random gene; functions are three times as likely as arguments.
    fn random_gene<R: Rng + ?Sized>(variables: usize, rng: &mut R) -> Self {
        if rng.random_range(0..4) == 3 {
            Self::random_argument(variables, rng)
        } else {
            GpGene::Function(GpFunction::ALL[rng.random_range(0..GpFunction::ALL.len())])
        }
    }

    fn random_argument<R: Rng + ?Sized>(variables: usize, rng: &mut R) -> Self {
        GpGene::Argument(rng.random_range(0..variables))
    }
}

impl fmt::Display for GpGene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GpGene::Function(function) => f.write_str(function.symbol()),
            GpGene::Argument(index) => write!(f, "${index}"),
        }
    }
}

/// A node of an expression tree. Leaves carry arguments; a function node
/// has exactly `gene.arity()` children.
#[derive(Debug, Clone, PartialEq)]
pub struct GpTreeNode {
    pub gene: GpGene,
    pub children: Vec<GpTreeNode>,
}

impl GpTreeNode {
    pub fn leaf(gene: GpGene) -> Self {
        Self {
            gene,
            children: Vec::new(),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Levels below this node (0 for a leaf).
    pub fn depth(&self) -> usize {
        self.children
            .iter()
            .map(|child| child.depth() + 1)
            .max()
            .unwrap_or(0)
    }

    /// Total number of nodes in the subtree.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(GpTreeNode::node_count).sum::<usize>()
    }
}

/// Postfix rendering: children left to right, then the gene.
impl fmt::Display for GpTreeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for child in &self.children {
            write!(f, "{child} ")?;
        }
        write!(f, "{}", self.gene)
    }
}

/// Expression-tree chromosome for symbolic regression and time-series
/// prediction.
///
/// Trees are generated up to `max_initial_level` and never grow deeper
/// than `max_level`.
///
/// # Examples
///
/// ```
/// use u_evolve::fitness::polish;
/// use u_evolve::ga::GpTreeChromosome;
/// use u_evolve::random::create_rng;
///
/// let mut rng = create_rng(7);
/// let tree = GpTreeChromosome::new(2, &mut rng).unwrap();
/// assert!(polish::evaluate(&tree.to_string(), &[1.0, 2.0]).is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct GpTreeChromosome {
    root: GpTreeNode,
    variables: usize,
    max_initial_level: usize,
    max_level: usize,
    fitness: f64,
}

impl GpTreeChromosome {
    pub const DEFAULT_MAX_INITIAL_LEVEL: usize = 3;
    pub const DEFAULT_MAX_LEVEL: usize = 5;

    /// Creates a random tree over `variables` arguments (`$0 .. $(variables-1)`).
    ///
    /// # Errors
    ///
    /// [`GeneticError::InvalidArgument`] if `variables == 0`.
    pub fn new<R: Rng + ?Sized>(variables: usize, rng: &mut R) -> Result<Self, GeneticError> {
        Self::with_levels(
            variables,
            Self::DEFAULT_MAX_INITIAL_LEVEL,
            Self::DEFAULT_MAX_LEVEL,
            rng,
        )
    }

    /// Creates a random tree with explicit level limits.
    ///
    /// `max_initial_level` is clamped to `[1, 25]`, `max_level` to `[1, 50]`.
    pub fn with_levels<R: Rng + ?Sized>(
        variables: usize,
        max_initial_level: usize,
        max_level: usize,
        rng: &mut R,
    ) -> Result<Self, GeneticError> {
        if variables == 0 {
            return Err(GeneticError::InvalidArgument(
                "a tree needs at least one variable".into(),
            ));
        }
        let mut chromosome = Self {
            root: GpTreeNode::leaf(GpGene::Argument(0)),
            variables,
            max_initial_level: max_initial_level.clamp(1, 25),
            max_level: max_level.clamp(1, 50),
            fitness: 0.0,
        };
        chromosome.generate(rng);
        Ok(chromosome)
    }

    pub fn root(&self) -> &GpTreeNode {
        &self.root
    }

    pub fn variables(&self) -> usize {
        self.variables
    }

    pub fn max_initial_level(&self) -> usize {
        self.max_initial_level
    }

    pub fn max_level(&self) -> usize {
        self.max_level
    }

    fn generate<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let gene = GpGene::random_gene(self.variables, rng);
        let children = (0..gene.arity())
            .map(|_| {
                let level = rng.random_range(0..self.max_initial_level);
                random_subtree(self.variables, level, rng)
            })
            .collect();
        self.root = GpTreeNode { gene, children };
        trim(&mut self.root, self.max_level, self.variables, rng);
    }
}

impl Chromosome for GpTreeChromosome {
    fn fitness(&self) -> f64 {
        self.fitness
    }

    fn set_fitness(&mut self, fitness: f64) {
        self.fitness = fitness;
    }

    fn create_offspring<R: Rng + ?Sized>(&self, rng: &mut R) -> Self {
        let mut child = Self {
            root: GpTreeNode::leaf(GpGene::Argument(0)),
            fitness: 0.0,
            ..*self
        };
        child.generate(rng);
        child
    }

    /// Swaps a random subtree with the pair. Trees over different variable
    /// counts are left as is.
    fn crossover<R: Rng + ?Sized>(&mut self, pair: &mut Self, rng: &mut R) {
        if pair.variables != self.variables {
            return;
        }
        let mine = random_path(&self.root, self.max_level, rng);
        let theirs = random_path(&pair.root, pair.max_level, rng);
        std::mem::swap(
            node_at_mut(&mut self.root, &mine),
            node_at_mut(&mut pair.root, &theirs),
        );

        trim(&mut self.root, self.max_level, self.variables, rng);
        trim(&mut pair.root, pair.max_level, pair.variables, rng);
    }

    fn mutate<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let (variables, max_level) = (self.variables, self.max_level);
        let mut node = &mut self.root;
        let mut level = 0;

        loop {
            if node.is_leaf() {
                if level >= max_level {
                    node.gene = GpGene::random_argument(variables, rng);
                } else {
                    let depth = rng.random_range(0..max_level - level);
                    *node = random_subtree(variables, depth, rng);
                }
                return;
            }

            // the node itself or one of its children
            let arity = node.children.len();
            let r = rng.random_range(0..=arity);
            if r == arity {
                node.gene = GpGene::random_gene(variables, rng);
                let arity = node.gene.arity();
                node.children.truncate(arity);
                while node.children.len() < arity {
                    let depth = rng.random_range(0..max_level.saturating_sub(level).max(1));
                    node.children.push(random_subtree(variables, depth, rng));
                }
                return;
            }

            node = &mut node.children[r];
            level += 1;
        }
    }
}

impl fmt::Display for GpTreeChromosome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.root)
    }
}

/// A random subtree no deeper than `level`; level 0 is a single argument.
fn random_subtree<R: Rng + ?Sized>(variables: usize, level: usize, rng: &mut R) -> GpTreeNode {
    let gene = if level == 0 {
        GpGene::random_argument(variables, rng)
    } else {
        GpGene::random_gene(variables, rng)
    };
    let children = (0..gene.arity())
        .map(|_| random_subtree(variables, level.saturating_sub(1), rng))
        .collect();
    GpTreeNode { gene, children }
}

/// Picks a crossover point: the root with probability `1 / max_level`,
/// otherwise a walk down random children that stops at a leaf or, at each
/// step, with probability `1 / max_level`.
fn random_path<R: Rng + ?Sized>(root: &GpTreeNode, max_level: usize, rng: &mut R) -> Vec<usize> {
    let mut path = Vec::new();
    if root.is_leaf() || rng.random_range(0..max_level) == 0 {
        return path;
    }
    let mut node = root;
    loop {
        let r = rng.random_range(0..node.children.len());
        path.push(r);
        node = &node.children[r];
        if node.is_leaf() || rng.random_range(0..max_level) == 0 {
            return path;
        }
    }
}

fn node_at_mut<'t>(root: &'t mut GpTreeNode, path: &[usize]) -> &'t mut GpTreeNode {
    path.iter().fold(root, |node, &i| &mut node.children[i])
}

/// Cuts the tree at `level`: function nodes found there become arguments.
fn trim<R: Rng + ?Sized>(node: &mut GpTreeNode, level: usize, variables: usize, rng: &mut R) {
    if node.is_leaf() {
        return;
    }
    if level == 0 {
        node.children.clear();
        node.gene = GpGene::random_argument(variables, rng);
    } else {
        for child in &mut node.children {
            trim(child, level - 1, variables, rng);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fitness::polish;
    use crate::random::create_rng;

    fn arity_consistent(node: &GpTreeNode) -> bool {
        node.children.len() == node.gene.arity() && node.children.iter().all(arity_consistent)
    }

    fn arguments_below(node: &GpTreeNode, variables: usize) -> bool {
        let own = match node.gene {
            GpGene::Argument(i) => i < variables,
            GpGene::Function(_) => true,
        };
        own && node.children.iter().all(|c| arguments_below(c, variables))
    }

    fn assert_well_formed(c: &GpTreeChromosome) {
        assert!(arity_consistent(c.root()), "arity mismatch in {c}");
        assert!(arguments_below(c.root(), c.variables()), "bad argument in {c}");
        assert!(c.root().depth() <= c.max_level(), "too deep: {c}");
    }

    #[test]
    fn test_postfix_display() {
        // ($0 + $1) * sin($0)
        let tree = GpTreeNode {
            gene: GpGene::Function(GpFunction::Multiply),
            children: vec![
                GpTreeNode {
                    gene: GpGene::Function(GpFunction::Add),
                    children: vec![
                        GpTreeNode::leaf(GpGene::Argument(0)),
                        GpTreeNode::leaf(GpGene::Argument(1)),
                    ],
                },
                GpTreeNode {
                    gene: GpGene::Function(GpFunction::Sin),
                    children: vec![GpTreeNode::leaf(GpGene::Argument(0))],
                },
            ],
        };
        assert_eq!(tree.to_string(), "$0 $1 + $0 sin *");
        assert_eq!(tree.depth(), 2);
        assert_eq!(tree.node_count(), 6);
    }

    #[test]
    fn test_function_arity_and_symbols() {
        let binary: Vec<&str> = GpFunction::ALL
            .iter()
            .filter(|f| f.arity() == 2)
            .map(|f| f.symbol())
            .collect();
        assert_eq!(binary, vec!["+", "-", "*", "/"]);
        assert_eq!(GpGene::Argument(3).to_string(), "$3");
        assert_eq!(GpGene::Argument(3).arity(), 0);
    }

    #[test]
    fn test_zero_variables_rejected() {
        let mut rng = create_rng(1);
        let result = GpTreeChromosome::new(0, &mut rng);
        assert!(matches!(result, Err(GeneticError::InvalidArgument(_))));
    }

    #[test]
    fn test_level_limits_clamped() {
        let mut rng = create_rng(1);
        let c = GpTreeChromosome::with_levels(1, 0, 100, &mut rng).unwrap();
        assert_eq!(c.max_initial_level(), 1);
        assert_eq!(c.max_level(), 50);
    }

    #[test]
    fn test_generated_trees_are_valid_expressions() {
        let mut rng = create_rng(42);
        for _ in 0..200 {
            let c = GpTreeChromosome::new(3, &mut rng).unwrap();
            assert_well_formed(&c);
            // initial trees stay within the initial level
            assert!(c.root().depth() <= c.max_initial_level());
            assert!(polish::evaluate(&c.to_string(), &[1.0, 2.0, 3.0]).is_ok());
        }
    }

    #[test]
    fn test_initial_level_above_max_level_is_trimmed() {
        let mut rng = create_rng(5);
        for _ in 0..50 {
            let c = GpTreeChromosome::with_levels(2, 10, 2, &mut rng).unwrap();
            assert_well_formed(&c);
        }
    }

    #[test]
    fn test_mutation_keeps_trees_valid() {
        let mut rng = create_rng(8);
        let mut c = GpTreeChromosome::new(2, &mut rng).unwrap();
        let mut changed = false;
        for _ in 0..300 {
            let before = c.clone();
            c.mutate(&mut rng);
            changed |= c != before;
            assert_well_formed(&c);
            assert!(polish::evaluate(&c.to_string(), &[0.5, 1.5]).is_ok());
        }
        assert!(changed);
    }

    #[test]
    fn test_crossover_keeps_trees_valid() {
        let mut rng = create_rng(9);
        let mut a = GpTreeChromosome::new(2, &mut rng).unwrap();
        let mut b = GpTreeChromosome::new(2, &mut rng).unwrap();
        for _ in 0..300 {
            let total = a.root().node_count() + b.root().node_count();
            a.crossover(&mut b, &mut rng);
            assert_well_formed(&a);
            assert_well_formed(&b);
            // swapping subtrees moves nodes; only trimming removes them
            assert!(a.root().node_count() + b.root().node_count() <= total);
            if a.root().is_leaf() && b.root().is_leaf() {
                a = GpTreeChromosome::new(2, &mut rng).unwrap();
                b = GpTreeChromosome::new(2, &mut rng).unwrap();
            }
        }
    }

    #[test]
    fn test_crossover_between_leaves_swaps_them() {
        let mut rng = create_rng(3);
        let mut a = GpTreeChromosome::new(4, &mut rng).unwrap();
        let mut b = a.clone();
        a.root = GpTreeNode::leaf(GpGene::Argument(1));
        b.root = GpTreeNode::leaf(GpGene::Argument(2));
        a.crossover(&mut b, &mut rng);
        assert_eq!(a.to_string(), "$2");
        assert_eq!(b.to_string(), "$1");
    }

    #[test]
    fn test_crossover_ignores_variable_mismatch() {
        let mut rng = create_rng(4);
        let mut a = GpTreeChromosome::new(1, &mut rng).unwrap();
        let mut b = GpTreeChromosome::new(3, &mut rng).unwrap();
        let (before_a, before_b) = (a.clone(), b.clone());
        a.crossover(&mut b, &mut rng);
        assert_eq!(a, before_a);
        assert_eq!(b, before_b);
    }

    #[test]
    fn test_offspring_shares_parameters() {
        let mut rng = create_rng(6);
        let mut parent = GpTreeChromosome::with_levels(3, 2, 4, &mut rng).unwrap();
        parent.set_fitness(7.0);
        let child = parent.create_offspring(&mut rng);
        assert_eq!(child.variables(), 3);
        assert_eq!(child.max_initial_level(), 2);
        assert_eq!(child.max_level(), 4);
        assert_eq!(child.fitness(), 0.0);
    }
}
