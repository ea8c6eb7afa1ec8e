use crate::exact::BranchAndBound;
use crate::graph::IncidenceGraph;
use crate::meta_heuristics::{GeneticSearch, IsingSearch};
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_SEED: u64 = 1337;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(600);

/// A feasible vertex cover, vertex ids sorted ascending.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VertexCover {
    vertices: Vec<usize>,
}

impl VertexCover {
    pub fn new(mut vertices: Vec<usize>) -> Self {
        vertices.sort_unstable();
        Self { vertices }
    }

    pub fn size(&self) -> usize {
        self.vertices.len()
    }

    pub fn vertices(&self) -> &[usize] {
        &self.vertices
    }
}

/// One improvement of the anytime best solution.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TracePoint {
    pub elapsed_secs: f64,
    pub size: usize,
}

/// Anytime result of a solver run. `proved_optimal` is set when the
/// search space was exhausted before the wall-clock cutoff; running out of
/// time is a normal termination and leaves the best solution found so far.
pub struct SearchOutcome {
    pub best: VertexCover,
    pub trace: Vec<TracePoint>,
    pub proved_optimal: bool,
}

/// Sink notified on every improvement of the best known cover, so the
/// caller can stream an append-only trace while the search runs.
pub trait Tracer {
    fn improved(&mut self, elapsed_secs: f64, size: usize);
}

pub trait CoverSolver {
    fn with_graph(graph: &IncidenceGraph) -> Self
    where
        Self: Sized;
    fn compute(self) -> SearchOutcome;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Algorithm {
    BranchAndBound,
    Genetic,
    Annealing,
}

impl Algorithm {
    /// Short method tag used in output filenames.
    pub fn tag(&self) -> &'static str {
        match self {
            Algorithm::BranchAndBound => "BB",
            Algorithm::Genetic => "GA",
            Algorithm::Annealing => "ISING",
        }
    }
}

impl FromStr for Algorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bnb" | "bb" => Ok(Algorithm::BranchAndBound),
            "genetic" | "ga" => Ok(Algorithm::Genetic),
            "annealing" | "ising" => Ok(Algorithm::Annealing),
            _ => Err(format!("unknown algorithm '{}'", s)),
        }
    }
}

/// Front end dispatching to the configured engine.
pub struct Solver {
    algorithm: Algorithm,
    timeout: Duration,
    seed: u64,
    tracer: Option<Box<dyn Tracer>>,
}

impl Default for Solver {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::BranchAndBound,
            timeout: DEFAULT_TIMEOUT,
            seed: DEFAULT_SEED,
            tracer: None,
        }
    }
}

impl Solver {
    pub fn algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn tracer(mut self, tracer: Box<dyn Tracer>) -> Self {
        self.tracer = Some(tracer);
        self
    }

    pub fn solve(self, graph: &IncidenceGraph) -> SearchOutcome {
        let Solver {
            algorithm,
            timeout,
            seed,
            tracer,
        } = self;
        match algorithm {
            Algorithm::BranchAndBound => {
                let mut solver = BranchAndBound::with_graph(graph).timeout(timeout).seed(seed);
                if let Some(tracer) = tracer {
                    solver = solver.tracer(tracer);
                }
                solver.compute()
            }
            Algorithm::Genetic => {
                let mut solver = GeneticSearch::with_graph(graph).timeout(timeout).seed(seed);
                if let Some(tracer) = tracer {
                    solver = solver.tracer(tracer);
                }
                solver.compute()
            }
            Algorithm::Annealing => {
                let mut solver = IsingSearch::with_graph(graph).timeout(timeout).seed(seed);
                if let Some(tracer) = tracer {
                    solver = solver.tracer(tracer);
                }
                solver.compute()
            }
        }
    }
}
