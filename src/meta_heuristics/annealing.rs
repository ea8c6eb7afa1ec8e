use crate::graph::IncidenceGraph;
use crate::meta_heuristics::Candidate;
use crate::solver::{
    CoverSolver, SearchOutcome, TracePoint, Tracer, VertexCover, DEFAULT_SEED, DEFAULT_TIMEOUT,
};
use crate::util::{Stopper, Timer};
use log::info;
use rand::prelude::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;

const DEFAULT_NUM_SYSTEMS: usize = 1;
/// Weight of the cover-size term of the Hamiltonian.
const CONSTANT_A: f64 = 1.0;
/// Weight of the uncovered-edge term. Large so feasibility dominates.
const CONSTANT_B: f64 = 100.0;
/// Inverse Boltzmann temperature of the Metropolis criterion.
const BETA: f64 = 3.0;

/// Simulated-annealing style lattice search with Metropolis moves.
///
/// Each system is a cover bitfield started at the full cover. A move
/// flips one uniformly chosen vertex bit; the energy difference is the
/// vertex-count change plus the marginal uncovered-edge cost of the flip,
/// and the move is committed when it lowers the energy or passes the
/// Metropolis draw `rand < exp(-beta * dE)`. The best feasible state seen
/// across all systems is tracked anytime until the wall-clock cutoff.
pub struct IsingSearch {
    graph: IncidenceGraph,
    num_systems: usize,
    seed: u64,
    timeout: Duration,
    tracer: Option<Box<dyn Tracer>>,
}

impl IsingSearch {
    pub fn num_systems(mut self, num_systems: usize) -> Self {
        self.num_systems = num_systems;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn tracer(mut self, tracer: Box<dyn Tracer>) -> Self {
        self.tracer = Some(tracer);
        self
    }
}

impl CoverSolver for IsingSearch {
    fn with_graph(graph: &IncidenceGraph) -> Self {
        Self {
            graph: graph.clone(),
            num_systems: DEFAULT_NUM_SYSTEMS,
            seed: DEFAULT_SEED,
            timeout: DEFAULT_TIMEOUT,
            tracer: None,
        }
    }

    fn compute(mut self) -> SearchOutcome {
        let order = self.graph.order();
        if order == 0 || self.graph.size() == 0 {
            return SearchOutcome {
                best: VertexCover::new(Vec::new()),
                trace: Vec::new(),
                proved_optimal: true,
            };
        }

        info!("annealing {} systems", self.num_systems);

        let mut rng: StdRng = SeedableRng::seed_from_u64(self.seed);
        let mut best = Candidate::full_cover(order);
        let mut systems: Vec<Candidate> = vec![best.clone(); self.num_systems];
        let mut trace: Vec<TracePoint> = Vec::new();

        let mut timer = Timer::new(self.timeout);
        timer.init();

        let mut iteration: u64 = 0;
        while !timer.stop() {
            iteration += 1;
            for system in systems.iter_mut() {
                let vertex = rng.gen_range(0..order);
                let marginal_cost = self.graph.flip_cost(&system.bits, vertex) as f64;
                let vertex_delta = if system.bits.get_bit(vertex) { -1.0 } else { 1.0 };
                let energy_diff = CONSTANT_A * vertex_delta + CONSTANT_B * marginal_cost;

                // Metropolis criterion; the short circuit covers dE < 0
                // where exp(-beta * dE) > 1 anyway
                if energy_diff < 0.0 || rng.gen::<f64>() < (-BETA * energy_diff).exp() {
                    system.flip(&self.graph, vertex);
                }

                if system.is_cover && system.vertices_used < best.vertices_used {
                    best = system.clone();
                    let elapsed = timer.elapsed_secs();
                    trace.push(TracePoint {
                        elapsed_secs: elapsed,
                        size: best.vertices_used,
                    });
                    if let Some(tracer) = self.tracer.as_mut() {
                        tracer.improved(elapsed, best.vertices_used);
                    }
                    info!("new best: {}", best.vertices_used);
                }
            }
        }
        info!("finished after {} sweeps", iteration);

        SearchOutcome {
            best: VertexCover::new(best.vertices()),
            trace,
            proved_optimal: false,
        }
    }
}
