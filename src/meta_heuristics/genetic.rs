use crate::graph::IncidenceGraph;
use crate::meta_heuristics::Candidate;
use crate::solver::{
    CoverSolver, SearchOutcome, TracePoint, Tracer, VertexCover, DEFAULT_SEED, DEFAULT_TIMEOUT,
};
use crate::util::{Stopper, Timer};
use log::{debug, info};
use rand::prelude::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;

const DEFAULT_POPULATION: usize = 100;
const DEFAULT_CROSSOVER_PROBABILITY: f64 = 0.9;
const DEFAULT_ELITE_SIZE: usize = 10;
/// Every this many cycles, duplicated candidates are pruned and half of
/// the freed slots are reseeded with full covers.
const PRUNE_INTERVAL: usize = 10_000;

/// Population-based local search over cover bitfields.
///
/// The population is seeded entirely with full covers, which are always
/// feasible; selection pressure then trades cover size against uncovered
/// edges via the candidate score. Each cycle scores the population, keeps
/// an elite, breeds the remainder by roulette selection with single-point
/// crossover, and applies per-bit mutation. The best feasible candidate
/// seen so far is tracked anytime until the wall-clock cutoff.
pub struct GeneticSearch {
    graph: IncidenceGraph,
    population_size: usize,
    crossover_probability: f64,
    mutation_probability: Option<f64>,
    elite_size: usize,
    seed: u64,
    timeout: Duration,
    tracer: Option<Box<dyn Tracer>>,
}

impl GeneticSearch {
    pub fn population_size(mut self, population_size: usize) -> Self {
        self.population_size = population_size;
        self
    }

    pub fn crossover_probability(mut self, crossover_probability: f64) -> Self {
        self.crossover_probability = crossover_probability;
        self
    }

    pub fn mutation_probability(mut self, mutation_probability: f64) -> Self {
        self.mutation_probability = Some(mutation_probability);
        self
    }

    pub fn elite_size(mut self, elite_size: usize) -> Self {
        self.elite_size = elite_size;
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

    fn evaluate_and_sort(&self, population: &mut Vec<Candidate>, iteration: usize) {
        for candidate in population.iter_mut() {
            candidate.evaluate(&self.graph);
        }

        if iteration % PRUNE_INTERVAL == 0 {
            population.sort_unstable_by(|a, b| a.bits.cmp(&b.bits));
            population.dedup_by(|a, b| a.bits == b.bits);
            let pruned = self.population_size - population.len();
            let order = self.graph.order();
            population.extend((0..pruned / 2).map(|_| Candidate::full_cover(order)));
            debug!("pruned {} duplicate candidates", pruned);
        }

        // descending by score
        population.sort_unstable_by(|a, b| b.score.partial_cmp(&a.score).unwrap());
    }

    /// Roulette selection: repeatedly pick a random candidate and accept
    /// it with probability proportional to its share of the total
    /// fitness.
    fn pick_parent(
        &self,
        population: &[Candidate],
        total_fitness: f64,
        rng: &mut StdRng,
    ) -> usize {
        loop {
            let idx = rng.gen_range(0..population.len());
            if rng.gen::<f64>() < population[idx].score / total_fitness {
                return idx;
            }
        }
    }

    fn breed(&self, population: &[Candidate], rng: &mut StdRng) -> Vec<Candidate> {
        let total_fitness: f64 = population.iter().map(|c| c.score).sum();
        let elite = self.elite_size.min(population.len());
        let mut next: Vec<Candidate> = population[..elite].to_vec();

        while next.len() < self.population_size {
            if rng.gen::<f64>() < self.crossover_probability {
                let first = self.pick_parent(population, total_fitness, rng);
                let mut second = first;
                while second == first {
                    second = self.pick_parent(population, total_fitness, rng);
                }
                let mut a = population[first].clone();
                let mut b = population[second].clone();
                let position = rng.gen_range(0..self.graph.order());
                a.crossover(&mut b, position);
                next.push(a);
                next.push(b);
            } else {
                let parent = self.pick_parent(population, total_fitness, rng);
                next.push(population[parent].clone());
            }
        }
        next.truncate(self.population_size);
        next
    }

    fn mutate(&self, population: &mut [Candidate], probability: f64, rng: &mut StdRng) {
        for candidate in population.iter_mut() {
            for vertex in 0..self.graph.order() {
                if rng.gen::<f64>() < probability {
                    candidate.bits.flip_bit(vertex);
                }
            }
        }
    }

    /// Records the smallest feasible candidate of the current population
    /// if it beats the best seen so far.
    fn record_best(
        &mut self,
        population: &[Candidate],
        best: &mut Candidate,
        timer: &Timer,
        trace: &mut Vec<TracePoint>,
    ) {
        let challenger = population
            .iter()
            .filter(|c| c.is_cover)
            .min_by_key(|c| c.vertices_used);
        if let Some(challenger) = challenger {
            if challenger.vertices_used < best.vertices_used {
                *best = challenger.clone();
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
}

impl CoverSolver for GeneticSearch {
    fn with_graph(graph: &IncidenceGraph) -> Self {
        Self {
            graph: graph.clone(),
            population_size: DEFAULT_POPULATION,
            crossover_probability: DEFAULT_CROSSOVER_PROBABILITY,
            mutation_probability: None,
            elite_size: DEFAULT_ELITE_SIZE,
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

        let mutation_probability = self
            .mutation_probability
            .unwrap_or(1.5 / order as f64);
        info!(
            "population {}, crossover {}, mutation {}, elite {}",
            self.population_size, self.crossover_probability, mutation_probability, self.elite_size
        );

        let mut rng: StdRng = SeedableRng::seed_from_u64(self.seed);
        let mut best = Candidate::full_cover(order);
        let mut population: Vec<Candidate> = vec![best.clone(); self.population_size];
        let mut trace: Vec<TracePoint> = Vec::new();

        let mut timer = Timer::new(self.timeout);
        timer.init();

        let mut iteration = 0;
        while !timer.stop() {
            iteration += 1;
            self.evaluate_and_sort(&mut population, iteration);
            self.record_best(&population, &mut best, &timer, &mut trace);
            population = self.breed(&population, &mut rng);
            self.mutate(&mut population, mutation_probability, &mut rng);
        }

        // final scoring pass so late mutations are not lost
        self.evaluate_and_sort(&mut population, iteration + 1);
        self.record_best(&population, &mut best, &timer, &mut trace);
        info!("finished after {} cycles", iteration);

        SearchOutcome {
            best: VertexCover::new(best.vertices()),
            trace,
            proved_optimal: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::graph::IncidenceGraph;
    use crate::meta_heuristics::GeneticSearch;
    use crate::solver::CoverSolver;
    use std::time::Duration;

    #[test]
    fn returns_a_valid_cover_on_a_small_graph() {
        let graph = IncidenceGraph::from_edges(5, &[(0, 1), (1, 2), (2, 3), (3, 4), (4, 0)]);
        let outcome = GeneticSearch::with_graph(&graph)
            .timeout(Duration::from_millis(200))
            .seed(7)
            .compute();
        assert!(graph.is_vertex_cover(outcome.best.vertices()));
        assert!(outcome.best.size() <= 5);
        assert!(!outcome.proved_optimal);
    }

    #[test]
    fn trace_is_strictly_decreasing() {
        let graph = IncidenceGraph::from_edges(
            6,
            &[(0, 1), (1, 2), (2, 3), (3, 4), (4, 5), (5, 0), (0, 3)],
        );
        let outcome = GeneticSearch::with_graph(&graph)
            .timeout(Duration::from_millis(200))
            .seed(3)
            .compute();
        for pair in outcome.trace.windows(2) {
            assert!(pair[1].size < pair[0].size);
        }
    }

    #[test]
    fn edgeless_graph_is_solved_immediately() {
        let graph = IncidenceGraph::from_edges(3, &[]);
        let outcome = GeneticSearch::with_graph(&graph)
            .timeout(Duration::from_millis(50))
            .compute();
        assert_eq!(outcome.best.size(), 0);
    }
}
