use crate::graph::IncidenceGraph;
use crate::solver::{
    CoverSolver, SearchOutcome, TracePoint, Tracer, VertexCover, DEFAULT_SEED, DEFAULT_TIMEOUT,
};
use crate::upperbound::{GreedyPairBound, UpperboundHeuristic};
use crate::util::{Stopper, Timer};
use fxhash::FxHashSet;
use log::{debug, info};
use rand::prelude::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;

/// One node of the binary decision tree. A state is pushed once and
/// visited twice: unprocessed to apply its effects and branch, processed
/// to undo those effects on backtrack.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum NodeState {
    Covered { vertex: usize, processed: bool },
    Uncovered { vertex: usize, processed: bool },
}

impl NodeState {
    fn vertex(self) -> usize {
        match self {
            NodeState::Covered { vertex, .. } | NodeState::Uncovered { vertex, .. } => vertex,
        }
    }

    fn processed(self) -> bool {
        match self {
            NodeState::Covered { processed, .. } | NodeState::Uncovered { processed, .. } => {
                processed
            }
        }
    }

    fn as_processed(self) -> Self {
        match self {
            NodeState::Covered { vertex, .. } => NodeState::Covered {
                vertex,
                processed: true,
            },
            NodeState::Uncovered { vertex, .. } => NodeState::Uncovered {
                vertex,
                processed: true,
            },
        }
    }

    fn is_uncovered(self) -> bool {
        matches!(self, NodeState::Uncovered { .. })
    }
}

/// Edge removed while processing a covered state: the vertex whose state
/// owns the removal, the neighbor across the edge, and the edge id. Plain
/// data only, so backtracking is pure replay.
type UndoEntry = (usize, usize, usize);

/// Number of vertices strictly between `current` and `start` in cyclic
/// forward order, i.e. the vertices the search has not visited yet on the
/// active path. Derived arithmetically; the traversal never skips a
/// vertex, which is what makes this formula (and the bound built on it)
/// correct.
pub(crate) fn cyclic_unprocessed(current: usize, start: usize, order: usize) -> usize {
    if current >= start {
        order - 1 - (current - start)
    } else {
        start - current - 1
    }
}

/// Exact anytime solver: depth-first branch and bound over an explicit
/// stack of cover/leave-uncovered decisions.
///
/// Vertices are branched in cyclic order from a randomly chosen start
/// vertex. A covered decision strips all edges at the vertex (logged for
/// undo); an uncovered decision only marks the vertex. When the working
/// graph runs out of edges the decisions on the active path form a
/// complete cover of size `order - |uncovered| - unprocessed`. Branches
/// whose committed size already exceeds the best known cover or the
/// greedy upper bound are pruned.
pub struct BranchAndBound {
    graph: IncidenceGraph,
    timeout: Duration,
    seed: u64,
    tracer: Option<Box<dyn Tracer>>,
}

impl BranchAndBound {
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

    /// Pops the top state, reverts its effects: uncovered states leave
    /// the uncovered set, and every edge removed on behalf of the popped
    /// vertex is reinserted under its original id.
    fn backtrack(
        graph: &mut IncidenceGraph,
        stack: &mut Vec<NodeState>,
        uncovered: &mut FxHashSet<usize>,
        undo_log: &mut Vec<UndoEntry>,
    ) {
        let state = stack.pop().expect("backtrack on an empty stack");
        let vertex = state.vertex();
        if state.is_uncovered() {
            uncovered.remove(&vertex);
        }
        while undo_log.last().map_or(false, |entry| entry.0 == vertex) {
            let (owner, neighbor, edge) = undo_log.pop().expect("undo log entry vanished");
            graph.add_edge(edge, (owner, neighbor));
            debug!("added edge [{}]: ({}, {})", edge, owner, neighbor);
        }
    }

    /// The cover on the active path: every visited vertex between `start`
    /// and `current` (cyclic, inclusive) not committed to the uncovered
    /// set.
    fn covered_path(
        start: usize,
        current: usize,
        order: usize,
        uncovered: &FxHashSet<usize>,
    ) -> Vec<usize> {
        let mut cover = Vec::new();
        let mut idx = start;
        loop {
            if !uncovered.contains(&idx) {
                cover.push(idx);
            }
            if idx == current {
                break;
            }
            idx = (idx + 1) % order;
        }
        cover
    }
}

impl CoverSolver for BranchAndBound {
    fn with_graph(graph: &IncidenceGraph) -> Self {
        Self {
            graph: graph.clone(),
            timeout: DEFAULT_TIMEOUT,
            seed: DEFAULT_SEED,
            tracer: None,
        }
    }

    fn compute(mut self) -> SearchOutcome {
        let order = self.graph.order();
        if order == 0 {
            return SearchOutcome {
                best: VertexCover::new(Vec::new()),
                trace: Vec::new(),
                proved_optimal: true,
            };
        }

        let upperbound = GreedyPairBound::compute(&self.graph);
        info!("greedy upper bound: {}", upperbound);

        let mut rng: StdRng = SeedableRng::seed_from_u64(self.seed);
        let start = rng.gen_range(0..order);
        debug!("starting vertex: {}", start);

        let mut timer = Timer::new(self.timeout);
        timer.init();

        let mut best = usize::MAX;
        let mut best_cover: Option<Vec<usize>> = None;
        let mut trace: Vec<TracePoint> = Vec::new();
        let mut uncovered: FxHashSet<usize> = FxHashSet::default();
        let mut undo_log: Vec<UndoEntry> = Vec::new();
        let mut stack: Vec<NodeState> = vec![
            NodeState::Covered {
                vertex: start,
                processed: false,
            },
            NodeState::Uncovered {
                vertex: start,
                processed: false,
            },
        ];

        let mut proved_optimal = true;
        while let Some(&top) = stack.last() {
            if timer.stop() {
                proved_optimal = false;
                break;
            }
            let mut current = top.vertex();

            // second visit of a state: revert and keep backtracking
            if top.processed() {
                Self::backtrack(&mut self.graph, &mut stack, &mut uncovered, &mut undo_log);
                continue;
            }
            let last = stack.len() - 1;
            stack[last] = top.as_processed();

            match top {
                NodeState::Covered { vertex, .. } => {
                    for edge in self.graph.connected_edges(vertex).to_vec() {
                        let neighbor = self.graph.opposite(vertex, edge);
                        undo_log.push((vertex, neighbor, edge));
                        self.graph.remove_edge(edge);
                        debug!("removed edge [{}]: ({}, {})", edge, vertex, neighbor);
                    }
                }
                NodeState::Uncovered { vertex, .. } => {
                    uncovered.insert(vertex);
                }
            }

            let unprocessed = cyclic_unprocessed(current, start, order);
            let covered = order - uncovered.len() - unprocessed;

            // zero edges left: the active path is a complete cover
            if self.graph.size() == 0 {
                if covered < best {
                    best = covered;
                    best_cover = Some(Self::covered_path(start, current, order, &uncovered));
                    let elapsed = timer.elapsed_secs();
                    trace.push(TracePoint {
                        elapsed_secs: elapsed,
                        size: best,
                    });
                    if let Some(tracer) = self.tracer.as_mut() {
                        tracer.improved(elapsed, best);
                    }
                    info!("new best: {}", best);
                }
                Self::backtrack(&mut self.graph, &mut stack, &mut uncovered, &mut undo_log);
                continue;
            }

            // cannot improve on the best known cover or the greedy bound
            if covered > best || covered > upperbound {
                Self::backtrack(&mut self.graph, &mut stack, &mut uncovered, &mut undo_log);
                continue;
            }

            current = (current + 1) % order;

            // leaving the next vertex uncovered is infeasible while a
            // remaining edge connects it to an uncovered vertex
            let has_uncovered_neighbor = self
                .graph
                .connected_edges(current)
                .iter()
                .any(|&edge| uncovered.contains(&self.graph.opposite(current, edge)));

            stack.push(NodeState::Covered {
                vertex: current,
                processed: false,
            });
            if !has_uncovered_neighbor {
                // pushed last, explored first
                stack.push(NodeState::Uncovered {
                    vertex: current,
                    processed: false,
                });
            }
        }

        let best = match best_cover {
            Some(vertices) => VertexCover::new(vertices),
            // nothing completed before the cutoff: the trivial full cover
            None => VertexCover::new((0..order).collect()),
        };
        SearchOutcome {
            best,
            trace,
            proved_optimal,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::exact::branch_and_bound::cyclic_unprocessed;
    use crate::exact::BranchAndBound;
    use crate::graph::IncidenceGraph;
    use crate::solver::CoverSolver;
    use std::time::Duration;

    fn solve(graph: &IncidenceGraph, seed: u64) -> crate::solver::SearchOutcome {
        BranchAndBound::with_graph(graph)
            .timeout(Duration::from_secs(60))
            .seed(seed)
            .compute()
    }

    #[test]
    fn cyclic_unprocessed_at_start() {
        // only the start vertex has been visited
        assert_eq!(cyclic_unprocessed(2, 2, 5), 4);
        assert_eq!(cyclic_unprocessed(0, 0, 1), 0);
    }

    #[test]
    fn cyclic_unprocessed_counts_down_along_the_path() {
        assert_eq!(cyclic_unprocessed(3, 2, 5), 3);
        assert_eq!(cyclic_unprocessed(4, 2, 5), 2);
        assert_eq!(cyclic_unprocessed(0, 2, 5), 1);
        // one step before wrapping back to the start: nothing left
        assert_eq!(cyclic_unprocessed(1, 2, 5), 0);
        assert_eq!(cyclic_unprocessed(4, 0, 5), 0);
    }

    #[test]
    fn four_cycle_converges_to_two() {
        let graph = IncidenceGraph::from_edges(4, &[(0, 1), (1, 2), (2, 3), (3, 0)]);
        let outcome = solve(&graph, 1337);
        assert_eq!(outcome.best.size(), 2);
        assert!(outcome.proved_optimal);
        assert!(graph.is_vertex_cover(outcome.best.vertices()));
    }

    #[test]
    fn triangle_converges_to_two() {
        let graph = IncidenceGraph::from_edges(3, &[(0, 1), (1, 2), (2, 0)]);
        let outcome = solve(&graph, 7);
        assert_eq!(outcome.best.size(), 2);
        assert!(graph.is_vertex_cover(outcome.best.vertices()));
    }

    #[test]
    fn star_converges_to_center_for_any_seed() {
        let graph = IncidenceGraph::from_edges(
            6,
            &[(0, 1), (0, 2), (0, 3), (0, 4), (0, 5)],
        );
        for seed in 0..8 {
            let outcome = solve(&graph, seed);
            assert_eq!(outcome.best.size(), 1, "seed {}", seed);
            assert_eq!(outcome.best.vertices(), &[0]);
        }
    }

    #[test]
    fn edgeless_graph_yields_empty_cover() {
        let graph = IncidenceGraph::from_edges(4, &[]);
        let outcome = solve(&graph, 3);
        assert_eq!(outcome.best.size(), 0);
        assert!(outcome.best.vertices().is_empty());
        assert!(outcome.proved_optimal);
    }

    #[test]
    fn zero_vertex_graph() {
        let graph = IncidenceGraph::from_edges(0, &[]);
        let outcome = solve(&graph, 0);
        assert_eq!(outcome.best.size(), 0);
        assert!(outcome.proved_optimal);
    }

    #[test]
    fn path_graph_converges() {
        // P5: optimal cover {1, 3}
        let graph = IncidenceGraph::from_edges(5, &[(0, 1), (1, 2), (2, 3), (3, 4)]);
        let outcome = solve(&graph, 11);
        assert_eq!(outcome.best.size(), 2);
        assert!(graph.is_vertex_cover(outcome.best.vertices()));
    }

    #[test]
    fn petersen_graph_converges_to_six() {
        let graph = IncidenceGraph::from_edges(
            10,
            &[
                (0, 1),
                (1, 2),
                (2, 3),
                (3, 4),
                (4, 0),
                (0, 5),
                (1, 6),
                (2, 7),
                (3, 8),
                (4, 9),
                (5, 7),
                (7, 9),
                (9, 6),
                (6, 8),
                (8, 5),
            ],
        );
        let outcome = solve(&graph, 99);
        assert_eq!(outcome.best.size(), 6);
        assert!(outcome.proved_optimal);
        assert!(graph.is_vertex_cover(outcome.best.vertices()));
    }

    #[test]
    fn trace_is_strictly_decreasing() {
        let graph = IncidenceGraph::from_edges(
            8,
            &[
                (0, 1),
                (1, 2),
                (2, 3),
                (3, 4),
                (4, 5),
                (5, 6),
                (6, 7),
                (7, 0),
                (0, 4),
                (1, 5),
            ],
        );
        let outcome = solve(&graph, 5);
        assert!(!outcome.trace.is_empty());
        for pair in outcome.trace.windows(2) {
            assert!(pair[1].size < pair[0].size);
        }
        assert_eq!(outcome.trace.last().unwrap().size, outcome.best.size());
    }

    #[test]
    fn graph_is_restored_after_search() {
        let edges = [(0, 1), (1, 2), (2, 3), (3, 0), (0, 2)];
        let graph = IncidenceGraph::from_edges(4, &edges);
        let outcome = solve(&graph, 21);
        // validity is checked against the original, unmutated edge set
        assert!(graph.is_vertex_cover(outcome.best.vertices()));
        assert_eq!(graph.size(), edges.len());
    }

    #[test]
    fn tracer_sees_every_improvement() {
        use crate::solver::{TracePoint, Tracer};
        use std::cell::RefCell;
        use std::rc::Rc;

        struct SharedTracer(Rc<RefCell<Vec<TracePoint>>>);
        impl Tracer for SharedTracer {
            fn improved(&mut self, elapsed_secs: f64, size: usize) {
                self.0.borrow_mut().push(TracePoint { elapsed_secs, size });
            }
        }

        let graph = IncidenceGraph::from_edges(5, &[(0, 1), (1, 2), (2, 3), (3, 4), (4, 0)]);
        let sink = Rc::new(RefCell::new(Vec::new()));
        let outcome = BranchAndBound::with_graph(&graph)
            .timeout(Duration::from_secs(60))
            .seed(13)
            .tracer(Box::new(SharedTracer(sink.clone())))
            .compute();
        assert_eq!(*sink.borrow(), outcome.trace);
    }

    #[test]
    fn expired_timer_still_returns_a_valid_cover() {
        let graph = IncidenceGraph::from_edges(4, &[(0, 1), (1, 2), (2, 3), (3, 0)]);
        let outcome = BranchAndBound::with_graph(&graph)
            .timeout(Duration::from_secs(0))
            .seed(1)
            .compute();
        assert!(graph.is_vertex_cover(outcome.best.vertices()));
        assert!(!outcome.proved_optimal);
    }
}
