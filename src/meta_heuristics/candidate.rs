use crate::datastructures::BitSet;
use crate::graph::IncidenceGraph;

/// Bitfield representation of a (potential) vertex cover, together with
/// the cached result of its last cover query. Both metaheuristics operate
/// on candidates; only [`evaluate`] and [`flip`] refresh the cache.
///
/// [`evaluate`]: Candidate::evaluate
/// [`flip`]: Candidate::flip
#[derive(Clone, Debug)]
pub struct Candidate {
    pub bits: BitSet,
    pub score: f64,
    pub vertices_used: usize,
    pub is_cover: bool,
}

impl Candidate {
    /// The trivial cover using every vertex. Always feasible, so both
    /// metaheuristics seed their populations with it.
    pub fn full_cover(order: usize) -> Self {
        Self {
            bits: BitSet::new_all_set(order),
            score: 1.0,
            vertices_used: order,
            is_cover: true,
        }
    }

    /// Recomputes the fitness score. The penalty counts every vertex in
    /// use and adds `order` per uncovered edge, squared, so infeasible
    /// candidates are dominated by feasible ones; the score is the
    /// inverse, scaled by `order` (larger is better).
    pub fn evaluate(&mut self, graph: &IncidenceGraph) {
        let check = graph.cover_check(&self.bits);
        self.vertices_used = check.vertices_used;
        self.is_cover = check.is_cover;
        let order = self.bits.len() as f64;
        let penalty =
            check.vertices_used as f64 + (check.uncovered_edges as f64).powi(2) * order;
        self.score = order / penalty;
    }

    /// Flips one vertex bit and refreshes the feasibility cache.
    pub fn flip(&mut self, graph: &IncidenceGraph, vertex: usize) {
        self.bits.flip_bit(vertex);
        let check = graph.cover_check(&self.bits);
        self.vertices_used = check.vertices_used;
        self.is_cover = check.is_cover;
    }

    /// Single-point crossover: swaps the bit tails of both candidates
    /// from `position` on. Cached scores go stale; callers re-evaluate at
    /// the start of the next cycle.
    pub fn crossover(&mut self, other: &mut Candidate, position: usize) {
        for i in position..self.bits.len() {
            let a = self.bits.get_bit(i);
            let b = other.bits.get_bit(i);
            if a != b {
                self.bits.flip_bit(i);
                other.bits.flip_bit(i);
            }
        }
    }

    pub fn vertices(&self) -> Vec<usize> {
        self.bits.to_vec()
    }
}
