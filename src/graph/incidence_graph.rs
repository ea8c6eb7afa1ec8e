use crate::datastructures::BitSet;
use fxhash::FxHashMap;
use std::cmp::{max, min};

/// Undirected graph with stable integer edge identifiers.
///
/// Adjacency is edge-id-indexed: each vertex holds the list of edge ids
/// currently touching it, and a single map carries edge id to endpoint
/// pair. Edges can be removed and later reinserted under their original
/// identifier, which is what the branch and bound undo log relies on.
/// Removal never renumbers surviving edges.
///
/// The original adjacency from construction time is kept alongside the
/// mutable incidence lists; the metaheuristics score their bitfield
/// candidates against that unmutated neighborhood structure.
///
/// Vertex and edge ids outside the current bounds are invariant
/// violations and panic. The search machinery keeps the structure
/// consistent by construction, so such a lookup is never recoverable.
#[derive(Clone, Debug)]
pub struct IncidenceGraph {
    incidence: Vec<Vec<usize>>,
    endpoints: FxHashMap<usize, (usize, usize)>,
    neighbors: Vec<Vec<usize>>,
    edge_capacity: usize,
    num_edges: usize,
}

impl IncidenceGraph {
    /// Builds the graph from 0-based adjacency lists, one row per vertex.
    /// Both directions of every edge must be present. Edge ids are handed
    /// out in discovery order, keyed by the canonical `(min, max)`
    /// endpoint pair so the reverse direction reuses the same id.
    pub fn from_adjacency(adjacency: Vec<Vec<usize>>) -> Self {
        let order = adjacency.len();
        let mut incidence: Vec<Vec<usize>> = Vec::with_capacity(order);
        let mut endpoints: FxHashMap<usize, (usize, usize)> = FxHashMap::default();
        let mut lookup: FxHashMap<(usize, usize), usize> = FxHashMap::default();
        let mut next_edge = 0;

        for (u, row) in adjacency.iter().enumerate() {
            let mut connected: Vec<usize> = Vec::with_capacity(row.len());
            for &v in row {
                assert!(v < order, "neighbor {} out of range for order {}", v, order);
                let key = (min(u, v), max(u, v));
                let edge = *lookup.entry(key).or_insert_with(|| {
                    let edge = next_edge;
                    next_edge += 1;
                    endpoints.insert(edge, key);
                    edge
                });
                connected.push(edge);
            }
            incidence.push(connected);
        }

        Self {
            incidence,
            endpoints,
            neighbors: adjacency,
            edge_capacity: next_edge,
            num_edges: next_edge,
        }
    }

    /// Convenience constructor from an explicit edge list.
    pub fn from_edges(order: usize, edges: &[(usize, usize)]) -> Self {
        let mut adjacency = vec![Vec::new(); order];
        for &(u, v) in edges {
            adjacency[u].push(v);
            adjacency[v].push(u);
        }
        Self::from_adjacency(adjacency)
    }

    /// Number of vertices. Fixed at construction.
    pub fn order(&self) -> usize {
        self.incidence.len()
    }

    /// Number of edges currently present.
    pub fn size(&self) -> usize {
        self.num_edges
    }

    /// Largest edge id ever handed out plus one. Removed edges keep their
    /// slot in this id space.
    pub fn edge_capacity(&self) -> usize {
        self.edge_capacity
    }

    /// Edge ids currently touching `vertex`.
    pub fn connected_edges(&self, vertex: usize) -> &[usize] {
        &self.incidence[vertex]
    }

    /// Neighbor list of `vertex` in the original, unmutated graph.
    pub fn neighbors(&self, vertex: usize) -> &[usize] {
        &self.neighbors[vertex]
    }

    pub fn degree(&self, vertex: usize) -> usize {
        self.incidence[vertex].len()
    }

    /// Endpoint pair of a currently present edge.
    pub fn endpoints(&self, edge: usize) -> (usize, usize) {
        *self
            .endpoints
            .get(&edge)
            .unwrap_or_else(|| panic!("edge {} is not present", edge))
    }

    /// The endpoint of `edge` that is not `vertex`.
    pub fn opposite(&self, vertex: usize, edge: usize) -> usize {
        let (u, v) = self.endpoints(edge);
        if u == vertex {
            v
        } else {
            u
        }
    }

    pub fn has_edge(&self, u: usize, v: usize) -> bool {
        self.incidence[u].iter().any(|&edge| {
            let (a, b) = self.endpoints(edge);
            (a == u && b == v) || (a == v && b == u)
        })
    }

    /// Removes a currently present edge from both endpoints' incidence
    /// lists and from the edge map. O(degree) per endpoint. The edge can
    /// later be reinserted under the same id with [`add_edge`].
    ///
    /// [`add_edge`]: IncidenceGraph::add_edge
    pub fn remove_edge(&mut self, edge: usize) {
        let (u, v) = self.endpoints(edge);
        Self::detach(&mut self.incidence[u], edge);
        Self::detach(&mut self.incidence[v], edge);
        self.endpoints.remove(&edge);
        self.num_edges -= 1;
    }

    /// Reinserts a previously removed edge under its original identifier.
    /// Incidence list order is not restored; cover validity does not
    /// depend on it.
    pub fn add_edge(&mut self, edge: usize, (u, v): (usize, usize)) {
        debug_assert!(
            !self.endpoints.contains_key(&edge),
            "edge {} is already present",
            edge
        );
        self.incidence[u].push(edge);
        self.incidence[v].push(edge);
        self.endpoints.insert(edge, (u, v));
        self.num_edges += 1;
    }

    /// True iff every currently present edge has at least one endpoint in
    /// `vertices`. Marks all edges touching the given vertices, then
    /// checks full coverage.
    pub fn is_vertex_cover(&self, vertices: &[usize]) -> bool {
        let mut marked = BitSet::new(self.edge_capacity);
        for &v in vertices {
            for &edge in &self.incidence[v] {
                marked.set_bit(edge);
            }
        }
        self.endpoints.keys().all(|&edge| marked.get_bit(edge))
    }

    /// Cover query for a vertex bitfield, reporting the number of vertices
    /// in use and the number of edges left uncovered.
    pub fn cover_check(&self, bits: &BitSet) -> CoverCheck {
        let mut marked = BitSet::new(self.edge_capacity);
        for v in bits.iter() {
            for &edge in &self.incidence[v] {
                marked.set_bit(edge);
            }
        }
        let uncovered_edges = self
            .endpoints
            .keys()
            .filter(|&&edge| !marked.get_bit(edge))
            .count();
        CoverCheck {
            is_cover: uncovered_edges == 0,
            vertices_used: bits.cardinality(),
            uncovered_edges,
        }
    }

    /// Marginal number of uncovered edges caused (or fixed) by flipping
    /// `vertex` in the bitfield, evaluated against the original adjacency.
    /// Negative when the flip would newly cover edges.
    pub fn flip_cost(&self, bits: &BitSet, vertex: usize) -> i64 {
        let affected = self.neighbors[vertex]
            .iter()
            .filter(|&&n| !bits.get_bit(n))
            .count() as i64;
        if bits.get_bit(vertex) {
            affected
        } else {
            -affected
        }
    }

    fn detach(connected: &mut Vec<usize>, edge: usize) {
        let pos = connected
            .iter()
            .position(|&e| e == edge)
            .unwrap_or_else(|| panic!("edge {} missing from incidence list", edge));
        connected.swap_remove(pos);
    }
}

/// Result of a bitfield cover query.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CoverCheck {
    pub is_cover: bool,
    pub vertices_used: usize,
    pub uncovered_edges: usize,
}
