use crate::graph::IncidenceGraph;

pub trait UpperboundHeuristic {
    fn compute(graph: &IncidenceGraph) -> usize;
}

/// Greedy maximal-matching style upper bound on the minimum cover size.
///
/// Sweeps the vertices once on a disposable copy of the graph: any vertex
/// that still has an edge is paired with one neighbor, every edge touching
/// either endpoint is stripped, and the pair counts as two covered
/// vertices. Each stripped edge touches one of the two chosen vertices, so
/// twice the number of pairings is a valid (not necessarily tight) bound.
/// The bound seeds pruning in the exact search and is never refined.
pub struct GreedyPairBound {}

impl UpperboundHeuristic for GreedyPairBound {
    fn compute(graph: &IncidenceGraph) -> usize {
        let mut graph = graph.clone();
        let mut iterations = 0;
        for vertex in 0..graph.order() {
            if graph.size() == 0 {
                break;
            }
            let edges = graph.connected_edges(vertex).to_vec();
            if edges.is_empty() {
                continue;
            }
            let neighbor = graph.opposite(vertex, edges[0]);
            for edge in edges {
                graph.remove_edge(edge);
            }
            for edge in graph.connected_edges(neighbor).to_vec() {
                graph.remove_edge(edge);
            }
            iterations += 1;
        }
        iterations * 2
    }
}

#[cfg(test)]
mod tests {
    use crate::graph::IncidenceGraph;
    use crate::upperbound::{GreedyPairBound, UpperboundHeuristic};

    #[test]
    fn edgeless_graph_has_zero_bound() {
        let graph = IncidenceGraph::from_edges(5, &[]);
        assert_eq!(GreedyPairBound::compute(&graph), 0);
    }

    #[test]
    fn single_edge() {
        let graph = IncidenceGraph::from_edges(2, &[(0, 1)]);
        assert_eq!(GreedyPairBound::compute(&graph), 2);
    }

    #[test]
    fn star_is_covered_by_one_pair() {
        let graph = IncidenceGraph::from_edges(6, &[(0, 1), (0, 2), (0, 3), (0, 4), (0, 5)]);
        assert_eq!(GreedyPairBound::compute(&graph), 2);
    }

    #[test]
    fn bound_is_valid_and_even() {
        // 4-cycle: minimum cover is 2
        let graph = IncidenceGraph::from_edges(4, &[(0, 1), (1, 2), (2, 3), (3, 0)]);
        let bound = GreedyPairBound::compute(&graph);
        assert!(bound >= 2);
        assert_eq!(bound % 2, 0);

        // triangle: minimum cover is 2
        let graph = IncidenceGraph::from_edges(3, &[(0, 1), (1, 2), (2, 0)]);
        let bound = GreedyPairBound::compute(&graph);
        assert!(bound >= 2);
        assert_eq!(bound % 2, 0);
    }

    #[test]
    fn operates_on_a_disposable_copy() {
        let graph = IncidenceGraph::from_edges(4, &[(0, 1), (1, 2), (2, 3), (3, 0)]);
        GreedyPairBound::compute(&graph);
        assert_eq!(graph.size(), 4);
    }
}
