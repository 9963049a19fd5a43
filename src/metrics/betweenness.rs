//! Betweenness centrality (Brandes) on unweighted hops.
//!
//! Paths follow edge direction on directed graphs. Scores are normalized
//! by `1 / ((n - 1)(n - 2))`; graphs with fewer than three nodes score 0.

use crate::graph::traversal::single_source_shortest_paths;
use crate::graph::CompressedGraph;
use std::collections::HashMap;

/// Centrality scores keyed by node index
pub type Centrality = HashMap<u32, f64>;

/// Betweenness centrality of every node
pub fn betweenness_centrality(graph: &CompressedGraph) -> Centrality {
    let n = graph.node_count;
    if n <= 2 {
        return (0..n as u32).map(|node| (node, 0.0)).collect();
    }

    let mut betweenness = vec![0.0f64; n];

    for s in 0..n as u32 {
        let paths = single_source_shortest_paths(graph, s);
        let mut delta = vec![0.0f64; n];

        for &w in paths.order.iter().rev() {
            let wi = w as usize;
            let sigma_w = paths.sigma[wi];
            for &v in &paths.predecessors[wi] {
                if sigma_w > 0.0 {
                    delta[v as usize] += (paths.sigma[v as usize] / sigma_w) * (1.0 + delta[wi]);
                }
            }
            if w != s {
                betweenness[wi] += delta[wi];
            }
        }
    }

    let norm = 1.0 / ((n - 1) * (n - 2)) as f64;
    betweenness
        .into_iter()
        .enumerate()
        .map(|(node, b)| (node as u32, b * norm))
        .collect()
}

/// Betweenness of a single node, 0 when it is not in the graph
pub fn betweenness_of(graph: &CompressedGraph, node: u32) -> f64 {
    betweenness_centrality(graph).get(&node).copied().unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_graph_middle_is_highest() {
        // 0 -> 1 -> 2 -> 3
        let g = CompressedGraph::from_edges(4, true, &[(0, 1, 1.0), (1, 2, 1.0), (2, 3, 1.0)]);
        let bc = betweenness_centrality(&g);

        assert_eq!(bc[&0], 0.0);
        assert_eq!(bc[&3], 0.0);
        // 1 lies on 0->2 and 0->3
        assert!((bc[&1] - 2.0 / 6.0).abs() < 1e-12);
        assert!((bc[&2] - 2.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_undirected_star_center() {
        // Center 0 with three leaves: every leaf pair routes through it
        let g = CompressedGraph::from_edges(4, false, &[(0, 1, 1.0), (0, 2, 1.0), (0, 3, 1.0)]);
        let bc = betweenness_centrality(&g);
        assert!((bc[&0] - 1.0).abs() < 1e-12);
        assert_eq!(bc[&1], 0.0);
    }

    #[test]
    fn test_small_graphs_score_zero() {
        let g = CompressedGraph::from_edges(2, true, &[(0, 1, 1.0)]);
        assert_eq!(betweenness_of(&g, 0), 0.0);
        assert_eq!(betweenness_of(&g, 9), 0.0);
    }
}
