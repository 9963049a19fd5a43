//! Density, clustering and neighbor-degree calculators

use crate::graph::CompressedGraph;
use itertools::Itertools;

/// Calculate density (actual edges / potential edges).
///
/// Potential edges are `n * (n - 1)` for a directed graph and half that for
/// an undirected one. Graphs with at most one node have density 0.
pub fn calculate_density(graph: &CompressedGraph) -> f64 {
    let n = graph.node_count;
    if n <= 1 {
        return 0.0;
    }

    let potential_edges = if graph.directed {
        (n * (n - 1)) as f64
    } else {
        (n * (n - 1)) as f64 / 2.0
    };

    graph.edge_count() as f64 / potential_edges
}

/// Local clustering coefficient of `node`.
///
/// Neighbors are the distinct nodes adjacent in either direction; a pair of
/// neighbors counts as connected if an edge joins them either way.
pub fn clustering_coefficient(graph: &CompressedGraph, node: u32) -> f64 {
    let neighbors = graph.distinct_neighbors(node as usize);
    let k = neighbors.len();
    if k < 2 {
        return 0.0;
    }

    let linked = neighbors
        .iter()
        .tuple_combinations()
        .filter(|&(&u, &v)| graph.has_edge(u as usize, v) || graph.has_edge(v as usize, u))
        .count();

    let possible = (k * (k - 1)) as f64 / 2.0;
    linked as f64 / possible
}

/// Mean total degree of the distinct neighbors of `node`, 0 without neighbors
pub fn average_neighbor_degree(graph: &CompressedGraph, node: u32) -> f64 {
    let neighbors = graph.distinct_neighbors(node as usize);
    if neighbors.is_empty() {
        return 0.0;
    }

    let total: usize = neighbors.iter().map(|&n| graph.degree(n as usize)).sum();
    total as f64 / neighbors.len() as f64
}
