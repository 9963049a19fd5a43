//! Weighted modularity of a partition.
//!
//! `Q = norm * Σ_c Σ_{u,v ∈ c} [w(u,v) - k_out(u) k_in(v) norm]` with
//! `norm = 1/m` on directed graphs and `1/(2m)` on undirected ones. On an
//! undirected graph both degrees are the plain weighted degree and a
//! self-loop contributes twice its weight. A graph with no edge weight has
//! modularity 0.

use crate::community::Partition;
use crate::graph::CompressedGraph;

/// Modularity of `partition` over `graph`.
///
/// The double sum is evaluated per community in O(E + n): the edge term is
/// the intra-community weight and the null-model term factors into
/// `Σ_c K_out(c) · K_in(c)`.
pub fn modularity(graph: &CompressedGraph, partition: &Partition) -> f64 {
    let m = graph.total_weight();
    if m == 0.0 {
        return 0.0;
    }

    let labels = partition.assignment(graph.node_count);
    let communities = partition.len();

    let mut intra = vec![0.0f64; communities];
    for (src, dst, w) in graph.edge_triples() {
        let c = labels[src as usize];
        if c == labels[dst as usize] {
            // Undirected edges appear as w(u,v) and w(v,u); self-loops are doubled
            intra[c] += if graph.directed { w } else { 2.0 * w };
        }
    }

    let mut k_out = vec![0.0f64; communities];
    let mut k_in = vec![0.0f64; communities];
    for node in 0..graph.node_count {
        let c = labels[node];
        k_out[c] += graph.out_weight(node);
        k_in[c] += graph.in_weight(node);
    }

    let norm = if graph.directed { 1.0 / m } else { 1.0 / (2.0 * m) };

    let q: f64 = (0..communities)
        .map(|c| intra[c] - k_out[c] * k_in[c] * norm)
        .sum();

    q * norm
}
