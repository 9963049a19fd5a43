//! Induced subgraph extraction

use crate::graph::CompressedGraph;
use std::collections::HashMap;

/// Extract the subgraph induced by `members`.
///
/// Node `i` of the result corresponds to `members[i]` in `graph`; every
/// edge of `graph` with both endpoints in `members` is kept, parallel
/// edges and self-loops included. Node IDs are not copied.
pub fn induced_subgraph(graph: &CompressedGraph, members: &[u32]) -> CompressedGraph {
    // Create mapping from original to subgraph indices
    let orig_to_sub: HashMap<u32, u32> = members
        .iter()
        .enumerate()
        .map(|(i, &node)| (node, i as u32))
        .collect();

    let mut edges = Vec::new();
    for (sub_src, &node) in members.iter().enumerate() {
        let targets = graph.outgoing_edges(node as usize);
        let weights = graph.outgoing_weights(node as usize);

        for (&target, &w) in targets.iter().zip(weights) {
            // Only include edges where both endpoints are in the subgraph
            if let Some(&sub_dst) = orig_to_sub.get(&target) {
                edges.push((sub_src as u32, sub_dst, w));
            }
        }
    }

    CompressedGraph::from_edges(members.len(), graph.directed, &edges)
}
