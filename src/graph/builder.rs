//! Graph construction module

use crate::graph::CompressedGraph;
use std::collections::{HashMap, HashSet};

/// Builder for incrementally constructing a CompressedGraph
pub struct GraphBuilder {
    /// Whether the finished graph is directed
    directed: bool,

    /// Drop repeated (source, target) pairs instead of keeping parallel edges
    dedup: bool,

    /// Mapping from string IDs to node indices
    id_to_index: HashMap<String, u32>,

    /// Node string IDs
    node_ids: Vec<String>,

    /// Edges in insertion order
    edges: Vec<(u32, u32, f64)>,

    /// Pairs seen so far, only tracked when deduplicating
    seen: HashSet<(u32, u32)>,
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::with_capacity(0)
    }
}

impl GraphBuilder {
    /// Create a new directed graph builder with the given node capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            directed: true,
            dedup: false,
            id_to_index: HashMap::with_capacity(capacity),
            node_ids: Vec::with_capacity(capacity),
            edges: Vec::new(),
            seen: HashSet::new(),
        }
    }

    /// Build an undirected graph instead
    pub fn undirected(mut self) -> Self {
        self.directed = false;
        self
    }

    /// Keep only the first edge of each (source, target) pair
    pub fn dedup(mut self, dedup: bool) -> Self {
        self.dedup = dedup;
        self
    }

    pub fn node_count(&self) -> usize {
        self.node_ids.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Get or create a node ID for the given string ID
    pub fn get_or_create_node(&mut self, id: &str) -> u32 {
        if let Some(&idx) = self.id_to_index.get(id) {
            return idx;
        }

        let idx = self.node_ids.len() as u32;
        self.id_to_index.insert(id.to_string(), idx);
        self.node_ids.push(id.to_string());

        idx
    }

    /// Add an unweighted (weight 1.0) edge from one node to another
    pub fn add_edge(&mut self, src_id: &str, dst_id: &str) {
        self.add_weighted_edge(src_id, dst_id, 1.0);
    }

    /// Add a weighted edge. Weights are not validated.
    pub fn add_weighted_edge(&mut self, src_id: &str, dst_id: &str, weight: f64) {
        let src_idx = self.get_or_create_node(src_id);
        let dst_idx = self.get_or_create_node(dst_id);

        if self.dedup {
            let key = if self.directed || src_idx <= dst_idx {
                (src_idx, dst_idx)
            } else {
                (dst_idx, src_idx)
            };
            if !self.seen.insert(key) {
                return;
            }
        }

        self.edges.push((src_idx, dst_idx, weight));
    }

    /// Build the compressed graph
    pub fn build(self) -> CompressedGraph {
        log::debug!(
            "Building {} graph with {} nodes and {} edges",
            if self.directed { "directed" } else { "undirected" },
            self.node_ids.len(),
            self.edges.len()
        );

        CompressedGraph::from_edges(self.node_ids.len(), self.directed, &self.edges)
            .with_node_ids(self.node_ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_assigns_indices_in_order() {
        let mut builder = GraphBuilder::with_capacity(4);
        builder.add_edge("x", "y");
        builder.add_weighted_edge("y", "z", 2.5);
        builder.add_edge("x", "y");

        assert_eq!(builder.node_count(), 3);
        let graph = builder.build();
        assert_eq!(graph.index_of("z"), Some(2));
        assert_eq!(graph.edge_count(), 3);
        assert_eq!(graph.edge_weight(0, 1), 2.0);
        assert_eq!(graph.edge_weight(1, 2), 2.5);
    }

    #[test]
    fn test_builder_dedup() {
        let mut builder = GraphBuilder::default().dedup(true);
        builder.add_edge("a", "b");
        builder.add_edge("a", "b");
        builder.add_edge("b", "a");
        assert_eq!(builder.build().edge_count(), 2);

        let mut builder = GraphBuilder::default().undirected().dedup(true);
        builder.add_edge("a", "b");
        builder.add_edge("b", "a");
        let graph = builder.build();
        assert!(!graph.is_directed());
        assert_eq!(graph.edge_count(), 1);
    }
}
