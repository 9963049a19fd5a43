//! ID-keyed lookups over a built graph.
//!
//! Unknown IDs behave like isolated nodes: empty neighbor lists and zero
//! degrees. Only callers that need a node to exist (ego extraction) treat
//! an unknown ID as an error.

use crate::graph::CompressedGraph;

impl CompressedGraph {
    pub fn contains(&self, id: &str) -> bool {
        self.id_index.contains_key(id)
    }

    /// IDs of the nodes `id` points to
    pub fn neighbors_out(&self, id: &str) -> Vec<&str> {
        match self.index_of(id) {
            Some(idx) => self.resolve(self.successors(idx as usize)),
            None => Vec::new(),
        }
    }

    /// IDs of the nodes pointing to `id`
    pub fn neighbors_in(&self, id: &str) -> Vec<&str> {
        match self.index_of(id) {
            Some(idx) => self.resolve(self.predecessors(idx as usize)),
            None => Vec::new(),
        }
    }

    pub fn degree_out(&self, id: &str) -> usize {
        self.index_of(id).map_or(0, |idx| self.out_degree(idx as usize))
    }

    pub fn degree_in(&self, id: &str) -> usize {
        self.index_of(id).map_or(0, |idx| self.in_degree(idx as usize))
    }

    pub fn degree_total(&self, id: &str) -> usize {
        self.index_of(id).map_or(0, |idx| self.degree(idx as usize))
    }

    /// Whether an edge `src -> dst` exists (either direction when undirected)
    pub fn has_edge_between(&self, src: &str, dst: &str) -> bool {
        match (self.index_of(src), self.index_of(dst)) {
            (Some(s), Some(d)) => self.has_edge(s as usize, d),
            _ => false,
        }
    }

    fn resolve(&self, nodes: impl Iterator<Item = u32>) -> Vec<&str> {
        nodes.filter_map(|n| self.node_id(n)).collect()
    }
}

#[cfg(test)]
mod tests {
    use crate::graph::GraphBuilder;

    #[test]
    fn test_lookups_by_id() {
        let mut builder = GraphBuilder::default();
        builder.add_edge("alice", "bob");
        builder.add_edge("carol", "alice");
        builder.add_edge("alice", "carol");
        let graph = builder.build();

        assert_eq!(graph.neighbors_out("alice"), vec!["bob", "carol"]);
        assert_eq!(graph.neighbors_in("alice"), vec!["carol"]);
        assert_eq!(graph.degree_out("alice"), 2);
        assert_eq!(graph.degree_in("alice"), 1);
        assert_eq!(graph.degree_total("alice"), 3);
        assert!(graph.has_edge_between("carol", "alice"));
        assert!(!graph.has_edge_between("bob", "alice"));
    }

    #[test]
    fn test_unknown_node_is_empty() {
        let graph = GraphBuilder::default().build();
        assert!(graph.neighbors_out("ghost").is_empty());
        assert!(graph.neighbors_in("ghost").is_empty());
        assert_eq!(graph.degree_total("ghost"), 0);
        assert!(!graph.contains("ghost"));
    }
}
