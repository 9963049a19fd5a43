//! Memory-efficient graph representation

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::mem;

/// Compressed sparse representation of a weighted multigraph.
///
/// Edges are stored twice: once in the forward (source-major) arrays and
/// once in the reverse (target-major) arrays, so both neighbor directions
/// are a slice lookup. Each adjacency row is sorted by neighbor index;
/// parallel edges appear as repeated entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompressedGraph {
    /// Number of nodes in the graph
    pub node_count: usize,

    /// Whether edges are directed
    pub directed: bool,

    /// Offset array: offsets[i] to offsets[i+1] defines the out-edge range for node i
    pub offsets: Vec<u32>,

    /// Edge array: concatenated lists of target nodes
    pub edges: Vec<u32>,

    /// Edge weights, parallel to `edges`
    pub weights: Vec<f64>,

    /// Reverse offsets: in-edge range per node
    pub in_offsets: Vec<u32>,

    /// Reverse edge array: concatenated lists of source nodes
    pub in_edges: Vec<u32>,

    /// Reverse edge weights, parallel to `in_edges`
    pub in_weights: Vec<f64>,

    /// Optional mapping from internal node IDs to original string IDs
    pub node_ids: Option<Vec<String>>,

    /// Reverse lookup from string ID to node index
    #[serde(default)]
    pub id_index: HashMap<String, u32>,
}

impl CompressedGraph {
    /// Build a graph from an explicit `(source, target, weight)` list over
    /// nodes `0..node_count`.
    pub fn from_edges(node_count: usize, directed: bool, edge_list: &[(u32, u32, f64)]) -> Self {
        let (offsets, edges, weights) =
            build_rows(node_count, edge_list.iter().map(|&(src, dst, w)| (src, dst, w)));
        let (in_offsets, in_edges, in_weights) =
            build_rows(node_count, edge_list.iter().map(|&(src, dst, w)| (dst, src, w)));

        Self {
            node_count,
            directed,
            offsets,
            edges,
            weights,
            in_offsets,
            in_edges,
            in_weights,
            node_ids: None,
            id_index: HashMap::new(),
        }
    }

    /// Attach string IDs to the nodes (index i gets `ids[i]`).
    pub fn with_node_ids(mut self, ids: Vec<String>) -> Self {
        self.id_index = ids
            .iter()
            .enumerate()
            .map(|(idx, id)| (id.clone(), idx as u32))
            .collect();
        self.node_ids = Some(ids);
        self
    }

    pub fn is_directed(&self) -> bool {
        self.directed
    }

    /// Number of stored edges, parallel edges and self-loops included
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Look up the index of a string node ID
    pub fn index_of(&self, id: &str) -> Option<u32> {
        self.id_index.get(id).copied()
    }

    /// Resolve a node index back to its string ID
    pub fn node_id(&self, node: u32) -> Option<&str> {
        self.node_ids
            .as_ref()
            .and_then(|ids| ids.get(node as usize))
            .map(String::as_str)
    }

    /// Get outgoing edges for a node
    pub fn outgoing_edges(&self, node: usize) -> &[u32] {
        let start = self.offsets[node] as usize;
        let end = self.offsets[node + 1] as usize;
        &self.edges[start..end]
    }

    /// Weights of the outgoing edges, aligned with `outgoing_edges`
    pub fn outgoing_weights(&self, node: usize) -> &[f64] {
        let start = self.offsets[node] as usize;
        let end = self.offsets[node + 1] as usize;
        &self.weights[start..end]
    }

    /// Get incoming edges (sources) for a node
    pub fn incoming_edges(&self, node: usize) -> &[u32] {
        let start = self.in_offsets[node] as usize;
        let end = self.in_offsets[node + 1] as usize;
        &self.in_edges[start..end]
    }

    /// Weights of the incoming edges, aligned with `incoming_edges`
    pub fn incoming_weights(&self, node: usize) -> &[f64] {
        let start = self.in_offsets[node] as usize;
        let end = self.in_offsets[node + 1] as usize;
        &self.in_weights[start..end]
    }

    /// Successors of a node. In an undirected graph every neighbor is a successor.
    pub fn successors(&self, node: usize) -> impl Iterator<Item = u32> + '_ {
        let reverse: &[u32] = if self.directed { &[] } else { self.incoming_edges(node) };
        self.outgoing_edges(node).iter().chain(reverse.iter()).copied()
    }

    /// Predecessors of a node. In an undirected graph every neighbor is a predecessor.
    pub fn predecessors(&self, node: usize) -> impl Iterator<Item = u32> + '_ {
        let forward: &[u32] = if self.directed { &[] } else { self.outgoing_edges(node) };
        self.incoming_edges(node).iter().chain(forward.iter()).copied()
    }

    /// All adjacent nodes regardless of direction; self-loops appear twice
    pub fn neighbors(&self, node: usize) -> impl Iterator<Item = u32> + '_ {
        self.outgoing_edges(node)
            .iter()
            .chain(self.incoming_edges(node).iter())
            .copied()
    }

    /// Distinct adjacent nodes in either direction, excluding the node itself
    pub fn distinct_neighbors(&self, node: usize) -> Vec<u32> {
        let mut neighbors: Vec<u32> = self
            .neighbors(node)
            .filter(|&n| n as usize != node)
            .collect();
        neighbors.sort_unstable();
        neighbors.dedup();
        neighbors
    }

    /// Get out-degree of a node
    pub fn out_degree(&self, node: usize) -> usize {
        if self.directed {
            (self.offsets[node + 1] - self.offsets[node]) as usize
        } else {
            self.degree(node)
        }
    }

    /// Get in-degree of a node
    pub fn in_degree(&self, node: usize) -> usize {
        if self.directed {
            (self.in_offsets[node + 1] - self.in_offsets[node]) as usize
        } else {
            self.degree(node)
        }
    }

    /// Total degree: in + out for directed graphs, incident edge count for
    /// undirected graphs (self-loops counted twice in both cases)
    pub fn degree(&self, node: usize) -> usize {
        let out = (self.offsets[node + 1] - self.offsets[node]) as usize;
        let inc = (self.in_offsets[node + 1] - self.in_offsets[node]) as usize;
        out + inc
    }

    /// Weighted out-degree (plain weighted degree when undirected)
    pub fn out_weight(&self, node: usize) -> f64 {
        if self.directed {
            self.outgoing_weights(node).iter().sum()
        } else {
            self.weighted_degree(node)
        }
    }

    /// Weighted in-degree (plain weighted degree when undirected)
    pub fn in_weight(&self, node: usize) -> f64 {
        if self.directed {
            self.incoming_weights(node).iter().sum()
        } else {
            self.weighted_degree(node)
        }
    }

    /// Sum of the weights of all incident edges, self-loops counted twice
    pub fn weighted_degree(&self, node: usize) -> f64 {
        self.outgoing_weights(node).iter().sum::<f64>()
            + self.incoming_weights(node).iter().sum::<f64>()
    }

    /// Check if there's an edge from src to dst (either way when undirected)
    pub fn has_edge(&self, src: usize, dst: u32) -> bool {
        let edges = self.outgoing_edges(src);
        if edges.binary_search(&dst).is_ok() {
            return true;
        }
        !self.directed && self.outgoing_edges(dst as usize).binary_search(&(src as u32)).is_ok()
    }

    /// Summed weight of all parallel edges from src to dst.
    ///
    /// For undirected graphs this also includes edges stored as dst -> src,
    /// except for self-loops which are only stored once.
    pub fn edge_weight(&self, src: usize, dst: u32) -> f64 {
        let forward = row_weight(self.outgoing_edges(src), self.outgoing_weights(src), dst);
        if self.directed || src == dst as usize {
            return forward;
        }
        let dst = dst as usize;
        forward + row_weight(self.outgoing_edges(dst), self.outgoing_weights(dst), src as u32)
    }

    /// Total edge weight when `weighted`, otherwise the edge count
    pub fn size(&self, weighted: bool) -> f64 {
        if weighted {
            self.total_weight()
        } else {
            self.edge_count() as f64
        }
    }

    /// Sum of all edge weights
    pub fn total_weight(&self) -> f64 {
        self.weights.iter().sum()
    }

    /// Iterate over every stored edge as `(source, target, weight)`
    pub fn edge_triples(&self) -> impl Iterator<Item = (u32, u32, f64)> + '_ {
        (0..self.node_count).flat_map(move |src| {
            self.outgoing_edges(src)
                .iter()
                .zip(self.outgoing_weights(src))
                .map(move |(&dst, &w)| (src as u32, dst, w))
        })
    }

    /// Estimate memory usage in bytes
    pub fn memory_usage(&self) -> usize {
        let base = mem::size_of::<Self>();
        let offsets =
            (self.offsets.capacity() + self.in_offsets.capacity()) * mem::size_of::<u32>();
        let edges = (self.edges.capacity() + self.in_edges.capacity()) * mem::size_of::<u32>();
        let weights =
            (self.weights.capacity() + self.in_weights.capacity()) * mem::size_of::<f64>();

        let ids = self
            .node_ids
            .as_ref()
            .map(|ids| ids.iter().map(|s| s.capacity()).sum::<usize>())
            .unwrap_or(0);

        base + offsets + edges + weights + ids * 2
    }
}

/// Lay out `(row, column, weight)` triples as CSR arrays, each row sorted by column
fn build_rows(
    node_count: usize,
    triples: impl Iterator<Item = (u32, u32, f64)>,
) -> (Vec<u32>, Vec<u32>, Vec<f64>) {
    let mut rows: Vec<Vec<(u32, f64)>> = vec![Vec::new(); node_count];
    for (row, col, w) in triples {
        rows[row as usize].push((col, w));
    }

    let total: usize = rows.iter().map(Vec::len).sum();
    let mut offsets = Vec::with_capacity(node_count + 1);
    let mut edges = Vec::with_capacity(total);
    let mut weights = Vec::with_capacity(total);

    offsets.push(0);
    for mut row in rows {
        // Stable so parallel edges keep insertion order
        row.sort_by_key(|&(col, _)| col);
        for (col, w) in row {
            edges.push(col);
            weights.push(w);
        }
        offsets.push(edges.len() as u32);
    }

    (offsets, edges, weights)
}

fn row_weight(row: &[u32], weights: &[f64], target: u32) -> f64 {
    let start = row.partition_point(|&n| n < target);
    let end = row.partition_point(|&n| n <= target);
    weights[start..end].iter().sum()
}
