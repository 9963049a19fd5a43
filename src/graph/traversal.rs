//! Breadth-first traversals shared by ego extraction and centrality

use crate::graph::CompressedGraph;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};

/// Which edges a traversal may follow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// Follow edges source -> target
    Outgoing,
    /// Follow edges target -> source
    Incoming,
    /// Follow edges either way
    Both,
}

impl Direction {
    fn expand<'a>(
        self,
        graph: &'a CompressedGraph,
        node: usize,
    ) -> Box<dyn Iterator<Item = u32> + 'a> {
        match self {
            Direction::Outgoing => Box::new(graph.successors(node)),
            Direction::Incoming => Box::new(graph.predecessors(node)),
            Direction::Both => Box::new(graph.neighbors(node)),
        }
    }
}

/// Level-synchronous BFS from `source`, stopping after `radius` levels.
///
/// Returns hop distances for every reached node, the source at distance 0.
/// The map only grows with the explored neighborhood, not the whole graph.
pub fn bfs_distances(
    graph: &CompressedGraph,
    source: u32,
    radius: usize,
    direction: Direction,
) -> HashMap<u32, usize> {
    let mut distances = HashMap::new();
    distances.insert(source, 0);

    let mut frontier = vec![source];
    for level in 1..=radius {
        let mut next = Vec::new();

        for &node in &frontier {
            for neighbor in direction.expand(graph, node as usize) {
                if !distances.contains_key(&neighbor) {
                    distances.insert(neighbor, level);
                    next.push(neighbor);
                }
            }
        }

        if next.is_empty() {
            break;
        }
        frontier = next;
    }

    distances
}

/// Single-source shortest path DAG over unweighted hops
#[derive(Debug, Clone)]
pub struct ShortestPaths {
    /// Nodes in non-decreasing distance order
    pub order: Vec<u32>,
    /// Number of shortest paths from the source to each node
    pub sigma: Vec<f64>,
    /// Hop distance, `None` when unreachable
    pub distance: Vec<Option<usize>>,
    /// Predecessors of each node on shortest paths
    pub predecessors: Vec<Vec<u32>>,
}

/// Shortest paths from `source` following edge direction (every neighbor
/// when the graph is undirected). Parallel edges count as one hop.
pub fn single_source_shortest_paths(graph: &CompressedGraph, source: u32) -> ShortestPaths {
    let n = graph.node_count;
    let mut order = Vec::with_capacity(n);
    let mut sigma = vec![0.0f64; n];
    let mut distance: Vec<Option<usize>> = vec![None; n];
    let mut predecessors: Vec<Vec<u32>> = vec![Vec::new(); n];

    sigma[source as usize] = 1.0;
    distance[source as usize] = Some(0);

    let mut queue = VecDeque::new();
    queue.push_back(source);

    while let Some(v) = queue.pop_front() {
        order.push(v);
        let next_hop = distance[v as usize].map_or(0, |d| d + 1);

        let mut targets: Vec<u32> = graph.successors(v as usize).filter(|&w| w != v).collect();
        targets.sort_unstable();
        targets.dedup();

        for w in targets {
            let wi = w as usize;
            if distance[wi].is_none() {
                distance[wi] = Some(next_hop);
                queue.push_back(w);
            }
            if distance[wi] == Some(next_hop) {
                sigma[wi] += sigma[v as usize];
                predecessors[wi].push(v);
            }
        }
    }

    ShortestPaths {
        order,
        sigma,
        distance,
        predecessors,
    }
}
