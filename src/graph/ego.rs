//! Ego network extraction
//!
//! An ego network is the subgraph induced by a center node and every node
//! within `radius` hops of it. In bidirectional mode a hop may follow an
//! edge either way, which is what the default radius-2 extraction uses.
//! Membership is decided by the BFS alone; dropping the center afterwards
//! is a pure post-filter.

use crate::config::EgoConfig;
use crate::error::{MetricsError, Result};
use crate::graph::subgraph::induced_subgraph;
use crate::graph::traversal::{bfs_distances, Direction};
use crate::graph::CompressedGraph;
use serde::{Deserialize, Serialize};

/// Read-only induced subgraph around a center node
#[derive(Debug, Clone)]
pub struct EgoNetwork {
    /// The induced subgraph, indexed locally
    pub graph: CompressedGraph,

    /// Store index of each local node
    pub members: Vec<u32>,

    /// Hop distance of each local node from the center
    pub distances: Vec<usize>,

    /// Store index of the center node
    pub center: u32,

    /// Local index of the center, `None` once it has been filtered out
    pub center_local: Option<u32>,
}

/// Counts describing an extracted ego network
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EgoSummary {
    pub node_count: usize,
    pub edge_count: usize,
    /// Center's in-neighbors inside the ego network
    pub center_in_neighbors: usize,
    /// Center's out-neighbors inside the ego network
    pub center_out_neighbors: usize,
    /// Member IDs, center first
    pub nodes: Vec<String>,
}

/// Extract the ego network of `center` with the given radius.
///
/// `bidirectional` expands along in- and out-edges; otherwise only
/// out-edges are followed.
pub fn extract(
    graph: &CompressedGraph,
    center: &str,
    radius: usize,
    bidirectional: bool,
) -> Result<EgoNetwork> {
    let direction = if bidirectional {
        Direction::Both
    } else {
        Direction::Outgoing
    };
    extract_directed(graph, center, radius, direction)
}

/// Extract following an explicit traversal direction
pub fn extract_directed(
    graph: &CompressedGraph,
    center: &str,
    radius: usize,
    direction: Direction,
) -> Result<EgoNetwork> {
    let center_idx = graph
        .index_of(center)
        .ok_or_else(|| MetricsError::UnknownNode(center.to_string()))?;

    let distances = bfs_distances(graph, center_idx, radius, direction);

    // Center first, then by distance and store index for a stable layout
    let mut reached: Vec<(u32, usize)> = distances.into_iter().collect();
    reached.sort_unstable_by_key(|&(node, dist)| (dist, node));

    let members: Vec<u32> = reached.iter().map(|&(node, _)| node).collect();
    let distances: Vec<usize> = reached.iter().map(|&(_, dist)| dist).collect();
    let sub = induced_subgraph(graph, &members);

    log::debug!(
        "Ego network of {} (radius {}, {:?}): {} nodes, {} edges",
        center,
        radius,
        direction,
        sub.node_count,
        sub.edge_count()
    );

    Ok(EgoNetwork {
        graph: sub,
        members,
        distances,
        center: center_idx,
        center_local: Some(0),
    })
}

/// Extract using an `EgoConfig`, applying the center post-filter
pub fn extract_with(
    graph: &CompressedGraph,
    center: &str,
    config: &EgoConfig,
) -> Result<EgoNetwork> {
    let ego = extract_directed(graph, center, config.radius, config.traversal_direction())?;
    if config.include_center {
        Ok(ego)
    } else {
        Ok(ego.without_center())
    }
}

impl EgoNetwork {
    pub fn node_count(&self) -> usize {
        self.graph.node_count
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Whether the network is just the center with nothing around it
    pub fn is_trivial(&self) -> bool {
        self.node_count() <= 1
    }

    /// Drop the center node and its edges, keeping every other member
    pub fn without_center(self) -> EgoNetwork {
        let Some(center_local) = self.center_local else {
            return self;
        };

        let keep: Vec<u32> = (0..self.graph.node_count as u32)
            .filter(|&local| local != center_local)
            .collect();
        let graph = induced_subgraph(&self.graph, &keep);
        let members = keep.iter().map(|&l| self.members[l as usize]).collect();
        let distances = keep.iter().map(|&l| self.distances[l as usize]).collect();

        EgoNetwork {
            graph,
            members,
            distances,
            center: self.center,
            center_local: None,
        }
    }

    /// Distinct neighbors of a local node in either direction, self excluded
    pub fn neighbor_set(&self, local: u32) -> Vec<u32> {
        self.graph.distinct_neighbors(local as usize)
    }

    /// Describe the network, resolving member IDs against the store
    pub fn summary(&self, store: &CompressedGraph) -> EgoSummary {
        let (center_in_neighbors, center_out_neighbors) = match self.center_local {
            Some(c) => (
                distinct(self.graph.predecessors(c as usize), c),
                distinct(self.graph.successors(c as usize), c),
            ),
            None => (0, 0),
        };

        EgoSummary {
            node_count: self.node_count(),
            edge_count: self.edge_count(),
            center_in_neighbors,
            center_out_neighbors,
            nodes: self
                .members
                .iter()
                .filter_map(|&m| store.node_id(m).map(str::to_string))
                .collect(),
        }
    }
}

fn distinct(nodes: impl Iterator<Item = u32>, exclude: u32) -> usize {
    let mut nodes: Vec<u32> = nodes.filter(|&n| n != exclude).collect();
    nodes.sort_unstable();
    nodes.dedup();
    nodes.len()
}
