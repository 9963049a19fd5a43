//! Structural metric calculators for ego networks

pub mod betweenness;
pub mod spectral;
pub mod structural;

pub use betweenness::{betweenness_centrality, betweenness_of, Centrality};
pub use spectral::spectral_radius;
pub use structural::{average_neighbor_degree, calculate_density, clustering_coefficient};

use crate::error::{MetricsError, Result};
use crate::graph::CompressedGraph;
use serde::{Deserialize, Serialize};

/// Degree of a node measured against the whole graph store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalDegrees {
    pub in_degree: usize,
    pub out_degree: usize,
    pub total_degree: usize,
}

/// Whole-graph degrees of `id`, independent of any ego network boundary
pub fn global_degrees(store: &CompressedGraph, id: &str) -> Result<GlobalDegrees> {
    let node = store
        .index_of(id)
        .ok_or_else(|| MetricsError::UnknownNode(id.to_string()))? as usize;

    Ok(GlobalDegrees {
        in_degree: store.in_degree(node),
        out_degree: store.out_degree(node),
        total_degree: store.degree(node),
    })
}
