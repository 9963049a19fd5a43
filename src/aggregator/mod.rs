//! Per-user metric aggregation
//!
//! Runs extraction, the structural calculators and community detection for
//! one center node and folds the results into a `MetricsRecord`.

pub mod batch;

pub use batch::{partition_users, run_batch, BatchContext, SkipReason, UserResult};

use crate::community::louvain_communities;
use crate::config::Config;
use crate::error::Result;
use crate::graph::ego::{self, EgoNetwork};
use crate::graph::CompressedGraph;
use crate::metrics::{self, GlobalDegrees};
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Metrics of one user's ego network. Unselected metrics are `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsRecord {
    pub center_id: String,
    pub node_count: usize,
    pub edge_count: usize,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub density: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub clustering_coefficient: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub average_nearest_neighbor_degree: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub betweenness_centrality: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub spectral_radius: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub modularity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub community_count: Option<usize>,
    pub global_in_degree: usize,
    pub global_out_degree: usize,
    pub global_total_degree: usize,
}

impl MetricsRecord {
    /// Metric values by name, as collected into the batch summary
    pub fn metric_values(&self) -> [(&'static str, Option<f64>); 6] {
        [
            ("density", self.density),
            ("clustering_coefficient", self.clustering_coefficient),
            ("average_nearest_neighbor_degree", self.average_nearest_neighbor_degree),
            ("betweenness_centrality", self.betweenness_centrality),
            ("spectral_radius", self.spectral_radius),
            ("modularity", self.modularity),
        ]
    }
}

/// Compute every selected metric for `center`.
///
/// Fails only when `center` is not in the store; trivial ego networks get
/// sentinel values.
pub fn compute_metrics(
    store: &CompressedGraph,
    center: &str,
    config: &Config,
) -> Result<MetricsRecord> {
    let ego = ego::extract_with(store, center, &config.ego)?;
    metrics_for_ego(store, center, &ego, config)
}

/// Compute the selected metrics over an already extracted ego network
pub fn metrics_for_ego(
    store: &CompressedGraph,
    center: &str,
    ego: &EgoNetwork,
    config: &Config,
) -> Result<MetricsRecord> {
    let GlobalDegrees {
        in_degree,
        out_degree,
        total_degree,
    } = metrics::global_degrees(store, center)?;

    let selection = &config.metrics;
    let graph = &ego.graph;
    let center_local = ego.center_local;

    let density = selection.density.then(|| metrics::calculate_density(graph));

    let clustering_coefficient = selection
        .clustering
        .then(|| center_local.map_or(0.0, |c| metrics::clustering_coefficient(graph, c)));

    let average_nearest_neighbor_degree = selection
        .average_neighbor_degree
        .then(|| center_local.map_or(0.0, |c| metrics::average_neighbor_degree(graph, c)));

    let betweenness_centrality = selection.betweenness.then(|| {
        let start = Instant::now();
        let value = center_local.map_or(0.0, |c| metrics::betweenness_of(graph, c));
        log::debug!("Betweenness of {} took {:?}", center, start.elapsed());
        value
    });

    let spectral_radius = selection.spectral_radius.then(|| metrics::spectral_radius(graph));

    let communities = selection.modularity.then(|| {
        let start = Instant::now();
        let result = louvain_communities(graph, &config.louvain);
        log::debug!(
            "Modularity of {}: {:.6} over {} communities in {:?}",
            center,
            result.modularity,
            result.partition.len(),
            start.elapsed()
        );
        result
    });

    Ok(MetricsRecord {
        center_id: center.to_string(),
        node_count: ego.node_count(),
        edge_count: ego.edge_count(),
        density,
        clustering_coefficient,
        average_nearest_neighbor_degree,
        betweenness_centrality,
        spectral_radius,
        modularity: communities.as_ref().map(|c| c.modularity),
        community_count: communities.as_ref().map(|c| c.partition.len()),
        global_in_degree: in_degree,
        global_out_degree: out_degree,
        global_total_degree: total_degree,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MetricSelection;
    use crate::error::MetricsError;
    use crate::graph::GraphBuilder;

    fn star(leaves: usize) -> CompressedGraph {
        let mut builder = GraphBuilder::default();
        for leaf in 0..leaves {
            builder.add_edge("hub", &format!("leaf{leaf}"));
        }
        builder.build()
    }

    #[test]
    fn test_star_metrics() {
        let store = star(5);
        let record = compute_metrics(&store, "hub", &Config::default()).unwrap();

        assert_eq!(record.node_count, 6);
        assert_eq!(record.edge_count, 5);
        assert_eq!(record.clustering_coefficient, Some(0.0));
        assert_eq!(record.average_nearest_neighbor_degree, Some(1.0));
        assert_eq!(record.global_out_degree, 5);
        assert_eq!(record.global_in_degree, 0);
        assert!(record.betweenness_centrality.is_none());
        assert!(record.spectral_radius.unwrap().abs() < 1e-9);
    }

    #[test]
    fn test_selection_and_betweenness() {
        let store = star(3);
        let config = Config {
            metrics: MetricSelection::from_numbers(&[4]).unwrap(),
            ..Config::default()
        };
        let record = compute_metrics(&store, "hub", &config).unwrap();
        assert!(record.density.is_none());
        assert!(record.modularity.is_none());
        // Directed star: no leaf-to-leaf paths pass through the hub
        assert_eq!(record.betweenness_centrality, Some(0.0));
    }

    #[test]
    fn test_isolated_center_gets_sentinels() {
        let mut builder = GraphBuilder::default();
        builder.get_or_create_node("alone");
        builder.add_edge("x", "y");
        let store = builder.build();

        let record = compute_metrics(&store, "alone", &Config::default()).unwrap();
        assert_eq!(record.node_count, 1);
        assert_eq!(record.edge_count, 0);
        assert_eq!(record.density, Some(0.0));
        assert_eq!(record.spectral_radius, Some(0.0));
        assert_eq!(record.modularity, Some(0.0));
        assert_eq!(record.global_total_degree, 0);
    }

    #[test]
    fn test_unknown_center() {
        let store = star(2);
        assert_eq!(
            compute_metrics(&store, "ghost", &Config::default()).unwrap_err(),
            MetricsError::UnknownNode("ghost".to_string())
        );
    }

    #[test]
    fn test_record_serialization_skips_unselected() {
        let store = star(2);
        let config = Config {
            metrics: MetricSelection::from_numbers(&[1]).unwrap(),
            ..Config::default()
        };
        let record = compute_metrics(&store, "hub", &config).unwrap();
        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("density").is_some());
        assert!(json.get("modularity").is_none());
        assert_eq!(json["global_total_degree"], 2);
    }
}
