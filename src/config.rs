//! Configuration management for the ego-network metrics engine

use crate::error::{MetricsError, Result};
use crate::graph::Direction;
use serde::{Deserialize, Serialize};

/// Top-level configuration for one batch run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Ego network extraction parameters
    pub ego: EgoConfig,

    /// Community detection parameters
    pub louvain: LouvainConfig,

    /// Which metrics to compute
    pub metrics: MetricSelection,

    /// Ego networks with fewer nodes than this are skipped
    pub min_ego_nodes: usize,

    /// Attach an ego network summary to every computed record
    #[serde(default)]
    pub emit_ego_info: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ego: EgoConfig::default(),
            louvain: LouvainConfig::default(),
            metrics: MetricSelection::default(),
            min_ego_nodes: 2,
            emit_ego_info: false,
        }
    }
}

impl Config {
    /// Create a new configuration with custom values
    pub fn new(
        ego: EgoConfig,
        louvain: LouvainConfig,
        metrics: MetricSelection,
        min_ego_nodes: usize,
    ) -> Self {
        Self {
            ego,
            louvain,
            metrics,
            min_ego_nodes,
            emit_ego_info: false,
        }
    }

    /// Reject values the engine cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.min_ego_nodes == 0 {
            return Err(MetricsError::InvalidConfig {
                name: "min_ego_nodes",
                message: "must be at least 1".to_string(),
            });
        }
        self.louvain.validate()
    }
}

/// Ego network extraction parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EgoConfig {
    /// Maximum hop distance from the center
    pub radius: usize,

    /// Count a hop along either edge direction
    pub bidirectional: bool,

    /// Direction followed when not bidirectional
    pub direction: Direction,

    /// Keep the center node in the extracted network
    pub include_center: bool,
}

impl Default for EgoConfig {
    fn default() -> Self {
        Self {
            radius: 2,
            bidirectional: true,
            direction: Direction::Outgoing,
            include_center: true,
        }
    }
}

impl EgoConfig {
    /// The direction the BFS actually follows
    pub fn traversal_direction(&self) -> Direction {
        if self.bidirectional {
            Direction::Both
        } else {
            self.direction
        }
    }
}

/// Louvain optimizer limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LouvainConfig {
    /// Minimum modularity gain between levels to keep coarsening
    pub threshold: f64,

    /// Maximum local-moving passes per level
    pub max_iterations: usize,

    /// Maximum coarsening levels
    pub max_levels: usize,

    /// Consecutive passes with the same non-zero move count that count as oscillation
    pub oscillation_window: usize,
}

impl Default for LouvainConfig {
    fn default() -> Self {
        Self {
            threshold: 0.001,
            max_iterations: 100,
            max_levels: 10,
            oscillation_window: 3,
        }
    }
}

impl LouvainConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.threshold.is_finite() || self.threshold < 0.0 {
            return Err(MetricsError::InvalidConfig {
                name: "threshold",
                message: format!("must be a finite non-negative number, got {}", self.threshold),
            });
        }
        if self.max_iterations == 0 {
            return Err(MetricsError::InvalidConfig {
                name: "max_iterations",
                message: "must be at least 1".to_string(),
            });
        }
        if self.max_levels == 0 {
            return Err(MetricsError::InvalidConfig {
                name: "max_levels",
                message: "must be at least 1".to_string(),
            });
        }
        if self.oscillation_window < 2 {
            return Err(MetricsError::InvalidConfig {
                name: "oscillation_window",
                message: "must span at least 2 passes".to_string(),
            });
        }
        Ok(())
    }
}

/// Metric toggles. Betweenness is off by default because it dominates run time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricSelection {
    pub density: bool,
    pub clustering: bool,
    pub average_neighbor_degree: bool,
    pub betweenness: bool,
    pub spectral_radius: bool,
    pub modularity: bool,
}

impl Default for MetricSelection {
    fn default() -> Self {
        Self {
            density: true,
            clustering: true,
            average_neighbor_degree: true,
            betweenness: false,
            spectral_radius: true,
            modularity: true,
        }
    }
}

impl MetricSelection {
    /// Every metric, betweenness included
    pub fn all() -> Self {
        Self {
            betweenness: true,
            ..Self::default()
        }
    }

    /// Parse a list of metric numbers (1 density, 2 clustering, 3 neighbor
    /// degree, 4 betweenness, 5 spectral radius, 6 modularity)
    pub fn from_numbers(numbers: &[u8]) -> Result<Self> {
        let mut selection = Self {
            density: false,
            clustering: false,
            average_neighbor_degree: false,
            betweenness: false,
            spectral_radius: false,
            modularity: false,
        };
        for &n in numbers {
            match n {
                1 => selection.density = true,
                2 => selection.clustering = true,
                3 => selection.average_neighbor_degree = true,
                4 => selection.betweenness = true,
                5 => selection.spectral_radius = true,
                6 => selection.modularity = true,
                other => {
                    return Err(MetricsError::InvalidConfig {
                        name: "metrics",
                        message: format!("unknown metric number {other}, expected 1-6"),
                    })
                }
            }
        }
        Ok(selection)
    }
}
