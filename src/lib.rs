//! Ego network extraction and structural metrics for large social graphs

pub mod aggregator;
pub mod community;
pub mod config;
pub mod data;
pub mod error;
pub mod graph;
pub mod metrics;
pub mod storage;

pub use aggregator::{compute_metrics, run_batch, BatchContext, MetricsRecord, UserResult};
pub use community::{louvain_communities, modularity, CommunityResult, Partition};
pub use config::{Config, EgoConfig, LouvainConfig, MetricSelection};
pub use error::{MetricsError, Result};
pub use graph::{CompressedGraph, Direction, EgoNetwork, GraphBuilder};
