//! Library error type

use thiserror::Error;

/// Contract violations reported by the metrics engine.
///
/// Degenerate graph shapes are never errors; they resolve to sentinel
/// values inside the calculators.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MetricsError {
    /// The requested center node does not exist in the graph store
    #[error("node {0:?} is not present in the graph")]
    UnknownNode(String),

    /// A configuration value is out of its valid range
    #[error("invalid configuration for `{name}`: {message}")]
    InvalidConfig {
        name: &'static str,
        message: String,
    },

    /// A partition does not cover the graph it is applied to
    #[error("partition covers {covered} of {expected} nodes or repeats a node")]
    InvalidPartition { covered: usize, expected: usize },
}

/// Result alias for the library
pub type Result<T> = std::result::Result<T, MetricsError>;
