//! Parquet edge lists read through polars

use crate::data::csv::builder_for;
use crate::data::{normalize_id, LoadOptions};
use crate::graph::CompressedGraph;
use anyhow::Result;
use polars::prelude::*;
use std::path::Path;

/// Column layout of a Parquet edge list
#[derive(Debug, Clone, PartialEq)]
pub struct ParquetColumns {
    pub source: String,
    pub target: String,
    /// Weight column, used when the file has it; every edge weighs 1.0 otherwise
    pub weight: Option<String>,
    /// Keep only rows where `(column, value)` matches, e.g. `LinkType == "follow"`
    pub link_filter: Option<(String, String)>,
}

impl Default for ParquetColumns {
    fn default() -> Self {
        Self {
            source: "source".to_string(),
            target: "target".to_string(),
            weight: Some("weight".to_string()),
            link_filter: None,
        }
    }
}

/// Load an edge list from a Parquet file
pub fn load_edges<P: AsRef<Path>>(
    path: P,
    columns: &ParquetColumns,
    options: LoadOptions,
) -> Result<CompressedGraph> {
    let path = path.as_ref();
    log::info!("Reading parquet file: {}", path.display());

    if !path.exists() {
        return Err(anyhow::anyhow!("File not found: {}", path.display()));
    }

    let mut lf = LazyFrame::scan_parquet(path, Default::default())?;
    if let Some((column, value)) = &columns.link_filter {
        lf = lf.filter(col(column.as_str()).eq(lit(value.as_str())));
    }

    let schema = lf.collect_schema()?;
    let weight_column = match &columns.weight {
        Some(name) if schema.contains(name.as_str()) => Some(name.as_str()),
        Some(name) => {
            log::info!("No weight column {:?}, using unit weights", name);
            None
        }
        None => None,
    };

    let mut selection = vec![
        col(columns.source.as_str()).cast(DataType::String).alias("source"),
        col(columns.target.as_str()).cast(DataType::String).alias("target"),
    ];
    if let Some(weight) = weight_column {
        selection.push(col(weight).cast(DataType::Float64).alias("weight"));
    }
    let df = lf.select(selection).collect()?;

    log::info!("Loaded {} edge rows", df.height());

    let sources = df.column("source")?.str()?;
    let targets = df.column("target")?.str()?;
    let weights = match weight_column {
        Some(_) => Some(df.column("weight")?.f64()?),
        None => None,
    };

    let mut builder = builder_for(options);
    let mut dropped = 0usize;
    for i in 0..df.height() {
        let (Some(src), Some(dst)) = (sources.get(i), targets.get(i)) else {
            dropped += 1;
            continue;
        };
        let weight = weights.and_then(|w| w.get(i)).unwrap_or(1.0);
        if !weight.is_finite() {
            return Err(anyhow::anyhow!("Invalid weight {} at row {}", weight, i));
        }
        builder.add_weighted_edge(&normalize_id(src), &normalize_id(dst), weight);
    }

    if dropped > 0 {
        log::warn!("Dropped {} rows with a null endpoint", dropped);
    }
    log::info!(
        "Built graph with {} nodes and {} edges",
        builder.node_count(),
        builder.edge_count()
    );
    Ok(builder.build())
}
