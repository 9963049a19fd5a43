//! CSV edge lists with `source,target[,weight]` columns

use crate::data::{normalize_id, LoadOptions};
use crate::graph::{CompressedGraph, GraphBuilder};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct EdgeRow {
    source: String,
    target: String,
    #[serde(default)]
    weight: Option<f64>,
}

/// Load an edge list from a CSV file with a header row
pub fn load_edges<P: AsRef<Path>>(path: P, options: LoadOptions) -> Result<CompressedGraph> {
    let path = path.as_ref();
    log::info!("Reading CSV edge list: {}", path.display());

    let mut reader = ::csv::ReaderBuilder::new()
        .trim(::csv::Trim::All)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    let mut builder = builder_for(options);
    let mut rows = 0usize;
    let mut negative = 0usize;
    for (line, row) in reader.deserialize::<EdgeRow>().enumerate() {
        let row =
            row.with_context(|| format!("Bad edge at row {} of {}", line + 2, path.display()))?;
        let weight = row.weight.unwrap_or(1.0);
        if weight < 0.0 {
            negative += 1;
        }
        if !weight.is_finite() {
            return Err(anyhow::anyhow!(
                "Invalid weight {} at row {} of {}",
                weight,
                line + 2,
                path.display()
            ));
        }
        builder.add_weighted_edge(&normalize_id(&row.source), &normalize_id(&row.target), weight);
        rows += 1;
    }

    if negative > 0 {
        log::warn!("{} edges in {} have negative weights", negative, path.display());
    }

    log::info!(
        "Read {} rows: {} nodes, {} edges",
        rows,
        builder.node_count(),
        builder.edge_count()
    );
    Ok(builder.build())
}

pub(crate) fn builder_for(options: LoadOptions) -> GraphBuilder {
    let builder = GraphBuilder::default().dedup(options.dedup);
    if options.directed {
        builder
    } else {
        builder.undirected()
    }
}
