//! Results persistence module

use crate::aggregator::{BatchContext, MetricsRecord, SkipReason, UserResult};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::{json, to_string_pretty};
use statrs::statistics::Statistics;
use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

pub const METRICS_FILE: &str = "network_metrics.jsonl";
pub const EGO_INFO_FILE: &str = "ego_network_info.jsonl";
pub const SUMMARY_FILE: &str = "summary.json";

/// Streams per-user lines into the JSONL outputs
pub struct ResultWriter {
    metrics: BufWriter<File>,
    ego_info: Option<BufWriter<File>>,
    written: usize,
}

impl ResultWriter {
    /// Open the writers under `output_dir`. With `append` an existing file
    /// is extended, otherwise it is truncated.
    pub fn create(output_dir: &Path, emit_ego_info: bool, append: bool) -> Result<Self> {
        fs::create_dir_all(output_dir)?;

        let metrics = BufWriter::new(open_jsonl(&output_dir.join(METRICS_FILE), append)?);
        let ego_info = if emit_ego_info {
            Some(BufWriter::new(open_jsonl(&output_dir.join(EGO_INFO_FILE), append)?))
        } else {
            None
        };

        Ok(Self {
            metrics,
            ego_info,
            written: 0,
        })
    }

    pub fn write(&mut self, result: &UserResult) -> Result<()> {
        let line = json!({
            "user_id": result.record.center_id,
            "network_metrics": result.record,
        });
        writeln!(self.metrics, "{}", line)?;

        if let (Some(writer), Some(ego)) = (self.ego_info.as_mut(), result.ego.as_ref()) {
            let line = json!({
                "user_id": result.record.center_id,
                "ego_network_info": ego,
            });
            writeln!(writer, "{}", line)?;
        }

        self.written += 1;
        Ok(())
    }

    pub fn written(&self) -> usize {
        self.written
    }

    pub fn flush(&mut self) -> Result<()> {
        self.metrics.flush()?;
        if let Some(writer) = self.ego_info.as_mut() {
            writer.flush()?;
        }
        Ok(())
    }
}

fn open_jsonl(path: &Path, append: bool) -> Result<File> {
    let file = if append {
        OpenOptions::new().create(true).append(true).open(path)?
    } else {
        File::create(path)?
    };
    Ok(file)
}

/// Distribution of one metric over a batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricStats {
    pub count: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

impl MetricStats {
    /// `None` when there are no values
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let std_dev = if values.len() > 1 {
            values.std_dev()
        } else {
            0.0
        };
        Some(Self {
            count: values.len(),
            mean: values.mean(),
            std_dev,
            min: Statistics::min(values),
            max: Statistics::max(values),
        })
    }
}

/// Collects metric values as records stream past
#[derive(Debug, Default)]
pub struct SummaryBuilder {
    values: BTreeMap<&'static str, Vec<f64>>,
    node_counts: Vec<f64>,
}

impl SummaryBuilder {
    pub fn observe(&mut self, record: &MetricsRecord) {
        for (name, value) in record.metric_values() {
            if let Some(value) = value {
                self.values.entry(name).or_default().push(value);
            }
        }
        self.node_counts.push(record.node_count as f64);
    }

    pub fn finish(self, ctx: &BatchContext, requested: usize) -> BatchSummary {
        let mut too_small = 0;
        let mut already_completed = 0;
        let mut missing = 0;
        for (_, reason) in ctx.skipped() {
            match reason {
                SkipReason::Missing => missing += 1,
                SkipReason::TooSmall { .. } => too_small += 1,
                SkipReason::AlreadyCompleted => already_completed += 1,
            }
        }

        BatchSummary {
            requested_users: requested,
            computed_users: self.node_counts.len(),
            missing_users: missing,
            skipped_small: too_small,
            skipped_completed: already_completed,
            ego_node_count: MetricStats::from_values(&self.node_counts),
            metrics: self
                .values
                .iter()
                .filter_map(|(name, values)| {
                    MetricStats::from_values(values).map(|stats| (name.to_string(), stats))
                })
                .collect(),
        }
    }
}

/// Batch-level counters and per-metric statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub requested_users: usize,
    pub computed_users: usize,
    pub missing_users: usize,
    pub skipped_small: usize,
    pub skipped_completed: usize,
    pub ego_node_count: Option<MetricStats>,
    pub metrics: BTreeMap<String, MetricStats>,
}

/// Save summary information
pub fn save_summary(summary: &BatchSummary, output_dir: &Path) -> Result<()> {
    log::info!("Saving summary information");

    let path = output_dir.join(SUMMARY_FILE);
    let mut file = File::create(path)?;
    file.write_all(to_string_pretty(summary)?.as_bytes())?;

    Ok(())
}
