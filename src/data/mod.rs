//! Edge-list and user-list loading

pub mod csv;
pub mod parquet;

use anyhow::{Context, Result};
use itertools::Itertools;
use serde::Deserialize;
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// How raw edges become a graph store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    pub directed: bool,
    /// Collapse repeated (source, target) pairs into one edge
    pub dedup: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            directed: true,
            dedup: false,
        }
    }
}

/// Canonical form of a node ID.
///
/// Whitespace is trimmed and integral floats such as `"123.0"` become
/// `"123"`. Anything else is kept verbatim.
pub fn normalize_id(raw: &str) -> String {
    let trimmed = raw.trim();
    if let Some((int, frac)) = trimmed.split_once('.') {
        let integral = !frac.is_empty() && frac.bytes().all(|b| b == b'0');
        if integral && int.parse::<i64>().is_ok() {
            return int.to_string();
        }
    }
    trimmed.to_string()
}

/// Read user IDs, one per line. Blank lines and `#` comments are ignored.
pub fn load_user_list<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open user list {}", path.display()))?;

    let mut ids = Vec::new();
    for line in BufReader::new(file).lines() {
        let line = line?;
        let line = line.trim();
        if !line.is_empty() && !line.starts_with('#') {
            ids.push(line.to_string());
        }
    }
    let users = merge_user_ids(Vec::new(), ids);

    log::info!("Loaded {} users from {}", users.len(), path.display());
    Ok(users)
}

/// Append normalized `extra` IDs to `users`, keeping only the first
/// occurrence of each ID
pub fn merge_user_ids<I, S>(users: Vec<String>, extra: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    users
        .into_iter()
        .chain(extra.into_iter().map(|id| normalize_id(id.as_ref())))
        .unique()
        .collect()
}

#[derive(Deserialize)]
struct CompletedLine {
    user_id: String,
}

/// User IDs already present in a metrics JSONL file.
///
/// A missing file yields an empty set; unparseable lines are skipped,
/// which tolerates a truncated final line from an interrupted run.
pub fn load_completed_users<P: AsRef<Path>>(path: P) -> Result<HashSet<String>> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(HashSet::new());
    }

    let file = File::open(path)?;
    let mut completed = HashSet::new();
    for line in BufReader::new(file).lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<CompletedLine>(&line) {
            Ok(entry) => {
                completed.insert(normalize_id(&entry.user_id));
            }
            Err(e) => log::warn!("Skipping unreadable line in {}: {}", path.display(), e),
        }
    }

    log::info!("Found {} completed users in {}", completed.len(), path.display());
    Ok(completed)
}

/// Load a graph from a `.csv` or `.parquet` edge list, chosen by extension
pub fn load_graph<P: AsRef<Path>>(
    path: P,
    options: LoadOptions,
) -> Result<crate::graph::CompressedGraph> {
    let path = path.as_ref();
    match path.extension().and_then(|e| e.to_str()) {
        Some("parquet") => parquet::load_edges(path, &parquet::ParquetColumns::default(), options),
        Some("csv") => csv::load_edges(path, options),
        _ => Err(anyhow::anyhow!(
            "Unsupported edge list format: {} (expected .csv or .parquet)",
            path.display()
        )),
    }
}
