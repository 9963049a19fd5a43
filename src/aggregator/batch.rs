//! Batch execution across independent users
//!
//! Every user is processed against the same read-only graph store, so the
//! work fans out over rayon with no coordination beyond a `BatchContext`
//! that records what happened to each user.

use crate::aggregator::{metrics_for_ego, MetricsRecord};
use crate::config::Config;
use crate::error::MetricsError;
use crate::graph::ego::{self, EgoSummary};
use crate::graph::CompressedGraph;
use dashmap::{DashMap, DashSet};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

/// Why a user produced no record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    /// The user is not in the graph store
    Missing,
    /// The ego network had fewer nodes than `min_ego_nodes`
    TooSmall { node_count: usize },
    /// A previous run already produced a record for this user
    AlreadyCompleted,
}

/// A computed record plus the optional ego summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserResult {
    pub record: MetricsRecord,
    pub ego: Option<EgoSummary>,
}

/// Bookkeeping for one batch run, shared by reference between workers
#[derive(Debug)]
pub struct BatchContext {
    completed: DashSet<String>,
    skipped: DashMap<String, SkipReason>,
    processed: AtomicUsize,
    started: Instant,
}

impl Default for BatchContext {
    fn default() -> Self {
        Self::new()
    }
}

impl BatchContext {
    pub fn new() -> Self {
        Self {
            completed: DashSet::new(),
            skipped: DashMap::new(),
            processed: AtomicUsize::new(0),
            started: Instant::now(),
        }
    }

    /// Start from the users a previous run already finished
    pub fn with_completed<I: IntoIterator<Item = String>>(completed: I) -> Self {
        let ctx = Self::new();
        for id in completed {
            ctx.completed.insert(id);
        }
        ctx
    }

    pub fn is_completed(&self, user: &str) -> bool {
        self.completed.contains(user)
    }

    pub fn completed_count(&self) -> usize {
        self.completed.len()
    }

    /// Users attempted in this run, skipped ones included
    pub fn processed_count(&self) -> usize {
        self.processed.load(Ordering::Relaxed)
    }

    pub fn skip_reason(&self, user: &str) -> Option<SkipReason> {
        self.skipped.get(user).map(|entry| entry.value().clone())
    }

    /// Skipped users with their reasons, sorted by ID
    pub fn skipped(&self) -> Vec<(String, SkipReason)> {
        let mut skipped: Vec<(String, SkipReason)> = self
            .skipped
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();
        skipped.sort_by(|a, b| a.0.cmp(&b.0));
        skipped
    }

    /// Users that were not found in the store, sorted
    pub fn missing(&self) -> Vec<String> {
        self.skipped()
            .into_iter()
            .filter(|(_, reason)| *reason == SkipReason::Missing)
            .map(|(id, _)| id)
            .collect()
    }

    fn skip(&self, user: &str, reason: SkipReason) {
        self.skipped.insert(user.to_string(), reason);
    }

    fn complete(&self, user: &str) {
        self.completed.insert(user.to_string());
    }

    fn log_progress(&self, total: usize) {
        let done = self.processed.fetch_add(1, Ordering::Relaxed) + 1;
        if done % 1000 == 0 || done == total {
            let elapsed = self.started.elapsed().as_secs_f64();
            let rate = if elapsed > 0.0 { done as f64 / elapsed } else { 0.0 };
            log::info!("Processed {}/{} users ({:.1} users/s)", done, total, rate);
        }
    }
}

/// Split users into batches of at most `batch_size`
pub fn partition_users(users: &[String], batch_size: usize) -> impl Iterator<Item = &[String]> {
    users.chunks(batch_size.max(1))
}

/// Process one user, recording skips in `ctx`
pub fn process_user(
    store: &CompressedGraph,
    user: &str,
    config: &Config,
    ctx: &BatchContext,
) -> Option<UserResult> {
    if ctx.is_completed(user) {
        ctx.skip(user, SkipReason::AlreadyCompleted);
        return None;
    }

    let ego = match ego::extract_with(store, user, &config.ego) {
        Ok(ego) => ego,
        Err(MetricsError::UnknownNode(_)) => {
            log::debug!("User {} not found in graph", user);
            ctx.skip(user, SkipReason::Missing);
            return None;
        }
        Err(e) => {
            log::warn!("Failed to extract ego network for {}: {}", user, e);
            return None;
        }
    };

    if ego.node_count() < config.min_ego_nodes {
        log::debug!("Skipping {}: ego network has {} nodes", user, ego.node_count());
        ctx.skip(
            user,
            SkipReason::TooSmall {
                node_count: ego.node_count(),
            },
        );
        return None;
    }

    match metrics_for_ego(store, user, &ego, config) {
        Ok(record) => {
            ctx.complete(user);
            let ego = config.emit_ego_info.then(|| ego.summary(store));
            Some(UserResult { record, ego })
        }
        Err(e) => {
            log::warn!("Failed to compute metrics for {}: {}", user, e);
            None
        }
    }
}

/// Process `users` in parallel. Results keep the order of `users`.
pub fn run_batch(
    store: &CompressedGraph,
    users: &[String],
    config: &Config,
    ctx: &BatchContext,
) -> Vec<UserResult> {
    let total = users.len();
    users
        .par_iter()
        .filter_map(|user| {
            let result = process_user(store, user, config, ctx);
            ctx.log_progress(total);
            result
        })
        .collect()
}
