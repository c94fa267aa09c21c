//! Fleet orchestration
//!
//! Prepares the repository working set (cache-first, scan on miss) and
//! drives the per-repository workflow across a bounded worker pool. Each
//! worker owns one repository end-to-end; the only shared mutable state is
//! the aggregation section entered after a workflow returns.

use futures::stream::{FuturesUnordered, StreamExt};
use indicatif::ProgressBar;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;

use crate::git::fallback::FallbackRunner;
use crate::git::transport::Transport;
use crate::sync::{RepoSyncResult, RepoSyncWorkflow, SyncOptions};

use super::cache;
use super::discovery::{self, Repository};
use super::progress::create_fleet_progress;
use super::stats::FleetStatistics;

/// Final outcome of a fleet run.
#[derive(Debug)]
pub struct FleetSummary {
    pub stats: FleetStatistics,
    /// Per-repository results, sorted by name for deterministic reporting.
    pub results: Vec<RepoSyncResult>,
    pub duration: Duration,
}

#[derive(Default)]
struct Aggregate {
    stats: FleetStatistics,
    results: Vec<RepoSyncResult>,
}

/// Builds the working set: a validated cache when available, otherwise a
/// fresh scan whose result is cached for the next run.
pub async fn prepare_repositories(root: &Path, refresh: bool) -> Vec<Repository> {
    if !refresh {
        if let Some(repos) = cache::load(root) {
            return repos;
        }
    }

    let scan_root = root.to_path_buf();
    let paths = tokio::task::spawn_blocking(move || discovery::find_repo_paths(&scan_root))
        .await
        .unwrap_or_else(|e| {
            eprintln!("Error in repository discovery: {e}");
            Vec::new()
        });
    let repos = discovery::name_repositories(paths);

    if !repos.is_empty() {
        if let Err(e) = cache::save(root, &repos) {
            eprintln!("Warning: could not write repository cache: {e}");
        }
    }
    repos
}

/// Runs the per-repository workflow over the whole fleet.
pub struct FleetOrchestrator {
    runner: FallbackRunner,
    options: SyncOptions,
    workers: usize,
}

impl FleetOrchestrator {
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>, options: SyncOptions, workers: usize) -> Self {
        let runner = FallbackRunner::new(transport, options.command_timeout);
        Self {
            runner,
            options,
            workers,
        }
    }

    /// Syncs every repository through the worker pool and aggregates the
    /// results. Completion order is whatever the scheduler produces; the
    /// returned results are sorted by name.
    pub async fn run(&self, repos: Vec<Repository>) -> FleetSummary {
        let start = Instant::now();
        let total = repos.len();

        let progress =
            create_fleet_progress(total as u64).unwrap_or_else(|_| ProgressBar::hidden());
        let aggregate = Mutex::new(Aggregate::default());
        let semaphore = Semaphore::new(self.workers.max(1));

        let mut futures = FuturesUnordered::new();
        for repo in &repos {
            let semaphore = &semaphore;
            let aggregate = &aggregate;
            let progress = &progress;
            let runner = &self.runner;
            let options = &self.options;

            let future = async move {
                let _permit = semaphore
                    .acquire()
                    .await
                    .expect("Failed to acquire semaphore permit");

                let workflow = RepoSyncWorkflow::new(runner, options, &repo.name, &repo.path);
                let result = workflow.run().await;

                // The single aggregation critical section; never held
                // across an external command
                let mut guard = aggregate.lock().expect("Failed to acquire aggregation lock");
                guard.stats.record(&result);
                progress.inc(1);
                progress.set_message(format!("{} {}", result.symbol(), result.name));
                guard.results.push(result);
            };
            futures.push(future);
        }

        // Wait for all repository workflows to complete
        while futures.next().await.is_some() {}
        drop(futures); // releases the borrows on the aggregation state
        progress.finish_and_clear();

        let Aggregate { stats, mut results } = aggregate
            .into_inner()
            .expect("Failed to unwrap aggregation lock");
        results.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));

        FleetSummary {
            stats,
            results,
            duration: start.elapsed(),
        }
    }
}
