//! Fleet-wide statistics
//!
//! Counters are owned by the orchestrator and updated only inside its
//! aggregation critical section after a worker hands back its result;
//! workers never touch them.

use std::time::Duration;

use crate::sync::RepoSyncResult;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FleetStatistics {
    pub processed: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Repositories that gained at least one new commit.
    pub updated: usize,
    pub new_commits: usize,
}

impl FleetStatistics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one repository's result into the totals.
    pub fn record(&mut self, result: &RepoSyncResult) {
        self.processed += 1;
        if result.failed {
            self.failed += 1;
        } else {
            self.succeeded += 1;
        }
        if result.new_commits > 0 {
            self.updated += 1;
        }
        self.new_commits += result.new_commits;
    }

    /// Generates the one-line summary shown at the end of a run
    #[must_use]
    pub fn summary_line(&self, duration: Duration) -> String {
        let secs = duration.as_secs_f64();
        if self.failed > 0 {
            format!(
                "✅ Completed in {:.1}s • {} processed • {} updated • {} new commits • {} failed",
                secs, self.processed, self.updated, self.new_commits, self.failed
            )
        } else {
            format!(
                "✅ Completed in {:.1}s • {} processed • {} updated • {} new commits",
                secs, self.processed, self.updated, self.new_commits
            )
        }
    }
}
