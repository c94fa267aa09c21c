//! Per-repository sync workflow
//!
//! Drives one repository through validate → fetch → diff refs → update
//! working tree → reconcile submodules. Every external-command failure is
//! folded into the result; nothing escapes the workflow boundary.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::core::discovery::{classify_repo, RepoKind};
use crate::git::fallback::FallbackRunner;
use crate::git::refs::{self, RefDelta, RefSnapshot};
use crate::git::transport::to_args;

use super::result::RepoSyncResult;
use super::{submodules, Halted, PullMode, SyncOptions};

// Git command arguments
pub(crate) const FETCH_ALL_ARGS: &[&str] = &["fetch", "--all", "--prune", "--tags", "--force"];
const REMOTE_PRUNE_ARGS: &[&str] = &["remote", "prune", "origin"];
const PULL_FF_ARGS: &[&str] = &["pull", "--ff-only", "--no-recurse-submodules"];
const REMOTE_HEAD_ARGS: &[&str] = &["symbolic-ref", "refs/remotes/origin/HEAD"];
pub(crate) const CLEAN_ARGS: &[&str] = &["clean", "-fdx"];

/// One line per commit: short hash, subject, author, tab-separated.
const LOG_FORMAT: &str = "--format=%h%x09%s%x09%an";

const ALREADY_UP_TO_DATE: &str = "Already up to date";

/// State machine for synchronizing a single repository.
pub struct RepoSyncWorkflow<'a> {
    runner: &'a FallbackRunner,
    options: &'a SyncOptions,
    path: PathBuf,
    result: RepoSyncResult,
    /// Commits already reported for this repository in this run; a commit
    /// reachable from two advanced refs is counted once.
    seen_commits: HashSet<String>,
}

impl<'a> RepoSyncWorkflow<'a> {
    #[must_use]
    pub fn new(runner: &'a FallbackRunner, options: &'a SyncOptions, name: &str, path: &Path) -> Self {
        Self {
            runner,
            options,
            path: path.to_path_buf(),
            result: RepoSyncResult::new(name, path),
            seen_commits: HashSet::new(),
        }
    }

    /// Runs the workflow to its terminal state and returns the result.
    pub async fn run(mut self) -> RepoSyncResult {
        let _ = self.drive().await;
        self.result
    }

    async fn drive(&mut self) -> Result<(), Halted> {
        self.validate()?;
        let before = self.fetch().await?;
        self.diff_refs(before).await?;
        self.update_working_tree().await?;
        self.reconcile_submodules().await?;
        Ok(())
    }

    /// Confirms the path still denotes a standalone repository. A nested
    /// submodule working tree is handled only through its superproject.
    fn validate(&mut self) -> Result<(), Halted> {
        match classify_repo(&self.path) {
            RepoKind::Standalone => Ok(()),
            RepoKind::Nested => {
                self.result
                    .fail("Nested submodule working tree, sync its superproject instead", "");
                Err(Halted)
            }
            RepoKind::NotARepo => {
                self.result.fail("Not a git repository", "");
                Err(Halted)
            }
        }
    }

    /// Snapshots remote-tracking refs, then fetches all remotes with retry.
    /// Returns the pre-fetch snapshot for diffing.
    async fn fetch(&mut self) -> Result<RefSnapshot, Halted> {
        let before = self.capture_refs().await;
        let args = to_args(FETCH_ALL_ARGS);

        let mut last_output = String::new();
        for attempt in 1..=self.options.fetch_attempts {
            let outcome = self.runner.run_with_fallback(&self.path, &args).await;
            if outcome.success() {
                if attempt > 1 {
                    self.result.plain(format!("Fetch succeeded on attempt {attempt}"));
                }
                return Ok(before);
            }
            last_output = outcome.output;

            if attempt == 1 {
                // Stale tracking refs can point at objects the remote no
                // longer has; prune them before the next attempt
                let _ = self.runner.run(&self.path, &to_args(REMOTE_PRUNE_ARGS)).await;
            }
            if attempt < self.options.fetch_attempts {
                tokio::time::sleep(self.options.retry_backoff).await;
            }
        }

        self.result.fail(
            format!("Fetch failed after {} attempts", self.options.fetch_attempts),
            &last_output,
        );
        Err(Halted)
    }

    /// Diffs the post-fetch snapshot against `before` and reports every new
    /// commit exactly once.
    async fn diff_refs(&mut self, before: RefSnapshot) -> Result<(), Halted> {
        let after = self.capture_refs().await;

        for (name, delta) in refs::diff(&before, &after) {
            match delta {
                RefDelta::Added(commit) => {
                    self.result
                        .plain(format!("New branch {}", refs::short_ref(&name)));
                    let args = vec![
                        "log".to_string(),
                        "-1".to_string(),
                        LOG_FORMAT.to_string(),
                        commit,
                    ];
                    self.record_commits(args).await;
                }
                RefDelta::Advanced { from, to } => {
                    self.result.plain(format!(
                        "{} advanced {}..{}",
                        refs::short_ref(&name),
                        abbrev(&from),
                        abbrev(&to)
                    ));
                    let args = vec![
                        "log".to_string(),
                        LOG_FORMAT.to_string(),
                        format!("{from}..{to}"),
                    ];
                    self.record_commits(args).await;
                }
                RefDelta::Deleted => {
                    // Remote branch deletion is routine, not a failure
                    self.result
                        .plain(format!("Remote branch deleted: {}", refs::short_ref(&name)));
                }
                RefDelta::Unchanged => {}
            }
        }

        Ok(())
    }

    /// Folds one log query's output through the per-repository dedup set.
    async fn record_commits(&mut self, args: Vec<String>) {
        let outcome = self.runner.run(&self.path, &args).await;
        if !outcome.success() {
            self.result
                .warn(format!("Log query failed: {}", first_line(&outcome.output)));
            return;
        }
        for line in outcome.output.lines() {
            let hash = line.split('\t').next().unwrap_or("").trim();
            if hash.is_empty() {
                continue;
            }
            if self.seen_commits.insert(hash.to_string()) {
                self.result.new_commits += 1;
                self.result.commit(line.replace('\t', "  "));
            }
        }
    }

    async fn update_working_tree(&mut self) -> Result<(), Halted> {
        match self.options.pull {
            PullMode::FetchOnly => Ok(()),
            PullMode::FastForward => self.pull_fast_forward().await,
            PullMode::Forced => self.force_sync().await,
        }
    }

    async fn pull_fast_forward(&mut self) -> Result<(), Halted> {
        let outcome = self
            .runner
            .run_with_fallback(&self.path, &to_args(PULL_FF_ARGS))
            .await;
        if !outcome.success() {
            self.result.fail("Pull failed", &outcome.output);
            return Err(Halted);
        }
        if !outcome.output.contains(ALREADY_UP_TO_DATE) {
            self.result.plain("Working tree fast-forwarded");
        }
        Ok(())
    }

    /// Destructive path: checkout the remote default branch and hard-reset
    /// onto it, optionally cleaning untracked files on either side.
    ///
    /// The remote HEAD is read once; a concurrent writer moving it mid-run
    /// is outside the single-writer-per-repository assumption.
    async fn force_sync(&mut self) -> Result<(), Halted> {
        let outcome = self.runner.run(&self.path, &to_args(REMOTE_HEAD_ARGS)).await;
        if !outcome.success() {
            self.result
                .fail("Cannot resolve remote default branch", &outcome.output);
            return Err(Halted);
        }
        let remote_ref = outcome.output.trim().to_string(); // refs/remotes/origin/main
        let tracking = refs::short_ref(&remote_ref).to_string(); // origin/main
        let branch = tracking.rsplit('/').next().unwrap_or("master").to_string();

        if self.options.clean_untracked {
            self.clean_working_tree().await;
        }

        let checkout = vec![
            "checkout".to_string(),
            "-B".to_string(),
            branch.clone(),
            tracking.clone(),
            "--force".to_string(),
        ];
        let outcome = self.runner.run(&self.path, &checkout).await;
        if !outcome.success() {
            self.result
                .fail(format!("Checkout of {branch} failed"), &outcome.output);
            return Err(Halted);
        }

        let reset = vec!["reset".to_string(), "--hard".to_string(), tracking.clone()];
        let outcome = self.runner.run(&self.path, &reset).await;
        if !outcome.success() {
            self.result
                .fail(format!("Hard reset to {tracking} failed"), &outcome.output);
            return Err(Halted);
        }
        self.result.plain(format!("Force-synced to {tracking}"));

        if self.options.clean_untracked {
            self.clean_working_tree().await;
        }
        Ok(())
    }

    async fn clean_working_tree(&mut self) {
        let outcome = self.runner.run(&self.path, &to_args(CLEAN_ARGS)).await;
        if !outcome.success() {
            self.result
                .warn(format!("Clean failed: {}", first_line(&outcome.output)));
        }
    }

    async fn reconcile_submodules(&mut self) -> Result<(), Halted> {
        if !self.path.join(".gitmodules").is_file() {
            return Ok(());
        }
        submodules::reconcile(self.runner, self.options, &self.path, &mut self.result).await
    }

    async fn capture_refs(&self) -> RefSnapshot {
        RefSnapshot::capture(
            self.runner.transport(),
            &self.path,
            self.options.command_timeout,
        )
        .await
    }
}

fn abbrev(oid: &str) -> &str {
    &oid[..oid.len().min(7)]
}

pub(crate) fn first_line(output: &str) -> &str {
    output.lines().next().unwrap_or("").trim()
}
