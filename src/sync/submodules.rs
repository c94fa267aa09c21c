//! Submodule reconciliation
//!
//! Keeps recorded submodule URLs, checkouts, and remote-tracking refs in
//! step with the superproject. URL sync and status enumeration soft-fail
//! as warnings; a failed checkout update is a correctness problem and
//! fails the workflow.

use std::path::Path;

use crate::git::fallback::FallbackRunner;
use crate::git::transport::to_args;

use super::result::RepoSyncResult;
use super::workflow::{first_line, CLEAN_ARGS, FETCH_ALL_ARGS};
use super::{Halted, PullMode, SyncOptions};

const SYNC_URLS_ARGS: &[&str] = &["submodule", "sync", "--recursive"];
const STATUS_ARGS: &[&str] = &["submodule", "status", "--recursive"];

pub(crate) async fn reconcile(
    runner: &FallbackRunner,
    options: &SyncOptions,
    repo: &Path,
    result: &mut RepoSyncResult,
) -> Result<(), Halted> {
    let forced = options.pull == PullMode::Forced;

    // Divergent recorded URLs cause confusing fetch failures later
    let outcome = runner.run(repo, &to_args(SYNC_URLS_ARGS)).await;
    if !outcome.success() {
        result.warn(format!(
            "Submodule URL sync failed: {}",
            first_line(&outcome.output)
        ));
    }

    // Checkouts must match the commits the superproject records
    let mut update = to_args(&["submodule", "update"]);
    if options.init_submodules {
        update.push("--init".to_string());
    }
    update.push("--recursive".to_string());
    if forced {
        update.push("--force".to_string());
    }
    let outcome = runner.run_with_fallback(repo, &update).await;
    if !outcome.success() {
        result.fail("Submodule update failed", &outcome.output);
        return Err(Halted);
    }

    let outcome = runner.run(repo, &to_args(STATUS_ARGS)).await;
    if !outcome.success() {
        result.warn(format!(
            "Submodule status enumeration failed: {}",
            first_line(&outcome.output)
        ));
        return Ok(());
    }

    for entry in parse_status(&outcome.output) {
        if !entry.initialized {
            result.warn(format!("Uninitialized submodule: {}", entry.path));
            continue;
        }
        let sub_path = repo.join(&entry.path);

        // The checkout tracks a pinned commit, but its remote-tracking refs
        // should stay current all the same
        let fetch = runner.run_with_fallback(&sub_path, &to_args(FETCH_ALL_ARGS)).await;
        if !fetch.success() {
            result.warn(format!(
                "Fetch failed for submodule {}: {}",
                entry.path,
                first_line(&fetch.output)
            ));
        }

        if forced && options.clean_untracked {
            let clean = runner.run(&sub_path, &to_args(CLEAN_ARGS)).await;
            if !clean.success() {
                result.warn(format!(
                    "Clean failed for submodule {}: {}",
                    entry.path,
                    first_line(&clean.output)
                ));
            }
        }
    }

    Ok(())
}

/// One line of `git submodule status --recursive` output.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct StatusEntry {
    pub path: String,
    pub initialized: bool,
}

/// Parses status lines of the form `[ +-U]<sha> <path> (<describe>)`.
pub(crate) fn parse_status(output: &str) -> Vec<StatusEntry> {
    let mut entries = Vec::new();
    for line in output.lines() {
        if line.len() < 2 {
            continue;
        }
        let (state, rest) = line.split_at(1);
        let mut fields = rest.split_whitespace();
        let Some(_sha) = fields.next() else { continue };
        let Some(path) = fields.next() else { continue };
        entries.push(StatusEntry {
            path: path.to_string(),
            initialized: state != "-",
        });
    }
    entries
}
