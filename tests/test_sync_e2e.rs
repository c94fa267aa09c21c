//! End-to-end sync against real git repositories

mod common;

use common::git::{clone_repo, create_test_commit, is_git_available, setup_git_repo};
use git_fleet::core::{FleetOrchestrator, Repository};
use git_fleet::git::SystemTransport;
use git_fleet::sync::{PullMode, RepoSyncWorkflow, SyncOptions};
use git_fleet::git::FallbackRunner;
use std::fs;
use std::process::Command;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

fn head_of(path: &std::path::Path) -> String {
    let output = Command::new("git")
        .args(["rev-parse", "HEAD"])
        .current_dir(path)
        .output()
        .expect("git rev-parse should run");
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

fn test_options(pull: PullMode) -> SyncOptions {
    SyncOptions {
        pull,
        retry_backoff: Duration::from_millis(10),
        ..SyncOptions::default()
    }
}

#[tokio::test]
async fn fetch_reports_exactly_the_new_commits() {
    if !is_git_available() {
        eprintln!("Git not available, skipping test");
        return;
    }

    let temp = TempDir::new().unwrap();
    let origin = temp.path().join("origin");
    fs::create_dir(&origin).unwrap();
    setup_git_repo(&origin).unwrap();
    create_test_commit(&origin, "base.txt", "base", "Base commit").unwrap();

    let clone = temp.path().join("clone");
    clone_repo(&origin, &clone).unwrap();

    // Two commits land upstream after the clone
    create_test_commit(&origin, "a.txt", "a", "First change").unwrap();
    create_test_commit(&origin, "b.txt", "b", "Second change").unwrap();

    let options = test_options(PullMode::FetchOnly);
    let runner = FallbackRunner::new(Arc::new(SystemTransport), options.command_timeout);
    let result = RepoSyncWorkflow::new(&runner, &options, "clone", &clone)
        .run()
        .await;

    assert!(!result.failed, "entries: {:?}", result.entries);
    assert_eq!(result.new_commits, 2);
}

#[tokio::test]
async fn fast_forward_pull_advances_the_working_tree() {
    if !is_git_available() {
        eprintln!("Git not available, skipping test");
        return;
    }

    let temp = TempDir::new().unwrap();
    let origin = temp.path().join("origin");
    fs::create_dir(&origin).unwrap();
    setup_git_repo(&origin).unwrap();
    create_test_commit(&origin, "base.txt", "base", "Base commit").unwrap();

    let clone = temp.path().join("clone");
    clone_repo(&origin, &clone).unwrap();
    create_test_commit(&origin, "next.txt", "next", "Upstream change").unwrap();

    let options = test_options(PullMode::FastForward);
    let runner = FallbackRunner::new(Arc::new(SystemTransport), options.command_timeout);
    let result = RepoSyncWorkflow::new(&runner, &options, "clone", &clone)
        .run()
        .await;

    assert!(!result.failed, "entries: {:?}", result.entries);
    assert_eq!(result.new_commits, 1);
    assert_eq!(head_of(&clone), head_of(&origin));
}

#[tokio::test]
async fn an_up_to_date_clone_stays_quiet() {
    if !is_git_available() {
        eprintln!("Git not available, skipping test");
        return;
    }

    let temp = TempDir::new().unwrap();
    let origin = temp.path().join("origin");
    fs::create_dir(&origin).unwrap();
    setup_git_repo(&origin).unwrap();
    create_test_commit(&origin, "base.txt", "base", "Base commit").unwrap();

    let clone = temp.path().join("clone");
    clone_repo(&origin, &clone).unwrap();

    let options = test_options(PullMode::FetchOnly);
    let orchestrator = FleetOrchestrator::new(Arc::new(SystemTransport), options, 2);
    let summary = orchestrator
        .run(vec![Repository {
            name: "clone".to_string(),
            path: clone,
        }])
        .await;

    assert_eq!(summary.stats.failed, 0);
    assert_eq!(summary.stats.new_commits, 0);
    assert!(!summary.results[0].failed);
}
