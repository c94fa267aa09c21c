//! SSH-to-HTTPS fallback behavior

mod common;

use common::{failed, ok, ScriptedTransport};
use git_fleet::git::{to_args, ExitStatus, FallbackRunner, Transport};
use std::fs;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

fn runner_for(transport: &Arc<ScriptedTransport>) -> FallbackRunner {
    FallbackRunner::new(
        Arc::clone(transport) as Arc<dyn Transport>,
        Duration::from_secs(5),
    )
}

#[tokio::test]
async fn auth_failure_is_retried_once_with_https_rewrites() {
    let temp = TempDir::new().unwrap();
    let transport = Arc::new(ScriptedTransport::new());
    transport.on(
        "fetch --all",
        failed(128, "git@example.com: Permission denied (publickey)."),
    );
    transport.on("fetch --all", ok("retried fine"));

    let runner = runner_for(&transport);
    let outcome = runner
        .run_with_fallback(temp.path(), &to_args(&["fetch", "--all"]))
        .await;

    assert!(outcome.success());
    assert_eq!(outcome.output, "retried fine");

    let calls = transport.calls();
    assert_eq!(calls.len(), 2);
    assert!(calls[1].contains("url.https://example.com/.insteadOf=git@example.com:"));
    assert!(calls[1].contains("url.https://example.com/.insteadOf=ssh://git@example.com/"));
}

#[tokio::test]
async fn unrecognized_failures_are_returned_unchanged() {
    let temp = TempDir::new().unwrap();
    let transport = Arc::new(ScriptedTransport::new());
    transport.on(
        "fetch --all",
        failed(128, "fatal: unable to access 'https://example.com/': 502"),
    );

    let runner = runner_for(&transport);
    let outcome = runner
        .run_with_fallback(temp.path(), &to_args(&["fetch", "--all"]))
        .await;

    assert_eq!(outcome.status, ExitStatus::Exited(128));
    assert_eq!(outcome.output, "fatal: unable to access 'https://example.com/': 502");
    assert_eq!(transport.calls().len(), 1);
}

#[tokio::test]
async fn both_outputs_are_reported_when_the_retry_also_fails() {
    let temp = TempDir::new().unwrap();
    let transport = Arc::new(ScriptedTransport::new());
    transport.on(
        "push",
        failed(128, "git@example.com: Permission denied (publickey)."),
    );
    transport.on("push", failed(128, "fatal: Authentication failed over https"));

    let runner = runner_for(&transport);
    let outcome = runner
        .run_with_fallback(temp.path(), &to_args(&["push"]))
        .await;

    assert!(!outcome.success());
    assert!(outcome.output.contains("Permission denied (publickey)"));
    assert!(outcome.output.contains("Authentication failed over https"));
    // One-shot fallback: exactly two attempts, never a third
    assert_eq!(transport.calls_matching("push"), 2);
}

#[tokio::test]
async fn hosts_come_from_the_configured_remotes_when_the_output_names_none() {
    let temp = TempDir::new().unwrap();
    let transport = Arc::new(ScriptedTransport::new());
    transport.on("fetch --all", failed(128, "Host key verification failed."));
    transport.on("fetch --all", ok(""));
    transport.on(
        "remote -v",
        ok("origin\tgit@corp.example.net:team/app.git (fetch)\norigin\tgit@corp.example.net:team/app.git (push)\n"),
    );

    let runner = runner_for(&transport);
    let outcome = runner
        .run_with_fallback(temp.path(), &to_args(&["fetch", "--all"]))
        .await;

    assert!(outcome.success());
    let calls = transport.calls();
    let retry = calls.last().unwrap();
    assert!(retry.contains("url.https://corp.example.net/.insteadOf=git@corp.example.net:"));
}

#[tokio::test]
async fn hosts_fall_back_to_the_submodule_configuration_file() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join(".gitmodules"),
        "[submodule \"lib\"]\n\tpath = lib\n\turl = git@internal.example.org:team/lib.git\n",
    )
    .unwrap();

    let transport = Arc::new(ScriptedTransport::new());
    transport.on("fetch --all", failed(128, "Host key verification failed."));
    transport.on("fetch --all", ok(""));
    transport.on("remote -v", ok(""));

    let runner = runner_for(&transport);
    let outcome = runner
        .run_with_fallback(temp.path(), &to_args(&["fetch", "--all"]))
        .await;

    assert!(outcome.success());
    let calls = transport.calls();
    let retry = calls.last().unwrap();
    assert!(retry.contains("url.https://internal.example.org/.insteadOf=git@internal.example.org:"));
}

#[tokio::test]
async fn no_retry_happens_when_no_host_can_be_found() {
    let temp = TempDir::new().unwrap();
    let transport = Arc::new(ScriptedTransport::new());
    transport.on("fetch --all", failed(128, "Host key verification failed."));
    transport.on("remote -v", ok(""));

    let runner = runner_for(&transport);
    let outcome = runner
        .run_with_fallback(temp.path(), &to_args(&["fetch", "--all"]))
        .await;

    assert!(!outcome.success());
    assert_eq!(transport.calls_matching("fetch --all"), 1);
}
