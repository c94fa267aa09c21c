//! SSH-to-HTTPS fallback for authentication and host-key failures

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use super::transport::{to_args, CommandOutcome, Transport};

/// Output phrases that identify an SSH auth or host-key problem.
const AUTH_FAILURE_PHRASES: &[&str] = &[
    "host key verification failed",
    "permission denied (publickey",
    "could not read from remote repository",
];

const ATTEMPT_SEPARATOR: &str = "--- retried over https ---";

const REMOTE_LIST_ARGS: &[&str] = &["remote", "-v"];

/// Runs git commands through a [`Transport`], retrying a recognized SSH
/// failure once with the affected hosts rewritten to HTTPS.
pub struct FallbackRunner {
    transport: Arc<dyn Transport>,
    timeout: Duration,
}

impl FallbackRunner {
    pub fn new(transport: Arc<dyn Transport>, timeout: Duration) -> Self {
        Self { transport, timeout }
    }

    #[must_use]
    pub fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }

    /// Runs a command without fallback handling.
    pub async fn run(&self, repo: &Path, args: &[String]) -> CommandOutcome {
        self.transport.run(repo, args, self.timeout).await
    }

    /// Runs a command, retrying once over HTTPS if the failure looks like an
    /// SSH auth problem. On repeated failure both outputs are returned
    /// together so the operator sees the original error and the fallback
    /// error. One-shot: the rewritten attempt is never itself retried.
    pub async fn run_with_fallback(&self, repo: &Path, args: &[String]) -> CommandOutcome {
        let first = self.transport.run(repo, args, self.timeout).await;
        if first.success() || !is_auth_failure(&first.output) {
            return first;
        }

        let hosts = self.candidate_hosts(repo, &first.output).await;
        if hosts.is_empty() {
            return first;
        }

        // Rewrites are transient -c configuration, never persisted
        let mut rewritten = Vec::with_capacity(args.len() + hosts.len() * 4);
        for host in &hosts {
            rewritten.push("-c".to_string());
            rewritten.push(format!("url.https://{host}/.insteadOf=git@{host}:"));
            rewritten.push("-c".to_string());
            rewritten.push(format!("url.https://{host}/.insteadOf=ssh://git@{host}/"));
        }
        rewritten.extend(args.iter().cloned());

        let second = self.transport.run(repo, &rewritten, self.timeout).await;
        if second.success() {
            return second;
        }

        CommandOutcome {
            status: second.status,
            output: format!(
                "{}\n{}\n{}",
                first.output.trim_end(),
                ATTEMPT_SEPARATOR,
                second.output
            ),
        }
    }

    /// Extracts candidate hostnames from, in order: the failed output, the
    /// configured remotes, the recorded submodule configuration. The first
    /// source that yields at least one host wins.
    async fn candidate_hosts(&self, repo: &Path, failed_output: &str) -> Vec<String> {
        let hosts = extract_hosts(failed_output);
        if !hosts.is_empty() {
            return hosts;
        }

        let remotes = self
            .transport
            .run(repo, &to_args(REMOTE_LIST_ARGS), self.timeout)
            .await;
        if remotes.success() {
            let hosts = extract_hosts(&remotes.output);
            if !hosts.is_empty() {
                return hosts;
            }
        }

        match tokio::fs::read_to_string(repo.join(".gitmodules")).await {
            Ok(contents) => extract_hosts(&contents),
            Err(_) => Vec::new(),
        }
    }
}

/// Whether output text matches a known SSH auth failure signature.
#[must_use]
pub fn is_auth_failure(output: &str) -> bool {
    let lower = output.to_lowercase();
    AUTH_FAILURE_PHRASES.iter().any(|p| lower.contains(p))
}

fn is_host_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'.' || b == b'-'
}

/// Extracts hostnames from `git@<host>:` and `ssh://git@<host>/` transport
/// URLs in arbitrary text. Hosts are restricted to `[A-Za-z0-9.-]` so a
/// crafted remote URL cannot smuggle arguments into the retried command.
#[must_use]
pub fn extract_hosts(text: &str) -> Vec<String> {
    let bytes = text.as_bytes();
    let mut hosts: Vec<String> = Vec::new();

    for (i, _) in text.match_indices("git@") {
        let start = i + "git@".len();
        let mut end = start;
        while end < bytes.len() && is_host_byte(bytes[end]) {
            end += 1;
        }
        if end == start {
            continue;
        }
        // scp-style URLs delimit the host with ':', ssh:// URLs with '/';
        // anything else is prose, not a transport URL
        if !matches!(bytes.get(end), Some(b':') | Some(b'/')) {
            continue;
        }
        let host = &text[start..end];
        if !hosts.iter().any(|h| h == host) {
            hosts.push(host.to_string());
        }
    }

    hosts
}
