//! External git command execution with timeouts

use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;

/// How an external git invocation finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitStatus {
    /// The process exited on its own with this code.
    Exited(i32),
    /// The process exceeded its timeout and was killed.
    Timeout,
    /// The process could not be started at all.
    SpawnFailed,
}

impl ExitStatus {
    #[must_use]
    pub fn success(&self) -> bool {
        matches!(self, ExitStatus::Exited(0))
    }
}

/// Result of one external git invocation.
#[derive(Debug, Clone)]
pub struct CommandOutcome {
    pub status: ExitStatus,
    /// stdout and stderr interleaved in read order.
    pub output: String,
}

impl CommandOutcome {
    #[must_use]
    pub fn success(&self) -> bool {
        self.status.success()
    }
}

/// The seam through which every git command runs.
///
/// Implementations must never prompt for input; callers rely on commands
/// either completing or failing within the given timeout.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn run(&self, workdir: &Path, args: &[String], timeout: Duration) -> CommandOutcome;
}

/// Converts a static argument list into the owned form `Transport` takes
#[must_use]
pub fn to_args(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|s| (*s).to_string()).collect()
}

/// Spawns the real `git` binary as a child process.
pub struct SystemTransport;

#[async_trait]
impl Transport for SystemTransport {
    async fn run(&self, workdir: &Path, args: &[String], timeout: Duration) -> CommandOutcome {
        let mut child = match Command::new("git")
            .args(args)
            .current_dir(workdir)
            // Credential prompts would hang a worker for the full timeout
            .env("GIT_TERMINAL_PROMPT", "0")
            .env("GIT_SSH_COMMAND", "ssh -oBatchMode=yes")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
        {
            Ok(child) => child,
            Err(e) => {
                return CommandOutcome {
                    status: ExitStatus::SpawnFailed,
                    output: e.to_string(),
                }
            }
        };

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        let result = tokio::time::timeout(timeout, async {
            let output = drain_interleaved(stdout, stderr).await;
            let status = child.wait().await;
            (status, output)
        })
        .await;

        match result {
            Ok((Ok(status), output)) => CommandOutcome {
                status: ExitStatus::Exited(status.code().unwrap_or(-1)),
                output,
            },
            Ok((Err(e), _)) => CommandOutcome {
                status: ExitStatus::SpawnFailed,
                output: e.to_string(),
            },
            Err(_) => {
                let _ = child.kill().await;
                CommandOutcome {
                    status: ExitStatus::Timeout,
                    output: format!("Timeout ({}s)", timeout.as_secs()),
                }
            }
        }
    }
}

/// Reads the given chunk from an open pipe, closing it on EOF or error.
/// Returns the bytes read, empty when the pipe is exhausted.
async fn read_chunk<R: AsyncRead + Unpin>(reader: &mut Option<R>, scratch: &mut [u8]) -> Vec<u8> {
    let Some(r) = reader.as_mut() else {
        return Vec::new();
    };
    match r.read(scratch).await {
        Ok(0) | Err(_) => {
            *reader = None;
            Vec::new()
        }
        Ok(n) => scratch[..n].to_vec(),
    }
}

/// Drains stdout and stderr concurrently into one buffer, appending chunks
/// in the order they arrive so the combined output reads like a terminal.
async fn drain_interleaved<O, E>(stdout: Option<O>, stderr: Option<E>) -> String
where
    O: AsyncRead + Unpin,
    E: AsyncRead + Unpin,
{
    let mut stdout = stdout;
    let mut stderr = stderr;
    let mut out_scratch = [0u8; 4096];
    let mut err_scratch = [0u8; 4096];
    let mut combined: Vec<u8> = Vec::new();

    loop {
        let chunk = tokio::select! {
            c = read_chunk(&mut stdout, &mut out_scratch), if stdout.is_some() => c,
            c = read_chunk(&mut stderr, &mut err_scratch), if stderr.is_some() => c,
            else => break,
        };
        combined.extend_from_slice(&chunk);
    }

    String::from_utf8_lossy(&combined).into_owned()
}
