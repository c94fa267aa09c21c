//! Configuration constants and settings

use anyhow::{bail, Result};

// Concurrency Configuration
//
// Repositories are independent units of work, so the pool size only
// bounds how hard we hit the local disk and the remote hosts at once.

/// Default worker pool size for I/O-bound git operations
pub const DEFAULT_WORKERS: usize = 6;
/// Upper bound on the worker pool; more workers than this mostly
/// contends on the network
pub const MAX_WORKERS: usize = 64;

/// Resolves the worker pool size from CLI args and system resources.
///
/// An explicit `--jobs N` is validated against 1..=64; the default is
/// capped by the machine's core count.
pub fn resolve_workers(jobs: Option<usize>) -> Result<usize> {
    match jobs {
        Some(n) if n == 0 || n > MAX_WORKERS => {
            bail!("--jobs must be between 1 and {MAX_WORKERS}, got {n}")
        }
        Some(n) => Ok(n),
        None => Ok(DEFAULT_WORKERS.min(num_cpus::get().max(1))),
    }
}

// Command execution
pub const DEFAULT_COMMAND_TIMEOUT_SECS: u64 = 60;
pub const FETCH_ATTEMPTS: u32 = 3;
pub const FETCH_RETRY_BACKOFF_SECS: u64 = 2;

// File names written into the scan root
pub const CACHE_FILE_NAME: &str = ".git_fleet_cache.json";
pub const DEFAULT_REPORT_FILE: &str = "fleet-report.md";

// UI Constants
pub const NO_REPOS_MESSAGE: &str = "No git repositories found under the scan root.";
pub const SCANNING_MESSAGE: &str = "🔍 Scanning for git repositories...";
pub const PROGRESS_CHARS: &str = "##-";
pub const PROGRESS_TEMPLATE: &str = "{prefix:.bold} [{bar:30}] {pos}/{len} {wide_msg}";

// Display formatting constants
pub const PATH_DISPLAY_WIDTH: usize = 30;

// Repository discovery configuration
pub const MAX_SCAN_DEPTH: usize = 10; // Maximum directory depth to scan
pub const ESTIMATED_REPO_COUNT: usize = 50; // Pre-allocation hint for collections
pub const UNKNOWN_REPO_NAME: &str = "unknown";

// Directories to skip during repository search
pub const SKIP_DIRECTORIES: &[&str] = &[
    "node_modules",
    "vendor",
    "target",
    "build",
    ".next",
    "dist",
    "__pycache__",
    ".venv",
    "venv",
];
