//! Per-repository synchronization workflow and policies

use std::time::Duration;

pub mod result;
pub mod submodules;
pub mod workflow;

// Re-export commonly used items
pub use result::*;
pub use workflow::*;

use crate::core::config::{
    DEFAULT_COMMAND_TIMEOUT_SECS, FETCH_ATTEMPTS, FETCH_RETRY_BACKOFF_SECS,
};

/// Working-tree update policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PullMode {
    /// Fetch and report only; the working tree is never touched.
    FetchOnly,
    /// Fast-forward-only pull; divergence is a failure, never a rewrite.
    FastForward,
    /// Destructively reset the working tree onto the remote default branch.
    /// Opt-in only.
    Forced,
}

/// Policy knobs for one sync run, shared by every repository.
#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub pull: PullMode,
    /// Remove untracked and ignored files around a forced sync.
    pub clean_untracked: bool,
    /// Initialize uninitialized submodules during reconciliation.
    pub init_submodules: bool,
    pub command_timeout: Duration,
    pub fetch_attempts: u32,
    pub retry_backoff: Duration,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            pull: PullMode::FastForward,
            clean_untracked: false,
            init_submodules: true,
            command_timeout: Duration::from_secs(DEFAULT_COMMAND_TIMEOUT_SECS),
            fetch_attempts: FETCH_ATTEMPTS,
            retry_backoff: Duration::from_secs(FETCH_RETRY_BACKOFF_SECS),
        }
    }
}

/// Signals that the workflow reached its absorbing failure state; the
/// cause has already been recorded on the result.
pub(crate) struct Halted;
