//! Public API for the core module.
//!
//! This module provides the stable public API for core functionality:
//! - Repository discovery and classification
//! - The on-disk repository cache
//! - Fleet orchestration and statistics
//!
//! Internal implementation details are not exposed through this API.

// Discovery
pub use super::discovery::{
    classify_repo, find_repo_paths, name_repositories, RepoKind, Repository,
};

// Cache
pub use super::cache::{cache_path, load as load_cache, save as save_cache};

// Orchestration
pub use super::orchestrator::{prepare_repositories, FleetOrchestrator, FleetSummary};
pub use super::stats::FleetStatistics;

// Configuration
pub use super::config::{resolve_workers, DEFAULT_REPORT_FILE, DEFAULT_WORKERS, MAX_WORKERS};

// User-facing messages
pub use super::config::{NO_REPOS_MESSAGE, SCANNING_MESSAGE};
