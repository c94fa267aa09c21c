//! # git-fleet
//!
//! `git-fleet` is a library for keeping a tree of independently-cloned git
//! working copies synchronized with their remotes, concurrently. It powers
//! the `git-fleet` CLI tool.
//!
//! ## Core Features
//!
//! - **Fast Discovery**: Parallel repository scanning using `ignore`, with
//!   a validated on-disk cache for instant startup.
//! - **Concurrent Sync**: A bounded worker pool fetches hundreds of repos,
//!   diffing remote-tracking refs to report exactly which commits are new.
//! - **SSH Fallback**: Recognized SSH auth failures are retried once over
//!   HTTPS with transient URL rewrites.
//! - **Submodule Reconciliation**: Nested repositories are synced to their
//!   superproject-recorded commits and their remotes kept current.
//!
//! ## Example
//!
//! ```rust,no_run
//! use git_fleet::core::prepare_repositories;
//!
//! #[tokio::main]
//! async fn main() {
//!     let repos = prepare_repositories(std::path::Path::new("."), false).await;
//!     for repo in repos {
//!         println!("{}: {}", repo.name, repo.path.display());
//!     }
//! }
//! ```

pub mod core;
pub mod git;
pub mod report;
pub mod sync;
pub mod utils;
