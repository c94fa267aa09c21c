//! Repository list cache
//!
//! The scan root carries a JSON array of absolute repository paths so a
//! run can skip the directory walk. A loaded cache is accepted only if
//! every entry still validates as a standalone repository; any stale entry
//! discards the whole cache and triggers a rescan. Correctness over
//! cache-hit rate.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use super::config::CACHE_FILE_NAME;
use super::discovery::{classify_repo, name_repositories, RepoKind, Repository};

#[must_use]
pub fn cache_path(root: &Path) -> PathBuf {
    root.join(CACHE_FILE_NAME)
}

/// Loads and re-validates the cached repository list.
/// Returns `None` on any miss (absent file, unreadable JSON, or a stale
/// entry); callers fall back to a fresh scan.
#[must_use]
pub fn load(root: &Path) -> Option<Vec<Repository>> {
    let raw = fs::read_to_string(cache_path(root)).ok()?;
    let paths: Vec<PathBuf> = serde_json::from_str(&raw).ok()?;
    if paths.is_empty() {
        return None;
    }
    for path in &paths {
        if classify_repo(path) != RepoKind::Standalone {
            return None;
        }
    }
    Some(name_repositories(paths))
}

/// Persists the repository list for the next run.
pub fn save(root: &Path, repos: &[Repository]) -> Result<()> {
    let paths: Vec<&Path> = repos.iter().map(|r| r.path.as_path()).collect();
    let json = serde_json::to_string_pretty(&paths)?;
    fs::write(cache_path(root), json)
        .with_context(|| format!("could not write {}", cache_path(root).display()))?;
    Ok(())
}
