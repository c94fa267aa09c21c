//! Repository discovery and classification

use dashmap::DashMap;
use ignore::WalkBuilder;
use rayon::prelude::*;
use std::collections::HashMap;
use std::fs;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::config::{
    ESTIMATED_REPO_COUNT, MAX_SCAN_DEPTH, SKIP_DIRECTORIES, UNKNOWN_REPO_NAME,
};

/// A repository in the working set, identified by its path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    pub name: String,
    pub path: PathBuf,
}

/// What a directory's `.git` entry says about it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepoKind {
    /// A repository root we sync directly.
    Standalone,
    /// A submodule working tree; reached only through its superproject.
    Nested,
    NotARepo,
}

/// Reads the `gitdir:` target out of a `.git` pointer file.
/// Only the first few lines are read; the pointer is typically one line.
fn read_gitdir_target(git_file: &Path) -> Option<String> {
    let file = fs::File::open(git_file).ok()?;
    BufReader::new(file)
        .lines()
        .take(5)
        .filter_map(Result::ok)
        .find_map(|line| {
            line.trim_start()
                .strip_prefix("gitdir:")
                .map(|target| target.trim().to_string())
        })
}

/// Classifies a directory by inspecting its `.git` entry.
///
/// A `.git` pointer file whose target lives under a superproject's
/// internal modules directory marks a nested submodule working tree.
#[must_use]
pub fn classify_repo(path: &Path) -> RepoKind {
    let git_path = path.join(".git");
    let Ok(meta) = fs::metadata(&git_path) else {
        return RepoKind::NotARepo;
    };
    if meta.is_dir() {
        return RepoKind::Standalone;
    }
    match read_gitdir_target(&git_path) {
        Some(target) if target.replace('\\', "/").contains(".git/modules") => RepoKind::Nested,
        Some(_) => RepoKind::Standalone, // worktrees also use a pointer file
        None => RepoKind::NotARepo,
    }
}

/// Searches for repository roots under `root` and returns their paths,
/// sorted for determinism.
///
/// Uses parallel directory walking for large trees. A directory classified
/// as a repository root is never descended into; its nested repositories
/// are reachable only through submodule reconciliation.
#[must_use]
pub fn find_repo_paths(root: &Path) -> Vec<PathBuf> {
    // The scan root itself may be a repository, in which case there is
    // nothing further to discover below it
    match classify_repo(root) {
        RepoKind::Standalone => return vec![root.to_path_buf()],
        RepoKind::Nested => return Vec::new(),
        RepoKind::NotARepo => {}
    }

    // DashMap gives lock-free dedup across the walker's threads
    let repos: Arc<DashMap<PathBuf, ()>> = Arc::new(DashMap::with_capacity(ESTIMATED_REPO_COUNT));
    let repos_clone = Arc::clone(&repos);

    let walker = WalkBuilder::new(root)
        .follow_links(true)
        .max_depth(Some(MAX_SCAN_DEPTH))
        .threads(num_cpus::get().min(8))
        .hidden(false)
        .filter_entry(move |entry| {
            let Some(file_name) = entry.file_name().to_str() else {
                return true;
            };
            if SKIP_DIRECTORIES.contains(&file_name) {
                return false;
            }
            // Hidden directories (.config, .cargo, ...) are never repo roots
            // we want; .git itself is covered by the classification below
            if entry.depth() > 0 && file_name.starts_with('.') {
                return false;
            }
            if !entry.file_type().is_some_and(|ft| ft.is_dir()) {
                return true;
            }
            match classify_repo(entry.path()) {
                RepoKind::Standalone => {
                    repos_clone.insert(entry.path().to_path_buf(), ());
                    false // repo roots are not descended into
                }
                RepoKind::Nested => false,
                RepoKind::NotARepo => true,
            }
        })
        .build_parallel();

    walker.run(|| Box::new(|_| ignore::WalkState::Continue));

    let mut paths: Vec<PathBuf> = Arc::try_unwrap(repos)
        .map(|map| map.into_iter().map(|(path, ())| path).collect())
        .unwrap_or_else(|arc| arc.iter().map(|r| r.key().clone()).collect());

    paths.par_sort();
    paths
}

/// Derives display names from paths, suffixing duplicates, and sorts the
/// result alphabetically by name (case-insensitive).
#[must_use]
pub fn name_repositories(paths: Vec<PathBuf>) -> Vec<Repository> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut repos = Vec::with_capacity(paths.len());

    for path in paths {
        let base = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(UNKNOWN_REPO_NAME)
            .to_string();
        let count = counts.entry(base.clone()).or_insert(0);
        *count += 1;
        let name = if *count > 1 {
            format!("{base}-{count}")
        } else {
            base
        };
        repos.push(Repository { name, path });
    }

    repos.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
    repos
}
