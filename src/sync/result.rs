//! Per-repository sync results and log entries

use std::path::{Path, PathBuf};

/// One line of recorded activity for a repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogEntry {
    Plain(String),
    Warning(String),
    Error(String),
    Commit(String),
}

impl LogEntry {
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            LogEntry::Plain(s) | LogEntry::Warning(s) | LogEntry::Error(s) | LogEntry::Commit(s) => {
                s
            }
        }
    }

    /// Marker used when rendering the entry in reports.
    #[must_use]
    pub fn marker(&self) -> &'static str {
        match self {
            LogEntry::Plain(_) => "·",
            LogEntry::Warning(_) => "⚠️",
            LogEntry::Error(_) => "❌",
            LogEntry::Commit(_) => "•",
        }
    }
}

/// Outcome of syncing one repository.
///
/// Mutated only by the worker that owns the repository; handed to the
/// orchestrator as-is once the workflow reaches a terminal state.
#[derive(Debug, Clone)]
pub struct RepoSyncResult {
    pub name: String,
    pub path: PathBuf,
    pub failed: bool,
    pub new_commits: usize,
    pub entries: Vec<LogEntry>,
}

impl RepoSyncResult {
    #[must_use]
    pub fn new(name: &str, path: &Path) -> Self {
        Self {
            name: name.to_string(),
            path: path.to_path_buf(),
            failed: false,
            new_commits: 0,
            entries: Vec::new(),
        }
    }

    pub fn plain(&mut self, message: impl Into<String>) {
        self.entries.push(LogEntry::Plain(message.into()));
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.entries.push(LogEntry::Warning(message.into()));
    }

    pub fn commit(&mut self, line: impl Into<String>) {
        self.entries.push(LogEntry::Commit(line.into()));
    }

    /// Marks the workflow failed, attaching the command output that caused it.
    pub fn fail(&mut self, context: impl Into<String>, output: &str) {
        self.failed = true;
        let context = context.into();
        let message = if output.trim().is_empty() {
            context
        } else {
            format!("{context}: {}", output.trim())
        };
        self.entries.push(LogEntry::Error(message));
    }

    #[must_use]
    pub fn has_activity(&self) -> bool {
        !self.entries.is_empty()
    }

    /// First recorded error text, if the workflow failed.
    #[must_use]
    pub fn first_error(&self) -> Option<&str> {
        self.entries.iter().find_map(|entry| match entry {
            LogEntry::Error(s) => Some(s.as_str()),
            _ => None,
        })
    }

    /// Returns the emoji symbol for this result
    #[must_use]
    pub fn symbol(&self) -> &'static str {
        if self.failed {
            "🔴"
        } else if self.new_commits > 0 {
            "🟢"
        } else {
            "🟠"
        }
    }

    /// Returns the text representation of this result
    #[must_use]
    pub fn status_text(&self) -> &'static str {
        if self.failed {
            "failed"
        } else if self.new_commits > 0 {
            "updated"
        } else {
            "up to date"
        }
    }
}
