//! End-of-run reporting
//!
//! Renders the terminal summary and the persisted Markdown report from the
//! ordered result sequence the orchestrator hands back.

use anyhow::{Context, Result};
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use crate::core::FleetSummary;
use crate::sync::{LogEntry, RepoSyncResult};
use crate::utils::shorten_path;

use crate::core::config::PATH_DISPLAY_WIDTH;

/// Prints the end-of-run summary: one status line, then the repositories
/// that need attention. Up-to-date repositories stay quiet unless verbose.
pub fn print_summary(summary: &FleetSummary, verbose: bool) {
    println!();
    println!("{}", summary.stats.summary_line(summary.duration));

    let updated: Vec<&RepoSyncResult> = summary
        .results
        .iter()
        .filter(|r| !r.failed && r.new_commits > 0)
        .collect();
    let failed: Vec<&RepoSyncResult> = summary.results.iter().filter(|r| r.failed).collect();
    let warned: Vec<&RepoSyncResult> = summary
        .results
        .iter()
        .filter(|r| {
            !r.failed && r.entries.iter().any(|e| matches!(e, LogEntry::Warning(_)))
        })
        .collect();

    let mut sections = Vec::new();

    if !updated.is_empty() {
        let mut lines = vec![format!("🟢 UPDATED ({})", updated.len())];
        for (i, repo) in updated.iter().enumerate() {
            let commit_word = if repo.new_commits == 1 { "commit" } else { "commits" };
            lines.push(format!(
                "   {} {:20} {} new {}",
                tree_char(i, updated.len()),
                repo.name,
                repo.new_commits,
                commit_word
            ));
        }
        sections.push(lines.join("\n"));
    }

    if !warned.is_empty() {
        let mut lines = vec![format!("⚠️  WARNINGS ({})", warned.len())];
        for (i, repo) in warned.iter().enumerate() {
            let first = repo
                .entries
                .iter()
                .find_map(|e| match e {
                    LogEntry::Warning(s) => Some(s.as_str()),
                    _ => None,
                })
                .unwrap_or("");
            lines.push(format!(
                "   {} {:20} {}",
                tree_char(i, warned.len()),
                repo.name,
                condense(first)
            ));
        }
        sections.push(lines.join("\n"));
    }

    if !failed.is_empty() {
        let mut lines = vec![format!("🔴 FAILED REPOS ({})", failed.len())];
        for (i, repo) in failed.iter().enumerate() {
            let short_path = shorten_path(&repo.path.to_string_lossy(), PATH_DISPLAY_WIDTH);
            let error = condense(repo.first_error().unwrap_or(""));
            lines.push(format!(
                "   {} {:20} {:30} # {}",
                tree_char(i, failed.len()),
                repo.name,
                short_path,
                error
            ));
        }
        sections.push(lines.join("\n"));
    }

    if !sections.is_empty() {
        println!("\n{}", "━".repeat(70));
        println!("{}", sections.join("\n\n"));
        println!("{}", "━".repeat(70));
    }

    if verbose {
        for repo in &summary.results {
            println!();
            println!("{} {} ({})", repo.symbol(), repo.name, repo.status_text());
            for entry in &repo.entries {
                println!("   {} {}", entry.marker(), entry.text());
            }
        }
    }

    println!();
}

/// Renders the Markdown report: counts, then a section for every
/// repository with logged activity.
#[must_use]
pub fn render_markdown(summary: &FleetSummary) -> String {
    let mut doc = String::new();
    let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");

    let _ = writeln!(doc, "# Fleet sync report");
    let _ = writeln!(doc);
    let _ = writeln!(doc, "Generated: {timestamp}");
    let _ = writeln!(doc);
    let _ = writeln!(doc, "## Summary");
    let _ = writeln!(doc);
    let _ = writeln!(doc, "- Processed: {}", summary.stats.processed);
    let _ = writeln!(
        doc,
        "- Updated: {} ({} new commits)",
        summary.stats.updated, summary.stats.new_commits
    );
    let _ = writeln!(doc, "- Failed: {}", summary.stats.failed);
    let _ = writeln!(
        doc,
        "- Duration: {:.1}s",
        summary.duration.as_secs_f64()
    );

    let active: Vec<&RepoSyncResult> =
        summary.results.iter().filter(|r| r.has_activity()).collect();
    let quiet = summary.results.len() - active.len();
    if quiet > 0 {
        let _ = writeln!(doc, "- Up to date without changes: {quiet}");
    }

    for repo in active {
        let _ = writeln!(doc);
        let _ = writeln!(doc, "## {} ({})", repo.name, repo.status_text());
        let _ = writeln!(doc);
        let _ = writeln!(doc, "`{}`", repo.path.display());
        let _ = writeln!(doc);
        for entry in &repo.entries {
            match entry {
                LogEntry::Commit(text) => {
                    let _ = writeln!(doc, "- `{text}`");
                }
                other => {
                    let _ = writeln!(doc, "- {} {}", other.marker(), other.text());
                }
            }
        }
    }

    doc
}

/// Writes the Markdown report to disk.
pub fn write_markdown(path: &Path, summary: &FleetSummary) -> Result<()> {
    fs::write(path, render_markdown(summary))
        .with_context(|| format!("could not write report to {}", path.display()))
}

fn tree_char(index: usize, len: usize) -> &'static str {
    if index == len - 1 {
        "└─"
    } else {
        "├─"
    }
}

/// Collapses whitespace and truncates long error text for one-line display
fn condense(text: &str) -> String {
    let cleaned = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if cleaned.chars().count() > 80 {
        let head: String = cleaned.chars().take(77).collect();
        format!("{head}...")
    } else {
        cleaned
    }
}
