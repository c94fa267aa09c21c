//! git-fleet: keeps a tree of git working copies synchronized with their
//! remotes, concurrently, and reports what changed.

use anyhow::{bail, Result};
use clap::{Arg, ArgAction, Command as ClapCommand};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use git_fleet::core::{
    prepare_repositories, resolve_workers, FleetOrchestrator, DEFAULT_REPORT_FILE,
    NO_REPOS_MESSAGE, SCANNING_MESSAGE,
};
use git_fleet::git::SystemTransport;
use git_fleet::report;
use git_fleet::sync::{PullMode, SyncOptions};
use git_fleet::utils::{set_terminal_title, set_terminal_title_and_flush};

fn cli() -> ClapCommand {
    ClapCommand::new("git-fleet")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Concurrent multi-repository git synchronization")
        .arg(
            Arg::new("jobs")
                .short('j')
                .long("jobs")
                .value_name("N")
                .value_parser(clap::value_parser!(usize))
                .help("Number of repositories synced in parallel (1-64)"),
        )
        .arg(
            Arg::new("refresh")
                .short('r')
                .long("refresh")
                .action(ArgAction::SetTrue)
                .help("Ignore the repository cache and rescan the root"),
        )
        .arg(
            Arg::new("root")
                .long("root")
                .value_name("DIR")
                .value_parser(clap::value_parser!(PathBuf))
                .default_value(".")
                .help("Directory to scan for repositories"),
        )
        .arg(
            Arg::new("timeout")
                .long("timeout")
                .value_name("SECS")
                .value_parser(clap::value_parser!(u64).range(1..))
                .help("Per-command timeout in seconds"),
        )
        .arg(
            Arg::new("fetch-only")
                .long("fetch-only")
                .action(ArgAction::SetTrue)
                .conflicts_with("force-sync")
                .help("Fetch and report only; never touch working trees"),
        )
        .arg(
            Arg::new("force-sync")
                .long("force-sync")
                .action(ArgAction::SetTrue)
                .help("Destructively reset working trees onto the remote default branch"),
        )
        .arg(
            Arg::new("clean")
                .long("clean")
                .action(ArgAction::SetTrue)
                .help("With --force-sync, also remove untracked and ignored files"),
        )
        .arg(
            Arg::new("no-init")
                .long("no-init")
                .action(ArgAction::SetTrue)
                .help("Do not initialize uninitialized submodules"),
        )
        .arg(
            Arg::new("report")
                .long("report")
                .value_name("FILE")
                .value_parser(clap::value_parser!(PathBuf))
                .help("Where to write the Markdown report (default: <root>/fleet-report.md)"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::SetTrue)
                .help("Print every repository's activity in the summary"),
        )
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = cli().get_matches();

    // Configuration errors abort before any work starts
    let workers = resolve_workers(matches.get_one::<usize>("jobs").copied())?;
    let root = matches
        .get_one::<PathBuf>("root")
        .expect("root has a default value");
    let root = match root.canonicalize() {
        Ok(root) if root.is_dir() => root,
        _ => bail!("scan root {} is not a directory", root.display()),
    };

    let mut options = SyncOptions::default();
    if matches.get_flag("fetch-only") {
        options.pull = PullMode::FetchOnly;
    } else if matches.get_flag("force-sync") {
        options.pull = PullMode::Forced;
    }
    options.clean_untracked = matches.get_flag("clean");
    options.init_submodules = !matches.get_flag("no-init");
    if let Some(secs) = matches.get_one::<u64>("timeout") {
        options.command_timeout = Duration::from_secs(*secs);
    }

    let report_path = matches
        .get_one::<PathBuf>("report")
        .cloned()
        .unwrap_or_else(|| root.join(DEFAULT_REPORT_FILE));

    set_terminal_title("🚀 git-fleet");
    println!();
    print!("{SCANNING_MESSAGE}");
    let _ = std::io::stdout().flush();

    let repos = prepare_repositories(&root, matches.get_flag("refresh")).await;
    if repos.is_empty() {
        println!("\r{NO_REPOS_MESSAGE}");
        set_terminal_title_and_flush("✅ git-fleet");
        return Ok(());
    }

    let total = repos.len();
    let repo_word = if total == 1 { "repository" } else { "repositories" };
    print!("\r🚀 Syncing {total} {repo_word} ({workers} workers)                    \n");
    println!();

    let orchestrator = FleetOrchestrator::new(Arc::new(SystemTransport), options, workers);
    let summary = orchestrator.run(repos).await;

    report::print_summary(&summary, matches.get_flag("verbose"));
    if let Err(e) = report::write_markdown(&report_path, &summary) {
        // The run itself completed; a missing report is not a failure
        eprintln!("Warning: {e}");
    } else {
        println!("📄 Report written to {}", report_path.display());
    }

    set_terminal_title_and_flush("✅ git-fleet");
    Ok(())
}
