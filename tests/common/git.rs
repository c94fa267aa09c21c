//! Real-git testing utilities

use anyhow::Result;
use std::path::Path;
use std::process::Command;

/// Checks if git is available in the system
pub fn is_git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}

/// Sets up a git repository with user config
pub fn setup_git_repo(path: &Path) -> Result<()> {
    let init_result = Command::new("git")
        .args(["init", "-q"])
        .current_dir(path)
        .output()?;
    if !init_result.status.success() {
        anyhow::bail!("git init failed");
    }

    Command::new("git")
        .args(["config", "user.name", "Test User"])
        .current_dir(path)
        .output()?;
    Command::new("git")
        .args(["config", "user.email", "test@example.com"])
        .current_dir(path)
        .output()?;
    Command::new("git")
        .args(["config", "commit.gpgsign", "false"])
        .current_dir(path)
        .output()?;

    Ok(())
}

/// Creates a test commit in the repository
pub fn create_test_commit(path: &Path, file_name: &str, content: &str, message: &str) -> Result<()> {
    std::fs::write(path.join(file_name), content)?;

    Command::new("git")
        .args(["add", file_name])
        .current_dir(path)
        .output()?;

    let commit_result = Command::new("git")
        .args(["commit", "-q", "-m", message])
        .current_dir(path)
        .output()?;
    if !commit_result.status.success() {
        anyhow::bail!(
            "Failed to create commit: {}",
            String::from_utf8_lossy(&commit_result.stderr)
        );
    }

    Ok(())
}

/// Clones `source` into `dest` over the local filesystem
pub fn clone_repo(source: &Path, dest: &Path) -> Result<()> {
    let result = Command::new("git")
        .args([
            "clone",
            "-q",
            &source.to_string_lossy(),
            &dest.to_string_lossy(),
        ])
        .output()?;
    if !result.status.success() {
        anyhow::bail!(
            "git clone failed: {}",
            String::from_utf8_lossy(&result.stderr)
        );
    }

    // The clone needs an identity too, some tests commit inside it
    Command::new("git")
        .args(["config", "user.name", "Test User"])
        .current_dir(dest)
        .output()?;
    Command::new("git")
        .args(["config", "user.email", "test@example.com"])
        .current_dir(dest)
        .output()?;

    Ok(())
}
