//! Live progress rendering for the fleet run

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};

use super::config::{PROGRESS_CHARS, PROGRESS_TEMPLATE};

/// Creates the fleet-wide progress bar, one tick per completed repository.
pub fn create_fleet_progress(total: u64) -> Result<ProgressBar> {
    let style = ProgressStyle::default_bar()
        .template(PROGRESS_TEMPLATE)?
        .progress_chars(PROGRESS_CHARS);
    let pb = ProgressBar::new(total);
    pb.set_style(style);
    pb.set_prefix("🔄 syncing");
    Ok(pb)
}
