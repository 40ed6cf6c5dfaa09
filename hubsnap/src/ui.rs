// hubsnap/src/ui.rs
//! Terminal progress elements shared by the subcommands.

use std::time::Duration;

use hubsnap_common::model::SnapshotProgress;
use indicatif::{ProgressBar, ProgressStyle};

/// Resolution of the snapshot bar; overall fractions are mapped onto `0..=BAR_LENGTH`.
const BAR_LENGTH: u64 = 1000;

/// Spinner for short requests with no measurable progress.
pub fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.blue.bold} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

pub fn create_snapshot_bar(label: &str) -> ProgressBar {
    let pb = ProgressBar::new(BAR_LENGTH);
    pb.set_style(
        ProgressStyle::with_template(
            "{prefix:.bold} [{bar:40.cyan/blue}] {percent:>3}% {msg} ({elapsed_precise})",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> "),
    );
    pb.set_prefix(label.to_string());
    pb.enable_steady_tick(Duration::from_millis(200));
    pb
}

pub fn apply_progress(pb: &ProgressBar, update: &SnapshotProgress) {
    pb.set_position((update.fraction * BAR_LENGTH as f64).round() as u64);
    let file = update.current_file.as_deref().unwrap_or("");
    pb.set_message(format!(
        "{}/{} {}",
        update.completed_files, update.total_files, file
    ));
}
