// hubsnap-core/src/snapshot.rs
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use hubsnap_common::error::{HubError, Result};
use hubsnap_common::model::{ProgressTracker, RepoId, SnapshotProgress};
use hubsnap_net::catalog;
use hubsnap_net::http::HubClient;
use hubsnap_net::transfer::ProgressFn;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::download::DownloadCoordinator;

/// Stream of overall progress updates for one snapshot.
pub type ProgressSender = mpsc::UnboundedSender<SnapshotProgress>;

/// Makes sure every file of `repo` selected by `globs` exists locally and returns the local
/// repository root.
///
/// Files are handled one at a time in catalog order. The first failure ends the snapshot
/// with that error; files fetched before it stay on disk and later files are not attempted.
pub async fn snapshot<S: AsRef<str>>(
    client: &HubClient,
    coordinator: &DownloadCoordinator,
    repo: &RepoId,
    globs: &[S],
    progress: Option<&ProgressSender>,
    cancel: &CancellationToken,
) -> Result<PathBuf> {
    let filenames = tokio::select! {
        listed = catalog::list_files(client, repo, globs) => listed?,
        _ = cancel.cancelled() => return Err(HubError::Cancelled),
    };
    let repo_root = coordinator.repo_root(repo)?;
    // A listing entry that would land outside the repository fails the snapshot before
    // anything is written.
    for filename in &filenames {
        coordinator.destination(repo, filename)?;
    }
    let tracker = Arc::new(Mutex::new(ProgressTracker::new(filenames.len())));

    if filenames.is_empty() {
        debug!("No files of {} matched; nothing to download", repo);
        let update = {
            let mut tracker = lock(&tracker);
            tracker.update_file(1.0);
            tracker.progress(None)
        };
        report(progress, update);
        return Ok(repo_root);
    }

    info!("Snapshot of {}: {} file(s)", repo, filenames.len());
    for filename in &filenames {
        if cancel.is_cancelled() {
            return Err(HubError::Cancelled);
        }

        let file_progress = progress.map(|sender| file_progress(&tracker, sender, filename));
        coordinator
            .ensure(repo, filename, file_progress, cancel)
            .await?;

        // Pinned to full weight whatever the transfer last reported.
        let update = {
            let mut tracker = lock(&tracker);
            tracker.complete_file();
            tracker.progress(Some(filename))
        };
        report(progress, update);
    }

    debug!("Snapshot of {} ready at {}", repo, repo_root.display());
    Ok(repo_root)
}

/// Routes one file's transfer fractions into its slice of the overall progress.
fn file_progress(
    tracker: &Arc<Mutex<ProgressTracker>>,
    sender: &ProgressSender,
    filename: &str,
) -> ProgressFn {
    let tracker = Arc::clone(tracker);
    let sender = sender.clone();
    let filename = filename.to_string();
    Arc::new(move |fraction| {
        let update = {
            let mut tracker = lock(&tracker);
            tracker.update_file(fraction);
            tracker.progress(Some(&filename))
        };
        // A dropped receiver just means nobody is watching.
        let _ = sender.send(update);
    })
}

fn report(progress: Option<&ProgressSender>, update: SnapshotProgress) {
    if let Some(sender) = progress {
        let _ = sender.send(update);
    }
}

fn lock(tracker: &Mutex<ProgressTracker>) -> MutexGuard<'_, ProgressTracker> {
    tracker.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
