// hubsnap-core/src/download.rs
// Makes sure single repository files exist locally, running at most one transfer per
// destination path no matter how many callers ask for it at once.

use std::collections::HashMap;
use std::env;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use hubsnap_aio::fs::create_parent_dirs;
use hubsnap_common::cache::Cache;
use hubsnap_common::error::{HubError, Result};
use hubsnap_common::model::RepoId;
use hubsnap_net::http::HubClient;
use hubsnap_net::transfer::{ProgressFn, TransferEngine, TransferRequest};
use once_cell::sync::Lazy;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};
use url::Url;

/// What every caller interested in one destination observes.
#[derive(Debug, Clone)]
enum TransferState {
    Running(f64),
    Finished(Result<PathBuf>),
}

type InFlight = HashMap<PathBuf, watch::Receiver<TransferState>>;

/// Process-wide table of transfers in progress, keyed by absolute destination path. The
/// lock only guards lookups and registration, never a transfer itself.
static IN_FLIGHT: Lazy<Mutex<InFlight>> = Lazy::new(|| Mutex::new(HashMap::new()));

fn in_flight() -> MutexGuard<'static, InFlight> {
    // A panic while holding the lock cannot leave the map half-updated.
    IN_FLIGHT.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Removes the registry entry when the owning transfer task ends, even by panicking.
struct Registration {
    destination: PathBuf,
}

impl Drop for Registration {
    fn drop(&mut self) {
        in_flight().remove(&self.destination);
    }
}

#[derive(Clone)]
pub struct DownloadCoordinator {
    cache: Cache,
    client: HubClient,
    engine: Arc<dyn TransferEngine>,
}

impl DownloadCoordinator {
    pub fn new(cache: Cache, client: HubClient, engine: Arc<dyn TransferEngine>) -> Self {
        Self {
            cache,
            client,
            engine,
        }
    }

    pub fn cache(&self) -> &Cache {
        &self.cache
    }

    /// Absolute local directory for `repo`.
    pub fn repo_root(&self, repo: &RepoId) -> Result<PathBuf> {
        Ok(absolutize(self.cache.repo_root(repo)?))
    }

    /// Absolute local path for one file of `repo`. Fails for filenames that would escape
    /// the repository directory.
    pub fn destination(&self, repo: &RepoId, filename: &str) -> Result<PathBuf> {
        Ok(absolutize(self.cache.resolve(repo, filename)?))
    }

    /// Returns the local path of `filename`, downloading it first if it is not cached.
    ///
    /// Concurrent calls for the same destination share one transfer and all observe its
    /// outcome. Cancelling `cancel` only stops this caller from waiting; the transfer keeps
    /// going for everyone else. `progress` receives transfer fractions, and is never called
    /// on a cache hit.
    #[instrument(skip(self, repo, progress, cancel), fields(repo = %repo))]
    pub async fn ensure(
        &self,
        repo: &RepoId,
        filename: &str,
        progress: Option<ProgressFn>,
        cancel: &CancellationToken,
    ) -> Result<PathBuf> {
        let destination = self.destination(repo, filename)?;

        let receiver = {
            let mut in_flight = in_flight();
            match in_flight.get(&destination) {
                Some(receiver) => {
                    debug!("Joining in-flight transfer for {}", destination.display());
                    receiver.clone()
                }
                None => {
                    if Cache::is_cached(&destination) {
                        debug!("Cache hit: {}", destination.display());
                        return Ok(destination);
                    }
                    debug!("Cache miss: {}", destination.display());
                    let url = self.client.file_url(repo, filename)?;
                    let (sender, receiver) = watch::channel(TransferState::Running(0.0));
                    in_flight.insert(destination.clone(), receiver.clone());
                    self.spawn_transfer(url, destination.clone(), sender);
                    receiver
                }
            }
        };

        wait_for(receiver, progress, cancel).await
    }

    // The transfer runs as its own task so that no single caller's cancellation can tear it
    // down while others are waiting on it.
    fn spawn_transfer(
        &self,
        url: Url,
        destination: PathBuf,
        sender: watch::Sender<TransferState>,
    ) {
        let engine = Arc::clone(&self.engine);
        let token = self.client.token().map(str::to_string);
        tokio::spawn(async move {
            let registration = Registration {
                destination: destination.clone(),
            };
            let sender = Arc::new(sender);
            let outcome = run_transfer(engine.as_ref(), url, destination, token, &sender).await;
            if let Err(e) = &outcome {
                warn!("Transfer to {} failed: {}", registration.destination.display(), e);
            }
            // Deregister first: anyone arriving after the outcome is published must look at
            // the cache again rather than join a finished transfer.
            drop(registration);
            sender.send_replace(TransferState::Finished(outcome));
        });
    }
}

async fn run_transfer(
    engine: &dyn TransferEngine,
    url: Url,
    destination: PathBuf,
    token: Option<String>,
    sender: &Arc<watch::Sender<TransferState>>,
) -> Result<PathBuf> {
    create_parent_dirs(&destination).await?;

    let progress_sender = Arc::clone(sender);
    let progress: ProgressFn = Arc::new(move |fraction: f64| {
        progress_sender.send_if_modified(|state| match state {
            TransferState::Running(current) if fraction > *current => {
                *current = fraction.min(1.0);
                true
            }
            _ => false,
        });
    });

    debug!("Starting transfer {} -> {}", url, destination.display());
    engine
        .transfer(
            TransferRequest {
                url,
                destination: destination.clone(),
                token,
            },
            progress,
        )
        .await?;
    debug!("Transfer complete: {}", destination.display());
    Ok(destination)
}

async fn wait_for(
    mut receiver: watch::Receiver<TransferState>,
    progress: Option<ProgressFn>,
    cancel: &CancellationToken,
) -> Result<PathBuf> {
    let mut last_reported = 0.0;
    loop {
        let state = receiver.borrow_and_update().clone();
        match state {
            TransferState::Finished(outcome) => return outcome,
            TransferState::Running(fraction) => {
                if let Some(progress) = &progress {
                    if fraction > last_reported {
                        last_reported = fraction;
                        progress(fraction);
                    }
                }
            }
        }

        tokio::select! {
            changed = receiver.changed() => {
                if changed.is_err() {
                    // The owning task is gone. It may still have published an outcome.
                    if let TransferState::Finished(outcome) = &*receiver.borrow() {
                        return outcome.clone();
                    }
                    return Err(HubError::Transport(
                        "transfer task ended without reporting an outcome".to_string(),
                    ));
                }
            }
            _ = cancel.cancelled() => {
                debug!("Caller cancelled; leaving shared transfer running");
                return Err(HubError::Cancelled);
            }
        }
    }
}

fn absolutize(path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        return path;
    }
    match env::current_dir() {
        Ok(cwd) => cwd.join(path),
        Err(_) => path,
    }
}
