use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use futures::StreamExt;
use hubsnap_aio::fs::{finalize_download, remove_file_if_exists, temp_download_path};
use hubsnap_common::error::{HubError, Result};
use reqwest::Client;
use tokio::fs::File as TokioFile;
use tokio::io::AsyncWriteExt;
use tracing::{debug, trace, warn};
use url::Url;

/// Receives the fraction (`0.0..=1.0`) of the current transfer that has completed.
pub type ProgressFn = Arc<dyn Fn(f64) + Send + Sync>;

#[derive(Debug, Clone)]
pub struct TransferRequest {
    pub url: Url,
    pub destination: PathBuf,
    pub token: Option<String>,
}

/// Moves the bytes of one remote file to a local path.
///
/// Implementations own the whole byte-level protocol (streaming, resuming, timeouts). On
/// success the destination must hold the complete file; on failure nothing may be left at
/// the destination.
#[async_trait]
pub trait TransferEngine: Send + Sync {
    async fn transfer(&self, request: TransferRequest, progress: ProgressFn) -> Result<()>;
}

/// Default engine: streams a GET response into a hidden temporary sibling and renames it
/// into place once the body is complete.
#[derive(Debug, Clone)]
pub struct HttpTransferEngine {
    client: Client,
}

impl HttpTransferEngine {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TransferEngine for HttpTransferEngine {
    async fn transfer(&self, request: TransferRequest, progress: ProgressFn) -> Result<()> {
        let temp_path = temp_download_path(&request.destination);
        debug!("Downloading to temporary path: {}", temp_path.display());
        remove_file_if_exists(&temp_path).await?;

        match self.stream_to(&request, &temp_path, &progress).await {
            Ok(()) => {
                finalize_download(&temp_path, &request.destination).await?;
                progress(1.0);
                Ok(())
            }
            Err(e) => {
                if let Err(cleanup) = remove_file_if_exists(&temp_path).await {
                    warn!(
                        "Could not remove partial download {}: {}",
                        temp_path.display(),
                        cleanup
                    );
                }
                Err(e)
            }
        }
    }
}

impl HttpTransferEngine {
    async fn stream_to(
        &self,
        request: &TransferRequest,
        temp_path: &Path,
        progress: &ProgressFn,
    ) -> Result<()> {
        let mut builder = self.client.get(request.url.clone());
        if let Some(token) = &request.token {
            builder = builder.bearer_auth(token);
        }
        let response = builder.send().await?;
        let response = crate::http::check_status(response, false)?;
        let total = response.content_length().filter(|len| *len > 0);
        debug!(
            "Received HTTP status {} for {} ({:?} bytes)",
            response.status(),
            request.url,
            total
        );

        let mut file = TokioFile::create(temp_path)
            .await
            .map_err(|e| HubError::filesystem(temp_path, e))?;
        let mut stream = response.bytes_stream();
        let mut received: u64 = 0;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk)
                .await
                .map_err(|e| HubError::filesystem(temp_path, e))?;
            received += chunk.len() as u64;
            if let Some(total) = total {
                let fraction = (received as f64 / total as f64).min(1.0);
                trace!("{}: {:.1}%", request.url, fraction * 100.0);
                progress(fraction);
            }
        }
        file.flush()
            .await
            .map_err(|e| HubError::filesystem(temp_path, e))?;
        debug!(
            "Finished writing {} bytes to {}",
            received,
            temp_path.display()
        );
        Ok(())
    }
}
