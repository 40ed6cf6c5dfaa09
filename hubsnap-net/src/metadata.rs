use hubsnap_common::error::Result;
use hubsnap_common::model::metadata::normalize_etag;
use hubsnap_common::model::{FileMetadata, RepoId};
use reqwest::header::{HeaderMap, CONTENT_LENGTH, ETAG, LOCATION};
use tracing::debug;
use url::Url;

use crate::catalog;
use crate::http::HubClient;

pub const X_REPO_COMMIT: &str = "x-repo-commit";
pub const X_LINKED_ETAG: &str = "x-linked-etag";
pub const X_LINKED_SIZE: &str = "x-linked-size";

/// Probes one file URL with a header-only request.
pub async fn file_metadata(client: &HubClient, url: &Url) -> Result<FileMetadata> {
    let response = client.head(url.clone()).await?;
    let metadata = metadata_from_headers(response.headers(), url);
    debug!(
        "Metadata for {}: commit={:?} etag={:?} size={:?}",
        url, metadata.commit_hash, metadata.etag, metadata.size
    );
    Ok(metadata)
}

/// Probes every file selected by `globs`, one after another in selection order. The first
/// failing probe aborts the whole batch.
pub async fn repo_file_metadata<S: AsRef<str>>(
    client: &HubClient,
    repo: &RepoId,
    globs: &[S],
) -> Result<Vec<FileMetadata>> {
    let filenames = catalog::list_files(client, repo, globs).await?;
    let mut results = Vec::with_capacity(filenames.len());
    for filename in &filenames {
        let url = client.file_url(repo, filename)?;
        results.push(file_metadata(client, &url).await?);
    }
    Ok(results)
}

/// Builds [`FileMetadata`] from probe response headers.
///
/// When the hub redirects to storage, `X-Linked-Etag` and `X-Linked-Size` describe the
/// actual file and win over the plain `ETag` and `Content-Length` of the redirect itself.
pub fn metadata_from_headers(headers: &HeaderMap, request_url: &Url) -> FileMetadata {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
    };

    let commit_hash = header(X_REPO_COMMIT).map(str::to_string);
    let etag = header(X_LINKED_ETAG)
        .or_else(|| header(ETAG.as_str()))
        .map(normalize_etag);
    let size = header(X_LINKED_SIZE)
        .or_else(|| header(CONTENT_LENGTH.as_str()))
        .and_then(|value| value.parse::<u64>().ok());
    let location = match header(LOCATION.as_str()) {
        Some(location) => request_url
            .join(location)
            .map(|resolved| resolved.to_string())
            .unwrap_or_else(|_| location.to_string()),
        None => request_url.to_string(),
    };

    FileMetadata {
        commit_hash,
        etag,
        location,
        size,
    }
}
