// hubsnap-aio/src/fs.rs
use std::io;
use std::path::{Path, PathBuf};

use hubsnap_common::error::{HubError, Result};
use tokio::fs;
use tracing::{debug, error};

/// Creates a directory and all its missing parents. Succeeds if it already exists.
pub async fn create_dir_all(path: &Path) -> Result<()> {
    debug!("Creating directory recursively: {}", path.display());
    fs::create_dir_all(path).await.map_err(|e| {
        error!("Failed create dir {}: {}", path.display(), e);
        HubError::filesystem(path, e)
    })
}

/// Creates every missing ancestor directory of `path`.
pub async fn create_parent_dirs(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => create_dir_all(parent).await,
        _ => Ok(()),
    }
}

/// Sibling path an in-progress download is written to, e.g. `dir/.model.bin.download`.
///
/// Keeping partial content out of the final location preserves the "exists means complete"
/// meaning of the cache.
pub fn temp_download_path(final_path: &Path) -> PathBuf {
    let temp_filename = format!(
        ".{}.download",
        final_path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
    );
    final_path.with_file_name(temp_filename)
}

/// Atomically moves a finished temporary download into its final location.
pub async fn finalize_download(temp_path: &Path, final_path: &Path) -> Result<()> {
    fs::rename(temp_path, final_path).await.map_err(|e| {
        error!(
            "Failed to move temp file {} to {}: {}",
            temp_path.display(),
            final_path.display(),
            e
        );
        HubError::filesystem(final_path, e)
    })?;
    debug!(
        "Moved downloaded file to final location: {}",
        final_path.display()
    );
    Ok(())
}

/// Removes a file, treating "not found" as success.
pub async fn remove_file_if_exists(path: &Path) -> Result<()> {
    match fs::remove_file(path).await {
        Ok(()) => {
            debug!("Removed file: {}", path.display());
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => {
            error!("Failed remove file {}: {}", path.display(), e);
            Err(HubError::filesystem(path, e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temp_path_is_hidden_sibling() {
        let final_path = Path::new("/hub/models/a/b/onnx/model.onnx");
        assert_eq!(
            temp_download_path(final_path),
            PathBuf::from("/hub/models/a/b/onnx/.model.onnx.download")
        );
    }

    #[tokio::test]
    async fn parent_creation_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("models/owner/name/nested/file.bin");
        create_parent_dirs(&target).await.unwrap();
        create_parent_dirs(&target).await.unwrap();
        assert!(target.parent().unwrap().is_dir());
        assert!(!target.exists());
    }

    #[tokio::test]
    async fn directory_failure_is_a_filesystem_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("models");
        std::fs::write(&blocker, b"not a directory").unwrap();

        let err = create_parent_dirs(&blocker.join("owner/file.bin"))
            .await
            .unwrap_err();
        assert!(matches!(err, HubError::Filesystem { .. }), "{err:?}");
    }

    #[tokio::test]
    async fn finalize_moves_and_remove_ignores_missing() {
        let dir = tempfile::tempdir().unwrap();
        let final_path = dir.path().join("config.json");
        let temp_path = temp_download_path(&final_path);
        std::fs::write(&temp_path, b"{}").unwrap();

        finalize_download(&temp_path, &final_path).await.unwrap();
        assert!(final_path.is_file());
        assert!(!temp_path.exists());

        remove_file_if_exists(&temp_path).await.unwrap();
        remove_file_if_exists(&final_path).await.unwrap();
        assert!(!final_path.exists());
    }
}
