use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

/// Every failure the hub client can surface.
///
/// The type is `Clone` so a single transfer outcome can be handed to every caller waiting on
/// the same destination path. Non-cloneable sources are wrapped in `Arc`.
#[derive(Error, Debug, Clone)]
pub enum HubError {
    #[error("Authorization required: HTTP {status} for '{url}'")]
    AuthorizationRequired { status: u16, url: String },

    #[error("Remote Error: HTTP {status} for '{url}'")]
    Remote { status: u16, url: String },

    #[error("Parsing Error: {0}")]
    Parse(String),

    #[error("Transport Error: {0}")]
    Transport(String),

    #[error("Filesystem Error at {}: {source}", .path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: Arc<std::io::Error>,
    },

    #[error("Invalid glob pattern: {0}")]
    InvalidPattern(String),

    #[error("Invalid repository id: {0}")]
    InvalidRepoId(String),

    #[error("Invalid repository path: {0}")]
    InvalidPath(String),

    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("Operation cancelled")]
    Cancelled,
}

impl HubError {
    /// Classifies a non-success HTTP status. Any 4xx means the caller lacks access (or the
    /// repository is gated/private, which the hub reports the same way).
    pub fn for_status(status: u16, url: impl Into<String>) -> Self {
        let url = url.into();
        if (400..500).contains(&status) {
            HubError::AuthorizationRequired { status, url }
        } else {
            HubError::Remote { status, url }
        }
    }

    pub fn filesystem(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        HubError::Filesystem {
            path: path.as_ref().to_path_buf(),
            source: Arc::new(source),
        }
    }

    /// Status code carried by the HTTP variants.
    pub fn status(&self) -> Option<u16> {
        match self {
            HubError::AuthorizationRequired { status, .. } | HubError::Remote { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }
}

impl From<reqwest::Error> for HubError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            let url = err.url().map(|u| u.to_string()).unwrap_or_default();
            return HubError::for_status(status.as_u16(), url);
        }
        if err.is_decode() {
            return HubError::Parse(err.to_string());
        }
        HubError::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for HubError {
    fn from(err: serde_json::Error) -> Self {
        HubError::Parse(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, HubError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_require_authorization() {
        for status in [400, 401, 403, 404, 499] {
            let err = HubError::for_status(status, "https://hub.test/api/models/a/b");
            assert!(
                matches!(err, HubError::AuthorizationRequired { status: s, .. } if s == status),
                "{status} should map to AuthorizationRequired"
            );
        }
    }

    #[test]
    fn other_statuses_are_remote_errors() {
        for status in [301, 500, 502, 503] {
            let err = HubError::for_status(status, "https://hub.test");
            assert!(matches!(err, HubError::Remote { .. }));
            assert_eq!(err.status(), Some(status));
        }
    }

    #[test]
    fn filesystem_error_mentions_path() {
        let err = HubError::filesystem(
            "/tmp/hub/models/a",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        let message = err.to_string();
        assert!(message.contains("/tmp/hub/models/a"));
        assert!(message.contains("denied"));

        // Clones share the underlying io::Error.
        let cloned = err.clone();
        assert_eq!(cloned.to_string(), message);
    }
}
