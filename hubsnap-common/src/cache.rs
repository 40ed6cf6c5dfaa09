// hubsnap-common/src/cache.rs
// Maps repository files onto the local mirror layout and answers hit/miss questions.

use std::path::{Component, Path, PathBuf};

use crate::error::{HubError, Result};
use crate::model::RepoId;
use crate::Config;

/// The local mirror: `{root}/{kind segment}/{repo id}/{relative filename}`.
///
/// A file counts as cached as soon as anything exists at its resolved path. Content is never
/// compared with the remote, so a stale file stays in use until something else removes it.
#[derive(Debug, Clone)]
pub struct Cache {
    root: PathBuf,
}

impl Cache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create a Cache rooted at the config's download root
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.download_root())
    }

    /// Local directory mirroring the whole repository.
    pub fn repo_root(&self, repo: &RepoId) -> Result<PathBuf> {
        let mut path = self.root.join(repo.kind().path_segment());
        push_relative(&mut path, repo.id()).map_err(|part| {
            HubError::InvalidRepoId(format!("'{}' contains '{part}'", repo.id()))
        })?;
        Ok(path)
    }

    /// Location of one repository file. Fails for any filename that would not land strictly
    /// inside the repository directory.
    pub fn resolve(&self, repo: &RepoId, filename: &str) -> Result<PathBuf> {
        let mut path = self.repo_root(repo)?;
        push_relative(&mut path, filename)
            .map_err(|part| HubError::InvalidPath(format!("'{filename}' contains '{part}'")))?;
        Ok(path)
    }

    /// Existence check only; no integrity verification.
    pub fn is_cached(path: &Path) -> bool {
        path.symlink_metadata().is_ok()
    }
}

/// Appends the `/`-separated parts of `relative`. Only plain names are accepted; the
/// offending part is returned otherwise (`..`, `.`, a root or a drive prefix), as is an
/// input with no parts at all.
fn push_relative<'a>(path: &mut PathBuf, relative: &'a str) -> std::result::Result<(), &'a str> {
    let mut pushed = false;
    for part in relative.split('/').filter(|p| !p.is_empty()) {
        let mut components = Path::new(part).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => path.push(part),
            _ => return Err(part),
        }
        pushed = true;
    }
    if pushed {
        Ok(())
    } else {
        Err(relative)
    }
}
