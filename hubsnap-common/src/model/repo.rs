// hubsnap-common/src/model/repo.rs
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::HubError;

/// The kind of repository hosted on the hub. `Model` is the default kind: bare identifiers
/// resolve to it, and its segment is omitted from file source URLs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepoKind {
    #[default]
    Model,
    Dataset,
    Space,
}

impl RepoKind {
    /// Plural segment used by the listing API and the local cache layout.
    pub fn path_segment(self) -> &'static str {
        match self {
            RepoKind::Model => "models",
            RepoKind::Dataset => "datasets",
            RepoKind::Space => "spaces",
        }
    }

    /// Segment placed in front of the repo id in file source URLs.
    pub fn url_prefix(self) -> Option<&'static str> {
        match self {
            RepoKind::Model => None,
            other => Some(other.path_segment()),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            RepoKind::Model => "model",
            RepoKind::Dataset => "dataset",
            RepoKind::Space => "space",
        }
    }
}

impl fmt::Display for RepoKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RepoKind {
    type Err = HubError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "model" | "models" => Ok(RepoKind::Model),
            "dataset" | "datasets" => Ok(RepoKind::Dataset),
            "space" | "spaces" => Ok(RepoKind::Space),
            other => Err(HubError::InvalidRepoId(format!(
                "unknown repository kind '{other}'"
            ))),
        }
    }
}

/// Identity of a remote repository: its kind plus an opaque `owner/name` id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoId {
    kind: RepoKind,
    id: String,
}

impl RepoId {
    pub fn new(kind: RepoKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }

    pub fn model(id: impl Into<String>) -> Self {
        Self::new(RepoKind::Model, id)
    }

    pub fn dataset(id: impl Into<String>) -> Self {
        Self::new(RepoKind::Dataset, id)
    }

    pub fn space(id: impl Into<String>) -> Self {
        Self::new(RepoKind::Space, id)
    }

    pub fn kind(&self) -> RepoKind {
        self.kind
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

/// Accepts `owner/name` (model) or a `kind:owner/name` prefixed form.
impl FromStr for RepoId {
    type Err = HubError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, id) = match s.split_once(':') {
            Some((kind, id)) => (kind.parse::<RepoKind>()?, id),
            None => (RepoKind::default(), s),
        };
        if id.is_empty() {
            return Err(HubError::InvalidRepoId(format!("'{s}' has an empty id")));
        }
        Ok(RepoId::new(kind, id))
    }
}

impl From<&str> for RepoId {
    fn from(id: &str) -> Self {
        RepoId::model(id)
    }
}

impl From<String> for RepoId {
    fn from(id: String) -> Self {
        RepoId::model(id)
    }
}

impl From<&RepoId> for RepoId {
    fn from(repo: &RepoId) -> Self {
        repo.clone()
    }
}
