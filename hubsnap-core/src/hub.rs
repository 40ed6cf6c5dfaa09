// hubsnap-core/src/hub.rs
use std::path::{Path, PathBuf};
use std::sync::Arc;

use hubsnap_aio::json_io::read_json_object_async;
use hubsnap_common::cache::Cache;
use hubsnap_common::config::{normalize_endpoint, Config};
use hubsnap_common::error::Result;
use hubsnap_common::model::{FileMetadata, HubIdentity, RepoId};
use hubsnap_net::http::{HubClient, USER_AGENT_STRING};
use hubsnap_net::transfer::{HttpTransferEngine, TransferEngine};
use hubsnap_net::{catalog, metadata, whoami};
use serde_json::{Map, Value};
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::download::DownloadCoordinator;
use crate::snapshot::{self, ProgressSender};

/// Entry point for talking to one hub endpoint and mirroring its repositories locally.
///
/// Every operation taking a repository accepts either a [`RepoId`] or a bare `owner/name`
/// string (which means a model repository). Cloning is cheap; clones share the HTTP client.
#[derive(Clone)]
pub struct Hub {
    config: Config,
    client: HubClient,
    coordinator: DownloadCoordinator,
}

impl Hub {
    /// Hub configured from the environment.
    pub fn new() -> Result<Self> {
        HubBuilder::default().build()
    }

    pub fn builder() -> HubBuilder {
        HubBuilder::default()
    }

    pub fn from_config(config: Config) -> Result<Self> {
        HubBuilder::default().config(config).build()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn client(&self) -> &HubClient {
        &self.client
    }

    pub fn cache(&self) -> &Cache {
        self.coordinator.cache()
    }

    /// Filenames of `repo` matching any of `globs` (all files when `globs` is empty).
    pub async fn list_files<S: AsRef<str>>(
        &self,
        repo: impl Into<RepoId>,
        globs: &[S],
    ) -> Result<Vec<String>> {
        catalog::list_files(&self.client, &repo.into(), globs).await
    }

    /// Downloads whatever is missing among the selected files and returns the local
    /// repository root.
    pub async fn snapshot<S: AsRef<str>>(
        &self,
        repo: impl Into<RepoId>,
        globs: &[S],
    ) -> Result<PathBuf> {
        self.snapshot_with_progress(repo, globs, None, &CancellationToken::new())
            .await
    }

    /// [`Hub::snapshot`] with a progress stream and a cancellation token.
    pub async fn snapshot_with_progress<S: AsRef<str>>(
        &self,
        repo: impl Into<RepoId>,
        globs: &[S],
        progress: Option<&ProgressSender>,
        cancel: &CancellationToken,
    ) -> Result<PathBuf> {
        let repo = repo.into();
        snapshot::snapshot(&self.client, &self.coordinator, &repo, globs, progress, cancel).await
    }

    /// Makes sure one file is present locally and returns its path.
    pub async fn download_file(
        &self,
        repo: impl Into<RepoId>,
        filename: &str,
        cancel: &CancellationToken,
    ) -> Result<PathBuf> {
        self.coordinator
            .ensure(&repo.into(), filename, None, cancel)
            .await
    }

    pub async fn file_metadata(&self, url: &Url) -> Result<FileMetadata> {
        metadata::file_metadata(&self.client, url).await
    }

    /// Metadata of every selected file, probed in selection order.
    pub async fn repo_file_metadata<S: AsRef<str>>(
        &self,
        repo: impl Into<RepoId>,
        globs: &[S],
    ) -> Result<Vec<FileMetadata>> {
        metadata::repo_file_metadata(&self.client, &repo.into(), globs).await
    }

    pub async fn whoami(&self) -> Result<HubIdentity> {
        whoami::whoami(&self.client).await
    }

    /// Reads a downloaded JSON file (e.g. a model's `config.json`) as a JSON object.
    pub async fn configuration(&self, path: &Path) -> Result<Map<String, Value>> {
        read_json_object_async(path).await
    }

    pub fn file_url(&self, repo: impl Into<RepoId>, filename: &str) -> Result<Url> {
        self.client.file_url(&repo.into(), filename)
    }

    pub fn local_repo_root(&self, repo: impl Into<RepoId>) -> Result<PathBuf> {
        self.coordinator.repo_root(&repo.into())
    }

    pub fn local_path(&self, repo: impl Into<RepoId>, filename: &str) -> Result<PathBuf> {
        self.coordinator.destination(&repo.into(), filename)
    }
}

#[derive(Default)]
pub struct HubBuilder {
    config: Option<Config>,
    endpoint: Option<String>,
    download_root: Option<PathBuf>,
    token: Option<Option<String>>,
    user_agent: Option<String>,
    engine: Option<Arc<dyn TransferEngine>>,
}

impl HubBuilder {
    /// Base configuration. Defaults to [`Config::load`].
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Hub base URL, e.g. `https://huggingface.co`.
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Root of the local mirror.
    pub fn download_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.download_root = Some(path.into());
        self
    }

    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(Some(token.into()));
        self
    }

    /// Sends requests without a token even if one is configured.
    pub fn anonymous(mut self) -> Self {
        self.token = Some(None);
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Replaces the default streaming HTTP transfer engine.
    pub fn transfer_engine(mut self, engine: Arc<dyn TransferEngine>) -> Self {
        self.engine = Some(engine);
        self
    }

    pub fn build(self) -> Result<Hub> {
        let Self {
            config,
            endpoint,
            download_root,
            token,
            user_agent,
            engine,
        } = self;

        let mut config = match config {
            Some(config) => config,
            None => Config::load()?,
        };
        if let Some(endpoint) = endpoint {
            config.endpoint = endpoint;
        }
        config.endpoint = normalize_endpoint(&config.endpoint)?;
        if let Some(download_root) = download_root {
            config.download_root = download_root;
        }
        if let Some(token) = token {
            config.token = token;
        }

        let user_agent = user_agent.as_deref().unwrap_or(USER_AGENT_STRING);
        let client = HubClient::with_user_agent(&config.endpoint, config.token.clone(), user_agent)?;
        let engine = engine
            .unwrap_or_else(|| Arc::new(HttpTransferEngine::new(client.http().clone())));
        let coordinator = DownloadCoordinator::new(Cache::from_config(&config), client.clone(), engine);

        Ok(Hub {
            config,
            client,
            coordinator,
        })
    }
}
