use std::time::Duration;

use hubsnap_common::error::{HubError, Result};
use hubsnap_common::model::RepoId;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::redirect::Policy;
use reqwest::{Client, RequestBuilder, Response};
use tracing::debug;
use url::Url;

// Only connection setup is bounded here. Transfers of multi-gigabyte files must not be cut
// off by a whole-request timeout.
const CONNECT_TIMEOUT_SECS: u64 = 30;
const MAX_REDIRECTS: usize = 10;
pub const USER_AGENT_STRING: &str = "hubsnap (Rust; +https://github.com/hubsnap/hubsnap)";

/// Fixed revision every file is resolved against.
pub const DEFAULT_REVISION: &str = "main";

/// HTTP access to one hub endpoint, with the bearer token attached to every request.
#[derive(Debug, Clone)]
pub struct HubClient {
    http: Client,
    // Separate client that never follows redirects, so storage redirects stay visible to
    // metadata probes.
    probe: Client,
    endpoint: Url,
    token: Option<String>,
}

impl HubClient {
    pub fn new(endpoint: &str, token: Option<String>) -> Result<Self> {
        Self::with_user_agent(endpoint, token, USER_AGENT_STRING)
    }

    pub fn with_user_agent(
        endpoint: &str,
        token: Option<String>,
        user_agent: &str,
    ) -> Result<Self> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| HubError::Config(format!("Invalid endpoint '{endpoint}': {e}")))?;
        if endpoint.cannot_be_a_base() {
            return Err(HubError::Config(format!(
                "Invalid endpoint '{endpoint}': cannot be used as a base URL"
            )));
        }
        Ok(Self {
            http: build_http_client(user_agent, Policy::limited(MAX_REDIRECTS))?,
            probe: build_http_client(user_agent, Policy::none())?,
            endpoint,
            token: token.filter(|t| !t.is_empty()),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Redirect-following client, shared with the default transfer engine.
    pub fn http(&self) -> &Client {
        &self.http
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// GET that fails on any non-2xx status.
    pub async fn get(&self, url: Url) -> Result<Response> {
        debug!("GET {}", url);
        let response = self.authorize(self.http.get(url)).send().await?;
        check_status(response, false)
    }

    /// HEAD without following redirects. 3xx responses are returned as successes.
    pub async fn head(&self, url: Url) -> Result<Response> {
        debug!("HEAD {}", url);
        let response = self.authorize(self.probe.head(url)).send().await?;
        check_status(response, true)
    }

    /// `{endpoint}/api/{models|datasets|spaces}/{id}`
    pub fn repo_api_url(&self, repo: &RepoId) -> Result<Url> {
        let segments = ["api", repo.kind().path_segment()]
            .into_iter()
            .chain(split_path(repo.id()));
        self.join_segments(segments)
    }

    /// `{endpoint}[/{datasets|spaces}]/{id}/resolve/main/{filename}`
    pub fn file_url(&self, repo: &RepoId, filename: &str) -> Result<Url> {
        let segments = repo
            .kind()
            .url_prefix()
            .into_iter()
            .chain(split_path(repo.id()))
            .chain(["resolve", DEFAULT_REVISION])
            .chain(split_path(filename));
        self.join_segments(segments)
    }

    pub fn whoami_url(&self) -> Result<Url> {
        self.join_segments(["api", "whoami-v2"])
    }

    fn join_segments<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Result<Url> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|_| {
                HubError::Config(format!(
                    "Endpoint '{}' cannot be used as a base URL",
                    self.endpoint
                ))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

fn split_path(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|part| !part.is_empty())
}

fn build_http_client(user_agent: &str, redirect: Policy) -> Result<Client> {
    let mut headers = HeaderMap::new();
    let agent = HeaderValue::from_str(user_agent)
        .map_err(|e| HubError::Config(format!("Invalid user agent '{user_agent}': {e}")))?;
    headers.insert(USER_AGENT, agent);
    headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
    Client::builder()
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .default_headers(headers)
        .redirect(redirect)
        .build()
        .map_err(|e| HubError::Transport(format!("Failed to build HTTP client: {e}")))
}

/// Maps non-success statuses onto the error taxonomy.
pub fn check_status(response: Response, allow_redirects: bool) -> Result<Response> {
    let status = response.status();
    if status.is_success() || (allow_redirects && status.is_redirection()) {
        return Ok(response);
    }
    debug!("HTTP status {} for {}", status, response.url());
    Err(HubError::for_status(status.as_u16(), response.url().as_str()))
}
