// hubsnap-common/src/config.rs
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use directories::{BaseDirs, UserDirs};
use tracing::debug;
use url::Url;

use super::error::{HubError, Result};

pub const DEFAULT_ENDPOINT: &str = "https://huggingface.co";
const DOWNLOAD_ROOT_DIRNAME: &str = "huggingface";
const TOKEN_FILENAME: &str = "token";

const ENDPOINT_VAR: &str = "HF_ENDPOINT";
const DOWNLOAD_ROOT_VAR: &str = "HUBSNAP_DOWNLOAD_ROOT";
const HF_HOME_VAR: &str = "HF_HOME";
// Checked in order; the first non-empty value wins.
const TOKEN_VARS: [&str; 2] = ["HF_TOKEN", "HUGGING_FACE_HUB_TOKEN"];

#[derive(Debug, Clone)]
pub struct Config {
    pub endpoint: String,
    pub download_root: PathBuf,
    pub token: Option<String>,
}

impl Config {
    /// Loads configuration from the process environment and the hub token file.
    pub fn load() -> Result<Self> {
        let vars: HashMap<String, String> = env::vars().collect();
        Self::from_env_map(&vars)
    }

    /// Same as [`Config::load`] but reads variables from `vars` instead of the process
    /// environment.
    pub fn from_env_map(vars: &HashMap<String, String>) -> Result<Self> {
        debug!("Loading hubsnap configuration");
        let var = |key: &str| vars.get(key).map(|v| v.trim()).filter(|v| !v.is_empty());

        let endpoint = normalize_endpoint(var(ENDPOINT_VAR).unwrap_or(DEFAULT_ENDPOINT))?;
        debug!("Effective endpoint set to: {}", endpoint);

        let download_root = var(DOWNLOAD_ROOT_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(default_download_root);
        debug!("Effective download root set to: {}", download_root.display());

        let hf_home = var(HF_HOME_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(default_hf_home);
        let token = TOKEN_VARS
            .iter()
            .find_map(|key| var(key).map(str::to_string))
            .or_else(|| read_token_file(&hf_home.join(TOKEN_FILENAME)));
        debug!(
            "Access token {}",
            if token.is_some() { "found" } else { "not configured" }
        );

        Ok(Self {
            endpoint,
            download_root,
            token,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn download_root(&self) -> &Path {
        &self.download_root
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }
}

/// Validates the endpoint and drops trailing slashes so paths can be appended verbatim.
pub fn normalize_endpoint(endpoint: &str) -> Result<String> {
    let url = Url::parse(endpoint)
        .map_err(|e| HubError::Config(format!("Invalid endpoint '{endpoint}': {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(HubError::Config(format!(
            "Invalid endpoint '{}': scheme must be http or https, got '{}'",
            endpoint,
            url.scheme()
        )));
    }
    Ok(endpoint.trim_end_matches('/').to_string())
}

fn default_download_root() -> PathBuf {
    let documents = UserDirs::new().and_then(|ud| ud.document_dir().map(Path::to_path_buf));
    match documents {
        Some(dir) => dir.join(DOWNLOAD_ROOT_DIRNAME),
        None => home_dir().join("Documents").join(DOWNLOAD_ROOT_DIRNAME),
    }
}

fn default_hf_home() -> PathBuf {
    BaseDirs::new()
        .map(|bd| bd.home_dir().join(".cache"))
        .unwrap_or_else(|| home_dir().join(".cache"))
        .join(DOWNLOAD_ROOT_DIRNAME)
}

fn home_dir() -> PathBuf {
    UserDirs::new().map_or_else(|| PathBuf::from("/"), |ud| ud.home_dir().to_path_buf())
}

fn read_token_file(path: &Path) -> Option<String> {
    match fs::read_to_string(path) {
        Ok(contents) => {
            let token = contents.trim();
            if token.is_empty() {
                None
            } else {
                debug!("Using access token from {}", path.display());
                Some(token.to_string())
            }
        }
        Err(_) => None,
    }
}
