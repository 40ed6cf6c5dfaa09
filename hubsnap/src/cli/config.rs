use clap::Args;
use colored::Colorize;
use hubsnap_common::error::{HubError, Result};
use hubsnap_common::model::RepoId;
use hubsnap_core::{CancellationToken, Hub};

#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Repository id, e.g. `owner/name`, `dataset:owner/name` or `space:owner/name`
    pub repo: RepoId,

    /// JSON file inside the repository; downloaded first if not mirrored yet
    #[arg(short, long, default_value = "config.json")]
    pub file: String,

    /// Print only this top-level key
    #[arg(short, long)]
    pub key: Option<String>,
}

impl ConfigArgs {
    pub async fn run(&self, hub: &Hub) -> Result<()> {
        let path = hub
            .download_file(&self.repo, &self.file, &CancellationToken::new())
            .await?;
        let configuration = hub.configuration(&path).await?;

        match &self.key {
            Some(key) => {
                let value = configuration.get(key).ok_or_else(|| {
                    HubError::Parse(format!("'{}' has no key '{}'", self.file, key))
                })?;
                println!("{}", serde_json::to_string_pretty(value)?);
            }
            None => {
                println!("{}", path.display().to_string().dimmed());
                println!("{}", serde_json::to_string_pretty(&configuration)?);
            }
        }
        Ok(())
    }
}
