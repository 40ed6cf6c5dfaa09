use clap::Args;
use colored::Colorize;
use hubsnap_common::error::{HubError, Result};
use hubsnap_core::Hub;

#[derive(Args, Debug)]
pub struct Whoami {
    /// Print the full identity document as JSON
    #[arg(long)]
    pub json: bool,
}

impl Whoami {
    pub async fn run(&self, hub: &Hub) -> Result<()> {
        if hub.config().token().is_none() {
            return Err(HubError::Config(
                "No token configured; set HF_TOKEN or pass --token".to_string(),
            ));
        }
        let identity = hub.whoami().await?;
        if self.json {
            println!("{}", serde_json::to_string_pretty(&identity)?);
            return Ok(());
        }

        println!("{}", identity.name.bold());
        if let Some(kind) = &identity.kind {
            println!("  type: {kind}");
        }
        let orgs: Vec<&str> = identity
            .get("orgs")
            .and_then(|orgs| orgs.as_array())
            .map(|orgs| {
                orgs.iter()
                    .filter_map(|org| org.get("name").and_then(|n| n.as_str()))
                    .collect()
            })
            .unwrap_or_default();
        if !orgs.is_empty() {
            println!("  orgs: {}", orgs.join(", "));
        }
        Ok(())
    }
}
