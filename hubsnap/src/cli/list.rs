use clap::Args;
use colored::Colorize;
use hubsnap_common::cache::Cache;
use hubsnap_common::error::Result;
use hubsnap_common::model::RepoId;
use hubsnap_core::Hub;

use crate::ui;

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Repository id, e.g. `owner/name`, `dataset:owner/name` or `space:owner/name`
    pub repo: RepoId,

    /// Only list files matching one of these glob patterns (repeatable)
    #[arg(short, long = "include", value_name = "GLOB")]
    pub include: Vec<String>,

    /// Mark files already present in the local mirror
    #[arg(long)]
    pub local: bool,
}

impl ListArgs {
    pub async fn run(&self, hub: &Hub) -> Result<()> {
        let spinner = ui::create_spinner(&format!("Listing {}", self.repo));
        let files = hub.list_files(&self.repo, &self.include).await;
        spinner.finish_and_clear();
        let files = files?;

        if files.is_empty() {
            println!("{}", format!("No files of {} matched", self.repo).yellow());
            return Ok(());
        }

        for file in &files {
            if !self.local {
                println!("{file}");
            } else if Cache::is_cached(&hub.local_path(&self.repo, file)?) {
                println!("{} {}", "✓".green(), file);
            } else {
                println!("  {file}");
            }
        }
        println!(
            "{}",
            format!("{} file(s) in {}", files.len(), self.repo).dimmed()
        );
        Ok(())
    }
}
