use clap::Args;
use colored::Colorize;
use hubsnap_common::error::Result;
use hubsnap_common::model::{FileMetadata, RepoId};
use hubsnap_core::Hub;
use prettytable::{format, Cell, Row, Table};
use url::Url;

use crate::ui;

#[derive(Args, Debug)]
pub struct MetadataArgs {
    /// Repository id, e.g. `owner/name`, `dataset:owner/name` or `space:owner/name`
    #[arg(required_unless_present = "url")]
    pub repo: Option<RepoId>,

    /// Only probe files matching one of these glob patterns (repeatable)
    #[arg(short, long = "include", value_name = "GLOB")]
    pub include: Vec<String>,

    /// Probe a single file URL instead of a repository
    #[arg(long, conflicts_with_all = ["repo", "include"])]
    pub url: Option<Url>,

    /// Print raw JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

impl MetadataArgs {
    pub async fn run(&self, hub: &Hub) -> Result<()> {
        let spinner = ui::create_spinner("Probing remote metadata");
        let metadata = match (&self.url, &self.repo) {
            (Some(url), _) => hub.file_metadata(url).await.map(|m| vec![m]),
            (None, Some(repo)) => hub.repo_file_metadata(repo, &self.include).await,
            (None, None) => Ok(Vec::new()),
        };
        spinner.finish_and_clear();
        let metadata = metadata?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&metadata)?);
            return Ok(());
        }
        if metadata.is_empty() {
            println!("{}", "No files matched".yellow());
            return Ok(());
        }
        print_table(&metadata);
        Ok(())
    }
}

fn print_table(metadata: &[FileMetadata]) {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_NO_BORDER_LINE_SEPARATOR);
    table.add_row(Row::new(vec![
        Cell::new("Location").style_spec("b"),
        Cell::new("Size").style_spec("b"),
        Cell::new("ETag").style_spec("b"),
        Cell::new("Commit").style_spec("b"),
    ]));
    for entry in metadata {
        table.add_row(Row::new(vec![
            Cell::new(&entry.location),
            Cell::new(&entry.size.map(|s| s.to_string()).unwrap_or_default()),
            Cell::new(entry.etag.as_deref().unwrap_or("-")),
            Cell::new(entry.commit_hash.as_deref().unwrap_or("-")),
        ]));
    }
    table.printstd();
}
