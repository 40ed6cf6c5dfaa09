// hubsnap/src/cli.rs
//! Defines the command-line argument structure using clap.
use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use hubsnap_common::error::Result;
use hubsnap_core::Hub;

pub mod config;
pub mod list;
pub mod metadata;
pub mod snapshot;
pub mod whoami;

use crate::cli::config::ConfigArgs;
use crate::cli::list::ListArgs;
use crate::cli::metadata::MetadataArgs;
use crate::cli::snapshot::SnapshotArgs;
use crate::cli::whoami::Whoami;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None, name = "hubsnap", bin_name = "hubsnap")]
#[command(propagate_version = true)]
pub struct CliArgs {
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Hub base URL [default: $HF_ENDPOINT or https://huggingface.co]
    #[arg(long, global = true, value_name = "URL")]
    pub endpoint: Option<String>,

    /// Local mirror root [default: $HUBSNAP_DOWNLOAD_ROOT or ~/Documents/huggingface]
    #[arg(long, global = true, value_name = "DIR")]
    pub download_root: Option<PathBuf>,

    /// Access token [default: $HF_TOKEN or the saved token file]
    #[arg(long, global = true, conflicts_with = "anonymous")]
    pub token: Option<String>,

    /// Ignore any configured token
    #[arg(long, global = true)]
    pub anonymous: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl CliArgs {
    pub fn hub(&self) -> Result<Hub> {
        let mut builder = Hub::builder();
        if let Some(endpoint) = &self.endpoint {
            builder = builder.endpoint(endpoint.as_str());
        }
        if let Some(root) = &self.download_root {
            builder = builder.download_root(root);
        }
        if let Some(token) = &self.token {
            builder = builder.token(token.as_str());
        }
        if self.anonymous {
            builder = builder.anonymous();
        }
        builder.build()
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the files of a repository
    List(ListArgs),
    /// Download every missing file of a repository
    Snapshot(SnapshotArgs),
    /// Show remote metadata (commit, ETag, size) of repository files
    Metadata(MetadataArgs),
    /// Show the account the configured token belongs to
    Whoami(Whoami),
    /// Print a repository's JSON configuration file
    Config(ConfigArgs),
}

impl Command {
    pub async fn run(&self, hub: &Hub) -> Result<()> {
        match self {
            Self::List(command) => command.run(hub).await,
            Self::Snapshot(command) => command.run(hub).await,
            Self::Metadata(command) => command.run(hub).await,
            Self::Whoami(command) => command.run(hub).await,
            Self::Config(command) => command.run(hub).await,
        }
    }
}
