use clap::Args;
use colored::Colorize;
use hubsnap_common::error::Result;
use hubsnap_common::model::RepoId;
use hubsnap_core::{CancellationToken, Hub};
use indicatif::ProgressBar;
use tokio::sync::mpsc;
use tracing::debug;

use crate::ui;

#[derive(Args, Debug)]
pub struct SnapshotArgs {
    /// Repository id, e.g. `owner/name`, `dataset:owner/name` or `space:owner/name`
    pub repo: RepoId,

    /// Only download files matching one of these glob patterns (repeatable)
    #[arg(short, long = "include", value_name = "GLOB")]
    pub include: Vec<String>,

    /// Do not draw a progress bar
    #[arg(short, long)]
    pub quiet: bool,
}

impl SnapshotArgs {
    pub async fn run(&self, hub: &Hub) -> Result<()> {
        let (sender, mut receiver) = mpsc::unbounded_channel();
        let bar = if self.quiet {
            ProgressBar::hidden()
        } else {
            ui::create_snapshot_bar(&self.repo.to_string())
        };

        let render_bar = bar.clone();
        let render = tokio::spawn(async move {
            while let Some(update) = receiver.recv().await {
                ui::apply_progress(&render_bar, &update);
            }
        });

        // Ctrl-C stops this command from waiting; files already fetched stay cached.
        let cancel = CancellationToken::new();
        let interrupt = {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    debug!("Interrupted; cancelling snapshot");
                    cancel.cancel();
                }
            })
        };

        let result = hub
            .snapshot_with_progress(&self.repo, &self.include, Some(&sender), &cancel)
            .await;
        interrupt.abort();
        drop(sender);
        let _ = render.await;

        match result {
            Ok(root) => {
                bar.finish_and_clear();
                println!(
                    "{}{} {}",
                    "==> ".bold().blue(),
                    self.repo.to_string().bold(),
                    root.display()
                );
                Ok(())
            }
            Err(e) => {
                bar.abandon();
                Err(e)
            }
        }
    }
}
