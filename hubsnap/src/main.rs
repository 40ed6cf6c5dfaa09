// hubsnap/src/main.rs
use std::process;

use clap::Parser;
use colored::Colorize;
use hubsnap_common::error::Result;
use tracing::level_filters::LevelFilter;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

mod cli;
mod ui;

use cli::CliArgs;

fn init_tracing(verbose: u8) {
    let level_filter = match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    let env_filter = EnvFilter::builder()
        .with_default_directive(level_filter.into())
        .with_env_var("HUBSNAP_LOG")
        .from_env_lossy();

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .without_time()
        .try_init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();
    init_tracing(cli_args.verbose);

    let hub = match cli_args.hub() {
        Ok(hub) => hub,
        Err(e) => {
            eprintln!("{}: Could not set up hub client: {:#}", "Error".red().bold(), e);
            process::exit(1);
        }
    };
    debug!(
        "Endpoint {}, download root {}",
        hub.config().endpoint(),
        hub.config().download_root().display()
    );

    if let Err(e) = cli_args.command.run(&hub).await {
        error!("Command failed: {:#}", e);
        eprintln!("{}: {:#}", "Error".red().bold(), e);
        process::exit(1);
    }

    debug!("Command completed successfully.");
    Ok(())
}
