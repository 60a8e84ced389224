//! magiskfrida CLI

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use magiskfrida_cli::cmd;
use magiskfrida_cli::{Cli, Commands};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // RUST_LOG wins over --verbose. Logs go to stderr so stdout stays scriptable.
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        None => cmd::release::release(cli.build_config()?, false).await,
        Some(Commands::Release { force }) => cmd::release::release(cli.build_config()?, force).await,
        Some(Commands::Build {
            ref upstream_tag,
            ref tag,
        }) => cmd::build::build(cli.build_config()?, upstream_tag, tag).await,
        Some(Commands::Plan { force }) => cmd::plan::plan(cli.build_config()?, force).await,
        Some(Commands::VersionCode { ref tag }) => cmd::version_code::version_code(tag),
    }
}
