//! Calabi CLI - entity extraction and term suggestion from the command line.

use anyhow::{bail, Context};
use calabi_cli::{commands, Cli, Command, Formatter};
use calabi_server::{build_state, config::ServerConfig};
use clap::Parser;
use std::path::Path;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so JSON output stays clean
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = ServerConfig::load(cli.config.as_deref().map(Path::new))
        .context("Failed to load configuration")?;
    let state = build_state(&config).context("Failed to start pipeline")?;
    let pipeline = state.pipeline;

    let formatter = Formatter::new(cli.format, !cli.no_color);

    match cli.command {
        Command::Ner(args) => {
            println!("{}", commands::execute_ner(args, &pipeline, &formatter).await?);
        }
        Command::Suggest(args) => {
            println!("{}", commands::execute_suggest(args, &pipeline, &formatter).await?);
        }
        Command::Health => {
            let (ready, output) = commands::execute_health(&pipeline, &formatter).await?;
            println!("{}", output);
            if !ready {
                bail!("model is not ready");
            }
        }
    }

    Ok(())
}
