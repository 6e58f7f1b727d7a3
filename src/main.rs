//! Clover CLI entry point.

use anyhow::Result;
use clap::Parser;

use clover::cli::commands::{fetch, init, progress};
use clover::cli::{handle_error, Cli, Commands};
use clover::infrastructure::config::ConfigLoader;
use clover::infrastructure::logging::{LogConfig, LoggerImpl};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let json_mode = cli.json;

    if let Err(err) = run(cli).await {
        handle_error(err, json_mode);
    }
}

async fn run(cli: Cli) -> Result<()> {
    if let Commands::Init(args) = cli.command {
        return init::execute(args, cli.json);
    }

    let config = match &cli.config {
        Some(path) => ConfigLoader::load_from_file(path)?,
        None => ConfigLoader::load()?,
    };
    let _logger = LoggerImpl::init(&LogConfig::from(&config.logging))?;

    match cli.command {
        Commands::Init(_) => Ok(()),
        Commands::Fetch(args) => fetch::execute(args, &config, cli.json).await,
        Commands::Progress(args) => progress::execute(args, &config, cli.json).await,
    }
}
