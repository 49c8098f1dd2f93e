use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use whatnext_infrastructure::ConfigService;

mod browse;
mod commands;
mod helper;
mod logging;
mod presenter;

#[derive(Parser)]
#[command(name = "whatnext")]
#[command(about = "WhatNext - find your next place by chatting or swiping", long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log filter, e.g. `info` or `whatnext_application=debug` (overrides RUST_LOG)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Chat with the recommendation assistant
    Chat(commands::chat::ChatArgs),
    /// Browse places near a location
    Nearby(commands::nearby::NearbyArgs),
    /// Print the effective configuration
    Config {
        /// Print the configuration file path instead
        #[arg(long)]
        path: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.log_level.as_deref())?;

    let service = match cli.config {
        Some(path) => ConfigService::with_path(path),
        None => ConfigService::new(),
    };
    let config = service.get_config();

    match cli.command {
        Commands::Chat(args) => commands::chat::run(config, args).await?,
        Commands::Nearby(args) => commands::nearby::run(config, args).await?,
        Commands::Config { path } => commands::config::run(&service, &config, path)?,
    }

    Ok(())
}
