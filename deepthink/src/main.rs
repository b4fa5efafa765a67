//! deepthink - research agent CLI
//!
//! Memory-aware research: learns which method suits which kind of question,
//! caches results and reports what it has learned.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod backend;
mod cli;
mod commands;
mod config;
mod personality;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive("deepthink=info".parse()?))
        .init();

    let cli = Cli::parse();

    // Load configuration
    let config = config::Config::load(cli.aget_dir.as_deref())?
        .with_overrides(None, cli.workspace_dir.clone());

    // Execute command
    match cli.command.unwrap_or(Commands::Wake) {
        Commands::Wake => commands::wake::execute(&config).await,
        Commands::Intro => commands::wake::intro(&config).await,
        Commands::Stats { json } => commands::stats::execute(json, &config).await,
        Commands::Insights { json } => commands::insights::execute(json, &config).await,
        Commands::Research(cmd) => commands::research::execute(cmd, &config).await,
        Commands::Cleanup { max_age_hours } => {
            commands::cleanup::execute(max_age_hours, &config).await
        }
        Commands::WindDown => commands::wake::wind_down(&config).await,
        Commands::Version => {
            println!("deepthink {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
