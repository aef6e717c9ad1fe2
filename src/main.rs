// src/main.rs

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};

fn main() -> Result<()> {
    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Show { pack, lang } => commands::cmd_show(&pack, &lang),
        Commands::Status { pack } => commands::cmd_status(&pack),
        Commands::Plan {
            pack,
            feature,
            value,
        } => commands::cmd_plan(&pack, &feature, &value),
        Commands::Set {
            pack,
            feature,
            value,
            dry_run,
        } => commands::cmd_set(&pack, &feature, &value, dry_run),
        Commands::Completions { shell } => commands::cmd_completions(shell),
    }
}
