//! Weave CLI - Find the threads running through your personal records
//!
//! Usage:
//!   weave analyze stats.csv journal.txt   Run the full analysis pipeline
//!   weave extract "2 goals, 7 miles"      Preview unit extraction for one entry
//!   weave classify stats.csv              Show the domain classification for a file

mod cli;
mod commands;

#[cfg(test)]
mod tests;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    match cli.command {
        Commands::Analyze { files, no_model } => {
            commands::cmd_analyze(&files, no_model, &cli.format).await
        }
        Commands::Extract { text } => commands::cmd_extract(&text, &cli.format),
        Commands::Classify { file } => commands::cmd_classify(&file, &cli.format).await,
    }
}
