//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI
//! arguments. The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Personal records analytics: extract, classify, correlate
#[derive(Parser)]
#[command(name = "weave")]
#[command(about = "Personal records analytics: extract, classify, correlate", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format: text, json
    #[arg(long, default_value = "text", global = true)]
    pub format: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze one or more dataset files and print the full report
    Analyze {
        /// Files to analyze (.csv parses as tabular, anything else as journal text)
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Skip the text-model backend and use rule-based extraction only
        #[arg(long)]
        no_model: bool,
    },

    /// Extract metrics, categories and entities from a single text entry
    Extract {
        /// The entry text, quoted
        text: String,
    },

    /// Classify a dataset file into a domain
    Classify {
        /// File to classify
        file: PathBuf,
    },
}
