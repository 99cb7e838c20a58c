//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Paginated loading from the command line
#[derive(Parser, Debug)]
#[command(name = "pagewise")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (YAML or JSON)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Page through a source and print its records
    Walk {
        /// JSON file holding an array of records
        #[arg(long, conflicts_with = "url")]
        file: Option<PathBuf>,

        /// HTTP endpoint accepting offset/limit query parameters
        #[arg(long)]
        url: Option<String>,

        /// Records per page (overrides the config file)
        #[arg(short, long)]
        page_size: Option<usize>,

        /// Stop after this many pages
        #[arg(long)]
        max_pages: Option<usize>,

        /// Output format
        #[arg(short, long, default_value = "json")]
        format: OutputFormat,
    },

    /// Print the effective configuration as YAML
    Config,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one record per line)
    Json,
    /// Human-readable output, one block per page
    Pretty,
}
