//! CLI module
//!
//! Command-line interface for walking paginated sources.
//!
//! # Commands
//!
//! - `walk` - Page through a JSON file or HTTP endpoint, printing records
//! - `config` - Print the effective configuration

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::{Runner, WalkSummary, DEFAULT_PAGE_SIZE};
