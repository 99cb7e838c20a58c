//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::config::AppConfig;
use crate::error::{Error, Result, ResultExt};
use crate::feed::Feed;
use crate::pagination::{offset_key, LoadOutcome};
use crate::source::{offset_fetcher, HttpSource, JsonFileSource, PageSource};
use serde_json::Value;
use std::io::Write;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Page size used when neither the CLI nor the config sets one
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// What a walk produced
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkSummary {
    /// Non-empty pages written
    pub pages: usize,
    /// Records written
    pub records: usize,
}

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Walk { .. } => {
                let cancel = CancellationToken::new();
                let on_interrupt = cancel.clone();
                let signal_task = tokio::spawn(async move {
                    if tokio::signal::ctrl_c().await.is_ok() {
                        on_interrupt.cancel();
                    }
                });

                let mut out = std::io::stdout();
                let result = self.walk(&cancel, &mut out).await;
                signal_task.abort();

                let summary = result?;
                info!(
                    pages = summary.pages,
                    records = summary.records,
                    "Walk finished"
                );
                Ok(())
            }
            Commands::Config => self.show_config(),
        }
    }

    /// Load the configuration file, or defaults when none was given
    fn load_config(&self) -> Result<AppConfig> {
        match &self.cli.config {
            Some(path) => AppConfig::from_file(path),
            None => Ok(AppConfig::default()),
        }
    }

    /// Print the effective configuration
    fn show_config(&self) -> Result<()> {
        let config = self.load_config()?;
        let rendered = serde_yaml::to_string(&config).context("Failed to render configuration")?;
        print!("{rendered}");
        Ok(())
    }

    /// Page through the source named by the `walk` command, writing records to `out`
    pub async fn walk<W: Write>(
        &self,
        cancel: &CancellationToken,
        out: &mut W,
    ) -> Result<WalkSummary> {
        let Commands::Walk {
            file,
            url,
            page_size,
            max_pages,
            format,
        } = &self.cli.command
        else {
            return Err(Error::config("Not a walk command"));
        };

        let config = self.load_config()?;
        let source: Arc<dyn PageSource> = match (file, url) {
            (Some(path), None) => Arc::new(JsonFileSource::from_path(path)?),
            (None, Some(url)) => Arc::new(HttpSource::new(url, config.source.clone())?),
            _ => return Err(Error::config("Specify exactly one of --file or --url")),
        };

        let mut feed_config = config.feed;
        let limit = page_size
            .or(feed_config.page_size)
            .unwrap_or(DEFAULT_PAGE_SIZE);
        feed_config.page_size = Some(limit);

        let feed = Feed::new(0, offset_fetcher(source, limit), offset_key(), feed_config)?;
        drain(&feed, *max_pages, *format, cancel, out).await
    }
}

/// Load pages until the feed ends, the page budget runs out or `cancel` fires
async fn drain<W: Write>(
    feed: &Feed<u64, Value>,
    max_pages: Option<usize>,
    format: OutputFormat,
    cancel: &CancellationToken,
    out: &mut W,
) -> Result<WalkSummary> {
    let mut summary = WalkSummary::default();

    loop {
        if max_pages.is_some_and(|max| summary.pages >= max) {
            break;
        }

        let printed = feed.with_snapshot(|state| state.items.len());
        match feed.load_more_with_cancel(cancel).await {
            LoadOutcome::Loaded { count: 0 } => {}
            LoadOutcome::Loaded { count } => {
                feed.with_snapshot(|state| {
                    write_page(out, &state.items[printed..], summary.pages, format)
                })?;
                summary.pages += 1;
                summary.records += count;
            }
            LoadOutcome::Skipped => break,
            LoadOutcome::Cancelled => {
                warn!("Walk interrupted");
                break;
            }
            LoadOutcome::Failed | LoadOutcome::TimedOut => {
                let message = feed.with_snapshot(|state| {
                    state
                        .error
                        .as_ref()
                        .map_or_else(|| "no description".to_string(), ToString::to_string)
                });
                return Err(Error::Other(format!("Page fetch failed: {message}")));
            }
        }
    }

    Ok(summary)
}

fn write_page<W: Write>(
    out: &mut W,
    records: &[Value],
    page: usize,
    format: OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Json => {
            for record in records {
                writeln!(out, "{}", serde_json::to_string(record)?)?;
            }
        }
        OutputFormat::Pretty => {
            writeln!(out, "--- page {} ({} records) ---", page + 1, records.len())?;
            for record in records {
                writeln!(out, "{}", serde_json::to_string_pretty(record)?)?;
            }
        }
    }
    Ok(())
}
