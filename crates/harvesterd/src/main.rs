//! Command line interface for the proceedings harvester.
//!
//! This crate provides a CLI over the `harvester` library. It supports:
//! - Bulk downloads over a year range or the whole corpus
//! - Single-paper PDF and BibTeX retrieval by detail-page URL
//! - Taxonomy annotation of a paper dataset
//!
//! # Usage
//!
//! ```bash
//! # Download every paper published between 2019 and 2021
//! harvester range 2019 2021
//!
//! # Download the whole corpus
//! harvester all
//!
//! # Grab one paper's PDF
//! harvester paper https://papers.nips.cc/paper_files/paper/2020/hash/xyz-Abstract.html
//!
//! # Fetch and display a paper's BibTeX record
//! harvester bibtex https://papers.nips.cc/paper_files/paper/2020/hash/xyz-Abstract.html
//!
//! # Annotate a dataset with taxonomy labels
//! harvester annotate papers.csv annotated.csv
//! ```
//!
//! Run without a subcommand for an interactive menu. Output is colored,
//! downloads render live progress bars, and the `-v` flag raises the logging
//! verbosity.

#![warn(missing_docs, clippy::missing_docs_in_private_items)]

use std::{path::PathBuf, sync::Arc};

use clap::{builder::ArgAction, Args, Parser, Subcommand};
use console::style;
use harvester::{config::Config, harvest::Harvester};
use tracing::debug;
use tracing_subscriber::EnvFilter;

pub mod commands;
pub mod error;
pub mod menu;
pub mod progress;

use crate::{commands::*, error::*};

/// Prefix for information messages
static INFO_PREFIX: &str = "ℹ ";
/// Prefix for in-progress messages
static WORKING_PREFIX: &str = "» ";
/// Prefix for success messages
static SUCCESS_PREFIX: &str = "✓ ";
/// Prefix for warning messages
static WARNING_PREFIX: &str = "! ";
/// Prefix for error messages
static ERROR_PREFIX: &str = "✗ ";

/// Command line interface configuration and argument parsing
#[derive(Parser)]
#[command(author, version, about = "CLI for harvesting conference paper archives")]
pub struct Cli {
  /// Verbose mode (-v, -vv, -vvv) for different levels of logging detail
  #[arg(
        short,
        long,
        action = ArgAction::Count,
        global = true,
        help = "Increase logging verbosity"
    )]
  verbose: u8,

  /// Path to a TOML configuration file. Omitted keys fall back to their
  /// defaults, and the flags below override whatever was loaded.
  #[arg(long, short, global = true)]
  config: Option<PathBuf>,

  /// Base URL of the proceedings archive
  #[arg(long, global = true)]
  base_url: Option<String>,

  /// Directory for year-range downloads
  #[arg(long, global = true)]
  papers_dir: Option<PathBuf>,

  /// Directory for single-URL paper downloads
  #[arg(long, global = true)]
  downloads_dir: Option<PathBuf>,

  /// Directory for bibliographic records
  #[arg(long, global = true)]
  info_dir: Option<PathBuf>,

  /// Path of the append-only download log
  #[arg(long, global = true)]
  log_path: Option<PathBuf>,

  /// Maximum simultaneous per-paper download operations
  #[arg(long, global = true)]
  concurrency: Option<usize>,

  /// The subcommand to execute; omit it for the interactive menu
  #[command(subcommand)]
  command: Option<Commands>,
}

impl Cli {
  /// Resolves the effective configuration: file, then flag overrides.
  fn resolve_config(&self) -> Result<Config> {
    let mut config = match &self.config {
      Some(path) => Config::from_toml_file(path)?,
      None => Config::default(),
    };
    if let Some(base_url) = &self.base_url {
      config = config.with_base_url(base_url);
    }
    if let Some(dir) = &self.papers_dir {
      config = config.with_papers_dir(dir);
    }
    if let Some(dir) = &self.downloads_dir {
      config = config.with_downloads_dir(dir);
    }
    if let Some(dir) = &self.info_dir {
      config = config.with_info_dir(dir);
    }
    if let Some(path) = &self.log_path {
      config = config.with_log_path(path);
    }
    if let Some(limit) = self.concurrency {
      config = config.with_concurrency_limit(limit);
    }
    Ok(config)
  }
}

/// Configures the logging system based on the verbosity level
///
/// The verbosity levels are:
/// - 0: error (default)
/// - 1: warn
/// - 2: info
/// - 3: debug
/// - 4+: trace
fn setup_logging(verbosity: u8) {
  let filter = match verbosity {
    0 => "error",
    1 => "warn",
    2 => "info",
    3 => "debug",
    _ => "trace",
  };

  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

  tracing_subscriber::fmt().with_env_filter(filter).with_target(true).init();
}

/// Entry point for the harvester CLI application
///
/// Parses arguments, sets up logging, builds the orchestrator, and runs the
/// requested command (or the interactive menu when none is given). Errors
/// are printed human-readably and reflected in the exit code.
#[tokio::main]
async fn main() {
  let cli = Cli::parse();
  setup_logging(cli.verbose);

  if let Err(e) = run(&cli).await {
    eprintln!("{} {e}", style(ERROR_PREFIX).red());
    std::process::exit(1);
  }
}

/// Dispatches the parsed command.
async fn run(cli: &Cli) -> Result<()> {
  let config = cli.resolve_config()?;
  debug!("Running with configuration: {config:?}");
  let harvester =
    Harvester::new(config)?.with_observer(Arc::new(progress::BarObserver::default()));

  match &cli.command {
    Some(Commands::Range { start_year, end_year }) =>
      range(&harvester, *start_year, *end_year).await,
    Some(Commands::All) => all(&harvester).await,
    Some(Commands::Paper { url }) => paper(&harvester, url).await,
    Some(Commands::Bibtex { url }) => bibtex(&harvester, url).await,
    Some(Commands::Annotate(annotate_options)) => annotate(annotate_options.clone()).await,
    None => menu::run(&harvester).await,
  }
}
