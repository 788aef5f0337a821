//! Conference proceedings harvesting library.
//!
//! `harvester` retrieves paper artifacts (PDFs and BibTeX records) from a
//! year-indexed proceedings archive, providing:
//!
//! - Multi-stage link resolution (year listing → paper page → artifact URL)
//! - Bounded-concurrency batch downloads with per-item failure isolation
//! - Streaming writes with byte-level progress reporting
//! - An append-only log of every completed download
//! - Taxonomy classification of paper records via a local generation
//!   endpoint, with exponential backoff on rate limiting
//!
//! # Getting Started
//!
//! ```no_run
//! use harvester::{config::Config, harvest::Harvester, prelude::*};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!   let harvester = Harvester::new(Config::default())?;
//!
//!   // Download every paper published in 2020.
//!   let summary = harvester.harvest_years(2020, 2020).await?;
//!   println!("{} PDFs downloaded", summary.downloaded);
//!
//!   // Grab a single paper by its detail-page URL.
//!   let stored = harvester
//!     .fetch_paper("https://papers.nips.cc/paper_files/paper/2020/hash/xyz-Abstract.html")
//!     .await?;
//!
//!   Ok(())
//! }
//! ```
//!
//! # Module Organization
//!
//! - [`harvest`]: Batch orchestration over years, papers, and artifacts
//! - [`resolve`]: Year-listing and paper-page link resolution
//! - [`download`]: Streaming downloads and progress observation
//! - [`extract`]: HTML anchor extraction
//! - [`ledger`]: The append-only download log
//! - [`budget`]: Instrumented concurrency bounds
//! - [`classify`] / [`annotate`]: Taxonomy classification of paper records
//! - [`config`] / [`error`]: Run configuration and the error type
//!
//! # Design Philosophy
//!
//! The batch paths are best effort: one paper's failure is logged and
//! counted, never allowed to abort its siblings, and a run always settles
//! into a terminal summary. The interactive single-item paths do the
//! opposite and hand their outcome straight back to the caller.

#![warn(missing_docs, clippy::missing_docs_in_private_items)]

use std::{
  fmt::Display,
  path::{Path, PathBuf},
  sync::Arc,
};

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, trace, warn};
use url::Url;

pub mod annotate;
pub mod budget;
pub mod classify;
pub mod config;
pub mod download;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod harvest;
pub mod ledger;
pub mod resolve;

use crate::{
  budget::*, config::*, download::*, error::*, extract::*, fetch::*, ledger::*, resolve::*,
};

/// Common types for ergonomic imports.
///
/// # Usage
///
/// ```no_run
/// use harvester::{config::Config, harvest::Harvester, prelude::*};
///
/// async fn example() -> Result<()> {
///   let summary = Harvester::new(Config::default())?.harvest_all().await?;
///   Ok(())
/// }
/// ```
pub mod prelude {
  pub use crate::{
    config::Config,
    download::{DownloadObserver, Progress},
    error::{HarvesterError, Result},
    harvest::{Harvester, RunSummary},
    resolve::ArtifactKind,
  };
}
