//! Configuration for harvesting runs.
//!
//! Everything tunable about a run lives here as an explicit structure
//! handed to [`Harvester::new`](crate::harvest::Harvester::new): the archive
//! base URL, the three destination directories, the download-log path, and
//! the concurrency budgets. Every field has a sensible default, so
//! `Config::default()` is a working configuration for the public archive.
//!
//! # Examples
//!
//! ```
//! use harvester::config::Config;
//!
//! let config = Config::default().with_papers_dir("archive/papers").with_concurrency_limit(4);
//! assert_eq!(config.base_url, "https://papers.nips.cc");
//! ```
//!
//! Configurations can also be loaded from TOML, with omitted keys falling
//! back to their defaults:
//!
//! ```
//! use harvester::config::Config;
//!
//! let config = Config::from_toml_str(r#"concurrency_limit = 2"#).unwrap();
//! assert_eq!(config.concurrency_limit, 2);
//! assert_eq!(config.chunk_size, 1024);
//! ```

use super::*;

/// Settings governing where artifacts are stored and how hard the archive
/// host is driven.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
  /// Base URL of the proceedings archive.
  pub base_url: String,

  /// Directory for year-range downloads; one subdirectory per year is
  /// created beneath it.
  pub papers_dir: PathBuf,

  /// Flat directory for single-URL paper downloads.
  pub downloads_dir: PathBuf,

  /// Flat directory for single-URL bibliographic records.
  pub info_dir: PathBuf,

  /// Path of the append-only download log.
  pub log_path: PathBuf,

  /// Maximum number of simultaneous per-paper resolve+download operations
  /// across the whole run.
  pub concurrency_limit: usize,

  /// Maximum number of simultaneous year-listing fetches.
  pub listing_concurrency: usize,

  /// Write granularity for streamed downloads, in bytes. Progress is
  /// reported once per chunk.
  pub chunk_size: usize,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      base_url:            "https://papers.nips.cc".to_string(),
      papers_dir:          PathBuf::from("papers"),
      downloads_dir:       PathBuf::from("downloads"),
      info_dir:            PathBuf::from("info"),
      log_path:            PathBuf::from("download_log.csv"),
      concurrency_limit:   10,
      listing_concurrency: 4,
      chunk_size:          1024,
    }
  }
}

impl Config {
  /// Parses a configuration from a TOML string, defaulting omitted keys.
  pub fn from_toml_str(toml_str: &str) -> Result<Self> { Ok(toml::from_str(toml_str)?) }

  /// Reads and parses a configuration from a TOML file.
  pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
    Self::from_toml_str(&std::fs::read_to_string(path)?)
  }

  /// Sets the archive base URL.
  pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
    self.base_url = base_url.into();
    self
  }

  /// Sets the directory used for year-range downloads.
  pub fn with_papers_dir(mut self, dir: impl Into<PathBuf>) -> Self {
    self.papers_dir = dir.into();
    self
  }

  /// Sets the directory used for single-URL paper downloads.
  pub fn with_downloads_dir(mut self, dir: impl Into<PathBuf>) -> Self {
    self.downloads_dir = dir.into();
    self
  }

  /// Sets the directory used for bibliographic records.
  pub fn with_info_dir(mut self, dir: impl Into<PathBuf>) -> Self {
    self.info_dir = dir.into();
    self
  }

  /// Sets the download-log path.
  pub fn with_log_path(mut self, path: impl Into<PathBuf>) -> Self {
    self.log_path = path.into();
    self
  }

  /// Sets the per-paper concurrency budget.
  pub fn with_concurrency_limit(mut self, limit: usize) -> Self {
    self.concurrency_limit = limit;
    self
  }

  /// Sets the year-listing concurrency budget.
  pub fn with_listing_concurrency(mut self, limit: usize) -> Self {
    self.listing_concurrency = limit;
    self
  }

  /// Sets the streamed-write chunk size in bytes.
  pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
    self.chunk_size = chunk_size;
    self
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_defaults_point_at_public_archive() {
    let config = Config::default();
    assert_eq!(config.base_url, "https://papers.nips.cc");
    assert_eq!(config.papers_dir, PathBuf::from("papers"));
    assert_eq!(config.downloads_dir, PathBuf::from("downloads"));
    assert_eq!(config.info_dir, PathBuf::from("info"));
    assert_eq!(config.concurrency_limit, 10);
    assert_eq!(config.chunk_size, 1024);
  }

  #[test]
  fn test_toml_overrides_keep_defaults_elsewhere() {
    let config = Config::from_toml_str(
      r#"
      base_url = "http://localhost:8080"
      papers_dir = "scratch/papers"
      "#,
    )
    .unwrap();
    assert_eq!(config.base_url, "http://localhost:8080");
    assert_eq!(config.papers_dir, PathBuf::from("scratch/papers"));
    assert_eq!(config.concurrency_limit, 10);
  }

  #[test]
  fn test_invalid_toml_is_rejected() {
    assert!(Config::from_toml_str("concurrency_limit = \"many\"").is_err());
  }
}
