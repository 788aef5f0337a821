//! Error types for the harvester library.
//!
//! This module provides a single error type covering every failure mode of a
//! harvesting run:
//! - Network and status-code errors
//! - Filesystem operations
//! - Download-log serialization
//! - Input validation (year bounds, URLs)
//!
//! Two conditions are deliberately *not* errors anywhere in this crate:
//! malformed HTML (the extractor yields an empty sequence) and a missing
//! labeled anchor on a paper page (resolution yields `None`). Both are
//! reportable no-ops handled at the call site.

use thiserror::Error;

/// Error type alias used for the [`harvester`](crate) crate.
pub type Result<T> = core::result::Result<T, HarvesterError>;

/// Errors that can occur while harvesting paper archives.
///
/// Most variants wrap an underlying error from the network, filesystem, or
/// serialization layer. The orchestrator catches these at the smallest
/// enclosing unit of work (one paper, one year) so that sibling work is
/// never aborted; only [`HarvesterError::InvalidYearRange`] rejects a run
/// before any work starts.
#[derive(Error, Debug)]
pub enum HarvesterError {
  /// A network request failed.
  ///
  /// This can occur when:
  /// - The network is unavailable or the host is unreachable
  /// - The request times out
  /// - The server answers with a non-2xx status
  #[error(transparent)]
  Network(#[from] reqwest::Error),

  /// A filesystem operation failed.
  ///
  /// This occurs when creating destination directories, writing a streamed
  /// download, or reading back a stored record fails.
  #[error(transparent)]
  Io(#[from] std::io::Error),

  /// Appending to the download log failed.
  #[error(transparent)]
  Log(#[from] csv::Error),

  /// A configuration file could not be parsed.
  #[error(transparent)]
  TomlDe(#[from] toml::de::Error),

  /// A user-supplied URL could not be parsed.
  #[error(transparent)]
  InvalidUrl(#[from] url::ParseError),

  /// The requested year bounds are not a valid range within the archive.
  ///
  /// Raised before any network activity when `start > end` or either bound
  /// falls outside the known corpus bounds.
  #[error("Invalid year range {start}..={end}; years must lie within the 1987..=2023 corpus")]
  InvalidYearRange {
    /// Requested first year, inclusive.
    start: u16,
    /// Requested last year, inclusive.
    end:   u16,
  },

  /// The remote generation endpoint signaled resource exhaustion.
  ///
  /// Only the classification path produces this variant; the document host
  /// is never modeled as rate limiting.
  #[error("Rate limited by the generation endpoint")]
  RateLimited,

  /// An annotation dataset lacks a required column.
  #[error("Input dataset is missing required column {0:?}")]
  MissingColumn(String),
}
