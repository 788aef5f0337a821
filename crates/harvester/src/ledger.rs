//! Append-only log of completed downloads.
//!
//! Every download that fully reaches its destination gets exactly one row
//! here; nothing else does. The log is tabular CSV with a header written
//! only when the file is first created, and rows are never rewritten. A file
//! on disk without a matching row must be treated as untrusted (a partial
//! write left behind by a failed attempt).
//!
//! Concurrency: appends from within one process are serialized by an async
//! mutex so two completions can never interleave partial rows. Nothing here
//! guards against concurrent writers in *other* processes.

use std::fs::OpenOptions;

use tokio::sync::Mutex;

use super::*;

/// One completed download.
///
/// Never mutated or deleted once appended. `year` carries the grouping key
/// of year-range runs and the literal `"N/A"` for single-URL modes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DownloadRecord {
  /// Grouping key: the publication year, or "N/A".
  #[serde(rename = "Year")]
  pub year:      String,
  /// File name of the stored artifact.
  #[serde(rename = "File Name")]
  pub file_name: String,
  /// Source URL the artifact was fetched from.
  #[serde(rename = "URL")]
  pub url:       String,
  /// Artifact type (Paper or Bibtex).
  #[serde(rename = "Type")]
  pub kind:      resolve::ArtifactKind,
}

/// Handle to the persisted download log.
#[derive(Debug)]
pub struct Ledger {
  /// Location of the CSV file.
  path:  PathBuf,
  /// Single-writer discipline for in-process appends.
  guard: Mutex<()>,
}

impl Ledger {
  /// Creates a handle; the file itself is created lazily on first append.
  pub fn new(path: impl Into<PathBuf>) -> Self { Self { path: path.into(), guard: Mutex::new(()) } }

  /// Location of the underlying CSV file.
  pub fn path(&self) -> &Path { &self.path }

  /// Appends one record, writing the header first if the log is new.
  ///
  /// Each call is atomic with respect to other `append` calls on the same
  /// `Ledger`: the row (and header, when applicable) is fully written and
  /// flushed before the lock is released.
  pub async fn append(&self, record: &DownloadRecord) -> Result<()> {
    let _guard = self.guard.lock().await;

    if let Some(parent) = self.path.parent() {
      if !parent.as_os_str().is_empty() {
        std::fs::create_dir_all(parent)?;
      }
    }

    let is_new = !self.path.exists();
    let file = OpenOptions::new().create(true).append(true).open(&self.path)?;
    let mut writer = csv::WriterBuilder::new().has_headers(is_new).from_writer(file);
    writer.serialize(record)?;
    writer.flush()?;
    Ok(())
  }
}
