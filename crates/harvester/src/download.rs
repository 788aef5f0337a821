//! Streaming downloads with byte-level progress reporting.
//!
//! [`Downloader`] issues a streaming GET and writes the body to disk in
//! fixed-size chunks, reporting progress after each chunk through an
//! injected [`DownloadObserver`]. The presentation layer decides how to
//! render the reports (the CLI draws indicatif bars); the library ships a
//! [`NullObserver`] that discards them.
//!
//! Failure semantics: any network or I/O fault mid-stream surfaces the
//! underlying error and leaves the partially written file in place. A file
//! is only trustworthy once the corresponding record lands in the download
//! log, which the orchestrator appends strictly after a download returns
//! `Ok`.

use futures::StreamExt;
use tokio::io::AsyncWriteExt;

use super::*;

/// Byte accounting for one in-flight download.
///
/// Owned by the downloading task and discarded on completion; this never
/// outlives the download it describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
  /// Bytes written to the destination so far.
  pub bytes_written: u64,
  /// Declared total size, when the server sent a usable `Content-Length`.
  /// `None` means unknown and progress degrades to bytes-written-only.
  pub total_bytes:   Option<u64>,
}

/// Receiver for download progress, keyed by destination file name so that
/// concurrent downloads can be rendered independently.
pub trait DownloadObserver: Send + Sync {
  /// A download is starting; `total` is the declared size if known.
  fn begin(&self, name: &str, total: Option<u64>);

  /// Another chunk reached the destination.
  fn progress(&self, name: &str, progress: Progress);

  /// The download finished (successfully or not) and the bar, line, or
  /// widget for `name` can be retired.
  fn finish(&self, name: &str);
}

/// Observer that discards every report.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullObserver;

impl DownloadObserver for NullObserver {
  fn begin(&self, _name: &str, _total: Option<u64>) {}

  fn progress(&self, _name: &str, _progress: Progress) {}

  fn finish(&self, _name: &str) {}
}

/// Streams URLs to disk in fixed-size chunks.
#[derive(Debug, Clone)]
pub struct Downloader {
  /// Shared HTTP access.
  fetcher:    Fetcher,
  /// Write granularity in bytes; bounds peak memory per download.
  chunk_size: usize,
}

impl Downloader {
  /// Creates a downloader writing `chunk_size`-byte chunks.
  pub fn new(fetcher: Fetcher, chunk_size: usize) -> Self {
    Self { fetcher, chunk_size: chunk_size.max(1) }
  }

  /// Streams `url` into `dest`, creating parent directories as needed.
  ///
  /// The destination is truncated if it already exists; repeating a download
  /// simply overwrites it. Returns the number of bytes written. On error the
  /// destination handle is closed by drop and any partial content is left on
  /// disk for the caller to treat as untrusted.
  pub async fn download(
    &self,
    url: &Url,
    dest: &Path,
    observer: &dyn DownloadObserver,
  ) -> Result<u64> {
    let response = self.fetcher.get(url).await?;

    // A zero or missing Content-Length means the total is unknown.
    let total_bytes = response.content_length().filter(|length| *length > 0);
    let name = dest
      .file_name()
      .map(|name| name.to_string_lossy().into_owned())
      .unwrap_or_else(|| url.to_string());

    if let Some(parent) = dest.parent() {
      tokio::fs::create_dir_all(parent).await?;
    }

    debug!("Downloading {url} -> {}", dest.display());
    observer.begin(&name, total_bytes);

    let result = self.write_stream(response, dest, &name, total_bytes, observer).await;
    observer.finish(&name);
    result
  }

  /// Writes the response body through the chunking loop.
  async fn write_stream(
    &self,
    response: reqwest::Response,
    dest: &Path,
    name: &str,
    total_bytes: Option<u64>,
    observer: &dyn DownloadObserver,
  ) -> Result<u64> {
    let mut file = tokio::fs::File::create(dest).await?;
    let mut stream = response.bytes_stream();
    let mut bytes_written = 0u64;

    while let Some(chunk) = stream.next().await {
      let chunk = chunk?;
      // Network chunks arrive at arbitrary sizes; re-slice them so writes
      // and progress reports happen at the configured granularity.
      for piece in chunk.chunks(self.chunk_size) {
        file.write_all(piece).await?;
        bytes_written += piece.len() as u64;
        observer.progress(name, Progress { bytes_written, total_bytes });
      }
    }

    file.flush().await?;
    Ok(bytes_written)
  }
}

#[cfg(test)]
mod tests {
  use std::sync::Mutex;

  use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
  };

  use super::*;

  /// Observer recording every report for assertions.
  #[derive(Default)]
  struct Recording {
    begun:    Mutex<Vec<(String, Option<u64>)>>,
    reports:  Mutex<Vec<Progress>>,
    finished: Mutex<Vec<String>>,
  }

  impl DownloadObserver for Recording {
    fn begin(&self, name: &str, total: Option<u64>) {
      self.begun.lock().unwrap().push((name.to_string(), total));
    }

    fn progress(&self, _name: &str, progress: Progress) {
      self.reports.lock().unwrap().push(progress);
    }

    fn finish(&self, name: &str) { self.finished.lock().unwrap().push(name.to_string()); }
  }

  #[tokio::test]
  async fn test_download_writes_declared_length_and_reports_chunks() {
    let server = MockServer::start().await;
    let payload = vec![7u8; 2500];
    Mock::given(method("GET"))
      .and(path("/pdf/one.pdf"))
      .respond_with(ResponseTemplate::new(200).set_body_bytes(payload.clone()))
      .mount(&server)
      .await;

    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("nested").join("one.pdf");
    let url = Url::parse(&format!("{}/pdf/one.pdf", server.uri())).unwrap();
    let observer = Recording::default();

    let downloader = Downloader::new(Fetcher::new(), 1024);
    let written = downloader.download(&url, &dest, &observer).await.unwrap();

    assert_eq!(written, 2500);
    assert_eq!(std::fs::read(&dest).unwrap(), payload);

    let begun = observer.begun.lock().unwrap();
    assert_eq!(*begun, vec![("one.pdf".to_string(), Some(2500))]);

    let reports = observer.reports.lock().unwrap();
    let last = reports.last().unwrap();
    assert_eq!(last.bytes_written, 2500);
    assert_eq!(last.total_bytes, Some(2500));
    // 1024-byte granularity over 2500 bytes means at least three reports.
    assert!(reports.len() >= 3);
    assert!(reports.iter().all(|p| p.bytes_written <= 2500));

    assert_eq!(observer.finished.lock().unwrap().len(), 1);
  }

  #[tokio::test]
  async fn test_download_overwrites_existing_destination() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .and(path("/file"))
      .respond_with(ResponseTemplate::new(200).set_body_bytes(b"second".to_vec()))
      .mount(&server)
      .await;

    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("file");
    std::fs::write(&dest, b"first, and noticeably longer than the second").unwrap();

    let url = Url::parse(&format!("{}/file", server.uri())).unwrap();
    Downloader::new(Fetcher::new(), 1024).download(&url, &dest, &NullObserver).await.unwrap();

    assert_eq!(std::fs::read(&dest).unwrap(), b"second");
  }

  #[tokio::test]
  async fn test_non_success_status_creates_no_file() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .and(path("/missing"))
      .respond_with(ResponseTemplate::new(404))
      .mount(&server)
      .await;

    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("missing.pdf");
    let url = Url::parse(&format!("{}/missing", server.uri())).unwrap();

    let result = Downloader::new(Fetcher::new(), 1024).download(&url, &dest, &NullObserver).await;

    assert!(matches!(result, Err(HarvesterError::Network(_))));
    assert!(!dest.exists());
  }
}
