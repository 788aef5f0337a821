//! Single-request HTTP access shared by every other component.
//!
//! [`Fetcher`] wraps one [`reqwest::Client`] so that connection pooling is
//! shared across the whole run. It performs exactly one attempt per call and
//! converts non-2xx statuses into [`HarvesterError::Network`]; retry policy
//! belongs to the callers, not this layer.

use super::*;

/// Thin wrapper over a shared HTTP client.
///
/// Cloning is cheap: the underlying client is reference counted, so one
/// `Fetcher` can be handed to every concurrently running task.
#[derive(Debug, Clone, Default)]
pub struct Fetcher {
  /// Pooled HTTP client shared by all clones.
  client: reqwest::Client,
}

impl Fetcher {
  /// Creates a fetcher with a fresh connection pool.
  pub fn new() -> Self { Self::default() }

  /// Issues a single GET and checks the status code.
  ///
  /// The response body has not been consumed when this returns, so callers
  /// may stream it ([`Downloader`](crate::download::Downloader)) or read it
  /// whole ([`Fetcher::get_text`]).
  pub async fn get(&self, url: &Url) -> Result<reqwest::Response> {
    trace!("GET {url}");
    Ok(self.client.get(url.clone()).send().await?.error_for_status()?)
  }

  /// Fetches a URL and reads the full body as text.
  pub async fn get_text(&self, url: &Url) -> Result<String> {
    Ok(self.get(url).await?.text().await?)
  }
}
