//! Resolution of year listings and per-paper artifact links.
//!
//! The archive is traversed in two hops: a year's listing page yields the
//! detail-page URL of every paper published that year, and a paper's detail
//! page yields the terminal artifact URLs (the PDF behind the "Paper" anchor
//! and the bibliographic record behind "Bibtex"). [`Resolver`] owns both
//! hops; the orchestrator decides what to do with the results.

use super::*;

/// Kind of artifact resolved from a paper's detail page.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub enum ArtifactKind {
  /// The paper's PDF document.
  Paper,
  /// The paper's BibTeX record.
  Bibtex,
}

impl ArtifactKind {
  /// Visible text of the anchor that carries this artifact.
  pub fn label(&self) -> &'static str {
    match self {
      ArtifactKind::Paper => "Paper",
      ArtifactKind::Bibtex => "Bibtex",
    }
  }
}

impl Display for ArtifactKind {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { write!(f, "{}", self.label()) }
}

/// Two-hop link resolution against a fixed archive base URL.
#[derive(Debug, Clone)]
pub struct Resolver {
  /// Shared HTTP access.
  fetcher:  Fetcher,
  /// Root of the proceedings archive; all hrefs resolve against this.
  base_url: Url,
}

impl Resolver {
  /// Creates a resolver for the given archive root.
  pub fn new(fetcher: Fetcher, base_url: Url) -> Self { Self { fetcher, base_url } }

  /// Builds the listing URL for a year by templating the known base path.
  pub fn listing_url(&self, year: u16) -> Result<Url> {
    Ok(self.base_url.join(&format!("paper_files/paper/{year}"))?)
  }

  /// Fetches a year's listing and returns every paper detail-page URL.
  ///
  /// The sequence mirrors the listing exactly: document order, duplicates
  /// preserved. A fetch failure propagates so the caller can report it for
  /// this year without disturbing sibling years.
  pub async fn resolve_year(&self, year: u16) -> Result<Vec<Url>> {
    let url = self.listing_url(year)?;
    debug!("Fetching listing for {year} via: {url}");
    let html = self.fetcher.get_text(&url).await?;
    let links = extract::listing_links(&html, &self.base_url);
    debug!("Year {year} lists {} papers", links.len());
    Ok(links.into_iter().map(|link| link.href).collect())
  }

  /// Fetches a paper's detail page and resolves one artifact link.
  ///
  /// Returns `Ok(None)` when the page carries no anchor with the artifact's
  /// label; that is a reportable no-op, not a failure.
  pub async fn resolve_asset(&self, page_url: &Url, kind: ArtifactKind) -> Result<Option<Url>> {
    let html = self.fetcher.get_text(page_url).await?;
    let asset = extract::labeled_link(&html, kind.label(), &self.base_url);
    if asset.is_none() {
      debug!("No '{}' link found on {page_url}", kind.label());
    }
    Ok(asset)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_listing_url_templates_year() {
    let resolver = Resolver::new(Fetcher::new(), Url::parse("https://papers.nips.cc").unwrap());
    assert_eq!(
      resolver.listing_url(2020).unwrap().as_str(),
      "https://papers.nips.cc/paper_files/paper/2020"
    );
  }

  #[test]
  fn test_artifact_labels() {
    assert_eq!(ArtifactKind::Paper.label(), "Paper");
    assert_eq!(ArtifactKind::Bibtex.to_string(), "Bibtex");
  }
}
