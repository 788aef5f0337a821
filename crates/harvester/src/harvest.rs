//! Batch orchestration of harvesting runs.
//!
//! [`Harvester`] drives the whole traversal: year listings fan out into
//! paper detail pages, detail pages resolve into artifact URLs, and
//! artifacts stream to disk. Two budgets bound the fan-out: one for
//! simultaneous year-listing fetches and one, enforced globally, for
//! per-paper resolve+download operations.
//!
//! Failure isolation is the load-bearing property here: a paper that fails
//! to resolve or download is logged and counted, and its siblings continue
//! untouched. Year-range runs are best effort and always settle into a
//! [`RunSummary`]; only invalid year bounds reject a run before any work
//! starts. The interactive single-URL modes instead propagate their outcome
//! directly, since the caller is waiting on that one item.
//!
//! # Examples
//!
//! ```no_run
//! use harvester::{config::Config, harvest::Harvester};
//!
//! # async fn example() -> Result<(), harvester::error::HarvesterError> {
//! let harvester = Harvester::new(Config::default())?;
//! let summary = harvester.harvest_years(2020, 2021).await?;
//! println!("{} downloaded, {} failed", summary.downloaded, summary.failed);
//! # Ok(())
//! # }
//! ```

use tokio::task::JoinSet;

use super::*;

/// First year of the proceedings corpus.
pub const EARLIEST_YEAR: u16 = 1987;

/// Last year of the proceedings corpus.
pub const LATEST_YEAR: u16 = 2023;

/// Terminal accounting of a best-effort run.
///
/// Every spawned unit of work settles into exactly one bucket, so
/// `downloaded + skipped + failed` equals the number of units attempted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
  /// Artifacts fully written and logged.
  pub downloaded: usize,
  /// Units that resolved to no artifact link (reported, not failed).
  pub skipped:    usize,
  /// Units that hit a network, parse, or filesystem fault.
  pub failed:     usize,
}

/// One resolved artifact, ready to stream to disk.
///
/// Created the moment a labeled anchor resolves, consumed exactly once by
/// the downloader, and never retained after the attempt settles.
struct DownloadTarget {
  /// Absolute URL of the artifact.
  asset:     Url,
  /// Destination path, including the file name.
  dest:      PathBuf,
  /// Final path segment of the asset URL.
  file_name: String,
  /// Grouping key for the log: the year, or "N/A" for single-URL modes.
  grouping:  String,
  /// Which artifact this is.
  kind:      ArtifactKind,
}

/// How a single unit of work settled.
enum Outcome {
  /// Artifact written and logged.
  Downloaded,
  /// No labeled anchor on the page; nothing to do.
  Skipped,
  /// The unit failed; siblings are unaffected.
  Failed,
}

impl RunSummary {
  /// Folds one settled unit into the tally.
  fn record(&mut self, outcome: Outcome) {
    match outcome {
      Outcome::Downloaded => self.downloaded += 1,
      Outcome::Skipped => self.skipped += 1,
      Outcome::Failed => self.failed += 1,
    }
  }

  /// Merges the tally of a sub-run.
  fn merge(&mut self, other: Self) {
    self.downloaded += other.downloaded;
    self.skipped += other.skipped;
    self.failed += other.failed;
  }
}

/// Orchestrator over one configured archive.
///
/// Cloning is cheap and shares the budgets, ledger, and observer, which is
/// how per-year and per-paper tasks carry the orchestrator into
/// `tokio::spawn`.
#[derive(Clone)]
pub struct Harvester {
  /// Run configuration, fixed at construction.
  config:         Arc<Config>,
  /// Listing and detail-page resolution.
  resolver:       Resolver,
  /// Streaming artifact writes.
  downloader:     Downloader,
  /// Append-only log of completions.
  ledger:         Arc<Ledger>,
  /// Bound on simultaneous per-paper operations, shared across years.
  paper_budget:   Budget,
  /// Bound on simultaneous year-listing fetches.
  listing_budget: Budget,
  /// Progress sink injected by the presentation layer.
  observer:       Arc<dyn DownloadObserver>,
}

impl Harvester {
  /// Builds an orchestrator from a configuration.
  ///
  /// Fails only if the configured base URL does not parse; directories are
  /// created lazily once downloads actually happen.
  pub fn new(config: Config) -> Result<Self> {
    let base_url = Url::parse(&config.base_url)?;
    let fetcher = Fetcher::new();
    Ok(Self {
      resolver:       Resolver::new(fetcher.clone(), base_url),
      downloader:     Downloader::new(fetcher, config.chunk_size),
      ledger:         Arc::new(Ledger::new(&config.log_path)),
      paper_budget:   Budget::new(config.concurrency_limit),
      listing_budget: Budget::new(config.listing_concurrency),
      observer:       Arc::new(NullObserver),
      config:         Arc::new(config),
    })
  }

  /// Replaces the progress observer (the CLI injects its bar renderer here).
  pub fn with_observer(mut self, observer: Arc<dyn DownloadObserver>) -> Self {
    self.observer = observer;
    self
  }

  /// The per-paper concurrency budget, exposed for instrumentation.
  pub fn paper_budget(&self) -> &Budget { &self.paper_budget }

  /// Harvests the PDF of every paper published in `[start, end]` inclusive.
  ///
  /// Bounds are validated against the corpus bounds before any network
  /// activity. The run is best effort: it completes once every spawned task
  /// has settled, whatever the mix of outcomes.
  pub async fn harvest_years(&self, start: u16, end: u16) -> Result<RunSummary> {
    if start > end || start < EARLIEST_YEAR || end > LATEST_YEAR {
      return Err(HarvesterError::InvalidYearRange { start, end });
    }

    let mut years = JoinSet::new();
    for year in start..=end {
      let harvester = self.clone();
      years.spawn(async move { harvester.harvest_year(year).await });
    }

    let mut summary = RunSummary::default();
    while let Some(result) = years.join_next().await {
      match result {
        Ok(year_summary) => summary.merge(year_summary),
        Err(join_error) => {
          error!("Year task panicked: {join_error}");
          summary.failed += 1;
        },
      }
    }

    info!(
      "Harvest complete: {} downloaded, {} skipped, {} failed",
      summary.downloaded, summary.skipped, summary.failed
    );
    Ok(summary)
  }

  /// Harvests the full corpus, [`EARLIEST_YEAR`] through [`LATEST_YEAR`].
  pub async fn harvest_all(&self) -> Result<RunSummary> {
    self.harvest_years(EARLIEST_YEAR, LATEST_YEAR).await
  }

  /// Resolves one year's listing and fans out its papers.
  ///
  /// A listing fetch failure is reported for this year alone and counts as
  /// one failed unit; sibling years keep running.
  async fn harvest_year(&self, year: u16) -> RunSummary {
    let pages = {
      let _permit = self.listing_budget.acquire().await;
      match self.resolver.resolve_year(year).await {
        Ok(pages) => pages,
        Err(e) => {
          error!("Error fetching papers for year {year}: {e}");
          return RunSummary { failed: 1, ..RunSummary::default() };
        },
      }
    };

    let mut papers = JoinSet::new();
    for page in pages {
      let harvester = self.clone();
      papers.spawn(async move { harvester.harvest_paper(page, year).await });
    }

    let mut summary = RunSummary::default();
    while let Some(result) = papers.join_next().await {
      match result {
        Ok(outcome) => summary.record(outcome),
        Err(join_error) => {
          error!("Paper task for year {year} panicked: {join_error}");
          summary.failed += 1;
        },
      }
    }
    summary
  }

  /// Resolves and downloads one paper's PDF under a single budget permit.
  async fn harvest_paper(&self, page: Url, year: u16) -> Outcome {
    let _permit = self.paper_budget.acquire().await;

    match self.resolver.resolve_asset(&page, ArtifactKind::Paper).await {
      Ok(Some(asset)) => {
        let file_name = file_name_of(&asset);
        let dest = self.config.papers_dir.join(year.to_string()).join(&file_name);
        self
          .store_asset(DownloadTarget {
            asset,
            dest,
            file_name,
            grouping: year.to_string(),
            kind: ArtifactKind::Paper,
          })
          .await
      },
      Ok(None) => {
        warn!("No 'Paper' link found on {page}");
        Outcome::Skipped
      },
      Err(e) => {
        error!("Error resolving paper page {page}: {e}");
        Outcome::Failed
      },
    }
  }

  /// Downloads one target and logs it; converts faults into [`Outcome`]s.
  async fn store_asset(&self, target: DownloadTarget) -> Outcome {
    let DownloadTarget { asset, dest, file_name, grouping, kind } = target;
    match self.downloader.download(&asset, &dest, self.observer.as_ref()).await {
      Ok(bytes) => {
        let record = DownloadRecord { year: grouping, file_name, url: asset.to_string(), kind };
        match self.ledger.append(&record).await {
          Ok(()) => {
            info!("Download complete: {} ({bytes} bytes)", dest.display());
            Outcome::Downloaded
          },
          Err(e) => {
            error!("Downloaded {} but could not log it: {e}", dest.display());
            Outcome::Failed
          },
        }
      },
      Err(e) => {
        error!("Error downloading {asset}: {e}");
        Outcome::Failed
      },
    }
  }

  /// Downloads the PDF behind one paper detail page into the flat downloads
  /// directory.
  ///
  /// Returns the stored path, or `Ok(None)` when the page carries no
  /// "Paper" anchor. Unlike the batch modes, faults propagate to the caller
  /// for display.
  pub async fn fetch_paper(&self, url: &str) -> Result<Option<PathBuf>> {
    let page = Url::parse(url)?;
    let Some(asset) = self.resolver.resolve_asset(&page, ArtifactKind::Paper).await? else {
      warn!("No 'Paper' link found on {page}");
      return Ok(None);
    };

    let file_name = file_name_of(&asset);
    let dest = self.config.downloads_dir.join(&file_name);
    self.downloader.download(&asset, &dest, self.observer.as_ref()).await?;
    self
      .ledger
      .append(&DownloadRecord {
        year: "N/A".to_string(),
        file_name,
        url: asset.to_string(),
        kind: ArtifactKind::Paper,
      })
      .await?;
    Ok(Some(dest))
  }

  /// Downloads the BibTeX record behind one paper detail page and reads it
  /// back for display.
  ///
  /// Returns the stored path and its text content, or `Ok(None)` when the
  /// page carries no "Bibtex" anchor.
  pub async fn fetch_bibtex(&self, url: &str) -> Result<Option<(PathBuf, String)>> {
    let page = Url::parse(url)?;
    let Some(asset) = self.resolver.resolve_asset(&page, ArtifactKind::Bibtex).await? else {
      warn!("No 'Bibtex' link found on {page}");
      return Ok(None);
    };

    let file_name = file_name_of(&asset);
    let dest = self.config.info_dir.join(&file_name);
    self.downloader.download(&asset, &dest, self.observer.as_ref()).await?;
    self
      .ledger
      .append(&DownloadRecord {
        year: "N/A".to_string(),
        file_name,
        url: asset.to_string(),
        kind: ArtifactKind::Bibtex,
      })
      .await?;

    let content = tokio::fs::read_to_string(&dest).await?;
    Ok(Some((dest, content)))
  }
}

/// Destination file name: the final path segment of the asset URL.
fn file_name_of(url: &Url) -> String {
  url
    .path_segments()
    .and_then(|segments| segments.last())
    .filter(|segment| !segment.is_empty())
    .unwrap_or("download")
    .to_string()
}

#[cfg(test)]
mod tests {
  use super::*;

  fn harvester() -> Harvester { Harvester::new(Config::default()).unwrap() }

  #[tokio::test]
  async fn test_reversed_bounds_rejected() {
    let result = harvester().harvest_years(2021, 2019).await;
    assert!(matches!(result, Err(HarvesterError::InvalidYearRange { start: 2021, end: 2019 })));
  }

  #[tokio::test]
  async fn test_out_of_corpus_bounds_rejected() {
    assert!(harvester().harvest_years(1986, 1990).await.is_err());
    assert!(harvester().harvest_years(2020, 2024).await.is_err());
  }

  #[test]
  fn test_invalid_base_url_rejected_at_construction() {
    assert!(Harvester::new(Config::default().with_base_url("not a url")).is_err());
  }

  #[test]
  fn test_file_name_from_final_segment() {
    let url = Url::parse("https://papers.nips.cc/paper_files/paper/2020/file/abc123-Paper.pdf")
      .unwrap();
    assert_eq!(file_name_of(&url), "abc123-Paper.pdf");
    assert_eq!(file_name_of(&Url::parse("https://papers.nips.cc/").unwrap()), "download");
  }
}
