//! Module for the bulk year-range download commands.

use harvester::harvest::{RunSummary, EARLIEST_YEAR, LATEST_YEAR};

use super::*;

/// Function for the [`Commands::Range`] in the CLI.
pub async fn range(harvester: &Harvester, start_year: u16, end_year: u16) -> Result<()> {
  println!(
    "{} Harvesting papers published {}..={}",
    style(WORKING_PREFIX).cyan(),
    style(start_year).yellow(),
    style(end_year).yellow()
  );
  let summary = harvester.harvest_years(start_year, end_year).await?;
  report(summary);
  Ok(())
}

/// Function for the [`Commands::All`] in the CLI.
pub async fn all(harvester: &Harvester) -> Result<()> {
  println!(
    "{} Harvesting the whole corpus ({EARLIEST_YEAR}-{LATEST_YEAR}); this takes a while",
    style(INFO_PREFIX).blue()
  );
  range(harvester, EARLIEST_YEAR, LATEST_YEAR).await
}

/// Prints the terminal summary of a best-effort run.
fn report(summary: RunSummary) {
  println!(
    "{} Harvest finished: {} downloaded, {} skipped, {} failed",
    style(SUCCESS_PREFIX).green(),
    summary.downloaded,
    summary.skipped,
    summary.failed
  );
  if summary.failed > 0 {
    println!(
      "{} Some items failed; re-running the same range retries them.",
      style(WARNING_PREFIX).yellow()
    );
  }
}
