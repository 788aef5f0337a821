//! Module for the single-paper download command.

use super::*;

/// Function for the [`Commands::Paper`] in the CLI.
pub async fn paper(harvester: &Harvester, url: &str) -> Result<()> {
  println!("{} Fetching paper page: {}", style(WORKING_PREFIX).cyan(), style(url).yellow());

  match harvester.fetch_paper(url).await? {
    Some(path) => {
      println!("{} Download complete", style(SUCCESS_PREFIX).green());
      println!("   Saved to: {}", style(path.display()).yellow());
    },
    None => println!("{} No 'Paper' link found on the page.", style(WARNING_PREFIX).yellow()),
  }
  Ok(())
}
