//! Module for the bibliographic-info command.

use super::*;

/// Function for the [`Commands::Bibtex`] in the CLI.
///
/// Downloads the record into the info directory and prints its content,
/// since the caller asked to *see* the bibliographic entry.
pub async fn bibtex(harvester: &Harvester, url: &str) -> Result<()> {
  println!("{} Fetching paper page: {}", style(WORKING_PREFIX).cyan(), style(url).yellow());

  match harvester.fetch_bibtex(url).await? {
    Some((path, content)) => {
      println!("{} Download complete", style(SUCCESS_PREFIX).green());
      println!("   Saved to: {}", style(path.display()).yellow());
      println!("\n{content}");
    },
    None => println!("{} No 'Bibtex' link found on the page.", style(WARNING_PREFIX).yellow()),
  }
  Ok(())
}
