//! Interactive menu, the default when no subcommand is given.
//!
//! A numbered menu over the same operations the subcommands expose:
//! year-range download, whole-corpus download, single-paper download,
//! bibliographic lookup, exit. A failed operation is reported and the menu
//! comes back; only Exit (or a broken terminal) leaves the loop.

use dialoguer::{Input, Select};
use harvester::harvest::{EARLIEST_YEAR, LATEST_YEAR};

use super::*;

/// Menu entries, in display order.
const MENU_ITEMS: [&str; 5] = [
  "Download papers by year range",
  "Download all years (1987-2023)",
  "Download a specific paper",
  "Fetch bibliographic info",
  "Exit",
];

/// Runs the menu loop until the user exits.
pub async fn run(harvester: &Harvester) -> Result<()> {
  loop {
    let choice =
      Select::new().with_prompt("What would you like to do?").items(&MENU_ITEMS).default(0).interact()?;

    let outcome = match choice {
      0 => {
        let start_year: u16 =
          Input::new().with_prompt(format!("Starting year (min {EARLIEST_YEAR})")).interact_text()?;
        let end_year: u16 =
          Input::new().with_prompt(format!("Ending year (max {LATEST_YEAR})")).interact_text()?;
        commands::range(harvester, start_year, end_year).await
      },
      1 => commands::all(harvester).await,
      2 => {
        let url: String = Input::new().with_prompt("Paper detail-page URL").interact_text()?;
        commands::paper(harvester, &url).await
      },
      3 => {
        let url: String = Input::new().with_prompt("Paper detail-page URL").interact_text()?;
        commands::bibtex(harvester, &url).await
      },
      _ => break,
    };

    // Report and return to the menu; an invalid range or a dead link should
    // not end the session.
    if let Err(e) = outcome {
      eprintln!("{} {e}", style(ERROR_PREFIX).red());
    }
  }
  Ok(())
}
