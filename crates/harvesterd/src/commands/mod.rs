use super::*;

pub mod annotate;
pub mod bibtex;
pub mod paper;
pub mod range;

pub use annotate::{annotate, AnnotateOptions};
pub use bibtex::bibtex;
pub use paper::paper;
pub use range::{all, range};

/// Available commands for the CLI
#[derive(Subcommand, Clone)]
pub enum Commands {
  /// Download every paper published in an inclusive year range
  Range {
    /// First year to harvest, at least 1987
    start_year: u16,

    /// Last year to harvest, at most 2023
    end_year: u16,
  },

  /// Download the whole corpus, 1987 through 2023
  All,

  /// Download one paper's PDF from its detail-page URL
  Paper {
    /// Detail-page URL of the paper
    url: String,
  },

  /// Fetch one paper's BibTeX record and display it
  Bibtex {
    /// Detail-page URL of the paper
    url: String,
  },

  /// Annotate a CSV paper dataset with taxonomy labels
  Annotate(AnnotateOptions),
}
