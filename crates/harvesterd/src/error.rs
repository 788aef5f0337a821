//! Error types for the harvester CLI.
//!
//! Wraps the library error together with the failure modes the presentation
//! layer itself can hit (terminal interaction, filesystem access).

use thiserror::Error;

/// Error type alias used for the `harvesterd` crate.
pub type Result<T> = core::result::Result<T, HarvesterdError>;

/// Errors that can occur while driving the CLI.
#[derive(Error, Debug)]
pub enum HarvesterdError {
  /// A harvesting operation failed.
  #[error(transparent)]
  Harvester(#[from] harvester::error::HarvesterError),

  /// A terminal prompt could not be displayed or read.
  #[error(transparent)]
  Dialoguer(#[from] dialoguer::Error),

  /// A filesystem operation failed.
  #[error(transparent)]
  Io(#[from] std::io::Error),
}
