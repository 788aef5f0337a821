//! Progress bar rendering for concurrent downloads.
//!
//! [`BarObserver`] implements the library's [`DownloadObserver`] over an
//! [`indicatif::MultiProgress`], one bar per in-flight download keyed by
//! file name. Downloads with a declared length render a byte-scaled bar;
//! unknown-length downloads fall back to a spinner with a byte counter.

use std::{collections::HashMap, sync::Mutex};

use harvester::download::{DownloadObserver, Progress};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

/// Renders one progress bar per in-flight download.
#[derive(Default)]
pub struct BarObserver {
  /// Shared draw target keeping concurrent bars from clobbering each other.
  multi: MultiProgress,
  /// Live bars keyed by destination file name.
  bars:  Mutex<HashMap<String, ProgressBar>>,
}

impl BarObserver {
  /// Bar style for downloads with a known total.
  fn sized_style() -> ProgressStyle {
    ProgressStyle::default_bar()
      .template("[{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta}) {msg}")
      .expect("valid progress bar template")
      .progress_chars("=> ")
  }

  /// Spinner style for downloads of unknown size.
  fn spinner_style() -> ProgressStyle {
    ProgressStyle::default_spinner()
      .template("{spinner} {bytes} {msg}")
      .expect("valid progress spinner template")
  }
}

impl DownloadObserver for BarObserver {
  fn begin(&self, name: &str, total: Option<u64>) {
    let bar = match total {
      Some(length) => {
        let bar = ProgressBar::new(length);
        bar.set_style(Self::sized_style());
        bar
      },
      None => {
        let bar = ProgressBar::new_spinner();
        bar.set_style(Self::spinner_style());
        bar
      },
    };
    bar.set_message(name.to_string());
    let bar = self.multi.add(bar);
    if let Some(replaced) = self.bars.lock().unwrap().insert(name.to_string(), bar) {
      replaced.finish_and_clear();
    }
  }

  fn progress(&self, name: &str, progress: Progress) {
    if let Some(bar) = self.bars.lock().unwrap().get(name) {
      bar.set_position(progress.bytes_written);
    }
  }

  fn finish(&self, name: &str) {
    if let Some(bar) = self.bars.lock().unwrap().remove(name) {
      bar.finish_and_clear();
    }
  }
}
