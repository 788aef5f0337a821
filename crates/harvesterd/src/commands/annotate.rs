//! Module for the dataset annotation command.

use harvester::classify::Classifier;

use super::*;

/// Options for the [`Commands::Annotate`] subcommand.
#[derive(Args, Clone)]
pub struct AnnotateOptions {
  /// Input CSV dataset carrying Title and Abstract columns
  pub input: PathBuf,

  /// Output CSV path; the input plus a Category column
  pub output: PathBuf,

  /// Host of the generation endpoint
  #[arg(long)]
  pub host: Option<String>,

  /// Model identifier to request from the endpoint
  #[arg(long)]
  pub model: Option<String>,

  /// Simultaneous classification calls
  #[arg(long, default_value_t = harvester::annotate::DEFAULT_WORKERS)]
  pub workers: usize,
}

/// Function for the [`Commands::Annotate`] in the CLI.
pub async fn annotate(options: AnnotateOptions) -> Result<()> {
  let AnnotateOptions { input, output, host, model, workers } = options;

  let mut classifier = Classifier::new();
  if let Some(host) = host {
    classifier = classifier.with_host(&host);
  }
  if let Some(model) = model {
    classifier = classifier.with_model(model);
  }

  println!("{} Annotating dataset: {}", style(WORKING_PREFIX).cyan(), style(input.display()).yellow());
  let summary = harvester::annotate::annotate(&classifier, &input, &output, workers).await?;

  println!(
    "{} Annotation complete! {} rows written to {} ({} classified, {} errors)",
    style(SUCCESS_PREFIX).green(),
    summary.rows,
    style(output.display()).yellow(),
    summary.classified,
    summary.errors
  );
  Ok(())
}
