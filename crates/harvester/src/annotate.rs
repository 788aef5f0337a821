//! Bulk annotation of a paper dataset with taxonomy labels.
//!
//! Reads a CSV dataset carrying `Title` and `Abstract` columns, classifies
//! every row through a [`Classifier`], and writes the dataset back out with
//! a `Category` column appended. All other columns pass through untouched
//! and row order is preserved, so the output is the input plus one column.
//!
//! Classification calls run under a bounded worker budget (default 5);
//! a row whose call settles as [`Label::Error`] keeps that label in the
//! output rather than aborting the pass.

use csv::StringRecord;
use tokio::task::JoinSet;

use super::*;
use crate::{budget::Budget, classify::{Classifier, Label}};

/// Default number of simultaneous classification calls.
pub const DEFAULT_WORKERS: usize = 5;

/// Terminal accounting of an annotation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnnotateSummary {
  /// Rows read from the input dataset.
  pub rows:       usize,
  /// Rows that settled on a taxonomy label or [`Label::Unknown`].
  pub classified: usize,
  /// Rows that settled as [`Label::Error`].
  pub errors:     usize,
}

/// Classifies every row of `input` and writes `output` with a `Category`
/// column appended.
///
/// Fails fast if the input cannot be read or lacks the `Title` or
/// `Abstract` column; per-row classification failures are recorded in the
/// output as `Error` and tallied, never raised.
pub async fn annotate(
  classifier: &Classifier,
  input: &Path,
  output: &Path,
  workers: usize,
) -> Result<AnnotateSummary> {
  let mut reader = csv::Reader::from_path(input)?;
  let headers = reader.headers()?.clone();
  let title_index = column_index(&headers, "Title")?;
  let abstract_index = column_index(&headers, "Abstract")?;
  let records: Vec<StringRecord> = reader.records().collect::<csv::Result<_>>()?;

  info!("Annotating {} rows from {}", records.len(), input.display());

  let budget = Budget::new(workers.max(1));
  let mut tasks = JoinSet::new();
  for (index, record) in records.iter().enumerate() {
    let classifier = classifier.clone();
    let budget = budget.clone();
    let title = record.get(title_index).unwrap_or_default().to_string();
    let abstract_text = record.get(abstract_index).unwrap_or_default().to_string();
    tasks.spawn(async move {
      let _permit = budget.acquire().await;
      (index, classifier.classify(&title, &abstract_text).await)
    });
  }

  let mut labels = vec![Label::Error; records.len()];
  let mut completed = 0usize;
  while let Some(result) = tasks.join_next().await {
    match result {
      Ok((index, label)) => {
        completed += 1;
        debug!("Processed paper {completed}/{} -> {label}", records.len());
        labels[index] = label;
      },
      Err(join_error) => error!("Annotation task panicked: {join_error}"),
    }
  }

  let mut writer = csv::Writer::from_path(output)?;
  let mut out_headers = headers.clone();
  out_headers.push_field("Category");
  writer.write_record(&out_headers)?;
  for (record, label) in records.iter().zip(&labels) {
    let mut row = record.clone();
    row.push_field(label.as_str());
    writer.write_record(&row)?;
  }
  writer.flush()?;

  let errors = labels.iter().filter(|label| **label == Label::Error).count();
  let summary =
    AnnotateSummary { rows: records.len(), classified: records.len() - errors, errors };
  info!(
    "Annotation complete: {} rows, {} classified, {} errors -> {}",
    summary.rows,
    summary.classified,
    summary.errors,
    output.display()
  );
  Ok(summary)
}

/// Position of a named column in the header row.
fn column_index(headers: &StringRecord, name: &str) -> Result<usize> {
  headers
    .iter()
    .position(|header| header == name)
    .ok_or_else(|| HarvesterError::MissingColumn(name.to_string()))
}

#[cfg(test)]
mod tests {
  use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
  };

  use super::*;

  #[tokio::test]
  async fn test_annotate_appends_category_in_order() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
      .and(path("/api/chat"))
      .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "message": { "role": "assistant", "content": "Reinforcement Learning" }
      })))
      .mount(&server)
      .await;

    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("papers.csv");
    let output = dir.path().join("annotated.csv");
    std::fs::write(
      &input,
      "Title,Abstract,Venue\nQ-Learning Redux,We explore value iteration.,NeurIPS\nPolicy \
       Gradients,We differentiate policies.,NeurIPS\n",
    )
    .unwrap();

    let classifier = Classifier::new().with_host(&server.uri());
    let summary = annotate(&classifier, &input, &output, 2).await.unwrap();

    assert_eq!(summary, AnnotateSummary { rows: 2, classified: 2, errors: 0 });

    let content = std::fs::read_to_string(&output).unwrap();
    let lines: Vec<_> = content.lines().collect();
    assert_eq!(lines[0], "Title,Abstract,Venue,Category");
    assert!(lines[1].starts_with("Q-Learning Redux,"));
    assert!(lines[1].ends_with("Reinforcement Learning"));
    assert!(lines[2].starts_with("Policy Gradients,"));
  }

  #[tokio::test]
  async fn test_missing_title_column_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("papers.csv");
    std::fs::write(&input, "Name,Abstract\nx,y\n").unwrap();

    let result =
      annotate(&Classifier::new(), &input, &dir.path().join("out.csv"), 1).await;
    assert!(matches!(result, Err(HarvesterError::MissingColumn(column)) if column == "Title"));
  }

  #[tokio::test]
  async fn test_endpoint_failure_rows_are_marked_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
      .and(path("/api/chat"))
      .respond_with(ResponseTemplate::new(500))
      .mount(&server)
      .await;

    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("papers.csv");
    let output = dir.path().join("annotated.csv");
    std::fs::write(&input, "Title,Abstract\nSome Paper,Some abstract.\n").unwrap();

    let classifier = Classifier::new().with_host(&server.uri());
    let summary = annotate(&classifier, &input, &output, 1).await.unwrap();

    assert_eq!(summary.errors, 1);
    assert!(std::fs::read_to_string(&output).unwrap().contains(",Error"));
  }
}
