//! Integration tests for the harvester CLI commands.
//!
//! Network-facing tests run against a wiremock stub archive and point every
//! path flag into a scratch directory, so they touch neither the real host
//! nor the working tree.

use assert_cmd::Command;
use predicates::prelude::*;
use serial_test::serial;
use tempfile::tempdir;
use wiremock::{
  matchers::{method, path},
  Mock, MockServer, ResponseTemplate,
};

/// Helper function to create a clean command instance
fn harvester() -> Command { Command::cargo_bin("harvester").unwrap() }

#[test]
#[serial]
fn test_help_lists_commands() {
  harvester()
    .arg("--help")
    .assert()
    .success()
    .stdout(predicate::str::contains("range"))
    .stdout(predicate::str::contains("bibtex"))
    .stdout(predicate::str::contains("annotate"));
}

#[test]
#[serial]
fn test_invalid_year_range_rejected_before_any_download() {
  let dir = tempdir().unwrap();

  // The base URL points at a closed local port; validation must reject the
  // range before anything tries to connect.
  harvester()
    .args(["range", "2021", "2019"])
    .args(["--base-url", "http://127.0.0.1:9"])
    .arg("--log-path")
    .arg(dir.path().join("log.csv"))
    .assert()
    .failure()
    .stderr(predicate::str::contains("Invalid year range"));
}

#[test]
#[serial]
fn test_out_of_corpus_year_rejected() {
  harvester()
    .args(["range", "1980", "1990"])
    .args(["--base-url", "http://127.0.0.1:9"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("Invalid year range"));
}

#[tokio::test]
#[serial]
async fn test_paper_download_end_to_end() {
  let server = MockServer::start().await;
  Mock::given(method("GET"))
    .and(path("/paper/2020/solo.html"))
    .respond_with(ResponseTemplate::new(200).set_body_string(
      r#"<html><body><a href="/pdf/solo.pdf">Paper</a></body></html>"#,
    ))
    .mount(&server)
    .await;
  Mock::given(method("GET"))
    .and(path("/pdf/solo.pdf"))
    .respond_with(ResponseTemplate::new(200).set_body_bytes(b"pdf bytes".to_vec()))
    .mount(&server)
    .await;

  let dir = tempdir().unwrap();
  let downloads_dir = dir.path().join("downloads");
  let log_path = dir.path().join("log.csv");
  let base_url = server.uri();
  let page_url = format!("{base_url}/paper/2020/solo.html");

  let downloads = downloads_dir.clone();
  let log = log_path.clone();
  let assert = tokio::task::spawn_blocking(move || {
    harvester()
      .args(["paper", page_url.as_str()])
      .args(["--base-url", base_url.as_str()])
      .arg("--downloads-dir")
      .arg(&downloads)
      .arg("--log-path")
      .arg(&log)
      .assert()
  })
  .await
  .unwrap();

  assert
    .success()
    .stdout(predicate::str::contains("Download complete"))
    .stdout(predicate::str::contains("solo.pdf"));

  assert_eq!(std::fs::read(downloads_dir.join("solo.pdf")).unwrap(), b"pdf bytes");
  let log_content = std::fs::read_to_string(&log_path).unwrap();
  assert!(log_content.lines().any(|line| line.starts_with("N/A,solo.pdf,")));
}

#[tokio::test]
#[serial]
async fn test_bibtex_display_end_to_end() {
  let server = MockServer::start().await;
  Mock::given(method("GET"))
    .and(path("/paper/2020/solo.html"))
    .respond_with(ResponseTemplate::new(200).set_body_string(
      r#"<html><body><a href="/bib/solo.bib">Bibtex</a></body></html>"#,
    ))
    .mount(&server)
    .await;
  Mock::given(method("GET"))
    .and(path("/bib/solo.bib"))
    .respond_with(ResponseTemplate::new(200).set_body_string("@inproceedings{solo2020}"))
    .mount(&server)
    .await;

  let dir = tempdir().unwrap();
  let base_url = server.uri();
  let page_url = format!("{base_url}/paper/2020/solo.html");
  let info_dir = dir.path().join("info");
  let log_path = dir.path().join("log.csv");

  let info = info_dir.clone();
  let log = log_path.clone();
  let assert = tokio::task::spawn_blocking(move || {
    harvester()
      .args(["bibtex", page_url.as_str()])
      .args(["--base-url", base_url.as_str()])
      .arg("--info-dir")
      .arg(&info)
      .arg("--log-path")
      .arg(&log)
      .assert()
  })
  .await
  .unwrap();

  assert.success().stdout(predicate::str::contains("@inproceedings{solo2020}"));
  assert!(info_dir.join("solo.bib").exists());
}

#[tokio::test]
#[serial]
async fn test_bibtex_missing_anchor_warns_and_writes_nothing() {
  let server = MockServer::start().await;
  Mock::given(method("GET"))
    .and(path("/paper/2020/solo.html"))
    .respond_with(ResponseTemplate::new(200).set_body_string(
      r#"<html><body><a href="/pdf/solo.pdf">Paper</a></body></html>"#,
    ))
    .mount(&server)
    .await;

  let dir = tempdir().unwrap();
  let base_url = server.uri();
  let page_url = format!("{base_url}/paper/2020/solo.html");
  let info_dir = dir.path().join("info");
  let log_path = dir.path().join("log.csv");

  let info = info_dir.clone();
  let log = log_path.clone();
  let assert = tokio::task::spawn_blocking(move || {
    harvester()
      .args(["bibtex", page_url.as_str()])
      .args(["--base-url", base_url.as_str()])
      .arg("--info-dir")
      .arg(&info)
      .arg("--log-path")
      .arg(&log)
      .assert()
  })
  .await
  .unwrap();

  assert.success().stdout(predicate::str::contains("No 'Bibtex' link found"));
  assert!(!info_dir.exists());
  assert!(!log_path.exists());
}

#[test]
#[serial]
fn test_unreadable_config_file_fails() {
  harvester()
    .args(["--config", "definitely/not/a/real/config.toml", "all"])
    .assert()
    .failure();
}
