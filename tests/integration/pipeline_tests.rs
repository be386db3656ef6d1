//! Integration tests for source runs
//!
//! These tests serve listing pages from a wiremock server and check the
//! records, the CSV export and the DOCX package a run produces.

use folio_harvest::config::{parse_config, Config};
use folio_harvest::output::read_records;
use folio_harvest::pipeline::{run_all, run_source, RunStatus};
use folio_harvest::{HarvestError, NO_URL};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TWO_CARDS: &str = r#"<html><body>
<div class="card"><h2>Alpha</h2><a href="/a">read</a></div>
<div class="card"><h2>Beta</h2><a href="https://t.org/b">read</a></div>
</body></html>"#;

/// Builds a one-source static config pointed at the mock server
fn create_test_config(entry_url: &str, extra: &str, output_dir: &Path) -> Config {
    let toml = format!(
        r#"
[fetcher]
user-agent = "FolioHarvestTest/1.0"
request-timeout-secs = 5

[[source]]
name = "test"
title = "Test Source"
entry-url = "{}"
{}

[source.selectors]
container = ".card"
title = "h2"
link = "a"
"#,
        entry_url, extra
    );

    let mut config = parse_config(&toml).expect("test config should be valid");
    config.output.directory = output_dir.display().to_string();
    config
}

async fn serve(server: &MockServer, route: &str, status: u16, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(status)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

fn read_part(docx: &Path, name: &str) -> String {
    let file = File::open(docx).expect("report should exist");
    let mut archive = zip::ZipArchive::new(file).expect("report should be a zip archive");
    let mut content = String::new();
    archive
        .by_name(name)
        .expect("part should exist")
        .read_to_string(&mut content)
        .expect("part should be UTF-8");
    content
}

#[tokio::test]
async fn test_two_card_listing_end_to_end() {
    let server = MockServer::start().await;
    serve(&server, "/list", 200, TWO_CARDS).await;

    let out = TempDir::new().unwrap();
    let mut config = create_test_config(&format!("{}/list", server.uri()), "", out.path());
    config.sources[0].selectors.link_base = Some("https://t.org/list".to_string());

    let outcome = run_source(&config, "hash", "test").await.unwrap();

    assert_eq!(outcome.status, RunStatus::Complete);
    assert_eq!(outcome.pages, 1);
    assert_eq!(outcome.config_hash, "hash");
    let pairs: Vec<(&str, &str)> = outcome
        .records
        .iter()
        .map(|r| (r.title.as_str(), r.url.as_str()))
        .collect();
    assert_eq!(
        pairs,
        vec![("Alpha", "https://t.org/a"), ("Beta", "https://t.org/b")]
    );

    // CSV
    assert_eq!(outcome.tabular_path, out.path().join("test.csv"));
    let rows = read_records(&outcome.tabular_path).unwrap();
    assert_eq!(rows, outcome.records);
    let csv = std::fs::read_to_string(&outcome.tabular_path).unwrap();
    assert!(csv.starts_with("source,title,url\n"));

    // DOCX
    assert_eq!(outcome.report_path, out.path().join("Test Source.docx"));
    let document = read_part(&outcome.report_path, "word/document.xml");
    let rels = read_part(&outcome.report_path, "word/_rels/document.xml.rels");

    assert_eq!(document.matches("<w:hyperlink ").count(), 2);
    assert_eq!(document.matches("<w:p>").count(), 5);
    assert!(document.contains("Test Source"));

    let positions: Vec<usize> = ["Alpha", "https://t.org/a", "Beta", "https://t.org/b"]
        .iter()
        .map(|needle| document.find(needle).expect("text should be in document"))
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]));

    assert!(rels.contains(r#"Target="https://t.org/a" TargetMode="External""#));
    assert!(rels.contains(r#"Target="https://t.org/b" TargetMode="External""#));
}

#[tokio::test]
async fn test_relative_link_resolves_against_entry_url() {
    let server = MockServer::start().await;
    serve(
        &server,
        "/research",
        200,
        r#"<div class="card"><h2>Five</h2><a href="/item/5">x</a></div>"#,
    )
    .await;

    let out = TempDir::new().unwrap();
    let config = create_test_config(&format!("{}/research", server.uri()), "", out.path());

    let outcome = run_source(&config, "hash", "test").await.unwrap();

    assert_eq!(outcome.records.len(), 1);
    assert_eq!(outcome.records[0].url, format!("{}/item/5", server.uri()));
}

#[tokio::test]
async fn test_user_agent_is_sent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/list"))
        .and(header("user-agent", "FolioHarvestTest/1.0"))
        .respond_with(ResponseTemplate::new(200).set_body_string(TWO_CARDS))
        .expect(1)
        .mount(&server)
        .await;

    let out = TempDir::new().unwrap();
    let config = create_test_config(&format!("{}/list", server.uri()), "", out.path());

    let outcome = run_source(&config, "hash", "test").await.unwrap();
    assert_eq!(outcome.records.len(), 2);
}

#[tokio::test]
async fn test_server_error_fails_without_artifacts() {
    let server = MockServer::start().await;
    serve(&server, "/list", 500, "boom").await;

    let out = TempDir::new().unwrap();
    let config = create_test_config(&format!("{}/list", server.uri()), "", out.path());

    let err = run_source(&config, "hash", "test").await.unwrap_err();

    match err {
        HarvestError::FetchFailed { url, reason } => {
            assert!(url.ends_with("/list"));
            assert!(reason.contains("500"));
        }
        other => panic!("expected FetchFailed, got {:?}", other),
    }
    assert!(!out.path().join("test.csv").exists());
    assert!(!out.path().join("Test Source.docx").exists());
}

#[tokio::test]
async fn test_failed_rerun_removes_previous_artifacts() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/list"))
        .respond_with(ResponseTemplate::new(200).set_body_string(TWO_CARDS))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    serve(&server, "/list", 500, "boom").await;

    let out = TempDir::new().unwrap();
    let config = create_test_config(&format!("{}/list", server.uri()), "", out.path());

    let first = run_source(&config, "hash", "test").await.unwrap();
    assert!(first.tabular_path.exists());
    assert!(first.report_path.exists());

    let err = run_source(&config, "hash", "test").await.unwrap_err();
    assert!(matches!(err, HarvestError::FetchFailed { .. }));

    assert!(!first.tabular_path.exists());
    assert!(!first.report_path.exists());
    let leftovers: Vec<_> = std::fs::read_dir(out.path()).unwrap().collect();
    assert!(leftovers.is_empty());
}

#[tokio::test]
async fn test_empty_listing_writes_empty_artifacts() {
    let server = MockServer::start().await;
    serve(&server, "/list", 200, "<html><body><p>Nothing yet</p></body></html>").await;

    let out = TempDir::new().unwrap();
    let config = create_test_config(&format!("{}/list", server.uri()), "", out.path());

    let outcome = run_source(&config, "hash", "test").await.unwrap();

    assert_eq!(outcome.status, RunStatus::Empty);
    assert!(outcome.records.is_empty());
    assert_eq!(std::fs::metadata(&outcome.tabular_path).unwrap().len(), 0);

    let document = read_part(&outcome.report_path, "word/document.xml");
    assert!(document.contains("Test Source"));
    assert_eq!(document.matches("<w:hyperlink ").count(), 0);
}

#[tokio::test]
async fn test_missing_link_uses_placeholder() {
    let server = MockServer::start().await;
    serve(
        &server,
        "/list",
        200,
        r#"<div class="card"><h2>No Link</h2></div><div class="card"><h2>   </h2><a href="/x">x</a></div>"#,
    )
    .await;

    let out = TempDir::new().unwrap();
    let config = create_test_config(&format!("{}/list", server.uri()), "", out.path());

    let outcome = run_source(&config, "hash", "test").await.unwrap();

    assert_eq!(outcome.records.len(), 1);
    assert_eq!(outcome.records[0].title, "No Link");
    assert_eq!(outcome.records[0].url, NO_URL);
}

#[tokio::test]
async fn test_limit_truncates_records() {
    let server = MockServer::start().await;
    serve(&server, "/list", 200, TWO_CARDS).await;

    let out = TempDir::new().unwrap();
    let config = create_test_config(&format!("{}/list", server.uri()), "limit = 1", out.path());

    let outcome = run_source(&config, "hash", "test").await.unwrap();

    assert_eq!(outcome.records.len(), 1);
    assert_eq!(outcome.records[0].title, "Alpha");
    assert_eq!(read_records(&outcome.tabular_path).unwrap().len(), 1);
}

#[tokio::test]
async fn test_run_all_continues_past_failure() {
    let server = MockServer::start().await;
    serve(&server, "/good", 200, TWO_CARDS).await;
    serve(&server, "/gone", 404, "").await;

    let toml = format!(
        r#"
[[source]]
name = "gone"
title = "Gone"
entry-url = "{uri}/gone"

[source.selectors]
container = ".card"
title = "h2"
link = "a"

[[source]]
name = "good"
title = "Good"
entry-url = "{uri}/good"

[source.selectors]
container = ".card"
title = "h2"
link = "a"
"#,
        uri = server.uri()
    );

    let out = TempDir::new().unwrap();
    let mut config = parse_config(&toml).unwrap();
    config.output.directory = out.path().display().to_string();

    let results = run_all(&config, "hash").await;

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].0, "gone");
    assert!(matches!(
        results[0].1,
        Err(HarvestError::FetchFailed { .. })
    ));
    assert_eq!(results[1].0, "good");
    let good = results[1].1.as_ref().unwrap();
    assert_eq!(good.records.len(), 2);
    assert!(good.report_path.exists());
}

#[tokio::test]
async fn test_rerun_overwrites_artifacts() {
    let server = MockServer::start().await;
    serve(&server, "/list", 200, TWO_CARDS).await;

    let out = TempDir::new().unwrap();
    let config = create_test_config(&format!("{}/list", server.uri()), "", out.path());

    let first = run_source(&config, "hash", "test").await.unwrap();
    let second = run_source(&config, "hash", "test").await.unwrap();

    assert_eq!(first.records, second.records);
    assert_eq!(read_records(&second.tabular_path).unwrap().len(), 2);
}
