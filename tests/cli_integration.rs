//! End-to-end tests for the command-line front end against a mock stats API

use analytics_report::Host;
use serde_json::json;
use std::io::Write;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Test host that captures output to in-memory buffers.
#[derive(Debug, Default)]
struct TestHost {
    output_buf: Vec<u8>,
    error_buf: Vec<u8>,
    exit_code: Option<i32>,
}

impl TestHost {
    fn output_str(&self) -> String {
        String::from_utf8_lossy(&self.output_buf).into_owned()
    }

    fn error_str(&self) -> String {
        String::from_utf8_lossy(&self.error_buf).into_owned()
    }
}

impl Host for TestHost {
    fn output(&mut self) -> impl Write {
        &mut self.output_buf
    }

    fn error(&mut self) -> impl Write {
        &mut self.error_buf
    }

    fn exit(&mut self, code: i32) {
        self.exit_code = Some(code);
    }
}

async fn mount_stats(server: &MockServer) {
    for (dates, visitors) in [("2024-01-08,2024-01-14", 150_u64), ("2024-01-01,2024-01-07", 100)] {
        Mock::given(method("GET"))
            .and(path("/aggregate"))
            .and(query_param("date", dates))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": {"visitors": {"value": visitors}}})))
            .mount(server)
            .await;
    }

    Mock::given(method("GET"))
        .and(path("/breakdown"))
        .and(query_param("property", "event:page"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": [{"page": "/", "visitors": 90}]})))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/breakdown"))
        .and(query_param("property", "visit:source"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": [{"source": "Google", "visitors": 40}]})))
        .mount(server)
        .await;
}

/// A configuration file pointing at the mock server, so the user's own configuration is never read.
fn write_config(dir: &tempfile::TempDir, server: &MockServer) -> String {
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        format!("provider = \"http\"\nsite_id = \"example.com\"\nhttp_base_url = \"{}\"\ntimeout_secs = 5\n", server.uri()),
    )
    .expect("write config");
    path.to_str().expect("utf-8 path").to_string()
}

#[tokio::test]
async fn test_fetch_prints_unified_json() {
    let server = MockServer::start().await;
    mount_stats(&server).await;
    let dir = tempfile::tempdir().expect("temp dir");
    let config = write_config(&dir, &server);

    let mut host = TestHost::default();
    analytics_report::run(
        &mut host,
        ["analytics-report", "fetch", "--config", config.as_str(), "--api-key", "test-key", "--today", "2024-01-10"],
    )
    .await
    .expect("fetch succeeds");

    let report: serde_json::Value = serde_json::from_str(&host.output_str()).expect("json output");
    assert_eq!(
        report,
        json!({
            "visitors_this_week": 150,
            "visitors_last_week": 100,
            "most_visited_pages_this_week": [{"page": "/", "visitors": 90}],
            "most_visited_pages_last_week": [{"page": "/", "visitors": 90}],
            "top_sources_this_week": [{"source": "Google", "visitors": 40}],
            "top_sources_last_week": [{"source": "Google", "visitors": 40}]
        })
    );
    assert_eq!(host.exit_code, None);
}

#[tokio::test]
async fn test_fetch_concurrent_console_output() {
    let server = MockServer::start().await;
    mount_stats(&server).await;
    let dir = tempfile::tempdir().expect("temp dir");
    let config = write_config(&dir, &server);

    let mut host = TestHost::default();
    analytics_report::run(
        &mut host,
        [
            "analytics-report",
            "fetch",
            "--config",
            config.as_str(),
            "--api-key",
            "test-key",
            "--today",
            "2024-01-10",
            "--concurrent",
            "--format",
            "console",
            "--color",
            "never",
        ],
    )
    .await
    .expect("fetch succeeds");

    let output = host.output_str();
    assert!(output.contains("this week : 150"));
    assert!(output.contains("change    : +50.0%"));
    assert!(output.contains("Google : 40"));
}

#[tokio::test]
async fn test_fetch_writes_report_file() {
    let server = MockServer::start().await;
    mount_stats(&server).await;
    let dir = tempfile::tempdir().expect("temp dir");
    let config = write_config(&dir, &server);
    let report_path = dir.path().join("report.json");

    let mut host = TestHost::default();
    analytics_report::run(
        &mut host,
        [
            "analytics-report",
            "fetch",
            "--config",
            config.as_str(),
            "--api-key",
            "test-key",
            "--today",
            "2024-01-10",
            "--output",
            report_path.to_str().expect("utf-8 path"),
        ],
    )
    .await
    .expect("fetch succeeds");

    assert!(host.output_buf.is_empty());
    let report: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&report_path).expect("report file")).expect("json");
    assert_eq!(report["visitors_this_week"], 150);
}

#[tokio::test]
async fn test_upstream_failure_reports_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Invalid API key"))
        .mount(&server)
        .await;
    let dir = tempfile::tempdir().expect("temp dir");
    let config = write_config(&dir, &server);

    let mut host = TestHost::default();
    let result = analytics_report::run(
        &mut host,
        ["analytics-report", "fetch", "--config", config.as_str(), "--api-key", "wrong-key", "--today", "2024-01-10"],
    )
    .await;

    assert!(result.is_err());
    assert_eq!(host.exit_code, Some(1));
    assert!(host.output_buf.is_empty());

    let stderr = host.error_str();
    assert!(stderr.starts_with("analytics unavailable:"), "unexpected stderr: {stderr}");
    assert!(stderr.contains("status 401"));
    assert!(stderr.contains("Invalid API key"));
}

#[tokio::test]
async fn test_init_then_fetch_with_generated_config() {
    let server = MockServer::start().await;
    mount_stats(&server).await;
    let dir = tempfile::tempdir().expect("temp dir");
    let config_path = dir.path().join("generated.toml");
    let config = config_path.to_str().expect("utf-8 path");

    let mut host = TestHost::default();
    analytics_report::run(&mut host, ["analytics-report", "init", config])
        .await
        .expect("init succeeds");
    assert!(host.output_str().contains("Generated default configuration file"));

    let mut host = TestHost::default();
    analytics_report::run(
        &mut host,
        [
            "analytics-report",
            "fetch",
            "--config",
            config,
            "--site-id",
            "example.com",
            "--base-url",
            server.uri().as_str(),
            "--api-key",
            "test-key",
            "--today",
            "2024-01-10",
        ],
    )
    .await
    .expect("fetch succeeds");

    let report: serde_json::Value = serde_json::from_str(&host.output_str()).expect("json output");
    assert_eq!(report["visitors_last_week"], 100);
}
