//! Run the `cloudpeek` binary against the in-process fake backend.

use std::io::Write;
use std::process::{Command, Output};

use gcp_client::testing::{Endpoint, FakeBackend};
use serde_json::{Value, json};

const METRIC: &str = "custom.googleapis.com/login_latency";

fn config_file(backend: &FakeBackend) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    write!(
        file,
        r#"
[project]
id = "demo"
access_token = "static-token"

[http]
timeout = "5s"
monitoring_endpoint = "{base}"
logging_endpoint = "{base}"
trace_endpoint = "{base}"

[metrics]
types = ["{METRIC}"]

[logs]
name = "app"
limit = 2
"#,
        base = backend.base_url()
    )
    .unwrap();
    file
}

fn seed(backend: &FakeBackend) {
    // Newest point first, as Cloud Monitoring returns them
    backend.set_pages(
        Endpoint::TimeSeries,
        vec![vec![json!({
            "metric": {
                "type": METRIC,
                "labels": { "subject_id": "user-1", "subject_type": "user" }
            },
            "metricKind": "CUMULATIVE",
            "valueType": "DISTRIBUTION",
            "points": [
                {
                    "interval": { "startTime": "2024-05-01T10:00:00Z", "endTime": "2024-05-01T10:15:00Z" },
                    "value": { "distributionValue": { "count": "50" } }
                },
                {
                    "interval": { "startTime": "2024-05-01T10:00:00Z", "endTime": "2024-05-01T10:10:00Z" },
                    "value": { "distributionValue": { "count": "50" } }
                },
                {
                    "interval": { "startTime": "2024-05-01T10:00:00Z", "endTime": "2024-05-01T10:05:00Z" },
                    "value": { "distributionValue": { "count": "20" } }
                }
            ]
        })]],
    );
    backend.set_pages(
        Endpoint::LogEntries,
        vec![vec![json!({
            "logName": "projects/demo/logs/app",
            "timestamp": "2024-05-01T10:20:00Z",
            "severity": "ERROR",
            "textPayload": "login failed"
        })]],
    );
    backend.set_pages(
        Endpoint::Traces,
        vec![vec![json!({
            "projectId": "demo",
            "traceId": "abc123",
            "spans": [{
                "spanId": "1",
                "kind": "RPC_SERVER",
                "name": "/login",
                "startTime": "2024-05-01T10:00:00Z",
                "endTime": "2024-05-01T10:00:00.120Z"
            }]
        })]],
    );
}

async fn cloudpeek(args: Vec<String>) -> Output {
    tokio::task::spawn_blocking(move || {
        Command::new(env!("CARGO_BIN_EXE_cloudpeek"))
            .args(&args)
            .env_remove("RUST_LOG")
            .env_remove("PROJECT_ID")
            .env_remove("PROJECT_CREDENTIALS")
            .output()
            .unwrap()
    })
    .await
    .unwrap()
}

fn args(config: &tempfile::NamedTempFile, rest: &[&str]) -> Vec<String> {
    let mut args = vec![
        "--config".to_string(),
        config.path().display().to_string(),
    ];
    args.extend(rest.iter().map(|s| s.to_string()));
    args
}

#[tokio::test]
async fn test_all_signals_in_text() {
    let backend = FakeBackend::start().await.unwrap();
    seed(&backend);
    let config = config_file(&backend);

    let output = cloudpeek(args(&config, &[])).await;
    let stdout = String::from_utf8(output.stdout).unwrap();

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(
        stdout,
        "2024-05-01T10:20:00Z ERROR projects/demo/logs/app: login failed\n\
         -------------------\n\
         Metric Type: custom.googleapis.com/login_latency\n\
         Subject ID: user-1, Subject Type: user\n\
         Start Time: 2024-05-01T10:00:00Z, End Time: 2024-05-01T10:05:00Z, Count: 20\n\
         Start Time: 2024-05-01T10:05:00Z, End Time: 2024-05-01T10:10:00Z, Count: 30\n\
         -------------------\n\
         trace abc123 (1 spans) root=/login duration=120ms\n"
    );
}

#[tokio::test]
async fn test_show_empty_prints_zero_intervals() {
    let backend = FakeBackend::start().await.unwrap();
    seed(&backend);
    let config = config_file(&backend);

    let output = cloudpeek(args(&config, &["metrics", "--show-empty"])).await;
    let stdout = String::from_utf8(output.stdout).unwrap();

    assert!(output.status.success());
    assert!(stdout.contains(
        "Start Time: 2024-05-01T10:10:00Z, End Time: 2024-05-01T10:15:00Z, Count: 0"
    ));
    assert!(!stdout.contains("login failed"));
}

#[tokio::test]
async fn test_metrics_as_json() {
    let backend = FakeBackend::start().await.unwrap();
    seed(&backend);
    let config = config_file(&backend);

    let output = cloudpeek(args(&config, &["--format", "json", "metrics"])).await;
    let stdout = String::from_utf8(output.stdout).unwrap();

    assert!(output.status.success());
    let lines: Vec<Value> = stdout
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["subject_id"], "user-1");
    let counts: Vec<i64> = lines[0]["intervals"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["count"].as_i64().unwrap())
        .collect();
    assert_eq!(counts, vec![20, 30]);
}

#[tokio::test]
async fn test_failed_signal_exits_non_zero_after_the_rest() {
    let backend = FakeBackend::start().await.unwrap();
    seed(&backend);
    backend.fail(Endpoint::LogEntries, 503, "logging unavailable");
    let config = config_file(&backend);

    let output = cloudpeek(args(&config, &[])).await;
    let stdout = String::from_utf8(output.stdout).unwrap();
    let stderr = String::from_utf8(output.stderr).unwrap();

    assert!(!output.status.success());
    assert!(stdout.contains("Metric Type: custom.googleapis.com/login_latency"));
    assert!(stdout.contains("trace abc123"));
    assert!(stderr.contains("logging unavailable"));
    assert!(stderr.contains("log app"));
}

#[tokio::test]
async fn test_validate_does_not_contact_backend() {
    let backend = FakeBackend::start().await.unwrap();
    let config = config_file(&backend);

    let output = cloudpeek(args(&config, &["validate"])).await;

    assert!(output.status.success());
    assert!(backend.requests().is_empty());
}
