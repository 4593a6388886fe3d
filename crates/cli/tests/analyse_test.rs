//! # CLI Analyse Command Tests
//!
//! Runs the `hatewatch analyse` binary against `wiremock` model and moderation endpoints.

use assert_cmd::prelude::*;
use predicates::prelude::*;
use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::tempdir;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn chat_response(content: &str) -> Value {
    json!({"choices": [{"index": 0, "message": {"role": "assistant", "content": content}}]})
}

/// Mounts one chat answer per stage, routed by text unique to each stage prompt.
async fn mount_model(server: &MockServer) {
    let answers = [
        (
            "You are a hate speech expert",
            r#"{"explanation": "Insults the reader.", "classification": "Direct hate speech"}"#,
        ),
        (
            "re-evaluating the classification",
            r#"{"classification": "Direct hate speech", "explanation": "Agreed."}"#,
        ),
        (
            "categorize its content based on the listed categories",
            r#"{"classification": "Offensive insult", "racism": false, "antisemitism": false,
                "homophobia": false, "ableism": false, "violence": false, "sexism": false,
                "other_hate_speech": true, "explanation": "Generic insult."}"#,
        ),
        (
            "broad spectrum of political ideologies",
            r#"{"right_wing_indicator": false, "rating": "0", "explanation": "Not political."}"#,
        ),
    ];
    for (needle, answer) in answers {
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(body_string_contains(needle))
            .respond_with(ResponseTemplate::new(200).set_body_json(chat_response(answer)))
            .mount(server)
            .await;
    }

    Mock::given(method("POST"))
        .and(path("/v1/moderations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{
                "flagged": false,
                "categories": {"harassment": true, "hate": false},
                "category_scores": {"harassment": 0.5, "hate": 0.25}
            }]
        })))
        .mount(server)
        .await;
}

fn write_config(dir: &Path, server: &MockServer) -> String {
    let config = format!(
        r#"
model:
  provider: openai
  api_url: {uri}/v1/chat/completions
  api_key: test-key
  model_name: gpt-test
moderation:
  api_url: {uri}/v1/moderations
  api_key: test-key
request_timeout_secs: 5
concurrency: 2
"#,
        uri = server.uri()
    );
    let path = dir.join("hatewatch.yml");
    fs::write(&path, config).unwrap();
    path.to_str().unwrap().to_string()
}

fn hatewatch(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("hatewatch").unwrap();
    cmd.current_dir(dir)
        .env_remove("OPENAI_API_KEY")
        .env_remove("GEMINI_API_KEY")
        .env_remove("RUST_LOG");
    cmd
}

#[tokio::test(flavor = "multi_thread")]
async fn test_analyse_prints_one_json_report_per_message() {
    let server = MockServer::start().await;
    mount_model(&server).await;
    let dir = tempdir().unwrap();
    let config_path = write_config(dir.path(), &server);

    let output = hatewatch(dir.path())
        .args(["analyse", "--config", &config_path])
        .args(["--message", "You suck!", "--message", "Second message"])
        .output()
        .unwrap();
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 2);

    let first: Value = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(first["message"], "You suck!");
    assert_eq!(first["cancelled"], false);
    assert_eq!(first["detection"]["validator"]["classification"], "Direct hate speech");
    assert_eq!(first["moderator"]["categories"]["harassment"], true);
    assert_eq!(first["classifier"]["other_hate_speech"], true);
    assert_eq!(first["right_wing_rater"]["rating"], "0");

    let second: Value = serde_json::from_str(lines[1]).unwrap();
    assert_eq!(second["message"], "Second message");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_analyse_table_output() {
    let server = MockServer::start().await;
    mount_model(&server).await;
    let dir = tempdir().unwrap();
    let config_path = write_config(dir.path(), &server);

    hatewatch(dir.path())
        .args(["analyse", "--config", &config_path, "--format", "table"])
        .args(["--message", "You suck!"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Message: You suck!"))
        .stdout(predicate::str::contains("Hate Speech Classifier"))
        .stdout(predicate::str::contains("Moderator Results"))
        .stdout(predicate::str::contains("●"))
        .stdout(predicate::str::contains("Direct hate speech"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_analyse_reads_input_file() {
    let server = MockServer::start().await;
    mount_model(&server).await;
    let dir = tempdir().unwrap();
    let config_path = write_config(dir.path(), &server);
    let input = dir.path().join("messages.txt");
    fs::write(&input, "first message\n\n   \nsecond message\nthird message\n").unwrap();

    let output = hatewatch(dir.path())
        .args(["analyse", "--config", &config_path, "--input-file"])
        .arg(&input)
        .output()
        .unwrap();
    assert!(output.status.success());

    let messages: Vec<String> = String::from_utf8(output.stdout)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str::<Value>(line).unwrap()["message"].to_string())
        .collect();
    assert_eq!(
        messages,
        vec!["\"first message\"", "\"second message\"", "\"third message\""]
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_failing_provider_is_reported_in_the_report() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Incorrect API key"))
        .mount(&server)
        .await;
    let dir = tempdir().unwrap();
    let config_path = write_config(dir.path(), &server);

    let output = hatewatch(dir.path())
        .args(["analyse", "--config", &config_path, "--message", "hi"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["detection"]["detector"]["status"], "failed");
    assert_eq!(report["detection"]["validator"]["error"], "upstream detector failed");
    assert_eq!(report["moderator"]["status"], "failed");
}

#[test]
fn test_analyse_without_messages_fails() {
    let dir = tempdir().unwrap();
    hatewatch(dir.path())
        .arg("analyse")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No messages to analyse"));
}

#[test]
fn test_gemini_without_key_fails() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("gemini.yml");
    fs::write(&path, "model:\n  provider: gemini\n  model_name: gemini-1.5-flash\n").unwrap();

    hatewatch(dir.path())
        .args(["analyse", "--message", "hi", "--config"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("API key is missing"));
}

#[test]
fn test_missing_config_file_fails() {
    let dir = tempdir().unwrap();
    hatewatch(dir.path())
        .args(["analyse", "--message", "hi", "--config", "nope.yml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Config file not found"));
}
