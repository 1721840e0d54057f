use assert_cmd::Command;
use predicates::prelude::*;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use tempfile::tempdir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[allow(deprecated)]
fn codemap(workdir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("codemap").expect("binary");
    cmd.current_dir(workdir)
        .env_remove("OPENAI_API_KEY")
        .env_remove("OPENAI_BASE_URL")
        .env_remove("CODEMAP_MODEL")
        .env_remove("CODEMAP_BATCH_SIZE")
        .env_remove("CODEMAP_TIMEOUT_SECS");
    cmd
}

fn stdout_json(output: &std::process::Output) -> Value {
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("valid json")
}

fn setup_project() -> tempfile::TempDir {
    let temp = tempdir().unwrap();
    let root = temp.path();
    fs::create_dir_all(root.join("src")).unwrap();
    fs::create_dir_all(root.join("node_modules/react")).unwrap();
    fs::write(
        root.join("src/app.js"),
        "import { add } from './math';\n\nconsole.log(add(1, 2));\n",
    )
    .unwrap();
    fs::write(
        root.join("src/math.js"),
        "export function add(a, b) {\n  return a + b;\n}\n",
    )
    .unwrap();
    fs::write(root.join("node_modules/react/index.js"), "module.exports = {};\n").unwrap();
    temp
}

#[test]
fn parse_prints_project_files() {
    let temp = setup_project();
    let output = codemap(temp.path())
        .args(["parse", ".", "--quiet"])
        .output()
        .unwrap();
    let body = stdout_json(&output);

    let names: Vec<&str> = body["files"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["filename"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["src/app.js", "src/math.js"]);
    assert_eq!(body["summary"]["totalFiles"], 2);
    assert_eq!(body["files"][0]["language"], "JavaScript");
}

#[test]
fn chunk_respects_size_flags() {
    let temp = setup_project();
    let output = codemap(temp.path())
        .args(["chunk", ".", "--chunk-size", "20", "--chunk-overlap", "5", "--quiet"])
        .output()
        .unwrap();
    let body = stdout_json(&output);

    let chunks = body["chunks"].as_array().unwrap();
    assert!(chunks.len() > 2);
    assert_eq!(body["stats"]["totalChunks"], chunks.len());
    for chunk in chunks {
        assert!(chunk["content"].as_str().unwrap().chars().count() <= 20);
    }
}

#[test]
fn chunk_writes_output_file() {
    let temp = setup_project();
    let out = temp.path().join("chunks.json");
    codemap(temp.path())
        .args(["chunk", ".", "--quiet", "--output"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let body: Value = serde_json::from_str(&fs::read_to_string(out).unwrap()).unwrap();
    assert!(body["stats"]["totalChunks"].as_u64().unwrap() >= 2);
}

#[test]
fn invalid_chunk_config_is_rejected() {
    let temp = setup_project();
    codemap(temp.path())
        .args(["chunk", ".", "--chunk-size", "10", "--chunk-overlap", "10"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("chunk_overlap"));
}

#[test]
fn config_file_is_applied() {
    let temp = setup_project();
    let config = temp.path().join("codemap.toml");
    fs::write(&config, "[analysis.chunker]\nchunk_size = 0\n").unwrap();

    codemap(temp.path())
        .args(["chunk", ".", "--config"])
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("chunk_size must be > 0"));
}

#[test]
fn analyze_without_api_key_fails() {
    let temp = setup_project();
    codemap(temp.path())
        .args(["analyze", ".", "--quiet"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("OPENAI_API_KEY"));
}

#[tokio::test(flavor = "multi_thread")]
async fn analyze_payload_against_mock_service() {
    let server = MockServer::start().await;
    let reply = json!({
        "fileDescription": "Prints a sum",
        "mainPurpose": "Entry point",
        "dependencies": { "imports": [], "referencedFiles": ["./b.bin"], "externalDependencies": [] },
        "keyFunctionality": ["log"],
        "technicalDetails": { "language": "JavaScript", "framework": null, "type": "script" }
    });
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "role": "assistant", "content": reply.to_string() } }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let temp = tempdir().unwrap();
    let payload = temp.path().join("payload.json");
    fs::write(
        &payload,
        json!({
            "files": [
                { "id": "1", "filename": "a.js", "language": "JavaScript", "text": "console.log(1 + 2);\n", "success": true },
                { "id": "2", "filename": "b.bin", "language": "Unknown", "text": "", "success": false,
                  "error": "Binary file format not supported" }
            ]
        })
        .to_string(),
    )
    .unwrap();

    let base_url = format!("{}/v1", server.uri());
    let workdir = temp.path().to_path_buf();
    let output = tokio::task::spawn_blocking(move || {
        codemap(&workdir)
            .env("OPENAI_API_KEY", "sk-test")
            .args(["analyze", "--quiet", "--relationships", "--base-url", base_url.as_str(), "--payload"])
            .arg(&payload)
            .output()
            .unwrap()
    })
    .await
    .unwrap();
    let body = stdout_json(&output);

    assert_eq!(
        body["summary"],
        json!({ "totalFiles": 2, "analyzedFiles": 1, "skippedFiles": 1 })
    );
    assert_eq!(body["files"]["a.js"]["mainPurpose"], "Entry point");
    assert_eq!(body["skippedFiles"]["b.bin"]["reason"], "parsing_failed");
    assert_eq!(
        body["relationships"],
        json!([{ "sourceFile": "a.js", "targetFile": "b.bin", "type": "references" }])
    );
    assert_eq!(body["dependencyTree"]["children"][0]["children"][0]["name"], "b.bin");
}
