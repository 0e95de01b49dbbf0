//! End-to-end tests for the declgen binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;

fn write_model(dir: &std::path::Path, contents: &serde_json::Value) -> std::path::PathBuf {
    let path = dir.join("model.json");
    fs::write(&path, serde_json::to_string_pretty(contents).unwrap()).unwrap();
    path
}

fn sample_model() -> serde_json::Value {
    serde_json::json!({
        "id": "sample",
        "declgen": "1.0",
        "sources": [{
            "name": "sample",
            "module": "Sample",
            "types": [{
                "kind": "record",
                "name": "IFoo",
                "fields": [
                    {"name": "bool", "type": {"kind": "primitive", "name": "boolean"}},
                    {"name": "num", "optional": true,
                     "type": {"kind": "primitive", "name": "number"}}
                ]
            }]
        }]
    })
}

#[test]
fn test_generate_writes_unit_files() {
    let dir = tempfile::tempdir().unwrap();
    let model = write_model(dir.path(), &sample_model());
    let out = dir.path().join("out");

    Command::cargo_bin("declgen")
        .unwrap()
        .arg("generate")
        .arg(&model)
        .arg("--out")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("wrote "));

    let text = fs::read_to_string(out.join("sample.ts")).unwrap();
    assert!(text.starts_with("module Sample {"));
    assert!(text.contains("num?: number;"));
}

#[test]
fn test_generate_json_output_reports_written() {
    let dir = tempfile::tempdir().unwrap();
    let model = write_model(dir.path(), &sample_model());
    let out = dir.path().join("out");

    Command::cargo_bin("declgen")
        .unwrap()
        .args(["--output", "json", "generate"])
        .arg(&model)
        .arg("--out")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"written\""));
}

#[test]
fn test_generate_reports_generation_error() {
    let dir = tempfile::tempdir().unwrap();
    let model = write_model(
        dir.path(),
        &serde_json::json!({
            "id": "bad",
            "declgen": "1.0",
            "sources": [{"name": "bad", "types": [{
                "kind": "record", "name": "IBad", "fields": [
                    {"name": "lookup", "type": {"kind": "map",
                        "key": {"kind": "primitive", "name": "number"},
                        "value": {"kind": "primitive", "name": "string"}}}
                ]
            }]}]
        }),
    );
    let out = dir.path().join("out");

    Command::cargo_bin("declgen")
        .unwrap()
        .arg("generate")
        .arg(&model)
        .arg("--out")
        .arg(&out)
        .assert()
        .failure()
        .stderr(predicate::str::contains("map keys must be string-like"));
}

#[test]
fn test_validate_ok() {
    let dir = tempfile::tempdir().unwrap();
    let model = write_model(dir.path(), &sample_model());

    Command::cargo_bin("declgen")
        .unwrap()
        .arg("validate")
        .arg(&model)
        .assert()
        .success()
        .stdout(predicate::str::contains("ok"));
}

#[test]
fn test_validate_rejects_dangling_reference() {
    let dir = tempfile::tempdir().unwrap();
    let model = write_model(
        dir.path(),
        &serde_json::json!({
            "id": "dangling",
            "declgen": "1.0",
            "sources": [{"name": "main", "types": [{
                "kind": "record", "name": "IFoo", "fields": [
                    {"name": "x", "type": {"kind": "ref", "name": "IMissing"}}
                ]
            }]}]
        }),
    );

    Command::cargo_bin("declgen")
        .unwrap()
        .arg("validate")
        .arg(&model)
        .assert()
        .failure()
        .stderr(predicate::str::contains("unresolved reference 'IMissing'"));
}

#[test]
fn test_json_error_output_escapes_message() {
    let dir = tempfile::tempdir().unwrap();
    let model = dir.path().join("mo\"del.json");
    fs::write(&model, "{not json").unwrap();

    let output = Command::cargo_bin("declgen")
        .unwrap()
        .args(["--output", "json", "validate"])
        .arg(&model)
        .assert()
        .failure()
        .get_output()
        .clone();

    let stderr = String::from_utf8(output.stderr).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(stderr.trim()).unwrap();
    assert!(parsed["error"].as_str().unwrap().contains("mo\"del.json"));
}

#[test]
fn test_missing_file_is_an_error() {
    Command::cargo_bin("declgen")
        .unwrap()
        .arg("validate")
        .arg("no-such-model.json")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error reading"));
}
