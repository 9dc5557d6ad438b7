use std::io::Write;

use assert_cmd::Command;

const DOC: &str = r#"{
    "tag": "html",
    "children": [
        { "tag": "body", "children": [
            { "tag": "button", "attrs": { "id": "save" }, "text": "Save changes" }
        ]}
    ]
}"#;

fn doc_file() -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(DOC.as_bytes()).unwrap();
    file
}

#[test]
fn generate_prints_result_json() {
    let file = doc_file();
    let output = Command::cargo_bin("locsynth")
        .unwrap()
        .args(["generate", "--tree"])
        .arg(file.path())
        .args(["--id", "save"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let result: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(result["success"], true);
    assert_eq!(result["element"]["tag"], "button");
    assert!(result["primary"]["expression"].as_str().unwrap().contains("Save changes"));
}

#[test]
fn validate_reports_expression_outcome() {
    let file = doc_file();
    let output = Command::cargo_bin("locsynth")
        .unwrap()
        .args(["validate", "--tree"])
        .arg(file.path())
        .args(["--expression", "//button[@id='save']", "--id", "save"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let report: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(report["valid"], true);
    assert_eq!(report["match_count"], 1);
}

#[test]
fn validate_fails_for_ambiguous_expression() {
    let file = doc_file();
    Command::cargo_bin("locsynth")
        .unwrap()
        .args(["validate", "--tree"])
        .arg(file.path())
        .args(["--expression", "//*", "--id", "save"])
        .assert()
        .failure();
}

#[test]
fn unknown_target_id_is_an_error() {
    let file = doc_file();
    Command::cargo_bin("locsynth")
        .unwrap()
        .args(["generate", "--tree"])
        .arg(file.path())
        .args(["--id", "missing"])
        .assert()
        .failure();
}
