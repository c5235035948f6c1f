use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{tempdir, TempDir};

const EXPORT: &str = "\
STT,Mã hàng hóa,Tên hàng hóa,Từ serial,NHÂN VIÊN NHẬN,Trạng thái,QUẬN/HUYỆN
1,SW-8P,Switch 8 cổng,,,Mới,Quận 1
,,,CN12345,Nguyễn Văn A,,
,,,CN12346,Trần Văn B,,
2,CAM-IP952,Camera IP952,,,Hỏng,Quận 3
,,,21200001,Lê Thị C,,
";

fn setup_export() -> (TempDir, PathBuf) {
    let temp = tempdir().unwrap();
    let path = temp.path().join("kho.csv");
    fs::write(&path, EXPORT).unwrap();
    (temp, path)
}

#[allow(deprecated)]
fn finder(workdir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("inventory-finder").expect("binary");
    cmd.current_dir(workdir)
        .env_remove("INVENTORY_FINDER_CONFIG")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn chat_answers_greetings_and_lookups_until_exit() {
    let (temp, source) = setup_export();
    let output = finder(temp.path())
        .arg("--source")
        .arg(&source)
        .args(["chat", "--json"])
        .write_stdin("xin chào\n\nCN12345\nexit\nCN12346\n")
        .output()
        .unwrap();
    assert!(output.status.success());

    let lines: Vec<Value> = String::from_utf8(output.stdout)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).expect("one json object per line"))
        .collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["intent"], "greeting");
    assert_eq!(lines[0]["count"], 0);
    assert_eq!(lines[1]["intent"], "lookup");
    assert_eq!(lines[1]["stage"], "exact_serial");
}

#[test]
fn chat_text_mode_prints_tables() {
    let (temp, source) = setup_export();
    finder(temp.path())
        .arg("--source")
        .arg(&source)
        .arg("chat")
        .write_stdin("hướng dẫn\nnguyễn\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Hướng dẫn sử dụng"))
        .stdout(predicate::str::contains("Tìm thấy 1 tài sản của nhân viên: 'nguyễn'"))
        .stdout(predicate::str::contains("NHÂN VIÊN NHẬN"));
}

#[test]
fn chat_refuses_an_export_on_stdin() {
    let temp = tempdir().unwrap();
    finder(temp.path())
        .args(["--source", "-", "chat"])
        .write_stdin(EXPORT)
        .assert()
        .failure()
        .stderr(predicate::str::contains("chat reads prompts from stdin"));
}

#[test]
fn inspect_reports_detected_fields_and_counts() {
    let (temp, source) = setup_export();
    let output = finder(temp.path())
        .arg("--source")
        .arg(&source)
        .args(["inspect", "--json", "--rows", "2"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let body: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(body["raw_rows"], 5);
    assert_eq!(body["items"], 3);
    assert_eq!(body["dropped_rows"], 2);
    assert_eq!(body["good_items"], 2);
    assert_eq!(body["fields"]["serial"], "Từ serial");
    assert_eq!(body["fields"]["region"], "QUẬN/HUYỆN");
    assert_eq!(body["preview"].as_array().unwrap().len(), 2);
}

#[test]
fn normalize_prints_one_flat_row_per_unit() {
    let (temp, source) = setup_export();
    let output = finder(temp.path())
        .arg("--source")
        .arg(&source)
        .arg("normalize")
        .output()
        .unwrap();
    assert!(output.status.success());
    let text = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(
        lines[0],
        "STT,Mã hàng hóa,Tên hàng hóa,Từ serial,NHÂN VIÊN NHẬN,Trạng thái,QUẬN/HUYỆN"
    );
    assert_eq!(lines[2], "1,SW-8P,Switch 8 cổng,CN12346,Trần Văn B,Mới,Quận 1");
    assert_eq!(lines[3], "2,CAM-IP952,Camera IP952,21200001,Lê Thị C,Hỏng,Quận 3");
}

#[test]
fn normalize_writes_json_to_a_file() {
    let (temp, source) = setup_export();
    let out = temp.path().join("flat.json");
    finder(temp.path())
        .arg("--source")
        .arg(&source)
        .args(["normalize", "--format", "json", "--output"])
        .arg(&out)
        .assert()
        .success();
    let rows: Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(rows.as_array().unwrap().len(), 3);
    assert_eq!(rows[0]["Từ serial"], "CN12345");
    assert_eq!(rows[0]["Tên hàng hóa"], "Switch 8 cổng");
}

#[test]
fn schema_lists_every_json_output() {
    let temp = tempdir().unwrap();
    let output = finder(temp.path()).arg("schema").output().unwrap();
    assert!(output.status.success());
    let body: Value = serde_json::from_slice(&output.stdout).unwrap();
    for key in ["lookup_response", "table_summary", "error"] {
        assert!(body.get(key).is_some(), "missing {key}");
    }
}
