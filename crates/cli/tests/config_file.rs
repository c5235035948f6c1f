use assert_cmd::Command;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

const EXPORT: &str = "\
Tên hàng hóa,Từ serial,Người nhận,Khu vực
Camera,CM1,An,Quận 1
,CM2,Bình,
";

#[allow(deprecated)]
fn finder(workdir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("inventory-finder").expect("binary");
    cmd.current_dir(workdir)
        .env_remove("INVENTORY_FINDER_CONFIG")
        .env_remove("RUST_LOG");
    cmd
}

fn run_json(cmd: &mut Command) -> (bool, Value) {
    let output = cmd.output().expect("command run");
    let body: Value = serde_json::from_slice(&output.stdout).expect("valid json");
    (output.status.success(), body)
}

#[test]
fn default_config_file_supplies_source_and_aliases() {
    let temp = tempdir().unwrap();
    let root = temp.path();
    fs::write(root.join("kho.csv"), EXPORT).unwrap();
    fs::write(
        root.join("inventory-finder.toml"),
        r#"
        [source]
        path = "kho.csv"

        [schema]
        aliases = { holder = ["Người nhận"] }
        "#,
    )
    .unwrap();

    let (ok, body) = run_json(finder(root).args(["search", "Bình", "--json"]));
    assert!(ok, "{body}");
    assert_eq!(body["stage"], "holder");
    assert_eq!(body["items"][0]["fields"]["serial"], "CM2");
    assert_eq!(body["items"][0]["fields"]["product_name"], "Camera");
}

#[test]
fn env_config_is_used_and_flags_override_it() {
    let temp = tempdir().unwrap();
    let root = temp.path();
    fs::write(root.join("kho.csv"), EXPORT.replace(',', ";")).unwrap();
    let config = root.join("finder.json");
    fs::write(
        &config,
        r#"{"source":{"path":"kho.csv","delimiter":";"},"display":{"locale":"en"}}"#,
    )
    .unwrap();

    let (ok, body) = run_json(
        finder(root)
            .env("INVENTORY_FINDER_CONFIG", &config)
            .args(["search", "cm1", "--json"]),
    );
    assert!(ok, "{body}");
    assert_eq!(body["message"], "Found by serial: cm1");

    let (ok, body) = run_json(
        finder(root)
            .env("INVENTORY_FINDER_CONFIG", &config)
            .args(["--locale", "vi", "search", "cm1", "--json"]),
    );
    assert!(ok, "{body}");
    assert_eq!(body["message"], "Tìm thấy theo Serial: cm1");
}

#[test]
fn unknown_config_keys_are_reported_with_paths() {
    let temp = tempdir().unwrap();
    let root = temp.path();
    let config = root.join("bad.toml");
    fs::write(&config, "[cache]\nrefresh_seconds = 5\nttl = 3\n").unwrap();

    let (ok, body) = run_json(
        finder(root)
            .arg("--config")
            .arg(&config)
            .args(["search", "x", "--json"]),
    );
    assert!(!ok, "expected non-zero exit for invalid config");
    assert_eq!(body["status"], "error");
    assert_eq!(body["code"], "invalid_config");
    let message = body["message"].as_str().unwrap_or_default();
    assert!(
        message.contains("cache.ttl"),
        "message did not contain the offending path: {message}"
    );
    let hint = body["hint"].as_str().unwrap_or_default();
    assert!(hint.contains("cache.refresh_seconds"), "hint: {hint}");
}

#[test]
fn serial_in_fill_down_is_rejected() {
    let temp = tempdir().unwrap();
    let root = temp.path();
    fs::write(root.join("kho.csv"), EXPORT).unwrap();
    let config = root.join("fill.toml");
    fs::write(&config, "[schema]\nfill_down = [\"serial\"]\n").unwrap();

    let (ok, body) = run_json(
        finder(root)
            .arg("--config")
            .arg(&config)
            .args(["--source", "kho.csv", "search", "x", "--json"]),
    );
    assert!(!ok);
    assert!(body["message"].as_str().unwrap().contains("serial"), "{body}");
}
