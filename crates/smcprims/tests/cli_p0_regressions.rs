#![cfg(feature = "cli")]

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn unique_temp_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "smccli-{tag}-{}-{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time should be after epoch")
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
    dir
}

fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).expect("file should be writable");
    path
}

fn snapshot(dir: &Path, privileged: bool) -> PathBuf {
    write_file(
        dir,
        "smc.json",
        &format!(
            r#"{{ "privileged": {privileged}, "keys": [
                {{ "key": "TC0P", "type": "sp78", "bytes": [40, 0] }},
                {{ "key": "FNum", "type": "ui8 ", "bytes": [1] }},
                {{ "key": "F0Mn", "type": "fpe2", "bytes": [15, 160], "writable": true }},
                {{ "key": "F0Ac", "type": "fpe2", "bytes": [18, 192] }}
            ] }}"#
        ),
    )
}

fn smcprims(args: &[&str]) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_smcprims"));
    cmd.env_remove("SMCPRIMS_SIM")
        .env_remove("SMCPRIMS_CATALOG")
        .env_remove("SMCPRIMS_SERVICE")
        .arg("--log-level")
        .arg("error")
        .arg("--format")
        .arg("json")
        .args(args);
    cmd
}

fn run(cmd: &mut Command) -> Output {
    cmd.output().expect("smcprims should run")
}

#[test]
fn missing_key_exits_not_found() {
    let dir = unique_temp_dir("missing-key");
    let sim = snapshot(&dir, true);

    let output = run(smcprims(&["read", "TC9P"]).arg("--sim").arg(&sim));
    assert_eq!(output.status.code(), Some(4));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("key TC9P not found"));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn short_key_is_usage_error() {
    let dir = unique_temp_dir("short-key");
    let sim = snapshot(&dir, true);

    let output = run(smcprims(&["read", "TC0"]).arg("--sim").arg(&sim));
    assert_eq!(output.status.code(), Some(64));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn write_with_wrong_type_is_data_invalid_and_leaves_value() {
    let dir = unique_temp_dir("mismatch");
    let sim = snapshot(&dir, true);

    let output = run(smcprims(&["write", "F0Mn", "--type", "ui16", "--value", "5"])
        .arg("--sim")
        .arg(&sim));
    assert_eq!(output.status.code(), Some(60));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("type mismatch"));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn unprivileged_fan_min_exits_permission_denied() {
    let dir = unique_temp_dir("unprivileged");
    let sim = snapshot(&dir, false);

    let output = run(smcprims(&["fan-min", "0", "2000"]).arg("--sim").arg(&sim));
    assert_eq!(output.status.code(), Some(50));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn fans_without_count_key_exits_not_found() {
    let dir = unique_temp_dir("no-fans");
    let sim = write_file(&dir, "smc.json", r#"{ "keys": [] }"#);

    let output = run(smcprims(&["fans"]).arg("--sim").arg(&sim));
    assert_eq!(output.status.code(), Some(4));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn invalid_snapshot_is_data_invalid() {
    let dir = unique_temp_dir("bad-snapshot");
    let sim = write_file(&dir, "smc.json", r#"{ "keys": [ { "key": "TOOLONG", "type": "ui8 ", "bytes": [1] } ] }"#);

    let output = run(smcprims(&["temps"]).arg("--sim").arg(&sim));
    assert_eq!(output.status.code(), Some(60));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn custom_catalog_limits_temps() {
    let dir = unique_temp_dir("catalog");
    let sim = snapshot(&dir, true);
    let catalog = write_file(
        &dir,
        "catalog.json",
        r#"{ "keys": [ { "key": "TC0P", "name": "Die", "kind": "temperature" } ] }"#,
    );

    let output = run(smcprims(&["temps"])
        .arg("--sim")
        .arg(&sim)
        .env("SMCPRIMS_CATALOG", &catalog));
    assert!(output.status.success());
    let out: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("temps should emit json");
    assert_eq!(out[0]["name"], "Die");
    assert_eq!(out[0]["value"], 40.0);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn broken_catalog_fails_doctor() {
    let dir = unique_temp_dir("doctor-catalog");
    let sim = snapshot(&dir, true);
    let catalog = write_file(&dir, "catalog.json", "not json");

    let output = run(smcprims(&["doctor"])
        .arg("--sim")
        .arg(&sim)
        .arg("--catalog")
        .arg(&catalog));
    assert_eq!(output.status.code(), Some(30));

    let _ = std::fs::remove_dir_all(&dir);
}

#[cfg(not(target_os = "macos"))]
#[test]
fn driver_is_unavailable_off_macos() {
    let output = run(&mut smcprims(&["power"]));
    assert_eq!(output.status.code(), Some(3));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("requires macOS"));
}

#[test]
fn version_extended_reports_target() {
    let output = run(&mut smcprims(&["version", "--extended"]));
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(&format!("version: {}", env!("CARGO_PKG_VERSION"))));
    assert!(stdout.contains("target: "));
}
