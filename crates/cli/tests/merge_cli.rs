//! End-to-end tests for the `jdfmerge` binary.

use std::io::{Cursor, Write};
use std::path::Path;
use std::process::{Command, Output};

use zip::write::SimpleFileOptions;
use zip::ZipWriter;

fn jdfmerge() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_jdfmerge"));
    cmd.env_remove("RUST_LOG").env_remove("JDFMERGE_CONFIG");
    cmd
}

fn zip_bytes(files: Vec<(&str, Vec<u8>)>) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, content) in files {
        writer.start_file(name, SimpleFileOptions::default()).unwrap();
        writer.write_all(&content).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

fn batch(version: &str, carriers: &[u8], stops: &[u8]) -> Vec<u8> {
    zip_bytes(vec![
        ("VerzeJDF.txt", format!("\"{version}\",\"\",\"\",\"\",\"01012015\",\"x\";\r\n").into_bytes()),
        ("Pevnykod.txt", Vec::new()),
        ("Dopravci.txt", carriers.to_vec()),
        ("Zastavky.txt", stops.to_vec()),
        ("Linky.txt", Vec::new()),
        ("Zaslinky.txt", Vec::new()),
    ])
}

const CARRIER: &[u8] = b"\"123\",\"\",\"\xC8SAD\",\"1\",\"\",\"Jihlava\",\"\",\"\",\"\",\"\",\"\",\"\",\"1\";\r\n";
/// The same carrier in the 1.9 layout, without the disambiguator field.
const CARRIER_V9: &[u8] = b"\"123\",\"\",\"\xC8SAD\",\"1\",\"\",\"Jihlava\",\"\",\"\",\"\",\"\",\"\",\"\";\r\n";
const STOP: &[u8] = b"\"1\",\"Jihlava\",\"\",\"\",\"\",\"CZ\",\"\",\"\",\"\",\"\",\"\",\"\";\r\n";
const UNKNOWN_STOP: &[u8] = b"\"2\",\"Atlantis\",\"\",\"\",\"\",\"CZ\",\"\",\"\",\"\",\"\",\"\",\"\";\r\n";

/// Writes `JDF.zip`, `stops.txt` and an empty settings file into `dir`.
fn fixture(dir: &Path, stops: &[u8]) {
    let container = zip_bytes(vec![
        ("1.zip", batch("1.11", CARRIER, stops)),
        ("2.zip", batch("1.9", CARRIER_V9, b"")),
        ("3.zip", batch("2.0", b"", b"")),
    ]);
    std::fs::write(dir.join("JDF.zip"), container).unwrap();
    std::fs::write(dir.join("stops.txt"), b"\"Jihlava\",\"\",\"CZ\";\r\n").unwrap();
    std::fs::write(dir.join("jdfmerge.toml"), "").unwrap();
}

fn merge(dir: &Path, extra: &[&str]) -> Output {
    jdfmerge()
        .arg("--config")
        .arg(dir.join("jdfmerge.toml"))
        .args(["merge", "--archive", "JDF.zip", "--stops", "stops.txt", "--out", "out", "--date", "2015-06-30"])
        .args(extra)
        .current_dir(dir)
        .output()
        .unwrap()
}

#[test]
fn merge_writes_all_tables() {
    let dir = tempfile::tempdir().unwrap();
    fixture(dir.path(), STOP);

    let output = merge(dir.path(), &["--name", "Autobusy 2015"]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let out = dir.path().join("out");
    for table in ["VerzeJDF", "Pevnykod", "Dopravci", "Zastavky", "Linky", "Zaslinky"] {
        assert!(out.join(format!("{table}.txt")).exists(), "{table} missing");
    }
    let version = std::fs::read_to_string(out.join("VerzeJDF.txt")).unwrap();
    assert_eq!(version, "\"1.11\",\"\",\"\",\"\",\"30062015\",\"Autobusy 2015\";\r\n");

    // the same carrier in two batches is one canonical carrier
    let carriers = std::fs::read(out.join("Dopravci.txt")).unwrap();
    assert_eq!(carriers, CARRIER);

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("merged 2 batches (1 skipped)"), "stderr: {stderr}");
}

#[test]
fn json_report_on_stdout_and_file() {
    let dir = tempfile::tempdir().unwrap();
    fixture(dir.path(), STOP);

    let output = merge(dir.path(), &["--json", "--report", "report.json"]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let stdout: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let file: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(dir.path().join("report.json")).unwrap()).unwrap();
    assert_eq!(stdout, file);

    assert_eq!(stdout["meta"]["created"], "2015-06-30");
    assert_eq!(stdout["report"]["batches_read"], 2);
    assert_eq!(stdout["report"]["batches_skipped"], 1);
    assert_eq!(stdout["summary"]["issue_counts"]["invalid_version"], 1);
    assert_eq!(stdout["written"].as_array().unwrap().len(), 6);
}

#[test]
fn strict_fails_on_issues_after_writing() {
    let dir = tempfile::tempdir().unwrap();
    fixture(dir.path(), &[STOP, UNKNOWN_STOP].concat());

    let output = merge(dir.path(), &["--strict"]);
    assert_eq!(output.status.code(), Some(7), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert!(dir.path().join("out/Zastavky.txt").exists());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Atlantis"), "issue not logged: {stderr}");
}

#[test]
fn issues_without_strict_succeed() {
    let dir = tempfile::tempdir().unwrap();
    fixture(dir.path(), &[STOP, UNKNOWN_STOP].concat());

    let output = merge(dir.path(), &[]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
}

#[test]
fn missing_archive_exit_code() {
    let dir = tempfile::tempdir().unwrap();
    fixture(dir.path(), STOP);
    std::fs::remove_file(dir.path().join("JDF.zip")).unwrap();

    let output = merge(dir.path(), &[]);
    assert_eq!(output.status.code(), Some(4));
    assert!(!dir.path().join("out").exists());
}

#[test]
fn empty_reference_list_exit_code() {
    let dir = tempfile::tempdir().unwrap();
    fixture(dir.path(), STOP);
    std::fs::write(dir.path().join("stops.txt"), b"").unwrap();

    let output = merge(dir.path(), &[]);
    assert_eq!(output.status.code(), Some(5));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("reference stop list is empty"), "stderr: {stderr}");
}

#[test]
fn bad_date_is_a_usage_error() {
    let dir = tempfile::tempdir().unwrap();
    fixture(dir.path(), STOP);

    let output = jdfmerge()
        .arg("--config")
        .arg(dir.path().join("jdfmerge.toml"))
        .args(["merge", "--date", "30.6.2015"])
        .current_dir(dir.path())
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn batches_lists_versions_and_skips() {
    let dir = tempfile::tempdir().unwrap();
    fixture(dir.path(), STOP);

    let output = jdfmerge()
        .arg("--config")
        .arg(dir.path().join("jdfmerge.toml"))
        .args(["batches", "--archive", "JDF.zip"])
        .current_dir(dir.path())
        .output()
        .unwrap();
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "1\t1.11");
    assert_eq!(lines[1], "2\t1.9");
    assert!(lines[2].starts_with("3\tskipped: "), "{}", lines[2]);
}

#[test]
fn batches_json() {
    let dir = tempfile::tempdir().unwrap();
    fixture(dir.path(), STOP);

    let output = jdfmerge()
        .arg("--config")
        .arg(dir.path().join("jdfmerge.toml"))
        .args(["batches", "--archive", "JDF.zip", "--json"])
        .current_dir(dir.path())
        .output()
        .unwrap();
    assert!(output.status.success());

    let entries: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(entries[0]["batch"], "1");
    assert_eq!(entries[0]["version"], "1.11");
    assert!(entries[2]["version"].is_null());
    assert!(entries[2]["skipped"].is_string());
}

#[test]
fn validate_reports_bad_settings() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("jdfmerge.toml");
    std::fs::write(&path, "[output]\ndataset_name = \"\"\n").unwrap();

    let output = jdfmerge().arg("--config").arg(&path).arg("validate").output().unwrap();
    assert_eq!(output.status.code(), Some(3));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("dataset_name"), "stderr: {stderr}");
}

#[test]
fn validate_prints_resolved_settings() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("jdfmerge.toml");
    std::fs::write(&path, "[output]\ndataset_name = \"Autobusy 2015\"\n").unwrap();

    let output = jdfmerge().arg("--config").arg(&path).arg("validate").output().unwrap();
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("dataset_name = \"Autobusy 2015\""), "{stdout}");
    assert!(stdout.contains("JDF.zip"));
}
