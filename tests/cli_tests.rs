//! Command-line behavior of the `name-reconciler` binary.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const VARIANTS_CSV: &str = "商品名\nＳｏｎｙ　Ｐｒｏｄｕｃｔ　Ａ\nSony ProductB\n";
const REFERENCES_CSV: &str = "商品名\nSony Product A\nSony Product B\n";

fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

fn inputs() -> (TempDir, PathBuf, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let variants = write(dir.path(), "yuragi.csv", VARIANTS_CSV);
    let references = write(dir.path(), "master.csv", REFERENCES_CSV);
    (dir, variants, references)
}

fn cli() -> Command {
    Command::cargo_bin("name-reconciler").unwrap()
}

#[test]
fn test_reconcile_text_output() {
    let (_dir, variants, references) = inputs();

    cli()
        .arg("reconcile")
        .arg(&variants)
        .arg(&references)
        .assert()
        .success()
        .stdout(predicate::str::contains("Reconciliation Results"))
        .stdout(predicate::str::contains(
            "Ｓｏｎｙ　Ｐｒｏｄｕｃｔ　Ａ => Sony Product A",
        ))
        .stdout(predicate::str::contains("Sony ProductB => Sony Product B"))
        .stdout(predicate::str::contains("1 of 2 variant(s) matched exactly"));
}

#[test]
fn test_reconcile_json_output() {
    let (_dir, variants, references) = inputs();

    let output = cli()
        .args(["--format", "json", "reconcile"])
        .arg(&variants)
        .arg(&references)
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["count"], 2);
    assert_eq!(json["config"]["variant_field"], "商品名");
    assert_eq!(json["results"][0]["matched_reference"], "Sony Product A");
    assert_eq!(json["results"][1]["matched_reference"], "Sony Product B");
}

#[test]
fn test_reconcile_tsv_output() {
    let (_dir, variants, references) = inputs();

    let output = cli()
        .arg("reconcile")
        .arg(&variants)
        .arg(&references)
        .args(["-f", "tsv"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(
        lines[0],
        "original_variant\tmatched_reference\thybrid_score\tchar_similarity\ttoken_similarity"
    );
    assert_eq!(
        lines[1],
        "Ｓｏｎｙ　Ｐｒｏｄｕｃｔ　Ａ\tSony Product A\t1.000\t1.000\t1.000"
    );
    assert!(lines[2].starts_with("Sony ProductB\tSony Product B\t"));
    assert_eq!(lines.len(), 3);
}

#[test]
fn test_reconcile_writes_workbook() {
    let (dir, variants, references) = inputs();
    let output = dir.path().join("result.xlsx");

    cli()
        .args(["--quiet", "reconcile"])
        .arg(&variants)
        .arg(&references)
        .arg("--output")
        .arg(&output)
        .assert()
        .success();

    let bytes = std::fs::read(&output).unwrap();
    assert!(bytes.starts_with(b"PK\x03\x04"));
}

#[test]
fn test_reconcile_custom_columns() {
    let dir = tempfile::tempdir().unwrap();
    let variants = write(dir.path(), "v.tsv", "id\tname\n1\tｿﾆｰ ﾃﾚﾋﾞ\n");
    let references = write(dir.path(), "r.csv", "canonical\nソニー ラジオ\nソニー テレビ\n");

    cli()
        .args(["-f", "tsv", "reconcile"])
        .arg(&variants)
        .arg(&references)
        .args(["--variant-field", "name", "--reference-field", "canonical"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ｿﾆｰ ﾃﾚﾋﾞ\tソニー テレビ\t1.000"));
}

#[test]
fn test_missing_column_fails() {
    let (_dir, variants, references) = inputs();

    cli()
        .arg("reconcile")
        .arg(&variants)
        .arg(&references)
        .args(["--variant-field", "name"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Column 'name' not found"));
}

#[test]
fn test_missing_input_file_fails() {
    let (dir, _variants, references) = inputs();

    cli()
        .arg("reconcile")
        .arg(dir.path().join("absent.csv"))
        .arg(&references)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read variants"));
}

#[test]
fn test_negative_weight_rejected() {
    let (_dir, variants, references) = inputs();

    cli()
        .arg("reconcile")
        .arg(&variants)
        .arg(&references)
        .args(["--char-weight=-0.5"])
        .assert()
        .failure();
}

#[test]
fn test_compare_tsv() {
    cli()
        .args(["compare", "Sony ProductB", "Sony Product B", "-f", "tsv"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "hybrid_score\tchar_similarity\ttoken_similarity\n",
        ))
        .stdout(predicate::str::contains("0.749\t0.963\t0.250"));
}

#[test]
fn test_compare_text_shows_normalized_key() {
    cli()
        .args(["compare", "ＡＢＣ１２３", "abc123"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Compared as: ABC123"))
        .stdout(predicate::str::contains("Hybrid Score:     1.000"));
}
