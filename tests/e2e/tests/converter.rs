//! E2E тесты для CLI инструмента `icl-convert`.
//!
//! Тестируем конвертацию между форматами:
//! - x9 (X9.100-187)
//! - json (снимок дерева)
//! - csv (список items, только вывод)

use std::fs;

use assert_cmd::Command;
use e2e_tests::{fixture, write_replaced};
use predicates::prelude::*;
use tempfile::tempdir;

/// Создать команду для запуска icl-convert.
///
/// `cargo_bin` deprecated из-за edge case с custom build directories,
/// но это единственный способ для кросс-крейтовых бинарников.
#[expect(deprecated)]
fn converter() -> Command {
    Command::cargo_bin("icl-convert").unwrap()
}

// ============================================================================
// Тесты конвертации
// ============================================================================

#[test]
fn test_x9_to_x9_is_byte_exact() {
    let dir = tempdir().unwrap();
    let output = dir.path().join("output.x9");

    converter()
        .args([
            "--input",
            fixture("sample.x9").to_str().unwrap(),
            "--input-format",
            "x9",
            "--output-format",
            "x9",
            "--output",
            output.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stderr(predicate::str::contains("Converted 3 item(s)"));

    assert_eq!(fs::read(&output).unwrap(), fs::read(fixture("sample.x9")).unwrap());
}

#[test]
fn test_x9_to_json() {
    let dir = tempdir().unwrap();
    let output = dir.path().join("output.json");

    converter()
        .args([
            "-i",
            fixture("sample.x9").to_str().unwrap(),
            "--input-format",
            "x9",
            "--output-format",
            "json",
            "-o",
            output.to_str().unwrap(),
        ])
        .assert()
        .success();

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    let bundles = &json["cashLetters"][0]["bundles"];
    assert_eq!(bundles.as_array().unwrap().len(), 2);
    assert_eq!(json["control"]["fileTotalAmount"], 130_000);
}

#[test]
fn test_x9_to_csv() {
    let dir = tempdir().unwrap();
    let output = dir.path().join("output.csv");

    converter()
        .args([
            "--input",
            fixture("sample.x9").to_str().unwrap(),
            "--input-format",
            "x9",
            "--output-format",
            "csv",
            "--output",
            output.to_str().unwrap(),
        ])
        .assert()
        .success();

    let content = fs::read_to_string(&output).unwrap();
    // CSV должен начинаться с заголовка
    assert!(content.starts_with("CASH_LETTER_ID,BUNDLE_ID,"));
    assert!(content.contains("A1,9999,2,return,1,031300012,5558881,5000,4,0"));
}

#[test]
fn test_roundtrip_x9_via_json() {
    let dir = tempdir().unwrap();
    let json = dir.path().join("sample.json");
    let back = dir.path().join("back.x9");

    converter()
        .args([
            "-i",
            fixture("sample.x9").to_str().unwrap(),
            "--input-format",
            "x9",
            "--output-format",
            "json",
            "-o",
            json.to_str().unwrap(),
        ])
        .assert()
        .success();

    converter()
        .args([
            "-i",
            json.to_str().unwrap(),
            "--input-format",
            "json",
            "--output-format",
            "x9",
            "-o",
            back.to_str().unwrap(),
        ])
        .assert()
        .success();

    assert_eq!(fs::read(&back).unwrap(), fs::read(fixture("sample.x9")).unwrap());
}

// ============================================================================
// Пересчёт итогов
// ============================================================================

/// Сумма второго чека 250.00 → 300.00; контрольные записи остаются старыми.
fn edited_amount(dir: &std::path::Path) -> std::path::PathBuf {
    let path = dir.join("edited.x9");
    write_replaced("sample.x9", &path, b"0000025000", b"0000030000").unwrap();
    path
}

#[test]
fn test_recompute_fixes_totals() {
    let dir = tempdir().unwrap();
    let input = edited_amount(dir.path());

    let output = converter()
        .args(["-i", input.to_str().unwrap(), "--input-format", "x9", "--output-format", "x9"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let text = String::from_utf8_lossy(&output);
    let control = text.lines().find(|l| l.starts_with("99")).unwrap();
    assert_eq!(&control[24..40], "0000000000135000");
}

#[test]
fn test_preserve_totals_keeps_stale_controls() {
    let dir = tempdir().unwrap();
    let input = edited_amount(dir.path());

    converter()
        .args([
            "-i",
            input.to_str().unwrap(),
            "--input-format",
            "x9",
            "--output-format",
            "x9",
            "--preserve-totals",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("0000000000130000"));
}

#[test]
fn test_strict_rejects_stale_totals() {
    let dir = tempdir().unwrap();
    let input = edited_amount(dir.path());

    converter()
        .args([
            "-i",
            input.to_str().unwrap(),
            "--input-format",
            "x9",
            "--output-format",
            "json",
            "--strict",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("BundleTotalAmount"));
}

// ============================================================================
// Ошибки
// ============================================================================

#[test]
fn test_out_of_order_records() {
    converter()
        .args([
            "-i",
            fixture("out_of_order.x9").to_str().unwrap(),
            "--input-format",
            "x9",
            "--output-format",
            "json",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("line 4"))
        .stderr(predicate::str::contains("Check Detail Addendum B"));
}

#[test]
fn test_invalid_field_is_reported() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("bad.x9");
    // Truncation Indicator первого Addendum A
    write_replaced("sample.x9", &input, b"Test Payee     Y10", b"Test Payee     Q10").unwrap();

    converter()
        .args(["-i", input.to_str().unwrap(), "--input-format", "x9", "--output-format", "csv"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("TruncationIndicator"));

    converter()
        .args([
            "-i",
            input.to_str().unwrap(),
            "--input-format",
            "x9",
            "--output-format",
            "csv",
            "--no-validate",
        ])
        .assert()
        .success();
}

#[test]
fn test_csv_input_is_rejected() {
    converter()
        .args(["--input-format", "csv", "--output-format", "x9"])
        .write_stdin("")
        .assert()
        .failure()
        .stderr(predicate::str::contains("output-only"));
}

#[test]
fn test_missing_input_file() {
    converter()
        .args([
            "--input",
            "/nonexistent/file.x9",
            "--input-format",
            "x9",
            "--output-format",
            "json",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to open input file"));
}

#[test]
fn test_missing_required_args() {
    converter()
        .args(["--input-format", "x9"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--output-format"));
}

// ============================================================================
// Тесты stdin/stdout
// ============================================================================

#[test]
fn test_stdin_to_stdout() {
    let input_data = fs::read(fixture("sample.x9")).unwrap();

    converter()
        .args(["--input-format", "x9", "--output-format", "csv"])
        .write_stdin(input_data)
        .assert()
        .success()
        .stdout(predicate::str::starts_with("CASH_LETTER_ID,"))
        .stdout(predicate::str::contains("A1,9999,1,check,1,031300012,5558881,100000,3,2"))
        .stderr(predicate::str::contains("Converted 3 item(s)"));
}
