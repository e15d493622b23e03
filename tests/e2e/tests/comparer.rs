//! E2E тесты для CLI инструмента `icl-compare`.

use assert_cmd::Command;
use e2e_tests::{fixture, write_replaced, write_without_lines};
use predicates::prelude::*;
use tempfile::tempdir;

/// Создать команду для запуска icl-compare.
#[expect(deprecated)]
fn comparer() -> Command {
    Command::cargo_bin("icl-compare").unwrap()
}

/// Создать команду для запуска icl-convert.
#[expect(deprecated)]
fn converter() -> Command {
    Command::cargo_bin("icl-convert").unwrap()
}

// ============================================================================
// Идентичные файлы
// ============================================================================

#[test]
fn test_compare_identical_x9() {
    let sample = fixture("sample.x9");

    comparer()
        .args([
            "--file1",
            sample.to_str().unwrap(),
            "--format1",
            "x9",
            "--file2",
            sample.to_str().unwrap(),
            "--format2",
            "x9",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("identical"));
}

#[test]
fn test_compare_x9_vs_json_via_conversion() {
    let dir = tempdir().unwrap();
    let json = dir.path().join("sample.json");
    let sample = fixture("sample.x9");

    converter()
        .args([
            "-i",
            sample.to_str().unwrap(),
            "--input-format",
            "x9",
            "--output-format",
            "json",
            "-o",
            json.to_str().unwrap(),
        ])
        .assert()
        .success();

    comparer()
        .args([
            "--file1",
            sample.to_str().unwrap(),
            "--format1",
            "x9",
            "--file2",
            json.to_str().unwrap(),
            "--format2",
            "json",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("identical"));
}

// ============================================================================
// Различающиеся файлы
// ============================================================================

#[test]
fn test_compare_same_item_different_amount() {
    let dir = tempdir().unwrap();
    let edited = dir.path().join("edited.x9");
    write_replaced("sample.x9", &edited, b"0000025000", b"0000030000").unwrap();

    comparer()
        .args([
            "--file1",
            fixture("sample.x9").to_str().unwrap(),
            "--format1",
            "x9",
            "--file2",
            edited.to_str().unwrap(),
            "--format2",
            "x9",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("ECE_SEQUENCE_NUMBER=2 differs"))
        .stderr(predicate::str::contains("AMOUNT: '25000' vs '30000'"))
        .stderr(predicate::str::contains("1 difference(s)"));
}

#[test]
fn test_compare_missing_item() {
    let dir = tempdir().unwrap();
    let short = dir.path().join("short.x9");
    // второй чек и его Addendum A
    write_without_lines("sample.x9", &short, &[12, 13]).unwrap();

    comparer()
        .args([
            "--file1",
            fixture("sample.x9").to_str().unwrap(),
            "--format1",
            "x9",
            "--file2",
            short.to_str().unwrap(),
            "--format2",
            "x9",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("ECE_SEQUENCE_NUMBER=2"))
        .stderr(predicate::str::contains("only in"));
}

#[test]
fn test_compare_difference_outside_listing() {
    let dir = tempdir().unwrap();
    let edited = dir.path().join("edited.x9");
    // Payee Name первого Addendum A
    write_replaced("sample.x9", &edited, b"Test Payee", b"Other Name").unwrap();

    comparer()
        .args([
            "--file1",
            fixture("sample.x9").to_str().unwrap(),
            "--format1",
            "x9",
            "--file2",
            edited.to_str().unwrap(),
            "--format2",
            "x9",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("other record fields differ"));
}

// ============================================================================
// Ошибки
// ============================================================================

#[test]
fn test_missing_file() {
    comparer()
        .args([
            "--file1",
            "/nonexistent/a.x9",
            "--format1",
            "x9",
            "--file2",
            fixture("sample.x9").to_str().unwrap(),
            "--format2",
            "x9",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to open file"));
}

#[test]
fn test_unparsable_file() {
    comparer()
        .args([
            "--file1",
            fixture("out_of_order.x9").to_str().unwrap(),
            "--format1",
            "x9",
            "--file2",
            fixture("sample.x9").to_str().unwrap(),
            "--format2",
            "x9",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read X9 file"))
        .stderr(predicate::str::contains("line 4"));
}

#[test]
fn test_missing_required_args() {
    comparer()
        .args(["--file1", "a.x9", "--file2", "b.x9"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--format1"));
}
