mod common;

use std::process::Command;

use genuine_tables::{ExtractOptions, MergedFill, extract_html_to_csv};
use tempfile::tempdir;

fn price_table() -> String {
    common::table(&[
        &["<th>Item</th>", "<th>Price</th>"],
        &["<td>Pen</td>", "<td>1.5</td>"],
        &["<td>Book</td>", "<td>9.9</td>"],
    ])
}

fn layout_table() -> String {
    common::table(&[
        &["<td>logo</td>", "<td>menu</td>", "<td>search</td>"],
        &["<td colspan='2'>body</td>"],
    ])
}

#[test]
fn extracts_genuine_table_to_merged_csv() {
    let dir = tempdir().expect("tempdir should be created");
    let input = dir.path().join("single.html");
    let output = dir.path().join("single.csv");

    common::create_test_html(&input, &[&price_table()]).expect("HTML fixture should be created");

    let report = extract_html_to_csv(&input, &output, &ExtractOptions::default())
        .expect("extraction should succeed");

    let csv = std::fs::read_to_string(&output).expect("CSV should be readable");
    assert!(
        csv.starts_with("table_id,orientation,col_1,col_2\n"),
        "unexpected CSV output: {csv:?}, report: {report:?}"
    );
    assert!(
        csv.contains("1,top,Pen,1.5"),
        "unexpected CSV output: {csv:?}, report: {report:?}"
    );
    assert_eq!(report.table_count, 1);
    assert_eq!(report.genuine_count, 1);
    assert_eq!(report.row_count, 3);
}

#[test]
fn omits_layout_tables_from_output() {
    let dir = tempdir().expect("tempdir should be created");
    let input = dir.path().join("mixed.html");
    let output = dir.path().join("mixed.csv");

    common::create_test_html(&input, &[&layout_table(), &price_table()])
        .expect("HTML fixture should be created");

    let report = extract_html_to_csv(&input, &output, &ExtractOptions::default())
        .expect("extraction should succeed");

    let csv = std::fs::read_to_string(&output).expect("CSV should be readable");
    assert!(!csv.contains("logo"), "unexpected CSV output: {csv:?}");
    assert!(csv.contains("2,top,Book,9.9"), "unexpected CSV output: {csv:?}");
    assert_eq!(report.table_count, 2);
    assert_eq!(report.genuine_count, 1);
    assert!(!report.warnings.is_empty());
}

#[test]
fn repeats_merged_values_on_request() {
    let dir = tempdir().expect("tempdir should be created");
    let input = dir.path().join("merged.html");
    let output = dir.path().join("merged.csv");

    let table = common::table(&[
        &["<th colspan='2'>Stock</th>"],
        &["<th>North</th>", "<th>South</th>"],
        &["<td>4</td>", "<td>7</td>"],
    ]);
    common::create_test_html(&input, &[&table]).expect("HTML fixture should be created");

    let options = ExtractOptions {
        fill: MergedFill::Repeat,
        no_table: true,
        no_orientation: true,
        ..ExtractOptions::default()
    };
    extract_html_to_csv(&input, &output, &options).expect("extraction should succeed");

    let csv = std::fs::read_to_string(&output).expect("CSV should be readable");
    assert_eq!(csv, "col_1,col_2\nStock,Stock\nNorth,South\n4,7\n");
}

#[test]
fn writes_no_file_when_every_table_is_layout() {
    let dir = tempdir().expect("tempdir should be created");
    let input = dir.path().join("layout.html");
    let output = dir.path().join("layout.csv");

    common::create_test_html(&input, &[&layout_table()]).expect("HTML fixture should be created");

    let report = extract_html_to_csv(&input, &output, &ExtractOptions::default())
        .expect("extraction should succeed");

    assert_eq!(report.genuine_count, 0);
    assert_eq!(report.row_count, 0);
    assert!(!output.exists());
}

#[test]
fn cli_exits_with_code_2_when_no_genuine_tables() {
    let dir = tempdir().expect("tempdir should be created");
    let input = dir.path().join("cli-layout.html");
    let output = dir.path().join("cli-layout.csv");

    common::create_test_html(&input, &[&layout_table()]).expect("HTML fixture should be created");

    let status = Command::new(env!("CARGO_BIN_EXE_html2csv"))
        .args([
            "extract",
            "-i",
            &input.to_string_lossy(),
            "-o",
            &output.to_string_lossy(),
        ])
        .status()
        .expect("CLI should run");

    assert_eq!(status.code(), Some(2));
}

#[test]
fn cli_prints_orientation_per_table() {
    let dir = tempdir().expect("tempdir should be created");
    let input = dir.path().join("cli-classify.html");

    common::create_test_html(&input, &[&layout_table(), &price_table()])
        .expect("HTML fixture should be created");

    let output = Command::new(env!("CARGO_BIN_EXE_html2csv"))
        .args(["classify", "-i", &input.to_string_lossy()])
        .output()
        .expect("CLI should run");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(output.status.code(), Some(0));
    assert!(stdout.contains("table 1: not [not_genuine]"), "stdout: {stdout}");
    assert!(stdout.contains("table 2: top (3x2)"), "stdout: {stdout}");
}
