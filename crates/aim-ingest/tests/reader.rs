//! Tests for batch file readers and CSV templates.

use std::fs;

use tempfile::TempDir;

use aim_ingest::{IngestError, csv_template, read_records, write_csv_template};

#[test]
fn json_object_and_array_files() {
    let dir = TempDir::new().unwrap();
    let single = dir.path().join("single.json");
    fs::write(&single, r#"{"applicant_first_name": "John"}"#).unwrap();
    let batch = dir.path().join("batch.JSON");
    fs::write(
        &batch,
        r#"[{"applicant_first_name": "John"}, {"applicant_first_name": "Jane"}]"#,
    )
    .unwrap();

    assert_eq!(read_records(&single).unwrap().len(), 1);
    let records = read_records(&batch).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[1]["applicant_first_name"], "Jane");
}

#[test]
fn json_array_of_scalars_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.json");
    fs::write(&path, r#"[{"a": 1}, 2]"#).unwrap();
    let err = read_records(&path).unwrap_err();
    assert!(matches!(err, IngestError::NotAnObject { index: 1, .. }));
}

#[test]
fn csv_rows_become_text_records() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("input.csv");
    fs::write(
        &path,
        "\u{feff}applicant_first_name, applicant_gender ,policy_face_amount\n\
         John,M,\"250,000\"\n\
         ,,\n\
         Jane,F,\n",
    )
    .unwrap();

    let records = read_records(&path).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["applicant_first_name"], "John");
    assert_eq!(records[0]["applicant_gender"], "M");
    assert_eq!(records[0]["policy_face_amount"], "250,000");
    assert_eq!(records[1]["policy_face_amount"], "");
}

#[test]
fn header_only_csv_is_empty() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("empty.csv");
    fs::write(&path, "applicant_first_name\n").unwrap();
    assert!(matches!(
        read_records(&path),
        Err(IngestError::EmptyCsv { .. })
    ));
}

#[test]
fn unknown_extension_and_missing_file() {
    let dir = TempDir::new().unwrap();
    let xlsx = dir.path().join("input.xlsx");
    fs::write(&xlsx, "").unwrap();
    assert!(matches!(
        read_records(&xlsx),
        Err(IngestError::UnsupportedFormat { .. })
    ));
    assert!(matches!(
        read_records(&dir.path().join("missing.json")),
        Err(IngestError::FileNotFound { .. })
    ));
}

#[test]
fn csv_template_header() {
    let fields = ["applicant_first_name", "applicant_gender", "policy_face_amount"];
    let text = csv_template(&fields).unwrap();
    insta::assert_snapshot!(text.trim_end(), @"applicant_first_name,applicant_gender,policy_face_amount");
}

#[test]
fn written_template_reads_back_as_header() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("life_template.csv");
    write_csv_template(&path, &["applicant_first_name", "applicant_last_name"]).unwrap();
    let contents = fs::read_to_string(&path).unwrap();
    assert_eq!(contents, "applicant_first_name,applicant_last_name\n");
}
