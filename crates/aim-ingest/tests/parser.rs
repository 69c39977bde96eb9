//! Tests for FAST UI record parsing.

use serde_json::json;

use aim_ingest::{FastUiParser, ParseOptions, ParsingError};
use aim_model::{FieldValue, RawRecord};

fn raw(value: serde_json::Value) -> RawRecord {
    match value {
        serde_json::Value::Object(map) => map,
        other => panic!("expected object, got {other}"),
    }
}

#[test]
fn flat_record_is_cleaned() {
    let parsed = FastUiParser::default()
        .parse(&raw(json!({
            "Applicant First Name": "  John ",
            "applicant_birth_date": "01/15/1980",
            "policy_face_amount": "$250,000",
            "smoker_status": "N",
            "middle_name": "N/A",
            "applicant_age": 44
        })))
        .expect("parse record");

    let record = &parsed.record;
    assert_eq!(record.get("applicant_first_name"), Some(&FieldValue::from("John")));
    assert_eq!(record.get("applicant_birth_date"), Some(&FieldValue::from("1980-01-15")));
    assert_eq!(record.get("policy_face_amount"), Some(&FieldValue::Integer(250_000)));
    assert_eq!(record.get("smoker_status"), Some(&FieldValue::Bool(false)));
    assert_eq!(record.get("middle_name"), Some(&FieldValue::Null));
    assert_eq!(record.get("applicant_age"), Some(&FieldValue::Integer(44)));

    assert_eq!(parsed.stats.original_fields, 6);
    assert_eq!(parsed.stats.parsed_fields, 6);
    assert_eq!(parsed.stats.value_types.get("integer"), Some(&2));
    assert_eq!(parsed.stats.value_types.get("null"), Some(&1));
}

#[test]
fn sections_and_arrays_are_flattened() {
    let parsed = FastUiParser::default()
        .parse(&raw(json!({
            "applicant": {"first_name": "Jane", "gender": "F"},
            "beneficiaries": [
                {"name": "Sam", "relationship": "Child"},
                {"name": "Alex", "relationship": "Spouse"}
            ],
            "riders": ["ADB", "WP"]
        })))
        .expect("parse record");

    let record = &parsed.record;
    assert_eq!(record.get("applicant_first_name"), Some(&FieldValue::from("Jane")));
    assert_eq!(record.get("applicant_gender"), Some(&FieldValue::from("F")));
    assert_eq!(record.get("beneficiaries_2_relationship"), Some(&FieldValue::from("Spouse")));
    assert_eq!(record.get("beneficiaries_count"), Some(&FieldValue::Integer(2)));
    assert_eq!(record.get("riders_1"), Some(&FieldValue::from("ADB")));
    assert_eq!(record.get("riders_count"), Some(&FieldValue::Integer(2)));
    assert_eq!(parsed.stats.nested_sections, 1);
    assert_eq!(parsed.stats.array_sections, 2);
    assert_eq!(record.len(), 10);
}

#[test]
fn deep_nesting_reports_the_path() {
    let err = FastUiParser::default()
        .parse(&raw(json!({
            "applicant": {"address": {"city": "Hartford"}}
        })))
        .unwrap_err();
    assert!(matches!(err, ParsingError::NestingTooDeep { .. }));
    assert_eq!(err.field_path(), "applicant.address");

    let err = FastUiParser::default()
        .parse(&raw(json!({"matrix": [[1, 2]]})))
        .unwrap_err();
    assert_eq!(err.field_path(), "matrix.1");

    let err = FastUiParser::default()
        .parse(&raw(json!({"beneficiaries": [{"contact": {"phone": "555"}}]})))
        .unwrap_err();
    assert_eq!(err.field_path(), "beneficiaries.1.contact");
}

#[test]
fn colliding_names_are_rejected() {
    let err = FastUiParser::default()
        .parse(&raw(json!({
            "applicant": {"name": "Jane"},
            "Applicant Name": "Janet"
        })))
        .unwrap_err();
    let ParsingError::FieldNameCollision { field, .. } = &err else {
        panic!("expected collision, got {err:?}");
    };
    assert_eq!(field, "applicant_name");
}

#[test]
fn empty_names_are_rejected() {
    let err = FastUiParser::default()
        .parse(&raw(json!({"***": "x"})))
        .unwrap_err();
    assert_eq!(err, ParsingError::EmptyFieldName { path: "***".to_string() });
}

#[test]
fn disabled_coercion_keeps_text() {
    let parser = FastUiParser::new(ParseOptions::new().with_number_coercion(false));
    let parsed = parser
        .parse(&raw(json!({"zip": "06103", "active": "yes"})))
        .expect("parse record");
    assert_eq!(parsed.record.get("zip"), Some(&FieldValue::from("06103")));
    assert_eq!(parsed.record.get("active"), Some(&FieldValue::Bool(true)));
}
