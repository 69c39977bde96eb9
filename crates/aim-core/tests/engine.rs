//! End-to-end tests for the mapping engine.

use chrono::NaiveDate;
use proptest::prelude::*;
use serde_json::{Value, json};

use aim_config::{
    ConfigurationError, FieldMappingSpec, MappingDescriptor, default_config, template_fields,
};
use aim_core::{EngineError, MappingEngine, PipelineOutcome, ProcessOptions};
use aim_map::MappingError;
use aim_model::{
    FieldValue, ProcessingResult, RawRecord, RuleKind, Stage, ValidationLevel, WarningCode,
};
use aim_transform::DataType;

fn raw(value: Value) -> RawRecord {
    match value {
        Value::Object(map) => map,
        other => panic!("expected an object, got {other}"),
    }
}

fn options() -> ProcessOptions {
    ProcessOptions::new().with_as_of(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap())
}

fn engine() -> MappingEngine {
    MappingEngine::new(default_config())
}

fn complete_life() -> RawRecord {
    raw(json!({
        "applicant_first_name": "john",
        "applicant_last_name": "SMITH",
        "applicant_birth_date": "01/15/1980",
        "applicant_gender": "M",
        "smoker_status": "no",
        "policy_face_amount": "$250,000",
        "policy_effective_date": "2024-01-01",
        "premium_mode": "A",
        "agent_notes": "call after 5pm"
    }))
}

#[test]
fn basic_life_record_maps_names_and_gender() {
    let input = raw(json!({"applicant_first_name": "John", "applicant_gender": "M"}));
    let result = engine().process_with(&input, "life", "basic", &options());

    assert!(result.is_success(), "{result:?}");
    let output = result.output().unwrap();
    assert_eq!(output.get("insured_info", "insured_first_name"), Some(&FieldValue::from("John")));
    assert_eq!(output.get("insured_info", "insured_gender"), Some(&FieldValue::from("Male")));
    assert_eq!(output.get("insured_info", "tobacco_use"), Some(&FieldValue::from("Non-Smoker")));
    assert_eq!(output.get("policy_info", "coverage_amount"), Some(&FieldValue::Null));
    assert!(result.warnings().is_empty());
}

#[test]
fn full_level_requires_birth_date() {
    let input = raw(json!({"applicant_first_name": "John", "applicant_gender": "M"}));
    let result = engine().process_with(&input, "life", "full", &options());

    assert_eq!(result.stage(), Some(Stage::Validation));
    assert_eq!(result.errors().len(), 1);
    let error = &result.errors()[0];
    assert_eq!(error.field, "applicant_birth_date");
    assert_eq!(error.rule_violated, RuleKind::Required);
    assert!(result.output().is_none());
}

#[test]
fn unmapped_value_passes_through_with_warning() {
    let input = raw(json!({"applicant_first_name": "John", "applicant_gender": "X"}));
    let result = engine().process_with(&input, "life", "basic", &options());

    assert!(result.is_success(), "{result:?}");
    let output = result.output().unwrap();
    assert_eq!(output.get("insured_info", "insured_gender"), Some(&FieldValue::from("X")));
    assert_eq!(result.warnings().len(), 1);
    assert_eq!(result.warnings()[0].code, WarningCode::UnmappedValue);
}

#[test]
fn negative_face_amount_fails_strict_range() {
    let input = raw(json!({"policy_face_amount": "-500"}));
    let result = engine().process_with(&input, "life", "strict", &options());

    assert!(!result.is_success());
    assert_eq!(result.stage(), Some(Stage::Validation));
    assert!(
        result
            .errors()
            .iter()
            .any(|error| error.field == "policy_face_amount" && error.rule_violated == RuleKind::Range)
    );
    assert!(result.output().is_none());
}

#[test]
fn missing_transformation_is_a_mapping_failure() {
    let mut config = default_config();
    config
        .field_mappings
        .get_mut("life")
        .unwrap()
        .insert(
            "applicant_first_name".to_string(),
            FieldMappingSpec::Descriptor(
                MappingDescriptor::new("insured_first_name").with_transformations(["shout"]),
            ),
        );

    assert!(matches!(
        MappingEngine::checked(config.clone()),
        Err(ConfigurationError::Inconsistent { .. })
    ));

    let engine = MappingEngine::new(config);
    let input = raw(json!({"applicant_first_name": "John"}));
    let err = engine
        .run(&input, "life", ValidationLevel::Basic, &options())
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::Mapping(MappingError::UnknownTransformation { ref field, ref transformation })
            if field == "insured_first_name" && transformation == "shout"
    ));

    let result = engine.process_with(&input, "life", "basic", &options());
    assert_eq!(result.stage(), Some(Stage::Mapping));
    let error = &result.errors()[0];
    assert_eq!(error.field, "insured_first_name");
    assert_eq!(error.rule_violated, RuleKind::Mapping);
    assert!(error.message.contains("shout"));
}

#[test]
fn complete_record_is_normalized_end_to_end() {
    let engine = engine();
    let result = engine.process_with(&complete_life(), "life", "strict", &options());
    let ProcessingResult::Success {
        output,
        warnings,
        metadata,
        ..
    } = result
    else {
        panic!("expected success: {result:?}");
    };

    assert_eq!(output.get("insured_info", "insured_first_name"), Some(&FieldValue::from("John")));
    assert_eq!(output.get("insured_info", "insured_last_name"), Some(&FieldValue::from("Smith")));
    assert_eq!(output.get("insured_info", "insured_birth_date"), Some(&FieldValue::from("1980-01-15")));
    assert_eq!(output.get("insured_info", "tobacco_use"), Some(&FieldValue::from("Non-Smoker")));
    assert_eq!(output.get("policy_info", "coverage_amount"), Some(&FieldValue::Float(250_000.0)));
    assert_eq!(output.get("policy_info", "premium_frequency"), Some(&FieldValue::from("Annual")));
    assert!(warnings.is_empty(), "{warnings:?}");

    assert_eq!(metadata.validation_level, ValidationLevel::Strict);
    assert_eq!(metadata.fields_parsed, 9);
    assert_eq!(metadata.fields_mapped, 8);
    assert_eq!(metadata.config_fingerprint, engine.fingerprint());
}

#[test]
fn senior_applicant_gets_review_warning() {
    let mut input = complete_life();
    input.insert("applicant_birth_date".to_string(), json!("1955-03-10"));
    let result = engine().process_with(&input, "life", "full", &options());
    assert!(result.is_success(), "{result:?}");
    assert!(
        result
            .warnings()
            .iter()
            .any(|warning| warning.code == WarningCode::AgeReview)
    );
}

#[test]
fn mapping_failure_keeps_validation_warnings() {
    let mut config = default_config();
    config.field_mappings.get_mut("life").unwrap().insert(
        "applicant_last_name".to_string(),
        FieldMappingSpec::Descriptor(
            MappingDescriptor::new("insured_last_name").with_data_type(DataType::Int),
        ),
    );
    let mut input = complete_life();
    input.insert("applicant_birth_date".to_string(), json!("1955-03-10"));

    let result = MappingEngine::new(config).process_with(&input, "life", "full", &options());
    assert_eq!(result.stage(), Some(Stage::Mapping));
    assert_eq!(result.errors()[0].field, "insured_last_name");
    assert!(
        result
            .warnings()
            .iter()
            .any(|warning| warning.code == WarningCode::AgeReview),
        "{result:?}"
    );
}

#[test]
fn request_and_configuration_failures() {
    let engine = engine();
    let input = raw(json!({"applicant_first_name": "John"}));

    let unknown = engine.process_with(&input, "pet", "basic", &options());
    assert_eq!(unknown.stage(), Some(Stage::Configuration));
    assert_eq!(unknown.errors()[0].rule_violated, RuleKind::Configuration);

    let level = engine.process_with(&input, "life", "paranoid", &options());
    assert_eq!(level.stage(), Some(Stage::Configuration));
    assert_eq!(level.errors()[0].field, "validation_level");

    let upper = engine.process_with(&input, " Life ", "BASIC", &options());
    assert!(upper.is_success(), "{upper:?}");
    assert_eq!(upper.product_type(), "life");
}

#[test]
fn deep_nesting_is_a_parsing_failure() {
    let input = raw(json!({"applicant": {"name": {"first": "John"}}}));
    let result = engine().process_with(&input, "life", "basic", &options());
    assert_eq!(result.stage(), Some(Stage::Parsing));
    let error = &result.errors()[0];
    assert_eq!(error.rule_violated, RuleKind::Parsing);
    assert_eq!(error.field, "applicant.name");
}

#[test]
fn rejected_outcome_carries_report() {
    let input = raw(json!({"applicant_gender": "M"}));
    let outcome = engine()
        .run(&input, "life", ValidationLevel::Basic, &options())
        .unwrap();
    let PipelineOutcome::Rejected { report } = outcome else {
        panic!("expected rejection");
    };
    assert_eq!(report.issues_for("applicant_first_name").count(), 1);
}

#[test]
fn results_serialize_with_status_tag() {
    let engine = engine();
    let input = raw(json!({"applicant_first_name": "John", "applicant_gender": "M"}));

    let success = serde_json::to_value(engine.process_with(&input, "life", "basic", &options())).unwrap();
    assert_eq!(success["status"], "success");
    assert_eq!(success["output"]["insured_info"]["insured_gender"], "Male");
    assert_eq!(success["metadata"]["validation_level"], "basic");

    let failure = serde_json::to_value(engine.process_with(&input, "life", "full", &options())).unwrap();
    assert_eq!(failure["status"], "error");
    assert_eq!(failure["stage"], "validation");
    assert_eq!(failure["errors"][0]["rule_violated"], "required");
}

fn life_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        Just(json!("John")),
        Just(json!("M")),
        Just(json!("Q")),
        Just(json!("N/A")),
        Just(json!("1980-01-15")),
        Just(json!("07/04/1960")),
        Just(json!("yes")),
        (-1_000i64..20_000_000).prop_map(|n| json!(n)),
        (0i64..100_000).prop_map(|n| json!(format!("{n},000"))),
    ]
}

fn life_input() -> impl Strategy<Value = RawRecord> {
    let fields = [
        "applicant_first_name",
        "applicant_last_name",
        "applicant_birth_date",
        "applicant_gender",
        "smoker_status",
        "policy_face_amount",
        "policy_effective_date",
        "premium_mode",
        "beneficiary_name",
        "agent_notes",
    ];
    proptest::collection::vec(proptest::option::of(life_value()), fields.len()).prop_map(
        move |values| {
            fields
                .iter()
                .zip(values)
                .filter_map(|(field, value)| value.map(|value| ((*field).to_string(), value)))
                .collect()
        },
    )
}

fn level() -> impl Strategy<Value = &'static str> {
    prop_oneof![Just("basic"), Just("full"), Just("strict")]
}

proptest! {
    #[test]
    fn processing_is_deterministic(input in life_input(), level in level()) {
        let engine = engine();
        let first = engine.process_with(&input, "life", level, &options());
        let second = engine.process_with(&input, "life", level, &options());
        prop_assert_eq!(first, second);
    }

    #[test]
    fn output_only_holds_template_fields(input in life_input(), level in level()) {
        let engine = engine();
        let result = engine.process_with(&input, "life", level, &options());
        if let Some(output) = result.output() {
            let template = engine.config().template_for("life").unwrap();
            let declared = template_fields(template);
            for (section, field, _) in output.entries() {
                prop_assert!(template.contains_key(section));
                prop_assert!(declared.contains(field), "{field} leaked into {section}");
            }
        }
    }

    #[test]
    fn passing_strict_implies_passing_lower_levels(input in life_input()) {
        let engine = engine();
        let strict = engine.process_with(&input, "life", "strict", &options());
        if strict.is_success() {
            for level in ["basic", "full"] {
                let result = engine.process_with(&input, "life", level, &options());
                prop_assert!(result.stage() != Some(Stage::Validation), "{level}: {result:?}");
            }
        }
    }
}
