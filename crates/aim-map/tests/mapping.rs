//! Tests for field mapping against the built-in product tables.

use std::collections::BTreeMap;

use proptest::prelude::*;

use aim_config::{
    EngineConfig, FieldMappingSpec, MappingDescriptor, ProductMappings, ProductTransformations,
    TransformStep, default_config,
};
use aim_map::{FieldMapper, MappingError, MappingKind, invert, lookup, mapping_summary};
use aim_model::{FieldValue, Record, WarningCode};
use aim_transform::{DataType, TransformationRule};

fn record(fields: &[(&str, FieldValue)]) -> Record {
    fields.iter().cloned().collect()
}

#[test]
fn life_record_is_renamed_and_translated() {
    let config = default_config();
    let mapper = FieldMapper::for_product(&config, "life").unwrap();
    let input = record(&[
        ("applicant_first_name", "  john ".into()),
        ("applicant_gender", "M".into()),
        ("policy_face_amount", FieldValue::Integer(250_000)),
        ("premium_mode", "Q".into()),
        ("smoker_status", FieldValue::Bool(false)),
        ("agent_code", "X12".into()),
    ]);

    let mapped = mapper.map(&input).unwrap();
    let out = &mapped.record;
    assert_eq!(out.get("insured_first_name"), Some(&FieldValue::from("John")));
    assert_eq!(out.get("insured_gender"), Some(&FieldValue::from("Male")));
    assert_eq!(out.get("coverage_amount"), Some(&FieldValue::Float(250_000.0)));
    assert_eq!(out.get("premium_frequency"), Some(&FieldValue::from("Quarterly")));
    assert_eq!(out.get("tobacco_use"), Some(&FieldValue::from("Non-Smoker")));
    assert_eq!(mapped.dropped_fields, vec!["agent_code".to_string()]);
    assert!(mapped.warnings.is_empty());
}

#[test]
fn unmapped_value_keeps_original_with_warning() {
    let config = default_config();
    let mapper = FieldMapper::for_product(&config, "life").unwrap();
    let mapped = mapper
        .map(&record(&[("applicant_gender", "X".into())]))
        .unwrap();
    assert_eq!(mapped.record.get("insured_gender"), Some(&FieldValue::from("X")));
    assert_eq!(mapped.warnings.len(), 1);
    let warning = &mapped.warnings[0];
    assert_eq!(warning.code, WarningCode::UnmappedValue);
    assert_eq!(warning.field.as_deref(), Some("insured_gender"));
    assert!(warning.message.contains("unmapped value for field insured_gender"));
}

#[test]
fn annuity_term_is_capped_by_condition() {
    let config = default_config();
    let mapper = FieldMapper::for_product(&config, "annuity").unwrap();
    let long = mapper
        .map(&record(&[("annuity_term_years", "45".into())]))
        .unwrap();
    assert_eq!(long.record.get("payout_term_years"), Some(&FieldValue::Integer(30)));

    let short = mapper
        .map(&record(&[("annuity_term_years", FieldValue::Integer(20))]))
        .unwrap();
    assert_eq!(short.record.get("payout_term_years"), Some(&FieldValue::Integer(20)));
}

#[test]
fn null_values_pass_through() {
    let config = default_config();
    let mapper = FieldMapper::for_product(&config, "life").unwrap();
    let mapped = mapper
        .map(&record(&[("applicant_gender", FieldValue::Null), ("applicant_last_name", FieldValue::Null)]))
        .unwrap();
    assert_eq!(mapped.record.get("insured_gender"), Some(&FieldValue::Null));
    assert_eq!(mapped.record.get("insured_last_name"), Some(&FieldValue::Null));
    assert!(mapped.warnings.is_empty());
}

#[test]
fn missing_transformation_names_field_and_rule() {
    let mut config = default_config();
    config.field_mappings.insert(
        "life".to_string(),
        ProductMappings::from([(
            "applicant_first_name".to_string(),
            FieldMappingSpec::Descriptor(
                MappingDescriptor::new("insured_first_name").with_transformations(["shout"]),
            ),
        )]),
    );
    let mapper = FieldMapper::for_product(&config, "life").unwrap();
    let err = mapper
        .map(&record(&[("applicant_first_name", "John".into())]))
        .unwrap_err();
    assert_eq!(
        err,
        MappingError::UnknownTransformation {
            field: "insured_first_name".to_string(),
            transformation: "shout".to_string(),
        }
    );
    assert!(err.to_string().contains("shout"));
}

#[test]
fn failing_cast_is_a_mapping_error() {
    let config = default_config();
    let mapper = FieldMapper::for_product(&config, "life").unwrap();
    let err = mapper
        .map(&record(&[("applicant_age", "forty".into())]))
        .unwrap_err();
    assert!(matches!(err, MappingError::TransformationFailed { .. }));
    assert_eq!(err.field(), Some("insured_age"));
    assert_eq!(err.transformation(), Some("data_type"));
}

#[test]
fn duplicate_targets_keep_first_source() {
    let mappings = ProductMappings::from([
        ("a_name".to_string(), FieldMappingSpec::Direct("name".to_string())),
        ("b_name".to_string(), FieldMappingSpec::Direct("name".to_string())),
    ]);
    let mapper = FieldMapper::new(&mappings, None);
    let mapped = mapper
        .map(&record(&[("a_name", "first".into()), ("b_name", "second".into())]))
        .unwrap();
    assert_eq!(mapped.record.get("name"), Some(&FieldValue::from("first")));
    assert_eq!(mapped.warnings[0].code, WarningCode::DuplicateTarget);
}

#[test]
fn descriptor_scale_and_inline_steps() {
    let mut descriptor = MappingDescriptor::new("premium_cents").with_data_type(DataType::Float);
    descriptor.scale_factor = Some(100.0);
    let mappings = ProductMappings::from([(
        "premium".to_string(),
        FieldMappingSpec::Descriptor(descriptor),
    )]);
    let transformations = ProductTransformations {
        named: BTreeMap::new(),
        fields: BTreeMap::from([(
            "premium_cents".to_string(),
            vec![
                TransformStep::Inline(TransformationRule::Round { decimals: 0 }),
                TransformStep::Inline(TransformationRule::DataType { to: DataType::Int }),
            ],
        )]),
    };
    let mapper = FieldMapper::new(&mappings, Some(&transformations));
    let mapped = mapper
        .map(&record(&[("premium", "12.346".into())]))
        .unwrap();
    assert_eq!(mapped.record.get("premium_cents"), Some(&FieldValue::Integer(1235)));
}

#[test]
fn unknown_product_has_no_mapper() {
    let config = default_config();
    assert!(matches!(
        FieldMapper::for_product(&config, "pet"),
        Err(MappingError::UnknownProduct { .. })
    ));
}

#[test]
fn life_summary_counts_kinds() {
    let summary = mapping_summary(&default_config(), "life").unwrap();
    assert_eq!(summary.total_mappings, 11);
    assert_eq!(summary.simple_mappings + summary.complex_mappings, 11);
    assert_eq!(summary.complex_mappings, 5);

    let coverage = summary
        .fields
        .iter()
        .find(|field| field.source_field == "policy_face_amount")
        .unwrap();
    assert_eq!(coverage.kind, MappingKind::Complex);
    assert_eq!(coverage.steps, vec!["data_type:float", "usd_amount", "round"]);

    let first = summary
        .fields
        .iter()
        .find(|field| field.source_field == "applicant_first_name")
        .unwrap();
    assert_eq!(first.kind, MappingKind::Simple);
    assert_eq!(first.steps, vec!["trim", "title"]);
}

fn rename_config(fields: &[String]) -> EngineConfig {
    let mut config = EngineConfig::default();
    config.field_mappings.insert(
        "test".to_string(),
        fields
            .iter()
            .map(|field| (field.clone(), FieldMappingSpec::Direct(format!("{field}_out"))))
            .collect(),
    );
    config
}

proptest! {
    #[test]
    fn rename_only_mapping_preserves_values(
        values in proptest::collection::btree_map("[a-z]{1,8}", "[A-Za-z0-9 ]{0,12}", 0..8)
    ) {
        let fields: Vec<String> = values.keys().cloned().collect();
        let config = rename_config(&fields);
        let mapper = FieldMapper::for_product(&config, "test").unwrap();
        let input: Record = values
            .iter()
            .map(|(field, value)| (field.clone(), FieldValue::from(value.as_str())))
            .collect();

        let first = mapper.map(&input).unwrap();
        prop_assert_eq!(first.record.len(), input.len());
        for (field, value) in &input {
            prop_assert_eq!(first.record.get(&format!("{field}_out")), Some(value));
        }
        prop_assert_eq!(mapper.map(&input).unwrap(), first);
    }

    #[test]
    fn bijective_tables_round_trip(
        table in proptest::collection::btree_map("[A-Z]{1,3}", "[a-z]{4,10}", 1..6)
    ) {
        let table: BTreeMap<String, FieldValue> = table
            .into_iter()
            .map(|(key, value)| (key, FieldValue::from(value)))
            .collect();
        prop_assume!(invert(&table).is_some());
        let inverse = invert(&table).unwrap();
        for key in table.keys() {
            let forward = lookup(&table, &FieldValue::from(key.as_str())).unwrap();
            prop_assert_eq!(lookup(&inverse, forward), Some(&FieldValue::from(key.as_str())));
        }
    }
}
