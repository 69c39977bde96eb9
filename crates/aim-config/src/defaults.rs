//! Built-in configuration used when no configuration directory is given.
//!
//! Covers the `life`, `annuity` and `health` products. `aim init-config`
//! writes these documents out as a starting point for custom setups.

use std::collections::BTreeMap;

use aim_model::FieldValue;
use aim_transform::{DataType, TransformationRule};

use crate::rules::{
    AgeLimits, ConsistencyCheck, CoverageLimits, FieldDependency, FieldType, FormatRule,
    LevelRules, RangeRule, RuleSet, ValidationRuleTable,
};
use crate::schema::{
    ConditionOperator, ConditionValue, EngineConfig, FieldMappingSpec, MappingCondition,
    MappingDescriptor, OutputTemplate, ProductMappings, ProductTransformations, TemplateSection,
    TransformStep,
};

pub fn default_config() -> EngineConfig {
    EngineConfig {
        field_mappings: BTreeMap::from([
            ("life".to_string(), life_mappings()),
            ("annuity".to_string(), annuity_mappings()),
            ("health".to_string(), health_mappings()),
        ]),
        validation_rules: default_validation_rules(),
        transformations: BTreeMap::from([
            ("life".to_string(), life_transformations()),
            ("annuity".to_string(), annuity_transformations()),
            ("health".to_string(), health_transformations()),
        ]),
        output_templates: BTreeMap::from([
            ("life".to_string(), life_template()),
            ("annuity".to_string(), annuity_template()),
            ("health".to_string(), health_template()),
        ]),
    }
}

fn rename(target: &str) -> FieldMappingSpec {
    FieldMappingSpec::Direct(target.to_string())
}

fn described(descriptor: MappingDescriptor) -> FieldMappingSpec {
    FieldMappingSpec::Descriptor(descriptor)
}

fn mappings<const N: usize>(entries: [(&str, FieldMappingSpec); N]) -> ProductMappings {
    entries
        .into_iter()
        .map(|(source, spec)| (source.to_string(), spec))
        .collect()
}

fn life_mappings() -> ProductMappings {
    mappings([
        ("applicant_first_name", rename("insured_first_name")),
        ("applicant_last_name", rename("insured_last_name")),
        ("applicant_birth_date", rename("insured_birth_date")),
        (
            "applicant_gender",
            described(MappingDescriptor::new("insured_gender").with_value_mapping([
                ("M", "Male"),
                ("F", "Female"),
                ("Male", "Male"),
                ("Female", "Female"),
            ])),
        ),
        (
            "applicant_age",
            described(MappingDescriptor::new("insured_age").with_data_type(DataType::Int)),
        ),
        (
            "smoker_status",
            described(
                MappingDescriptor::new("tobacco_use")
                    .with_value_mapping([("true", "Smoker"), ("false", "Non-Smoker")]),
            ),
        ),
        (
            "policy_face_amount",
            described(MappingDescriptor::new("coverage_amount").with_data_type(DataType::Float)),
        ),
        ("policy_effective_date", rename("policy_start_date")),
        (
            "premium_mode",
            described(MappingDescriptor::new("premium_frequency").with_value_mapping([
                ("A", "Annual"),
                ("SA", "Semi-Annual"),
                ("Q", "Quarterly"),
                ("M", "Monthly"),
            ])),
        ),
        ("beneficiary_name", rename("beneficiary_name")),
        ("beneficiary_relationship", rename("beneficiary_relationship")),
    ])
}

fn annuity_mappings() -> ProductMappings {
    let mut term = MappingDescriptor::new("payout_term_years").with_data_type(DataType::Int);
    term.conditions.push(MappingCondition {
        operator: ConditionOperator::Gt,
        value: ConditionValue::One(FieldValue::Integer(30)),
        result: FieldValue::Integer(30),
    });
    mappings([
        ("annuitant_first_name", rename("annuitant_first_name")),
        ("annuitant_last_name", rename("annuitant_last_name")),
        ("annuitant_birth_date", rename("annuitant_birth_date")),
        (
            "initial_premium",
            described(MappingDescriptor::new("premium_amount").with_data_type(DataType::Float)),
        ),
        ("annuity_start_date", rename("contract_start_date")),
        ("annuity_term_years", described(term)),
        (
            "payout_option",
            described(MappingDescriptor::new("payout_option").with_value_mapping([
                ("L", "Life"),
                ("JL", "Joint Life"),
                ("PC", "Period Certain"),
            ])),
        ),
    ])
}

fn health_mappings() -> ProductMappings {
    mappings([
        ("member_first_name", rename("member_first_name")),
        ("member_last_name", rename("member_last_name")),
        ("member_birth_date", rename("member_birth_date")),
        (
            "plan_type",
            described(MappingDescriptor::new("coverage_type").with_transformations(["upper"])),
        ),
        (
            "deductible_amount",
            described(MappingDescriptor::new("deductible").with_data_type(DataType::Float)),
        ),
    ])
}

fn usd_amount() -> TransformationRule {
    TransformationRule::CurrencyConversion {
        from_currency: "USD".to_string(),
        to_currency: "USD".to_string(),
        rates: aim_transform::rules::default_rates(),
    }
}

fn name_steps() -> Vec<TransformStep> {
    vec![
        TransformStep::Named("trim".to_string()),
        TransformStep::Named("title".to_string()),
    ]
}

fn amount_steps() -> Vec<TransformStep> {
    vec![
        TransformStep::Named("usd_amount".to_string()),
        TransformStep::Inline(TransformationRule::Round { decimals: 2 }),
    ]
}

fn life_transformations() -> ProductTransformations {
    ProductTransformations {
        named: BTreeMap::from([("usd_amount".to_string(), usd_amount())]),
        fields: BTreeMap::from([
            ("insured_first_name".to_string(), name_steps()),
            ("insured_last_name".to_string(), name_steps()),
            ("coverage_amount".to_string(), amount_steps()),
        ]),
    }
}

fn annuity_transformations() -> ProductTransformations {
    ProductTransformations {
        named: BTreeMap::from([("usd_amount".to_string(), usd_amount())]),
        fields: BTreeMap::from([
            ("annuitant_first_name".to_string(), name_steps()),
            ("annuitant_last_name".to_string(), name_steps()),
            ("premium_amount".to_string(), amount_steps()),
        ]),
    }
}

fn health_transformations() -> ProductTransformations {
    ProductTransformations {
        named: BTreeMap::new(),
        fields: BTreeMap::from([
            ("member_first_name".to_string(), name_steps()),
            ("member_last_name".to_string(), name_steps()),
        ]),
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| (*value).to_string()).collect()
}

fn types<const N: usize>(entries: [(&str, FieldType); N]) -> BTreeMap<String, FieldType> {
    entries
        .into_iter()
        .map(|(field, kind)| (field.to_string(), kind))
        .collect()
}

fn choices(values: &[&str]) -> Vec<FieldValue> {
    values.iter().map(|value| FieldValue::from(*value)).collect()
}

fn at_least(min: f64) -> RangeRule {
    RangeRule {
        min: Some(min),
        ..RangeRule::default()
    }
}

fn positive() -> RangeRule {
    RangeRule {
        exclusive_min: Some(0.0),
        ..RangeRule::default()
    }
}

fn date_order(earlier: &str, later: &str) -> ConsistencyCheck {
    ConsistencyCheck::DateOrder {
        earlier_field: earlier.to_string(),
        later_field: later.to_string(),
    }
}

fn default_validation_rules() -> ValidationRuleTable {
    let mut table = ValidationRuleTable::new();

    table.insert(
        "base",
        LevelRules {
            basic: RuleSet {
                field_types: types([
                    ("policy_face_amount", FieldType::Number),
                    ("initial_premium", FieldType::Number),
                    ("deductible_amount", FieldType::Number),
                ]),
                ..RuleSet::default()
            },
            ..LevelRules::default()
        },
    );

    table.insert(
        "life",
        LevelRules {
            basic: RuleSet {
                required_fields: strings(&["applicant_first_name"]),
                field_types: types([
                    ("applicant_first_name", FieldType::String),
                    ("applicant_last_name", FieldType::String),
                    ("applicant_birth_date", FieldType::Date),
                    ("applicant_age", FieldType::Integer),
                    ("policy_effective_date", FieldType::Date),
                ]),
                ..RuleSet::default()
            },
            full: RuleSet {
                required_fields: strings(&["applicant_birth_date"]),
                allowed_values: BTreeMap::from([(
                    "premium_mode".to_string(),
                    choices(&["A", "SA", "Q", "M"]),
                )]),
                field_ranges: BTreeMap::from([("policy_face_amount".to_string(), positive())]),
                field_formats: BTreeMap::from([(
                    "applicant_first_name".to_string(),
                    FormatRule {
                        regex: Some(r"^[A-Za-z][A-Za-z .'\-]*$".to_string()),
                        date_format: None,
                    },
                )]),
                age_limits: Some(AgeLimits {
                    birth_date_field: "applicant_birth_date".to_string(),
                    min_age: Some(18),
                    max_age: Some(80),
                    warning_age: Some(65),
                }),
                ..RuleSet::default()
            },
            strict: RuleSet {
                required_fields: strings(&["applicant_last_name"]),
                allowed_values: BTreeMap::from([(
                    "applicant_gender".to_string(),
                    choices(&["M", "F", "Male", "Female"]),
                )]),
                coverage_limits: Some(CoverageLimits {
                    field: "policy_face_amount".to_string(),
                    min_amount: Some(10_000.0),
                    max_amount: Some(10_000_000.0),
                }),
                field_dependencies: vec![FieldDependency {
                    source_field: "beneficiary_name".to_string(),
                    dependent_field: "beneficiary_relationship".to_string(),
                    condition: Default::default(),
                }],
                consistency_checks: vec![
                    date_order("applicant_birth_date", "policy_effective_date"),
                    ConsistencyCheck::AgeMatchesBirthDate {
                        age_field: "applicant_age".to_string(),
                        birth_date_field: "applicant_birth_date".to_string(),
                        tolerance_years: 1,
                    },
                ],
                ..RuleSet::default()
            },
        },
    );

    table.insert(
        "annuity",
        LevelRules {
            basic: RuleSet {
                required_fields: strings(&["annuitant_first_name"]),
                field_types: types([
                    ("annuitant_birth_date", FieldType::Date),
                    ("annuity_start_date", FieldType::Date),
                    ("annuity_term_years", FieldType::Integer),
                ]),
                ..RuleSet::default()
            },
            full: RuleSet {
                required_fields: strings(&["annuitant_birth_date", "initial_premium"]),
                field_ranges: BTreeMap::from([
                    ("initial_premium".to_string(), at_least(1_000.0)),
                    ("annuity_term_years".to_string(), positive()),
                ]),
                allowed_values: BTreeMap::from([(
                    "payout_option".to_string(),
                    choices(&["L", "JL", "PC"]),
                )]),
                age_limits: Some(AgeLimits {
                    birth_date_field: "annuitant_birth_date".to_string(),
                    min_age: Some(18),
                    max_age: Some(85),
                    warning_age: Some(75),
                }),
                ..RuleSet::default()
            },
            strict: RuleSet {
                required_fields: strings(&["annuitant_last_name", "annuity_start_date"]),
                coverage_limits: Some(CoverageLimits {
                    field: "initial_premium".to_string(),
                    min_amount: Some(1_000.0),
                    max_amount: Some(2_000_000.0),
                }),
                consistency_checks: vec![date_order("annuitant_birth_date", "annuity_start_date")],
                ..RuleSet::default()
            },
        },
    );

    table.insert(
        "health",
        LevelRules {
            basic: RuleSet {
                required_fields: strings(&["member_first_name"]),
                field_types: types([("member_birth_date", FieldType::Date)]),
                ..RuleSet::default()
            },
            full: RuleSet {
                required_fields: strings(&["member_birth_date", "plan_type"]),
                allowed_values: BTreeMap::from([(
                    "plan_type".to_string(),
                    choices(&["HMO", "PPO", "EPO", "POS"]),
                )]),
                field_ranges: BTreeMap::from([("deductible_amount".to_string(), at_least(0.0))]),
                age_limits: Some(AgeLimits {
                    birth_date_field: "member_birth_date".to_string(),
                    min_age: Some(0),
                    max_age: Some(64),
                    warning_age: None,
                }),
                ..RuleSet::default()
            },
            strict: RuleSet {
                required_fields: strings(&["member_last_name"]),
                coverage_limits: Some(CoverageLimits {
                    field: "deductible_amount".to_string(),
                    min_amount: Some(0.0),
                    max_amount: Some(20_000.0),
                }),
                ..RuleSet::default()
            },
        },
    );

    table
}

fn section(fields: &[&str]) -> TemplateSection {
    TemplateSection::new(fields.iter().copied())
}

fn life_template() -> OutputTemplate {
    BTreeMap::from([
        (
            "insured_info".to_string(),
            section(&[
                "insured_first_name",
                "insured_last_name",
                "insured_birth_date",
                "insured_gender",
                "insured_age",
                "tobacco_use",
            ])
            .with_default("insured_gender", "Unknown")
            .with_default("tobacco_use", "Non-Smoker"),
        ),
        (
            "policy_info".to_string(),
            section(&["coverage_amount", "policy_start_date", "premium_frequency"])
                .with_default("premium_frequency", "Monthly"),
        ),
        (
            "beneficiary_info".to_string(),
            section(&["beneficiary_name", "beneficiary_relationship"]),
        ),
        (
            "calculation_inputs".to_string(),
            section(&["coverage_amount", "insured_birth_date", "premium_frequency"]),
        ),
    ])
}

fn annuity_template() -> OutputTemplate {
    BTreeMap::from([
        (
            "annuitant_info".to_string(),
            section(&[
                "annuitant_first_name",
                "annuitant_last_name",
                "annuitant_birth_date",
            ]),
        ),
        (
            "contract_info".to_string(),
            section(&[
                "premium_amount",
                "contract_start_date",
                "payout_term_years",
                "payout_option",
            ])
            .with_default("payout_option", "Life"),
        ),
    ])
}

fn health_template() -> OutputTemplate {
    BTreeMap::from([
        (
            "member_info".to_string(),
            section(&["member_first_name", "member_last_name", "member_birth_date"]),
        ),
        (
            "coverage_info".to_string(),
            section(&["coverage_type", "deductible"]).with_default("deductible", 0_i64),
        ),
    ])
}
