//! Validation rule schema (`validation_rules.json`).
//!
//! The document holds a `base` block shared by every product plus one block
//! per product. Each block lists rule sets per validation level:
//!
//! ```json
//! {
//!   "base": { "basic": { "field_types": { "policy_face_amount": "number" } } },
//!   "life": {
//!     "basic": { "required_fields": ["applicant_first_name"] },
//!     "full": { "field_ranges": { "policy_face_amount": { "exclusive_min": 0 } } }
//!   }
//! }
//! ```

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use aim_model::{FieldValue, ValidationLevel};

/// Key of the block shared by all products.
pub const BASE_RULES_KEY: &str = "base";

/// `validation_rules.json`: `base` plus per-product level blocks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationRuleTable {
    blocks: BTreeMap<String, LevelRules>,
}

impl ValidationRuleTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn base(&self) -> Option<&LevelRules> {
        self.blocks.get(BASE_RULES_KEY)
    }

    pub fn product(&self, product: &str) -> Option<&LevelRules> {
        self.blocks.get(product)
    }

    pub fn insert(&mut self, key: impl Into<String>, rules: LevelRules) {
        self.blocks.insert(key.into(), rules);
    }

    /// Product names with a block, excluding `base`.
    pub fn products(&self) -> impl Iterator<Item = &str> {
        self.blocks
            .keys()
            .map(String::as_str)
            .filter(|key| *key != BASE_RULES_KEY)
    }

    pub fn blocks(&self) -> impl Iterator<Item = (&str, &LevelRules)> {
        self.blocks.iter().map(|(key, rules)| (key.as_str(), rules))
    }

    /// Rule set declared at exactly `level` for `product`, product entries
    /// overlaid on `base`.
    pub fn rules_at(&self, product: &str, level: ValidationLevel) -> RuleSet {
        let mut merged = self
            .base()
            .map(|rules| rules.at(level).clone())
            .unwrap_or_default();
        if let Some(product_rules) = self.product(product) {
            merged.overlay(product_rules.at(level));
        }
        merged
    }

    /// Whether any rule at any level applies to `product`.
    pub fn has_rules_for(&self, product: &str) -> bool {
        ValidationLevel::ALL
            .iter()
            .any(|level| !self.rules_at(product, *level).is_empty())
    }
}

/// Rule sets of one block, one per level.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LevelRules {
    #[serde(skip_serializing_if = "RuleSet::is_empty")]
    pub basic: RuleSet,
    #[serde(alias = "business", skip_serializing_if = "RuleSet::is_empty")]
    pub full: RuleSet,
    #[serde(skip_serializing_if = "RuleSet::is_empty")]
    pub strict: RuleSet,
}

impl LevelRules {
    pub fn at(&self, level: ValidationLevel) -> &RuleSet {
        match level {
            ValidationLevel::Basic => &self.basic,
            ValidationLevel::Full => &self.full,
            ValidationLevel::Strict => &self.strict,
        }
    }
}

/// Rules enforced at one validation level.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuleSet {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub required_fields: Vec<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub field_types: BTreeMap<String, FieldType>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub allowed_values: BTreeMap<String, Vec<FieldValue>>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub field_ranges: BTreeMap<String, RangeRule>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub field_formats: BTreeMap<String, FormatRule>,
    #[serde(alias = "age_validations", skip_serializing_if = "Option::is_none")]
    pub age_limits: Option<AgeLimits>,
    #[serde(alias = "coverage_validations", skip_serializing_if = "Option::is_none")]
    pub coverage_limits: Option<CoverageLimits>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub field_dependencies: Vec<FieldDependency>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub consistency_checks: Vec<ConsistencyCheck>,
}

impl RuleSet {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Overlays `other` onto `self`: maps overlay per key, lists are unioned
    /// and single rule objects are replaced.
    pub fn overlay(&mut self, other: &RuleSet) {
        union_into(&mut self.required_fields, &other.required_fields);
        self.field_types
            .extend(other.field_types.iter().map(|(k, v)| (k.clone(), *v)));
        self.allowed_values.extend(other.allowed_values.clone());
        self.field_ranges.extend(other.field_ranges.clone());
        self.field_formats.extend(other.field_formats.clone());
        if other.age_limits.is_some() {
            self.age_limits.clone_from(&other.age_limits);
        }
        if other.coverage_limits.is_some() {
            self.coverage_limits.clone_from(&other.coverage_limits);
        }
        union_into(&mut self.field_dependencies, &other.field_dependencies);
        union_into(&mut self.consistency_checks, &other.consistency_checks);
    }

    /// Every field name the rule set refers to.
    pub fn referenced_fields(&self) -> Vec<&str> {
        let mut fields: Vec<&str> = self.required_fields.iter().map(String::as_str).collect();
        fields.extend(self.field_types.keys().map(String::as_str));
        fields.extend(self.allowed_values.keys().map(String::as_str));
        fields.extend(self.field_ranges.keys().map(String::as_str));
        fields.extend(self.field_formats.keys().map(String::as_str));
        if let Some(age) = &self.age_limits {
            fields.push(&age.birth_date_field);
        }
        if let Some(coverage) = &self.coverage_limits {
            fields.push(&coverage.field);
        }
        for dependency in &self.field_dependencies {
            fields.push(&dependency.source_field);
            fields.push(&dependency.dependent_field);
        }
        for check in &self.consistency_checks {
            match check {
                ConsistencyCheck::DateOrder {
                    earlier_field,
                    later_field,
                } => fields.extend([earlier_field.as_str(), later_field.as_str()]),
                ConsistencyCheck::AgeMatchesBirthDate {
                    age_field,
                    birth_date_field,
                    ..
                } => fields.extend([age_field.as_str(), birth_date_field.as_str()]),
            }
        }
        fields.sort_unstable();
        fields.dedup();
        fields
    }
}

fn union_into<T: Clone + PartialEq>(target: &mut Vec<T>, extra: &[T]) {
    for item in extra {
        if !target.contains(item) {
            target.push(item.clone());
        }
    }
}

/// Expected scalar type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Integer,
    Number,
    Float,
    Boolean,
    Date,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Float => "float",
            Self::Boolean => "boolean",
            Self::Date => "date",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Numeric bounds. Any subset of the four bounds may be given.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RangeRule {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclusive_min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclusive_max: Option<f64>,
}

/// Text pattern and/or date layout a value must follow.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FormatRule {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regex: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_format: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AgeLimits {
    #[serde(default = "default_birth_date_field")]
    pub birth_date_field: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_age: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_age: Option<u32>,
    /// Ages at or above this produce a review warning, not an error.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning_age: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CoverageLimits {
    #[serde(default = "default_coverage_field")]
    pub field: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_amount: Option<f64>,
}

fn default_birth_date_field() -> String {
    "birth_date".to_string()
}

fn default_coverage_field() -> String {
    "coverage_amount".to_string()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DependencyCondition {
    #[default]
    RequiredIfPresent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldDependency {
    pub source_field: String,
    pub dependent_field: String,
    #[serde(default)]
    pub condition: DependencyCondition,
}

/// Cross-field checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", deny_unknown_fields)]
pub enum ConsistencyCheck {
    /// When both dates are present, `earlier_field` must fall before `later_field`.
    DateOrder {
        earlier_field: String,
        later_field: String,
    },
    /// A stated age must agree with the age computed from the birth date.
    AgeMatchesBirthDate {
        age_field: String,
        birth_date_field: String,
        #[serde(default = "default_tolerance_years")]
        tolerance_years: u32,
    },
}

fn default_tolerance_years() -> u32 {
    1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn business_is_an_alias_of_full() {
        let rules: LevelRules =
            serde_json::from_str(r#"{"business": {"required_fields": ["a"]}}"#).unwrap();
        assert_eq!(rules.full.required_fields, vec!["a".to_string()]);
    }

    #[test]
    fn overlay_unions_lists_and_replaces_objects() {
        let mut base = RuleSet {
            required_fields: vec!["a".into(), "b".into()],
            coverage_limits: Some(CoverageLimits {
                field: "x".into(),
                min_amount: Some(1.0),
                max_amount: None,
            }),
            ..RuleSet::default()
        };
        let product = RuleSet {
            required_fields: vec!["b".into(), "c".into()],
            coverage_limits: Some(CoverageLimits {
                field: "x".into(),
                min_amount: Some(5.0),
                max_amount: Some(9.0),
            }),
            ..RuleSet::default()
        };
        base.overlay(&product);
        assert_eq!(base.required_fields, vec!["a", "b", "c"]);
        assert_eq!(
            base.coverage_limits.as_ref().and_then(|c| c.max_amount),
            Some(9.0)
        );
    }

    #[test]
    fn unknown_rule_keys_are_rejected() {
        let parsed = serde_json::from_str::<RuleSet>(r#"{"required": ["a"]}"#);
        assert!(parsed.is_err());
    }
}
