//! Individual rule checks.
//!
//! Checks run against one compiled rule set at a time and append to a shared
//! [`Findings`], which deduplicates across levels.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use regex::Regex;

use aim_config::{
    AgeLimits, ConsistencyCheck, CoverageLimits, DependencyCondition, FieldType, RangeRule,
    RuleSet,
};
use aim_model::{FieldValue, Record, RuleKind, ValidationIssue, ValidationReport, Warning, WarningCode};
use aim_transform::normalization::{age_on, parse_date};

/// Rule set with its regular expressions compiled.
#[derive(Debug, Clone, Default)]
pub struct CompiledRuleSet {
    pub rules: RuleSet,
    pub patterns: BTreeMap<String, Regex>,
}

impl CompiledRuleSet {
    pub fn compile(rules: RuleSet) -> Result<Self, String> {
        let mut patterns = BTreeMap::new();
        for (field, format) in &rules.field_formats {
            if let Some(pattern) = &format.regex {
                let regex = Regex::new(pattern)
                    .map_err(|e| format!("invalid regex for '{field}': {e}"))?;
                patterns.insert(field.clone(), regex);
            }
        }
        Ok(Self { rules, patterns })
    }
}

/// Accumulated issues and warnings for one record.
pub struct Findings<'a> {
    record: &'a Record,
    as_of: NaiveDate,
    report: ValidationReport,
    type_failures: BTreeSet<String>,
}

impl<'a> Findings<'a> {
    pub fn new(record: &'a Record, as_of: NaiveDate, report: ValidationReport) -> Self {
        Self {
            record,
            as_of,
            report,
            type_failures: BTreeSet::new(),
        }
    }

    pub fn into_report(self) -> ValidationReport {
        self.report
    }

    fn issue(&mut self, field: &str, rule: RuleKind, message: String) {
        let issue = ValidationIssue::new(field, rule, message);
        if !self.report.issues.contains(&issue) {
            self.report.issues.push(issue);
        }
    }

    fn warning(&mut self, field: &str, code: WarningCode, message: String) {
        let warning = Warning::for_field(field, code, message);
        if !self.report.warnings.contains(&warning) {
            self.report.warnings.push(warning);
        }
    }

    /// Present value of a field that has not failed a type check.
    fn checked_value(&self, field: &str) -> Option<&'a FieldValue> {
        if self.type_failures.contains(field) {
            return None;
        }
        self.record.value(field)
    }

    pub fn run(&mut self, compiled: &CompiledRuleSet) {
        let rules = &compiled.rules;
        self.required(&rules.required_fields);
        self.types(&rules.field_types);
        self.allowed_values(&rules.allowed_values);
        self.ranges(&rules.field_ranges);
        self.formats(compiled);
        if let Some(limits) = &rules.age_limits {
            self.age_limits(limits);
        }
        if let Some(limits) = &rules.coverage_limits {
            self.coverage_limits(limits);
        }
        for dependency in &rules.field_dependencies {
            match dependency.condition {
                DependencyCondition::RequiredIfPresent => {
                    if self.record.has_value(&dependency.source_field)
                        && !self.record.has_value(&dependency.dependent_field)
                    {
                        self.issue(
                            &dependency.dependent_field,
                            RuleKind::Dependency,
                            format!(
                                "Field '{}' is required when '{}' is provided",
                                dependency.dependent_field, dependency.source_field
                            ),
                        );
                    }
                }
            }
        }
        for check in &rules.consistency_checks {
            self.consistency(check);
        }
    }

    fn required(&mut self, fields: &[String]) {
        for field in fields {
            if !self.record.has_value(field) {
                self.issue(
                    field,
                    RuleKind::Required,
                    format!("Required field '{field}' is missing or empty"),
                );
            }
        }
    }

    fn types(&mut self, types: &BTreeMap<String, FieldType>) {
        for (field, expected) in types {
            let Some(value) = self.record.value(field) else {
                continue;
            };
            if !matches_type(value, *expected) {
                self.type_failures.insert(field.clone());
                self.issue(
                    field,
                    RuleKind::Type,
                    format!(
                        "Field '{field}' has invalid type. Expected: {expected}, found: {}",
                        value.type_name()
                    ),
                );
            }
        }
    }

    fn allowed_values(&mut self, allowed: &BTreeMap<String, Vec<FieldValue>>) {
        for (field, choices) in allowed {
            let Some(value) = self.checked_value(field) else {
                continue;
            };
            let key = value.to_string();
            if !choices
                .iter()
                .any(|choice| choice == value || choice.to_string() == key)
            {
                let listed: Vec<String> = choices.iter().map(ToString::to_string).collect();
                self.issue(
                    field,
                    RuleKind::AllowedValues,
                    format!(
                        "Field '{field}' value '{value}' is not in allowed values: {}",
                        listed.join(", ")
                    ),
                );
            }
        }
    }

    fn ranges(&mut self, ranges: &BTreeMap<String, RangeRule>) {
        for (field, range) in ranges {
            let Some(value) = self.checked_value(field) else {
                continue;
            };
            let Some(number) = value.coerce_f64() else {
                self.issue(
                    field,
                    RuleKind::Range,
                    format!("Field '{field}' value '{value}' cannot be validated for range"),
                );
                continue;
            };
            if let Some(min) = range.min
                && number < min
            {
                self.issue(
                    field,
                    RuleKind::Range,
                    format!("Field '{field}' value {value} is below minimum {min}"),
                );
            }
            if let Some(max) = range.max
                && number > max
            {
                self.issue(
                    field,
                    RuleKind::Range,
                    format!("Field '{field}' value {value} is above maximum {max}"),
                );
            }
            if let Some(bound) = range.exclusive_min
                && number <= bound
            {
                self.issue(
                    field,
                    RuleKind::Range,
                    format!("Field '{field}' value {value} must be greater than {bound}"),
                );
            }
            if let Some(bound) = range.exclusive_max
                && number >= bound
            {
                self.issue(
                    field,
                    RuleKind::Range,
                    format!("Field '{field}' value {value} must be less than {bound}"),
                );
            }
        }
    }

    fn formats(&mut self, compiled: &CompiledRuleSet) {
        for (field, format) in &compiled.rules.field_formats {
            let Some(value) = self.checked_value(field) else {
                continue;
            };
            let text = value.to_string();
            if let Some(regex) = compiled.patterns.get(field)
                && !regex.is_match(&text)
            {
                self.issue(
                    field,
                    RuleKind::Pattern,
                    format!("Field '{field}' value '{text}' does not match required format"),
                );
            }
            if let Some(date_format) = &format.date_format
                && NaiveDate::parse_from_str(&text, date_format).is_err()
            {
                self.issue(
                    field,
                    RuleKind::DateFormat,
                    format!("Field '{field}' value '{text}' does not match date format {date_format}"),
                );
            }
        }
    }

    fn age_limits(&mut self, limits: &AgeLimits) {
        let field = limits.birth_date_field.as_str();
        let Some(value) = self.checked_value(field) else {
            return;
        };
        let Some(birth) = parse_date(&value.to_string()) else {
            self.issue(
                field,
                RuleKind::Age,
                "Invalid birth date format for age calculation".to_string(),
            );
            return;
        };
        let age = age_on(birth, self.as_of);
        if let Some(min) = limits.min_age
            && age < min as i32
        {
            self.issue(
                field,
                RuleKind::Age,
                format!("Applicant age {age} is below minimum age {min}"),
            );
        }
        if let Some(max) = limits.max_age
            && age > max as i32
        {
            self.issue(
                field,
                RuleKind::Age,
                format!("Applicant age {age} is above maximum age {max}"),
            );
        }
        if let Some(review) = limits.warning_age
            && age >= review as i32
        {
            self.warning(
                field,
                WarningCode::AgeReview,
                format!("Applicant age {age} requires special review"),
            );
        }
    }

    fn coverage_limits(&mut self, limits: &CoverageLimits) {
        let field = limits.field.as_str();
        let Some(value) = self.checked_value(field) else {
            return;
        };
        let Some(amount) = value.coerce_f64() else {
            self.issue(field, RuleKind::Coverage, "Invalid coverage amount format".to_string());
            return;
        };
        if let Some(min) = limits.min_amount
            && amount < min
        {
            self.issue(
                field,
                RuleKind::Coverage,
                format!("Coverage amount {value} is below minimum {min}"),
            );
        }
        if let Some(max) = limits.max_amount
            && amount > max
        {
            self.issue(
                field,
                RuleKind::Coverage,
                format!("Coverage amount {value} is above maximum {max}"),
            );
        }
    }

    fn consistency(&mut self, check: &ConsistencyCheck) {
        match check {
            ConsistencyCheck::DateOrder {
                earlier_field,
                later_field,
            } => {
                let (Some(earlier), Some(later)) = (
                    self.checked_value(earlier_field),
                    self.checked_value(later_field),
                ) else {
                    return;
                };
                match (parse_date(&earlier.to_string()), parse_date(&later.to_string())) {
                    (Some(earlier_date), Some(later_date)) => {
                        if earlier_date >= later_date {
                            self.issue(
                                later_field,
                                RuleKind::Consistency,
                                format!("Date '{earlier_field}' must be before '{later_field}'"),
                            );
                        }
                    }
                    _ => self.issue(
                        later_field,
                        RuleKind::Consistency,
                        format!(
                            "Invalid date format for consistency check: {earlier_field}, {later_field}"
                        ),
                    ),
                }
            }
            ConsistencyCheck::AgeMatchesBirthDate {
                age_field,
                birth_date_field,
                tolerance_years,
            } => {
                let (Some(age), Some(birth)) = (
                    self.checked_value(age_field),
                    self.checked_value(birth_date_field),
                ) else {
                    return;
                };
                let (Some(stated), Some(birth_date)) =
                    (age.coerce_f64(), parse_date(&birth.to_string()))
                else {
                    self.issue(
                        age_field,
                        RuleKind::Consistency,
                        format!(
                            "Cannot compare '{age_field}' with '{birth_date_field}': unreadable value"
                        ),
                    );
                    return;
                };
                let computed = age_on(birth_date, self.as_of);
                if (stated - f64::from(computed)).abs() > f64::from(*tolerance_years) {
                    self.issue(
                        age_field,
                        RuleKind::Consistency,
                        format!(
                            "Stated age {age} does not match age {computed} computed from '{birth_date_field}'"
                        ),
                    );
                }
            }
        }
    }
}

/// Whether a present value has the expected type. Dates are text in any
/// accepted date layout.
pub fn matches_type(value: &FieldValue, expected: FieldType) -> bool {
    match expected {
        FieldType::String => matches!(value, FieldValue::Text(_)),
        FieldType::Integer => matches!(value, FieldValue::Integer(_)),
        FieldType::Number | FieldType::Float => value.is_numeric(),
        FieldType::Boolean => matches!(value, FieldValue::Bool(_)),
        FieldType::Date => value.as_str().and_then(parse_date).is_some(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_matching() {
        assert!(matches_type(&FieldValue::Integer(1), FieldType::Number));
        assert!(matches_type(&FieldValue::Float(1.5), FieldType::Float));
        assert!(!matches_type(&FieldValue::Float(1.0), FieldType::Integer));
        assert!(matches_type(&FieldValue::from("1980-01-15"), FieldType::Date));
        assert!(!matches_type(&FieldValue::from("soon"), FieldType::Date));
        assert!(!matches_type(&FieldValue::Bool(true), FieldType::Number));
    }

    #[test]
    fn compile_rejects_bad_regex() {
        let mut rules = RuleSet::default();
        rules
            .field_formats
            .entry("name".to_string())
            .or_default()
            .regex = Some("(".to_string());
        assert!(CompiledRuleSet::compile(rules).is_err());
    }
}
