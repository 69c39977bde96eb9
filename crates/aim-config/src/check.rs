//! Internal consistency check of a loaded configuration.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize};

use aim_model::FieldValue;
use aim_transform::{TransformFailure, TransformationRule};

use crate::rules::{ConsistencyCheck, LevelRules, RuleSet, ValidationRuleTable};
use crate::schema::{
    EngineConfig, OutputTemplate, ProductMappings, ProductTransformations, TransformStep,
    template_fields,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueSeverity {
    Error,
    Warning,
}

/// A problem found in the configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigIssue {
    pub severity: IssueSeverity,
    /// Product the issue belongs to; `None` for shared entries.
    pub product: Option<String>,
    pub message: String,
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.product {
            Some(product) => write!(f, "[{product}] {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// Which documents configure a product.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductCoverage {
    pub has_field_mappings: bool,
    pub has_validation_rules: bool,
    pub has_transformations: bool,
    pub has_output_template: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigReport {
    pub issues: Vec<ConfigIssue>,
    pub product_coverage: BTreeMap<String, ProductCoverage>,
}

impl ConfigReport {
    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }

    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    pub fn errors(&self) -> impl Iterator<Item = &ConfigIssue> {
        self.issues
            .iter()
            .filter(|issue| issue.severity == IssueSeverity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ConfigIssue> {
        self.issues
            .iter()
            .filter(|issue| issue.severity == IssueSeverity::Warning)
    }

    /// Errors attributed to `product` or to shared entries.
    pub fn errors_for<'a>(&'a self, product: &'a str) -> impl Iterator<Item = &'a ConfigIssue> {
        self.errors()
            .filter(move |issue| issue.product.as_deref().is_none_or(|p| p == product))
    }

    fn push(&mut self, severity: IssueSeverity, product: Option<&str>, message: String) {
        self.issues.push(ConfigIssue {
            severity,
            product: product.map(str::to_string),
            message,
        });
    }

    fn error(&mut self, product: Option<&str>, message: String) {
        self.push(IssueSeverity::Error, product, message);
    }

    fn warning(&mut self, product: Option<&str>, message: String) {
        self.push(IssueSeverity::Warning, product, message);
    }
}

/// Checks cross-document references and rule sanity.
pub fn check_config(config: &EngineConfig) -> ConfigReport {
    let mut report = ConfigReport::default();
    let no_transformations = ProductTransformations::default();

    for product in config.supported_products() {
        let product = product.as_str();
        let mappings = config.mappings_for(product);
        let transformations = config
            .transformations_for(product)
            .unwrap_or(&no_transformations);
        let template = config.template_for(product);

        let coverage = ProductCoverage {
            has_field_mappings: mappings.is_some_and(|m| !m.is_empty()),
            has_validation_rules: config.validation_rules.has_rules_for(product),
            has_transformations: !transformations.is_empty(),
            has_output_template: template.is_some_and(|t| !t.is_empty()),
        };
        report.product_coverage.insert(product.to_string(), coverage);

        if !coverage.has_field_mappings {
            report.error(Some(product), "no field mappings defined".to_string());
        }
        if !coverage.has_output_template {
            report.error(Some(product), "no output template defined".to_string());
        }
        if !coverage.has_validation_rules {
            report.warning(Some(product), "no validation rules defined".to_string());
        }

        let empty = ProductMappings::new();
        let mappings = mappings.unwrap_or(&empty);
        check_mappings(&mut report, product, mappings, transformations, template);
        check_transformations(&mut report, product, mappings, transformations);
        if let Some(rules) = config.validation_rules.product(product) {
            check_rule_fields(&mut report, product, mappings, rules);
        }
        if let Some(template) = template {
            check_template(&mut report, product, mappings, template);
        }
    }

    check_rules(&mut report, &config.validation_rules);
    report
}

fn check_mappings(
    report: &mut ConfigReport,
    product: &str,
    mappings: &ProductMappings,
    transformations: &ProductTransformations,
    template: Option<&OutputTemplate>,
) {
    let declared = template.map(template_fields).unwrap_or_default();
    let mut sources_by_target: BTreeMap<&str, Vec<&str>> = BTreeMap::new();

    for (source, spec) in mappings {
        let target = spec.target_field();
        if source.trim().is_empty() {
            report.error(Some(product), "field mapping with an empty source name".to_string());
        }
        if target.trim().is_empty() {
            report.error(
                Some(product),
                format!("field mapping '{source}' has an empty target_field"),
            );
            continue;
        }
        sources_by_target.entry(target).or_default().push(source);

        if let Some(descriptor) = spec.descriptor() {
            for name in &descriptor.transformations {
                if transformations.resolve(name).is_none() {
                    report.error(
                        Some(product),
                        format!("field mapping '{source}' references unknown transformation '{name}'"),
                    );
                }
            }
        }
        if template.is_some() && !declared.contains(target) {
            report.warning(
                Some(product),
                format!("mapped target '{target}' is not part of the output template"),
            );
        }
    }

    for (target, sources) in sources_by_target {
        if sources.len() > 1 {
            report.warning(
                Some(product),
                format!(
                    "target '{target}' is produced by several source fields ({}); the first one present wins",
                    sources.join(", ")
                ),
            );
        }
    }
}

fn check_transformations(
    report: &mut ConfigReport,
    product: &str,
    mappings: &ProductMappings,
    transformations: &ProductTransformations,
) {
    let targets: BTreeSet<&str> = mappings.values().map(|spec| spec.target_field()).collect();

    for (name, rule) in &transformations.named {
        check_rule(report, product, name, rule);
    }

    for (target, steps) in &transformations.fields {
        if !targets.contains(target.as_str()) {
            report.error(
                Some(product),
                format!("transformations declared for '{target}', which no field mapping produces"),
            );
        }
        for step in steps {
            match step {
                TransformStep::Named(name) => {
                    if transformations.resolve(name).is_none() {
                        report.error(
                            Some(product),
                            format!("transformations for '{target}' reference unknown transformation '{name}'"),
                        );
                    }
                }
                TransformStep::Inline(rule) => check_rule(report, product, target, rule),
            }
        }
    }
}

/// Catches output formats chrono cannot render by formatting a fixed date.
fn check_rule(report: &mut ConfigReport, product: &str, context: &str, rule: &TransformationRule) {
    if let TransformationRule::DateFormat { .. } = rule
        && let Err(TransformFailure::InvalidDateFormat { format }) =
            rule.apply(&FieldValue::from("2000-01-31"))
    {
        report.error(
            Some(product),
            format!("transformation '{context}' uses invalid date format '{format}'"),
        );
    }
}

fn check_template(
    report: &mut ConfigReport,
    product: &str,
    mappings: &ProductMappings,
    template: &OutputTemplate,
) {
    let targets: BTreeSet<&str> = mappings.values().map(|spec| spec.target_field()).collect();
    for (name, section) in template {
        if section.fields.is_empty() {
            report.warning(Some(product), format!("template section '{name}' declares no fields"));
        }
        for field in &section.fields {
            if !targets.contains(field.as_str()) && !section.defaults.contains_key(field) {
                report.warning(
                    Some(product),
                    format!(
                        "template field '{name}.{field}' has neither a mapped source nor a default"
                    ),
                );
            }
        }
        for field in section.defaults.keys() {
            if !section.fields.contains(field) {
                report.error(
                    Some(product),
                    format!("default for '{name}.{field}' names a field the section does not declare"),
                );
            }
        }
    }
}

/// Rule fields that no mapping reads are validated but never reach the output.
fn check_rule_fields(
    report: &mut ConfigReport,
    product: &str,
    mappings: &ProductMappings,
    rules: &LevelRules,
) {
    let mut unknown: BTreeSet<&str> = BTreeSet::new();
    for level in aim_model::ValidationLevel::ALL {
        unknown.extend(
            rule_fields(rules.at(level))
                .into_iter()
                .filter(|field| !mappings.contains_key(*field)),
        );
    }
    for field in unknown {
        report.warning(
            Some(product),
            format!("validation rules name '{field}', which no field mapping reads"),
        );
    }
}

/// Every source field a rule set refers to.
pub fn rule_fields(rules: &RuleSet) -> BTreeSet<&str> {
    let mut fields: BTreeSet<&str> = rules.required_fields.iter().map(String::as_str).collect();
    fields.extend(rules.field_types.keys().map(String::as_str));
    fields.extend(rules.allowed_values.keys().map(String::as_str));
    fields.extend(rules.field_ranges.keys().map(String::as_str));
    fields.extend(rules.field_formats.keys().map(String::as_str));
    if let Some(age) = &rules.age_limits {
        fields.insert(&age.birth_date_field);
    }
    if let Some(coverage) = &rules.coverage_limits {
        fields.insert(&coverage.field);
    }
    for dependency in &rules.field_dependencies {
        fields.insert(&dependency.source_field);
        fields.insert(&dependency.dependent_field);
    }
    for check in &rules.consistency_checks {
        match check {
            ConsistencyCheck::DateOrder {
                earlier_field,
                later_field,
            } => {
                fields.insert(earlier_field);
                fields.insert(later_field);
            }
            ConsistencyCheck::AgeMatchesBirthDate {
                age_field,
                birth_date_field,
                ..
            } => {
                fields.insert(age_field);
                fields.insert(birth_date_field);
            }
        }
    }
    fields
}

fn check_rules(report: &mut ConfigReport, table: &ValidationRuleTable) {
    for (key, levels) in table.blocks() {
        let product = (key != crate::rules::BASE_RULES_KEY).then_some(key);
        for level in aim_model::ValidationLevel::ALL {
            check_rule_set(report, product, level.as_str(), levels.at(level));
        }
    }
}

/// Returns the errors that would make a rule set unusable at runtime.
pub fn rule_set_errors(rules: &RuleSet) -> Vec<String> {
    let mut errors = Vec::new();
    for (field, format) in &rules.field_formats {
        if let Some(pattern) = &format.regex
            && let Err(e) = Regex::new(pattern)
        {
            errors.push(format!("invalid regex for '{field}': {e}"));
        }
    }
    for (field, range) in &rules.field_ranges {
        let lower = range.min.or(range.exclusive_min);
        let upper = range.max.or(range.exclusive_max);
        if let (Some(lower), Some(upper)) = (lower, upper)
            && lower > upper
        {
            errors.push(format!("range for '{field}' has min {lower} above max {upper}"));
        }
    }
    if let Some(age) = &rules.age_limits
        && let (Some(min), Some(max)) = (age.min_age, age.max_age)
        && min > max
    {
        errors.push(format!("age limits have min_age {min} above max_age {max}"));
    }
    if let Some(coverage) = &rules.coverage_limits
        && let (Some(min), Some(max)) = (coverage.min_amount, coverage.max_amount)
        && min > max
    {
        errors.push(format!(
            "coverage limits for '{}' have min_amount {min} above max_amount {max}",
            coverage.field
        ));
    }
    errors
}

fn check_rule_set(report: &mut ConfigReport, product: Option<&str>, level: &str, rules: &RuleSet) {
    for message in rule_set_errors(rules) {
        report.error(product, format!("{level} rules: {message}"));
    }
}
