use serde::{Deserialize, Serialize};

use crate::product::ValidationLevel;

/// Rule category reported in `rule_violated`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    Required,
    Type,
    AllowedValues,
    Range,
    Pattern,
    DateFormat,
    Age,
    Coverage,
    Dependency,
    Consistency,
    /// Raw input could not be normalized.
    Parsing,
    /// A configured transformation could not be applied.
    Mapping,
    /// Configuration for the product is missing or broken.
    Configuration,
}

impl RuleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::Type => "type",
            Self::AllowedValues => "allowed_values",
            Self::Range => "range",
            Self::Pattern => "pattern",
            Self::DateFormat => "date_format",
            Self::Age => "age",
            Self::Coverage => "coverage",
            Self::Dependency => "dependency",
            Self::Consistency => "consistency",
            Self::Parsing => "parsing",
            Self::Mapping => "mapping",
            Self::Configuration => "configuration",
        }
    }
}

/// A single violation, naming the offending field and the rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub field: String,
    pub rule_violated: RuleKind,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(field: impl Into<String>, rule_violated: RuleKind, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            rule_violated,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningCode {
    /// Value had no entry in the value-mapping table and passed through.
    UnmappedValue,
    /// Applicant age at or above the review threshold.
    AgeReview,
    /// Two source fields mapped onto the same target; the first one won.
    DuplicateTarget,
}

/// Soft, non-blocking finding recorded alongside a result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warning {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    pub code: WarningCode,
    pub message: String,
}

impl Warning {
    pub fn for_field(field: impl Into<String>, code: WarningCode, message: impl Into<String>) -> Self {
        Self {
            field: Some(field.into()),
            code,
            message: message.into(),
        }
    }
}

/// Outcome of validating one record at one level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub level: ValidationLevel,
    pub issues: Vec<ValidationIssue>,
    pub warnings: Vec<Warning>,
}

impl ValidationReport {
    pub fn new(level: ValidationLevel) -> Self {
        Self {
            level,
            issues: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.issues.len()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    pub fn issues_for(&self, field: &str) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(move |issue| issue.field == field)
    }
}
