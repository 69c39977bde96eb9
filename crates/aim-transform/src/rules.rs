//! Transformation rule definitions.
//!
//! Rules are data: they are read from `transformations.json` (or inline in a
//! field mapping) and dispatched to the functions in [`crate::executors`].
//!
//! ```json
//! [
//!   { "type": "trim" },
//!   { "type": "case", "mode": "title" },
//!   { "type": "date_format", "format": "%m/%d/%Y" }
//! ]
//! ```

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::trace;

use aim_model::FieldValue;

use crate::error::TransformFailure;
use crate::executors;
use crate::normalization::{DEFAULT_INPUT_FORMATS, ISO_DATE_FORMAT};

/// Target letter case for [`TransformationRule::Case`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseMode {
    Upper,
    Lower,
    Title,
}

/// Scalar type targeted by a conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    #[serde(alias = "integer")]
    Int,
    #[serde(alias = "number")]
    Float,
    #[serde(alias = "string")]
    Str,
    #[serde(alias = "boolean")]
    Bool,
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Int => "int",
            Self::Float => "float",
            Self::Str => "str",
            Self::Bool => "bool",
        })
    }
}

/// A single configured transformation step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TransformationRule {
    /// Strip surrounding whitespace from text.
    Trim,
    /// Convert text to upper, lower or title case.
    Case { mode: CaseMode },
    /// Re-render a date in `format` after parsing it with `input_formats`.
    DateFormat {
        format: String,
        #[serde(default = "default_input_formats")]
        input_formats: Vec<String>,
    },
    /// Convert an amount between currencies through a rate table keyed by
    /// currency code (rates are units per USD).
    CurrencyConversion {
        from_currency: String,
        to_currency: String,
        #[serde(default = "default_rates")]
        rates: BTreeMap<String, f64>,
    },
    /// Cast to another scalar type.
    DataType { to: DataType },
    /// Multiply a numeric value.
    Scale { factor: f64 },
    /// Round a numeric value to a number of decimal places.
    Round { decimals: u32 },
}

fn default_input_formats() -> Vec<String> {
    DEFAULT_INPUT_FORMATS
        .iter()
        .map(|format| (*format).to_string())
        .collect()
}

/// Placeholder rate table carried over from the legacy tool.
pub fn default_rates() -> BTreeMap<String, f64> {
    BTreeMap::from([
        ("USD".to_string(), 1.0),
        ("EUR".to_string(), 0.85),
        ("GBP".to_string(), 0.73),
    ])
}

/// Names usable in configuration without a definition.
pub const BUILTIN_NAMES: &[&str] = &["trim", "upper", "lower", "title", "iso_date"];

impl TransformationRule {
    /// Resolves one of the [`BUILTIN_NAMES`].
    pub fn builtin(name: &str) -> Option<Self> {
        let rule = match name {
            "trim" => Self::Trim,
            "upper" => Self::Case {
                mode: CaseMode::Upper,
            },
            "lower" => Self::Case {
                mode: CaseMode::Lower,
            },
            "title" => Self::Case {
                mode: CaseMode::Title,
            },
            "iso_date" => Self::DateFormat {
                format: ISO_DATE_FORMAT.to_string(),
                input_formats: default_input_formats(),
            },
            _ => return None,
        };
        Some(rule)
    }

    /// Short rule name used in logs and error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Trim => "trim",
            Self::Case { .. } => "case",
            Self::DateFormat { .. } => "date_format",
            Self::CurrencyConversion { .. } => "currency_conversion",
            Self::DataType { .. } => "data_type",
            Self::Scale { .. } => "scale",
            Self::Round { .. } => "round",
        }
    }

    /// Applies the rule. Null values pass through every rule unchanged.
    pub fn apply(&self, value: &FieldValue) -> Result<FieldValue, TransformFailure> {
        if value.is_null() {
            return Ok(FieldValue::Null);
        }
        trace!(rule = self.kind(), "applying transformation");
        match self {
            Self::Trim => Ok(executors::trim(value)),
            Self::Case { mode } => executors::change_case(value, *mode),
            Self::DateFormat {
                format,
                input_formats,
            } => executors::reformat_date(value, format, input_formats),
            Self::CurrencyConversion {
                from_currency,
                to_currency,
                rates,
            } => executors::convert_currency(value, from_currency, to_currency, rates),
            Self::DataType { to } => executors::cast(value, *to),
            Self::Scale { factor } => executors::scale(value, *factor),
            Self::Round { decimals } => executors::round(value, *decimals),
        }
    }
}
