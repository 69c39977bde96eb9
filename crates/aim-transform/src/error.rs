//! Error types for transformation execution.

use thiserror::Error;

use crate::rules::DataType;

/// Reason a transformation could not be applied to a value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransformFailure {
    #[error("expected a text value, found {found}")]
    NotText { found: &'static str },
    #[error("value '{value}' is not numeric")]
    NotNumeric { value: String },
    #[error("value '{value}' is not a date in any accepted format")]
    NotADate { value: String },
    #[error("invalid date output format '{format}'")]
    InvalidDateFormat { format: String },
    #[error("no exchange rate configured for currency '{currency}'")]
    UnknownCurrency { currency: String },
    #[error("value '{value}' cannot be converted to {to}")]
    Conversion { value: String, to: DataType },
}
