//! Transformation executor functions.
//!
//! Each function corresponds to a [`TransformationRule`](crate::TransformationRule)
//! variant and maps one value to a new value. Callers handle null values
//! before dispatching here.

use std::collections::BTreeMap;
use std::fmt::Write;

use aim_model::FieldValue;

use crate::error::TransformFailure;
use crate::normalization::{parse_date_with, parse_number_text, round_to};
use crate::rules::{CaseMode, DataType};

/// Strip surrounding whitespace. Non-text values are returned unchanged.
pub fn trim(value: &FieldValue) -> FieldValue {
    match value {
        FieldValue::Text(text) => FieldValue::Text(text.trim().to_string()),
        other => other.clone(),
    }
}

/// Change the letter case of a text value.
///
/// Title case capitalizes the first letter of each run of letters and
/// lowercases the rest, so `"o'BRIEN-smith"` becomes `"O'Brien-Smith"`.
pub fn change_case(value: &FieldValue, mode: CaseMode) -> Result<FieldValue, TransformFailure> {
    let FieldValue::Text(text) = value else {
        return Err(TransformFailure::NotText {
            found: value.type_name(),
        });
    };
    let converted = match mode {
        CaseMode::Upper => text.to_uppercase(),
        CaseMode::Lower => text.to_lowercase(),
        CaseMode::Title => title_case(text),
    };
    Ok(FieldValue::Text(converted))
}

fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;
    for ch in text.chars() {
        if ch.is_alphabetic() {
            if at_word_start {
                out.extend(ch.to_uppercase());
            } else {
                out.extend(ch.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(ch);
            at_word_start = true;
        }
    }
    out
}

/// Parse a date with the first matching input format and render it with
/// `format` (chrono strftime syntax).
pub fn reformat_date<S: AsRef<str>>(
    value: &FieldValue,
    format: &str,
    input_formats: &[S],
) -> Result<FieldValue, TransformFailure> {
    let text = value.to_string();
    let date = parse_date_with(&text, input_formats)
        .ok_or_else(|| TransformFailure::NotADate { value: text.clone() })?;

    // Display of an invalid strftime pattern reports fmt::Error instead of
    // producing text, which `to_string` would turn into a panic.
    let mut rendered = String::new();
    write!(rendered, "{}", date.format(format)).map_err(|_| {
        TransformFailure::InvalidDateFormat {
            format: format.to_string(),
        }
    })?;
    Ok(FieldValue::Text(rendered))
}

/// Convert an amount between currencies. Rates are expressed per US dollar.
pub fn convert_currency(
    value: &FieldValue,
    from_currency: &str,
    to_currency: &str,
    rates: &BTreeMap<String, f64>,
) -> Result<FieldValue, TransformFailure> {
    let amount = numeric(value)?;
    let from = from_currency.trim().to_uppercase();
    let to = to_currency.trim().to_uppercase();
    if from == to {
        return Ok(value.clone());
    }
    let rate = |currency: &str| {
        rates
            .get(currency)
            .copied()
            .filter(|rate| *rate > 0.0 && rate.is_finite())
            .ok_or_else(|| TransformFailure::UnknownCurrency {
                currency: currency.to_string(),
            })
    };
    let from_rate = rate(&from)?;
    let to_rate = rate(&to)?;
    Ok(FieldValue::Float(amount / from_rate * to_rate))
}

/// Cast a value to another scalar type.
///
/// Floats truncate toward zero when cast to an integer. Booleans are never
/// treated as numbers.
pub fn cast(value: &FieldValue, to: DataType) -> Result<FieldValue, TransformFailure> {
    let failed = || TransformFailure::Conversion {
        value: value.to_string(),
        to,
    };
    match to {
        DataType::Str => Ok(match value {
            FieldValue::Text(_) => value.clone(),
            other => FieldValue::Text(other.to_string()),
        }),
        DataType::Int => match number_of(value) {
            Some(FieldValue::Integer(int)) => Ok(FieldValue::Integer(int)),
            Some(FieldValue::Float(float)) => truncate(float).ok_or_else(failed),
            _ => Err(failed()),
        },
        DataType::Float => number_of(value)
            .and_then(|number| number.as_f64())
            .map(FieldValue::Float)
            .ok_or_else(failed),
        DataType::Bool => match value {
            FieldValue::Bool(_) => Ok(value.clone()),
            FieldValue::Integer(int) => Ok(FieldValue::Bool(*int != 0)),
            FieldValue::Float(float) => Ok(FieldValue::Bool(*float != 0.0)),
            FieldValue::Text(text) => match text.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "y" | "1" | "on" => Ok(FieldValue::Bool(true)),
                "false" | "no" | "n" | "0" | "off" => Ok(FieldValue::Bool(false)),
                _ => Err(failed()),
            },
            FieldValue::Null => Ok(FieldValue::Null),
        },
    }
}

fn truncate(value: f64) -> Option<FieldValue> {
    let truncated = value.trunc();
    (truncated.is_finite() && truncated >= i64::MIN as f64 && truncated <= i64::MAX as f64)
        .then(|| FieldValue::Integer(truncated as i64))
}

/// Multiply a numeric value by `factor`.
pub fn scale(value: &FieldValue, factor: f64) -> Result<FieldValue, TransformFailure> {
    Ok(FieldValue::Float(numeric(value)? * factor))
}

/// Round to `decimals` places. Integers are already exact.
pub fn round(value: &FieldValue, decimals: u32) -> Result<FieldValue, TransformFailure> {
    match number_of(value) {
        Some(FieldValue::Integer(int)) => Ok(FieldValue::Integer(int)),
        Some(FieldValue::Float(float)) => Ok(FieldValue::Float(round_to(float, decimals))),
        _ => Err(TransformFailure::NotNumeric {
            value: value.to_string(),
        }),
    }
}

/// Numeric view of numbers and number-like text.
fn number_of(value: &FieldValue) -> Option<FieldValue> {
    match value {
        FieldValue::Integer(_) | FieldValue::Float(_) => Some(value.clone()),
        FieldValue::Text(text) => parse_number_text(text),
        _ => None,
    }
}

fn numeric(value: &FieldValue) -> Result<f64, TransformFailure> {
    number_of(value)
        .and_then(|number| number.as_f64())
        .ok_or_else(|| TransformFailure::NotNumeric {
            value: value.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_case_restarts_after_punctuation() {
        assert_eq!(title_case("o'BRIEN-smith"), "O'Brien-Smith");
        assert_eq!(title_case("  mary ann"), "  Mary Ann");
    }

    #[test]
    fn truncation_stays_in_range() {
        assert_eq!(truncate(-2.9), Some(FieldValue::Integer(-2)));
        assert_eq!(truncate(f64::INFINITY), None);
    }
}
