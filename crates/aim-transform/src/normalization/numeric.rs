//! Numeric normalization utilities.

use aim_model::FieldValue;

/// Parses number-like text such as `"1,500"`, `"$250.75"` or `"-500"`.
///
/// Thousands separators and dollar signs are ignored. Text without a decimal
/// point or exponent becomes an integer when it fits, otherwise a float.
/// Non-finite spellings (`inf`, `NaN`) are not numbers.
pub fn parse_number_text(value: &str) -> Option<FieldValue> {
    let cleaned: String = value
        .trim()
        .chars()
        .filter(|c| *c != ',' && *c != '$')
        .collect();
    if cleaned.is_empty() || !cleaned.bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }
    if !cleaned
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E'))
    {
        return None;
    }
    let is_integral = !cleaned.contains(['.', 'e', 'E']);
    if is_integral && let Ok(integer) = cleaned.parse::<i64>() {
        return Some(FieldValue::Integer(integer));
    }
    cleaned
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(FieldValue::Float)
}

/// Rounds half away from zero to `decimals` places.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals.min(15) as i32);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_formatted_amounts() {
        assert_eq!(parse_number_text("1,500"), Some(FieldValue::Integer(1500)));
        assert_eq!(parse_number_text("$250.75"), Some(FieldValue::Float(250.75)));
        assert_eq!(parse_number_text("-500"), Some(FieldValue::Integer(-500)));
        assert_eq!(parse_number_text("1e3"), Some(FieldValue::Float(1000.0)));
    }

    #[test]
    fn rejects_non_numbers() {
        assert_eq!(parse_number_text("inf"), None);
        assert_eq!(parse_number_text("NaN"), None);
        assert_eq!(parse_number_text("01-15-1980"), None);
        assert_eq!(parse_number_text("$"), None);
        assert_eq!(parse_number_text("John"), None);
    }

    #[test]
    fn rounding() {
        assert_eq!(round_to(2.346, 2), 2.35);
        assert_eq!(round_to(-2.5, 0), -3.0);
    }
}
