//! FAST UI record parser.
//!
//! Turns a raw submission into a flat [`Record`]:
//!
//! - one level of object nesting is flattened (`applicant.first_name` becomes
//!   `applicant_first_name`);
//! - arrays become indexed fields (`beneficiaries_1_name`, `riders_2`) plus a
//!   `<name>_count` field;
//! - field names are lowercased and reduced to `[a-z0-9_]`;
//! - string values are trimmed, null tokens become null, and number, boolean
//!   and date spellings are coerced.
//!
//! Anything nested deeper is rejected with a [`ParsingError`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use aim_model::{FieldValue, RawRecord, Record, number_to_field};
use aim_transform::normalization::{looks_like_date, normalize_date, parse_number_text};

use crate::error::ParsingError;

/// Spellings treated as an absent value, compared case-insensitively.
pub const NULL_TOKENS: &[&str] = &["null", "none", "n/a", "na", "nil", "undefined"];

const TRUE_WORDS: &[&str] = &["true", "yes", "y", "on"];
const FALSE_WORDS: &[&str] = &["false", "no", "n", "off"];

/// Which string coercions the parser applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseOptions {
    /// `"1,500"` becomes `1500`, `"$250.75"` becomes `250.75`.
    pub coerce_numbers: bool,
    /// `"yes"` becomes `true`.
    pub coerce_booleans: bool,
    /// `"01/15/1980"` becomes `"1980-01-15"`.
    pub normalize_dates: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            coerce_numbers: true,
            coerce_booleans: true,
            normalize_dates: true,
        }
    }
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_number_coercion(mut self, enable: bool) -> Self {
        self.coerce_numbers = enable;
        self
    }

    pub fn with_boolean_coercion(mut self, enable: bool) -> Self {
        self.coerce_booleans = enable;
        self
    }

    pub fn with_date_normalization(mut self, enable: bool) -> Self {
        self.normalize_dates = enable;
        self
    }
}

/// Shape and type statistics of one parse.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseStats {
    pub original_fields: usize,
    pub parsed_fields: usize,
    pub nested_sections: usize,
    pub array_sections: usize,
    /// Value type name to number of parsed fields holding it.
    pub value_types: BTreeMap<String, usize>,
}

/// Parser output: the flat record plus statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRecord {
    pub record: Record,
    pub stats: ParseStats,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FastUiParser {
    options: ParseOptions,
}

impl FastUiParser {
    pub fn new(options: ParseOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> ParseOptions {
        self.options
    }

    pub fn parse(&self, raw: &RawRecord) -> Result<ParsedRecord, ParsingError> {
        let mut stats = ParseStats {
            original_fields: raw.len(),
            ..ParseStats::default()
        };
        let mut fields = Vec::with_capacity(raw.len());

        for (key, value) in raw {
            match value {
                Value::Object(section) => {
                    stats.nested_sections += 1;
                    for (name, inner) in section {
                        let path = format!("{key}.{name}");
                        let value = self.scalar(inner, &path, "sections may only hold scalar values")?;
                        fields.push((path, format!("{key}_{name}"), value));
                    }
                }
                Value::Array(items) => {
                    stats.array_sections += 1;
                    self.flatten_array(key, items, &mut fields)?;
                }
                scalar => {
                    let value = self.scalar(scalar, key, "")?;
                    fields.push((key.clone(), key.clone(), value));
                }
            }
        }

        let record = collect_fields(fields)?;
        stats.parsed_fields = record.len();
        for (_, value) in &record {
            *stats
                .value_types
                .entry(value.type_name().to_string())
                .or_default() += 1;
        }
        debug!(
            original = stats.original_fields,
            parsed = stats.parsed_fields,
            nested = stats.nested_sections,
            arrays = stats.array_sections,
            "parsed FAST UI record"
        );
        Ok(ParsedRecord { record, stats })
    }

    fn flatten_array(
        &self,
        key: &str,
        items: &[Value],
        fields: &mut Vec<(String, String, FieldValue)>,
    ) -> Result<(), ParsingError> {
        for (offset, item) in items.iter().enumerate() {
            let index = offset + 1;
            match item {
                Value::Object(entry) => {
                    for (name, inner) in entry {
                        let path = format!("{key}.{index}.{name}");
                        let value =
                            self.scalar(inner, &path, "array entries may only hold scalar values")?;
                        fields.push((path, format!("{key}_{index}_{name}"), value));
                    }
                }
                Value::Array(_) => {
                    return Err(ParsingError::NestingTooDeep {
                        path: format!("{key}.{index}"),
                        detail: "arrays of arrays are not supported",
                    });
                }
                scalar => {
                    let path = format!("{key}.{index}");
                    let value = self.scalar(scalar, &path, "")?;
                    fields.push((path, format!("{key}_{index}"), value));
                }
            }
        }
        let count = i64::try_from(items.len()).unwrap_or(i64::MAX);
        fields.push((
            format!("{key}.count"),
            format!("{key}_count"),
            FieldValue::Integer(count),
        ));
        Ok(())
    }

    fn scalar(&self, value: &Value, path: &str, detail: &'static str) -> Result<FieldValue, ParsingError> {
        match value {
            Value::Null => Ok(FieldValue::Null),
            Value::Bool(flag) => Ok(FieldValue::Bool(*flag)),
            Value::Number(number) => Ok(number_to_field(number)),
            Value::String(text) => Ok(self.clean_text(text)),
            Value::Object(_) | Value::Array(_) => Err(ParsingError::NestingTooDeep {
                path: path.to_string(),
                detail,
            }),
        }
    }

    /// Applies trimming, null tokens and the enabled coercions to a string.
    pub fn clean_text(&self, text: &str) -> FieldValue {
        let trimmed = text.trim();
        if trimmed.is_empty() || is_null_token(trimmed) {
            return FieldValue::Null;
        }
        if self.options.coerce_numbers
            && let Some(number) = parse_number_text(trimmed)
        {
            return number;
        }
        if self.options.coerce_booleans
            && let Some(flag) = parse_bool_word(trimmed)
        {
            return FieldValue::Bool(flag);
        }
        if self.options.normalize_dates
            && looks_like_date(trimmed)
            && let Some(iso) = normalize_date(trimmed)
        {
            return FieldValue::Text(iso);
        }
        FieldValue::text(trimmed)
    }
}

fn collect_fields(fields: Vec<(String, String, FieldValue)>) -> Result<Record, ParsingError> {
    let mut record = Record::new();
    let mut origins: BTreeMap<String, String> = BTreeMap::new();
    for (path, joined, value) in fields {
        let name = normalize_field_name(&joined);
        if name.is_empty() {
            return Err(ParsingError::EmptyFieldName { path });
        }
        if let Some(first) = origins.get(&name) {
            return Err(ParsingError::FieldNameCollision {
                field: name,
                first: first.clone(),
                second: path,
            });
        }
        origins.insert(name.clone(), path);
        record.insert(name, value);
    }
    Ok(record)
}

fn is_null_token(value: &str) -> bool {
    NULL_TOKENS
        .iter()
        .any(|token| value.eq_ignore_ascii_case(token))
}

fn parse_bool_word(value: &str) -> Option<bool> {
    if TRUE_WORDS.iter().any(|word| value.eq_ignore_ascii_case(word)) {
        Some(true)
    } else if FALSE_WORDS.iter().any(|word| value.eq_ignore_ascii_case(word)) {
        Some(false)
    } else {
        None
    }
}

/// Lowercases and reduces a name to `[a-z0-9_]`, collapsing separator runs
/// and trimming them from both ends: `"Applicant First-Name"` becomes
/// `"applicant_first_name"`.
pub fn normalize_field_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for ch in name.chars().flat_map(char::to_lowercase) {
        let ch = if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            ch
        } else {
            '_'
        };
        if ch == '_' && (out.is_empty() || out.ends_with('_')) {
            continue;
        }
        out.push(ch);
    }
    if out.ends_with('_') {
        out.pop();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_names_are_normalized() {
        assert_eq!(normalize_field_name("Applicant First-Name"), "applicant_first_name");
        assert_eq!(normalize_field_name("__policy__Face  Amount__"), "policy_face_amount");
        assert_eq!(normalize_field_name("Zip Code #2"), "zip_code_2");
        assert_eq!(normalize_field_name("???"), "");
    }

    #[test]
    fn text_coercion_order() {
        let parser = FastUiParser::default();
        assert_eq!(parser.clean_text(" 1,500 "), FieldValue::Integer(1500));
        assert_eq!(parser.clean_text("1"), FieldValue::Integer(1));
        assert_eq!(parser.clean_text("Yes"), FieldValue::Bool(true));
        assert_eq!(parser.clean_text("off"), FieldValue::Bool(false));
        assert_eq!(parser.clean_text("01/15/1980"), FieldValue::from("1980-01-15"));
        assert_eq!(parser.clean_text("02/30/1980"), FieldValue::from("02/30/1980"));
        assert_eq!(parser.clean_text("N/A"), FieldValue::Null);
        assert_eq!(parser.clean_text("   "), FieldValue::Null);
    }

    #[test]
    fn coercions_can_be_disabled() {
        let parser = FastUiParser::new(
            ParseOptions::new()
                .with_number_coercion(false)
                .with_boolean_coercion(false)
                .with_date_normalization(false),
        );
        assert_eq!(parser.clean_text("1,500"), FieldValue::from("1,500"));
        assert_eq!(parser.clean_text("yes"), FieldValue::from("yes"));
        assert_eq!(parser.clean_text("01/15/1980"), FieldValue::from("01/15/1980"));
        assert_eq!(parser.clean_text("null"), FieldValue::Null);
    }
}
