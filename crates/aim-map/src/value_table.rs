//! Value translation tables.

use std::collections::BTreeMap;

use aim_model::FieldValue;

/// Replacement for `value`, keyed by its display form.
pub fn lookup<'t>(table: &'t BTreeMap<String, FieldValue>, value: &FieldValue) -> Option<&'t FieldValue> {
    match value {
        FieldValue::Text(text) => table.get(text.as_str()),
        other => table.get(&other.to_string()),
    }
}

/// Reverse table, or `None` when two keys share a replacement.
pub fn invert(table: &BTreeMap<String, FieldValue>) -> Option<BTreeMap<String, FieldValue>> {
    let mut inverse = BTreeMap::new();
    for (key, replacement) in table {
        if inverse
            .insert(replacement.to_string(), FieldValue::text(key.clone()))
            .is_some()
        {
            return None;
        }
    }
    Some(inverse)
}
