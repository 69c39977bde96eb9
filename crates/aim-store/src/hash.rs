//! Content hashing for duplicate detection.

use std::collections::BTreeMap;

use serde::{Serialize, Serializer};
use serde_json::Value;
use sha2::{Digest, Sha256};

use aim_model::RawRecord;

use crate::error::{Result, StoreError};

/// SHA-256 (hex) of the record's canonical JSON: keys sorted at every
/// depth, no insignificant whitespace.
pub fn content_hash(record: &RawRecord) -> Result<String> {
    let canonical = canonical_json(record)?;
    Ok(hex::encode(Sha256::digest(canonical.as_bytes())))
}

pub fn canonical_json(record: &RawRecord) -> Result<String> {
    let sorted: BTreeMap<&str, Canonical<'_>> = record
        .iter()
        .map(|(key, value)| (key.as_str(), Canonical(value)))
        .collect();
    serde_json::to_string(&sorted).map_err(StoreError::Serialization)
}

/// Serializes a JSON value with object keys in sorted order.
struct Canonical<'a>(&'a Value);

impl Serialize for Canonical<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self.0 {
            Value::Object(map) => {
                let sorted: BTreeMap<&str, Canonical<'_>> = map
                    .iter()
                    .map(|(key, value)| (key.as_str(), Canonical(value)))
                    .collect();
                sorted.serialize(serializer)
            }
            Value::Array(items) => serializer.collect_seq(items.iter().map(Canonical)),
            other => other.serialize(serializer),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: Value) -> RawRecord {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn key_order_does_not_change_hash() {
        let mut a = RawRecord::new();
        a.insert("b".to_string(), json!(1));
        a.insert("a".to_string(), json!({"y": 2, "x": [1, {"q": 1, "p": 2}]}));
        let mut b = RawRecord::new();
        b.insert("a".to_string(), json!({"x": [1, {"p": 2, "q": 1}], "y": 2}));
        b.insert("b".to_string(), json!(1));

        assert_eq!(content_hash(&a).unwrap(), content_hash(&b).unwrap());
        assert_eq!(
            canonical_json(&a).unwrap(),
            r#"{"a":{"x":[1,{"p":2,"q":1}],"y":2},"b":1}"#
        );
    }

    #[test]
    fn values_change_hash() {
        let a = raw(json!({"applicant_first_name": "John"}));
        let b = raw(json!({"applicant_first_name": "Jane"}));
        assert_ne!(content_hash(&a).unwrap(), content_hash(&b).unwrap());
        assert_eq!(content_hash(&a).unwrap().len(), 64);
    }
}
