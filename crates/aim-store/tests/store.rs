//! Tests for the SQLite record store.

use serde_json::{Value, json};
use tempfile::TempDir;

use aim_model::{FieldValue, OutputRecord, RawRecord};
use aim_store::{RecordStore, SaveOutcome};

fn raw(value: Value) -> RawRecord {
    match value {
        Value::Object(map) => map,
        other => panic!("expected an object, got {other}"),
    }
}

fn john() -> RawRecord {
    raw(json!({"applicant_first_name": "John", "applicant_last_name": "Smith", "policy_face_amount": 250000}))
}

#[test]
fn identical_content_is_a_duplicate() {
    let store = RecordStore::open_in_memory().unwrap();
    let SaveOutcome::Saved { id } = store.save("life", &john(), None).unwrap() else {
        panic!("first save should store the record");
    };

    let reordered = raw(json!({"policy_face_amount": 250000, "applicant_last_name": "Smith", "applicant_first_name": "John"}));
    assert_eq!(
        store.save("life", &reordered, None).unwrap(),
        SaveOutcome::Duplicate { existing_id: id }
    );
    assert_eq!(store.stats().unwrap().total, 1);
}

#[test]
fn records_persist_across_connections() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("aim.db");
    let mut output = OutputRecord::new();
    output.insert("insured_info", "insured_first_name", FieldValue::from("John"));

    {
        let store = RecordStore::open(&path).unwrap();
        store.save("life", &john(), Some(&output)).unwrap();
    }

    let store = RecordStore::open(&path).unwrap();
    let records = store.list().unwrap();
    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record.product_type, "life");
    assert_eq!(record.data["applicant_first_name"], "John");
    assert_eq!(record.output.as_ref(), Some(&output));
    assert_eq!(record.data_hash.len(), 64);
    assert_eq!(store.get(record.id).unwrap().as_ref(), Some(record));
}

#[test]
fn list_is_newest_first_and_search_filters() {
    let store = RecordStore::open_in_memory().unwrap();
    store.save("life", &john(), None).unwrap();
    store
        .save("annuity", &raw(json!({"annuitant_first_name": "Mary", "initial_premium": 5000})), None)
        .unwrap();
    store
        .save("life", &raw(json!({"applicant_first_name": "Maria", "applicant_last_name": "Lopez"})), None)
        .unwrap();

    let all = store.list().unwrap();
    assert_eq!(all.len(), 3);
    assert!(all.windows(2).all(|pair| pair[0].id > pair[1].id));

    assert_eq!(store.search("mar", None).unwrap().len(), 2);
    let life = store.search("MAR", Some("life")).unwrap();
    assert_eq!(life.len(), 1);
    assert_eq!(life[0].data["applicant_first_name"], "Maria");
    assert!(store.search("nobody", None).unwrap().is_empty());

    let stats = store.stats().unwrap();
    assert_eq!(stats.total, 3);
    assert_eq!(stats.by_product.get("life"), Some(&2));
    assert_eq!(stats.by_product.get("annuity"), Some(&1));
}

#[test]
fn delete_and_clear() {
    let store = RecordStore::open_in_memory().unwrap();
    let SaveOutcome::Saved { id } = store.save("life", &john(), None).unwrap() else {
        panic!("expected save");
    };
    store
        .save("life", &raw(json!({"applicant_first_name": "Jane"})), None)
        .unwrap();

    assert!(store.delete(id).unwrap());
    assert!(!store.delete(id).unwrap());
    assert!(store.get(id).unwrap().is_none());
    assert_eq!(store.clear().unwrap(), 1);
    assert!(store.list().unwrap().is_empty());
}

#[test]
fn duplicate_names_ignore_case() {
    let store = RecordStore::open_in_memory().unwrap();
    store.save("life", &john(), None).unwrap();
    store
        .save("life", &raw(json!({"applicant_first_name": "JOHN", "applicant_last_name": "smith", "premium_mode": "A"})), None)
        .unwrap();
    store
        .save("health", &raw(json!({"first_name": "Ann", "last_name": "Lee"})), None)
        .unwrap();
    store
        .save("life", &raw(json!({"applicant_first_name": "Ann"})), None)
        .unwrap();

    let groups = store.duplicate_names().unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].name, "john smith");
    assert_eq!(groups[0].ids.len(), 2);
    assert!(groups[0].ids[0] < groups[0].ids[1]);
}
