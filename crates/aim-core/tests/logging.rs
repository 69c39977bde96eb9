//! Submitted values must stay out of the engine's own log lines.

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use serde_json::json;
use tracing_subscriber::fmt::MakeWriter;

use aim_config::{FieldMappingSpec, MappingDescriptor, default_config};
use aim_core::{MappingEngine, ProcessOptions};
use aim_model::{RawRecord, Stage};
use aim_transform::DataType;

#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl Captured {
    fn text(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for Captured {
    type Writer = Captured;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

#[test]
fn failed_cast_logs_location_not_value() {
    let mut config = default_config();
    config.field_mappings.get_mut("life").unwrap().insert(
        "applicant_last_name".to_string(),
        FieldMappingSpec::Descriptor(
            MappingDescriptor::new("insured_last_name").with_data_type(DataType::Int),
        ),
    );
    let engine = MappingEngine::new(config);
    let input: RawRecord = match json!({
        "applicant_first_name": "John",
        "applicant_last_name": "Secretname",
        "applicant_gender": "M"
    }) {
        serde_json::Value::Object(map) => map,
        other => panic!("expected an object, got {other}"),
    };
    let options = ProcessOptions::new().with_as_of(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());

    let captured = Captured::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(captured.clone())
        .with_max_level(tracing::Level::TRACE)
        .with_ansi(false)
        .finish();
    let result = tracing::subscriber::with_default(subscriber, || {
        engine.process_with(&input, "life", "basic", &options)
    });

    assert_eq!(result.stage(), Some(Stage::Mapping));
    assert!(result.errors()[0].message.contains("Secretname"));

    let log = captured.text();
    assert!(log.contains("processing failed"), "{log}");
    assert!(log.contains("insured_last_name"), "{log}");
    assert!(log.contains("data_type"), "{log}");
    assert!(!log.contains("Secretname"), "{log}");
}
