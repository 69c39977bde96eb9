//! Processing a batch of raw records read from one input file.

use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::{info, info_span, warn};

use aim_core::{MappingEngine, ProcessOptions};
use aim_model::{ProcessingResult, RawRecord};
use aim_store::{RecordStore, SaveOutcome, StoreError};

use crate::logging::redact_value;

/// What to process a batch as.
#[derive(Debug, Clone)]
pub struct BatchRequest {
    pub product: String,
    pub level: String,
    pub options: ProcessOptions,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordOutcome {
    /// 1-based position in the input file.
    pub index: usize,
    pub result: ProcessingResult,
    pub stored: Option<SaveOutcome>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
    pub records: Vec<RecordOutcome>,
}

#[derive(Serialize)]
struct IndexedResult<'a> {
    record: usize,
    #[serde(flatten)]
    result: &'a ProcessingResult,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.records
            .iter()
            .filter(|record| record.result.is_success())
            .count()
    }

    pub fn failed(&self) -> usize {
        self.records.len() - self.succeeded()
    }

    pub fn has_failures(&self) -> bool {
        self.failed() > 0
    }

    pub fn warning_count(&self) -> usize {
        self.records
            .iter()
            .map(|record| record.result.warnings().len())
            .sum()
    }

    pub fn saved(&self) -> usize {
        self.count_stored(|outcome| matches!(outcome, SaveOutcome::Saved { .. }))
    }

    pub fn duplicates(&self) -> usize {
        self.count_stored(|outcome| matches!(outcome, SaveOutcome::Duplicate { .. }))
    }

    fn count_stored(&self, pick: impl Fn(&SaveOutcome) -> bool) -> usize {
        self.records
            .iter()
            .filter_map(|record| record.stored.as_ref())
            .filter(|outcome| pick(outcome))
            .count()
    }

    /// Pretty JSON array of results, each tagged with its record number.
    pub fn results_json(&self) -> serde_json::Result<String> {
        let indexed: Vec<IndexedResult<'_>> = self
            .records
            .iter()
            .map(|record| IndexedResult {
                record: record.index,
                result: &record.result,
            })
            .collect();
        serde_json::to_string_pretty(&indexed)
    }
}

/// Progress bar on stderr, hidden when `visible` is false.
pub fn progress_bar(len: usize, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(u64::try_from(len).unwrap_or(u64::MAX));
    let style = ProgressStyle::with_template("{spinner} [{bar:40}] {pos}/{len} records {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ");
    bar.set_style(style);
    bar
}

/// Processes every record; successful ones are saved when a store is given.
pub fn process_batch(
    engine: &MappingEngine,
    records: &[RawRecord],
    request: &BatchRequest,
    store: Option<&RecordStore>,
    progress: &ProgressBar,
) -> Result<BatchReport, StoreError> {
    let span = info_span!("batch", product = %request.product, level = %request.level, records = records.len());
    let _guard = span.enter();
    let mut report = BatchReport::default();

    for (offset, raw) in records.iter().enumerate() {
        let index = offset + 1;
        let result = engine.process_with(raw, &request.product, &request.level, &request.options);
        if !result.is_success() {
            log_rejection(index, raw, &result);
        }
        let stored = match (store, result.output()) {
            (Some(store), Some(output)) => Some(store.save(result.product_type(), raw, Some(output))?),
            _ => None,
        };
        report.records.push(RecordOutcome {
            index,
            result,
            stored,
        });
        progress.inc(1);
    }
    progress.finish_and_clear();

    info!(
        succeeded = report.succeeded(),
        failed = report.failed(),
        warnings = report.warning_count(),
        "batch complete"
    );
    Ok(report)
}

fn log_rejection(index: usize, raw: &RawRecord, result: &ProcessingResult) {
    for error in result.errors() {
        let value = raw
            .get(&error.field)
            .map(ToString::to_string)
            .unwrap_or_default();
        warn!(
            record = index,
            field = %error.field,
            rule = error.rule_violated.as_str(),
            value = redact_value(&value),
            "record rejected"
        );
    }
}
