//! Per-call processing options.

use chrono::NaiveDate;

use aim_ingest::ParseOptions;

/// Options for one `process` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessOptions {
    /// Date ages are computed against. Defaults to today.
    pub as_of: Option<NaiveDate>,
    pub parse: ParseOptions,
}

impl ProcessOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_as_of(mut self, as_of: NaiveDate) -> Self {
        self.as_of = Some(as_of);
        self
    }

    pub fn with_parse_options(mut self, parse: ParseOptions) -> Self {
        self.parse = parse;
        self
    }

    pub(crate) fn resolved_as_of(&self) -> NaiveDate {
        self.as_of
            .unwrap_or_else(|| chrono::Local::now().date_naive())
    }
}
