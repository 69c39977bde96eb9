//! Batch readers for uploaded submission files.
//!
//! `.json` files hold one object or an array of objects. `.csv` files hold a
//! header row followed by one record per row; every cell is read as text and
//! left for the parser to coerce.

use std::fs;
use std::path::Path;

use serde_json::Value;
use tracing::{debug, warn};

use aim_model::RawRecord;

use crate::error::{IngestError, Result};

/// Maximum input file size (50 MB).
pub const MAX_INPUT_FILE_SIZE: u64 = 50 * 1024 * 1024;

/// Supported input layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Json,
    Csv,
}

impl InputFormat {
    /// Detects the format from the file extension, case-insensitively.
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "json" => Some(Self::Json),
            "csv" => Some(Self::Csv),
            _ => None,
        }
    }
}

/// Check file existence and size before loading.
pub fn check_file_size(path: &Path, max_size: u64) -> Result<()> {
    let metadata = fs::metadata(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            IngestError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            IngestError::FileRead {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })?;
    if metadata.len() > max_size {
        return Err(IngestError::FileTooLarge {
            path: path.to_path_buf(),
            size: metadata.len(),
            max_size,
        });
    }
    Ok(())
}

/// Reads every raw record from a `.json` or `.csv` file.
pub fn read_records(path: &Path) -> Result<Vec<RawRecord>> {
    let format = InputFormat::from_path(path).ok_or_else(|| IngestError::UnsupportedFormat {
        path: path.to_path_buf(),
    })?;
    check_file_size(path, MAX_INPUT_FILE_SIZE)?;
    let records = match format {
        InputFormat::Json => read_json_records(path)?,
        InputFormat::Csv => read_csv_records(path)?,
    };
    debug!(path = %path.display(), records = records.len(), "read input file");
    Ok(records)
}

pub fn read_json_records(path: &Path) -> Result<Vec<RawRecord>> {
    let contents = fs::read_to_string(path).map_err(|source| IngestError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let document: Value =
        serde_json::from_str(&contents).map_err(|source| IngestError::JsonParse {
            path: path.to_path_buf(),
            source,
        })?;
    match document {
        Value::Object(record) => Ok(vec![record]),
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(index, item)| match item {
                Value::Object(record) => Ok(record),
                _ => Err(IngestError::NotAnObject {
                    path: path.to_path_buf(),
                    index,
                }),
            })
            .collect(),
        _ => Err(IngestError::NotAnObject {
            path: path.to_path_buf(),
            index: 0,
        }),
    }
}

pub fn read_csv_records(path: &Path) -> Result<Vec<RawRecord>> {
    let csv_error = |source| IngestError::CsvParse {
        path: path.to_path_buf(),
        source,
    };
    let contents = fs::read_to_string(path).map_err(|source| IngestError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    // A UTF-8 BOM would otherwise end up in the first header name.
    let contents = contents.strip_prefix('\u{feff}').unwrap_or(&contents);

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .flexible(true)
        .from_reader(contents.as_bytes());
    let headers = reader.headers().map_err(csv_error)?.clone();
    if headers.is_empty() {
        return Err(IngestError::EmptyCsv {
            path: path.to_path_buf(),
        });
    }
    if let Some(position) = headers.iter().position(|name| name.is_empty()) {
        return Err(IngestError::EmptyColumnName {
            path: path.to_path_buf(),
            position: position + 1,
        });
    }

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row.map_err(csv_error)?;
        if row.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        if row.len() != headers.len() {
            warn!(
                path = %path.display(),
                line = row.position().map(csv::Position::line),
                expected = headers.len(),
                found = row.len(),
                "CSV row length differs from header"
            );
        }
        let record: RawRecord = headers
            .iter()
            .zip(row.iter())
            .map(|(name, cell)| (name.to_string(), Value::String(cell.to_string())))
            .collect();
        records.push(record);
    }
    if records.is_empty() {
        return Err(IngestError::EmptyCsv {
            path: path.to_path_buf(),
        });
    }
    Ok(records)
}
