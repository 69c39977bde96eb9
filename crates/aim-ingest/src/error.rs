//! Error types for FAST UI input handling.

use std::path::PathBuf;
use thiserror::Error;

/// A raw record that cannot be normalized into a flat record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParsingError {
    /// Containers nested beyond one section level or one array level.
    #[error("'{path}' is nested too deeply: {detail}")]
    NestingTooDeep { path: String, detail: &'static str },

    /// A field name that normalizes to nothing.
    #[error("field name '{path}' is empty after normalization")]
    EmptyFieldName { path: String },

    /// Two source fields that normalize to the same name.
    #[error("fields '{first}' and '{second}' both normalize to '{field}'")]
    FieldNameCollision {
        field: String,
        first: String,
        second: String,
    },
}

impl ParsingError {
    /// Path of the offending field, as written in the raw record.
    pub fn field_path(&self) -> &str {
        match self {
            Self::NestingTooDeep { path, .. } | Self::EmptyFieldName { path } => path,
            Self::FieldNameCollision { second, .. } => second,
        }
    }
}

/// Errors reading batches of raw records from files.
#[derive(Debug, Error)]
pub enum IngestError {
    // === File System Errors ===
    /// Input file not found.
    #[error("input file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Failed to read file.
    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write file.
    #[error("failed to write file {path}: {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File exceeds the size limit.
    #[error("file {path} is {size} bytes, above the {max_size} byte limit")]
    FileTooLarge {
        path: PathBuf,
        size: u64,
        max_size: u64,
    },

    /// Extension other than `.json` or `.csv`.
    #[error("unsupported input format for {path}: expected .json or .csv")]
    UnsupportedFormat { path: PathBuf },

    // === Content Errors ===
    /// JSON that does not parse.
    #[error("failed to parse JSON {path}: {source}")]
    JsonParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// JSON that parses but is not an object or an array of objects.
    #[error("{path}: item {index} is not a JSON object")]
    NotAnObject { path: PathBuf, index: usize },

    /// Malformed CSV.
    #[error("failed to parse CSV {path}: {source}")]
    CsvParse {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// CSV without a header row or without data rows.
    #[error("CSV file is empty: {path}")]
    EmptyCsv { path: PathBuf },

    /// Header cell that is blank.
    #[error("CSV file {path} has an empty column name at position {position}")]
    EmptyColumnName { path: PathBuf, position: usize },
}

/// Result type for file ingestion.
pub type Result<T> = std::result::Result<T, IngestError>;
