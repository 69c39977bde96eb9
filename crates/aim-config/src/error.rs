#![deny(unsafe_code)]

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("failed to read configuration file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("missing configuration file: {path}")]
    MissingFile { path: PathBuf },

    #[error("invalid configuration in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("refusing to overwrite existing configuration file: {path}")]
    AlreadyExists { path: PathBuf },

    #[error("configuration is inconsistent ({count} error(s)): {summary}")]
    Inconsistent { count: usize, summary: String },

    #[error("unsupported product type: {product}")]
    UnknownProduct { product: String },

    #[error("configuration for product '{product}' is broken: {reason}")]
    BrokenProduct { product: String, reason: String },
}

impl ConfigurationError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
