use serde::{Deserialize, Serialize};

use crate::issues::{ValidationIssue, Warning};
use crate::product::ValidationLevel;
use crate::record::OutputRecord;

/// Pipeline stage that produced an error result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Parsing,
    Validation,
    Mapping,
    Configuration,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingMetadata {
    pub validation_level: ValidationLevel,
    pub fields_parsed: usize,
    pub fields_mapped: usize,
    pub fields_output: usize,
    /// SHA-256 of the configuration the record was processed under.
    pub config_fingerprint: String,
}

/// Tagged result of one `process` call.
///
/// Serializes with a `status` discriminator of `success` or `error`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ProcessingResult {
    Success {
        product_type: String,
        output: OutputRecord,
        warnings: Vec<Warning>,
        metadata: ProcessingMetadata,
    },
    Error {
        product_type: String,
        stage: Stage,
        errors: Vec<ValidationIssue>,
        warnings: Vec<Warning>,
    },
}

impl ProcessingResult {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn product_type(&self) -> &str {
        match self {
            Self::Success { product_type, .. } | Self::Error { product_type, .. } => product_type,
        }
    }

    pub fn output(&self) -> Option<&OutputRecord> {
        match self {
            Self::Success { output, .. } => Some(output),
            Self::Error { .. } => None,
        }
    }

    pub fn errors(&self) -> &[ValidationIssue] {
        match self {
            Self::Success { .. } => &[],
            Self::Error { errors, .. } => errors,
        }
    }

    pub fn warnings(&self) -> &[Warning] {
        match self {
            Self::Success { warnings, .. } | Self::Error { warnings, .. } => warnings,
        }
    }

    pub fn stage(&self) -> Option<Stage> {
        match self {
            Self::Success { .. } => None,
            Self::Error { stage, .. } => Some(*stage),
        }
    }
}
