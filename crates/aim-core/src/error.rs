use thiserror::Error;

use aim_config::ConfigurationError;
use aim_ingest::ParsingError;
use aim_map::MappingError;
use aim_model::{ModelError, RuleKind, Stage, ValidationIssue};

/// A stage failure that aborts one processing call.
///
/// Validation failures are not errors; they come back as data in
/// [`crate::PipelineOutcome::Rejected`].
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("parsing failed: {0}")]
    Parsing(#[from] ParsingError),

    #[error("mapping failed: {0}")]
    Mapping(#[from] MappingError),

    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("invalid request: {0}")]
    Request(#[from] ModelError),
}

impl EngineError {
    pub fn stage(&self) -> Stage {
        match self {
            Self::Parsing(_) => Stage::Parsing,
            Self::Mapping(_) => Stage::Mapping,
            Self::Configuration(_) | Self::Request(_) => Stage::Configuration,
        }
    }

    /// Field the failure is attributed to, when there is one.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Parsing(err) => Some(err.field_path()),
            Self::Mapping(err) => err.field(),
            Self::Configuration(_) | Self::Request(_) => None,
        }
    }

    /// Name of the transformation that failed during mapping.
    pub fn transformation(&self) -> Option<&str> {
        match self {
            Self::Mapping(err) => err.transformation(),
            _ => None,
        }
    }

    /// The single error entry reported for this failure.
    pub fn to_issue(&self) -> ValidationIssue {
        let (field, rule) = match self {
            Self::Parsing(err) => (err.field_path().to_string(), RuleKind::Parsing),
            Self::Mapping(err) => (err.field().unwrap_or_default().to_string(), RuleKind::Mapping),
            Self::Configuration(_) => (String::new(), RuleKind::Configuration),
            Self::Request(ModelError::UnknownValidationLevel(_)) => {
                ("validation_level".to_string(), RuleKind::Configuration)
            }
            Self::Request(ModelError::EmptyProductType) => {
                ("product_type".to_string(), RuleKind::Configuration)
            }
            Self::Request(_) => (String::new(), RuleKind::Configuration),
        };
        ValidationIssue::new(field, rule, self.to_string())
    }
}
