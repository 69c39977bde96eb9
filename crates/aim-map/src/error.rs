//! Error types for field mapping.

use thiserror::Error;

use aim_transform::TransformFailure;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MappingError {
    #[error("no field mappings configured for product '{product}'")]
    UnknownProduct { product: String },

    #[error("field '{field}' references unknown transformation '{transformation}'")]
    UnknownTransformation {
        field: String,
        transformation: String,
    },

    #[error("transformation '{transformation}' failed on field '{field}': {source}")]
    TransformationFailed {
        field: String,
        transformation: String,
        #[source]
        source: TransformFailure,
    },
}

impl MappingError {
    /// Target field the failure belongs to, if any.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::UnknownProduct { .. } => None,
            Self::UnknownTransformation { field, .. } | Self::TransformationFailed { field, .. } => {
                Some(field)
            }
        }
    }

    /// Transformation named by the failure, if any.
    pub fn transformation(&self) -> Option<&str> {
        match self {
            Self::UnknownProduct { .. } => None,
            Self::UnknownTransformation { transformation, .. }
            | Self::TransformationFailed { transformation, .. } => Some(transformation),
        }
    }
}
