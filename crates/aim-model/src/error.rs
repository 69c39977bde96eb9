use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("product type must not be empty")]
    EmptyProductType,
    #[error("unknown validation level '{0}' (expected basic, full or strict)")]
    UnknownValidationLevel(String),
    #[error("{kind} values are not scalar field values")]
    CompositeValue { kind: &'static str },
}

pub type Result<T> = std::result::Result<T, ModelError>;
