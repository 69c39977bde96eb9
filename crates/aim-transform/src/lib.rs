//! Value transformations for mapped actuarial fields.
//!
//! Transformations are declared in configuration (see [`TransformationRule`])
//! and executed in declaration order, each one receiving the previous
//! step's output.

pub mod error;
pub mod executors;
pub mod normalization;
pub mod rules;

pub use error::TransformFailure;
pub use rules::{CaseMode, DataType, TransformationRule};
