//! Input validation for normalized FAST UI records.
//!
//! Levels are cumulative: `full` runs the `basic` rules plus its own, and
//! `strict` runs all three. Violations are data ([`ValidationReport`]), never
//! errors; only unusable configuration yields a
//! [`ConfigurationError`](aim_config::ConfigurationError).
//!
//! [`ValidationReport`]: aim_model::ValidationReport

pub mod checks;
mod validator;

pub use checks::{CompiledRuleSet, matches_type};
pub use validator::Validator;
