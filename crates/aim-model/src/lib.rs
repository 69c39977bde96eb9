pub mod error;
pub mod issues;
pub mod processing;
pub mod product;
pub mod record;
pub mod value;

pub use error::{ModelError, Result};
pub use issues::{RuleKind, ValidationIssue, ValidationReport, Warning, WarningCode};
pub use processing::{ProcessingMetadata, ProcessingResult, Stage};
pub use product::{ProductType, ValidationLevel};
pub use record::{OutputRecord, RawRecord, Record};
pub use value::{FieldValue, number_to_field};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_counts() {
        let mut report = ValidationReport::new(ValidationLevel::Full);
        report.issues.push(ValidationIssue::new(
            "applicant_birth_date",
            RuleKind::Required,
            "Required field 'applicant_birth_date' is missing or empty",
        ));
        report.warnings.push(Warning::for_field(
            "applicant_birth_date",
            WarningCode::AgeReview,
            "Applicant age 70 requires special review",
        ));
        assert_eq!(report.error_count(), 1);
        assert_eq!(report.warning_count(), 1);
        assert!(!report.is_valid());
        assert_eq!(report.issues_for("applicant_birth_date").count(), 1);
    }
}
