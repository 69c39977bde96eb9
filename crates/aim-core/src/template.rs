//! Output template assembly.

use aim_config::OutputTemplate;
use aim_model::{FieldValue, OutputRecord, Record};

/// Places mapped values into the template's sections.
///
/// A field without a mapped value takes the section default, or null when
/// none is declared. Mapped fields the template does not declare are left
/// out.
pub fn assemble(template: &OutputTemplate, mapped: &Record) -> OutputRecord {
    let mut output = OutputRecord::new();
    for (section_name, section) in template {
        output.add_section(section_name.as_str());
        for field in &section.fields {
            let value = mapped
                .value(field)
                .or_else(|| section.defaults.get(field))
                .cloned()
                .unwrap_or(FieldValue::Null);
            output.insert(section_name, field.as_str(), value);
        }
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use aim_config::TemplateSection;

    #[test]
    fn defaults_fill_gaps_and_extras_are_dropped() {
        let template = OutputTemplate::from([(
            "policy_info".to_string(),
            TemplateSection::new(["coverage_amount", "premium_frequency", "policy_start_date"])
                .with_default("premium_frequency", "Monthly"),
        )]);
        let mapped: Record = [
            ("coverage_amount", FieldValue::Float(1000.0)),
            ("agent_code", FieldValue::from("X1")),
        ]
        .into_iter()
        .collect();

        let output = assemble(&template, &mapped);
        assert_eq!(output.get("policy_info", "coverage_amount"), Some(&FieldValue::Float(1000.0)));
        assert_eq!(output.get("policy_info", "premium_frequency"), Some(&FieldValue::from("Monthly")));
        assert_eq!(output.get("policy_info", "policy_start_date"), Some(&FieldValue::Null));
        assert_eq!(output.get("policy_info", "agent_code"), None);
        assert_eq!(output.field_count(), 3);
    }

    #[test]
    fn null_mapped_value_takes_default() {
        let template = OutputTemplate::from([(
            "insured_info".to_string(),
            TemplateSection::new(["insured_gender"]).with_default("insured_gender", "Unknown"),
        )]);
        let mapped: Record = [("insured_gender", FieldValue::Null)].into_iter().collect();
        let output = assemble(&template, &mapped);
        assert_eq!(output.get("insured_info", "insured_gender"), Some(&FieldValue::from("Unknown")));
    }

    #[test]
    fn empty_section_is_kept() {
        let template = OutputTemplate::from([("notes".to_string(), TemplateSection::default())]);
        let output = assemble(&template, &Record::new());
        assert_eq!(output.section_names().collect::<Vec<_>>(), vec!["notes"]);
    }
}
