//! Per-product description of the configured mappings.

use serde::Serialize;

use aim_config::{EngineConfig, FieldMappingSpec, TransformStep};

use crate::error::MappingError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MappingKind {
    Simple,
    Complex,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldSummary {
    pub source_field: String,
    pub target_field: String,
    pub kind: MappingKind,
    /// Descriptor steps followed by per-field transformations.
    pub steps: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MappingSummary {
    pub product_type: String,
    pub total_mappings: usize,
    pub simple_mappings: usize,
    pub complex_mappings: usize,
    pub fields: Vec<FieldSummary>,
}

pub fn mapping_summary(config: &EngineConfig, product: &str) -> Result<MappingSummary, MappingError> {
    let mappings = config
        .mappings_for(product)
        .ok_or_else(|| MappingError::UnknownProduct {
            product: product.to_string(),
        })?;
    let transformations = config.transformations_for(product);

    let fields: Vec<FieldSummary> = mappings
        .iter()
        .map(|(source, spec)| {
            let target = spec.target_field();
            let mut steps = descriptor_steps(spec);
            if let Some(transformations) = transformations {
                steps.extend(transformations.steps_for(target).iter().map(|step| match step {
                    TransformStep::Named(name) => name.clone(),
                    TransformStep::Inline(rule) => rule.kind().to_string(),
                }));
            }
            FieldSummary {
                source_field: source.clone(),
                target_field: target.to_string(),
                kind: if spec.is_rename() {
                    MappingKind::Simple
                } else {
                    MappingKind::Complex
                },
                steps,
            }
        })
        .collect();

    let simple_mappings = fields
        .iter()
        .filter(|field| field.kind == MappingKind::Simple)
        .count();
    Ok(MappingSummary {
        product_type: product.to_string(),
        total_mappings: fields.len(),
        simple_mappings,
        complex_mappings: fields.len() - simple_mappings,
        fields,
    })
}

fn descriptor_steps(spec: &FieldMappingSpec) -> Vec<String> {
    let Some(descriptor) = spec.descriptor() else {
        return Vec::new();
    };
    let mut steps = Vec::new();
    if let Some(to) = descriptor.data_type {
        steps.push(format!("data_type:{to}"));
    }
    if !descriptor.value_mapping.is_empty() {
        steps.push("value_mapping".to_string());
    }
    if descriptor.scale_factor.is_some() {
        steps.push("scale".to_string());
    }
    if !descriptor.conditions.is_empty() {
        steps.push("conditions".to_string());
    }
    steps.extend(descriptor.transformations.iter().cloned());
    steps
}
