//! Field mapping, transformation and output template schema.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use aim_model::FieldValue;
use aim_transform::{DataType, TransformationRule};

use crate::hash::sha256_hex;
use crate::rules::ValidationRuleTable;

/// Source field name to mapping, for one product.
pub type ProductMappings = BTreeMap<String, FieldMappingSpec>;

/// Section name to section layout, for one product.
pub type OutputTemplate = BTreeMap<String, TemplateSection>;

/// The four configuration documents, loaded once and shared read-only by
/// every processing call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub field_mappings: BTreeMap<String, ProductMappings>,
    pub validation_rules: ValidationRuleTable,
    pub transformations: BTreeMap<String, ProductTransformations>,
    pub output_templates: BTreeMap<String, OutputTemplate>,
}

impl EngineConfig {
    pub fn mappings_for(&self, product: &str) -> Option<&ProductMappings> {
        self.field_mappings.get(product)
    }

    pub fn transformations_for(&self, product: &str) -> Option<&ProductTransformations> {
        self.transformations.get(product)
    }

    pub fn template_for(&self, product: &str) -> Option<&OutputTemplate> {
        self.output_templates.get(product)
    }

    /// Every product named by any document, sorted. `base` is not a product.
    pub fn supported_products(&self) -> Vec<String> {
        let mut products: BTreeSet<&str> = BTreeSet::new();
        products.extend(self.field_mappings.keys().map(String::as_str));
        products.extend(self.validation_rules.products());
        products.extend(self.transformations.keys().map(String::as_str));
        products.extend(self.output_templates.keys().map(String::as_str));
        products.into_iter().map(str::to_string).collect()
    }

    pub fn is_supported(&self, product: &str) -> bool {
        self.field_mappings.contains_key(product) && self.output_templates.contains_key(product)
    }

    /// Source field names a submission for `product` may carry, sorted.
    pub fn source_fields(&self, product: &str) -> Vec<String> {
        let mut fields: BTreeSet<String> = BTreeSet::new();
        if let Some(mappings) = self.mappings_for(product) {
            fields.extend(mappings.keys().cloned());
        }
        for level in aim_model::ValidationLevel::ALL {
            let rules = self.validation_rules.rules_at(product, level);
            fields.extend(rules.referenced_fields().into_iter().map(str::to_string));
        }
        fields.into_iter().collect()
    }

    /// SHA-256 of the canonical JSON form. Maps are ordered, so equal
    /// configurations always share a fingerprint.
    pub fn fingerprint(&self) -> String {
        sha256_hex(&serde_json::to_vec(self).unwrap_or_default())
    }
}

/// How one source field maps to the target schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldMappingSpec {
    /// Plain rename.
    Direct(String),
    Descriptor(MappingDescriptor),
}

impl FieldMappingSpec {
    pub fn target_field(&self) -> &str {
        match self {
            Self::Direct(target) => target,
            Self::Descriptor(descriptor) => &descriptor.target_field,
        }
    }

    pub fn descriptor(&self) -> Option<&MappingDescriptor> {
        match self {
            Self::Direct(_) => None,
            Self::Descriptor(descriptor) => Some(descriptor),
        }
    }

    /// True for renames, including descriptors that only name a target.
    pub fn is_rename(&self) -> bool {
        self.descriptor().is_none_or(MappingDescriptor::is_plain)
    }
}

/// Structured mapping with value translation and conversion steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MappingDescriptor {
    pub target_field: String,
    /// Source display value to replacement value.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub value_mapping: BTreeMap<String, FieldValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_type: Option<DataType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale_factor: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<MappingCondition>,
    /// Names resolved against the product's named transformations, then
    /// the built-ins.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub transformations: Vec<String>,
}

impl MappingDescriptor {
    pub fn new(target_field: impl Into<String>) -> Self {
        Self {
            target_field: target_field.into(),
            value_mapping: BTreeMap::new(),
            data_type: None,
            scale_factor: None,
            conditions: Vec::new(),
            transformations: Vec::new(),
        }
    }

    pub fn with_value_mapping<K, V>(mut self, entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<FieldValue>,
    {
        self.value_mapping
            .extend(entries.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn with_data_type(mut self, data_type: DataType) -> Self {
        self.data_type = Some(data_type);
        self
    }

    pub fn with_transformations<S: Into<String>>(
        mut self,
        names: impl IntoIterator<Item = S>,
    ) -> Self {
        self.transformations.extend(names.into_iter().map(Into::into));
        self
    }

    /// No step beyond the rename.
    pub fn is_plain(&self) -> bool {
        self.value_mapping.is_empty()
            && self.data_type.is_none()
            && self.scale_factor.is_none()
            && self.conditions.is_empty()
            && self.transformations.is_empty()
    }

    /// Number of configured steps, for summaries.
    pub fn step_count(&self) -> usize {
        usize::from(!self.value_mapping.is_empty())
            + usize::from(self.data_type.is_some())
            + usize::from(self.scale_factor.is_some())
            + self.conditions.len()
            + self.transformations.len()
    }
}

/// Replace the value with `result` when `operator` holds against `value`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MappingCondition {
    pub operator: ConditionOperator,
    pub value: ConditionValue,
    pub result: FieldValue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionOperator {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
    NotIn,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConditionValue {
    One(FieldValue),
    Many(Vec<FieldValue>),
}

/// `transformations.json` entry for one product.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProductTransformations {
    /// Reusable rules referenced by name.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub named: BTreeMap<String, TransformationRule>,
    /// Steps run on a target field after its mapping, in order.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub fields: BTreeMap<String, Vec<TransformStep>>,
}

impl ProductTransformations {
    /// Looks a name up among the named rules, then the built-ins.
    pub fn resolve(&self, name: &str) -> Option<TransformationRule> {
        self.named
            .get(name)
            .cloned()
            .or_else(|| TransformationRule::builtin(name))
    }

    pub fn steps_for(&self, target_field: &str) -> &[TransformStep] {
        self.fields.get(target_field).map_or(&[], Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.named.is_empty() && self.fields.is_empty()
    }
}

/// A step is either a reference to a named rule or an inline rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TransformStep {
    Named(String),
    Inline(TransformationRule),
}

/// One output section: ordered fields plus fallbacks for absent values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TemplateSection {
    pub fields: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub defaults: BTreeMap<String, FieldValue>,
}

impl TemplateSection {
    pub fn new<S: Into<String>>(fields: impl IntoIterator<Item = S>) -> Self {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
            defaults: BTreeMap::new(),
        }
    }

    pub fn with_default(mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.defaults.insert(field.into(), value.into());
        self
    }
}

/// All field names a template declares, across sections.
pub fn template_fields(template: &OutputTemplate) -> BTreeSet<&str> {
    template
        .values()
        .flat_map(|section| section.fields.iter().map(String::as_str))
        .collect()
}
