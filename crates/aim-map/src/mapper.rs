//! Source-to-target field mapping for one product.

use std::collections::BTreeMap;

use tracing::{debug, trace, warn};

use aim_config::{
    ConditionOperator, ConditionValue, EngineConfig, FieldMappingSpec, MappingCondition,
    MappingDescriptor, ProductMappings, ProductTransformations, TransformStep,
};
use aim_model::{FieldValue, Record, Warning, WarningCode};
use aim_transform::TransformationRule;

use crate::error::MappingError;
use crate::value_table::lookup;

/// A record renamed into actuarial field names.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MappedRecord {
    pub record: Record,
    pub warnings: Vec<Warning>,
    /// Source fields with no mapping, in field order.
    pub dropped_fields: Vec<String>,
}

/// Applies one product's field mappings and field transformations.
#[derive(Debug, Clone, Copy)]
pub struct FieldMapper<'a> {
    mappings: &'a ProductMappings,
    transformations: Option<&'a ProductTransformations>,
}

impl<'a> FieldMapper<'a> {
    pub fn new(mappings: &'a ProductMappings, transformations: Option<&'a ProductTransformations>) -> Self {
        Self {
            mappings,
            transformations,
        }
    }

    pub fn for_product(config: &'a EngineConfig, product: &str) -> Result<Self, MappingError> {
        let mappings = config
            .mappings_for(product)
            .ok_or_else(|| MappingError::UnknownProduct {
                product: product.to_string(),
            })?;
        Ok(Self::new(mappings, config.transformations_for(product)))
    }

    /// Maps every source field that has a mapping.
    ///
    /// Fields are visited in name order. When two sources produce the same
    /// target the first keeps it and the second is reported as a warning.
    pub fn map(&self, record: &Record) -> Result<MappedRecord, MappingError> {
        let mut mapped = MappedRecord::default();
        let mut sources: BTreeMap<&str, &str> = BTreeMap::new();

        for (source, value) in record {
            let Some(spec) = self.mappings.get(source) else {
                debug!(field = %source, "no mapping configured, dropping field");
                mapped.dropped_fields.push(source.clone());
                continue;
            };
            let target = spec.target_field();
            if let Some(first) = sources.get(target) {
                warn!(target = %target, first = %first, second = %source, "duplicate mapping target");
                mapped.warnings.push(Warning::for_field(
                    target,
                    WarningCode::DuplicateTarget,
                    format!("fields '{first}' and '{source}' both map to '{target}': keeping '{first}'"),
                ));
                continue;
            }
            sources.insert(target, source);

            let value = self.map_value(spec, value.clone(), &mut mapped.warnings)?;
            let value = self.apply_field_steps(target, value)?;
            trace!(source = %source, target = %target, "mapped field");
            mapped.record.insert(target, value);
        }
        Ok(mapped)
    }

    fn map_value(
        &self,
        spec: &FieldMappingSpec,
        value: FieldValue,
        warnings: &mut Vec<Warning>,
    ) -> Result<FieldValue, MappingError> {
        match spec {
            FieldMappingSpec::Direct(_) => Ok(value),
            FieldMappingSpec::Descriptor(descriptor) => {
                if value.is_null() {
                    return Ok(value);
                }
                self.apply_descriptor(descriptor, value, warnings)
            }
        }
    }

    /// Descriptor steps run in a fixed order: data type, value table, scale,
    /// conditions, then named transformations.
    fn apply_descriptor(
        &self,
        descriptor: &MappingDescriptor,
        mut value: FieldValue,
        warnings: &mut Vec<Warning>,
    ) -> Result<FieldValue, MappingError> {
        let target = descriptor.target_field.as_str();

        if let Some(to) = descriptor.data_type {
            value = run_rule(target, "data_type", &TransformationRule::DataType { to }, &value)?;
        }

        if !descriptor.value_mapping.is_empty() {
            match lookup(&descriptor.value_mapping, &value) {
                Some(replacement) => value = replacement.clone(),
                None => {
                    warn!(field = %target, "value not in value mapping, keeping original");
                    warnings.push(Warning::for_field(
                        target,
                        WarningCode::UnmappedValue,
                        format!("unmapped value for field {target}: using original"),
                    ));
                }
            }
        }

        if let Some(factor) = descriptor.scale_factor
            && value.is_numeric()
        {
            value = run_rule(target, "scale", &TransformationRule::Scale { factor }, &value)?;
        }

        if let Some(condition) = descriptor
            .conditions
            .iter()
            .find(|condition| condition_holds(condition, &value))
        {
            value = condition.result.clone();
        }

        for name in &descriptor.transformations {
            let rule = self.resolve(target, name)?;
            value = run_rule(target, name, &rule, &value)?;
        }
        Ok(value)
    }

    fn apply_field_steps(&self, target: &str, mut value: FieldValue) -> Result<FieldValue, MappingError> {
        let Some(transformations) = self.transformations else {
            return Ok(value);
        };
        for step in transformations.steps_for(target) {
            value = match step {
                TransformStep::Named(name) => {
                    let rule = self.resolve(target, name)?;
                    run_rule(target, name, &rule, &value)?
                }
                TransformStep::Inline(rule) => run_rule(target, rule.kind(), rule, &value)?,
            };
        }
        Ok(value)
    }

    fn resolve(&self, target: &str, name: &str) -> Result<TransformationRule, MappingError> {
        self.transformations
            .and_then(|transformations| transformations.resolve(name))
            .or_else(|| TransformationRule::builtin(name))
            .ok_or_else(|| MappingError::UnknownTransformation {
                field: target.to_string(),
                transformation: name.to_string(),
            })
    }
}

fn run_rule(
    target: &str,
    name: &str,
    rule: &TransformationRule,
    value: &FieldValue,
) -> Result<FieldValue, MappingError> {
    rule.apply(value)
        .map_err(|source| MappingError::TransformationFailed {
            field: target.to_string(),
            transformation: name.to_string(),
            source,
        })
}

/// Evaluates one condition. Comparisons that cannot be made are false.
pub fn condition_holds(condition: &MappingCondition, value: &FieldValue) -> bool {
    let expected = &condition.value;
    match condition.operator {
        ConditionOperator::Eq => one(expected).is_some_and(|other| same_value(value, other)),
        ConditionOperator::Ne => one(expected).is_some_and(|other| !same_value(value, other)),
        ConditionOperator::Gt => compare(value, expected).is_some_and(|(a, b)| a > b),
        ConditionOperator::Gte => compare(value, expected).is_some_and(|(a, b)| a >= b),
        ConditionOperator::Lt => compare(value, expected).is_some_and(|(a, b)| a < b),
        ConditionOperator::Lte => compare(value, expected).is_some_and(|(a, b)| a <= b),
        ConditionOperator::In => choices(expected).iter().any(|other| same_value(value, other)),
        ConditionOperator::NotIn => !choices(expected).iter().any(|other| same_value(value, other)),
    }
}

fn one(expected: &ConditionValue) -> Option<&FieldValue> {
    match expected {
        ConditionValue::One(value) => Some(value),
        ConditionValue::Many(_) => None,
    }
}

fn choices(expected: &ConditionValue) -> &[FieldValue] {
    match expected {
        ConditionValue::One(value) => std::slice::from_ref(value),
        ConditionValue::Many(values) => values,
    }
}

fn compare(value: &FieldValue, expected: &ConditionValue) -> Option<(f64, f64)> {
    Some((value.coerce_f64()?, one(expected)?.coerce_f64()?))
}

fn same_value(left: &FieldValue, right: &FieldValue) -> bool {
    if left == right {
        return true;
    }
    match (left.as_f64(), right.as_f64()) {
        (Some(a), Some(b)) => a == b,
        _ => left.to_string() == right.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn condition(operator: ConditionOperator, value: ConditionValue) -> MappingCondition {
        MappingCondition {
            operator,
            value,
            result: FieldValue::from("hit"),
        }
    }

    #[test]
    fn numeric_comparisons() {
        let gt = condition(ConditionOperator::Gt, ConditionValue::One(FieldValue::Integer(30)));
        assert!(condition_holds(&gt, &FieldValue::Integer(31)));
        assert!(condition_holds(&gt, &FieldValue::from("40")));
        assert!(!condition_holds(&gt, &FieldValue::Float(30.0)));
        assert!(!condition_holds(&gt, &FieldValue::from("many")));

        let lte = condition(ConditionOperator::Lte, ConditionValue::One(FieldValue::Float(2.5)));
        assert!(condition_holds(&lte, &FieldValue::Integer(2)));
    }

    #[test]
    fn equality_and_membership() {
        let eq = condition(ConditionOperator::Eq, ConditionValue::One(FieldValue::Integer(1)));
        assert!(condition_holds(&eq, &FieldValue::Float(1.0)));
        assert!(condition_holds(&eq, &FieldValue::from("1")));

        let members = ConditionValue::Many(vec!["A".into(), "B".into()]);
        assert!(condition_holds(&condition(ConditionOperator::In, members.clone()), &"B".into()));
        assert!(condition_holds(&condition(ConditionOperator::NotIn, members), &"C".into()));

        let list_eq = condition(ConditionOperator::Eq, ConditionValue::Many(vec!["A".into()]));
        assert!(!condition_holds(&list_eq, &"A".into()));
    }
}
