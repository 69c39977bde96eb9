use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::{debug, warn};

use aim_config::{ConfigurationError, EngineConfig, check::rule_set_errors};
use aim_model::{Record, ValidationLevel, ValidationReport};

use crate::checks::{CompiledRuleSet, Findings};

/// Rule sets of one product, indexed by level.
#[derive(Debug, Clone, Default)]
struct ProductRules {
    levels: [CompiledRuleSet; 3],
}

impl ProductRules {
    fn at(&self, level: ValidationLevel) -> &CompiledRuleSet {
        match level {
            ValidationLevel::Basic => &self.levels[0],
            ValidationLevel::Full => &self.levels[1],
            ValidationLevel::Strict => &self.levels[2],
        }
    }
}

/// Validates normalized records against compiled per-product rules.
///
/// Rules are compiled once per product when the validator is built. A
/// product whose rules cannot be compiled stays known but every request for
/// it fails with [`ConfigurationError::BrokenProduct`].
#[derive(Debug, Clone, Default)]
pub struct Validator {
    products: BTreeMap<String, Result<ProductRules, String>>,
}

impl Validator {
    pub fn new(config: &EngineConfig) -> Self {
        let products = config
            .supported_products()
            .into_iter()
            .map(|product| {
                let compiled = compile_product(config, &product);
                if let Err(reason) = &compiled {
                    warn!(product = %product, reason = %reason, "validation rules are broken");
                }
                (product, compiled)
            })
            .collect();
        Self { products }
    }

    /// Checks that `product` is known and its rules compiled.
    pub fn ensure_product(&self, product: &str) -> Result<(), ConfigurationError> {
        self.rules_for(product).map(|_| ())
    }

    fn rules_for(&self, product: &str) -> Result<&ProductRules, ConfigurationError> {
        match self.products.get(product) {
            Some(Ok(rules)) => Ok(rules),
            Some(Err(reason)) => Err(ConfigurationError::BrokenProduct {
                product: product.to_string(),
                reason: reason.clone(),
            }),
            None => Err(ConfigurationError::UnknownProduct {
                product: product.to_string(),
            }),
        }
    }

    /// Runs every rule of `level` and the levels below it, reporting all
    /// violations. Ages are computed as of `as_of`.
    pub fn validate(
        &self,
        record: &Record,
        product: &str,
        level: ValidationLevel,
        as_of: NaiveDate,
    ) -> Result<ValidationReport, ConfigurationError> {
        let rules = self.rules_for(product)?;
        let mut findings = Findings::new(record, as_of, ValidationReport::new(level));
        for step in level.cumulative() {
            findings.run(rules.at(step));
        }
        let report = findings.into_report();
        debug!(
            product,
            level = %level,
            errors = report.error_count(),
            warnings = report.warning_count(),
            "validated record"
        );
        Ok(report)
    }
}

fn compile_product(config: &EngineConfig, product: &str) -> Result<ProductRules, String> {
    let mut levels: [CompiledRuleSet; 3] = Default::default();
    for (slot, level) in levels.iter_mut().zip(ValidationLevel::ALL) {
        let rules = config.validation_rules.rules_at(product, level);
        let errors = rule_set_errors(&rules);
        if !errors.is_empty() {
            return Err(format!("{level} rules: {}", errors.join("; ")));
        }
        *slot = CompiledRuleSet::compile(rules).map_err(|e| format!("{level} rules: {e}"))?;
    }
    Ok(ProductRules { levels })
}
