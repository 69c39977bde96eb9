//! Configuration for the actuarial input mapper.
//!
//! Four JSON documents drive the engine: field mappings, validation rules,
//! transformations and output templates, each keyed by product type. They
//! are loaded once (see [`load_config`]) or taken from [`default_config`],
//! and treated as read-only afterwards.

pub mod check;
pub mod defaults;
pub mod error;
pub mod hash;
pub mod loader;
pub mod rules;
pub mod schema;

pub use check::{ConfigIssue, ConfigReport, IssueSeverity, ProductCoverage, check_config};
pub use defaults::default_config;
pub use error::ConfigurationError;
pub use loader::{
    CONFIG_DIR_ENV, CONFIG_FILES, load_config, load_config_unchecked, resolve_config_dir,
    write_config,
};
pub use rules::{
    AgeLimits, ConsistencyCheck, CoverageLimits, DependencyCondition, FieldDependency, FieldType,
    FormatRule, LevelRules, RangeRule, RuleSet, ValidationRuleTable,
};
pub use schema::{
    ConditionOperator, ConditionValue, EngineConfig, FieldMappingSpec, MappingCondition,
    MappingDescriptor, OutputTemplate, ProductMappings, ProductTransformations, TemplateSection,
    TransformStep, template_fields,
};

/// Loads from `dir` when given, otherwise returns the built-in defaults.
pub fn load_or_default(dir: Option<&std::path::Path>) -> Result<EngineConfig, ConfigurationError> {
    match dir {
        Some(dir) => load_config(dir),
        None => Ok(default_config()),
    }
}
