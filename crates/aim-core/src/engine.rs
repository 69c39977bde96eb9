//! The orchestrating mapping engine.
//!
//! One call runs four stages strictly in order:
//!
//! 1. **Parse** - flatten and coerce the raw record
//! 2. **Validate** - apply the product's rules at the requested level
//! 3. **Map** - rename fields, translate values, run transformations
//! 4. **Assemble** - fill the product's output template
//!
//! Validation failures stop the pipeline before mapping and come back as
//! data. Parsing, mapping and configuration failures abort the call.

use std::time::Instant;

use tracing::{debug, info, info_span, warn};

use aim_config::{ConfigurationError, EngineConfig, check_config};
use aim_ingest::FastUiParser;
use aim_map::FieldMapper;
use aim_model::{
    OutputRecord, ProcessingMetadata, ProcessingResult, ProductType, RawRecord, ValidationLevel,
    ValidationReport, Warning,
};
use aim_validate::Validator;

use crate::error::EngineError;
use crate::options::ProcessOptions;
use crate::template::assemble;

/// Output of a pipeline run that did not hit a stage failure.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineOutcome {
    Completed {
        output: OutputRecord,
        warnings: Vec<Warning>,
        metadata: ProcessingMetadata,
    },
    /// Validation found errors; nothing was mapped.
    Rejected { report: ValidationReport },
}

/// Holds one immutable configuration and processes records against it.
#[derive(Debug, Clone)]
pub struct MappingEngine {
    config: EngineConfig,
    validator: Validator,
    fingerprint: String,
}

impl MappingEngine {
    /// Builds an engine without checking the configuration. Products whose
    /// rules cannot be compiled are refused per call.
    pub fn new(config: EngineConfig) -> Self {
        let validator = Validator::new(&config);
        let fingerprint = config.fingerprint();
        info!(
            products = config.supported_products().len(),
            fingerprint = %fingerprint,
            "mapping engine ready"
        );
        Self {
            config,
            validator,
            fingerprint,
        }
    }

    /// Builds an engine after the configuration passes the consistency check.
    pub fn checked(config: EngineConfig) -> Result<Self, ConfigurationError> {
        let report = check_config(&config);
        if report.has_errors() {
            let summary: Vec<String> = report.errors().map(ToString::to_string).collect();
            return Err(ConfigurationError::Inconsistent {
                count: report.error_count(),
                summary: summary.join("; "),
            });
        }
        Ok(Self::new(config))
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Processes one raw record with default options.
    ///
    /// Ages are computed against today's date. Use [`Self::process_with`]
    /// and [`ProcessOptions::with_as_of`] when the same record must give the
    /// same result on every day.
    pub fn process(&self, raw: &RawRecord, product: &str, level: &str) -> ProcessingResult {
        self.process_with(raw, product, level, &ProcessOptions::default())
    }

    /// Processes one raw record. Every failure is folded into the result.
    pub fn process_with(
        &self,
        raw: &RawRecord,
        product: &str,
        level: &str,
        options: &ProcessOptions,
    ) -> ProcessingResult {
        let product_type = ProductType::new(product)
            .map(|product| product.as_str().to_string())
            .unwrap_or_else(|_| product.to_string());
        let mut carried = Vec::new();
        let outcome = level
            .parse::<ValidationLevel>()
            .map_err(EngineError::from)
            .and_then(|level| self.run_collecting(raw, product, level, options, &mut carried));

        match outcome {
            Ok(PipelineOutcome::Completed {
                output,
                warnings,
                metadata,
            }) => ProcessingResult::Success {
                product_type,
                output,
                warnings,
                metadata,
            },
            Ok(PipelineOutcome::Rejected { report }) => ProcessingResult::Error {
                product_type,
                stage: aim_model::Stage::Validation,
                errors: report.issues,
                warnings: report.warnings,
            },
            Err(err) => {
                // Error text can quote submitted values, so only its location is logged.
                warn!(
                    product = %product_type,
                    stage = ?err.stage(),
                    field = err.field().unwrap_or_default(),
                    transformation = err.transformation().unwrap_or_default(),
                    "processing failed"
                );
                ProcessingResult::Error {
                    product_type,
                    stage: err.stage(),
                    errors: vec![err.to_issue()],
                    warnings: carried,
                }
            }
        }
    }

    /// Runs the pipeline, returning stage failures as errors.
    pub fn run(
        &self,
        raw: &RawRecord,
        product: &str,
        level: ValidationLevel,
        options: &ProcessOptions,
    ) -> Result<PipelineOutcome, EngineError> {
        self.run_collecting(raw, product, level, options, &mut Vec::new())
    }

    /// Runs the pipeline. Validation warnings are moved into `carried` once
    /// validation passes, so they survive a later mapping failure.
    fn run_collecting(
        &self,
        raw: &RawRecord,
        product: &str,
        level: ValidationLevel,
        options: &ProcessOptions,
        carried: &mut Vec<Warning>,
    ) -> Result<PipelineOutcome, EngineError> {
        let product = ProductType::new(product)?;
        let product = product.as_str();
        let span = info_span!("process", product = %product, level = %level);
        let _guard = span.enter();
        let start = Instant::now();

        self.ensure_product(product)?;

        let parsed = info_span!("parse").in_scope(|| FastUiParser::new(options.parse).parse(raw))?;
        debug!(
            original_fields = parsed.stats.original_fields,
            parsed_fields = parsed.stats.parsed_fields,
            "parse complete"
        );

        let report = info_span!("validate").in_scope(|| {
            self.validator
                .validate(&parsed.record, product, level, options.resolved_as_of())
        })?;
        if !report.is_valid() {
            info!(errors = report.error_count(), "record rejected by validation");
            return Ok(PipelineOutcome::Rejected { report });
        }
        carried.extend(report.warnings);

        let mapped = info_span!("map").in_scope(|| {
            FieldMapper::for_product(&self.config, product)?.map(&parsed.record)
        })?;
        debug!(
            mapped_fields = mapped.record.len(),
            dropped_fields = mapped.dropped_fields.len(),
            "mapping complete"
        );

        let template = self.template(product)?;
        let output = assemble(template, &mapped.record);

        let mut warnings = std::mem::take(carried);
        warnings.extend(mapped.warnings);
        let metadata = ProcessingMetadata {
            validation_level: level,
            fields_parsed: parsed.stats.parsed_fields,
            fields_mapped: mapped.record.len(),
            fields_output: output.field_count(),
            config_fingerprint: self.fingerprint.clone(),
        };
        info!(
            fields_output = metadata.fields_output,
            warnings = warnings.len(),
            duration_ms = start.elapsed().as_millis(),
            "record processed"
        );
        Ok(PipelineOutcome::Completed {
            output,
            warnings,
            metadata,
        })
    }

    /// Refuses products that are unknown or only partly configured.
    pub fn ensure_product(&self, product: &str) -> Result<(), ConfigurationError> {
        self.validator.ensure_product(product)?;
        if self.config.mappings_for(product).is_none() {
            return Err(ConfigurationError::BrokenProduct {
                product: product.to_string(),
                reason: "no field mappings configured".to_string(),
            });
        }
        self.template(product).map(|_| ())
    }

    fn template(&self, product: &str) -> Result<&aim_config::OutputTemplate, ConfigurationError> {
        self.config
            .template_for(product)
            .ok_or_else(|| ConfigurationError::BrokenProduct {
                product: product.to_string(),
                reason: "no output template configured".to_string(),
            })
    }
}
