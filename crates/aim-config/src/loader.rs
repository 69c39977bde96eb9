//! Reading and writing configuration directories.
//!
//! A configuration directory holds exactly four JSON documents:
//!
//! - `field_mappings.json`
//! - `validation_rules.json`
//! - `transformations.json`
//! - `output_templates.json`

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::check::check_config;
use crate::error::ConfigurationError;
use crate::schema::EngineConfig;

pub const FIELD_MAPPINGS_FILE: &str = "field_mappings.json";
pub const VALIDATION_RULES_FILE: &str = "validation_rules.json";
pub const TRANSFORMATIONS_FILE: &str = "transformations.json";
pub const OUTPUT_TEMPLATES_FILE: &str = "output_templates.json";

/// Environment variable naming the configuration directory.
pub const CONFIG_DIR_ENV: &str = "AIM_CONFIG_DIR";

pub const CONFIG_FILES: [&str; 4] = [
    FIELD_MAPPINGS_FILE,
    VALIDATION_RULES_FILE,
    TRANSFORMATIONS_FILE,
    OUTPUT_TEMPLATES_FILE,
];

/// Picks the configuration directory: the explicit path first, then
/// `AIM_CONFIG_DIR`. `None` means the built-in defaults apply.
pub fn resolve_config_dir(explicit: Option<&Path>) -> Option<PathBuf> {
    explicit.map(Path::to_path_buf).or_else(|| {
        std::env::var_os(CONFIG_DIR_ENV)
            .filter(|value| !value.is_empty())
            .map(PathBuf::from)
    })
}

/// Loads and checks a configuration directory.
///
/// Fails with [`ConfigurationError::Inconsistent`] when the consistency
/// check reports any error.
pub fn load_config(dir: &Path) -> Result<EngineConfig, ConfigurationError> {
    let config = load_config_unchecked(dir)?;
    let report = check_config(&config);
    for issue in report.warnings() {
        warn!(product = issue.product.as_deref(), "{}", issue.message);
    }
    if report.has_errors() {
        let summary = report
            .errors()
            .map(|issue| issue.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        return Err(ConfigurationError::Inconsistent {
            count: report.error_count(),
            summary,
        });
    }
    Ok(config)
}

/// Loads a configuration directory without the consistency check.
pub fn load_config_unchecked(dir: &Path) -> Result<EngineConfig, ConfigurationError> {
    let config = EngineConfig {
        field_mappings: read_document(dir, FIELD_MAPPINGS_FILE)?,
        validation_rules: read_document(dir, VALIDATION_RULES_FILE)?,
        transformations: read_document(dir, TRANSFORMATIONS_FILE)?,
        output_templates: read_document(dir, OUTPUT_TEMPLATES_FILE)?,
    };
    info!(
        path = %dir.display(),
        products = config.supported_products().len(),
        "loaded configuration"
    );
    Ok(config)
}

fn read_document<T: DeserializeOwned>(dir: &Path, file_name: &str) -> Result<T, ConfigurationError> {
    let path = dir.join(file_name);
    if !path.is_file() {
        return Err(ConfigurationError::MissingFile { path });
    }
    let contents = fs::read_to_string(&path).map_err(|e| ConfigurationError::io(&path, e))?;
    let document =
        serde_json::from_str(&contents).map_err(|source| ConfigurationError::Json {
            path: path.clone(),
            source,
        })?;
    debug!(path = %path.display(), "parsed configuration document");
    Ok(document)
}

/// Writes `config` as four pretty-printed documents under `dir`, creating
/// the directory when needed. Existing files are only replaced when
/// `overwrite` is set.
pub fn write_config(
    dir: &Path,
    config: &EngineConfig,
    overwrite: bool,
) -> Result<Vec<PathBuf>, ConfigurationError> {
    if !overwrite
        && let Some(existing) = CONFIG_FILES
            .iter()
            .map(|file_name| dir.join(file_name))
            .find(|path| path.exists())
    {
        return Err(ConfigurationError::AlreadyExists { path: existing });
    }
    fs::create_dir_all(dir).map_err(|e| ConfigurationError::io(dir, e))?;

    let written = vec![
        write_document(dir, FIELD_MAPPINGS_FILE, &config.field_mappings)?,
        write_document(dir, VALIDATION_RULES_FILE, &config.validation_rules)?,
        write_document(dir, TRANSFORMATIONS_FILE, &config.transformations)?,
        write_document(dir, OUTPUT_TEMPLATES_FILE, &config.output_templates)?,
    ];
    info!(path = %dir.display(), "wrote configuration");
    Ok(written)
}

fn write_document<T: Serialize>(
    dir: &Path,
    file_name: &str,
    document: &T,
) -> Result<PathBuf, ConfigurationError> {
    let path = dir.join(file_name);
    let mut json = serde_json::to_string_pretty(document).map_err(|source| {
        ConfigurationError::Json {
            path: path.clone(),
            source,
        }
    })?;
    json.push('\n');
    fs::write(&path, json).map_err(|e| ConfigurationError::io(&path, e))?;
    Ok(path)
}
