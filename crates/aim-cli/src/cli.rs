//! CLI argument definitions for the actuarial input mapper.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "aim",
    version,
    about = "Actuarial input mapper - turn FAST UI submissions into calculation inputs",
    long_about = "Parse, validate and map FAST UI submissions onto the actuarial\n\
                  calculation input schema using per-product JSON configuration."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Configuration directory (default: $AIM_CONFIG_DIR, else built-in defaults).
    #[arg(long = "config", value_name = "DIR", global = true)]
    pub config: Option<PathBuf>,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(long = "log-format", value_enum, default_value = "pretty", global = true)]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Include submitted field values in log output.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Process a JSON or CSV file of submissions.
    Process(ProcessArgs),

    /// List configured products and what each one has configured.
    Products,

    /// Check the configuration for consistency.
    CheckConfig,

    /// Write the built-in configuration to a directory.
    InitConfig(InitConfigArgs),

    /// Show the field mappings of one product.
    Mappings(ProductArgs),

    /// Emit a CSV input template for one product.
    Template(TemplateArgs),

    /// Inspect or manage the record store.
    Records(RecordsArgs),
}

#[derive(Args)]
pub struct ProcessArgs {
    /// Input file (.json with one object or an array, or .csv).
    #[arg(value_name = "FILE")]
    pub input: PathBuf,

    /// Product type, e.g. life, annuity, health.
    #[arg(long = "product", short = 'p')]
    pub product: String,

    #[arg(long = "level", value_enum, default_value = "full")]
    pub level: LevelArg,

    /// Date ages are computed against (YYYY-MM-DD, default today).
    #[arg(long = "as-of", value_name = "DATE")]
    pub as_of: Option<NaiveDate>,

    /// Write every result as JSON to this file.
    #[arg(long = "output", short = 'o', value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Save successful records to this SQLite database.
    #[arg(long = "store", value_name = "DB")]
    pub store: Option<PathBuf>,

    /// Keep number-like text as text.
    #[arg(long = "no-number-coercion")]
    pub no_number_coercion: bool,

    /// Keep yes/no style text as text.
    #[arg(long = "no-boolean-coercion")]
    pub no_boolean_coercion: bool,

    /// Keep dates in their submitted layout.
    #[arg(long = "no-date-normalization")]
    pub no_date_normalization: bool,
}

#[derive(Args)]
pub struct InitConfigArgs {
    #[arg(value_name = "DIR")]
    pub dir: PathBuf,

    /// Overwrite existing configuration files.
    #[arg(long = "force")]
    pub force: bool,
}

#[derive(Args)]
pub struct ProductArgs {
    #[arg(long = "product", short = 'p')]
    pub product: String,
}

#[derive(Args)]
pub struct TemplateArgs {
    #[arg(long = "product", short = 'p')]
    pub product: String,

    /// Write the template here instead of stdout.
    #[arg(long = "output", short = 'o', value_name = "FILE")]
    pub output: Option<PathBuf>,
}

#[derive(Args)]
pub struct RecordsArgs {
    /// SQLite database file.
    #[arg(long = "db", value_name = "PATH", global = true, default_value = "aim_data.db")]
    pub db: PathBuf,

    #[command(subcommand)]
    pub command: RecordsCommand,
}

#[derive(Subcommand)]
pub enum RecordsCommand {
    /// List stored records, newest first.
    List,

    /// Find records whose submitted data contains a term.
    Search {
        term: String,
        #[arg(long = "product", short = 'p')]
        product: Option<String>,
    },

    /// Count stored records per product.
    Stats,

    /// Delete one record by id.
    Delete { id: i64 },

    /// Delete every record.
    Clear,

    /// Show applicants that appear in more than one record.
    Duplicates,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LevelArg {
    Basic,
    Full,
    Strict,
}

impl LevelArg {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Full => "full",
            Self::Strict => "strict",
        }
    }
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
