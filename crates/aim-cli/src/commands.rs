use std::fs;
use std::io::{self, IsTerminal};
use std::path::Path;

use anyhow::{Context, Result, bail};
use tracing::{info, info_span};

use aim_cli::batch::{BatchRequest, process_batch, progress_bar};
use aim_config::{
    check_config, default_config, load_config_unchecked, load_or_default, resolve_config_dir,
    write_config,
};
use aim_core::{MappingEngine, ProcessOptions};
use aim_ingest::{ParseOptions, csv_template, read_records, write_csv_template};
use aim_map::mapping_summary;
use aim_model::ProductType;
use aim_store::RecordStore;

use crate::cli::{InitConfigArgs, ProcessArgs, ProductArgs, RecordsArgs, RecordsCommand, TemplateArgs};
use crate::summary::{
    print_batch_summary, print_config_report, print_mapping_summary, print_name_groups,
    print_records, print_stats,
};

fn load_engine(config_dir: Option<&Path>) -> Result<MappingEngine> {
    let dir = resolve_config_dir(config_dir);
    let config = load_or_default(dir.as_deref()).with_context(|| match &dir {
        Some(dir) => format!("load configuration from {}", dir.display()),
        None => "load built-in configuration".to_string(),
    })?;
    Ok(MappingEngine::new(config))
}

fn product_name(raw: &str) -> Result<String> {
    let product = ProductType::new(raw).context("product type")?;
    Ok(product.as_str().to_string())
}

pub fn run_process(config_dir: Option<&Path>, args: &ProcessArgs) -> Result<bool> {
    let engine = load_engine(config_dir)?;
    let records = {
        let _span = info_span!("read", path = %args.input.display()).entered();
        read_records(&args.input)
            .with_context(|| format!("read {}", args.input.display()))?
    };
    info!(records = records.len(), "loaded input file");

    let parse = ParseOptions::new()
        .with_number_coercion(!args.no_number_coercion)
        .with_boolean_coercion(!args.no_boolean_coercion)
        .with_date_normalization(!args.no_date_normalization);
    let mut options = ProcessOptions::new().with_parse_options(parse);
    if let Some(as_of) = args.as_of {
        options = options.with_as_of(as_of);
    }
    let request = BatchRequest {
        product: args.product.clone(),
        level: args.level.as_str().to_string(),
        options,
    };

    let store = args
        .store
        .as_deref()
        .map(|path| {
            RecordStore::open(path).with_context(|| format!("open store {}", path.display()))
        })
        .transpose()?;

    let progress = progress_bar(records.len(), records.len() > 1 && io::stderr().is_terminal());
    let report = process_batch(&engine, &records, &request, store.as_ref(), &progress)
        .context("save processed records")?;

    print_batch_summary(&report, &request.product, &request.level);
    if store.is_some() {
        println!(
            "Stored: {} new, {} duplicate(s)",
            report.saved(),
            report.duplicates()
        );
    }
    if let Some(path) = &args.output {
        let json = report.results_json().context("serialize results")?;
        fs::write(path, json).with_context(|| format!("write {}", path.display()))?;
        println!("Results written to {}", path.display());
    }
    Ok(!report.has_failures())
}

pub fn run_products(config_dir: Option<&Path>) -> Result<bool> {
    let engine = load_engine(config_dir)?;
    let report = check_config(engine.config());
    print_config_report(&report);
    println!("Configuration fingerprint: {}", engine.fingerprint());
    Ok(true)
}

pub fn run_check_config(config_dir: Option<&Path>) -> Result<bool> {
    let config = match resolve_config_dir(config_dir) {
        Some(dir) => load_config_unchecked(&dir)
            .with_context(|| format!("load configuration from {}", dir.display()))?,
        None => default_config(),
    };
    let report = check_config(&config);
    print_config_report(&report);
    Ok(!report.has_errors())
}

pub fn run_init_config(args: &InitConfigArgs) -> Result<bool> {
    let written = write_config(&args.dir, &default_config(), args.force)
        .with_context(|| format!("write configuration to {}", args.dir.display()))?;
    for path in written {
        println!("wrote {}", path.display());
    }
    Ok(true)
}

pub fn run_mappings(config_dir: Option<&Path>, args: &ProductArgs) -> Result<bool> {
    let engine = load_engine(config_dir)?;
    let product = product_name(&args.product)?;
    let summary = mapping_summary(engine.config(), &product)?;
    print_mapping_summary(&summary);
    Ok(true)
}

pub fn run_template(config_dir: Option<&Path>, args: &TemplateArgs) -> Result<bool> {
    let engine = load_engine(config_dir)?;
    let product = product_name(&args.product)?;
    let fields = engine.config().source_fields(&product);
    if fields.is_empty() {
        bail!("no input fields configured for product '{product}'");
    }
    match &args.output {
        Some(path) => {
            write_csv_template(path, &fields)
                .with_context(|| format!("write template {}", path.display()))?;
            println!("Template with {} field(s) written to {}", fields.len(), path.display());
        }
        None => print!("{}", csv_template(&fields).context("build template")?),
    }
    Ok(true)
}

pub fn run_records(args: &RecordsArgs) -> Result<bool> {
    let store = RecordStore::open(&args.db)
        .with_context(|| format!("open store {}", args.db.display()))?;
    match &args.command {
        RecordsCommand::List => print_records(&store.list()?),
        RecordsCommand::Search { term, product } => {
            let product = product.as_deref().map(product_name).transpose()?;
            print_records(&store.search(term, product.as_deref())?);
        }
        RecordsCommand::Stats => print_stats(&store.stats()?),
        RecordsCommand::Delete { id } => {
            if !store.delete(*id)? {
                eprintln!("no record with id {id}");
                return Ok(false);
            }
            println!("deleted record {id}");
        }
        RecordsCommand::Clear => {
            let removed = store.clear()?;
            println!("deleted {removed} record(s)");
        }
        RecordsCommand::Duplicates => print_name_groups(&store.duplicate_names()?),
    }
    Ok(true)
}
