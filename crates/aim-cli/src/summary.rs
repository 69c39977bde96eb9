use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use aim_cli::batch::BatchReport;
use aim_config::{ConfigReport, IssueSeverity};
use aim_map::{MappingKind, MappingSummary};
use aim_model::{ProcessingResult, Stage};
use aim_store::{NameGroup, StoreStats, StoredRecord};

pub fn print_batch_summary(report: &BatchReport, product: &str, level: &str) {
    println!("Product: {product}  Level: {level}");
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Record"),
        header_cell("Status"),
        header_cell("Stage"),
        header_cell("Errors"),
        header_cell("Warnings"),
        header_cell("Fields"),
    ]);
    apply_summary_table_style(&mut table);
    for column in [0, 3, 4, 5] {
        align_column(&mut table, column, CellAlignment::Right);
    }
    for record in &report.records {
        let result = &record.result;
        let fields = match result {
            ProcessingResult::Success { metadata, .. } => Cell::new(metadata.fields_output),
            ProcessingResult::Error { .. } => dim_cell("-"),
        };
        table.add_row(vec![
            Cell::new(record.index),
            status_cell(result.is_success()),
            result.stage().map_or_else(|| dim_cell("-"), |stage| Cell::new(stage_name(stage))),
            count_cell(result.errors().len(), Color::Red),
            count_cell(result.warnings().len(), Color::Yellow),
            fields,
        ]);
    }
    table.add_row(vec![
        Cell::new("TOTAL").fg(Color::Cyan).add_attribute(Attribute::Bold),
        Cell::new(format!("{} ok / {} failed", report.succeeded(), report.failed()))
            .add_attribute(Attribute::Bold),
        dim_cell("-"),
        count_cell(report.records.iter().map(|r| r.result.errors().len()).sum(), Color::Red)
            .add_attribute(Attribute::Bold),
        count_cell(report.warning_count(), Color::Yellow).add_attribute(Attribute::Bold),
        dim_cell("-"),
    ]);
    println!("{table}");
    print_issue_table(report);
}

fn print_issue_table(report: &BatchReport) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Record"),
        header_cell("Severity"),
        header_cell("Field"),
        header_cell("Rule"),
        header_cell("Message"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    let mut rows = 0usize;
    for record in &report.records {
        for error in record.result.errors() {
            table.add_row(vec![
                Cell::new(record.index),
                Cell::new("error").fg(Color::Red).add_attribute(Attribute::Bold),
                field_cell(&error.field),
                Cell::new(error.rule_violated.as_str()),
                Cell::new(&error.message),
            ]);
            rows += 1;
        }
        for warning in record.result.warnings() {
            table.add_row(vec![
                Cell::new(record.index),
                Cell::new("warning").fg(Color::Yellow),
                field_cell(warning.field.as_deref().unwrap_or_default()),
                dim_cell("-"),
                Cell::new(&warning.message),
            ]);
            rows += 1;
        }
    }
    if rows > 0 {
        println!();
        println!("Issues:");
        println!("{table}");
    }
}

pub fn print_config_report(report: &ConfigReport) {
    let mut coverage = Table::new();
    coverage.set_header(vec![
        header_cell("Product"),
        header_cell("Mappings"),
        header_cell("Rules"),
        header_cell("Transformations"),
        header_cell("Template"),
    ]);
    apply_table_style(&mut coverage);
    for (product, flags) in &report.product_coverage {
        coverage.add_row(vec![
            Cell::new(product).add_attribute(Attribute::Bold),
            check_cell(flags.has_field_mappings),
            check_cell(flags.has_validation_rules),
            check_cell(flags.has_transformations),
            check_cell(flags.has_output_template),
        ]);
    }
    println!("{coverage}");

    if report.issues.is_empty() {
        println!("Configuration is consistent.");
        return;
    }
    let mut issues = Table::new();
    issues.set_header(vec![header_cell("Severity"), header_cell("Product"), header_cell("Message")]);
    apply_table_style(&mut issues);
    for issue in &report.issues {
        let severity = match issue.severity {
            IssueSeverity::Error => Cell::new("error").fg(Color::Red).add_attribute(Attribute::Bold),
            IssueSeverity::Warning => Cell::new("warning").fg(Color::Yellow),
        };
        issues.add_row(vec![
            severity,
            Cell::new(issue.product.as_deref().unwrap_or("-")),
            Cell::new(&issue.message),
        ]);
    }
    println!();
    println!("{issues}");
    println!(
        "{} error(s), {} warning(s)",
        report.error_count(),
        report.warning_count()
    );
}

pub fn print_mapping_summary(summary: &MappingSummary) {
    println!(
        "Product: {}  ({} mappings: {} simple, {} complex)",
        summary.product_type, summary.total_mappings, summary.simple_mappings, summary.complex_mappings
    );
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Source field"),
        header_cell("Target field"),
        header_cell("Kind"),
        header_cell("Steps"),
    ]);
    apply_table_style(&mut table);
    for field in &summary.fields {
        let kind = match field.kind {
            MappingKind::Simple => dim_cell("simple"),
            MappingKind::Complex => Cell::new("complex").fg(Color::Cyan),
        };
        let steps = if field.steps.is_empty() {
            dim_cell("-")
        } else {
            Cell::new(field.steps.join(" -> "))
        };
        table.add_row(vec![
            Cell::new(&field.source_field),
            Cell::new(&field.target_field),
            kind,
            steps,
        ]);
    }
    println!("{table}");
}

pub fn print_records(records: &[StoredRecord]) {
    if records.is_empty() {
        println!("No records.");
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Id"),
        header_cell("Product"),
        header_cell("Saved"),
        header_cell("Fields"),
        header_cell("Hash"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    for record in records {
        table.add_row(vec![
            Cell::new(record.id),
            Cell::new(&record.product_type),
            Cell::new(&record.created_at),
            Cell::new(record.data.len()),
            dim_cell(&record.data_hash[..record.data_hash.len().min(12)]),
        ]);
    }
    println!("{table}");
}

pub fn print_stats(stats: &StoreStats) {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Product"), header_cell("Records")]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    for (product, count) in &stats.by_product {
        table.add_row(vec![Cell::new(product), Cell::new(count)]);
    }
    table.add_row(vec![
        Cell::new("TOTAL").fg(Color::Cyan).add_attribute(Attribute::Bold),
        Cell::new(stats.total).add_attribute(Attribute::Bold),
    ]);
    println!("{table}");
}

pub fn print_name_groups(groups: &[NameGroup]) {
    if groups.is_empty() {
        println!("No duplicate names.");
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![header_cell("Name"), header_cell("Records")]);
    apply_table_style(&mut table);
    for group in groups {
        let ids: Vec<String> = group.ids.iter().map(ToString::to_string).collect();
        table.add_row(vec![Cell::new(&group.name), Cell::new(ids.join(", "))]);
    }
    println!("{table}");
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn stage_name(stage: Stage) -> &'static str {
    match stage {
        Stage::Parsing => "parsing",
        Stage::Validation => "validation",
        Stage::Mapping => "mapping",
        Stage::Configuration => "configuration",
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label).add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value.to_string()).add_attribute(Attribute::Dim)
}

fn status_cell(success: bool) -> Cell {
    if success {
        Cell::new("ok").fg(Color::Green).add_attribute(Attribute::Bold)
    } else {
        Cell::new("failed").fg(Color::Red).add_attribute(Attribute::Bold)
    }
}

fn check_cell(present: bool) -> Cell {
    if present {
        Cell::new("✓").fg(Color::Green).add_attribute(Attribute::Bold)
    } else {
        Cell::new("✗").fg(Color::Red)
    }
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn field_cell(field: &str) -> Cell {
    if field.is_empty() {
        dim_cell("-")
    } else {
        Cell::new(field)
    }
}
