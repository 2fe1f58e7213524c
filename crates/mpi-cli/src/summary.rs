use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use mpi_core::FederationConfig;

use crate::commands::IntegrateResult;

pub fn print_summary(result: &IntegrateResult) {
    if let Some(name) = &result.federation {
        println!("Federation: {name}");
    }
    match &result.outputs {
        Some(paths) => {
            println!("Patients: {}", paths.patients.display());
            println!("Clusters: {}", paths.clusters.display());
            println!("Stats: {}", paths.stats.display());
        }
        None => println!("Dry run: no files written"),
    }

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Source"),
        header_cell("Read"),
        header_cell("Skipped"),
        header_cell("Mapped"),
        header_cell("Unidentifiable"),
        header_cell("Malformed"),
        header_cell("Exact dups"),
        header_cell("Admitted"),
    ]);
    apply_summary_table_style(&mut table);
    for index in 1..8 {
        align_column(&mut table, index, CellAlignment::Right);
    }

    let output = &result.output;
    let mut totals = [0usize; 7];
    for batch in &output.batches {
        let counts = [
            batch.read,
            batch.skipped_rows,
            batch.mapped,
            batch.unidentifiable,
            batch.malformed,
            batch.exact_duplicates,
            batch.admitted,
        ];
        for (total, count) in totals.iter_mut().zip(counts) {
            *total += count;
        }
        let mut row = vec![Cell::new(batch.source_system.as_str()).add_attribute(Attribute::Bold)];
        row.push(Cell::new(batch.read));
        row.push(count_cell(batch.skipped_rows, Color::Yellow));
        row.push(Cell::new(batch.mapped));
        row.push(count_cell(batch.unidentifiable, Color::Yellow));
        row.push(count_cell(batch.malformed, Color::Yellow));
        row.push(count_cell(batch.exact_duplicates, Color::Blue));
        row.push(Cell::new(batch.admitted).fg(Color::Green));
        table.add_row(row);
    }
    for failure in &result.failures {
        let mut row = vec![
            Cell::new(failure.source_system().as_str())
                .fg(Color::Red)
                .add_attribute(Attribute::Bold),
        ];
        row.extend((0..6).map(|_| dim_cell("-")));
        row.push(Cell::new("failed").fg(Color::Red));
        table.add_row(row);
    }
    let mut total_row = vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
    ];
    total_row.extend(
        totals
            .iter()
            .map(|total| Cell::new(total).add_attribute(Attribute::Bold)),
    );
    table.add_row(total_row);
    println!("{table}");

    let stats = &output.stats;
    let mut table = Table::new();
    table.set_header(vec![header_cell("Metric"), header_cell("Value")]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    let rows = [
        ("Canonical records", stats.total_records),
        ("Candidate pairs", output.linkage.candidate_pairs),
        ("Linked pairs", output.linkage.links.len()),
        ("Duplicate clusters", output.linkage.clusters.len()),
        ("Cross-source clusters", stats.cross_source_clusters),
        ("Cross-source duplicates", stats.cross_source_duplicates),
        ("Shared patient keys", stats.shared_patient_keys),
    ];
    for (label, value) in rows {
        table.add_row(vec![Cell::new(label), Cell::new(value)]);
    }
    println!("{table}");

    let mut table = Table::new();
    table.set_header(vec![header_cell("Field"), header_cell("Empty")]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    for (field, count) in &stats.empty_fields {
        table.add_row(vec![Cell::new(field), count_cell(*count, Color::Yellow)]);
    }
    println!("{table}");

    for failure in &result.failures {
        eprintln!("error: {failure}");
    }
}

/// Prints each source's validated mapping table and the linkage setup.
pub fn print_config(config: &FederationConfig) {
    for source in &config.sources {
        println!(
            "{} ({}: {})",
            source.source_system(),
            source.reader.name(),
            source.reader.path().display()
        );
        let mut table = Table::new();
        table.set_header(vec![
            header_cell("Source field"),
            header_cell("Canonical field"),
            header_cell("Transform"),
            header_cell("Required"),
        ]);
        apply_table_style(&mut table);
        align_column(&mut table, 3, CellAlignment::Center);
        for rule in source.table.rules() {
            table.add_row(vec![
                Cell::new(&rule.source_field),
                Cell::new(rule.canonical_field),
                Cell::new(rule.transform),
                if rule.required {
                    Cell::new("yes").fg(Color::Yellow)
                } else {
                    dim_cell("-")
                },
            ]);
        }
        println!("{table}");
        let unmapped = source.table.unmapped_fields();
        if !unmapped.is_empty() {
            let names: Vec<&str> = unmapped.iter().map(|field| field.as_str()).collect();
            println!("  unmapped: {}", names.join(", "));
        }
    }

    let engine = &config.engine;
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Comparator"),
        header_cell("Fields"),
        header_cell("Kind"),
    ]);
    apply_table_style(&mut table);
    for comparator in engine.comparators() {
        let fields = if comparator.left == comparator.right {
            comparator.left.to_string()
        } else {
            format!("{} / {}", comparator.left, comparator.right)
        };
        table.add_row(vec![
            Cell::new(&comparator.label),
            Cell::new(fields),
            Cell::new(comparator.kind.name()),
        ]);
    }
    println!("Linkage policy: {}", engine.policy().name());
    println!("{table}");
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
