use std::fmt::Write as _;

use inventory_protocol::TableSummary;
use inventory_search::{MessageCatalog, SearchOutcome};
use inventory_table::{Field, ItemRecord, ItemTable};

const SEPARATOR: &str = " | ";

/// Headline message, the result count and the matched rows, if any.
#[must_use]
pub fn lookup_text(
    messages: &MessageCatalog,
    table: &ItemTable,
    outcome: &SearchOutcome<'_>,
    fields: &[Field],
    limit: usize,
) -> String {
    let mut out = outcome.message.clone();
    out.push('\n');
    if outcome.is_empty() {
        return out;
    }
    out.push_str(&messages.result_count(outcome.len()));
    out.push('\n');
    if !fields.is_empty() {
        out.push('\n');
        out.push_str(&item_grid(table, &outcome.matches, fields, limit));
    }
    out
}

/// Aligned plain-text grid of `records`, headed by the export's own column
/// names. At most `limit` rows are printed; the rest are counted.
#[must_use]
pub fn item_grid(
    table: &ItemTable,
    records: &[&ItemRecord],
    fields: &[Field],
    limit: usize,
) -> String {
    let headers: Vec<&str> = fields
        .iter()
        .map(|field| table.column_name(*field).unwrap_or(field.as_str()))
        .collect();
    let shown = records.len().min(limit);
    let rows: Vec<Vec<&str>> = records[..shown]
        .iter()
        .map(|record| {
            fields
                .iter()
                .map(|field| table.field(record, *field).unwrap_or(""))
                .collect()
        })
        .collect();

    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_line(&mut out, &headers, &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    let _ = writeln!(out, "{}", rule.join("-+-"));
    for row in &rows {
        push_line(&mut out, row, &widths);
    }
    if records.len() > shown {
        let _ = writeln!(out, "... {} more", records.len() - shown);
    }
    out
}

fn push_line(out: &mut String, cells: &[&str], widths: &[usize]) {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| {
            let pad = width.saturating_sub(cell.chars().count());
            format!("{cell}{}", " ".repeat(pad))
        })
        .collect();
    let _ = writeln!(out, "{}", padded.join(SEPARATOR).trim_end());
}

/// Human-readable form of the `inspect` output.
#[must_use]
pub fn summary_text(summary: &TableSummary, table: &ItemTable, fields: &[Field]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "source:        {}", summary.source);
    let _ = writeln!(out, "columns:       {}", summary.columns.join(", "));
    let detected: Vec<String> = summary
        .fields
        .iter()
        .map(|(field, column)| format!("{field}={column}"))
        .collect();
    let _ = writeln!(out, "fields:        {}", detected.join(", "));
    let _ = writeln!(out, "raw rows:      {}", summary.raw_rows);
    let _ = writeln!(out, "items:         {}", summary.items);
    let _ = writeln!(out, "dropped rows:  {}", summary.dropped_rows);
    let _ = writeln!(out, "filled cells:  {}", summary.filled_cells);
    if let Some(good) = summary.good_items {
        let _ = writeln!(out, "good items:    {good}");
    }
    let _ = writeln!(out, "load time:     {} ms", summary.time_ms);

    if !summary.preview.is_empty() && !fields.is_empty() {
        let records: Vec<&ItemRecord> = table
            .records()
            .iter()
            .take(summary.preview.len())
            .collect();
        out.push('\n');
        out.push_str(&item_grid(table, &records, fields, records.len()));
    }
    out
}
