use serde::Serialize;

use crate::error::{Result, TableError};
use crate::raw::RawTable;
use crate::schema::{Field, SchemaAliases};
use crate::types::{ItemRecord, ItemTable};

/// What one normalization pass did to the export
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct NormalizeReport {
    /// Rows in the raw export
    pub raw_rows: usize,

    /// Rows that became item records
    pub kept_rows: usize,

    /// Rows discarded for lacking a serial
    pub dropped_rows: usize,

    /// Blank group-level cells filled from the row above
    pub filled_cells: usize,
}

/// Flattens a merged-cell export into an [`ItemTable`].
#[derive(Debug, Clone)]
pub struct Normalizer {
    aliases: SchemaAliases,
    fill_down: Vec<Field>,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(SchemaAliases::builtin())
    }
}

impl Normalizer {
    #[must_use]
    pub fn new(aliases: SchemaAliases) -> Self {
        Self {
            aliases,
            fill_down: Field::GROUP_LEVEL.to_vec(),
        }
    }

    /// Replace the set of forward-filled fields.
    ///
    /// The serial is the per-unit handle and can never be filled down.
    pub fn with_fill_down(mut self, fields: Vec<Field>) -> Result<Self> {
        if fields.contains(&Field::Serial) {
            return Err(TableError::invalid_config(
                "serial cannot be filled down: it identifies a single unit",
            ));
        }
        let mut fields = fields;
        fields.sort_unstable();
        fields.dedup();
        self.fill_down = fields;
        Ok(self)
    }

    #[must_use]
    pub const fn aliases(&self) -> &SchemaAliases {
        &self.aliases
    }

    /// Fail-closed entry point: any error yields an empty table.
    #[must_use]
    pub fn normalize(&self, raw: RawTable) -> ItemTable {
        match self.try_normalize(raw) {
            Ok(table) => table,
            Err(err) => {
                log::error!("Failed to load inventory data: {err}");
                ItemTable::empty()
            }
        }
    }

    pub fn try_normalize(&self, raw: RawTable) -> Result<ItemTable> {
        self.normalize_with_report(raw).map(|(table, _)| table)
    }

    pub fn normalize_with_report(&self, raw: RawTable) -> Result<(ItemTable, NormalizeReport)> {
        let RawTable { headers, rows } = raw;
        let columns = clean_headers(headers);
        let width = columns.len();
        let schema = self.aliases.resolve(&columns);

        let mut records = rows
            .into_iter()
            .enumerate()
            .map(|(idx, cells)| pad_row(idx, cells, width).map(|c| ItemRecord::new(idx, c)))
            .collect::<Result<Vec<_>>>()?;

        let mut report = NormalizeReport {
            raw_rows: records.len(),
            ..NormalizeReport::default()
        };

        for field in &self.fill_down {
            if let Some(col) = schema.column(*field) {
                report.filled_cells += forward_fill(&mut records, col);
            }
        }

        if let Some(serial_col) = schema.column(Field::Serial) {
            records.retain_mut(|record| trim_in_place(&mut record.cells[serial_col]));
            if let Some(holder_col) = schema.column(Field::Holder) {
                for record in &mut records {
                    trim_in_place(&mut record.cells[holder_col]);
                }
            }
        } else {
            log::warn!("No serial column among {columns:?}; returning the table unfiltered");
        }

        report.kept_rows = records.len();
        report.dropped_rows = report.raw_rows - report.kept_rows;
        log::debug!(
            "normalized {} raw rows into {} items ({} filled cells)",
            report.raw_rows,
            report.kept_rows,
            report.filled_cells
        );

        Ok((ItemTable::new(columns, schema, records), report))
    }
}

/// Normalize with the built-in schema and fill-down set.
#[must_use]
pub fn normalize(raw: RawTable) -> ItemTable {
    Normalizer::default().normalize(raw)
}

fn clean_headers(headers: Vec<String>) -> Vec<String> {
    headers
        .into_iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
        .collect()
}

fn pad_row(idx: usize, mut cells: Vec<String>, width: usize) -> Result<Vec<String>> {
    if cells.len() > width {
        // Spreadsheet exports often carry trailing empty cells past the header.
        if cells[width..].iter().any(|c| !c.trim().is_empty()) {
            return Err(TableError::RaggedRow {
                row: idx,
                expected: width,
                found: cells.len(),
            });
        }
        cells.truncate(width);
    }
    cells.resize(width, String::new());
    Ok(cells)
}

fn forward_fill(records: &mut [ItemRecord], col: usize) -> usize {
    let mut last: Option<String> = None;
    let mut filled = 0;
    for record in records {
        let cell = &mut record.cells[col];
        if cell.trim().is_empty() {
            if let Some(value) = &last {
                cell.clone_from(value);
                filled += 1;
            }
        } else {
            last = Some(cell.clone());
        }
    }
    filled
}

/// Trims the cell and reports whether anything is left.
fn trim_in_place(cell: &mut String) -> bool {
    let trimmed = cell.trim();
    if trimmed.len() != cell.len() {
        *cell = trimmed.to_string();
    }
    !cell.is_empty()
}
