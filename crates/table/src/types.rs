use crate::raw::RawTable;
use crate::schema::{Field, TableSchema};

/// One physical inventory unit after normalization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemRecord {
    /// Zero-based index of the raw row this record was built from.
    /// Unique within a table, so it doubles as the record's identity.
    pub source_row: usize,

    pub(crate) cells: Vec<String>,
}

impl ItemRecord {
    #[must_use]
    pub(crate) const fn new(source_row: usize, cells: Vec<String>) -> Self {
        Self { source_row, cells }
    }

    #[must_use]
    pub fn cells(&self) -> &[String] {
        &self.cells
    }

    #[must_use]
    pub fn cell(&self, column: usize) -> Option<&str> {
        self.cells.get(column).map(String::as_str)
    }
}

/// The flat, query-able table produced by the normalizer.
///
/// Only [`crate::Normalizer`] builds non-empty tables, so holding an
/// `ItemTable` means the merged-cell structure has already been flattened.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemTable {
    columns: Vec<String>,
    schema: TableSchema,
    records: Vec<ItemRecord>,
}

impl ItemTable {
    #[must_use]
    pub(crate) const fn new(
        columns: Vec<String>,
        schema: TableSchema,
        records: Vec<ItemRecord>,
    ) -> Self {
        Self {
            columns,
            schema,
            records,
        }
    }

    /// Sentinel returned when a load fails.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Trimmed column names in export order
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    #[must_use]
    pub const fn schema(&self) -> &TableSchema {
        &self.schema
    }

    #[must_use]
    pub fn records(&self) -> &[ItemRecord] {
        &self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn has(&self, field: Field) -> bool {
        self.schema.has(field)
    }

    /// `false` means the export had no serial column and was returned
    /// without row filtering.
    #[must_use]
    pub fn has_serial(&self) -> bool {
        self.has(Field::Serial)
    }

    /// Column name carrying a canonical field in this export.
    #[must_use]
    pub fn column_name(&self, field: Field) -> Option<&str> {
        self.schema
            .column(field)
            .and_then(|idx| self.columns.get(idx))
            .map(String::as_str)
    }

    /// Value of a canonical field on one record; `None` if the table has no
    /// such column.
    #[must_use]
    pub fn field<'a>(&self, record: &'a ItemRecord, field: Field) -> Option<&'a str> {
        self.schema
            .column(field)
            .map(|idx| record.cell(idx).unwrap_or(""))
    }

    /// `(column, value)` pairs of one record in export order.
    pub fn pairs<'a>(
        &'a self,
        record: &'a ItemRecord,
    ) -> impl Iterator<Item = (&'a str, &'a str)> + 'a {
        self.columns
            .iter()
            .enumerate()
            .map(|(idx, col)| (col.as_str(), record.cell(idx).unwrap_or("")))
    }

    /// Turn the table back into raw form, e.g. to re-run normalization.
    #[must_use]
    pub fn to_raw(&self) -> RawTable {
        RawTable {
            headers: self.columns.clone(),
            rows: self.records.iter().map(|r| r.cells.clone()).collect(),
        }
    }
}
