use std::time::Duration;

use inventory_table::{ItemTable, NormalizeReport};
use serde::Serialize;

/// Statistics about one fetch + normalize pass
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct LoadStats {
    /// Source label (file path, "stdin", ...)
    pub source: String,

    /// Rows in the raw export
    pub raw_rows: usize,

    /// Item records after normalization
    pub items: usize,

    /// Rows dropped for lacking a serial
    pub dropped_rows: usize,

    /// Blank group-level cells filled from above
    pub filled_cells: usize,

    /// Canonical fields detected in the export
    pub fields: Vec<String>,

    /// Whether the export has a serial column at all
    pub has_serial: bool,

    /// Time taken in milliseconds
    pub time_ms: u64,
}

impl LoadStats {
    pub fn new(
        source: impl Into<String>,
        report: &NormalizeReport,
        table: &ItemTable,
        elapsed: Duration,
    ) -> Self {
        Self {
            source: source.into(),
            raw_rows: report.raw_rows,
            items: report.kept_rows,
            dropped_rows: report.dropped_rows,
            filled_cells: report.filled_cells,
            fields: table.schema().fields().map(|f| f.to_string()).collect(),
            has_serial: table.has_serial(),
            time_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
        }
    }
}
